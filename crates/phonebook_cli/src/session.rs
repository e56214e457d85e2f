//! Interactive command loop.
//!
//! # Responsibility
//! - Print the menu, read a command code and run the matching use-case.
//! - Collect field input in validation order so bad input is reported early.
//!
//! # Invariants
//! - Domain errors are printed and the loop continues.
//! - Persistence errors end the session with an error.
//! - End of input behaves like the exit command; the book is flushed once.

use crate::commands::Command;
use anyhow::Context;
use log::{debug, info};
use phonebook_core::{
    check_birth_date, check_phone, normalize_name, BookError, ContactRepository, ContactService,
    ContactUpdate, NewContact, ServiceError, ServiceResult,
};
use std::io::{BufRead, Write};

/// Whether the loop keeps running after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Exit,
}

pub struct Session<R: ContactRepository, I: BufRead, O: Write> {
    service: ContactService<R>,
    input: I,
    output: O,
}

impl<R: ContactRepository, I: BufRead, O: Write> Session<R, I, O> {
    pub fn new(service: ContactService<R>, input: I, output: O) -> Self {
        Self {
            service,
            input,
            output,
        }
    }

    /// Runs until the exit command or end of input, then flushes the book.
    pub fn run(&mut self) -> anyhow::Result<()> {
        info!(
            "event=session_start module=cli status=ok count={}",
            self.service.len()
        );
        loop {
            self.print_menu()?;
            let Some(code) = self.prompt("Enter command number: ")? else {
                break;
            };
            let command = match code.parse::<Command>() {
                Ok(command) => command,
                Err(err) => {
                    writeln!(self.output, "Error: {err}")?;
                    continue;
                }
            };
            debug!(
                "event=command module=cli code={} mutating={}",
                command.code(),
                command.is_mutating()
            );
            if self.dispatch(command)? == Flow::Exit {
                break;
            }
        }

        self.service
            .flush()
            .context("failed to save contacts on exit")?;
        info!("event=session_end module=cli status=ok");
        Ok(())
    }

    fn dispatch(&mut self, command: Command) -> anyhow::Result<Flow> {
        match command {
            Command::Add => self.add_record(),
            Command::Delete => self.delete_record(),
            Command::Update => self.update_record(),
            Command::Search => self.search_records(),
            Command::ListAll => self.display_all(),
            Command::Age => self.calculate_age(),
            Command::Exit => {
                writeln!(self.output, "Exiting.")?;
                Ok(Flow::Exit)
            }
        }
    }

    fn add_record(&mut self) -> anyhow::Result<Flow> {
        let Some(first_name) = self.prompt("First name: ")? else {
            return Ok(Flow::Exit);
        };
        let Some(last_name) = self.prompt("Last name: ")? else {
            return Ok(Flow::Exit);
        };
        let checked = self.service.check_identifier(&first_name, &last_name);
        if self.recover(checked)?.is_none() {
            return Ok(Flow::Continue);
        }

        let Some(phone) = self.prompt("Phone number (11 digits): ")? else {
            return Ok(Flow::Exit);
        };
        if let Err(err) = check_phone(&phone) {
            return self.reject(err);
        }

        let Some(birth_date) = self.prompt("Birth date (dd.mm.yyyy) or leave blank: ")? else {
            return Ok(Flow::Exit);
        };
        if let Err(err) = check_birth_date(&birth_date) {
            return self.reject(err);
        }

        let result = self.service.add(&NewContact {
            first_name,
            last_name,
            phone,
            birth_date,
        });
        if let Some(identifier) = self.recover(result)? {
            writeln!(self.output, "Record {identifier} added.")?;
        }
        Ok(Flow::Continue)
    }

    fn delete_record(&mut self) -> anyhow::Result<Flow> {
        let Some(identifier) = self.prompt_identifier("First and last name to delete: ")? else {
            return Ok(Flow::Exit);
        };
        let result = self.service.delete(&identifier);
        if self.recover(result)?.is_some() {
            writeln!(self.output, "Record {identifier} deleted.")?;
        }
        Ok(Flow::Continue)
    }

    fn update_record(&mut self) -> anyhow::Result<Flow> {
        let Some(identifier) = self.prompt_identifier("First and last name to update: ")? else {
            return Ok(Flow::Exit);
        };
        let Some(current) = self.service.get(&identifier).cloned() else {
            return self.reject(BookError::RecordNotFound(identifier));
        };

        writeln!(
            self.output,
            "Enter new values or leave a field blank to keep the current value."
        )?;
        writeln!(self.output, "Current phone: {}", current.phone)?;
        let Some(phone) = self.prompt("New phone: ")? else {
            return Ok(Flow::Exit);
        };
        if !phone.is_empty() {
            if let Err(err) = check_phone(&phone) {
                return self.reject(err);
            }
        }

        writeln!(self.output, "Current birth date: {}", current.birth_date)?;
        let Some(birth_date) = self.prompt("New birth date: ")? else {
            return Ok(Flow::Exit);
        };
        if let Err(err) = check_birth_date(&birth_date) {
            return self.reject(err);
        }

        let update = ContactUpdate::from_input(&phone, &birth_date);
        let result = self.service.update(&identifier, &update);
        if self.recover(result)?.is_some() {
            writeln!(self.output, "Record {identifier} updated.")?;
        }
        Ok(Flow::Continue)
    }

    fn search_records(&mut self) -> anyhow::Result<Flow> {
        let Some(query) = self.prompt("Name, last name, phone or birth date to search for: ")?
        else {
            return Ok(Flow::Exit);
        };
        let hits = self.service.search(&query);
        if hits.is_empty() {
            writeln!(self.output, "No records found.")?;
        }
        for hit in hits {
            writeln!(self.output, "{hit}")?;
        }
        Ok(Flow::Continue)
    }

    fn display_all(&mut self) -> anyhow::Result<Flow> {
        if self.service.is_empty() {
            writeln!(self.output, "Phonebook is empty.")?;
        }
        for entry in self.service.list() {
            writeln!(self.output, "{entry}")?;
        }
        Ok(Flow::Continue)
    }

    fn calculate_age(&mut self) -> anyhow::Result<Flow> {
        let Some(identifier) = self.prompt_identifier("First and last name: ")? else {
            return Ok(Flow::Exit);
        };
        let result = self.service.age_of(&identifier);
        if let Some(age) = self.recover(result)? {
            writeln!(self.output, "Age of {identifier}: {age} years")?;
        }
        Ok(Flow::Continue)
    }

    fn print_menu(&mut self) -> anyhow::Result<()> {
        writeln!(self.output)?;
        writeln!(self.output, "Choose a command:")?;
        for command in Command::ALL {
            writeln!(self.output, "{} - {}", command.code(), command.description())?;
        }
        Ok(())
    }

    /// Prints `label` and reads one trimmed line; `None` at end of input.
    fn prompt(&mut self, label: &str) -> anyhow::Result<Option<String>> {
        write!(self.output, "{label}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// Like `prompt`, with the answer trimmed and title-cased.
    fn prompt_identifier(&mut self, label: &str) -> anyhow::Result<Option<String>> {
        Ok(self.prompt(label)?.map(|line| normalize_name(&line)))
    }

    fn reject(&mut self, err: BookError) -> anyhow::Result<Flow> {
        writeln!(self.output, "Error: {err}")?;
        Ok(Flow::Continue)
    }

    /// Prints domain errors and keeps going; persistence errors are fatal.
    fn recover<T>(&mut self, result: ServiceResult<T>) -> anyhow::Result<Option<T>> {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(ServiceError::Book(err)) => {
                self.reject(err)?;
                Ok(None)
            }
            Err(ServiceError::Repo(err)) => Err(err).context("failed to save contacts"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Session;
    use phonebook_core::{ContactService, JsonFileRepository};
    use std::io::Cursor;
    use std::path::Path;

    fn run_script(path: &Path, script: &str) -> String {
        let service = ContactService::open(JsonFileRepository::new(path)).unwrap();
        let mut output = Vec::new();
        Session::new(service, Cursor::new(script.as_bytes()), &mut output)
            .run()
            .unwrap();
        String::from_utf8(output).unwrap()
    }

    fn reload(path: &Path) -> ContactService<JsonFileRepository> {
        ContactService::open(JsonFileRepository::new(path)).unwrap()
    }

    #[test]
    fn add_persists_record_and_reports_success() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("phonebook.json");

        let output = run_script(&path, "1\nivan\npetrov\n+79001234567\n01.01.2000\n7\n");

        assert!(output.contains("Record Ivan Petrov added."));
        assert!(output.contains("Exiting."));
        let contact = reload(&path).get("Ivan Petrov").cloned().unwrap();
        assert_eq!(contact.phone, "89001234567");
        assert_eq!(contact.birth_date, "01.01.2000");
    }

    #[test]
    fn invalid_name_stops_before_phone_prompt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("phonebook.json");

        let output = run_script(&path, "1\niv@n\npetrov\n7\n");

        assert!(output.contains("Error: invalid name `Iv@N`"));
        assert!(!output.contains("Phone number"));
        assert!(reload(&path).is_empty());
    }

    #[test]
    fn invalid_phone_stops_before_birth_date_prompt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("phonebook.json");

        let output = run_script(&path, "1\nivan\npetrov\n+7900\n7\n");

        assert!(output.contains("Error: invalid phone number `+7900`"));
        assert!(!output.contains("Birth date"));
        assert!(reload(&path).is_empty());
    }

    #[test]
    fn duplicate_is_reported_before_phone_prompt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("phonebook.json");
        run_script(&path, "1\nIvan\nPetrov\n89001234567\n\n7\n");

        let output = run_script(&path, "1\nivan\npetrov\n7\n");

        assert!(output.contains("Error: record already exists: Ivan Petrov"));
        assert_eq!(reload(&path).len(), 1);
    }

    #[test]
    fn update_keeps_blank_fields_and_aborts_on_invalid_phone() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("phonebook.json");
        run_script(&path, "1\nIvan\nPetrov\n89001234567\n01.01.2000\n7\n");

        let output = run_script(&path, "3\nivan petrov\n\n02.02.2002\n3\nIvan Petrov\n12\n7\n");

        assert!(output.contains("Current phone: 89001234567"));
        assert!(output.contains("Record Ivan Petrov updated."));
        assert!(output.contains("Error: invalid phone number `12`"));
        let contact = reload(&path).get("Ivan Petrov").cloned().unwrap();
        assert_eq!(contact.phone, "89001234567");
        assert_eq!(contact.birth_date, "02.02.2002");
    }

    #[test]
    fn update_of_missing_record_reports_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("phonebook.json");

        let output = run_script(&path, "3\nno one\n7\n");

        assert!(output.contains("Error: record not found: No One"));
        assert!(!output.contains("Current phone"));
    }

    #[test]
    fn search_list_and_age_report_results() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("phonebook.json");

        let output = run_script(
            &path,
            "5\n1\nIvan\nPetrov\n89001234567\n\n4\n89001234567\n4\nnobody\n6\nivan petrov\n5\n7\n",
        );

        assert!(output.contains("Phonebook is empty."));
        assert!(output.contains("Ivan Petrov: Phone: 89001234567, Birth date: "));
        assert!(output.contains("No records found."));
        assert!(output.contains("Error: record has no birth date: Ivan Petrov"));
    }

    #[test]
    fn delete_and_unknown_command() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("phonebook.json");
        run_script(&path, "1\nIvan\nPetrov\n89001234567\n\n7\n");

        let output = run_script(&path, "9\n2\nghost\n2\nivan petrov\n7\n");

        assert!(output.contains("Error: unknown command `9`"));
        assert!(output.contains("Error: record not found: Ghost"));
        assert!(output.contains("Record Ivan Petrov deleted."));
        assert!(reload(&path).is_empty());
    }

    #[test]
    fn end_of_input_flushes_and_exits() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("phonebook.json");

        let output = run_script(&path, "1\nIvan\n");

        assert!(!output.contains("Exiting."));
        assert!(path.exists(), "book is flushed even without explicit exit");
        assert!(reload(&path).is_empty());
    }
}
