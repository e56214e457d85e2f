//! Menu commands and their short codes.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// One entry of the interactive menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Add,
    Delete,
    Update,
    Search,
    ListAll,
    Age,
    Exit,
}

impl Command {
    /// Menu order.
    pub const ALL: [Command; 7] = [
        Command::Add,
        Command::Delete,
        Command::Update,
        Command::Search,
        Command::ListAll,
        Command::Age,
        Command::Exit,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Self::Add => "1",
            Self::Delete => "2",
            Self::Update => "3",
            Self::Search => "4",
            Self::ListAll => "5",
            Self::Age => "6",
            Self::Exit => "7",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Add => "Add record",
            Self::Delete => "Delete record",
            Self::Update => "Update record",
            Self::Search => "Search records",
            Self::ListAll => "Show all records",
            Self::Age => "Calculate age",
            Self::Exit => "Exit",
        }
    }

    /// Whether a successful run changes the book.
    pub fn is_mutating(self) -> bool {
        matches!(self, Self::Add | Self::Delete | Self::Update)
    }
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let code = value.trim();
        Self::ALL
            .into_iter()
            .find(|command| command.code() == code)
            .ok_or_else(|| CommandError::UnknownCommand(code.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    UnknownCommand(String),
}

impl Display for CommandError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownCommand(code) => write!(f, "unknown command `{code}`"),
        }
    }
}

impl Error for CommandError {}

#[cfg(test)]
mod tests {
    use super::{Command, CommandError};

    #[test]
    fn codes_round_trip_through_parse() {
        for command in Command::ALL {
            assert_eq!(command.code().parse::<Command>().unwrap(), command);
        }
    }

    #[test]
    fn parse_trims_input() {
        assert_eq!(" 7 ".parse::<Command>().unwrap(), Command::Exit);
    }

    #[test]
    fn unknown_code_is_rejected() {
        assert_eq!(
            "9".parse::<Command>().unwrap_err(),
            CommandError::UnknownCommand("9".to_string())
        );
        assert!("add".parse::<Command>().is_err());
    }

    #[test]
    fn only_add_delete_update_mutate() {
        let mutating: Vec<_> = Command::ALL
            .into_iter()
            .filter(|command| command.is_mutating())
            .collect();
        assert_eq!(mutating, vec![Command::Add, Command::Delete, Command::Update]);
    }
}
