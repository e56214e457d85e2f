use phonebook_core::{
    BookError, ContactBook, ContactRepository, JsonFileRepository, NewContact, RepoError,
};
use serde_json::json;
use std::fs;

fn sample_book() -> ContactBook {
    let mut book = ContactBook::new();
    for (first, last, phone, birth_date) in [
        ("Zoe", "Adams", "89001234567", "15.03.1990"),
        ("Иван", "Петров", "+79007654321", ""),
        ("Anna", "Brown", "81112223344", "29.02.2020"),
    ] {
        book.add(&NewContact {
            first_name: first.to_string(),
            last_name: last.to_string(),
            phone: phone.to_string(),
            birth_date: birth_date.to_string(),
        })
        .unwrap();
    }
    book
}

#[test]
fn missing_file_loads_as_empty_book() {
    let dir = tempfile::tempdir().unwrap();
    let repo = JsonFileRepository::new(dir.path().join("phonebook.json"));

    let book = repo.load().unwrap();
    assert!(book.is_empty());
}

#[test]
fn save_then_load_reproduces_identical_book() {
    let dir = tempfile::tempdir().unwrap();
    let repo = JsonFileRepository::new(dir.path().join("phonebook.json"));
    let book = sample_book();

    repo.save(&book).unwrap();
    let loaded = repo.load().unwrap();

    assert_eq!(loaded, book);
    let ids: Vec<_> = loaded.iter().map(|entry| entry.identifier).collect();
    assert_eq!(ids, vec!["Zoe Adams", "Иван Петров", "Anna Brown"]);
}

#[test]
fn saved_document_uses_expected_wire_fields() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("phonebook.json");
    let repo = JsonFileRepository::new(&path);

    repo.save(&sample_book()).unwrap();
    let text = fs::read_to_string(&path).unwrap();

    assert!(text.contains("Иван Петров"), "non-ASCII must stay literal");
    assert!(text.starts_with("{\n    \"Zoe Adams\": {\n        \"phone\": \"89001234567\""));

    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(
        value["Иван Петров"],
        json!({ "phone": "89007654321", "birth_date": "" })
    );
}

#[test]
fn save_overwrites_previous_content() {
    let dir = tempfile::tempdir().unwrap();
    let repo = JsonFileRepository::new(dir.path().join("phonebook.json"));

    let mut book = sample_book();
    repo.save(&book).unwrap();
    book.remove("Zoe Adams").unwrap();
    book.remove("Anna Brown").unwrap();
    repo.save(&book).unwrap();

    let loaded = repo.load().unwrap();
    assert_eq!(loaded.len(), 1);
    assert!(loaded.contains("Иван Петров"));
}

#[test]
fn malformed_json_is_reported_as_json_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("phonebook.json");
    fs::write(&path, "{ not json").unwrap();

    let err = JsonFileRepository::new(&path).load().unwrap_err();
    assert!(matches!(err, RepoError::Json { .. }), "unexpected error: {err}");
}

#[test]
fn invalid_persisted_phone_is_rejected_on_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("phonebook.json");
    let document = json!({
        "Ivan Petrov": { "phone": "123", "birth_date": "" }
    });
    fs::write(&path, document.to_string()).unwrap();

    let err = JsonFileRepository::new(&path).load().unwrap_err();
    match err {
        RepoError::InvalidData { identifier, reason } => {
            assert_eq!(identifier, "Ivan Petrov");
            assert_eq!(reason, BookError::InvalidPhone("123".to_string()));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn unnormalized_persisted_phone_is_rejected_on_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("phonebook.json");
    let document = json!({
        "Ivan Petrov": { "phone": "+79001234567", "birth_date": "" }
    });
    fs::write(&path, document.to_string()).unwrap();

    let err = JsonFileRepository::new(&path).load().unwrap_err();
    match err {
        RepoError::InvalidData { identifier, reason } => {
            assert_eq!(identifier, "Ivan Petrov");
            assert_eq!(reason, BookError::InvalidPhone("+79001234567".to_string()));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn invalid_persisted_identifier_is_rejected_on_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("phonebook.json");
    let document = json!({
        "ivan petrov": { "phone": "89001234567", "birth_date": "01.01.2000" }
    });
    fs::write(&path, document.to_string()).unwrap();

    let err = JsonFileRepository::new(&path).load().unwrap_err();
    assert!(
        err.to_string()
            .contains("invalid persisted contact `ivan petrov`"),
        "unexpected error: {err}"
    );
}

#[test]
fn unreadable_path_is_reported_as_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let repo = JsonFileRepository::new(dir.path());

    let err = repo.load().unwrap_err();
    assert!(matches!(err, RepoError::Io { .. }), "unexpected error: {err}");
}
