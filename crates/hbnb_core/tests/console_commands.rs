use hbnb_core::{Console, FileStorage, Flow, RecordKind, RecordStore};
use serde_json::{json, Value};
use tempfile::TempDir;

fn console_in(dir: &TempDir) -> Console<FileStorage> {
    Console::new(FileStorage::open(dir.path().join("file.json")))
}

fn run(console: &mut Console<FileStorage>, line: &str) -> String {
    let mut out = Vec::new();
    let flow = console.onecmd(line, &mut out).unwrap();
    assert_eq!(flow, Flow::Continue, "unexpected exit on `{line}`");
    String::from_utf8(out).unwrap()
}

fn create(console: &mut Console<FileStorage>, tag: &str) -> String {
    run(console, &format!("create {tag}")).trim().to_string()
}

fn field(console: &Console<FileStorage>, kind: RecordKind, id: &str, name: &str) -> Option<Value> {
    console
        .service()
        .get(kind, id)
        .unwrap()
        .field(name)
        .cloned()
}

#[test]
fn create_emits_id_present_in_registry_for_every_kind() {
    let dir = tempfile::tempdir().unwrap();
    let mut console = console_in(&dir);

    for kind in RecordKind::ALL {
        let id = create(&mut console, kind.tag());
        assert!(console
            .store()
            .all()
            .contains_key(&format!("{}.{id}", kind.tag())));
    }
    assert!(dir.path().join("file.json").exists());
}

#[test]
fn fresh_ids_are_distinct() {
    let dir = tempfile::tempdir().unwrap();
    let mut console = console_in(&dir);

    let first = create(&mut console, "User");
    let second = create(&mut console, "User");
    assert_ne!(first, second);
}

#[test]
fn validation_errors_follow_fixed_order() {
    let dir = tempfile::tempdir().unwrap();
    let mut console = console_in(&dir);
    let id = create(&mut console, "City");

    assert_eq!(run(&mut console, "create"), "** class name missing **\n");
    assert_eq!(run(&mut console, "create MyModel"), "** class doesn't exist **\n");
    assert_eq!(run(&mut console, "show"), "** class name missing **\n");
    assert_eq!(run(&mut console, "show Ghost 1"), "** class doesn't exist **\n");
    assert_eq!(run(&mut console, "show City"), "** instance id missing **\n");
    assert_eq!(run(&mut console, "show City 1234"), "** no instance found **\n");
    assert_eq!(
        run(&mut console, &format!("show User {id}")),
        "** no instance found **\n"
    );
    assert_eq!(run(&mut console, "destroy City"), "** instance id missing **\n");
    assert_eq!(
        run(&mut console, &format!("update City {id}")),
        "** attribute name missing **\n"
    );
    assert_eq!(
        run(&mut console, &format!("update City {id} name")),
        "** value missing **\n"
    );
    assert_eq!(run(&mut console, "count"), "** class name missing **\n");
    assert_eq!(run(&mut console, "all Ghost"), "** class doesn't exist **\n");
}

#[test]
fn input_errors_do_not_touch_backing_file() {
    let dir = tempfile::tempdir().unwrap();
    let mut console = console_in(&dir);

    run(&mut console, "create Ghost");
    run(&mut console, "destroy BaseModel missing-id");
    run(&mut console, "update BaseModel missing-id name x");
    assert!(!dir.path().join("file.json").exists());
}

#[test]
fn show_renders_kind_id_and_fields() {
    let dir = tempfile::tempdir().unwrap();
    let mut console = console_in(&dir);
    let id = create(&mut console, "BaseModel");
    run(&mut console, &format!("update BaseModel {id} eyes blue"));

    let output = run(&mut console, &format!("show BaseModel {id}"));
    let record = console.service().get(RecordKind::BaseModel, &id).unwrap();
    assert_eq!(output.trim(), record.to_string());
    assert!(output.starts_with(&format!("[BaseModel] ({id}) {{")));
    assert!(output.contains("\"eyes\": \"blue\""));
}

#[test]
fn update_coerces_integers_floats_and_quoted_strings() {
    let dir = tempfile::tempdir().unwrap();
    let mut console = console_in(&dir);
    let id = create(&mut console, "User");

    run(&mut console, &format!("update User {id} age 25"));
    run(&mut console, &format!("update User {id} savings 35.89"));
    run(&mut console, &format!("update User {id} name \"Ife\""));
    run(&mut console, &format!("update User {id} motto \"say \\\"hi\\\"\""));
    run(&mut console, &format!("update User {id} n 99999999999999999999999"));

    assert_eq!(field(&console, RecordKind::User, &id, "age"), Some(json!(25)));
    assert_eq!(
        field(&console, RecordKind::User, &id, "savings"),
        Some(json!(35.89))
    );
    assert_eq!(
        field(&console, RecordKind::User, &id, "name"),
        Some(json!("Ife"))
    );
    assert_eq!(
        field(&console, RecordKind::User, &id, "motto"),
        Some(json!("say \"hi\""))
    );
    assert_eq!(
        field(&console, RecordKind::User, &id, "n"),
        Some(json!("99999999999999999999999"))
    );
}

#[test]
fn update_ignores_tokens_past_first_pair() {
    let dir = tempfile::tempdir().unwrap();
    let mut console = console_in(&dir);
    let id = create(&mut console, "Review");

    run(&mut console, &format!("update Review {id} age 10 color \"blue\""));

    assert_eq!(field(&console, RecordKind::Review, &id, "age"), Some(json!(10)));
    assert_eq!(field(&console, RecordKind::Review, &id, "color"), None);
}

#[test]
fn update_silently_skips_protected_fields() {
    let dir = tempfile::tempdir().unwrap();
    let mut console = console_in(&dir);
    let id = create(&mut console, "State");
    let before = console
        .service()
        .get(RecordKind::State, &id)
        .unwrap()
        .clone();

    assert_eq!(run(&mut console, &format!("update State {id} id other")), "");
    assert_eq!(
        run(&mut console, &format!("update State {id} created_at 2000")),
        ""
    );
    assert_eq!(
        run(&mut console, &format!("update State {id} __class__ City")),
        ""
    );

    assert_eq!(console.service().get(RecordKind::State, &id), Some(&before));
}

#[test]
fn update_refreshes_updated_at_and_persists() {
    let dir = tempfile::tempdir().unwrap();
    let mut console = console_in(&dir);
    let id = create(&mut console, "Place");
    let before = console
        .service()
        .get(RecordKind::Place, &id)
        .unwrap()
        .updated_at();

    run(&mut console, &format!("update Place {id} max_guest 6"));

    let record = console.service().get(RecordKind::Place, &id).unwrap();
    assert!(record.updated_at() > before);
    let persisted: Value =
        serde_json::from_str(&std::fs::read_to_string(dir.path().join("file.json")).unwrap())
            .unwrap();
    assert_eq!(persisted[format!("Place.{id}")]["max_guest"], json!(6));
}

#[test]
fn destroy_removes_record_from_registry_and_file() {
    let dir = tempfile::tempdir().unwrap();
    let mut console = console_in(&dir);
    let id = create(&mut console, "Amenity");
    let key = format!("Amenity.{id}");

    assert_eq!(run(&mut console, &format!("destroy Amenity {id}")), "");

    assert!(!console.store().all().contains_key(&key));
    let persisted: Value =
        serde_json::from_str(&std::fs::read_to_string(dir.path().join("file.json")).unwrap())
            .unwrap();
    assert!(persisted.get(&key).is_none());
    assert_eq!(
        run(&mut console, &format!("show Amenity {id}")),
        "** no instance found **\n"
    );
}

#[test]
fn destroy_does_not_cascade_to_referencing_records() {
    let dir = tempfile::tempdir().unwrap();
    let mut console = console_in(&dir);
    let state_id = create(&mut console, "State");
    let city_id = create(&mut console, "City");
    run(&mut console, &format!("update City {city_id} state_id \"{state_id}\""));

    run(&mut console, &format!("destroy State {state_id}"));

    assert_eq!(
        field(&console, RecordKind::City, &city_id, "state_id"),
        Some(json!(state_id))
    );
}

#[test]
fn all_lists_renderings_filtered_by_kind() {
    let dir = tempfile::tempdir().unwrap();
    let mut console = console_in(&dir);
    assert_eq!(run(&mut console, "all"), "[]\n");

    create(&mut console, "User");
    create(&mut console, "User");
    create(&mut console, "City");

    let users: Vec<String> = serde_json::from_str(&run(&mut console, "all User")).unwrap();
    assert_eq!(users.len(), 2);
    for item in &users {
        assert_eq!(item.split_whitespace().next(), Some("[User]"));
    }

    let everything: Vec<String> = serde_json::from_str(&run(&mut console, "all")).unwrap();
    assert_eq!(everything.len(), 3);
}

#[test]
fn count_matches_registry_prefix() {
    let dir = tempfile::tempdir().unwrap();
    let mut console = console_in(&dir);
    create(&mut console, "Review");
    create(&mut console, "Review");
    create(&mut console, "Place");

    let expected = console
        .store()
        .all()
        .keys()
        .filter(|key| key.starts_with("Review."))
        .count();
    assert_eq!(run(&mut console, "count Review").trim(), expected.to_string());
    assert_eq!(run(&mut console, "count User"), "0\n");
}

#[test]
fn class_scoped_synonyms_dispatch_like_verbs() {
    let dir = tempfile::tempdir().unwrap();
    let mut console = console_in(&dir);

    let id = run(&mut console, "create_state").trim().to_string();
    assert!(console.store().all().contains_key(&format!("State.{id}")));

    run(&mut console, &format!("update_state {id} name \"Lagos\""));
    assert_eq!(
        field(&console, RecordKind::State, &id, "name"),
        Some(json!("Lagos"))
    );
    assert!(run(&mut console, &format!("show_state {id}")).contains("\"name\": \"Lagos\""));
    assert_eq!(run(&mut console, "count_state"), "1\n");

    let states: Vec<String> = serde_json::from_str(&run(&mut console, "all_state")).unwrap();
    assert_eq!(states.len(), 1);

    run(&mut console, &format!("destroy_state {id}"));
    assert_eq!(run(&mut console, "count_state"), "0\n");
}

#[test]
fn unknown_commands_report_syntax() {
    let dir = tempfile::tempdir().unwrap();
    let mut console = console_in(&dir);

    assert_eq!(
        run(&mut console, "fly BaseModel"),
        "*** Unknown syntax: fly BaseModel\n"
    );
    assert_eq!(run(&mut console, "   "), "");
}

#[test]
fn help_lists_documented_commands() {
    let dir = tempfile::tempdir().unwrap();
    let mut console = console_in(&dir);

    let index = run(&mut console, "help");
    assert!(index.contains("Documented commands (type help <topic>):"));
    assert_eq!(run(&mut console, "help create").trim(), "Creates a new instance.");
    assert_eq!(
        run(&mut console, "? all").trim(),
        "Prints string representation of all instances."
    );
    assert_eq!(
        run(&mut console, "help help").trim(),
        "To get help on a command, type help <topic>."
    );
}

#[test]
fn quit_and_end_of_input_exit() {
    let dir = tempfile::tempdir().unwrap();
    let mut console = console_in(&dir);

    let mut out = Vec::new();
    assert_eq!(console.onecmd("quit", &mut out).unwrap(), Flow::Exit);
    assert!(out.is_empty());

    assert_eq!(console.end_of_input(&mut out).unwrap(), Flow::Exit);
    assert_eq!(out, b"\n");
}
