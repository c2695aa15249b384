//! Help topics for the console.

const TOPICS: &[(&str, &str)] = &[
    ("EOF", "Exits the program on end-of-input."),
    ("all", "Prints string representation of all instances."),
    ("count", "Counts the instances of a class."),
    ("create", "Creates a new instance."),
    ("destroy", "Deletes an instance based on the class name and id."),
    ("help", "To get help on a command, type help <topic>."),
    ("quit", "Quit command to exit the program."),
    ("show", "Prints the string representation of an instance."),
    ("update", "Updates an instance based on the class name and id."),
];

/// One-line documentation for `topic`.
pub fn topic_doc(topic: &str) -> Option<&'static str> {
    TOPICS
        .iter()
        .find(|(name, _)| *name == topic)
        .map(|(_, doc)| *doc)
}

/// Index of documented commands printed by a bare `help`.
pub fn render_index() -> String {
    let header = "Documented commands (type help <topic>):";
    let names = TOPICS
        .iter()
        .map(|(name, _)| *name)
        .collect::<Vec<_>>()
        .join("  ");
    format!("\n{header}\n{}\n{names}\n", "=".repeat(header.len()))
}
