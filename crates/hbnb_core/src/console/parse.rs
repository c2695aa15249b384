//! Line normalization for the command console.
//!
//! # Responsibility
//! - Turn both accepted syntaxes into one `Invocation`.
//! - Tokenize space-form arguments and split dot-form argument lists.
//! - Coerce single update values to integer, float or string.
//!
//! # Invariants
//! - `Kind.verb(args)` and `verb Kind args` normalize to the same invocation.
//! - A dot-form update whose last argument is a `{...}` literal keeps that
//!   literal unsplit in `Invocation::mapping`.

use crate::model::kind::RecordKind;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static DOT_FORM_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^([A-Za-z_][A-Za-z0-9_]*)\.([A-Za-z_][A-Za-z0-9_]*)\((.*)\)$")
        .expect("valid dot form regex")
});

/// Console verbs understood after normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Create,
    Show,
    Destroy,
    All,
    Count,
    Update,
    Help,
    Quit,
    Eof,
}

impl Verb {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "create" => Some(Self::Create),
            "show" => Some(Self::Show),
            "destroy" => Some(Self::Destroy),
            "all" => Some(Self::All),
            "count" => Some(Self::Count),
            "update" => Some(Self::Update),
            "help" => Some(Self::Help),
            "quit" => Some(Self::Quit),
            "EOF" => Some(Self::Eof),
            _ => None,
        }
    }

    /// Whether the verb addresses a class and can appear in dot form or synonyms.
    pub fn is_class_scoped(self) -> bool {
        matches!(
            self,
            Self::Create | Self::Show | Self::Destroy | Self::All | Self::Count | Self::Update
        )
    }
}

/// One normalized command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    /// Blank input.
    Empty,
    /// Recognized verb with positional arguments (class tag first when given).
    Command {
        verb: Verb,
        args: Vec<String>,
        /// Raw `{...}` literal of a dot-form bulk update.
        mapping: Option<String>,
    },
    /// Input that matches no known command.
    Unknown(String),
}

impl Invocation {
    fn command(verb: Verb, args: Vec<String>) -> Self {
        Self::Command {
            verb,
            args,
            mapping: None,
        }
    }
}

/// Normalizes one input line.
pub fn normalize(line: &str) -> Invocation {
    let line = line.trim();
    if line.is_empty() {
        return Invocation::Empty;
    }

    if let Some(topic) = line.strip_prefix('?') {
        return Invocation::command(Verb::Help, tokenize(topic));
    }

    if let Some(captures) = DOT_FORM_RE.captures(line) {
        let class_tag = &captures[1];
        let verb = match Verb::from_name(&captures[2]) {
            Some(verb) if verb.is_class_scoped() => verb,
            _ => return Invocation::Unknown(line.to_string()),
        };
        return normalize_dot_form(verb, class_tag, &captures[3]);
    }

    let mut tokens = tokenize(line);
    if tokens.is_empty() {
        return Invocation::Empty;
    }
    let head = tokens.remove(0);

    if let Some(verb) = Verb::from_name(&head) {
        return Invocation::command(verb, tokens);
    }

    match split_synonym(&head) {
        Some((verb, kind)) => {
            tokens.insert(0, kind.tag().to_string());
            Invocation::command(verb, tokens)
        }
        None => Invocation::Unknown(line.to_string()),
    }
}

/// Resolves `<verb>_<kind suffix>` synonyms such as `show_user`.
fn split_synonym(head: &str) -> Option<(Verb, RecordKind)> {
    let (verb, suffix) = head.split_once('_')?;
    let verb = Verb::from_name(verb).filter(|verb| verb.is_class_scoped())?;
    let kind = RecordKind::from_command_suffix(suffix)?;
    Some((verb, kind))
}

fn normalize_dot_form(verb: Verb, class_tag: &str, inner: &str) -> Invocation {
    let inner = inner.trim();
    let mut args = vec![class_tag.to_string()];

    if verb == Verb::Update {
        if is_brace_literal(inner) {
            return Invocation::Command {
                verb,
                args,
                mapping: Some(inner.to_string()),
            };
        }
        if let Some((head, tail)) = split_first_arg(inner) {
            let tail = tail.trim();
            if is_brace_literal(tail) {
                args.push(unquote(head.trim()));
                return Invocation::Command {
                    verb,
                    args,
                    mapping: Some(tail.to_string()),
                };
            }
        }
    }

    args.extend(split_dot_args(inner));
    Invocation::command(verb, args)
}

fn is_brace_literal(text: &str) -> bool {
    text.starts_with('{') && text.ends_with('}')
}

/// Splits at the first comma that sits outside double quotes.
fn split_first_arg(text: &str) -> Option<(&str, &str)> {
    let mut in_quotes = false;
    let mut escaped = false;
    for (index, ch) in text.char_indices() {
        match ch {
            _ if escaped => escaped = false,
            '\\' if in_quotes => escaped = true,
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => return Some((&text[..index], &text[index + 1..])),
            _ => {}
        }
    }
    None
}

/// Splits a dot-form argument list on top-level commas, trimming and unquoting.
pub fn split_dot_args(inner: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut rest = inner.trim();
    if rest.is_empty() {
        return args;
    }
    while let Some((head, tail)) = split_first_arg(rest) {
        args.push(unquote(head.trim()));
        rest = tail;
    }
    args.push(unquote(rest.trim()));
    args
}

/// Strips one pair of surrounding double quotes and unescapes `\"` and `\\`.
pub fn unquote(text: &str) -> String {
    let quoted = text.len() >= 2 && text.starts_with('"') && text.ends_with('"');
    if !quoted {
        return text.to_string();
    }

    let mut unescaped = String::with_capacity(text.len());
    let mut chars = text[1..text.len() - 1].chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            match chars.next() {
                Some(next @ ('"' | '\\')) => unescaped.push(next),
                Some(next) => {
                    unescaped.push('\\');
                    unescaped.push(next);
                }
                None => unescaped.push('\\'),
            }
        } else {
            unescaped.push(ch);
        }
    }
    unescaped
}

/// Shell-like split: whitespace separates tokens, double quotes group, and a
/// backslash escapes the next character (inside quotes only `"` and `\`).
pub fn tokenize(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
                in_token = true;
            }
            '\\' if in_quotes => match chars.peek() {
                Some(&next @ ('"' | '\\')) => {
                    current.push(next);
                    chars.next();
                }
                _ => current.push('\\'),
            },
            '\\' => {
                if let Some(next) = chars.next() {
                    current.push(next);
                }
                in_token = true;
            }
            ch if ch.is_whitespace() && !in_quotes => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            ch => {
                current.push(ch);
                in_token = true;
            }
        }
    }
    if in_token {
        tokens.push(current);
    }
    tokens
}

/// Coerces an update value: integer first, then finite float, else string.
///
/// Integer literals wider than 64 bits stay exact as strings.
pub fn coerce_value(text: &str) -> Value {
    if let Ok(number) = text.parse::<i64>() {
        return Value::from(number);
    }
    if let Ok(number) = text.parse::<u64>() {
        return Value::from(number);
    }
    if is_integer_literal(text) {
        return Value::from(text);
    }
    match text.parse::<f64>() {
        Ok(number) if number.is_finite() => Value::from(number),
        _ => Value::from(text),
    }
}

fn is_integer_literal(text: &str) -> bool {
    let digits = text.strip_prefix(&['+', '-'][..]).unwrap_or(text);
    !digits.is_empty() && digits.bytes().all(|byte| byte.is_ascii_digit())
}
