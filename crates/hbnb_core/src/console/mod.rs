//! Line-oriented command console over the record service.
//!
//! # Responsibility
//! - Normalize each input line (`verb Kind args` or `Kind.verb(args)`).
//! - Validate arguments in a fixed order and report input errors as text.
//! - Dispatch to `RecordService` and format the textual result.
//!
//! # Invariants
//! - Input errors print one line and leave the registry and backing file untouched.
//! - Storage and output failures are returned to the caller, never printed.
//! - The console keeps no state between lines besides the owned store.

mod help;
pub mod parse;

use crate::model::kind::RecordKind;
use crate::service::record_service::{RecordService, RecordServiceError};
use crate::store::{RecordStore, StoreError};
use log::debug;
use parse::{coerce_value, normalize, Invocation, Verb};
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::Write;

/// Prompt printed by interactive shells before each line.
pub const PROMPT: &str = "(hbnb) ";

/// Whether the shell loop should keep reading lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// User input error; `Display` is the exact line shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    ClassNameMissing,
    ClassDoesNotExist,
    InstanceIdMissing,
    NoInstanceFound,
    AttributeNameMissing,
    ValueMissing,
    MalformedMapping,
}

impl Display for CommandError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let message = match self {
            Self::ClassNameMissing => "class name missing",
            Self::ClassDoesNotExist => "class doesn't exist",
            Self::InstanceIdMissing => "instance id missing",
            Self::NoInstanceFound => "no instance found",
            Self::AttributeNameMissing => "attribute name missing",
            Self::ValueMissing => "value missing",
            Self::MalformedMapping => "malformed attribute mapping",
        };
        write!(f, "** {message} **")
    }
}

impl Error for CommandError {}

impl CommandError {
    fn code(&self) -> &'static str {
        match self {
            Self::ClassNameMissing => "class_name_missing",
            Self::ClassDoesNotExist => "class_unknown",
            Self::InstanceIdMissing => "instance_id_missing",
            Self::NoInstanceFound => "instance_not_found",
            Self::AttributeNameMissing => "attribute_name_missing",
            Self::ValueMissing => "value_missing",
            Self::MalformedMapping => "mapping_malformed",
        }
    }
}

pub type ConsoleResult<T> = Result<T, ConsoleError>;

/// Failure that aborts the session instead of being printed.
#[derive(Debug)]
pub enum ConsoleError {
    /// Writing to the output stream failed.
    Output(std::io::Error),
    /// Result could not be encoded for output.
    Encode(serde_json::Error),
    /// The backing file could not be written.
    Store(StoreError),
}

impl Display for ConsoleError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Output(err) => write!(f, "failed to write console output: {err}"),
            Self::Encode(err) => write!(f, "failed to encode console output: {err}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ConsoleError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Output(err) => Some(err),
            Self::Encode(err) => Some(err),
            Self::Store(err) => Some(err),
        }
    }
}

/// Handler outcome: printable input error or fatal console error.
enum Failure {
    Input(CommandError),
    Fatal(ConsoleError),
}

impl From<CommandError> for Failure {
    fn from(value: CommandError) -> Self {
        Self::Input(value)
    }
}

impl From<std::io::Error> for Failure {
    fn from(value: std::io::Error) -> Self {
        Self::Fatal(ConsoleError::Output(value))
    }
}

impl From<serde_json::Error> for Failure {
    fn from(value: serde_json::Error) -> Self {
        Self::Fatal(ConsoleError::Encode(value))
    }
}

impl From<RecordServiceError> for Failure {
    fn from(value: RecordServiceError) -> Self {
        match value {
            RecordServiceError::NotFound(_) => Self::Input(CommandError::NoInstanceFound),
            RecordServiceError::Store(err) => Self::Fatal(ConsoleError::Store(err)),
        }
    }
}

type HandlerResult = Result<(), Failure>;

/// Command interpreter bound to one storage engine.
pub struct Console<S: RecordStore> {
    service: RecordService<S>,
}

impl<S: RecordStore> Console<S> {
    pub fn new(store: S) -> Self {
        Self {
            service: RecordService::new(store),
        }
    }

    pub fn service(&self) -> &RecordService<S> {
        &self.service
    }

    pub fn store(&self) -> &S {
        self.service.store()
    }

    /// Interprets one input line, writing any result or input error to `out`.
    pub fn onecmd<W: Write>(&mut self, line: &str, out: &mut W) -> ConsoleResult<Flow> {
        let (verb, args, mapping) = match normalize(line) {
            Invocation::Empty => return Ok(Flow::Continue),
            Invocation::Unknown(line) => {
                debug!("event=command_dispatch module=console status=unknown_syntax");
                writeln!(out, "*** Unknown syntax: {line}").map_err(ConsoleError::Output)?;
                return Ok(Flow::Continue);
            }
            Invocation::Command {
                verb,
                args,
                mapping,
            } => (verb, args, mapping),
        };

        let result = match verb {
            Verb::Quit => return Ok(Flow::Exit),
            Verb::Eof => return self.end_of_input(out),
            Verb::Help => self.do_help(&args, out),
            Verb::Create => self.do_create(&args, out),
            Verb::Show => self.do_show(&args, out),
            Verb::Destroy => self.do_destroy(&args),
            Verb::All => self.do_all(&args, out),
            Verb::Count => self.do_count(&args, out),
            Verb::Update => self.do_update(&args, mapping.as_deref()),
        };

        match result {
            Ok(()) => {
                debug!("event=command_dispatch module=console verb={verb:?} status=ok");
                Ok(Flow::Continue)
            }
            Err(Failure::Input(err)) => {
                debug!(
                    "event=command_dispatch module=console verb={verb:?} status=rejected error_code={}",
                    err.code()
                );
                writeln!(out, "{err}").map_err(ConsoleError::Output)?;
                Ok(Flow::Continue)
            }
            Err(Failure::Fatal(err)) => Err(err),
        }
    }

    /// Handles end-of-input: emits the trailing newline and ends the session.
    pub fn end_of_input<W: Write>(&mut self, out: &mut W) -> ConsoleResult<Flow> {
        writeln!(out).map_err(ConsoleError::Output)?;
        Ok(Flow::Exit)
    }

    fn do_help<W: Write>(&self, args: &[String], out: &mut W) -> HandlerResult {
        match args.first() {
            None => write!(out, "{}", help::render_index())?,
            Some(topic) => match help::topic_doc(topic) {
                Some(doc) => writeln!(out, "{doc}")?,
                None => writeln!(out, "*** No help on {topic}")?,
            },
        }
        Ok(())
    }

    fn do_create<W: Write>(&mut self, args: &[String], out: &mut W) -> HandlerResult {
        let kind = required_kind(args)?;
        let id = self.service.create(kind)?;
        writeln!(out, "{id}")?;
        Ok(())
    }

    fn do_show<W: Write>(&self, args: &[String], out: &mut W) -> HandlerResult {
        let (kind, id) = self.resolve_instance(args)?;
        let record = self
            .service
            .get(kind, id)
            .ok_or(CommandError::NoInstanceFound)?;
        writeln!(out, "{record}")?;
        Ok(())
    }

    fn do_destroy(&mut self, args: &[String]) -> HandlerResult {
        let (kind, id) = self.resolve_instance(args)?;
        self.service.destroy(kind, id)?;
        Ok(())
    }

    fn do_all<W: Write>(&self, args: &[String], out: &mut W) -> HandlerResult {
        let kind = match args.first() {
            Some(tag) => Some(RecordKind::from_tag(tag).ok_or(CommandError::ClassDoesNotExist)?),
            None => None,
        };
        let rendered = self
            .service
            .list(kind)
            .into_iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>();
        writeln!(out, "{}", serde_json::to_string(&rendered)?)?;
        Ok(())
    }

    fn do_count<W: Write>(&self, args: &[String], out: &mut W) -> HandlerResult {
        let kind = required_kind(args)?;
        writeln!(out, "{}", self.service.count(kind))?;
        Ok(())
    }

    fn do_update(&mut self, args: &[String], mapping: Option<&str>) -> HandlerResult {
        let (kind, id) = self.resolve_instance(args)?;

        if let Some(literal) = mapping {
            let fields = serde_json::from_str::<Map<String, Value>>(literal)
                .map_err(|_| CommandError::MalformedMapping)?;
            self.service.update_fields(kind, id, fields)?;
            return Ok(());
        }

        // Tokens past the first name/value pair are ignored.
        let name = args.get(2).ok_or(CommandError::AttributeNameMissing)?;
        let value = args.get(3).ok_or(CommandError::ValueMissing)?;
        self.service
            .update_field(kind, id, name, coerce_value(value))?;
        Ok(())
    }

    /// Validates `Kind id` arguments and confirms the record exists.
    fn resolve_instance<'a>(
        &self,
        args: &'a [String],
    ) -> Result<(RecordKind, &'a str), CommandError> {
        let kind = required_kind(args)?;
        let id = args.get(1).ok_or(CommandError::InstanceIdMissing)?;
        if self.service.get(kind, id).is_none() {
            return Err(CommandError::NoInstanceFound);
        }
        Ok((kind, id.as_str()))
    }
}

fn required_kind(args: &[String]) -> Result<RecordKind, CommandError> {
    let tag = args.first().ok_or(CommandError::ClassNameMissing)?;
    RecordKind::from_tag(tag).ok_or(CommandError::ClassDoesNotExist)
}
