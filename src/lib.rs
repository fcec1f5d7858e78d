#![allow(clippy::module_inception)]

use std::{
    env, fmt,
    io::BufRead,
    panic,
    sync::Arc,
    thread,
    time::Instant,
};

use tracing::{debug, info, warn};

use crate::{
    errors::errors::{Error, ErrorImpl, ErrorTip},
    interpreter::interpreter::Interpreter,
    lexer::lexer::tokenize,
    parser::parser::parse,
    registry::inheritance::build_registry,
    runtime::value::Value,
    type_checker::type_checker::type_check,
};

pub mod ast;
pub mod errors;
pub mod interpreter;
pub mod lexer;
pub mod macros;
pub mod parser;
pub mod registry;
pub mod runtime;
pub mod type_checker;

extern crate regex;

pub const UNKNOWN_SOURCE: &str = "<unknown>";

/// A 1-based line and column in a named source. Line 0 means unknown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    pub line: u32,
    pub column: u32,
    pub file: Arc<String>,
}

impl Position {
    pub fn new(line: u32, column: u32, file: Arc<String>) -> Self {
        Position { line, column, file }
    }

    pub fn null() -> Self {
        Position::new(0, 0, Arc::new(String::from(UNKNOWN_SOURCE)))
    }

    pub fn is_null(&self) -> bool {
        self.line == 0
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            write!(f, "{}", UNKNOWN_SOURCE)
        } else {
            write!(f, "{}:{}:{}", self.file, self.line, self.column)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn null() -> Self {
        Span {
            start: Position::null(),
            end: Position::null(),
        }
    }
}

/// Limits and naming for one run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Name used in diagnostics.
    pub source_name: String,
    /// Nested user method calls allowed before `CallDepthExceeded`.
    pub max_call_depth: usize,
    /// Nested object constructions allowed before `ConstructionDepthExceeded`.
    pub max_construction_depth: usize,
    /// Stack of the thread the pipeline runs on. Sized so `max_call_depth`
    /// is reached before the host stack runs out.
    pub stack_size: usize,
}

impl Default for RunOptions {
    fn default() -> Self {
        RunOptions {
            source_name: String::from(UNKNOWN_SOURCE),
            max_call_depth: 10_000,
            max_construction_depth: 500,
            stack_size: 512 * 1024 * 1024,
        }
    }
}

impl RunOptions {
    /// Defaults overridden by `COOL_MAX_CALL_DEPTH`,
    /// `COOL_MAX_CONSTRUCTION_DEPTH` and `COOL_STACK_SIZE` (bytes).
    pub fn from_env() -> Self {
        let defaults = RunOptions::default();

        RunOptions {
            max_call_depth: env_limit("COOL_MAX_CALL_DEPTH", defaults.max_call_depth),
            max_construction_depth: env_limit("COOL_MAX_CONSTRUCTION_DEPTH", defaults.max_construction_depth),
            stack_size: env_limit("COOL_STACK_SIZE", defaults.stack_size),
            ..defaults
        }
    }

    pub fn with_source_name(mut self, name: impl Into<String>) -> Self {
        self.source_name = name.into();
        self
    }
}

fn env_limit(name: &str, default: usize) -> usize {
    match env::var(name) {
        Ok(value) => match value.trim().parse() {
            Ok(limit) => limit,
            Err(_) => {
                warn!(variable = name, value = %value, "ignoring invalid limit");
                default
            }
        },
        Err(_) => default,
    }
}

/// What `main` returned, detached from the interpreter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReturnValue {
    Int(i64),
    Str(String),
    Bool(bool),
    Void,
    Object { class: String },
}

impl From<&Value> for ReturnValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Int(value) => ReturnValue::Int(*value),
            Value::Str(value) => ReturnValue::Str(value.clone()),
            Value::Bool(value) => ReturnValue::Bool(*value),
            Value::Void => ReturnValue::Void,
            Value::Instance(instance) => ReturnValue::Object {
                class: instance.borrow().class.name.clone(),
            },
        }
    }
}

impl fmt::Display for ReturnValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReturnValue::Int(value) => write!(f, "{}", value),
            ReturnValue::Str(value) => write!(f, "{:?}", value),
            ReturnValue::Bool(value) => write!(f, "{}", value),
            ReturnValue::Void => write!(f, "void"),
            ReturnValue::Object { class } => write!(f, "<{}>", class),
        }
    }
}

#[derive(Debug)]
pub struct RunResult {
    pub success: bool,
    /// Everything written by `out_string`/`out_int`, up to a runtime error.
    pub output: String,
    /// Every diagnostic, warnings included.
    pub diagnostics: Vec<Error>,
    /// `main`'s result; only set on success.
    pub value: Option<ReturnValue>,
}

impl RunResult {
    fn failed(diagnostics: Vec<Error>, output: String) -> Self {
        RunResult {
            success: false,
            output,
            diagnostics,
            value: None,
        }
    }

    /// Diagnostics that failed the run.
    pub fn errors(&self) -> impl Iterator<Item = &Error> {
        self.diagnostics.iter().filter(|error| error.is_fatal())
    }

    /// Stable codes of all diagnostics, in report order.
    pub fn codes(&self) -> Vec<&str> {
        self.diagnostics.iter().map(|error| error.get_error_name()).collect()
    }
}

/// Runs `source` with default options and no input.
pub fn interpret(source: &str, name: Option<&str>) -> RunResult {
    let options = RunOptions::default().with_source_name(name.unwrap_or(UNKNOWN_SOURCE));
    run_program(source, &options, &mut std::io::empty())
}

/// Lexes, parses, validates, type checks and, if all of that succeeded,
/// evaluates `source`. `input` feeds `in_string` and `in_int`.
///
/// The pipeline runs on a scoped thread with `options.stack_size` bytes of
/// stack, so deep recursion ends in `CallDepthExceeded` rather than a host
/// stack overflow.
pub fn run_program(source: &str, options: &RunOptions, input: &mut (dyn BufRead + Send)) -> RunResult {
    let joined = thread::scope(|scope| {
        thread::Builder::new()
            .name(String::from("interpreter"))
            .stack_size(options.stack_size)
            .spawn_scoped(scope, move || run_pipeline(source, options, input))
            .map(|handle| handle.join())
    });

    match joined {
        Ok(Ok(result)) => result,
        Ok(Err(payload)) => panic::resume_unwind(payload),
        Err(err) => {
            let error = Error::new(
                ErrorImpl::Internal {
                    message: format!("failed to start the interpreter thread: {}", err),
                },
                Position::null(),
            );
            RunResult::failed(vec![error], String::new())
        }
    }
}

fn run_pipeline(source: &str, options: &RunOptions, input: &mut dyn BufRead) -> RunResult {
    let start = Instant::now();
    let file = Arc::new(options.source_name.clone());

    let tokens = match tokenize(source.to_string(), Some(options.source_name.clone())) {
        Ok(tokens) => tokens,
        Err(error) => return RunResult::failed(vec![error], String::new()),
    };
    debug!(tokens = tokens.len(), elapsed = ?start.elapsed(), "tokenized");

    let parse_start = Instant::now();
    let program = match parse(tokens, file) {
        Ok(program) => program,
        Err(error) => return RunResult::failed(vec![error], String::new()),
    };
    debug!(classes = program.classes.len(), elapsed = ?parse_start.elapsed(), "parsed");

    let validate_start = Instant::now();
    let (registry, errors) = build_registry(&program);
    debug!(errors = errors.len(), elapsed = ?validate_start.elapsed(), "validated class graph");
    if errors.iter().any(Error::is_fatal) {
        return RunResult::failed(errors, String::new());
    }

    let check_start = Instant::now();
    let mut diagnostics = errors;
    diagnostics.extend(type_check(&registry));
    debug!(diagnostics = diagnostics.len(), elapsed = ?check_start.elapsed(), "type checked");
    if diagnostics.iter().any(Error::is_fatal) {
        return RunResult::failed(diagnostics, String::new());
    }

    let eval_start = Instant::now();
    let mut interpreter = match Interpreter::new(&registry, options, input) {
        Ok(interpreter) => interpreter,
        Err(error) => {
            diagnostics.push(error);
            return RunResult::failed(diagnostics, String::new());
        }
    };

    let result = interpreter.run();
    let output = interpreter.into_output();
    debug!(elapsed = ?eval_start.elapsed(), "evaluated");

    match result {
        Ok(value) => {
            info!(elapsed = ?start.elapsed(), "run finished");
            RunResult {
                success: true,
                output,
                diagnostics,
                value: Some(ReturnValue::from(&value)),
            }
        }
        Err(error) => {
            info!(code = error.get_error_name(), "run failed");
            diagnostics.push(error);
            RunResult::failed(diagnostics, output)
        }
    }
}

/// The text of 1-based `line` in `source`, without its terminator.
pub fn get_line_at_position(source: &str, line: u32) -> Option<&str> {
    let index = (line as usize).checked_sub(1)?;
    source.lines().nth(index)
}

/// Renders `error` with the offending source line and a caret:
///
/// ```text
/// error[DivisionByZero]: division by zero
/// -> main.cl:2:5
///   |
/// 2 | 10 / 0
///   | ---^
/// ```
pub fn display_error(error: &Error, source: &str) -> String {
    let mut rendered = format!("{}[{}]: {}\n", error.get_severity(), error.get_error_name(), error.message());

    let position = error.get_position();
    if let Some(line_text) = get_line_at_position(source, position.line) {
        let line_string = position.line.to_string();
        let padding = line_string.len() + 2;

        let (line_text_removed, removed_whitespace) = remove_starting_whitespace(line_text);
        let arrows = (position.column as usize).saturating_sub(removed_whitespace).max(1);

        rendered.push_str(&format!("-> {}\n", position));
        rendered.push_str(&format!("{:>padding$}\n", "|"));
        rendered.push_str(&format!("{} | {}\n", line_string, line_text_removed.trim_end()));
        rendered.push_str(&format!("{:>padding$} {:->arrows$}\n", "|", "^"));
    } else if !position.is_null() {
        rendered.push_str(&format!("-> {}\n", position));
    }

    if let ErrorTip::Suggestion(tip) = error.get_tip() {
        rendered.push_str(&format!("= tip: {}\n", tip));
    }

    rendered
}

fn remove_starting_whitespace(string: &str) -> (&str, usize) {
    let trimmed = string.trim_start_matches(&[' ', '\t'][..]);
    (trimmed, string.len() - trimmed.len())
}
