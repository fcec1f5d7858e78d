//! Native bodies of the built-in methods of `Object`, `IO` and `String`.

use crate::{
    ast::expressions::Builtin,
    errors::errors::{Error, ErrorImpl},
    runtime::value::Value,
    Position,
};

use super::interpreter::{internal, Interpreter};

pub(super) fn call_builtin(
    interpreter: &mut Interpreter<'_>,
    builtin: Builtin,
    receiver: Value,
    arguments: Vec<Value>,
    position: &Position,
) -> Result<Value, Error> {
    match (builtin, receiver, arguments.as_slice()) {
        (Builtin::Abort, receiver, []) => Err(Error::new(
            ErrorImpl::Abort {
                class: receiver.class_name().unwrap_or_default(),
            },
            position.clone(),
        )),
        (Builtin::TypeName, receiver, []) => Ok(Value::Str(receiver.class_name().unwrap_or_default())),
        (Builtin::Copy, receiver, []) => Ok(receiver.shallow_copy()),

        (Builtin::OutString, receiver, [Value::Str(text)]) => {
            interpreter.output.push_str(text);
            Ok(receiver)
        }
        (Builtin::OutInt, receiver, [Value::Int(value)]) => {
            interpreter.output.push_str(&value.to_string());
            Ok(receiver)
        }
        (Builtin::InString, _, []) => Ok(Value::Str(read_line(interpreter, position)?.unwrap_or_default())),
        (Builtin::InInt, _, []) => {
            let value = read_line(interpreter, position)?
                .and_then(|line| line.trim().parse().ok())
                .unwrap_or(0);
            Ok(Value::Int(value))
        }

        (Builtin::Length, Value::Str(text), []) => Ok(Value::Int(text.chars().count() as i64)),
        (Builtin::Concat, Value::Str(text), [Value::Str(suffix)]) => Ok(Value::Str(text + suffix)),
        (Builtin::Substr, Value::Str(text), [Value::Int(start), Value::Int(length)]) => {
            substr(&text, *start, *length, position)
        }

        (builtin, receiver, arguments) => Err(internal(
            format!(
                "built-in {:?} called on {} with {} argument(s)",
                builtin,
                receiver,
                arguments.len()
            ),
            position,
        )),
    }
}

/// Next input line without its line terminator. `None` at end of input.
fn read_line(interpreter: &mut Interpreter<'_>, position: &Position) -> Result<Option<String>, Error> {
    let mut line = String::new();
    let read = interpreter
        .input
        .read_line(&mut line)
        .map_err(|error| internal(format!("failed to read input: {}", error), position))?;

    if read == 0 {
        return Ok(None);
    }

    let trimmed = line.trim_end_matches(&['\n', '\r'][..]).len();
    line.truncate(trimmed);
    Ok(Some(line))
}

fn substr(text: &str, start: i64, length: i64, position: &Position) -> Result<Value, Error> {
    let size = text.chars().count();
    let out_of_range = Error::new(
        ErrorImpl::SubstringOutOfRange { start, length, size },
        position.clone(),
    );

    if start < 0 || length < 0 || start.saturating_add(length) > size as i64 {
        return Err(out_of_range);
    }

    Ok(Value::Str(
        text.chars().skip(start as usize).take(length as usize).collect(),
    ))
}
