use serde_json::Value;

use crate::error::{CommandError, CommandResult};

/// Validates a `{ ok, data, error }` envelope and hands back `data`.
///
/// Every command result goes through here; `data` may legitimately be null.
pub fn unwrap_envelope(command: &str, response: Value) -> CommandResult<Value> {
    let Value::Object(mut envelope) = response else {
        return Err(CommandError::EmptyResponse(command.to_string()));
    };

    if !is_truthy(envelope.get("ok")) {
        let message = envelope
            .get("error")
            .and_then(|error| error.get("message"))
            .and_then(Value::as_str)
            .filter(|text| !text.is_empty())
            .or_else(|| {
                envelope
                    .get("message")
                    .and_then(Value::as_str)
                    .filter(|text| !text.is_empty())
            })
            .map(str::to_string)
            .unwrap_or_else(|| format!("命令 {command} 执行失败"));
        return Err(CommandError::CommandFailed(message));
    }

    Ok(envelope.remove("data").unwrap_or(Value::Null))
}

fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(flag)) => *flag,
        Some(Value::Number(number)) => number.as_f64().is_some_and(|n| n != 0.0),
        Some(Value::String(text)) => !text.is_empty(),
        Some(Value::Array(_) | Value::Object(_)) => true,
    }
}
