use serde_json::Value;

const UNKNOWN_ERROR: &str = "未知错误";

/// Everything a backend-facing operation can fail with.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// No invoke function was found on the host runtime.
    #[error("Tauri invoke 不可用，请在桌面应用内运行。")]
    TransportUnavailable,

    /// The backend answered with something that is not an envelope.
    #[error("命令 {0} 返回了空响应")]
    EmptyResponse(String),

    /// The backend answered `ok: false`; the message is passed through untouched.
    #[error("{0}")]
    CommandFailed(String),

    /// A local precondition failed before anything was sent.
    #[error("{0}")]
    Validation(String),

    /// The transport itself rejected the call.
    #[error("{0}")]
    Rejected(String),

    #[error("命令 {command} 的参数无法编码: {source}")]
    Encode {
        command: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("命令 {command} 的返回数据无法解析: {source}")]
    Decode {
        command: String,
        #[source]
        source: serde_json::Error,
    },
}

impl CommandError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

pub type CommandResult<T> = Result<T, CommandError>;

/// Turns whatever a rejected transport call produced into a readable message.
pub fn describe_rejection(value: &Value) -> String {
    match value {
        Value::Null => UNKNOWN_ERROR.to_string(),
        Value::String(text) if !text.trim().is_empty() => text.clone(),
        Value::Object(map) => {
            let candidates = [
                map.get("message"),
                map.get("error").and_then(|error| error.get("message")),
                map.get("error"),
                map.get("reason"),
                map.get("details"),
            ];
            candidates
                .into_iter()
                .flatten()
                .filter_map(Value::as_str)
                .find(|text| !text.trim().is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| value.to_string())
        }
        Value::String(_) => UNKNOWN_ERROR.to_string(),
        other => other.to_string(),
    }
}
