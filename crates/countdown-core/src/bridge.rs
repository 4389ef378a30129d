//! Command bridge to the host's invoke function.
//!
//! The WebView runtime has exposed `invoke` under three different paths over
//! time. The bridge probes them in a fixed order and uses the first one found.

use std::fmt;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::alias::with_payload_aliases;
use crate::envelope::unwrap_envelope;
use crate::error::{CommandError, CommandResult, describe_rejection};

/// Where an invoke function may live on the host global.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvokeShape {
    /// `__TAURI__.invoke`
    Flat,
    /// `__TAURI__.tauri.invoke`
    Tauri,
    /// `__TAURI__.core.invoke`
    Core,
}

pub const INVOKE_PROBE_ORDER: [InvokeShape; 3] =
    [InvokeShape::Flat, InvokeShape::Tauri, InvokeShape::Core];

impl InvokeShape {
    /// Property path below the host global.
    pub fn path(self) -> &'static [&'static str] {
        match self {
            Self::Flat => &["invoke"],
            Self::Tauri => &["tauri", "invoke"],
            Self::Core => &["core", "invoke"],
        }
    }
}

impl fmt::Display for InvokeShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path().join("."))
    }
}

/// A callable invoke function.
///
/// `Ok` carries the raw response (`Null` when the host returned nothing),
/// `Err` carries whatever the host rejected with.
#[allow(async_fn_in_trait)]
pub trait Invoke {
    async fn invoke(&self, command: &str, payload: Value) -> Result<Value, Value>;
}

/// The host environment the bridge probes for an invoke function.
pub trait HostRuntime {
    type Invoker: Invoke;

    fn resolve(&self, shape: InvokeShape) -> Option<Self::Invoker>;
}

pub struct CommandBridge<H> {
    host: H,
}

impl<H: HostRuntime> CommandBridge<H> {
    pub fn new(host: H) -> Self {
        Self { host }
    }

    fn locate(&self) -> Option<(InvokeShape, H::Invoker)> {
        INVOKE_PROBE_ORDER
            .into_iter()
            .find_map(|shape| self.host.resolve(shape).map(|invoker| (shape, invoker)))
    }

    /// Sends `command` with an aliased copy of `payload` and returns the raw response.
    pub async fn invoke(&self, command: &str, payload: &Map<String, Value>) -> CommandResult<Value> {
        let Some((shape, invoker)) = self.locate() else {
            warn!(command, "no invoke function on host runtime");
            return Err(CommandError::TransportUnavailable);
        };

        let payload = Value::Object(with_payload_aliases(payload));
        debug!(command, %shape, "invoking backend command");

        invoker.invoke(command, payload).await.map_err(|rejection| {
            let message = describe_rejection(&rejection);
            warn!(command, error = %message, "invoke rejected");
            CommandError::Rejected(message)
        })
    }

    /// Invokes `command`, unwraps the envelope and decodes its data.
    pub async fn call<A, R>(&self, command: &str, args: &A) -> CommandResult<R>
    where
        A: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let data = self.call_raw(command, args).await?;
        serde_json::from_value(data).map_err(|source| CommandError::Decode {
            command: command.to_string(),
            source,
        })
    }

    /// Like [`call`](Self::call) for commands whose data is ignored.
    pub async fn call_unit<A>(&self, command: &str, args: &A) -> CommandResult<()>
    where
        A: Serialize + ?Sized,
    {
        self.call_raw(command, args).await.map(|_| ())
    }

    async fn call_raw<A>(&self, command: &str, args: &A) -> CommandResult<Value>
    where
        A: Serialize + ?Sized,
    {
        let payload = encode_args(command, args)?;
        let response = self.invoke(command, &payload).await?;
        unwrap_envelope(command, response)
    }
}

fn encode_args<A>(command: &str, args: &A) -> CommandResult<Map<String, Value>>
where
    A: Serialize + ?Sized,
{
    let value = serde_json::to_value(args).map_err(|source| CommandError::Encode {
        command: command.to_string(),
        source,
    })?;

    match value {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Map::new()),
        _ => Err(CommandError::Encode {
            command: command.to_string(),
            source: serde::ser::Error::custom("command arguments must be an object"),
        }),
    }
}
