pub mod alias;
pub mod bridge;
pub mod clock;
pub mod display;
pub mod envelope;
pub mod error;
pub mod format;
pub mod prefs;
pub mod store;
pub mod tick;
pub mod urgency;

pub use bridge::{CommandBridge, HostRuntime, Invoke, InvokeShape};
pub use countdown_gui_shared::{EpochMinutes, Mark, Timer, Todo, TodoStatus};
pub use display::{DisplaySnapshot, TimerDisplay};
pub use error::{CommandError, CommandResult};
pub use format::Precision;
pub use prefs::{KeyValueStorage, MemoryStorage, Preferences};
pub use store::{DraftView, SessionState, SessionStore};
pub use tick::{TickHandle, Ticker};
pub use urgency::{Urgency, classify};
