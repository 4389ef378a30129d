use std::rc::Rc;

use anyhow::Context;
use countdown_core::clock::now_millis;
use countdown_core::{
  DisplaySnapshot,
  Preferences,
  SessionStore,
  TickHandle,
  Ticker
};
use gloo::events::EventListener;
use gloo::timers::future::TimeoutFuture;

use crate::host::TauriHost;
use crate::storage::LocalStorage;

pub type Store = SessionStore<TauriHost>;

/// Context chain of a failure, outermost
/// first.
fn failure_message(
  error: &anyhow::Error
) -> String {
  format!("{error:#}")
}

/// Reports a failed action once, with
/// the resolved message.
pub fn notify_error(
  action: &str,
  error: &anyhow::Error
) {
  let message = failure_message(error);
  tracing::error!(
    action,
    error = %message,
    "错误: {message}"
  );
}

fn render(snapshot: &DisplaySnapshot) {
  for timer in &snapshot.timers {
    tracing::trace!(
      timer = %timer.id,
      name = %timer.name,
      remaining = timer.remaining,
      urgency = timer.urgency.as_str(),
      countdown = %timer.countdown,
      progress = timer.progress,
      selected = timer.selected,
      "timer display"
    );
  }

  if let Some(compact) =
    snapshot.compact.as_deref()
  {
    tracing::trace!(
      precision = snapshot
        .compact_precision
        .as_str(),
      compact,
      "compact countdown"
    );
  }
}

async fn load_session(
  store: &Store
) -> anyhow::Result<()> {
  store
    .list_timers(false)
    .await
    .context("failed loading timers")?;
  store
    .refresh_selected()
    .await
    .context(
      "failed loading marks and todos"
    )
}

fn start_ticker(
  store: Rc<Store>
) -> TickHandle {
  let ticker = Ticker::default();
  let handle = ticker.handle();

  wasm_bindgen_futures::spawn_local(
    async move {
      let ticks = ticker
        .drive(
          &*store,
          now_millis,
          |interval| {
            TimeoutFuture::new(
              u32::try_from(
                interval.as_millis()
              )
              .unwrap_or(u32::MAX)
            )
          },
          |snapshot| render(&snapshot)
        )
        .await;
      tracing::info!(
        ticks,
        "recompute tick stopped"
      );
    }
  );

  handle
}

/// Loads preferences and the session,
/// then keeps countdowns live until the
/// page goes away.
pub async fn boot() {
  let store =
    Rc::new(SessionStore::new(TauriHost));
  let preferences =
    Preferences::load(&LocalStorage);
  store.apply_preferences(preferences);

  match load_session(&store).await {
    | Ok(()) => {
      tracing::info!(
        timers = store.timers().len(),
        selected = ?store.selected_timer_id(),
        compact_mode =
          preferences.compact_mode,
        "已连接到 Tauri 后端"
      );
    }
    | Err(error) => {
      notify_error("startup", &error);
      tracing::warn!(
        "启动失败：请在 Tauri 桌面环境运行"
      );
    }
  }

  let handle = start_ticker(store);

  if let Some(window) = web_sys::window()
  {
    EventListener::once(
      &window,
      "pagehide",
      move |_| handle.cancel()
    )
    .forget();
  }
}

#[cfg(test)]
mod tests {
  use anyhow::Context;
  use countdown_core::{
    CommandError,
    CommandResult
  };

  use super::failure_message;

  #[test]
  fn failure_message_keeps_the_command_error()
  {
    let result: CommandResult<()> =
      Err(CommandError::TransportUnavailable);
    let error = result
      .context("failed loading timers")
      .expect_err("context wraps the error");
    assert_eq!(
      failure_message(&error),
      "failed loading timers: Tauri invoke 不可用，请在桌面应用内运行。"
    );
  }
}
