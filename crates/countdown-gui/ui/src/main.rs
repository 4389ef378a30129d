mod app;
mod host;
mod storage;

fn main() {
  console_error_panic_hook::set_once();
  wasm_tracing::set_as_global_default();

  tracing::info!(
    "starting Countdown Todo frontend"
  );

  wasm_bindgen_futures::spawn_local(
    app::boot()
  );
}
