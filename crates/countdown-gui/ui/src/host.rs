use countdown_core::bridge::{
  HostRuntime,
  Invoke,
  InvokeShape
};
use js_sys::{
  Function,
  Promise,
  Reflect
};
use serde::Serialize;
use serde_json::Value;
use wasm_bindgen::{
  JsCast,
  JsValue
};
use wasm_bindgen_futures::JsFuture;

const TAURI_GLOBAL: &str = "__TAURI__";

/// Looks up `window.__TAURI__` on every
/// call, so a runtime that injects it
/// late is still picked up.
#[derive(Debug, Clone, Copy, Default)]
pub struct TauriHost;

impl HostRuntime for TauriHost {
  type Invoker = JsInvoker;

  fn resolve(
    &self,
    shape: InvokeShape
  ) -> Option<JsInvoker> {
    let window = web_sys::window()?;
    let mut this = Reflect::get(
      window.as_ref(),
      &JsValue::from_str(TAURI_GLOBAL)
    )
    .ok()
    .filter(is_present)?;

    let (method, parents) =
      shape.path().split_last()?;
    for key in parents {
      this = Reflect::get(
        &this,
        &JsValue::from_str(key)
      )
      .ok()
      .filter(is_present)?;
    }

    let function = Reflect::get(
      &this,
      &JsValue::from_str(method)
    )
    .ok()?
    .dyn_into::<Function>()
    .ok()?;

    Some(JsInvoker {
      this,
      function
    })
  }
}

fn is_present(value: &JsValue) -> bool {
  !value.is_undefined()
    && !value.is_null()
}

pub struct JsInvoker {
  this:     JsValue,
  function: Function
}

impl Invoke for JsInvoker {
  async fn invoke(
    &self,
    command: &str,
    payload: Value
  ) -> Result<Value, Value> {
    let args = payload
      .serialize(
        &serde_wasm_bindgen::Serializer::json_compatible()
      )
      .map_err(|error| {
        Value::String(error.to_string())
      })?;

    let returned = self
      .function
      .call2(
        &self.this,
        &JsValue::from_str(command),
        &args
      )
      .map_err(|error| to_value(&error))?;

    JsFuture::from(Promise::resolve(
      &returned
    ))
    .await
    .map(|value| to_value(&value))
    .map_err(|error| to_value(&error))
  }
}

fn to_value(js: &JsValue) -> Value {
  if let Some(error) =
    js.dyn_ref::<js_sys::Error>()
  {
    return Value::String(
      error.message().into()
    );
  }

  serde_wasm_bindgen::from_value(
    js.clone()
  )
  .unwrap_or_else(|error| {
    tracing::warn!(
      %error,
      "failed decoding value from \
       invoke; treating as empty"
    );
    Value::Null
  })
}
