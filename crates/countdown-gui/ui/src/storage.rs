use countdown_core::KeyValueStorage;

/// `window.localStorage`. Missing
/// storage reads as empty and drops
/// writes.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorage;

fn local_storage()
-> Option<web_sys::Storage> {
  web_sys::window().and_then(
    |window| {
      window
        .local_storage()
        .ok()
        .flatten()
    }
  )
}

impl KeyValueStorage for LocalStorage {
  fn get_item(
    &self,
    key: &str
  ) -> Option<String> {
    local_storage().and_then(
      |storage| {
        storage
          .get_item(key)
          .ok()
          .flatten()
      }
    )
  }

  fn set_item(
    &self,
    key: &str,
    value: &str
  ) {
    let Some(storage) = local_storage()
    else {
      tracing::warn!(
        key,
        "local storage unavailable; \
         preference not saved"
      );
      return;
    };

    if let Err(error) =
      storage.set_item(key, value)
    {
      tracing::warn!(
        key,
        ?error,
        "failed writing preference"
      );
    }
  }
}
