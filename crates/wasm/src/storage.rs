use chatdock::error::{ReadSnafu, UnavailableSnafu, WriteSnafu};
use chatdock::{KeyValueStore, StoreResult};
use snafu::OptionExt;

use crate::describe_js_error;

/// `window.localStorage`, keyed per origin.
pub struct LocalStorageStore {
    storage: web_sys::Storage,
}

impl LocalStorageStore {
    /// Fails when storage is disabled, e.g. in some private browsing modes.
    pub fn open() -> StoreResult<Self> {
        let window = web_sys::window().context(UnavailableSnafu {
            stage: "resolve-window",
            message: "no global window",
        })?;

        let storage = window
            .local_storage()
            .map_err(|error| {
                UnavailableSnafu {
                    stage: "open-local-storage",
                    message: describe_js_error(&error),
                }
                .build()
            })?
            .context(UnavailableSnafu {
                stage: "open-local-storage",
                message: "localStorage is disabled",
            })?;

        Ok(Self { storage })
    }
}

impl KeyValueStore for LocalStorageStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        self.storage.get_item(key).map_err(|error| {
            ReadSnafu {
                stage: "local-storage-get",
                key,
                message: describe_js_error(&error),
            }
            .build()
        })
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.storage.set_item(key, value).map_err(|error| {
            WriteSnafu {
                stage: "local-storage-set",
                key,
                message: describe_js_error(&error),
            }
            .build()
        })
    }
}
