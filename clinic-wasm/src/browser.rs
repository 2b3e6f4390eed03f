//! `localStorage` as a [`KeyValueStore`].

use clinic_core::{KeyValueStore, NullStorage};

/// Browser storage when the page can reach it, otherwise a backend that drops writes.
pub fn local_storage() -> Box<dyn KeyValueStore> {
    #[cfg(target_arch = "wasm32")]
    if let Some(storage) = web::LocalStorage::open() {
        return Box::new(storage);
    }

    Box::new(NullStorage)
}

#[cfg(target_arch = "wasm32")]
mod web {
    use clinic_core::{KeyValueStore, StorageError};

    pub(crate) struct LocalStorage(web_sys::Storage);

    impl LocalStorage {
        pub(crate) fn open() -> Option<Self> {
            let window = web_sys::window()?;
            // Throws when storage is disabled by privacy settings.
            let storage = window.local_storage().ok().flatten()?;
            Some(Self(storage))
        }
    }

    impl KeyValueStore for LocalStorage {
        fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.0
                .get_item(key)
                .map_err(|err| StorageError::Read(format!("{err:?}")))
        }

        fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
            self.0
                .set_item(key, value)
                .map_err(|err| StorageError::Write(format!("{err:?}")))
        }

        fn remove_item(&self, key: &str) -> Result<(), StorageError> {
            self.0
                .remove_item(key)
                .map_err(|err| StorageError::Write(format!("{err:?}")))
        }
    }
}
