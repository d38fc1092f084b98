use common::form::{DraftStore, StoreError, DRAFT_STORAGE_KEY};
use web_sys::Storage;

/// Draft persistence in the browser's `localStorage`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalStorageStore;

fn local_storage() -> Result<Storage, StoreError> {
    web_sys::window()
        .and_then(|window| window.local_storage().ok().flatten())
        .ok_or(StoreError::Unavailable)
}

impl DraftStore for LocalStorageStore {
    fn load(&self) -> Result<Option<String>, StoreError> {
        local_storage()?
            .get_item(DRAFT_STORAGE_KEY)
            .map_err(|_| StoreError::Unavailable)
    }

    // Quota errors surface here once the stored images get large.
    fn save(&self, json: &str) -> Result<(), StoreError> {
        local_storage()?
            .set_item(DRAFT_STORAGE_KEY, json)
            .map_err(|e| StoreError::Write(format!("{e:?}")))
    }

    fn clear(&self) -> Result<(), StoreError> {
        local_storage()?
            .remove_item(DRAFT_STORAGE_KEY)
            .map_err(|e| StoreError::Write(format!("{e:?}")))
    }
}
