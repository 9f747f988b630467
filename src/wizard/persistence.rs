//! Debounced write-through of the wizard draft to a [`KeyValueStore`].
//!
//! Storage failures never interrupt the applicant: they are logged and the
//! in-memory state stays authoritative.

use std::time::{Duration, Instant};

use crate::forms::steps::{CompletedSteps, Step};
use crate::forms::wizard::FormData;
use crate::wizard::debounce::{DEFAULT_WINDOW, Debouncer};
use crate::wizard::store::{
    APPLICATION_ID_KEY, COMPLETED_STEPS_KEY, FORM_DATA_KEY, KeyValueStore, StoreError, TOKEN_KEY,
};
use crate::wizard::sync::ApplicationDraftId;

/// Serialized form and step set waiting to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Snapshot {
    form: String,
    completed: String,
}

/// Draft state read back from the store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestoredDraft {
    pub form: FormData,
    pub completed: CompletedSteps,
}

pub struct DraftPersistence<S> {
    store: S,
    debouncer: Debouncer<Snapshot>,
}

impl<S: KeyValueStore> DraftPersistence<S> {
    pub fn new(store: S) -> Self {
        Self::with_window(store, DEFAULT_WINDOW)
    }

    pub fn with_window(store: S, window: Duration) -> Self {
        Self {
            store,
            debouncer: Debouncer::new(window),
        }
    }

    pub fn set_window(&mut self, window: Duration) {
        self.debouncer.set_window(window);
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Reads the persisted draft, merging stored fields over the defaults.
    /// Missing or unreadable entries fall back to an empty draft.
    pub fn restore(&self) -> RestoredDraft {
        let form = self
            .read_json::<FormData>(FORM_DATA_KEY)
            .unwrap_or_default();
        let completed = self
            .read_json::<Vec<u8>>(COMPLETED_STEPS_KEY)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|n| Step::try_from(n).ok())
            .collect();
        RestoredDraft { form, completed }
    }

    fn read_json<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.store.get(key) {
            Ok(raw) => raw?,
            Err(e) => {
                log::error!("Failed to read {key} from storage: {e}");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                log::error!("Ignoring corrupt {key} in storage: {e}");
                None
            }
        }
    }

    /// Queues a write of the given state, replacing any queued one.
    pub fn schedule(&mut self, now: Instant, form: &FormData, completed: &CompletedSteps) {
        let numbers: Vec<u8> = completed.iter().map(|s| s.number()).collect();
        let snapshot = serde_json::to_string(form).and_then(|form| {
            Ok(Snapshot {
                form,
                completed: serde_json::to_string(&numbers)?,
            })
        });
        match snapshot {
            Ok(snapshot) => self.debouncer.schedule(now, snapshot),
            Err(e) => log::error!("Failed to serialize draft: {e}"),
        }
    }

    /// Writes the queued state once the debounce window has elapsed.
    /// Returns whether a write was attempted.
    pub fn tick(&mut self, now: Instant) -> bool {
        let Some(snapshot) = self.debouncer.poll(now) else {
            return false;
        };
        if let Err(e) = self.write(&snapshot) {
            log::error!("Failed to save form data: {e}");
        }
        true
    }

    pub fn has_pending_write(&self) -> bool {
        self.debouncer.is_pending()
    }

    fn write(&mut self, snapshot: &Snapshot) -> Result<(), StoreError> {
        self.store.set(FORM_DATA_KEY, &snapshot.form)?;
        self.store.set(COMPLETED_STEPS_KEY, &snapshot.completed)?;
        Ok(())
    }

    /// Cancels any queued write and removes the draft entries. Each removal
    /// is attempted even if an earlier one failed.
    pub fn clear_saved_data(&mut self) {
        self.debouncer.cancel();
        for key in [FORM_DATA_KEY, COMPLETED_STEPS_KEY, APPLICATION_ID_KEY] {
            if let Err(e) = self.store.remove(key) {
                log::error!("Failed to remove {key} from storage: {e}");
            }
        }
    }

    pub fn application_id(&self) -> Option<ApplicationDraftId> {
        match self.store.get(APPLICATION_ID_KEY) {
            Ok(value) => value.and_then(ApplicationDraftId::new),
            Err(e) => {
                log::error!("Failed to read application id: {e}");
                None
            }
        }
    }

    pub fn set_application_id(&mut self, id: &ApplicationDraftId) {
        if let Err(e) = self.store.set(APPLICATION_ID_KEY, id.as_str()) {
            log::error!("Failed to store application id: {e}");
        }
    }

    pub fn token(&self) -> Option<String> {
        match self.store.get(TOKEN_KEY) {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                log::error!("Failed to read auth token: {e}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wizard::store::MemoryStore;

    fn draft() -> (FormData, CompletedSteps) {
        let mut form = FormData::default();
        form.general.email = "awa@example.com".into();
        form.traveler.first_name = "Awa".into();
        let completed = [Step::General, Step::Passport].into_iter().collect();
        (form, completed)
    }

    #[test]
    fn restore_round_trips_written_draft() {
        let store = MemoryStore::new();
        let mut persistence = DraftPersistence::new(store.clone());
        let (form, completed) = draft();
        let start = Instant::now();

        persistence.schedule(start, &form, &completed);
        assert!(persistence.tick(start + DEFAULT_WINDOW));

        let remounted = DraftPersistence::new(store);
        let restored = remounted.restore();
        assert_eq!(restored.form, form);
        assert_eq!(restored.completed, completed);
    }

    #[test]
    fn burst_of_changes_writes_once() {
        let store = MemoryStore::new();
        let mut persistence = DraftPersistence::new(store.clone());
        let (mut form, completed) = draft();
        let start = Instant::now();

        for i in 0..5u64 {
            form.traveler.occupation = format!("job {i}");
            persistence.schedule(start + Duration::from_millis(i * 100), &form, &completed);
            persistence.tick(start + Duration::from_millis(i * 100 + 50));
        }
        assert_eq!(store.writes(FORM_DATA_KEY), 0);

        persistence.tick(start + Duration::from_millis(400) + DEFAULT_WINDOW);
        assert_eq!(store.writes(FORM_DATA_KEY), 1);
        assert_eq!(
            DraftPersistence::new(store).restore().form.traveler.occupation,
            "job 4"
        );
    }

    #[test]
    fn clear_removes_draft_and_cancels_pending_write() {
        let mut store = MemoryStore::new();
        store.set(APPLICATION_ID_KEY, "app-1").unwrap();
        store.set(TOKEN_KEY, "secret").unwrap();
        let mut persistence = DraftPersistence::new(store.clone());
        let (form, completed) = draft();
        let start = Instant::now();

        persistence.schedule(start, &form, &completed);
        persistence.clear_saved_data();
        assert!(!persistence.tick(start + DEFAULT_WINDOW));

        assert_eq!(store.get(FORM_DATA_KEY).unwrap(), None);
        assert_eq!(store.get(APPLICATION_ID_KEY).unwrap(), None);
        assert_eq!(store.get(TOKEN_KEY).unwrap().as_deref(), Some("secret"));
    }

    #[test]
    fn corrupt_entries_restore_defaults() {
        let mut store = MemoryStore::new();
        store.set(FORM_DATA_KEY, "{not json").unwrap();
        store.set(COMPLETED_STEPS_KEY, "[1, 9, 3]").unwrap();

        let restored = DraftPersistence::new(store).restore();
        assert_eq!(restored.form, FormData::default());
        assert_eq!(
            restored.completed,
            [Step::General, Step::Traveler].into_iter().collect()
        );
    }
}
