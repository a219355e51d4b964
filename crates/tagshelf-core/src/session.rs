use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::error::{Result, TagShelfError};
use crate::persist::SnapshotStore;
use crate::store::{StoreEvent, UserDataStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenePhase {
    Active,
    Inactive,
    Background,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistenceStatus {
    /// `start` has not run yet.
    Idle,
    Loading,
    Active,
    /// The last save failed; the next one is still attempted.
    Faulted(String),
    /// Data on disk could not be read, so nothing is written over it.
    Disabled(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded { tags: usize, tracks: usize },
    /// The data file was unreadable JSON and was moved aside.
    Recovered { quarantined: Option<PathBuf> },
    /// The data file could not be read; the session runs without persistence.
    Unavailable(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Loaded,
    Warning(String),
    Saved,
    SaveFailed(String),
}

/// Ties the user data store to its persistence for the lifetime of the app.
///
/// `start` loads once; `on_phase_change` saves when the app leaves the
/// foreground. The store is reached through `read` and `update`.
pub struct Session<S: SnapshotStore> {
    persistence: Arc<S>,
    store: RwLock<UserDataStore>,
    status: RwLock<PersistenceStatus>,
    signal: broadcast::Sender<SessionEvent>,
}

impl<S: SnapshotStore> Session<S> {
    pub fn new(persistence: Arc<S>) -> Self {
        let (signal, _) = broadcast::channel(16);
        Self {
            persistence,
            store: RwLock::new(UserDataStore::new()),
            status: RwLock::new(PersistenceStatus::Idle),
            signal,
        }
    }

    pub fn status(&self) -> PersistenceStatus {
        self.status.read().clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.signal.subscribe()
    }

    pub fn subscribe_store(&self) -> broadcast::Receiver<StoreEvent> {
        self.store.read().subscribe()
    }

    pub fn read<R>(&self, f: impl FnOnce(&UserDataStore) -> R) -> R {
        f(&self.store.read())
    }

    pub fn update<R>(&self, f: impl FnOnce(&mut UserDataStore) -> R) -> R {
        f(&mut self.store.write())
    }

    fn set_status(&self, status: PersistenceStatus) {
        *self.status.write() = status;
    }

    fn emit_event(&self, event: SessionEvent) {
        let _ = self.signal.send(event);
    }

    fn transition_to_loading(&self) -> Result<()> {
        let mut status = self.status.write();
        match &*status {
            PersistenceStatus::Idle => {
                *status = PersistenceStatus::Loading;
                Ok(())
            }
            _ => Err(TagShelfError::Persistence("session already started".into())),
        }
    }

    /// Loads persisted data into the store. Only the first call loads.
    ///
    /// Load problems never fail the session: corrupt data is moved aside and
    /// the session starts empty; an unreadable file disables saving.
    pub async fn start(&self) -> Result<LoadOutcome> {
        self.transition_to_loading()?;

        let outcome = match self.persistence.load().await {
            Ok(snapshot) => {
                let outcome = LoadOutcome::Loaded {
                    tags: snapshot.tags.len(),
                    tracks: snapshot.track_cache.len(),
                };
                self.store.write().restore(snapshot);
                self.set_status(PersistenceStatus::Active);
                self.emit_event(SessionEvent::Loaded);
                outcome
            }
            Err(err) if err.is_corrupt() => {
                warn!(error = %err, "stored data is unreadable, starting empty");
                match self.persistence.quarantine().await {
                    Ok(quarantined) => {
                        self.set_status(PersistenceStatus::Active);
                        self.emit_event(SessionEvent::Warning(format!(
                            "stored data was unreadable and has been set aside: {err}"
                        )));
                        LoadOutcome::Recovered { quarantined }
                    }
                    Err(move_err) => self.disable(format!(
                        "{err}; could not set the file aside: {move_err}"
                    )),
                }
            }
            Err(err) => self.disable(err.to_string()),
        };
        Ok(outcome)
    }

    fn disable(&self, reason: String) -> LoadOutcome {
        warn!(%reason, "persistence disabled for this session");
        self.set_status(PersistenceStatus::Disabled(reason.clone()));
        self.emit_event(SessionEvent::Warning(reason.clone()));
        LoadOutcome::Unavailable(reason)
    }

    pub async fn on_phase_change(&self, phase: ScenePhase) -> Result<()> {
        match phase {
            ScenePhase::Inactive | ScenePhase::Background => self.save_now().await,
            ScenePhase::Active => Ok(()),
        }
    }

    /// Writes the current state. The store stays usable while the write runs;
    /// changes made meanwhile go into the next save.
    pub async fn save_now(&self) -> Result<()> {
        match self.status() {
            PersistenceStatus::Idle | PersistenceStatus::Loading => {
                return Err(TagShelfError::Persistence(
                    "cannot save before the session has loaded".into(),
                ));
            }
            PersistenceStatus::Disabled(reason) => {
                return Err(TagShelfError::Persistence(format!(
                    "persistence disabled: {reason}"
                )));
            }
            PersistenceStatus::Active | PersistenceStatus::Faulted(_) => {}
        }

        let snapshot = self.store.read().snapshot();
        match self.persistence.save(snapshot).await {
            Ok(()) => {
                self.set_status(PersistenceStatus::Active);
                self.emit_event(SessionEvent::Saved);
                info!("user data saved");
                Ok(())
            }
            Err(err) => {
                let reason = err.to_string();
                warn!(error = %reason, "saving user data failed");
                self.set_status(PersistenceStatus::Faulted(reason.clone()));
                self.emit_event(SessionEvent::SaveFailed(reason));
                Err(err)
            }
        }
    }
}
