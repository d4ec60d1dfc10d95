//! Debounced autosave with save-status tracking
//!
//! Every accepted edit hands the latest book to `AutosaveScheduler::schedule`,
//! which marks the session dirty and restarts a single debounce timer. When the
//! timer fires without being restarted, the latest book is written through the
//! `PersistenceClient`. The visible status follows
//! `idle -> saving -> saved | error`, and `saved` falls back to `idle` after a
//! short display delay.
//!
//! A save that has started is never cancelled. If another save starts while it
//! is in flight, both complete; the store keeps whichever write lands last.

use crate::{BookStore, PersistenceClient, Result};
use book_model::Book;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Autosave configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutosaveConfig {
    /// Whether edits schedule saves automatically
    pub enabled: bool,
    /// Quiet period after the last edit before saving (in milliseconds)
    pub debounce_ms: u64,
    /// How long the `saved` status stays visible (in milliseconds)
    pub saved_display_ms: u64,
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            debounce_ms: 1500,
            saved_display_ms: 2000,
        }
    }
}

impl AutosaveConfig {
    /// Create a new config with a custom debounce delay
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce_ms = debounce.as_millis() as u64;
        self
    }

    /// Create a new config with a custom `saved` display delay
    pub fn with_saved_display(mut self, display: Duration) -> Self {
        self.saved_display_ms = display.as_millis() as u64;
        self
    }

    /// Create a new config with autosave disabled; only forced saves write
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn saved_display(&self) -> Duration {
        Duration::from_millis(self.saved_display_ms)
    }
}

/// Save status shown to the user
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaveStatus {
    #[default]
    Idle,
    Saving,
    Saved,
    Error,
}

/// Inputs of the save status state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveEvent {
    /// A write to the store began
    Started,
    /// The write completed
    Succeeded,
    /// The write failed after all retries
    Failed,
    /// The `saved` display delay ran out
    DisplayElapsed,
}

impl SaveStatus {
    /// Pure transition function
    pub fn next(self, event: SaveEvent) -> SaveStatus {
        match (self, event) {
            (_, SaveEvent::Started) => SaveStatus::Saving,
            (_, SaveEvent::Succeeded) => SaveStatus::Saved,
            (_, SaveEvent::Failed) => SaveStatus::Error,
            (SaveStatus::Saved, SaveEvent::DisplayElapsed) => SaveStatus::Idle,
            (status, SaveEvent::DisplayElapsed) => status,
        }
    }
}

#[derive(Default)]
struct SchedulerState {
    /// Whether edits exist that no completed save has covered
    dirty: bool,
    /// The live book a save would write
    latest: Option<Arc<Book>>,
    /// Bumped on every schedule; lets a finished save tell if it is still current
    revision: u64,
    /// Bumped on every reset; saves from an earlier session leave status alone
    generation: u64,
    /// Debounce timer
    pending: Option<JoinHandle<()>>,
    /// `saved -> idle` timer
    revert: Option<JoinHandle<()>>,
    last_error: Option<String>,
}

struct Shared<S> {
    client: PersistenceClient<S>,
    config: AutosaveConfig,
    state: Mutex<SchedulerState>,
    status: watch::Sender<SaveStatus>,
}

impl<S: BookStore + 'static> Shared<S> {
    fn lock(&self) -> MutexGuard<'_, SchedulerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn transition(&self, event: SaveEvent) {
        let revert = self.lock().revert.take();
        if let Some(revert) = revert {
            revert.abort();
        }
        self.status.send_modify(|status| *status = status.next(event));
    }

    fn schedule_revert(self: &Arc<Self>) {
        let shared = Arc::clone(self);
        let delay = self.config.saved_display();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            shared.status.send_if_modified(|status| {
                let next = status.next(SaveEvent::DisplayElapsed);
                let changed = next != *status;
                *status = next;
                changed
            });
        });
        if let Some(previous) = self.lock().revert.replace(handle) {
            previous.abort();
        }
    }

    async fn perform_save(self: &Arc<Self>) -> Result<()> {
        let (book, revision, generation) = {
            let state = self.lock();
            match &state.latest {
                Some(book) => (Arc::clone(book), state.revision, state.generation),
                None => return Ok(()),
            }
        };

        self.transition(SaveEvent::Started);
        let result = self.client.replace_book(&book).await;

        let mut state = self.lock();
        if state.generation != generation {
            tracing::debug!("Save of book {} finished after the session was reset", book.id);
            return result;
        }
        match &result {
            Ok(()) => {
                if state.revision == revision {
                    state.dirty = false;
                }
                state.last_error = None;
                drop(state);
                self.transition(SaveEvent::Succeeded);
                self.schedule_revert();
                tracing::debug!("Saved book {}", book.id);
            }
            Err(e) => {
                tracing::warn!("Autosave of book {} failed: {}", book.id, e);
                state.last_error = Some(e.to_string());
                drop(state);
                self.transition(SaveEvent::Failed);
            }
        }
        result
    }
}

/// Debounced autosave for one open book
pub struct AutosaveScheduler<S> {
    shared: Arc<Shared<S>>,
}

impl<S> Clone for AutosaveScheduler<S> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<S: BookStore + 'static> AutosaveScheduler<S> {
    /// Create a scheduler writing through `client`
    pub fn new(client: PersistenceClient<S>, config: AutosaveConfig) -> Self {
        let (status, _) = watch::channel(SaveStatus::Idle);
        Self {
            shared: Arc::new(Shared {
                client,
                config,
                state: Mutex::new(SchedulerState::default()),
                status,
            }),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &AutosaveConfig {
        &self.shared.config
    }

    /// Get the persistence client
    pub fn client(&self) -> &PersistenceClient<S> {
        &self.shared.client
    }

    /// Current save status
    pub fn status(&self) -> SaveStatus {
        *self.shared.status.borrow()
    }

    /// Watch status changes
    pub fn subscribe(&self) -> watch::Receiver<SaveStatus> {
        self.shared.status.subscribe()
    }

    /// Check if there are unsaved changes
    pub fn is_dirty(&self) -> bool {
        self.shared.lock().dirty
    }

    /// Check if a debounce timer is waiting to fire
    pub fn has_pending_save(&self) -> bool {
        self.shared
            .lock()
            .pending
            .as_ref()
            .is_some_and(|timer| !timer.is_finished())
    }

    /// Error message from the last failed save, cleared by the next success
    pub fn last_error(&self) -> Option<String> {
        self.shared.lock().last_error.clone()
    }

    /// Record an edit and restart the debounce timer
    pub fn schedule(&self, book: Arc<Book>) {
        let mut state = self.shared.lock();
        state.dirty = true;
        state.latest = Some(book);
        state.revision += 1;
        if let Some(timer) = state.pending.take() {
            timer.abort();
        }
        if !self.shared.config.enabled {
            return;
        }

        let shared = Arc::clone(&self.shared);
        let delay = self.shared.config.debounce();
        state.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Detach the write so that restarting the timer cannot cancel it mid-flight.
            tokio::spawn(async move {
                let _ = shared.perform_save().await;
            });
        }));
        tracing::debug!(revision = state.revision, "Autosave scheduled");
    }

    /// Cancel the debounce timer and save the latest book now
    pub async fn force_save(&self) -> Result<()> {
        let timer = self.shared.lock().pending.take();
        if let Some(timer) = timer {
            timer.abort();
        }
        self.shared.perform_save().await
    }

    /// Start tracking a freshly loaded book: clean, idle, no timers.
    ///
    /// Passing `None` detaches the scheduler from any book.
    pub fn reset(&self, book: Option<Arc<Book>>) {
        self.cancel();
        {
            let mut state = self.shared.lock();
            state.dirty = false;
            state.latest = book;
            state.revision += 1;
            state.generation += 1;
            state.last_error = None;
        }
        self.shared.status.send_replace(SaveStatus::Idle);
    }

    /// Cancel the debounce and status timers. Saves already in flight still complete.
    pub fn cancel(&self) {
        let mut state = self.shared.lock();
        if let Some(timer) = state.pending.take() {
            timer.abort();
        }
        if let Some(revert) = state.revert.take() {
            revert.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{sample_book, unavailable, FlakyStore};
    use book_model::BookName;

    fn scheduler(store: &Arc<FlakyStore>) -> AutosaveScheduler<FlakyStore> {
        AutosaveScheduler::new(
            PersistenceClient::new(Arc::clone(store)),
            AutosaveConfig::default(),
        )
    }

    fn renamed(label: &str) -> Arc<Book> {
        let mut book = sample_book();
        book.name = BookName::uniform(label);
        Arc::new(book)
    }

    async fn advance(ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }

    #[test]
    fn test_autosave_config_default() {
        let config = AutosaveConfig::default();
        assert!(config.enabled);
        assert_eq!(config.debounce(), Duration::from_millis(1500));
        assert_eq!(config.saved_display(), Duration::from_millis(2000));
        assert!(!AutosaveConfig::disabled().enabled);
    }

    #[test]
    fn test_status_transitions() {
        use SaveEvent::*;
        assert_eq!(SaveStatus::Idle.next(Started), SaveStatus::Saving);
        assert_eq!(SaveStatus::Saving.next(Succeeded), SaveStatus::Saved);
        assert_eq!(SaveStatus::Saving.next(Failed), SaveStatus::Error);
        assert_eq!(SaveStatus::Saved.next(DisplayElapsed), SaveStatus::Idle);
        assert_eq!(SaveStatus::Error.next(DisplayElapsed), SaveStatus::Error);
        assert_eq!(SaveStatus::Saving.next(DisplayElapsed), SaveStatus::Saving);
        assert_eq!(SaveStatus::Error.next(Started), SaveStatus::Saving);
    }

    #[tokio::test(start_paused = true)]
    async fn test_debounce_coalesces_edits() {
        let store = Arc::new(FlakyStore::default());
        let autosave = scheduler(&store);

        autosave.schedule(renamed("first"));
        advance(1000).await;
        autosave.schedule(renamed("second"));
        advance(1000).await;

        assert_eq!(store.calls(), 0);
        assert!(autosave.is_dirty());
        assert!(autosave.has_pending_save());

        advance(600).await;

        assert_eq!(store.calls(), 1);
        let stored = store.stored(&sample_book().id).unwrap();
        assert_eq!(stored.name.english, "second");
        assert_eq!(autosave.status(), SaveStatus::Saved);
        assert!(!autosave.is_dirty());

        advance(2100).await;
        assert_eq!(autosave.status(), SaveStatus::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_three_server_errors_set_error_status() {
        let store = Arc::new(FlakyStore::failing_with([
            unavailable(),
            unavailable(),
            unavailable(),
        ]));
        let autosave = scheduler(&store);

        autosave.schedule(renamed("edit"));
        advance(1500 + 500 + 1000 + 100).await;

        assert_eq!(store.calls(), 3);
        assert_eq!(autosave.status(), SaveStatus::Error);
        assert!(autosave.is_dirty());
        assert!(autosave.last_error().unwrap().contains("503"));

        // Error is not a display state; it stays until the next save.
        advance(5000).await;
        assert_eq!(autosave.status(), SaveStatus::Error);
    }

    #[tokio::test(start_paused = true)]
    async fn test_one_server_error_then_success() {
        let store = Arc::new(FlakyStore::failing_with([unavailable()]));
        let autosave = scheduler(&store);

        autosave.schedule(renamed("edit"));
        advance(1500 + 500 + 100).await;

        assert_eq!(store.calls(), 2);
        assert_eq!(autosave.status(), SaveStatus::Saved);
        assert!(!autosave.is_dirty());
        assert!(autosave.last_error().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_force_save_cancels_pending_timer() {
        let store = Arc::new(FlakyStore::default());
        let autosave = scheduler(&store);

        autosave.schedule(renamed("edit"));
        autosave.force_save().await.unwrap();

        assert_eq!(store.calls(), 1);
        assert!(!autosave.is_dirty());
        assert!(!autosave.has_pending_save());

        advance(3000).await;
        assert_eq!(store.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_force_save_reports_failure() {
        let store = Arc::new(FlakyStore::failing_with([crate::StoreError::Rejected {
            status: 400,
            message: "Invalid JSON body".into(),
        }]));
        let autosave = scheduler(&store);

        autosave.schedule(renamed("edit"));
        assert!(autosave.force_save().await.is_err());
        assert_eq!(autosave.status(), SaveStatus::Error);
    }

    #[tokio::test(start_paused = true)]
    async fn test_edit_during_inflight_save_stays_dirty() {
        let store = Arc::new(FlakyStore::failing_with([unavailable()]));
        let autosave = scheduler(&store);

        // First save starts at 1500ms, fails, and retries at 2000ms.
        autosave.schedule(renamed("first"));
        advance(1700).await;
        autosave.schedule(renamed("second"));
        advance(400).await;

        assert_eq!(store.stored(&sample_book().id).unwrap().name.english, "first");
        assert_eq!(autosave.status(), SaveStatus::Saved);
        assert!(autosave.is_dirty());

        advance(1200).await;
        assert_eq!(store.stored(&sample_book().id).unwrap().name.english, "second");
        assert!(!autosave.is_dirty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_disabled_autosave_waits_for_force_save() {
        let store = Arc::new(FlakyStore::default());
        let autosave = AutosaveScheduler::new(
            PersistenceClient::new(Arc::clone(&store)),
            AutosaveConfig::disabled(),
        );

        autosave.schedule(renamed("edit"));
        advance(5000).await;
        assert_eq!(store.calls(), 0);
        assert!(autosave.is_dirty());

        autosave.force_save().await.unwrap();
        assert_eq!(store.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_clears_dirty_and_timers() {
        let store = Arc::new(FlakyStore::default());
        let autosave = scheduler(&store);

        autosave.schedule(renamed("edit"));
        autosave.reset(Some(renamed("loaded")));
        advance(3000).await;

        assert_eq!(store.calls(), 0);
        assert!(!autosave.is_dirty());
        assert_eq!(autosave.status(), SaveStatus::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_force_save_without_book_is_noop() {
        let store = Arc::new(FlakyStore::default());
        let autosave = scheduler(&store);

        autosave.force_save().await.unwrap();
        assert_eq!(store.calls(), 0);
        assert_eq!(autosave.status(), SaveStatus::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_status_subscription() {
        let store = Arc::new(FlakyStore::default());
        let autosave = scheduler(&store);
        let mut status = autosave.subscribe();

        autosave.schedule(renamed("edit"));
        status.changed().await.unwrap();
        assert_ne!(*status.borrow_and_update(), SaveStatus::Idle);

        advance(2100).await;
        assert!(status.has_changed().unwrap());
        assert_eq!(*status.borrow_and_update(), SaveStatus::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_save_from_before_reset_leaves_status_idle() {
        let store = Arc::new(FlakyStore::failing_with([
            unavailable(),
            unavailable(),
            unavailable(),
        ]));
        let autosave = scheduler(&store);

        // The save starts at 1500ms and is backing off when the next book opens.
        autosave.schedule(renamed("old"));
        advance(1700).await;
        autosave.reset(Some(renamed("new")));
        advance(3000).await;

        assert_eq!(store.calls(), 3);
        assert_eq!(autosave.status(), SaveStatus::Idle);
        assert!(!autosave.is_dirty());
        assert!(autosave.last_error().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_successful_save_from_before_reset_leaves_status_idle() {
        let store = Arc::new(FlakyStore::failing_with([unavailable()]));
        let autosave = scheduler(&store);

        autosave.schedule(renamed("old"));
        advance(1700).await;
        autosave.reset(Some(renamed("new")));
        advance(400).await;

        assert_eq!(store.stored(&sample_book().id).unwrap().name.english, "old");
        assert_eq!(autosave.status(), SaveStatus::Idle);
        assert!(!autosave.is_dirty());

        advance(3000).await;
        assert_eq!(autosave.status(), SaveStatus::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_saved_display_does_not_interrupt_next_save() {
        let store = Arc::new(FlakyStore::default());
        let autosave = scheduler(&store);

        autosave.schedule(renamed("first"));
        advance(1600).await;
        assert_eq!(autosave.status(), SaveStatus::Saved);

        // The second save starts at 3100ms and retries until 4600ms, past the
        // 3500ms point where the first `saved` display would have ended.
        store.push_failure(unavailable());
        store.push_failure(unavailable());
        autosave.schedule(renamed("second"));
        advance(2100).await;
        assert_eq!(autosave.status(), SaveStatus::Saving);

        advance(1000).await;
        assert_eq!(autosave.status(), SaveStatus::Saved);
        assert_eq!(store.stored(&sample_book().id).unwrap().name.english, "second");

        advance(2100).await;
        assert_eq!(autosave.status(), SaveStatus::Idle);
    }
}
