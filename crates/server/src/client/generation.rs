//! Per-view load generations
//!
//! Every load takes a ticket. Starting a newer load or navigating away bumps
//! the generation, and any result carrying an older ticket is dropped.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

#[derive(Debug, Default)]
pub struct ViewGeneration {
    current: AtomicU64,
}

impl ViewGeneration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a load. Any ticket handed out earlier becomes stale.
    pub fn begin(&self) -> LoadTicket {
        LoadTicket(self.current.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// The view was left; every outstanding ticket becomes stale.
    pub fn invalidate(&self) {
        self.current.fetch_add(1, Ordering::SeqCst);
    }

    pub fn is_current(&self, ticket: LoadTicket) -> bool {
        self.current.load(Ordering::SeqCst) == ticket.0
    }

    /// Run `f` only if `ticket` is still current. Returns whether it ran.
    pub fn apply<F: FnOnce()>(&self, ticket: LoadTicket, f: F) -> bool {
        if !self.is_current(ticket) {
            debug!("[View] Discarding result of load {}", ticket.0);
            return false;
        }
        f();
        true
    }
}

/// View state guarded by a [`ViewGeneration`].
#[derive(Debug)]
pub struct ViewState<T> {
    generation: ViewGeneration,
    value: Mutex<Option<T>>,
}

impl<T> Default for ViewState<T> {
    fn default() -> Self {
        Self {
            generation: ViewGeneration::new(),
            value: Mutex::new(None),
        }
    }
}

impl<T: Clone> ViewState<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Await `load` and store its output unless a newer load started or the
    /// view was left in the meantime. Returns whether the output was kept.
    pub async fn load<F>(&self, load: F) -> bool
    where
        F: Future<Output = T>,
    {
        let ticket = self.generation.begin();
        let value = load.await;
        // The ticket check and the store happen under the slot lock, the same
        // lock `navigate_away` holds while it invalidates and clears.
        let mut slot = self.value.lock();
        self.generation.apply(ticket, || *slot = Some(value))
    }

    pub fn get(&self) -> Option<T> {
        self.value.lock().clone()
    }

    pub fn navigate_away(&self) {
        let mut slot = self.value.lock();
        self.generation.invalidate();
        *slot = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::oneshot;

    #[test]
    fn test_newer_ticket_supersedes() {
        let generation = ViewGeneration::new();
        let first = generation.begin();
        assert!(generation.is_current(first));

        let second = generation.begin();
        assert!(!generation.is_current(first));
        assert!(generation.is_current(second));

        let mut applied = Vec::new();
        assert!(!generation.apply(first, || applied.push(1)));
        assert!(generation.apply(second, || applied.push(2)));
        assert_eq!(applied, vec![2]);
    }

    #[test]
    fn test_invalidate_stales_everything() {
        let generation = ViewGeneration::new();
        let ticket = generation.begin();
        generation.invalidate();
        assert!(!generation.is_current(ticket));
    }

    #[tokio::test]
    async fn test_load_stores_value() {
        let view = ViewState::new();
        assert!(view.load(async { 7 }).await);
        assert_eq!(view.get(), Some(7));
    }

    #[tokio::test]
    async fn test_late_response_after_navigation_is_discarded() {
        let view = Arc::new(ViewState::<String>::new());
        let (tx, rx) = oneshot::channel::<String>();

        let pending = {
            let view = view.clone();
            tokio::spawn(async move { view.load(async move { rx.await.unwrap_or_default() }).await })
        };

        // Let the load register its ticket before leaving the view.
        tokio::time::sleep(Duration::from_millis(20)).await;
        view.navigate_away();
        tx.send("late".to_string()).unwrap();

        assert!(!pending.await.unwrap());
        assert_eq!(view.get(), None);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_navigation_during_store_wins() {
        let view = Arc::new(ViewState::<String>::new());
        let (tx, rx) = oneshot::channel::<String>();

        let pending = {
            let view = view.clone();
            tokio::spawn(async move { view.load(async move { rx.await.unwrap_or_default() }).await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        // Resolve the load while the slot is held, then leave the view the
        // way `navigate_away` does before letting the load continue.
        {
            let mut slot = view.value.lock();
            tx.send("late".to_string()).unwrap();
            std::thread::sleep(Duration::from_millis(50));
            view.generation.invalidate();
            *slot = None;
        }

        assert!(!pending.await.unwrap());
        assert_eq!(view.get(), None);
    }
}
