//! Collapses bursts of suggestion queries into one request.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// Default quiet period before a suggestion query is sent.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Runs only the most recent of a burst of calls.
///
/// Each call to [`SuggestionDebouncer::run`] waits for the delay and then
/// proceeds only if no newer call arrived in the meantime. Superseded
/// calls resolve to `None` without running their work.
#[derive(Debug)]
pub struct SuggestionDebouncer {
    delay: Duration,
    generation: AtomicU64,
}

impl Default for SuggestionDebouncer {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

impl SuggestionDebouncer {
    /// Creates a debouncer with the given quiet period.
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self {
            delay,
            generation: AtomicU64::new(0),
        }
    }

    /// Returns the quiet period.
    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }

    /// Waits out the quiet period, then runs `work` unless a newer call
    /// superseded this one.
    pub async fn run<F, Fut, T>(&self, work: F) -> Option<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let ticket = self.generation.fetch_add(1, Ordering::AcqRel) + 1;

        tokio::time::sleep(self.delay).await;

        if self.generation.load(Ordering::Acquire) != ticket {
            log::trace!("Suggestion query {ticket} superseded");
            return None;
        }

        Some(work().await)
    }
}

/// One [`SuggestionDebouncer`] per client session.
///
/// Bursts are collapsed per session, so two people typing at once do not
/// supersede each other. A session's debouncer is dropped once none of its
/// calls are pending.
#[derive(Debug)]
pub struct SessionDebouncers {
    delay: Duration,
    sessions: Mutex<HashMap<String, Arc<SuggestionDebouncer>>>,
}

impl Default for SessionDebouncers {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

impl SessionDebouncers {
    /// Creates an empty set of sessions sharing one quiet period.
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Like [`SuggestionDebouncer::run`], scoped to `session`.
    pub async fn run<F, Fut, T>(&self, session: &str, work: F) -> Option<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let debouncer = self.debouncer(session);
        debouncer.run(work).await
    }

    /// Number of sessions with calls still pending.
    #[must_use]
    pub fn pending_sessions(&self) -> usize {
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        sessions.retain(|_, d| Arc::strong_count(d) > 1);
        sessions.len()
    }

    fn debouncer(&self, session: &str) -> Arc<SuggestionDebouncer> {
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        sessions.retain(|_, d| Arc::strong_count(d) > 1);

        Arc::clone(
            sessions
                .entry(session.to_string())
                .or_insert_with(|| Arc::new(SuggestionDebouncer::new(self.delay))),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[tokio::test(start_paused = true)]
    async fn only_last_call_in_burst_runs() {
        let debouncer = SuggestionDebouncer::default();
        let ran = AtomicUsize::new(0);

        let call = |query: &'static str| {
            let debouncer = &debouncer;
            let ran = &ran;
            async move {
                debouncer
                    .run(|| async move {
                        ran.fetch_add(1, Ordering::SeqCst);
                        query
                    })
                    .await
            }
        };

        let (a, b, c) = tokio::join!(call("Mai"), call("Main"), call("Main "));

        assert_eq!((a, b, c), (None, None, Some("Main ")));
        assert_eq!(ran.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn spaced_calls_all_run() {
        let debouncer = SuggestionDebouncer::new(Duration::from_millis(50));

        let first = debouncer.run(|| async { 1 }).await;
        let second = debouncer.run(|| async { 2 }).await;

        assert_eq!(first, Some(1));
        assert_eq!(second, Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn sessions_debounce_independently() {
        let sessions = SessionDebouncers::new(Duration::from_millis(100));
        let ran = AtomicUsize::new(0);

        let call = |session: &'static str, query: &'static str| {
            let sessions = &sessions;
            let ran = &ran;
            async move {
                sessions
                    .run(session, || async move {
                        ran.fetch_add(1, Ordering::SeqCst);
                        query
                    })
                    .await
            }
        };

        let (a, b, c) = tokio::join!(
            call("tab1", "Mai"),
            call("tab1", "Main"),
            call("tab2", "Elm")
        );

        assert_eq!((a, b, c), (None, Some("Main"), Some("Elm")));
        assert_eq!(ran.load(Ordering::SeqCst), 2);
        assert_eq!(sessions.pending_sessions(), 0);
    }
}
