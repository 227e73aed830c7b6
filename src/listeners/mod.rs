//! Listener contract and fan-out.
//!
//! A listener inspects one incoming chat line and produces zero or more
//! reply lines. Listeners run concurrently per dispatch, but their output
//! is always emitted in registration order, and one listener's failure is
//! invisible to the others.

pub mod fact;
pub mod restart;
pub mod weather;

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::future::join_all;
use tracing::error;

/// A pluggable responder.
///
/// Implementations own their timeouts and error handling; a slow backend
/// should give up on its own rather than stall the dispatch. Instances are
/// shared across sessions, so any internal state must be safe for
/// concurrent invocations.
#[async_trait]
pub trait Listener: Send + Sync {
    /// Identifier used by per-channel disable lists.
    fn name(&self) -> &'static str;

    /// Inspect one chat line and produce reply lines.
    ///
    /// Returns an empty sequence when the line is not of interest.
    async fn invoke(&self, text: &str, bot_nick: &str) -> anyhow::Result<Vec<String>>;
}

/// The ordered set of registered listeners.
#[derive(Default)]
pub struct ListenerSet {
    listeners: Vec<Arc<dyn Listener>>,
}

impl ListenerSet {
    /// Create an empty listener set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a listener. Registration order is emission order.
    pub fn register(&mut self, listener: Arc<dyn Listener>) {
        self.listeners.push(listener);
    }

    /// Number of registered listeners.
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Whether no listeners are registered.
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Invoke every enabled listener for one chat line and collect their
    /// output lines in registration order.
    ///
    /// Listeners run concurrently. A listener that fails (or panics)
    /// contributes a single generic error line in its slot; the rest of the
    /// dispatch is unaffected.
    pub async fn dispatch(&self, text: &str, bot_nick: &str, disabled: &[String]) -> Vec<String> {
        let enabled: Vec<Arc<dyn Listener>> = self
            .listeners
            .iter()
            .filter(|l| !disabled.iter().any(|d| d == l.name()))
            .cloned()
            .collect();

        let handles = enabled.iter().map(|listener| {
            let listener = Arc::clone(listener);
            let text = text.to_owned();
            let bot_nick = bot_nick.to_owned();
            tokio::spawn(async move { listener.invoke(&text, &bot_nick).await })
        });

        let results = join_all(handles).await;

        let mut lines = Vec::new();
        for (listener, result) in enabled.iter().zip(results) {
            match result {
                // An empty output line would serialize to a malformed
                // message; it never leaves the fan-out.
                Ok(Ok(output)) => lines.extend(output.into_iter().filter(|l| !l.is_empty())),
                Ok(Err(e)) => {
                    error!(listener = listener.name(), error = %e, "listener failed");
                    lines.push(generic_error_line(listener.name()));
                }
                Err(e) => {
                    error!(listener = listener.name(), error = %e, "listener panicked");
                    lines.push(generic_error_line(listener.name()));
                }
            }
        }
        lines
    }
}

fn generic_error_line(name: &str) -> String {
    format!("Something went wrong running the {} listener", name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct Canned {
        name: &'static str,
        lines: Vec<String>,
        delay: Duration,
        calls: AtomicUsize,
    }

    impl Canned {
        fn new(name: &'static str, lines: &[&str]) -> Self {
            Self {
                name,
                lines: lines.iter().map(|s| s.to_string()).collect(),
                delay: Duration::ZERO,
                calls: AtomicUsize::new(0),
            }
        }

        fn slow(name: &'static str, lines: &[&str], delay: Duration) -> Self {
            Self {
                delay,
                ..Self::new(name, lines)
            }
        }
    }

    #[async_trait]
    impl Listener for Canned {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn invoke(&self, _text: &str, _bot_nick: &str) -> anyhow::Result<Vec<String>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            Ok(self.lines.clone())
        }
    }

    struct Failing;

    #[async_trait]
    impl Listener for Failing {
        fn name(&self) -> &'static str {
            "failing"
        }

        async fn invoke(&self, _text: &str, _bot_nick: &str) -> anyhow::Result<Vec<String>> {
            anyhow::bail!("backend exploded")
        }
    }

    #[tokio::test]
    async fn test_outputs_in_registration_order_despite_timing() {
        let mut set = ListenerSet::new();
        set.register(Arc::new(Canned::slow(
            "first",
            &["a1", "a2"],
            Duration::from_millis(50),
        )));
        set.register(Arc::new(Canned::new("second", &["b1"])));

        let lines = set.dispatch("hello", "bot", &[]).await;
        assert_eq!(lines, vec!["a1", "a2", "b1"]);
    }

    #[tokio::test]
    async fn test_failure_is_isolated_and_reported() {
        let mut set = ListenerSet::new();
        set.register(Arc::new(Canned::new("first", &["a"])));
        set.register(Arc::new(Failing));
        set.register(Arc::new(Canned::new("third", &["c"])));

        let lines = set.dispatch("hello", "bot", &[]).await;
        assert_eq!(
            lines,
            vec![
                "a",
                "Something went wrong running the failing listener",
                "c"
            ]
        );
    }

    #[tokio::test]
    async fn test_disabled_listener_is_never_invoked() {
        let first = Arc::new(Canned::new("first", &["a"]));
        let second = Arc::new(Canned::new("second", &["b"]));

        let mut set = ListenerSet::new();
        set.register(first.clone());
        set.register(second.clone());

        let lines = set
            .dispatch("hello", "bot", &["second".to_string()])
            .await;
        assert_eq!(lines, vec!["a"]);
        assert_eq!(first.calls.load(Ordering::SeqCst), 1);
        assert_eq!(second.calls.load(Ordering::SeqCst), 0);

        // The same listener still runs for channels that do not disable it.
        let lines = set.dispatch("hello", "bot", &[]).await;
        assert_eq!(lines, vec!["a", "b"]);
        assert_eq!(second.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_empty_set_produces_no_lines() {
        let set = ListenerSet::new();
        assert!(set.dispatch("hello", "bot", &[]).await.is_empty());
    }

    #[tokio::test]
    async fn test_empty_output_lines_are_dropped() {
        let mut set = ListenerSet::new();
        set.register(Arc::new(Canned::new("gappy", &["", "real", ""])));

        let lines = set.dispatch("hello", "bot", &[]).await;
        assert_eq!(lines, vec!["real"]);
    }
}
