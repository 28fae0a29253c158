//! Observational progress notifications.

use std::fmt;
use std::sync::Arc;

type Callback = Arc<dyn Fn(&str) + Send + Sync>;

/// Optional callback receiving human-readable progress messages such as
/// "Searching Semantic Scholar..." or "Waiting 1.1s for rate limit...".
///
/// Reporting never influences control flow.
#[derive(Clone, Default)]
pub struct StatusReporter {
    callback: Option<Callback>,
}

impl StatusReporter {
    /// Reporter that discards every message
    pub fn quiet() -> Self {
        Self { callback: None }
    }

    /// Reporter forwarding messages to `callback`
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        Self {
            callback: Some(Arc::new(callback)),
        }
    }

    pub fn report(&self, message: &str) {
        if let Some(callback) = &self.callback {
            callback(message);
        }
    }

    pub fn is_quiet(&self) -> bool {
        self.callback.is_none()
    }
}

impl fmt::Debug for StatusReporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatusReporter")
            .field("quiet", &self.is_quiet())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_reporter_forwards_messages() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let reporter = StatusReporter::new(move |msg| sink.lock().unwrap().push(msg.to_string()));

        reporter.report("one");
        reporter.clone().report("two");

        assert_eq!(*seen.lock().unwrap(), vec!["one", "two"]);
        assert!(!reporter.is_quiet());
        assert!(StatusReporter::quiet().is_quiet());
    }
}
