//! Debouncing for search-as-you-type.
//!
//! The controller filters synchronously on every `set_search_query`; hosts
//! that forward keystrokes put a `SearchDebouncer` in front of it so the list
//! is only re-filtered once typing pauses.

use crate::pagination::ListController;
use tokio::time::{Duration, Instant};

pub const DEFAULT_SEARCH_DELAY: Duration = Duration::from_millis(300);

#[derive(Debug, Clone)]
pub struct SearchDebouncer {
    delay: Duration,
    pending: Option<(String, Instant)>,
}

impl Default for SearchDebouncer {
    fn default() -> Self {
        Self::new(DEFAULT_SEARCH_DELAY)
    }
}

impl SearchDebouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Records the latest query; it replaces any query still waiting.
    pub fn input(&mut self, query: &str, now: Instant) {
        self.pending = Some((query.to_string(), now + self.delay));
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// When the pending query becomes due, if there is one.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, due)| *due)
    }

    /// Takes the pending query once its delay has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<String> {
        if self.deadline().is_some_and(|due| due <= now) {
            self.flush()
        } else {
            None
        }
    }

    /// Takes the pending query immediately, e.g. when the user presses Enter.
    pub fn flush(&mut self) -> Option<String> {
        self.pending.take().map(|(query, _)| query)
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// Applies a due query to `list`. Returns true when the list was searched.
    pub fn apply_due(&mut self, list: &mut ListController, now: Instant) -> bool {
        match self.poll(now) {
            Some(query) => {
                list.set_search_query(&query);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::record_from;
    use serde_json::json;

    #[test]
    fn test_poll_waits_for_delay() {
        let start = Instant::now();
        let mut debouncer = SearchDebouncer::new(Duration::from_millis(300));
        debouncer.input("ad", start);
        assert!(debouncer.is_pending());
        assert_eq!(debouncer.poll(start + Duration::from_millis(299)), None);
        assert_eq!(
            debouncer.poll(start + Duration::from_millis(300)),
            Some("ad".to_string())
        );
        assert!(!debouncer.is_pending());
        assert_eq!(debouncer.poll(start + Duration::from_secs(5)), None);
    }

    #[test]
    fn test_later_input_supersedes() {
        let start = Instant::now();
        let mut debouncer = SearchDebouncer::default();
        debouncer.input("a", start);
        debouncer.input("ad", start + Duration::from_millis(200));
        debouncer.input("adm", start + Duration::from_millis(400));

        assert_eq!(debouncer.poll(start + Duration::from_millis(600)), None);
        assert_eq!(
            debouncer.deadline(),
            Some(start + Duration::from_millis(700))
        );
        assert_eq!(
            debouncer.poll(start + Duration::from_millis(700)),
            Some("adm".to_string())
        );
    }

    #[test]
    fn test_flush_and_cancel() {
        let start = Instant::now();
        let mut debouncer = SearchDebouncer::default();
        debouncer.input("guest", start);
        assert_eq!(debouncer.flush(), Some("guest".to_string()));
        assert_eq!(debouncer.flush(), None);

        debouncer.input("guest", start);
        debouncer.cancel();
        assert_eq!(debouncer.poll(start + Duration::from_secs(1)), None);
    }

    #[test]
    fn test_apply_due_searches_list() {
        let start = Instant::now();
        let mut list = ListController::default();
        list.set_data(vec![
            record_from([("name", json!("Admin User"))]),
            record_from([("name", json!("Guest"))]),
        ]);

        let mut debouncer = SearchDebouncer::new(Duration::from_millis(100));
        debouncer.input("admin", start);
        assert!(!debouncer.apply_due(&mut list, start));
        assert_eq!(list.total_items(), 2);
        assert!(debouncer.apply_due(&mut list, start + Duration::from_millis(100)));
        assert_eq!(list.total_items(), 1);
        assert_eq!(list.search_query(), "admin");
    }
}
