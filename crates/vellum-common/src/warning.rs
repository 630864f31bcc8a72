//! Engine warnings, deduplicated and routed through [`log`].
//!
//! Used by the HTML, CSS, and export components to report recoverable
//! problems (unsupported selectors, unreadable stylesheets, malformed markup)
//! without flooding the log when the same template is exported repeatedly.

use std::collections::{HashSet, VecDeque};
use std::sync::{Mutex, PoisonError};

/// Most distinct warnings remembered at once. The oldest is forgotten first,
/// so a message can be logged again after this many newer ones.
pub const MAX_REMEMBERED_WARNINGS: usize = 1024;

/// Warnings already emitted, with their insertion order for eviction.
#[derive(Default)]
struct Seen {
    keys: HashSet<String>,
    order: VecDeque<String>,
}

impl Seen {
    /// Record `key`, returning false if it was already present.
    fn insert(&mut self, key: String) -> bool {
        if self.keys.contains(&key) {
            return false;
        }
        if self.order.len() == MAX_REMEMBERED_WARNINGS
            && let Some(oldest) = self.order.pop_front()
        {
            let _ = self.keys.remove(&oldest);
        }
        self.order.push_back(key.clone());
        let _ = self.keys.insert(key);
        true
    }

    fn clear(&mut self) {
        self.keys.clear();
        self.order.clear();
    }
}

/// Global set of warnings we've already emitted (to deduplicate)
static WARNED: Mutex<Option<Seen>> = Mutex::new(None);

/// Warn about a recoverable problem (emitted once per unique message).
///
/// The message is logged at `warn` level with target `vellum::<component>`,
/// so it can be filtered per component with `RUST_LOG`. At most
/// [`MAX_REMEMBERED_WARNINGS`] messages are remembered.
///
/// # Example
/// ```ignore
/// warn_once("css", "failed to parse selector 'a:::b'");
/// ```
pub fn warn_once(component: &str, message: &str) {
    let key = format!("[{component}] {message}");
    let should_emit = WARNED
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get_or_insert_with(Seen::default)
        .insert(key);

    if should_emit {
        let target = format!("vellum::{component}");
        log::warn!(target: target.as_str(), "{message}");
    }
}

/// Number of distinct warnings currently remembered.
#[must_use]
pub fn remembered_warnings() -> usize {
    WARNED
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .as_ref()
        .map_or(0, |seen| seen.order.len())
}

/// Returns true if `message` has already been emitted for `component`.
#[must_use]
pub fn was_warned(component: &str, message: &str) -> bool {
    let key = format!("[{component}] {message}");
    WARNED
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .as_ref()
        .is_some_and(|seen| seen.keys.contains(&key))
}

/// Clear all recorded warnings.
pub fn clear_warnings() {
    let mut guard = WARNED.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(seen) = guard.as_mut() {
        seen.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warn_once_records_message() {
        warn_once("test", "unique message for record check");
        assert!(was_warned("test", "unique message for record check"));
        assert!(!was_warned("other", "unique message for record check"));
    }

    #[test]
    fn test_seen_evicts_oldest_at_capacity() {
        let mut seen = Seen::default();
        for i in 0..MAX_REMEMBERED_WARNINGS {
            assert!(seen.insert(format!("w{i}")));
        }
        assert!(!seen.insert("w0".to_string()));

        assert!(seen.insert("newest".to_string()));
        assert_eq!(seen.order.len(), MAX_REMEMBERED_WARNINGS);
        assert_eq!(seen.keys.len(), MAX_REMEMBERED_WARNINGS);
        assert!(!seen.keys.contains("w0"));
        assert!(seen.keys.contains("w1"));

        // Forgotten messages are emitted again.
        assert!(seen.insert("w0".to_string()));
        assert!(!seen.keys.contains("w1"));
    }
}
