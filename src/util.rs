use std::collections::HashSet;
use std::sync::{Mutex, OnceLock};

/// Emit a warning once per process per message.
pub(crate) fn warn_once(message: &str) {
    static SEEN: OnceLock<Mutex<HashSet<String>>> = OnceLock::new();
    let seen = SEEN.get_or_init(|| Mutex::new(HashSet::new()));
    let mut seen = match seen.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    if seen.insert(message.to_owned()) {
        tracing::warn!("{message}");
    }
}
