//! Colored terminal warnings, printed once per unique message.
//!
//! Used by the layout engine to report markup that is accepted but probably
//! not what the author meant, such as style scopes left open at the end of
//! the input. Layout runs every frame, so the same warning would otherwise be
//! printed sixty times a second.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Mutex, PoisonError};

use owo_colors::OwoColorize;

/// Messages already printed, keyed by `[component] message`.
static WARNED: Mutex<Option<HashSet<String>>> = Mutex::new(None);

/// Bumped by [`clear_warnings`]; a [`WarnFlag`] is set for one epoch only.
static EPOCH: AtomicU32 = AtomicU32::new(1);

/// A lock-free "already reported" bit for a warning raised on a hot path.
///
/// Checking the flag neither locks nor allocates, so callers can skip
/// building the message entirely once it has been printed:
///
/// ```ignore
/// static UNCLOSED: WarnFlag = WarnFlag::new();
/// if UNCLOSED.first() {
///     warn_once("Layout", &format!("{depth} scopes left open"));
/// }
/// ```
#[derive(Debug, Default)]
pub struct WarnFlag(AtomicU32);

impl WarnFlag {
    /// A flag that has not fired yet.
    #[must_use]
    pub const fn new() -> Self {
        Self(AtomicU32::new(0))
    }

    /// Set the flag. True if it was not already set since the last
    /// [`clear_warnings`].
    #[must_use]
    pub fn first(&self) -> bool {
        let epoch = EPOCH.load(Ordering::Relaxed);
        self.0.swap(epoch, Ordering::Relaxed) != epoch
    }
}

/// Print a warning for `component` unless the same message was already
/// printed since the last [`clear_warnings`].
///
/// # Example
/// ```ignore
/// warn_once("Layout", "style scope {s:...} is never closed");
/// ```
pub fn warn_once(component: &str, message: &str) {
    let key = format!("[{component}] {message}");
    let first_time = WARNED
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get_or_insert_with(HashSet::new)
        .insert(key);

    if first_time {
        eprintln!("{}", format!("[inkline {component}] warning: {message}").yellow());
    }
}

/// Forget every recorded warning and reset every [`WarnFlag`], so they can
/// be printed again.
pub fn clear_warnings() {
    let _ = EPOCH.fetch_add(1, Ordering::Relaxed);
    let mut guard = WARNED.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(set) = guard.as_mut() {
        set.clear();
    }
}

/// Whether `message` has been reported for `component`.
#[must_use]
pub fn was_warned(component: &str, message: &str) -> bool {
    let key = format!("[{component}] {message}");
    WARNED
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .as_ref()
        .is_some_and(|set| set.contains(&key))
}
