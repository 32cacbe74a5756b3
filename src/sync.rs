//! Poison-tolerant locking.
//!
//! The only shared state in this crate is the display-width cache. A cache
//! is always safe to read after another thread panicked while holding it: at
//! worst an entry is missing and gets recomputed. So every lock goes through
//! [`lock_recover`], which takes the guard out of a poisoned mutex instead of
//! propagating the poison.
//!
//! Tests should keep using `.lock().unwrap()` so poison fails them loudly.

use std::sync::{Mutex, MutexGuard};

/// Lock a mutex, recovering from poison if necessary.
///
/// # Example
///
/// ```rust
/// use std::sync::Mutex;
/// use wrapped_table::sync::lock_recover;
///
/// let mutex = Mutex::new(42);
/// let guard = lock_recover(&mutex);
/// assert_eq!(*guard, 42);
/// ```
#[inline]
pub fn lock_recover<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| {
        log::debug!("recovered poisoned mutex");
        poisoned.into_inner()
    })
}
