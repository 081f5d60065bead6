//! Thread affinity checks for data source trees.
//!
//! A data source tree, the rendering widget it feeds and every action it
//! emits belong to one UI thread. Nothing in the tree locks across calls or
//! waits on another thread; the locks inside each source only exist so the
//! types are `Send + Sync`. Mutating a tree from a second thread would let a
//! cache invalidation and the action describing it land in different
//! transitions, so mutating operations assert their affinity.
//!
//! # Usage
//!
//! ```
//! use horizon_sauce_core::thread_check::ThreadAffinity;
//!
//! struct MySource {
//!     affinity: ThreadAffinity,
//!     value: std::sync::atomic::AtomicUsize,
//! }
//!
//! impl MySource {
//!     fn set_value(&self, v: usize) {
//!         // In debug builds, panic if called from the wrong thread
//!         self.affinity.debug_assert_same_thread();
//!         self.value.store(v, std::sync::atomic::Ordering::Relaxed);
//!     }
//! }
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::ThreadId;

/// Flag to enable/disable runtime thread checks globally.
static THREAD_CHECKS_ENABLED: AtomicBool = AtomicBool::new(cfg!(debug_assertions));

/// Enable or disable runtime thread checks.
///
/// By default, thread checks are enabled in debug builds and disabled in
/// release builds.
pub fn set_thread_checks_enabled(enabled: bool) {
    THREAD_CHECKS_ENABLED.store(enabled, Ordering::SeqCst);
}

/// Check if runtime thread checks are currently enabled.
#[inline]
pub fn are_thread_checks_enabled() -> bool {
    THREAD_CHECKS_ENABLED.load(Ordering::Relaxed)
}

/// Thread affinity tracker for data sources.
///
/// Records the thread on which a source was created and verifies that
/// subsequent mutations happen on that same thread.
#[derive(Debug, Clone, Copy)]
pub struct ThreadAffinity {
    thread_id: ThreadId,
}

impl Default for ThreadAffinity {
    fn default() -> Self {
        Self::current()
    }
}

impl ThreadAffinity {
    /// Create a new thread affinity tracker for the current thread.
    #[inline]
    pub fn current() -> Self {
        Self {
            thread_id: std::thread::current().id(),
        }
    }

    /// Get the thread ID this affinity is bound to.
    #[inline]
    pub fn thread_id(&self) -> ThreadId {
        self.thread_id
    }

    /// Check if the current thread matches this affinity.
    #[inline]
    pub fn is_same_thread(&self) -> bool {
        std::thread::current().id() == self.thread_id
    }

    /// Assert that we are on the same thread as the affinity.
    ///
    /// Skipped when runtime checks are disabled via
    /// [`set_thread_checks_enabled`].
    ///
    /// # Panics
    ///
    /// Panics with a descriptive message if called from a different thread.
    #[inline]
    pub fn assert_same_thread(&self) {
        self.assert_same_thread_with_msg("data source mutated from the wrong thread")
    }

    /// Assert that we are on the same thread, with a custom message.
    ///
    /// # Panics
    ///
    /// Panics if called from a different thread while checks are enabled.
    pub fn assert_same_thread_with_msg(&self, msg: &str) {
        if are_thread_checks_enabled() && !self.is_same_thread() {
            self.panic_wrong_thread(msg);
        }
    }

    /// Debug-only assertion that we are on the same thread.
    ///
    /// This is a no-op in release builds.
    #[inline]
    pub fn debug_assert_same_thread(&self) {
        #[cfg(debug_assertions)]
        self.assert_same_thread();
    }

    #[cold]
    #[inline(never)]
    fn panic_wrong_thread(&self, msg: &str) -> ! {
        let current = std::thread::current();
        let current_name = current.name().unwrap_or("<unnamed>");
        let current_id = current.id();

        crate::sauce_error!(
            expected = ?self.thread_id,
            current = ?current_id,
            current_name,
            "{msg}"
        );
        panic!(
            "\n\
            ══════════════════════════════════════════════════════════════════════\n\
            THREAD AFFINITY VIOLATION\n\
            ══════════════════════════════════════════════════════════════════════\n\
            \n\
            {msg}\n\
            \n\
            Data source was created on thread: {:?}\n\
            Current thread: \"{current_name}\" (ID: {current_id:?})\n\
            \n\
            Data sources, their containers and the collection view they feed\n\
            must all be driven from the UI thread. Post the mutation to that\n\
            thread instead of calling it here.\n\
            \n\
            ══════════════════════════════════════════════════════════════════════",
            self.thread_id
        )
    }
}
