//! # Dispatcher configuration.
//!
//! Provides [`Config`] centralized settings for a [`Dispatcher`](crate::Dispatcher).
//!
//! ## Sentinel values
//! - `max_concurrent = 0` → unlimited (no semaphore created)

/// Dispatcher settings.
///
/// ## Field semantics
/// - `max_concurrent`: cap on listener invocations running at once in pooled
///   delivery (`0` = unlimited)
///
/// ## Notes
/// All fields are public for flexibility. Prefer the helper accessors to avoid
/// sprinkling sentinel checks (`0`) across the codebase.
#[derive(Clone, Debug, Default)]
pub struct Config {
    /// Maximum number of pooled listener invocations running concurrently.
    ///
    /// - `0` = unlimited (no semaphore)
    /// - `n > 0` = at most `n` listener tasks run simultaneously
    ///
    /// Excess tasks are still submitted at once and wait for a permit inside the
    /// executor; submission is never rejected and callers never block.
    /// Immediate delivery is not limited.
    pub max_concurrent: usize,
}

impl Config {
    /// Returns the concurrency limit as an `Option`.
    ///
    /// - `None` → unlimited (no semaphore)
    /// - `Some(n)` → at most `n` concurrent listener tasks
    ///
    /// # Example
    /// ```
    /// use typebus::Config;
    ///
    /// assert_eq!(Config::default().concurrency_limit(), None);
    /// assert_eq!(Config { max_concurrent: 4 }.concurrency_limit(), Some(4));
    /// ```
    #[inline]
    pub fn concurrency_limit(&self) -> Option<usize> {
        if self.max_concurrent == 0 {
            None
        } else {
            Some(self.max_concurrent)
        }
    }
}
