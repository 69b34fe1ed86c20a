//! Configuration for pull sessions.

/// Retries after a version conflict before giving up.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Largest batch a single session may resolve.
pub const DEFAULT_MAX_PULLS: u32 = 100;

/// Configuration for a [`PullSession`](crate::session::PullSession).
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// How many times a batch is re-resolved after losing the version race.
    pub max_retries: u32,
    /// Upper bound on `pull_count` per call.
    pub max_pulls: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            max_pulls: DEFAULT_MAX_PULLS,
        }
    }
}

impl SessionConfig {
    /// Set the number of retries after a version conflict.
    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Set the largest batch size (at least 1).
    pub fn with_max_pulls(mut self, max: u32) -> Self {
        self.max_pulls = max.max(1);
        self
    }
}
