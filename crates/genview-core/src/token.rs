//! Request tokens for superseded-result guards.
//!
//! Every new construction or fetch takes a token; a result is only applied
//! if its token is still the latest one issued.

use std::sync::atomic::{AtomicU64, Ordering};

/// Identifies one request among those issued by a [`TokenSource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestToken(u64);

impl RequestToken {
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for RequestToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Monotonic token counter. The last issued token is the current one.
#[derive(Debug, Default)]
pub struct TokenSource {
    latest: AtomicU64,
}

impl TokenSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a new token, superseding all earlier ones.
    pub fn issue(&self) -> RequestToken {
        RequestToken(self.latest.fetch_add(1, Ordering::AcqRel) + 1)
    }

    /// Supersede every outstanding token without starting a request.
    pub fn invalidate(&self) {
        self.latest.fetch_add(1, Ordering::AcqRel);
    }

    /// The most recently issued token, or the invalidation mark after it.
    pub fn latest(&self) -> RequestToken {
        RequestToken(self.latest.load(Ordering::Acquire))
    }

    pub fn is_current(&self, token: RequestToken) -> bool {
        self.latest.load(Ordering::Acquire) == token.0
    }
}
