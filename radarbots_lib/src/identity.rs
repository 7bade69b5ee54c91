//! Host bot identity, resolved lazily on every call.
//!
//! The bot id usually becomes known only after the host framework has logged in,
//! so the client stores a source to ask rather than the id itself.

/// Source of the current bot id.
pub trait Identity: Send + Sync {
    /// The bot id right now, or `None` if the host has not learned it yet.
    fn current_id(&self) -> Option<String>;
}

/// An id known at construction time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticIdentity(pub String);

impl StaticIdentity {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl Identity for StaticIdentity {
    fn current_id(&self) -> Option<String> {
        Some(self.0.clone())
    }
}

impl<F> Identity for F
where
    F: Fn() -> Option<String> + Send + Sync,
{
    fn current_id(&self) -> Option<String> {
        self()
    }
}

/// Reads the id and treats blank values as missing.
pub(crate) fn resolve(identity: &dyn Identity) -> Option<String> {
    identity
        .current_id()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
