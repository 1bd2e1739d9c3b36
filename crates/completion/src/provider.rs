use std::error::Error;

use crate::error::ErrorKind;
use crate::turn::Turn;

/// The error type for a completion provider.
pub trait CompletionProviderError: Error + Send + Sync + 'static {
    /// Returns the failure class of this error.
    fn kind(&self) -> ErrorKind;
}

/// A type that represents a hosted completion service.
///
/// Once the provider is created, it should behave like a stateless
/// object. It can still have internal state, but callers should not
/// rely on it, and the provider should be prepared for being dropped
/// anytime.
pub trait CompletionProvider: Send + Sync {
    /// The error type that may be returned by the provider.
    type Error: CompletionProviderError;

    /// Requests a completion for the given ordered turns.
    ///
    /// The turns must include a directive turn followed by at least
    /// one user turn. On success the textual content of the first
    /// completion choice is returned; failures always resolve to a
    /// tagged [`ErrorKind`] and never escape this boundary as panics.
    fn complete(
        &self,
        turns: &[Turn],
    ) -> impl Future<Output = Result<String, Self::Error>> + Send + 'static;
}
