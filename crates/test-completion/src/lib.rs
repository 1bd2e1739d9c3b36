//! A local fake completion provider for testing purpose.

use std::collections::VecDeque;
use std::error::Error as StdError;
use std::fmt::{self, Debug, Display, Formatter};
use std::future::ready;
use std::sync::{Arc, Mutex};

use threadbot_completion::{
    CompletionProvider, CompletionProviderError, ErrorKind, Turn,
};

#[derive(Debug)]
pub struct Error {
    #[allow(dead_code)]
    message: &'static str,
    kind: ErrorKind,
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Debug::fmt(self, f)
    }
}

impl StdError for Error {}

impl CompletionProviderError for Error {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }
}

/// A scripted outcome for one request.
#[derive(Clone, Debug)]
pub enum PresetOutcome {
    /// Resolve the request with the given reply text.
    Reply(String),
    /// Fail the request with the given failure class.
    Fail(ErrorKind),
}

/// A local fake completion provider.
///
/// Script the provider with [`push_reply`]/[`push_failure`] before
/// issuing requests; each request consumes the next outcome in FIFO
/// order and records the turns it was called with, so tests can assert
/// on the exact request window. Running out of script is itself a
/// failure, which keeps under-scripted tests loud.
///
/// # Note
///
/// This type is not optimized for production use, there are heavy
/// memory copies involved. You should only use it for testing.
///
/// [`push_reply`]: TestCompletionProvider::push_reply
/// [`push_failure`]: TestCompletionProvider::push_failure
#[derive(Clone, Default)]
pub struct TestCompletionProvider {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Default)]
struct Inner {
    script: VecDeque<PresetOutcome>,
    requests: Vec<Vec<Turn>>,
}

impl TestCompletionProvider {
    /// Queues a successful reply.
    pub fn push_reply<S: Into<String>>(&self, reply: S) {
        self.lock()
            .script
            .push_back(PresetOutcome::Reply(reply.into()));
    }

    /// Queues a failure of the given class.
    pub fn push_failure(&self, kind: ErrorKind) {
        self.lock().script.push_back(PresetOutcome::Fail(kind));
    }

    /// Returns every request the provider has received so far, in
    /// arrival order.
    pub fn requests(&self) -> Vec<Vec<Turn>> {
        self.lock().requests.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl CompletionProvider for TestCompletionProvider {
    type Error = Error;

    fn complete(
        &self,
        turns: &[Turn],
    ) -> impl Future<Output = Result<String, Self::Error>> + Send + 'static
    {
        let mut inner = self.lock();
        inner.requests.push(turns.to_vec());
        let outcome = inner.script.pop_front();
        ready(match outcome {
            Some(PresetOutcome::Reply(reply)) => Ok(reply),
            Some(PresetOutcome::Fail(kind)) => Err(Error {
                message: "scripted failure",
                kind,
            }),
            None => Err(Error {
                message: "script exhausted",
                kind: ErrorKind::Remote,
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_outcomes_in_order() {
        let provider = TestCompletionProvider::default();
        provider.push_reply("first");
        provider.push_failure(ErrorKind::RateLimited);

        let turns = [Turn::directive("d"), Turn::user("u")];
        assert_eq!(provider.complete(&turns).await.unwrap(), "first");

        let err = provider.complete(&turns).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RateLimited);

        // Exhausted scripts fail loudly.
        let err = provider.complete(&turns).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Remote);
    }

    #[tokio::test]
    async fn test_requests_are_recorded() {
        let provider = TestCompletionProvider::default();
        provider.push_reply("ok");

        let turns = [Turn::directive("d"), Turn::user("hello")];
        provider.complete(&turns).await.unwrap();

        let requests = provider.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0], turns);
    }
}
