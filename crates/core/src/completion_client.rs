use std::pin::Pin;
use std::sync::Arc;

use threadbot_completion::{
    CompletionProvider, CompletionProviderError, Turn,
};
use tracing::Instrument;

type CompleteResult = Result<String, Box<dyn CompletionProviderError>>;
type BoxedCompleteFuture =
    Pin<Box<dyn Future<Output = CompleteResult> + Send>>;
type HandlerFn =
    Arc<dyn Fn(Vec<Turn>) -> BoxedCompleteFuture + Send + Sync>;

/// A wrapper around a completion provider that provides a type-erased
/// interface for the other modules.
///
/// All provider failures are logged here, at the boundary; callers
/// only see the tagged error and derive the user-facing notice from
/// its kind.
#[derive(Clone)]
pub struct CompletionClient {
    handler_fn: HandlerFn,
}

impl CompletionClient {
    /// Creates a client that wraps the given provider.
    #[inline]
    pub fn new<P: CompletionProvider + 'static>(provider: P) -> Self {
        // We have to erase the type `P`, since `CompletionClient`
        // doesn't have a generic parameter and we don't want it either.
        let handler_fn: HandlerFn = Arc::new(move |turns| {
            let fut = provider.complete(&turns);
            Box::pin(
                async move {
                    trace!("sending a request with {} turns", turns.len());
                    match fut.await {
                        Ok(text) => Ok(text),
                        Err(err) => {
                            error!("completion failed: {err}");
                            Err(Box::new(err)
                                as Box<dyn CompletionProviderError>)
                        }
                    }
                }
                .instrument(trace_span!("completion req")),
            )
        });
        Self { handler_fn }
    }

    /// Sends the turns to the provider and returns the generated text.
    #[inline]
    pub async fn complete(&self, turns: Vec<Turn>) -> CompleteResult {
        (self.handler_fn)(turns).await
    }
}
