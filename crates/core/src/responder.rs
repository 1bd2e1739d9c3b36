//! The response orchestration pipeline.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};

use threadbot_completion::{CompletionProvider, Turn};
use tokio::sync::Mutex as AsyncMutex;

use crate::completion_client::CompletionClient;
use crate::conversation::{ConversationStore, ThreadId};

/// The platform's per-message length ceiling, in characters.
pub const MESSAGE_CHUNK_LIMIT: usize = 2000;

/// How many most-recent turns are sent with each completion request,
/// bounding token usage regardless of total transcript length.
pub const REQUEST_WINDOW: usize = 10;

/// The outcome of one orchestrated exchange.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Reply {
    /// A generated reply, segmented into ordered chunks that each fit
    /// the platform's message-length ceiling.
    Answer(Vec<String>),
    /// A single user-facing notice describing a failure class.
    Failure(String),
}

impl Reply {
    /// Returns the messages to deliver, in order.
    pub fn into_messages(self) -> Vec<String> {
        match self {
            Reply::Answer(chunks) => chunks,
            Reply::Failure(notice) => vec![notice],
        }
    }
}

/// Composes the conversation store and the completion client into the
/// inbound-message pipeline.
///
/// The responder serializes the read-append-call-append sequence per
/// thread id with a per-key async lock, so two messages racing in the
/// same thread cannot interleave their transcript updates across the
/// network await. Distinct threads proceed concurrently.
pub struct Responder {
    client: CompletionClient,
    store: Arc<ConversationStore>,
    mention_token: Option<String>,
    gates: StdMutex<HashMap<ThreadId, Arc<AsyncMutex<()>>>>,
}

impl Responder {
    /// Creates a responder over the given provider and store.
    pub fn new<P: CompletionProvider + 'static>(
        provider: P,
        store: Arc<ConversationStore>,
    ) -> Self {
        Self {
            client: CompletionClient::new(provider),
            store,
            mention_token: None,
            gates: StdMutex::new(HashMap::new()),
        }
    }

    /// Sets the literal mention token that refers to the assistant
    /// (e.g. `<@1234>`); it is stripped from user turns before they
    /// are stored.
    pub fn with_mention_token<S: Into<String>>(mut self, token: S) -> Self {
        self.mention_token = Some(token.into());
        self
    }

    /// Returns the store this responder updates.
    #[inline]
    pub fn store(&self) -> &Arc<ConversationStore> {
        &self.store
    }

    /// Handles a gated inbound message posted in `thread`.
    ///
    /// On success the generated text is appended to the transcript and
    /// returned in delivery-sized chunks. On failure the transcript
    /// keeps the user turn but gains no assistant turn, so a retry
    /// re-sends the same context without duplicating it.
    pub async fn handle_message(
        &self,
        thread: ThreadId,
        content: &str,
    ) -> Reply {
        let content = self.strip_mention(content);

        let gate = self.gate(thread);
        let _guard = gate.lock().await;

        self.store.append(thread, Turn::user(content));
        let window = self.store.recent_window(thread, REQUEST_WINDOW);

        match self.client.complete(window).await {
            Ok(text) => {
                self.store.append(thread, Turn::assistant(text.clone()));
                debug!(%thread, "reply of {} chars", text.chars().count());
                Reply::Answer(chunk_content(&text, MESSAGE_CHUNK_LIMIT))
            }
            Err(err) => Reply::Failure(err.kind().user_notice().to_owned()),
        }
    }

    /// Answers a one-shot question without touching any transcript.
    ///
    /// The request is a two-turn conversation made of the current
    /// persona directive and the question, so this path is callable
    /// concurrently from any channel, not just forum threads.
    pub async fn ask(&self, question: &str) -> Reply {
        let turns = vec![
            Turn::directive(self.store.persona()),
            Turn::user(question.trim()),
        ];
        match self.client.complete(turns).await {
            Ok(text) => {
                Reply::Answer(chunk_content(&text, MESSAGE_CHUNK_LIMIT))
            }
            Err(err) => Reply::Failure(err.kind().user_notice().to_owned()),
        }
    }

    fn strip_mention(&self, content: &str) -> String {
        let Some(token) = &self.mention_token else {
            return content.trim().to_owned();
        };
        content.replace(token, "").trim().to_owned()
    }

    fn gate(&self, thread: ThreadId) -> Arc<AsyncMutex<()>> {
        let mut gates = self.gates.lock().unwrap_or_else(|e| e.into_inner());
        Arc::clone(gates.entry(thread).or_default())
    }
}

/// Splits `text` into ordered chunks of at most `limit` characters.
///
/// Concatenating the chunks reproduces the input exactly.
pub fn chunk_content(text: &str, limit: usize) -> Vec<String> {
    debug_assert!(limit > 0);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut count = 0;
    for ch in text.chars() {
        if count == limit {
            chunks.push(std::mem::take(&mut current));
            count = 0;
        }
        current.push(ch);
        count += 1;
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

#[cfg(test)]
mod tests {
    use threadbot_completion::{ErrorKind, Role};
    use threadbot_test_completion::TestCompletionProvider;

    use super::*;

    const PERSONA: &str = "You are a helpful bank teller.";

    fn responder_with(
        provider: &TestCompletionProvider,
    ) -> (Responder, Arc<ConversationStore>) {
        let store = Arc::new(ConversationStore::new(PERSONA));
        let responder = Responder::new(provider.clone(), Arc::clone(&store));
        (responder, store)
    }

    #[tokio::test]
    async fn test_successful_exchange_updates_transcript() {
        let provider = TestCompletionProvider::default();
        provider.push_reply("Stocks are shares of a company.");

        let (responder, store) = responder_with(&provider);
        let thread = ThreadId(1);
        let reply = responder
            .handle_message(thread, "what are stocks?")
            .await;
        assert_eq!(
            reply,
            Reply::Answer(vec![
                "Stocks are shares of a company.".to_owned()
            ])
        );

        let transcript = store.get_or_create(thread);
        assert_eq!(transcript.len(), 3);
        assert_eq!(transcript.turns()[0].role, Role::Directive);
        assert_eq!(transcript.turns()[1], Turn::user("what are stocks?"));
        assert_eq!(
            transcript.turns()[2],
            Turn::assistant("Stocks are shares of a company.")
        );

        // The request carried the directive followed by the user turn.
        let requests = provider.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0][0], Turn::directive(PERSONA));
        assert_eq!(requests[0][1], Turn::user("what are stocks?"));
    }

    #[tokio::test]
    async fn test_long_reply_is_chunked_losslessly() {
        let text = "a".repeat(4500);
        let provider = TestCompletionProvider::default();
        provider.push_reply(text.clone());

        let (responder, _store) = responder_with(&provider);
        let reply = responder.handle_message(ThreadId(1), "help").await;

        let Reply::Answer(chunks) = reply else {
            panic!("expected an answer");
        };
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].len(), 2000);
        assert_eq!(chunks[1].len(), 2000);
        assert_eq!(chunks[2].len(), 500);
        assert_eq!(chunks.concat(), text);
    }

    #[tokio::test]
    async fn test_failure_leaves_no_assistant_turn() {
        let provider = TestCompletionProvider::default();
        provider.push_failure(ErrorKind::RateLimited);

        let (responder, store) = responder_with(&provider);
        let thread = ThreadId(1);
        let reply = responder.handle_message(thread, "help me").await;
        assert_eq!(
            reply,
            Reply::Failure(
                ErrorKind::RateLimited.user_notice().to_owned()
            )
        );

        // The user turn stays, no assistant turn is appended.
        let transcript = store.get_or_create(thread);
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript.turns()[1], Turn::user("help me"));
    }

    #[tokio::test]
    async fn test_request_window_is_bounded() {
        let provider = TestCompletionProvider::default();
        provider.push_reply("ok");

        let (responder, store) = responder_with(&provider);
        let thread = ThreadId(1);
        for i in 0..15 {
            store.append(thread, Turn::user(format!("old {i}")));
        }

        responder.handle_message(thread, "latest").await;

        let requests = provider.requests();
        assert_eq!(requests[0].len(), REQUEST_WINDOW);
        assert_eq!(requests[0][0].role, Role::Directive);
        assert_eq!(
            requests[0][REQUEST_WINDOW - 1],
            Turn::user("latest")
        );
    }

    #[tokio::test]
    async fn test_mention_token_is_stripped() {
        let provider = TestCompletionProvider::default();
        provider.push_reply("ok");

        let store = Arc::new(ConversationStore::new(PERSONA));
        let responder = Responder::new(provider.clone(), Arc::clone(&store))
            .with_mention_token("<@99>");

        responder
            .handle_message(ThreadId(1), "<@99> what are stocks?")
            .await;

        let transcript = store.get_or_create(ThreadId(1));
        assert_eq!(transcript.turns()[1], Turn::user("what are stocks?"));
    }

    #[tokio::test]
    async fn test_ask_never_touches_the_store() {
        let provider = TestCompletionProvider::default();
        provider.push_reply("One-shot answer.");

        let (responder, store) = responder_with(&provider);
        let reply = responder.ask("  what are stocks?  ").await;
        assert_eq!(
            reply,
            Reply::Answer(vec!["One-shot answer.".to_owned()])
        );
        assert_eq!(store.stats().thread_count, 0);

        let requests = provider.requests();
        assert_eq!(
            requests[0],
            vec![
                Turn::directive(PERSONA),
                Turn::user("what are stocks?"),
            ]
        );
    }

    #[tokio::test]
    async fn test_ask_failure_maps_to_notice() {
        let provider = TestCompletionProvider::default();
        provider.push_failure(ErrorKind::Unconfigured);

        let (responder, _store) = responder_with(&provider);
        let reply = responder.ask("hello?").await;
        assert_eq!(
            reply,
            Reply::Failure(
                ErrorKind::Unconfigured.user_notice().to_owned()
            )
        );
    }

    #[test]
    fn test_chunk_content_empty_input() {
        assert!(chunk_content("", 2000).is_empty());
    }

    #[test]
    fn test_chunk_content_counts_chars_not_bytes() {
        // Four 3-byte characters with a limit of 2 chars per chunk.
        let text = "éééé";
        let chunks = chunk_content(text, 2);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn test_reply_into_messages() {
        let answer = Reply::Answer(vec!["a".to_owned(), "b".to_owned()]);
        assert_eq!(answer.into_messages(), vec!["a", "b"]);

        let failure = Reply::Failure("nope".to_owned());
        assert_eq!(failure.into_messages(), vec!["nope"]);
    }
}
