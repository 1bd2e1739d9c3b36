//! The platform's explicit command layer.
//!
//! Commands bypass the trigger policy entirely; the gateway routes
//! them here based on the command prefix.

use threadbot_core::{ConversationStore, Reply, Responder, ThreadId};

use crate::platform::{Color, Embed};

/// How many characters of the persona directive the status card shows.
const PERSONA_PREVIEW_CHARS: usize = 120;

/// How a command's outcome is rendered back to the channel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommandReply {
    /// Plain messages, delivered in order.
    Text(Vec<String>),
    /// A single rich card.
    Embed(Embed),
}

/// Answers a one-shot question without touching any transcript.
///
/// Answers that fit a single message are rendered as a card credited
/// to the asker; longer answers fall back to plain chunked messages,
/// since embed bodies cap out well below the chunk limit.
pub async fn ask(
    responder: &Responder,
    author_name: &str,
    question: &str,
) -> CommandReply {
    match responder.ask(question).await {
        Reply::Answer(mut chunks) if chunks.len() == 1 => {
            CommandReply::Embed(Embed {
                title: format!("Answer for {author_name}"),
                description: chunks.remove(0),
                color: Color::GREEN,
                footer: Some(preview(question, PERSONA_PREVIEW_CHARS)),
            })
        }
        reply => CommandReply::Text(reply.into_messages()),
    }
}

/// Clears the conversation history of the thread the command was
/// posted in.
pub fn clear_chat(
    store: &ConversationStore,
    thread: Option<ThreadId>,
) -> CommandReply {
    let Some(thread) = thread else {
        return CommandReply::Text(vec![
            "This command only applies inside a forum thread.".to_owned(),
        ]);
    };
    store.reset(thread);
    info!(%thread, "transcript cleared on request");
    CommandReply::Embed(Embed {
        title: "Chat cleared".to_owned(),
        description: "The conversation history of this thread has been \
                      cleared."
            .to_owned(),
        color: Color::GREEN,
        footer: None,
    })
}

/// Replaces the assistant's persona directive. Administrators only.
///
/// Every live transcript is dropped so no thread continues under a
/// stale persona.
pub fn set_persona(
    store: &ConversationStore,
    is_admin: bool,
    persona: &str,
) -> CommandReply {
    if !is_admin {
        return CommandReply::Embed(Embed {
            title: "Not allowed".to_owned(),
            description: "Only administrators can change the assistant's \
                          persona."
                .to_owned(),
            color: Color::ORANGE,
            footer: None,
        });
    }
    store.set_persona(persona);
    info!("persona replaced by an administrator");
    CommandReply::Embed(Embed {
        title: "Persona updated".to_owned(),
        description: "All conversations have been reset under the new \
                      persona."
            .to_owned(),
        color: Color::GREEN,
        footer: None,
    })
}

/// Reports the assistant's live counters and configuration.
pub fn stats(store: &ConversationStore, model: &str) -> CommandReply {
    let stats = store.stats();
    CommandReply::Embed(Embed {
        title: "Assistant status".to_owned(),
        description: format!(
            "Model: {model}\nActive threads: {}\nStored turns: {}",
            stats.thread_count, stats.total_turn_count,
        ),
        color: Color::BLUE,
        footer: Some(format!(
            "Persona: {}",
            preview(&store.persona(), PERSONA_PREVIEW_CHARS)
        )),
    })
}

// Char-counted so a multi-byte persona cannot split a code point.
fn preview(text: &str, limit: usize) -> String {
    let text = text.trim();
    if text.chars().count() <= limit {
        return text.to_owned();
    }
    let mut preview: String = text.chars().take(limit).collect();
    preview.push('…');
    preview
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use threadbot_completion::{ErrorKind, Turn};
    use threadbot_test_completion::TestCompletionProvider;

    use super::*;

    const PERSONA: &str = "You are a helpful bank teller.";

    fn store() -> Arc<ConversationStore> {
        Arc::new(ConversationStore::new(PERSONA))
    }

    #[tokio::test]
    async fn test_ask_renders_short_answer_as_embed() {
        let provider = TestCompletionProvider::default();
        provider.push_reply("Stocks are shares of a company.");
        let responder = Responder::new(provider, store());

        let reply = ask(&responder, "alice", "what are stocks?").await;
        let CommandReply::Embed(embed) = reply else {
            panic!("expected an embed");
        };
        assert_eq!(embed.title, "Answer for alice");
        assert_eq!(embed.description, "Stocks are shares of a company.");
        assert_eq!(embed.color, Color::GREEN);
        assert_eq!(embed.footer.as_deref(), Some("what are stocks?"));
    }

    #[tokio::test]
    async fn test_ask_long_answer_falls_back_to_text() {
        let provider = TestCompletionProvider::default();
        provider.push_reply("a".repeat(4500));
        let responder = Responder::new(provider, store());

        let reply = ask(&responder, "alice", "help").await;
        let CommandReply::Text(messages) = reply else {
            panic!("expected plain messages");
        };
        assert_eq!(messages.len(), 3);
    }

    #[tokio::test]
    async fn test_ask_failure_is_the_user_notice() {
        let provider = TestCompletionProvider::default();
        provider.push_failure(ErrorKind::RateLimited);
        let responder = Responder::new(provider, store());

        let reply = ask(&responder, "alice", "help").await;
        assert_eq!(
            reply,
            CommandReply::Text(vec![
                ErrorKind::RateLimited.user_notice().to_owned()
            ])
        );
    }

    #[test]
    fn test_clear_chat_outside_a_thread_is_refused() {
        let store = store();
        let reply = clear_chat(&store, None);
        assert_eq!(
            reply,
            CommandReply::Text(vec![
                "This command only applies inside a forum thread."
                    .to_owned()
            ])
        );
    }

    #[test]
    fn test_clear_chat_resets_the_thread() {
        let store = store();
        let thread = ThreadId(7);
        store.append(thread, Turn::user("hi"));
        store.append(thread, Turn::assistant("hello"));

        let reply = clear_chat(&store, Some(thread));
        assert!(matches!(reply, CommandReply::Embed(_)));
        assert_eq!(store.get_or_create(thread).len(), 1);
    }

    #[test]
    fn test_set_persona_requires_admin() {
        let store = store();
        store.append(ThreadId(1), Turn::user("hi"));

        let reply = set_persona(&store, false, "You are a pirate.");
        let CommandReply::Embed(embed) = reply else {
            panic!("expected an embed");
        };
        assert_eq!(embed.color, Color::ORANGE);
        // Nothing was changed.
        assert_eq!(store.persona(), PERSONA);
        assert_eq!(store.stats().thread_count, 1);

        let reply = set_persona(&store, true, "You are a pirate.");
        let CommandReply::Embed(embed) = reply else {
            panic!("expected an embed");
        };
        assert_eq!(embed.color, Color::GREEN);
        assert_eq!(store.persona(), "You are a pirate.");
        assert_eq!(store.stats().thread_count, 0);
    }

    #[test]
    fn test_stats_reports_counters_and_persona() {
        let store = store();
        store.append(ThreadId(1), Turn::user("hi"));

        let reply = stats(&store, "gpt-4o-mini");
        let CommandReply::Embed(embed) = reply else {
            panic!("expected an embed");
        };
        assert_eq!(embed.color, Color::BLUE);
        assert!(embed.description.contains("Model: gpt-4o-mini"));
        assert!(embed.description.contains("Active threads: 1"));
        assert!(embed.description.contains("Stored turns: 2"));
        assert_eq!(
            embed.footer.as_deref(),
            Some("Persona: You are a helpful bank teller.")
        );
    }

    #[test]
    fn test_preview_truncates_by_chars() {
        assert_eq!(preview("short", 10), "short");
        assert_eq!(preview("ééééé", 3), "ééé…");
    }
}
