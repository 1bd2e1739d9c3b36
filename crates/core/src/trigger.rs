//! The gating decision of whether an inbound message warrants a
//! response.

use std::fmt;

/// Identifier of a platform channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChannelId(pub u64);

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Where a message was posted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChannelKind {
    /// A regular channel.
    Standard,
    /// A threaded sub-channel rooted under a parent channel.
    Thread {
        /// The parent channel this thread belongs to.
        parent: ChannelId,
    },
}

/// The subset of an inbound message the trigger policy looks at.
#[derive(Clone, Copy, Debug)]
pub struct MessageMeta<'a> {
    /// The raw message text.
    pub content: &'a str,
    /// Whether the author is an automated account.
    pub author_is_bot: bool,
    /// The kind of channel the message was posted in.
    pub channel: ChannelKind,
    /// Whether the assistant appears among the explicit mentions.
    pub mentions_assistant: bool,
}

/// Decides whether the assistant must respond to a message.
///
/// Implementations are pure decision functions with no side effects,
/// so the heuristic can later be swapped for a stricter classifier
/// without touching the orchestrator.
pub trait TriggerPolicy: Send + Sync {
    /// Returns `true` if the assistant should respond.
    fn should_engage(&self, msg: &MessageMeta<'_>) -> bool;
}

/// Interrogative lead tokens that engage the assistant without an
/// explicit mention.
const QUESTION_LEADS: [&str; 6] = ["help", "how", "what", "why", "can", "?"];

/// The prefix that marks a message as belonging to the platform's
/// command layer.
const COMMAND_PREFIX: char = '!';

/// The default prefix-heuristic policy.
///
/// This is a heuristic, not a natural-language classifier; false
/// negatives and false positives are expected and acceptable.
#[derive(Clone, Copy, Debug)]
pub struct HeuristicTrigger {
    forum_channel: ChannelId,
}

impl HeuristicTrigger {
    /// Creates a policy scoped to threads under the given forum
    /// channel.
    #[inline]
    pub fn new(forum_channel: ChannelId) -> Self {
        Self { forum_channel }
    }
}

impl TriggerPolicy for HeuristicTrigger {
    fn should_engage(&self, msg: &MessageMeta<'_>) -> bool {
        // Automated authors (ourselves included) never get a reply,
        // otherwise two bots can ping-pong forever.
        if msg.author_is_bot {
            return false;
        }

        let in_forum_thread = matches!(
            msg.channel,
            ChannelKind::Thread { parent } if parent == self.forum_channel
        );
        if !in_forum_thread {
            return false;
        }

        let content = msg.content.trim();
        if content.starts_with(COMMAND_PREFIX) {
            return false;
        }
        if msg.mentions_assistant {
            return true;
        }

        let lowered = content.to_lowercase();
        QUESTION_LEADS.iter().any(|lead| lowered.starts_with(lead))
    }
}
