//! Platform-facing types: inbound messages, outbound embeds, and the
//! delivery port.

use threadbot_core::{ChannelId, ChannelKind, MessageMeta, Reply, ThreadId};

/// A message received from the platform gateway.
#[derive(Clone, Debug)]
pub struct InboundMessage {
    /// The channel the message was posted in. For thread messages this
    /// is the thread's own channel id.
    pub channel: ChannelId,
    /// What kind of channel that is.
    pub kind: ChannelKind,
    /// The raw message text.
    pub content: String,
    /// Whether the author is an automated account.
    pub author_is_bot: bool,
    /// The author's display name.
    pub author_name: String,
    /// Whether the assistant appears among the explicit mentions.
    pub mentions_assistant: bool,
}

impl InboundMessage {
    /// Returns the view of this message the trigger policy inspects.
    #[inline]
    pub fn meta(&self) -> MessageMeta<'_> {
        MessageMeta {
            content: &self.content,
            author_is_bot: self.author_is_bot,
            channel: self.kind,
            mentions_assistant: self.mentions_assistant,
        }
    }

    /// Returns the thread this message belongs to, if it was posted in
    /// one. Thread channels double as conversation keys.
    #[inline]
    pub fn thread(&self) -> Option<ThreadId> {
        matches!(self.kind, ChannelKind::Thread { .. })
            .then(|| ThreadId(self.channel.0))
    }
}

/// An RGB accent color for embeds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Color(pub u32);

impl Color {
    /// Success accent.
    pub const GREEN: Color = Color(0x2ecc71);
    /// Informational accent.
    pub const BLUE: Color = Color(0x3498db);
    /// Warning accent.
    pub const ORANGE: Color = Color(0xe67e22);
}

/// A rich outbound card.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Embed {
    /// The card title.
    pub title: String,
    /// The card body.
    pub description: String,
    /// The accent color.
    pub color: Color,
    /// An optional small footer line.
    pub footer: Option<String>,
}

/// The outbound half of the platform connection.
///
/// Delivery is fire-and-forget: the pipeline has nothing useful to do
/// when the platform drops a message, so the port absorbs failures
/// after logging them.
pub trait ChatPort: Send + Sync {
    /// Sends a plain text message to the channel.
    fn send_text(
        &self,
        channel: ChannelId,
        text: &str,
    ) -> impl Future<Output = ()> + Send;

    /// Sends a rich embed to the channel.
    fn send_embed(
        &self,
        channel: ChannelId,
        embed: &Embed,
    ) -> impl Future<Output = ()> + Send;

    /// Signals that the assistant is composing a reply.
    fn typing(&self, channel: ChannelId) -> impl Future<Output = ()> + Send;
}

/// Delivers a pipeline reply to the channel, one message per chunk,
/// in order.
pub async fn deliver_reply<P: ChatPort>(
    port: &P,
    channel: ChannelId,
    reply: Reply,
) {
    for message in reply.into_messages() {
        port.send_text(channel, &message).await;
    }
}
