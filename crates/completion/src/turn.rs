use serde::{Deserialize, Serialize};

/// The role tag of a conversation turn.
///
/// Roles form a closed set so that illegal transcripts (say, a
/// free-form role string smuggling in a second directive) are
/// unrepresentable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The persona directive that frames the conversation.
    Directive,
    /// A message authored by a human participant.
    User,
    /// A reply generated by the assistant.
    Assistant,
}

/// One role-tagged message in a conversation.
///
/// Turns are immutable once appended to a transcript.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Turn {
    /// The role that authored this turn.
    pub role: Role,
    /// The textual content.
    pub content: String,
}

impl Turn {
    /// Creates a directive turn.
    #[inline]
    pub fn directive<S: Into<String>>(content: S) -> Self {
        Self {
            role: Role::Directive,
            content: content.into(),
        }
    }

    /// Creates a user turn.
    #[inline]
    pub fn user<S: Into<String>>(content: S) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Creates an assistant turn.
    #[inline]
    pub fn assistant<S: Into<String>>(content: S) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}
