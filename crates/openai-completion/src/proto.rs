use serde::{Deserialize, Serialize};
use threadbot_completion::{Role, Turn};

use crate::OpenAIConfig;

// ------------------------------
// Types received from the server
// ------------------------------

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ChatCompletion {
    pub choices: Vec<Choice>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Choice {
    pub message: ChoiceMessage,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ChoiceMessage {
    pub content: String,
}

// ------------------------
// Types sent to the server
// ------------------------

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Message {
    System { content: String },
    User { content: String },
    Assistant { content: String },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChatCompletionRequest {
    model: String,
    messages: Vec<Message>,
    max_tokens: u32,
    temperature: f32,
}

// -----------
// Conversions
// -----------

#[inline]
pub fn create_request(
    turns: &[Turn],
    config: &OpenAIConfig,
) -> ChatCompletionRequest {
    ChatCompletionRequest {
        model: config.model.clone(),
        messages: turns.iter().map(create_message).collect(),
        max_tokens: config.max_tokens,
        temperature: crate::TEMPERATURE,
    }
}

#[inline]
fn create_message(turn: &Turn) -> Message {
    match turn.role {
        Role::Directive => Message::System {
            content: turn.content.clone(),
        },
        Role::User => Message::User {
            content: turn.content.clone(),
        },
        Role::Assistant => Message::Assistant {
            content: turn.content.clone(),
        },
    }
}
