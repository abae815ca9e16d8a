//! Output format conversion for training records.

use crate::example::TrainingExample;
use serde::{Deserialize, Serialize};

/// System prompt used for every chat-format conversation.
pub const SYSTEM_PROMPT: &str = "You are a helpful email assistant. Write emails in a professional, clear, and concise manner matching the user's writing style.";

/// Dataset output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataFormat {
    Alpaca,
    Chat,
}

impl DataFormat {
    /// Tag used in file names and the trainer's `data_format` field.
    pub fn tag(&self) -> &'static str {
        match self {
            DataFormat::Alpaca => "alpaca",
            DataFormat::Chat => "chat",
        }
    }
}

impl std::fmt::Display for DataFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// Alpaca-style record: instruction/input/output, metadata dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlpacaExample {
    pub instruction: String,
    pub input: String,
    pub output: String,
}

/// A role-tagged message in a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

/// Chat-style record: a three-message system/user/assistant conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatExample {
    pub messages: Vec<ChatMessage>,
}

/// Project to Alpaca records. Total and order-preserving.
pub fn to_alpaca(examples: &[TrainingExample]) -> Vec<AlpacaExample> {
    examples
        .iter()
        .map(|ex| AlpacaExample {
            instruction: ex.instruction.clone(),
            input: ex.input.clone(),
            output: ex.output.clone(),
        })
        .collect()
}

/// Wrap into three-message conversations. Total and order-preserving.
pub fn to_chat(examples: &[TrainingExample]) -> Vec<ChatExample> {
    examples
        .iter()
        .map(|ex| ChatExample {
            messages: vec![
                ChatMessage {
                    role: "system".into(),
                    content: SYSTEM_PROMPT.into(),
                },
                ChatMessage {
                    role: "user".into(),
                    content: ex.instruction.clone(),
                },
                ChatMessage {
                    role: "assistant".into(),
                    content: ex.output.clone(),
                },
            ],
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::example::ExampleMetadata;

    fn sample(n: usize) -> Vec<TrainingExample> {
        (0..n)
            .map(|i| TrainingExample {
                instruction: format!("Write a professional email about: Subject {i}"),
                input: String::new(),
                output: format!("Body {i} long enough to have survived the cleaning floor easily."),
                metadata: ExampleMetadata {
                    email_id: format!("email-{i}"),
                    subject: format!("Subject {i}"),
                    sent_at: "2025-01-15T10:00:00Z".into(),
                    from: "me@example.com".into(),
                    to: "them@example.com".into(),
                },
            })
            .collect()
    }

    #[test]
    fn test_format_tags() {
        assert_eq!(DataFormat::Alpaca.tag(), "alpaca");
        assert_eq!(DataFormat::Chat.to_string(), "chat");
    }

    #[test]
    fn test_alpaca_total_and_order_preserving() {
        let examples = sample(5);
        let alpaca = to_alpaca(&examples);
        assert_eq!(alpaca.len(), examples.len());
        for (ex, a) in examples.iter().zip(&alpaca) {
            assert_eq!(a.instruction, ex.instruction);
            assert_eq!(a.output, ex.output);
        }
    }

    #[test]
    fn test_alpaca_drops_metadata() {
        let alpaca = to_alpaca(&sample(1));
        let json = serde_json::to_value(&alpaca[0]).unwrap();
        assert!(json.get("metadata").is_none());
        assert!(json.get("instruction").is_some());
    }

    #[test]
    fn test_chat_total_and_order_preserving() {
        let examples = sample(4);
        let chat = to_chat(&examples);
        assert_eq!(chat.len(), examples.len());
        for (ex, c) in examples.iter().zip(&chat) {
            assert_eq!(c.messages.len(), 3);
            assert_eq!(c.messages[0].role, "system");
            assert_eq!(c.messages[0].content, SYSTEM_PROMPT);
            assert_eq!(c.messages[1].role, "user");
            assert_eq!(c.messages[1].content, ex.instruction);
            assert_eq!(c.messages[2].role, "assistant");
            assert_eq!(c.messages[2].content, ex.output);
        }
    }

    #[test]
    fn test_formatters_total_on_empty_input() {
        assert!(to_alpaca(&[]).is_empty());
        assert!(to_chat(&[]).is_empty());
    }

    #[test]
    fn test_data_format_serde_tags() {
        assert_eq!(
            serde_json::to_string(&DataFormat::Alpaca).unwrap(),
            "\"alpaca\""
        );
        let parsed: DataFormat = serde_json::from_str("\"chat\"").unwrap();
        assert_eq!(parsed, DataFormat::Chat);
    }
}
