//! Conversation shell: history, loaded captions and message augmentation

use anyhow::Context;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::path::Path;
use tracing::{debug, error, info};

use crate::agents::domain::{Message, Role};
use crate::supervisor::FactCheckPort;

pub const WELCOME_MESSAGE: &str = "Hello! I can fact-check statements, find erroneous claims \
and verify numbers. Load a caption file to have me analyze a video's content.";

const CAPTIONS_MARKER: &str = "[CAPTIONS TO ANALYZE]:";

/// Phrases that mean a message is about the loaded content
const CAPTION_KEYWORDS: &[&str] = &[
    "caption",
    "captions",
    "video",
    "transcript",
    "analyze video",
    "check video",
    "video content",
    "what does the video say",
    "analyze captions",
    "check captions",
    "video analysis",
    "check the captions",
    "misinformation",
    "fact check",
    "analyze",
    "suspicious claims",
];

/// Decides whether a message concerns the loaded content payload
pub trait ContentClassifier: Send + Sync {
    fn classify(&self, text: &str) -> bool;
}

/// Case-insensitive substring match against a keyword list
#[derive(Debug, Clone)]
pub struct KeywordClassifier {
    keywords: Vec<String>,
}

impl KeywordClassifier {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keywords: keywords
                .into_iter()
                .map(|k| k.into().to_lowercase())
                .collect(),
        }
    }
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        Self::new(CAPTION_KEYWORDS.iter().copied())
    }
}

impl ContentClassifier for KeywordClassifier {
    fn classify(&self, text: &str) -> bool {
        let lower = text.to_lowercase();
        self.keywords.iter().any(|k| lower.contains(k.as_str()))
    }
}

/// One conversation with the fact-checker
///
/// History starts with the welcome message. Failures while answering are
/// recorded as `Error: ...` assistant messages and the conversation goes on.
pub struct ConversationShell {
    classifier: Box<dyn ContentClassifier>,
    history: Vec<Message>,
    payload: Option<String>,
}

impl ConversationShell {
    pub fn new() -> Self {
        Self::with_classifier(Box::new(KeywordClassifier::default()))
    }

    pub fn with_classifier(classifier: Box<dyn ContentClassifier>) -> Self {
        Self {
            classifier,
            history: vec![Message::assistant(WELCOME_MESSAGE)],
            payload: None,
        }
    }

    pub fn history(&self) -> &[Message] {
        &self.history
    }

    pub fn payload(&self) -> Option<&str> {
        self.payload.as_deref()
    }

    /// Replace the loaded content; empty text clears it
    pub fn set_payload(&mut self, payload: impl Into<String>) {
        let payload = payload.into();
        self.payload = if payload.trim().is_empty() {
            None
        } else {
            Some(payload)
        };
    }

    pub fn clear_payload(&mut self) {
        self.payload = None;
    }

    /// Load a caption or transcript file as the payload
    pub async fn load_transcript(&mut self, path: &Path) -> anyhow::Result<()> {
        let text = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read transcript {}", path.display()))?;
        info!(path = %path.display(), bytes = text.len(), "Loaded transcript");
        self.set_payload(text);
        Ok(())
    }

    /// The query actually sent for a user message
    pub fn prepare(&self, text: &str) -> String {
        match &self.payload {
            Some(payload) if self.classifier.classify(text) => {
                debug!("Attaching loaded captions to message");
                format!("{}\n\n{}\n{}", text, CAPTIONS_MARKER, payload)
            }
            _ => text.to_string(),
        }
    }

    /// Send a message and record both sides in history
    pub async fn send(&mut self, port: &dyn FactCheckPort, text: &str) -> String {
        self.history.push(Message::user(text));
        let query = self.prepare(text);

        let reply = match AssertUnwindSafe(port.fact_check(&query)).catch_unwind().await {
            Ok(response) if !response.text().trim().is_empty() => response.text(),
            Ok(_) => "Error: no response was produced".to_string(),
            Err(_) => {
                error!("Fact-check request panicked");
                "Error: the fact-check request failed unexpectedly".to_string()
            }
        };

        self.history.push(Message::assistant(reply.clone()));
        reply
    }

    /// Number of user messages so far
    pub fn turns(&self) -> usize {
        self.history
            .iter()
            .filter(|m| m.role == Role::User)
            .count()
    }
}

impl Default for ConversationShell {
    fn default() -> Self {
        Self::new()
    }
}
