use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    #[serde(default)]
    pub name: Option<String>,
    pub email: String,
}

/// Attachment metadata as listed on a message or returned by the files endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMeta {
    pub id: String,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    #[serde(default)]
    pub thread_id: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub from: Vec<Participant>,
    #[serde(default)]
    pub to: Vec<Participant>,
    #[serde(default)]
    pub cc: Vec<Participant>,
    /// Unix timestamp (seconds)
    #[serde(default)]
    pub date: Option<i64>,
    #[serde(default)]
    pub snippet: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub unread: Option<bool>,
    #[serde(default)]
    pub files: Vec<FileMeta>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thread {
    pub id: String,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub snippet: Option<String>,
    #[serde(default)]
    pub participants: Vec<Participant>,
    #[serde(default)]
    pub last_message_timestamp: Option<i64>,
    #[serde(default)]
    pub unread: Option<bool>,
    #[serde(default)]
    pub message_ids: Vec<String>,
    /// Only populated when the thread was fetched with the expanded view.
    #[serde(default)]
    pub messages: Vec<Message>,
}

impl Thread {
    /// Sender of the first message, then the first thread participant.
    pub fn sender_email(&self) -> String {
        self.messages
            .first()
            .and_then(|m| m.from.first())
            .or_else(|| self.participants.first())
            .map(|p| p.email.clone())
            .unwrap_or_default()
    }

    pub fn subject_or_empty(&self) -> &str {
        self.subject.as_deref().unwrap_or("")
    }

    pub fn snippet_or_empty(&self) -> &str {
        self.snippet.as_deref().unwrap_or("")
    }
}
