pub mod completion;
pub mod reply_prompt;

use serde::{Deserialize, Serialize};

pub use completion::{CompletionClient, CompletionEngine};

#[derive(Debug, Serialize, Deserialize)]
pub struct PromptUsage {
    pub prompt_tokens: i64,
    pub completion_tokens: i64,
    pub total_tokens: i64,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    Stop,
    Length,
    ContentFilter,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CompletionChoice {
    pub index: i32,
    pub text: String,
    pub finish_reason: Option<FinishReason>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CompletionApiResponse {
    pub choices: Vec<CompletionChoice>,
    pub usage: Option<PromptUsage>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CompletionApiErrorDetail {
    pub message: String,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CompletionApiError {
    pub error: CompletionApiErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CompletionResponseOrError {
    Response(CompletionApiResponse),
    Error(CompletionApiError),
}
