use thiserror::Error;

/// Outcome of one generation round trip.
///
/// `CusipList` is produced when the model invokes the listing tool;
/// `Text` is the trimmed free-text answer otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerResult {
    Text(String),
    CusipList(Vec<String>),
}

/// Generation failures, distinguished so the caller can tell "the call
/// failed" from "the model produced nothing". The original tool collapsed
/// all of these into a silently logged missing result.
#[derive(Debug, Error)]
pub enum AnswerError {
    #[error("chat request failed: {0}")]
    Http(String),

    #[error("chat API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("malformed chat response: {0}")]
    MalformedResponse(String),

    #[error("model returned neither content nor a tool call")]
    EmptyResponse,
}

/// Fixed sampling parameters for the financial-analysis prompt.
#[derive(Debug, Clone, Copy)]
pub struct GenerationParams {
    pub temperature: f32,
    pub top_p: f32,
    pub frequency_penalty: f32,
    pub presence_penalty: f32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: 0.2,
            top_p: 0.8,
            frequency_penalty: 0.0,
            presence_penalty: 0.0,
        }
    }
}
