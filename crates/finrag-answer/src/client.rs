//! Chat-completion client: one stateless round trip per query against an
//! OpenAI-style `/chat/completions` endpoint. The only decision point is
//! the forced-vs-auto tool choice, a pure function of the query string.

use serde_json::{json, Value};

use finrag_core::config::Config;

use crate::prompt::{build_user_message, SYSTEM_PROMPT};
use crate::tool::{cusip_tool_definition, tool_choice_for_query, CUSIP_TOOL_NAME};
use crate::types::{AnswerError, AnswerResult, GenerationParams};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4-turbo";

pub struct Answerer {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    params: GenerationParams,
}

impl Answerer {
    pub fn new(base_url: &str, api_key: &str, model: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            params: GenerationParams::default(),
        }
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let base_url = config.get_or("llm.base_url", DEFAULT_BASE_URL.to_string())?;
        let model = config.get_or("llm.model", DEFAULT_MODEL.to_string())?;
        let api_key = config.api_key("llm.api_key", "OPENAI_API_KEY");
        if api_key.is_empty() {
            anyhow::bail!("no LLM API key configured (llm.api_key or OPENAI_API_KEY)");
        }
        Ok(Self::new(&base_url, &api_key, &model))
    }

    /// One generation round trip. `context_chunks` arrive in retrieval
    /// order and go into the prompt unchanged; if together they exceed the
    /// model's context window the API call fails and that error is
    /// returned like any other.
    pub async fn answer(
        &self,
        query: &str,
        context_chunks: &[String],
    ) -> Result<AnswerResult, AnswerError> {
        let body = self.build_body(query, context_chunks);
        tracing::debug!(
            model = %self.model,
            chunks = context_chunks.len(),
            forced_tool = crate::tool::is_cusip_listing_query(query),
            "dispatching chat completion"
        );
        let url = format!("{}/chat/completions", self.base_url);
        let resp = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| AnswerError::Http(format!("{url}: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(AnswerError::Api { status, body });
        }

        let payload: Value = resp
            .json()
            .await
            .map_err(|e| AnswerError::MalformedResponse(e.to_string()))?;
        parse_response(&payload)
    }

    fn build_body(&self, query: &str, context_chunks: &[String]) -> Value {
        json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": build_user_message(context_chunks, query) },
            ],
            "tools": [cusip_tool_definition()],
            "tool_choice": tool_choice_for_query(query),
            "temperature": self.params.temperature,
            "top_p": self.params.top_p,
            "frequency_penalty": self.params.frequency_penalty,
            "presence_penalty": self.params.presence_penalty,
        })
    }
}

/// Interpret a chat-completion payload: a `list_cusip_numbers` tool call
/// wins over free text; free text is trimmed; neither is an error the
/// caller can distinguish from transport failures.
pub fn parse_response(payload: &Value) -> Result<AnswerResult, AnswerError> {
    let choice = payload["choices"]
        .get(0)
        .ok_or_else(|| AnswerError::MalformedResponse("no choices in response".into()))?;
    let message = &choice["message"];

    if let Some(calls) = message["tool_calls"].as_array() {
        for call in calls {
            if call["function"]["name"] == CUSIP_TOOL_NAME {
                let raw_args = call["function"]["arguments"].as_str().ok_or_else(|| {
                    AnswerError::MalformedResponse("tool call without string arguments".into())
                })?;
                let args: Value = serde_json::from_str(raw_args).map_err(|e| {
                    AnswerError::MalformedResponse(format!("tool arguments not JSON: {e}"))
                })?;
                let cusips = args["cusip_list"]
                    .as_array()
                    .map(|list| {
                        list.iter()
                            .filter_map(|v| v.as_str().map(String::from))
                            .collect()
                    })
                    .unwrap_or_default();
                return Ok(AnswerResult::CusipList(cusips));
            }
        }
    }

    match message["content"].as_str() {
        Some(content) => Ok(AnswerResult::Text(content.trim().to_string())),
        None => Err(AnswerError::EmptyResponse),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_call_yields_cusip_list() {
        let payload = json!({
            "choices": [{
                "message": {
                    "content": null,
                    "tool_calls": [{
                        "id": "call_1",
                        "function": {
                            "name": "list_cusip_numbers",
                            "arguments": "{\"cusip_list\":[\"037833100\",\"17275R102\"]}"
                        }
                    }]
                }
            }]
        });
        let result = parse_response(&payload).expect("parse");
        assert_eq!(
            result,
            AnswerResult::CusipList(vec!["037833100".to_string(), "17275R102".to_string()])
        );
    }

    #[test]
    fn tool_call_with_missing_list_yields_empty_list() {
        let payload = json!({
            "choices": [{
                "message": {
                    "tool_calls": [{
                        "function": { "name": "list_cusip_numbers", "arguments": "{}" }
                    }]
                }
            }]
        });
        assert_eq!(
            parse_response(&payload).expect("parse"),
            AnswerResult::CusipList(vec![])
        );
    }

    #[test]
    fn free_text_is_trimmed() {
        let payload = json!({
            "choices": [{
                "message": { "content": "  Total revenue in 2023 was $12M.\n" }
            }]
        });
        assert_eq!(
            parse_response(&payload).expect("parse"),
            AnswerResult::Text("Total revenue in 2023 was $12M.".to_string())
        );
    }

    #[test]
    fn unknown_tool_call_falls_back_to_content() {
        let payload = json!({
            "choices": [{
                "message": {
                    "content": "see below",
                    "tool_calls": [{
                        "function": { "name": "other_tool", "arguments": "{}" }
                    }]
                }
            }]
        });
        assert_eq!(
            parse_response(&payload).expect("parse"),
            AnswerResult::Text("see below".to_string())
        );
    }

    #[test]
    fn empty_message_is_a_typed_error() {
        let payload = json!({ "choices": [{ "message": { "content": null } }] });
        assert!(matches!(parse_response(&payload), Err(AnswerError::EmptyResponse)));
    }

    #[test]
    fn missing_choices_is_malformed() {
        let payload = json!({ "error": "rate limited" });
        assert!(matches!(
            parse_response(&payload),
            Err(AnswerError::MalformedResponse(_))
        ));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_typed_http_error() {
        // Port 1 refuses connections; the failure must surface as
        // AnswerError::Http so the caller can render an empty result and
        // keep its loop running.
        let answerer = Answerer::new("http://127.0.0.1:1", "test-key", "gpt-4-turbo");
        let err = answerer
            .answer("What is the total revenue?", &["Revenue: $12M in 2023".to_string()])
            .await
            .expect_err("connection should fail");
        assert!(matches!(err, AnswerError::Http(_)));
    }

    #[test]
    fn invalid_tool_arguments_are_malformed() {
        let payload = json!({
            "choices": [{
                "message": {
                    "tool_calls": [{
                        "function": { "name": "list_cusip_numbers", "arguments": "not json" }
                    }]
                }
            }]
        });
        assert!(matches!(
            parse_response(&payload),
            Err(AnswerError::MalformedResponse(_))
        ));
    }
}
