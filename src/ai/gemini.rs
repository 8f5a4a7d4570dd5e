//! Gemini REST implementation of the AI gateway

use crate::ai::gateway::{parse_profile_json, AiGateway, Operation};
use crate::ai::prompts::{
    PromptTemplates, COVER_LETTER_SYSTEM_INSTRUCTION, REWRITE_SYSTEM_INSTRUCTION,
    TAILOR_SYSTEM_INSTRUCTION,
};
use crate::ai::schema::resume_schema;
use crate::config::Config;
use crate::error::{FastCvError, Result};
use crate::profile::types::ResumeProfile;
use async_trait::async_trait;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

const USER_AGENT: &str = concat!("fastcv/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct GeminiSettings {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
    pub max_retries: u32,
    pub extract_temperature: f32,
    pub tailor_temperature: f32,
    pub cover_letter_temperature: f32,
    pub rewrite_temperature: f32,
}

impl GeminiSettings {
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            api_key: config.resolve_api_key()?,
            base_url: config.ai.base_url.trim_end_matches('/').to_string(),
            model: config.ai.model.trim_start_matches("models/").to_string(),
            timeout: Duration::from_secs(config.ai.timeout_secs.max(1)),
            max_retries: config.ai.max_retries,
            extract_temperature: config.ai.extract_temperature,
            tailor_temperature: config.ai.tailor_temperature,
            cover_letter_temperature: config.ai.cover_letter_temperature,
            rewrite_temperature: config.ai.rewrite_temperature,
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    thought: Option<bool>,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: Option<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: Option<String>,
    status: Option<String>,
}

impl Content {
    fn text(role: Option<&str>, text: &str) -> Self {
        Self {
            role: role.map(String::from),
            parts: vec![Part {
                text: Some(text.to_string()),
                thought: None,
            }],
        }
    }
}

impl GenerationConfig {
    fn json(temperature: f32) -> Self {
        Self {
            temperature: Some(temperature),
            response_mime_type: Some("application/json".to_string()),
            response_schema: Some(resume_schema()),
        }
    }

    fn text(temperature: f32) -> Self {
        Self {
            temperature: Some(temperature),
            ..Default::default()
        }
    }
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate, skipping thought parts
    fn into_text(self) -> Result<String> {
        let candidate = match self.candidates.into_iter().next() {
            Some(candidate) => candidate,
            None => {
                let reason = self.prompt_feedback.and_then(|feedback| feedback.block_reason);
                return Err(match reason {
                    Some(reason) => FastCvError::Blocked(reason),
                    None => FastCvError::EmptyResponse,
                });
            }
        };

        let text: String = candidate
            .content
            .map(|content| content.parts)
            .unwrap_or_default()
            .into_iter()
            .filter(|part| part.thought != Some(true))
            .filter_map(|part| part.text)
            .collect();

        if text.trim().is_empty() {
            return Err(match candidate.finish_reason.as_deref() {
                Some(reason @ ("SAFETY" | "RECITATION" | "PROHIBITED_CONTENT" | "BLOCKLIST")) => {
                    FastCvError::Blocked(reason.to_string())
                }
                _ => FastCvError::EmptyResponse,
            });
        }
        Ok(text)
    }
}

/// Client for `models/{model}:generateContent`
pub struct GeminiGateway {
    client: reqwest::Client,
    settings: GeminiSettings,
    templates: PromptTemplates,
}

impl GeminiGateway {
    pub fn new(settings: GeminiSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            settings,
            templates: PromptTemplates::default(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(GeminiSettings::from_config(config)?)
    }

    pub fn model(&self) -> &str {
        &self.settings.model
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.settings.base_url, self.settings.model)
    }

    async fn generate(
        &self,
        operation: Operation,
        prompt: String,
        system_instruction: Option<&str>,
        generation_config: GenerationConfig,
    ) -> Result<String> {
        let request = GenerateContentRequest {
            system_instruction: system_instruction.map(|text| Content::text(None, text)),
            contents: vec![Content::text(Some("user"), &prompt)],
            generation_config,
        };

        let mut attempt = 0;
        loop {
            match self.send(&request).await {
                Ok(response) => {
                    let text = response.into_text()?;
                    info!("Gemini {} call succeeded ({} chars)", operation, text.len());
                    return Ok(text);
                }
                Err(e) if e.is_transient() && attempt < self.settings.max_retries => {
                    attempt += 1;
                    let delay = Duration::from_millis(500 * (1u64 << (attempt - 1).min(6)));
                    warn!(
                        "Gemini {} call failed ({}), retrying in {}ms (attempt {}/{})",
                        operation,
                        e,
                        delay.as_millis(),
                        attempt,
                        self.settings.max_retries
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    warn!("Gemini {} call failed: {}", operation, e);
                    return Err(e);
                }
            }
        }
    }

    async fn send(&self, request: &GenerateContentRequest) -> Result<GenerateContentResponse> {
        debug!("POST {}", self.endpoint());
        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.settings.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(FastCvError::AiService {
                status: status.as_u16(),
                message: api_error_message(&body),
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

fn api_error_message(body: &str) -> String {
    let parsed = serde_json::from_str::<ApiErrorResponse>(body)
        .ok()
        .and_then(|response| response.error);
    match parsed {
        Some(ApiErrorDetail {
            message: Some(message),
            ..
        }) => message,
        Some(ApiErrorDetail {
            status: Some(status),
            ..
        }) => status,
        _ if body.trim().is_empty() => "no response body".to_string(),
        _ => body.trim().chars().take(200).collect(),
    }
}

/// Drop one pair of quotes around the whole answer; quotes inside the text stay
fn strip_wrapping_quotes(text: &str) -> &str {
    match text.strip_prefix('"').and_then(|rest| rest.strip_suffix('"')) {
        Some(inner) if !inner.contains('"') => inner.trim(),
        _ => text,
    }
}

#[async_trait]
impl AiGateway for GeminiGateway {
    async fn extract_profile(&self, raw_text: &str) -> Result<ResumeProfile> {
        let prompt = self.templates.render_extract(raw_text);
        let config = GenerationConfig::json(self.settings.extract_temperature);
        let text = self.generate(Operation::Extract, prompt, None, config).await?;
        parse_profile_json(&text)
    }

    async fn tailor_profile(&self, base: &ResumeProfile, target_job: &str) -> Result<ResumeProfile> {
        let prompt = self.templates.render_tailor(base, target_job)?;
        let config = GenerationConfig::json(self.settings.tailor_temperature);
        let text = self
            .generate(Operation::Tailor, prompt, Some(TAILOR_SYSTEM_INSTRUCTION), config)
            .await?;
        parse_profile_json(&text)
    }

    async fn write_cover_letter(&self, profile: &ResumeProfile, target_job: &str) -> Result<String> {
        let prompt = self.templates.render_cover_letter(profile, target_job)?;
        let config = GenerationConfig::text(self.settings.cover_letter_temperature);
        let text = self
            .generate(
                Operation::CoverLetter,
                prompt,
                Some(COVER_LETTER_SYSTEM_INSTRUCTION),
                config,
            )
            .await?;
        Ok(text.trim().to_string())
    }

    async fn rewrite_fragment(
        &self,
        fragment: &str,
        instruction: &str,
        target_job: Option<&str>,
    ) -> Result<String> {
        let prompt = self.templates.render_rewrite(fragment, instruction, target_job);
        let config = GenerationConfig::text(self.settings.rewrite_temperature);
        let text = self
            .generate(Operation::Rewrite, prompt, Some(REWRITE_SYSTEM_INSTRUCTION), config)
            .await?;
        Ok(strip_wrapping_quotes(text.trim()).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_request_shape() {
        let request = GenerateContentRequest {
            system_instruction: Some(Content::text(None, "be strict")),
            contents: vec![Content::text(Some("user"), "hello")],
            generation_config: GenerationConfig::json(0.2),
        };
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["contents"][0]["role"], "user");
        assert_eq!(value["contents"][0]["parts"][0]["text"], "hello");
        assert_eq!(value["systemInstruction"]["parts"][0]["text"], "be strict");
        assert!(value["systemInstruction"].get("role").is_none());
        assert_eq!(value["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(value["generationConfig"]["responseSchema"]["type"], "OBJECT");
    }

    #[test]
    fn test_text_request_has_no_schema() {
        let value = serde_json::to_value(GenerationConfig::text(0.7)).unwrap();
        assert!(value.get("responseSchema").is_none());
        assert!(value.get("responseMimeType").is_none());
    }

    #[test]
    fn test_response_text_joins_parts_and_skips_thoughts() {
        let body = r#"{"candidates":[{"content":{"role":"model","parts":[
            {"text":"thinking...","thought":true},
            {"text":"{\"fullName\":"},
            {"text":"\"Jane\"}"}
        ]},"finishReason":"STOP"}]}"#;
        let response: GenerateContentResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.into_text().unwrap(), "{\"fullName\":\"Jane\"}");
    }

    #[test]
    fn test_blocked_and_empty_responses() {
        let blocked: GenerateContentResponse =
            serde_json::from_str(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#).unwrap();
        assert!(matches!(blocked.into_text(), Err(FastCvError::Blocked(r)) if r == "SAFETY"));

        let empty: GenerateContentResponse =
            serde_json::from_str(r#"{"candidates":[{"content":{"parts":[]},"finishReason":"STOP"}]}"#).unwrap();
        assert!(matches!(empty.into_text(), Err(FastCvError::EmptyResponse)));
    }

    #[test]
    fn test_api_error_message() {
        let body = r#"{"error":{"code":400,"message":"API key not valid","status":"INVALID_ARGUMENT"}}"#;
        assert_eq!(api_error_message(body), "API key not valid");
        assert_eq!(api_error_message(""), "no response body");
        assert_eq!(api_error_message("Bad Gateway"), "Bad Gateway");
    }

    #[test]
    fn test_strip_wrapping_quotes() {
        assert_eq!(strip_wrapping_quotes("\"Led the team\""), "Led the team");
        assert_eq!(
            strip_wrapping_quotes("Won the \"Engineer of the Year\""),
            "Won the \"Engineer of the Year\""
        );
        assert_eq!(
            strip_wrapping_quotes("\"Fast\" and \"safe\""),
            "\"Fast\" and \"safe\""
        );
        assert_eq!(strip_wrapping_quotes("\""), "\"");
    }
}
