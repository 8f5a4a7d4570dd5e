//! The boundary between FastCV and the generative-AI service

use crate::error::{FastCvError, Result};
use crate::profile::types::ResumeProfile;
use async_trait::async_trait;
use std::fmt;

/// The four AI operations FastCV relies on. Implemented by the Gemini client
/// in production and by scripted gateways in tests.
#[async_trait]
pub trait AiGateway: Send + Sync {
    /// Structure free-form career details into a resume
    async fn extract_profile(&self, raw_text: &str) -> Result<ResumeProfile>;

    /// Reframe an existing resume for a target job title
    async fn tailor_profile(&self, base: &ResumeProfile, target_job: &str) -> Result<ResumeProfile>;

    async fn write_cover_letter(&self, profile: &ResumeProfile, target_job: &str) -> Result<String>;

    /// Rewrite a single text fragment following `instruction`
    async fn rewrite_fragment(
        &self,
        fragment: &str,
        instruction: &str,
        target_job: Option<&str>,
    ) -> Result<String>;
}

/// Which AI call is in flight, for progress display and logs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Extract,
    Tailor,
    CoverLetter,
    Rewrite,
}

impl Operation {
    pub fn progress_label(&self) -> &'static str {
        match self {
            Operation::Extract => "Extracting profile details...",
            Operation::Tailor => "Tailoring resume...",
            Operation::CoverLetter => "Writing letter...",
            Operation::Rewrite => "Rewriting text...",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Extract => "extract",
            Operation::Tailor => "tailor",
            Operation::CoverLetter => "cover-letter",
            Operation::Rewrite => "rewrite",
        };
        f.write_str(name)
    }
}

/// Drop a surrounding markdown code fence (```json ... ```) if present
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(inner) = inner.strip_suffix("```") else {
        return trimmed;
    };
    // Skip the language tag line
    match inner.find('\n') {
        Some(newline) => inner[newline + 1..].trim(),
        None => inner.trim(),
    }
}

/// Parse AI output into a profile; only JSON validity is required
pub fn parse_profile_json(text: &str) -> Result<ResumeProfile> {
    let body = strip_code_fence(text);
    if body.is_empty() {
        return Err(FastCvError::EmptyResponse);
    }
    Ok(serde_json::from_str(body)?)
}

/// A gateway that may not have been set up. Commands that never reach the
/// AI run with `None`; any AI call on it reports the missing configuration.
#[async_trait]
impl<G: AiGateway> AiGateway for Option<G> {
    async fn extract_profile(&self, raw_text: &str) -> Result<ResumeProfile> {
        configured(self)?.extract_profile(raw_text).await
    }

    async fn tailor_profile(&self, base: &ResumeProfile, target_job: &str) -> Result<ResumeProfile> {
        configured(self)?.tailor_profile(base, target_job).await
    }

    async fn write_cover_letter(&self, profile: &ResumeProfile, target_job: &str) -> Result<String> {
        configured(self)?.write_cover_letter(profile, target_job).await
    }

    async fn rewrite_fragment(
        &self,
        fragment: &str,
        instruction: &str,
        target_job: Option<&str>,
    ) -> Result<String> {
        configured(self)?
            .rewrite_fragment(fragment, instruction, target_job)
            .await
    }
}

fn configured<G>(gateway: &Option<G>) -> Result<&G> {
    gateway
        .as_ref()
        .ok_or_else(|| FastCvError::Configuration("AI gateway is not configured".into()))
}
