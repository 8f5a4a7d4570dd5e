//! Prompt templates for the generative-AI service

use crate::error::Result;
use crate::profile::types::ResumeProfile;
use log::debug;

pub const TAILOR_SYSTEM_INSTRUCTION: &str = "You are an expert resume tailor. You strictly return valid JSON matching the requested schema without any markdown formatting.";

pub const COVER_LETTER_SYSTEM_INSTRUCTION: &str = "You are an expert career writer. Return only the body of the letter as plain text, without markdown formatting or placeholders in square brackets.";

pub const REWRITE_SYSTEM_INSTRUCTION: &str = "You are a precise resume editor. Return only the rewritten text, with no quotes, labels or commentary.";

#[derive(Debug, Clone)]
pub struct PromptTemplates {
    pub extract: String,
    pub tailor: String,
    pub cover_letter: String,
    pub rewrite: String,
}

impl Default for PromptTemplates {
    fn default() -> Self {
        Self {
            extract: EXTRACT_TEMPLATE.to_string(),
            tailor: TAILOR_TEMPLATE.to_string(),
            cover_letter: COVER_LETTER_TEMPLATE.to_string(),
            rewrite: REWRITE_TEMPLATE.to_string(),
        }
    }
}

impl PromptTemplates {
    pub fn render_extract(&self, raw_text: &str) -> String {
        let prompt = fill(&self.extract, &[("raw_text", raw_text.trim())]);
        debug!("Extraction prompt: {} chars", prompt.len());
        prompt
    }

    pub fn render_tailor(&self, base: &ResumeProfile, target_job: &str) -> Result<String> {
        let profile_json = serde_json::to_string_pretty(base)?;
        let prompt = fill(
            &self.tailor,
            &[("target_job", target_job.trim()), ("profile_json", &profile_json)],
        );
        debug!("Tailoring prompt: {} chars", prompt.len());
        Ok(prompt)
    }

    pub fn render_cover_letter(&self, profile: &ResumeProfile, target_job: &str) -> Result<String> {
        // The letter is written from the resume, not from a previous letter
        let mut resume = profile.clone();
        resume.cover_letter = None;
        let profile_json = serde_json::to_string_pretty(&resume)?;
        let prompt = fill(
            &self.cover_letter,
            &[
                ("target_job", target_job.trim()),
                ("full_name", profile.display_name()),
                ("profile_json", &profile_json),
            ],
        );
        debug!("Cover letter prompt: {} chars", prompt.len());
        Ok(prompt)
    }

    pub fn render_rewrite(&self, fragment: &str, instruction: &str, target_job: Option<&str>) -> String {
        let instruction = if instruction.trim().is_empty() {
            DEFAULT_REWRITE_INSTRUCTION
        } else {
            instruction.trim()
        };
        let context = match target_job.map(str::trim).filter(|job| !job.is_empty()) {
            Some(job) => format!("The resume is targeted at a \"{}\" position.", job),
            None => String::from("The resume is not targeted at a specific position."),
        };
        fill(
            &self.rewrite,
            &[
                ("instruction", instruction),
                ("context", &context),
                ("fragment", fragment.trim()),
            ],
        )
    }
}

/// Substitute `{name}` placeholders in one pass; inserted values are never rescanned
fn fill(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let found = after.find('}').and_then(|close| {
            let name = &after[..close];
            values
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (close, *value))
        });
        match found {
            Some((close, value)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

pub const DEFAULT_REWRITE_INSTRUCTION: &str =
    "Make it more concise and impactful, starting with a strong action verb.";

const EXTRACT_TEMPLATE: &str = r#"Extract standard resume fields from the following text.
If some contact info is missing, leave it blank.
Format the experience descriptions as clean bullet points.

Raw Text:
---
{raw_text}
---"#;

const TAILOR_TEMPLATE: &str = r#"Act as an expert career coach and resume writer.
I will provide a 'Base Profile' (JSON) and a 'Target Job Title'.
Your task is to tailor the Base Profile specifically for the Target Job Title to maximize the chances of getting an interview.

Rules:
1. Rewrite the 'summary' to highlight why the candidate is a perfect fit for a "{target_job}".
2. Rewrite and prioritize the 'experience.description' bullet points. Emphasize transferable skills, relevant achievements, and use strong action verbs related to the "{target_job}".
3. You may reorder or filter the 'skills' list to put the most relevant ones first.
4. DO NOT invent fake jobs, fake degrees, or entirely new experiences. Only reframe existing facts.
5. Keep contact info, company names, dates, and degree names unchanged.

Target Job Title: {target_job}

Base Profile JSON:
---
{profile_json}
---"#;

const COVER_LETTER_TEMPLATE: &str = r#"Write a professional, persuasive cover letter for {full_name} applying for a "{target_job}" position.

Rules:
1. Three to four short paragraphs, under 350 words in total.
2. Open with a greeting such as "Dear Hiring Manager,".
3. Connect the candidate's real experience and skills from the resume below to the "{target_job}" role.
4. DO NOT invent employers, degrees, metrics or achievements that are not in the resume.
5. Close with a call to action and sign off with the candidate's name.

Resume JSON:
---
{profile_json}
---"#;

const REWRITE_TEMPLATE: &str = r#"Rewrite the following resume text.
Instruction: {instruction}
{context}
Keep the facts unchanged and keep roughly the same length unless the instruction says otherwise.

Text:
---
{fragment}
---"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_rendering() {
        let templates = PromptTemplates::default();
        let prompt = templates.render_extract("  Jane Doe, Rust developer at Acme  ");

        assert!(prompt.contains("---\nJane Doe, Rust developer at Acme\n---"));
        assert!(prompt.contains("leave it blank"));
    }

    #[test]
    fn test_tailor_rendering() {
        let templates = PromptTemplates::default();
        let profile = ResumeProfile {
            full_name: "Jane Doe".into(),
            skills: vec!["Rust".into()],
            ..Default::default()
        };
        let prompt = templates.render_tailor(&profile, "Platform Engineer").unwrap();

        assert!(prompt.contains("Target Job Title: Platform Engineer"));
        assert!(prompt.contains("perfect fit for a \"Platform Engineer\""));
        assert!(prompt.contains("\"fullName\": \"Jane Doe\""));
        assert!(!prompt.contains("{target_job}"));
        assert!(!prompt.contains("{profile_json}"));
    }

    #[test]
    fn test_cover_letter_omits_previous_letter() {
        let templates = PromptTemplates::default();
        let profile = ResumeProfile {
            full_name: "Jane Doe".into(),
            cover_letter: Some("Old letter text".into()),
            ..Default::default()
        };
        let prompt = templates.render_cover_letter(&profile, "SRE").unwrap();

        assert!(prompt.contains("for Jane Doe applying for a \"SRE\" position"));
        assert!(!prompt.contains("Old letter text"));
    }

    #[test]
    fn test_rewrite_defaults() {
        let templates = PromptTemplates::default();
        let prompt = templates.render_rewrite("Did stuff with servers", "", None);

        assert!(prompt.contains(DEFAULT_REWRITE_INSTRUCTION));
        assert!(prompt.contains("not targeted at a specific position"));
        assert!(prompt.contains("Did stuff with servers"));

        let targeted = templates.render_rewrite("Did stuff", "Add metrics", Some("DevOps Lead"));
        assert!(targeted.contains("Instruction: Add metrics"));
        assert!(targeted.contains("\"DevOps Lead\" position"));
    }

    #[test]
    fn test_placeholders_in_user_text_stay_literal() {
        let templates = PromptTemplates::default();
        let prompt = templates.render_rewrite("Shipped {context} parser", "Mention {fragment} twice", None);

        assert!(prompt.contains("Instruction: Mention {fragment} twice"));
        assert!(prompt.contains("Shipped {context} parser"));
        assert_eq!(prompt.matches("Shipped {context} parser").count(), 1);
    }

    #[test]
    fn test_fill_leaves_unknown_braces() {
        assert_eq!(fill("{a} {b} {", &[("a", "{b}")]), "{b} {b} {");
    }
}
