//! Resume data model
//!
//! Field names serialize in camelCase so the same structs round-trip through
//! the AI response schema and the local store. Every field defaults when
//! absent: AI output is only required to be valid JSON.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResumeProfile {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub summary: String,
    pub skills: Vec<String>,
    pub experience: Vec<Experience>,
    pub education: Vec<Education>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_letter: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Experience {
    pub company: String,
    pub role: String,
    pub start_date: String,
    pub end_date: String,
    pub description: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Education {
    pub institution: String,
    pub degree: String,
    pub year: String,
}

/// A saved snapshot of a generated or edited resume
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CVRecord {
    pub id: String,
    pub target_job: String,
    pub date: String,
    pub profile: ResumeProfile,
}

/// Which rendition of the active document is shown and exported
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum View {
    #[default]
    Resume,
    CoverLetter,
}

/// The working document between invocations
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Session {
    pub profile: ResumeProfile,
    pub target_job: String,
    pub view: View,
}

impl ResumeProfile {
    pub fn is_blank(&self) -> bool {
        self.full_name.trim().is_empty()
            && self.summary.trim().is_empty()
            && self.skills.is_empty()
            && self.experience.is_empty()
            && self.education.is_empty()
    }

    pub fn role_count(&self) -> usize {
        self.experience.len()
    }

    pub fn skill_count(&self) -> usize {
        self.skills.len()
    }

    pub fn has_cover_letter(&self) -> bool {
        self.cover_letter
            .as_deref()
            .map(|letter| !letter.trim().is_empty())
            .unwrap_or(false)
    }

    /// Name used in headers, falling back to a placeholder
    pub fn display_name(&self) -> &str {
        if self.full_name.trim().is_empty() {
            "Your Name"
        } else {
            self.full_name.trim()
        }
    }

    /// Non-empty contact fields in display order
    pub fn contact_line(&self) -> Vec<&str> {
        [&self.email, &self.phone, &self.location]
            .into_iter()
            .map(|field| field.trim())
            .filter(|field| !field.is_empty())
            .collect()
    }
}

impl Experience {
    /// "Jan 2020 - Present" style period, tolerating missing ends
    pub fn period(&self) -> String {
        match (self.start_date.trim(), self.end_date.trim()) {
            ("", "") => String::new(),
            (start, "") => start.to_string(),
            ("", end) => end.to_string(),
            (start, end) => format!("{} - {}", start, end),
        }
    }
}

impl Session {
    pub fn new(profile: ResumeProfile) -> Self {
        Self {
            profile,
            target_job: String::new(),
            view: View::Resume,
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            View::Resume => write!(f, "resume"),
            View::CoverLetter => write!(f, "cover-letter"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_ai_output_parses() {
        let json = r#"{"fullName":"Ada Lovelace","skills":["Math"],"experience":[{"company":"Analytical Engines"}]}"#;
        let profile: ResumeProfile = serde_json::from_str(json).unwrap();

        assert_eq!(profile.full_name, "Ada Lovelace");
        assert_eq!(profile.email, "");
        assert_eq!(profile.skills, vec!["Math"]);
        assert_eq!(profile.experience[0].company, "Analytical Engines");
        assert!(profile.experience[0].description.is_empty());
        assert!(profile.cover_letter.is_none());
    }

    #[test]
    fn test_camel_case_serialization() {
        let profile = ResumeProfile {
            full_name: "Grace Hopper".into(),
            experience: vec![Experience {
                start_date: "1944".into(),
                ..Default::default()
            }],
            ..Default::default()
        };
        let json = serde_json::to_string(&profile).unwrap();

        assert!(json.contains("\"fullName\":\"Grace Hopper\""));
        assert!(json.contains("\"startDate\":\"1944\""));
        assert!(!json.contains("coverLetter"));
    }

    #[test]
    fn test_experience_period() {
        let mut exp = Experience {
            start_date: "Jan 2020".into(),
            end_date: "Present".into(),
            ..Default::default()
        };
        assert_eq!(exp.period(), "Jan 2020 - Present");

        exp.end_date.clear();
        assert_eq!(exp.period(), "Jan 2020");
    }

    #[test]
    fn test_display_name_placeholder() {
        let profile = ResumeProfile::default();
        assert_eq!(profile.display_name(), "Your Name");
        assert!(profile.is_blank());
        assert!(profile.contact_line().is_empty());
    }

    #[test]
    fn test_view_serializes_kebab_case() {
        let session = Session {
            view: View::CoverLetter,
            ..Default::default()
        };
        let json = serde_json::to_string(&session).unwrap();
        assert!(json.contains("\"view\":\"cover-letter\""));
    }
}
