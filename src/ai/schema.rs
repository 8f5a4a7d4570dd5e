//! Response schema the AI service must fill for resume extraction and tailoring

use serde_json::{json, Value};

pub fn resume_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "fullName": { "type": "STRING", "description": "Full name of the person" },
            "email": { "type": "STRING" },
            "phone": { "type": "STRING" },
            "location": { "type": "STRING", "description": "City and state/country" },
            "summary": { "type": "STRING", "description": "Professional summary paragraph" },
            "skills": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "description": "List of professional skills"
            },
            "experience": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "company": { "type": "STRING" },
                        "role": { "type": "STRING" },
                        "startDate": { "type": "STRING", "description": "e.g. Jan 2020" },
                        "endDate": { "type": "STRING", "description": "e.g. Present or Dec 2022" },
                        "description": {
                            "type": "ARRAY",
                            "items": { "type": "STRING" },
                            "description": "Bullet points describing responsibilities and achievements"
                        }
                    },
                    "propertyOrdering": ["company", "role", "startDate", "endDate", "description"]
                }
            },
            "education": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "institution": { "type": "STRING" },
                        "degree": { "type": "STRING" },
                        "year": { "type": "STRING", "description": "Graduation year or range" }
                    },
                    "propertyOrdering": ["institution", "degree", "year"]
                }
            }
        },
        "required": ["fullName", "summary", "skills", "experience", "education"],
        "propertyOrdering": [
            "fullName", "email", "phone", "location", "summary", "skills", "experience", "education"
        ]
    })
}
