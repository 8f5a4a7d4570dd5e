//! Dotted addresses for resume fields and lists
//!
//! `experience.0.description.2`, `experience[0].role` and `skills.1` all
//! parse. Segment names are matched case-insensitively with `_` and `-`
//! ignored, so `start_date`, `start-date` and `startDate` are the same field.

use crate::error::{FastCvError, Result};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExperienceField {
    Company,
    Role,
    StartDate,
    EndDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EducationField {
    Institution,
    Degree,
    Year,
}

/// A single editable text field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldPath {
    FullName,
    Email,
    Phone,
    Location,
    Summary,
    CoverLetter,
    Skill(usize),
    Experience(usize, ExperienceField),
    Bullet(usize, usize),
    Education(usize, EducationField),
}

/// An ordered list whose items can be inserted, removed and reordered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListPath {
    Skills,
    Experience,
    Education,
    Bullets(usize),
}

fn normalize(segment: &str) -> String {
    segment
        .chars()
        .filter(|c| *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

fn split_segments(raw: &str) -> Result<Vec<String>> {
    let flattened = raw.trim().replace('[', ".").replace(']', "");
    let segments: Vec<String> = flattened.split('.').map(str::trim).map(String::from).collect();
    if segments.iter().any(String::is_empty) {
        return Err(FastCvError::InvalidPath(raw.to_string()));
    }
    Ok(segments)
}

fn parse_index(raw: &str, segment: &str) -> Result<usize> {
    segment
        .parse()
        .map_err(|_| FastCvError::InvalidPath(format!("{} (expected an index, found '{}')", raw, segment)))
}

impl FromStr for ExperienceField {
    type Err = FastCvError;

    fn from_str(s: &str) -> Result<Self> {
        match normalize(s).as_str() {
            "company" => Ok(ExperienceField::Company),
            "role" | "title" => Ok(ExperienceField::Role),
            "startdate" | "start" => Ok(ExperienceField::StartDate),
            "enddate" | "end" => Ok(ExperienceField::EndDate),
            _ => Err(FastCvError::InvalidPath(format!("unknown experience field '{}'", s))),
        }
    }
}

impl FromStr for EducationField {
    type Err = FastCvError;

    fn from_str(s: &str) -> Result<Self> {
        match normalize(s).as_str() {
            "institution" | "school" => Ok(EducationField::Institution),
            "degree" => Ok(EducationField::Degree),
            "year" => Ok(EducationField::Year),
            _ => Err(FastCvError::InvalidPath(format!("unknown education field '{}'", s))),
        }
    }
}

impl FromStr for FieldPath {
    type Err = FastCvError;

    fn from_str(raw: &str) -> Result<Self> {
        let segments = split_segments(raw)?;
        let names: Vec<String> = segments.iter().map(|s| normalize(s)).collect();

        match names.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
            ["fullname"] | ["name"] => Ok(FieldPath::FullName),
            ["email"] => Ok(FieldPath::Email),
            ["phone"] => Ok(FieldPath::Phone),
            ["location"] => Ok(FieldPath::Location),
            ["summary"] => Ok(FieldPath::Summary),
            ["coverletter"] => Ok(FieldPath::CoverLetter),
            ["skills", index] => Ok(FieldPath::Skill(parse_index(raw, index)?)),
            ["experience", index, "description", bullet] | ["experience", index, "bullets", bullet] => {
                Ok(FieldPath::Bullet(parse_index(raw, index)?, parse_index(raw, bullet)?))
            }
            ["experience", index, field] => Ok(FieldPath::Experience(
                parse_index(raw, index)?,
                field.parse()?,
            )),
            ["education", index, field] => Ok(FieldPath::Education(
                parse_index(raw, index)?,
                field.parse()?,
            )),
            _ => Err(FastCvError::InvalidPath(raw.to_string())),
        }
    }
}

impl FromStr for ListPath {
    type Err = FastCvError;

    fn from_str(raw: &str) -> Result<Self> {
        let segments = split_segments(raw)?;
        let names: Vec<String> = segments.iter().map(|s| normalize(s)).collect();

        match names.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
            ["skills"] => Ok(ListPath::Skills),
            ["experience"] => Ok(ListPath::Experience),
            ["education"] => Ok(ListPath::Education),
            ["experience", index, "description"] | ["experience", index, "bullets"] => {
                Ok(ListPath::Bullets(parse_index(raw, index)?))
            }
            _ => Err(FastCvError::InvalidPath(raw.to_string())),
        }
    }
}

impl fmt::Display for ExperienceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExperienceField::Company => "company",
            ExperienceField::Role => "role",
            ExperienceField::StartDate => "startDate",
            ExperienceField::EndDate => "endDate",
        };
        f.write_str(name)
    }
}

impl fmt::Display for EducationField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EducationField::Institution => "institution",
            EducationField::Degree => "degree",
            EducationField::Year => "year",
        };
        f.write_str(name)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldPath::FullName => write!(f, "fullName"),
            FieldPath::Email => write!(f, "email"),
            FieldPath::Phone => write!(f, "phone"),
            FieldPath::Location => write!(f, "location"),
            FieldPath::Summary => write!(f, "summary"),
            FieldPath::CoverLetter => write!(f, "coverLetter"),
            FieldPath::Skill(i) => write!(f, "skills.{}", i),
            FieldPath::Experience(i, field) => write!(f, "experience.{}.{}", i, field),
            FieldPath::Bullet(i, j) => write!(f, "experience.{}.description.{}", i, j),
            FieldPath::Education(i, field) => write!(f, "education.{}.{}", i, field),
        }
    }
}

impl fmt::Display for ListPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListPath::Skills => write!(f, "skills"),
            ListPath::Experience => write!(f, "experience"),
            ListPath::Education => write!(f, "education"),
            ListPath::Bullets(i) => write!(f, "experience.{}.description", i),
        }
    }
}
