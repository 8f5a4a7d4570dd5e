//! In-place editing of a resume document

use crate::editor::path::{EducationField, ExperienceField, FieldPath, ListPath};
use crate::error::{FastCvError, Result};
use crate::profile::types::{Education, Experience, ResumeProfile};
use log::debug;

/// Mutating view over a resume; every operation touches only the addressed
/// field or list
pub struct DocumentEditor<'a> {
    profile: &'a mut ResumeProfile,
}

impl<'a> DocumentEditor<'a> {
    pub fn new(profile: &'a mut ResumeProfile) -> Self {
        Self { profile }
    }

    pub fn profile(&self) -> &ResumeProfile {
        self.profile
    }

    pub fn get_text(&self, path: &FieldPath) -> Result<String> {
        read_text(self.profile, path)
    }

    /// Replace the text at `path`. An empty cover letter removes the letter.
    pub fn set_text(&mut self, path: &FieldPath, value: &str) -> Result<()> {
        if *path == FieldPath::CoverLetter {
            if value.trim().is_empty() {
                self.clear_cover_letter();
            } else {
                self.set_cover_letter(value);
            }
            return Ok(());
        }

        *self.field_mut(path)? = value.trim().to_string();
        debug!("Edited {}", path);
        Ok(())
    }

    pub fn set_cover_letter(&mut self, letter: &str) {
        self.profile.cover_letter = Some(letter.trim().to_string());
    }

    pub fn clear_cover_letter(&mut self) {
        self.profile.cover_letter = None;
    }

    pub fn list_len(&self, list: &ListPath) -> Result<usize> {
        let profile = &*self.profile;
        Ok(match *list {
            ListPath::Skills => profile.skills.len(),
            ListPath::Experience => profile.experience.len(),
            ListPath::Education => profile.education.len(),
            ListPath::Bullets(i) => checked(&profile.experience, ListPath::Experience, i)?
                .description
                .len(),
        })
    }

    /// Insert at `index` (append when `None`); returns the new item's index.
    /// New experience and education entries carry `text` in their first field.
    pub fn insert_item(&mut self, list: &ListPath, index: Option<usize>, text: &str) -> Result<usize> {
        let text = text.trim().to_string();
        match *list {
            ListPath::Skills => insert_at(&mut self.profile.skills, *list, index, text),
            ListPath::Experience => {
                let entry = Experience {
                    company: text,
                    ..Default::default()
                };
                insert_at(&mut self.profile.experience, *list, index, entry)
            }
            ListPath::Education => {
                let entry = Education {
                    institution: text,
                    ..Default::default()
                };
                insert_at(&mut self.profile.education, *list, index, entry)
            }
            ListPath::Bullets(i) => {
                let bullets = self.bullets_mut(i)?;
                insert_at(bullets, *list, index, text)
            }
        }
    }

    pub fn remove_item(&mut self, list: &ListPath, index: usize) -> Result<()> {
        match *list {
            ListPath::Skills => remove_at(&mut self.profile.skills, *list, index),
            ListPath::Experience => remove_at(&mut self.profile.experience, *list, index),
            ListPath::Education => remove_at(&mut self.profile.education, *list, index),
            ListPath::Bullets(i) => remove_at(self.bullets_mut(i)?, *list, index),
        }
    }

    /// Drag-and-drop move: take the item at `from` and drop it at `to`
    pub fn move_item(&mut self, list: &ListPath, from: usize, to: usize) -> Result<()> {
        let moved = match *list {
            ListPath::Skills => move_within(&mut self.profile.skills, *list, from, to),
            ListPath::Experience => move_within(&mut self.profile.experience, *list, from, to),
            ListPath::Education => move_within(&mut self.profile.education, *list, from, to),
            ListPath::Bullets(i) => move_within(self.bullets_mut(i)?, *list, from, to),
        };
        moved?;
        debug!("Moved {}[{}] to {}", list, from, to);
        Ok(())
    }

    /// Swap with the previous item; returns false when already first
    pub fn move_up(&mut self, list: &ListPath, index: usize) -> Result<bool> {
        let len = self.list_len(list)?;
        if index >= len {
            return Err(out_of_range(*list, index, len));
        }
        if index == 0 {
            return Ok(false);
        }
        self.move_item(list, index, index - 1)?;
        Ok(true)
    }

    /// Swap with the next item; returns false when already last
    pub fn move_down(&mut self, list: &ListPath, index: usize) -> Result<bool> {
        let len = self.list_len(list)?;
        if index >= len {
            return Err(out_of_range(*list, index, len));
        }
        if index + 1 == len {
            return Ok(false);
        }
        self.move_item(list, index, index + 1)?;
        Ok(true)
    }

    /// One bullet per non-empty line
    pub fn replace_bullets(&mut self, experience_index: usize, text: &str) -> Result<usize> {
        let bullets: Vec<String> = text
            .lines()
            .map(|line| strip_bullet_marker(line.trim()))
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect();
        let count = bullets.len();
        *self.bullets_mut(experience_index)? = bullets;
        Ok(count)
    }

    fn bullets_mut(&mut self, experience_index: usize) -> Result<&mut Vec<String>> {
        let len = self.profile.experience.len();
        self.profile
            .experience
            .get_mut(experience_index)
            .map(|exp| &mut exp.description)
            .ok_or_else(|| out_of_range(ListPath::Experience, experience_index, len))
    }

    fn field_mut(&mut self, path: &FieldPath) -> Result<&mut String> {
        let profile = &mut *self.profile;
        let field = match *path {
            FieldPath::FullName => &mut profile.full_name,
            FieldPath::Email => &mut profile.email,
            FieldPath::Phone => &mut profile.phone,
            FieldPath::Location => &mut profile.location,
            FieldPath::Summary => &mut profile.summary,
            FieldPath::CoverLetter => profile.cover_letter.get_or_insert_with(String::new),
            FieldPath::Skill(i) => checked_mut(&mut profile.skills, ListPath::Skills, i)?,
            FieldPath::Experience(i, field) => {
                let exp = checked_mut(&mut profile.experience, ListPath::Experience, i)?;
                match field {
                    ExperienceField::Company => &mut exp.company,
                    ExperienceField::Role => &mut exp.role,
                    ExperienceField::StartDate => &mut exp.start_date,
                    ExperienceField::EndDate => &mut exp.end_date,
                }
            }
            FieldPath::Bullet(i, j) => {
                let exp = checked_mut(&mut profile.experience, ListPath::Experience, i)?;
                checked_mut(&mut exp.description, ListPath::Bullets(i), j)?
            }
            FieldPath::Education(i, field) => {
                let edu = checked_mut(&mut profile.education, ListPath::Education, i)?;
                match field {
                    EducationField::Institution => &mut edu.institution,
                    EducationField::Degree => &mut edu.degree,
                    EducationField::Year => &mut edu.year,
                }
            }
        };
        Ok(field)
    }
}

/// Read the text at `path` without taking the document mutably
pub fn read_text(profile: &ResumeProfile, path: &FieldPath) -> Result<String> {
    let text = match *path {
        FieldPath::FullName => profile.full_name.clone(),
        FieldPath::Email => profile.email.clone(),
        FieldPath::Phone => profile.phone.clone(),
        FieldPath::Location => profile.location.clone(),
        FieldPath::Summary => profile.summary.clone(),
        FieldPath::CoverLetter => profile.cover_letter.clone().unwrap_or_default(),
        FieldPath::Skill(i) => checked(&profile.skills, ListPath::Skills, i)?.clone(),
        FieldPath::Experience(i, field) => {
            let exp = checked(&profile.experience, ListPath::Experience, i)?;
            match field {
                ExperienceField::Company => exp.company.clone(),
                ExperienceField::Role => exp.role.clone(),
                ExperienceField::StartDate => exp.start_date.clone(),
                ExperienceField::EndDate => exp.end_date.clone(),
            }
        }
        FieldPath::Bullet(i, j) => {
            let exp = checked(&profile.experience, ListPath::Experience, i)?;
            checked(&exp.description, ListPath::Bullets(i), j)?.clone()
        }
        FieldPath::Education(i, field) => {
            let edu = checked(&profile.education, ListPath::Education, i)?;
            match field {
                EducationField::Institution => edu.institution.clone(),
                EducationField::Degree => edu.degree.clone(),
                EducationField::Year => edu.year.clone(),
            }
        }
    };
    Ok(text)
}

/// Drop one list marker, but only when whitespace follows it, so "-40%" keeps its sign
fn strip_bullet_marker(line: &str) -> &str {
    let mut chars = line.chars();
    match (chars.next(), chars.next()) {
        (Some('-' | '*' | '•'), Some(c)) if c.is_whitespace() => chars.as_str().trim_start(),
        _ => line,
    }
}

fn out_of_range(list: ListPath, index: usize, len: usize) -> FastCvError {
    FastCvError::IndexOutOfRange {
        list: list.to_string(),
        index,
        len,
    }
}

fn checked<T>(items: &[T], list: ListPath, index: usize) -> Result<&T> {
    items.get(index).ok_or_else(|| out_of_range(list, index, items.len()))
}

fn checked_mut<T>(items: &mut [T], list: ListPath, index: usize) -> Result<&mut T> {
    let len = items.len();
    items.get_mut(index).ok_or_else(|| out_of_range(list, index, len))
}

fn insert_at<T>(items: &mut Vec<T>, list: ListPath, index: Option<usize>, item: T) -> Result<usize> {
    let index = index.unwrap_or(items.len());
    if index > items.len() {
        return Err(out_of_range(list, index, items.len()));
    }
    items.insert(index, item);
    Ok(index)
}

fn remove_at<T>(items: &mut Vec<T>, list: ListPath, index: usize) -> Result<()> {
    if index >= items.len() {
        return Err(out_of_range(list, index, items.len()));
    }
    items.remove(index);
    Ok(())
}

fn move_within<T>(items: &mut Vec<T>, list: ListPath, from: usize, to: usize) -> Result<()> {
    let len = items.len();
    if from >= len {
        return Err(out_of_range(list, from, len));
    }
    if to >= len {
        return Err(out_of_range(list, to, len));
    }
    if from != to {
        let item = items.remove(from);
        items.insert(to, item);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> ResumeProfile {
        ResumeProfile {
            full_name: "Ada Lovelace".into(),
            summary: "Mathematician".into(),
            skills: vec!["Math".into(), "Poetry".into(), "Engines".into()],
            experience: vec![
                Experience {
                    company: "Analytical Engines".into(),
                    role: "Programmer".into(),
                    description: vec!["Wrote notes".into(), "Computed Bernoulli numbers".into()],
                    ..Default::default()
                },
                Experience {
                    company: "Royal Society".into(),
                    role: "Correspondent".into(),
                    ..Default::default()
                },
                Experience {
                    company: "Home".into(),
                    role: "Tutor".into(),
                    ..Default::default()
                },
            ],
            education: vec![
                Education {
                    institution: "Private tutoring".into(),
                    ..Default::default()
                },
                Education {
                    institution: "De Morgan correspondence".into(),
                    ..Default::default()
                },
            ],
            ..Default::default()
        }
    }

    fn companies(profile: &ResumeProfile) -> Vec<String> {
        profile.experience.iter().map(|e| e.company.clone()).collect()
    }

    #[test]
    fn test_set_and_get_text() {
        let mut profile = profile();
        let mut editor = DocumentEditor::new(&mut profile);

        editor.set_text(&FieldPath::Summary, "  Visionary programmer ").unwrap();
        editor
            .set_text(&FieldPath::Experience(1, ExperienceField::Role), "Fellow")
            .unwrap();
        editor.set_text(&FieldPath::Bullet(0, 1), "Computed B7").unwrap();

        assert_eq!(editor.get_text(&FieldPath::Summary).unwrap(), "Visionary programmer");
        assert_eq!(profile.experience[1].role, "Fellow");
        assert_eq!(profile.experience[0].description[1], "Computed B7");
        // Neighbouring fields untouched
        assert_eq!(profile.experience[0].description[0], "Wrote notes");
        assert_eq!(profile.experience[1].company, "Royal Society");
    }

    #[test]
    fn test_set_text_out_of_range() {
        let mut profile = profile();
        let mut editor = DocumentEditor::new(&mut profile);

        let err = editor.set_text(&FieldPath::Skill(9), "Rust").unwrap_err();
        assert!(matches!(err, FastCvError::IndexOutOfRange { index: 9, len: 3, .. }));
        assert!(editor.get_text(&FieldPath::Bullet(1, 0)).is_err());
    }

    #[test]
    fn test_cover_letter_edit_and_clear() {
        let mut profile = profile();
        let mut editor = DocumentEditor::new(&mut profile);

        editor.set_text(&FieldPath::CoverLetter, "Dear team,").unwrap();
        assert_eq!(editor.profile().cover_letter.as_deref(), Some("Dear team,"));

        editor.set_text(&FieldPath::CoverLetter, "   ").unwrap();
        assert!(editor.profile().cover_letter.is_none());
        assert_eq!(editor.get_text(&FieldPath::CoverLetter).unwrap(), "");
    }

    #[test]
    fn test_move_item_preserves_set() {
        let mut profile = profile();
        let mut original = companies(&profile);
        let mut editor = DocumentEditor::new(&mut profile);

        editor.move_item(&ListPath::Experience, 0, 2).unwrap();
        let moved = companies(editor.profile());
        assert_eq!(moved, vec!["Royal Society", "Home", "Analytical Engines"]);

        let mut sorted = moved.clone();
        sorted.sort();
        original.sort();
        assert_eq!(sorted, original);
    }

    #[test]
    fn test_move_item_rejects_bad_indices() {
        let mut profile = profile();
        let before = profile.clone();
        let mut editor = DocumentEditor::new(&mut profile);

        assert!(editor.move_item(&ListPath::Education, 0, 2).is_err());
        assert!(editor.move_item(&ListPath::Education, 5, 0).is_err());
        assert_eq!(profile, before);
    }

    #[test]
    fn test_move_up_and_down() {
        let mut profile = profile();
        let mut editor = DocumentEditor::new(&mut profile);

        assert!(!editor.move_up(&ListPath::Education, 0).unwrap());
        assert!(editor.move_down(&ListPath::Education, 0).unwrap());
        assert_eq!(editor.profile().education[0].institution, "De Morgan correspondence");
        assert!(!editor.move_down(&ListPath::Education, 1).unwrap());
        assert!(editor.move_up(&ListPath::Education, 1).unwrap());
        assert_eq!(editor.profile().education[0].institution, "Private tutoring");
        assert!(editor.move_up(&ListPath::Education, 2).is_err());
    }

    #[test]
    fn test_bullet_reorder() {
        let mut profile = profile();
        let mut editor = DocumentEditor::new(&mut profile);

        editor.move_down(&ListPath::Bullets(0), 0).unwrap();
        assert_eq!(
            profile.experience[0].description,
            vec!["Computed Bernoulli numbers", "Wrote notes"]
        );
    }

    #[test]
    fn test_insert_and_remove() {
        let mut profile = profile();
        let mut editor = DocumentEditor::new(&mut profile);

        assert_eq!(editor.insert_item(&ListPath::Skills, None, "Rust").unwrap(), 3);
        assert_eq!(editor.insert_item(&ListPath::Skills, Some(0), "Logic").unwrap(), 0);
        assert!(editor.insert_item(&ListPath::Skills, Some(10), "Nope").is_err());
        assert_eq!(editor.insert_item(&ListPath::Experience, None, "Babbage & Co").unwrap(), 3);

        editor.remove_item(&ListPath::Skills, 1).unwrap();
        assert!(editor.remove_item(&ListPath::Bullets(1), 0).is_err());

        assert_eq!(profile.skills, vec!["Logic", "Poetry", "Engines", "Rust"]);
        assert_eq!(profile.experience[3].company, "Babbage & Co");
        assert!(profile.experience[3].role.is_empty());
    }

    #[test]
    fn test_replace_bullets_drops_blank_lines() {
        let mut profile = profile();
        let mut editor = DocumentEditor::new(&mut profile);

        let count = editor
            .replace_bullets(1, "- Reviewed papers\n\n  * Presented findings  \n")
            .unwrap();
        assert_eq!(count, 2);
        assert_eq!(
            profile.experience[1].description,
            vec!["Reviewed papers", "Presented findings"]
        );
    }

    #[test]
    fn test_replace_bullets_keeps_leading_signs() {
        let mut profile = profile();
        let mut editor = DocumentEditor::new(&mut profile);

        editor
            .replace_bullets(0, "-40% cloud spend
--dry-run flag added
• Led migration
*emphasis*")
            .unwrap();
        assert_eq!(
            profile.experience[0].description,
            vec!["-40% cloud spend", "--dry-run flag added", "Led migration", "*emphasis*"]
        );
    }

    #[test]
    fn test_read_text_without_editor() {
        let profile = profile();
        assert_eq!(
            read_text(&profile, &FieldPath::Experience(0, ExperienceField::Company)).unwrap(),
            "Analytical Engines"
        );
        assert!(matches!(
            read_text(&profile, &FieldPath::Skill(99)),
            Err(FastCvError::IndexOutOfRange { .. })
        ));
    }
}
