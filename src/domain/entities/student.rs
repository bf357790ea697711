use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{constants::DEFAULT_IMAGE, errors::AppError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: i64,
    pub student_name: String,
    pub last_name: String,
    pub birth_date: NaiveDate,
    pub registration_date: NaiveDate,
    pub registration_end_date: Option<NaiveDate>,
    /// Either [`DEFAULT_IMAGE`] or the name of a file held by the file store.
    pub image_path: String,
}

impl Student {
    pub fn has_custom_photo(&self) -> bool {
        self.image_path != DEFAULT_IMAGE
    }
}

#[derive(Debug, Clone)]
pub struct StudentInsert {
    pub student_name: String,
    pub last_name: String,
    pub birth_date: NaiveDate,
    pub registration_date: NaiveDate,
    pub registration_end_date: Option<NaiveDate>,
    pub image_path: String,
}

/// Request body for creating or updating a student.
///
/// Everything is optional at the serde level so a missing field surfaces as
/// a validation error instead of a JSON decoding error.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct StudentForm {
    #[validate(
        required(message = "Student name is required"),
        length(min = 1, max = 100, message = "Must be between 1 and 100 characters")
    )]
    pub student_name: Option<String>,

    #[validate(
        required(message = "Last name is required"),
        length(min = 1, max = 100, message = "Must be between 1 and 100 characters")
    )]
    pub last_name: Option<String>,

    #[validate(required(message = "Birth date is required"))]
    pub birth_date: Option<NaiveDate>,

    #[validate(required(message = "Registration date is required"))]
    pub registration_date: Option<NaiveDate>,

    pub registration_end_date: Option<NaiveDate>,
}

/// Field values of a [`StudentForm`] that passed validation.
struct StudentFields {
    student_name: String,
    last_name: String,
    birth_date: NaiveDate,
    registration_date: NaiveDate,
    registration_end_date: Option<NaiveDate>,
}

impl StudentForm {
    fn into_fields(mut self) -> Result<StudentFields, AppError> {
        // Blank names must fail the length rule, so trim first.
        for name in [&mut self.student_name, &mut self.last_name].into_iter().flatten() {
            *name = name.trim().to_string();
        }
        self.validate()?;

        let missing = |field: &str| AppError::InvalidInput(format!("{field} is required"));

        Ok(StudentFields {
            student_name: self.student_name.ok_or_else(|| missing("studentName"))?,
            last_name: self.last_name.ok_or_else(|| missing("lastName"))?,
            birth_date: self.birth_date.ok_or_else(|| missing("birthDate"))?,
            registration_date: self.registration_date.ok_or_else(|| missing("registrationDate"))?,
            registration_end_date: self.registration_end_date,
        })
    }

    /// Builds the row for a brand new student, who always starts with the default photo.
    pub fn prepare_for_insert(self) -> Result<StudentInsert, AppError> {
        let fields = self.into_fields()?;

        Ok(StudentInsert {
            student_name: fields.student_name,
            last_name: fields.last_name,
            birth_date: fields.birth_date,
            registration_date: fields.registration_date,
            registration_end_date: fields.registration_end_date,
            image_path: DEFAULT_IMAGE.to_string(),
        })
    }

    /// Overwrites the name and date fields of `student`, leaving `image_path` alone.
    pub fn apply_to(self, student: &mut Student) -> Result<(), AppError> {
        let fields = self.into_fields()?;

        student.student_name = fields.student_name;
        student.last_name = fields.last_name;
        student.birth_date = fields.birth_date;
        student.registration_date = fields.registration_date;
        student.registration_end_date = fields.registration_end_date;

        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct PhotoUploadResponse {
    pub message: String,
    pub student: Student,
}

#[derive(Debug, Serialize)]
pub struct StudentDeletedResponse {
    pub message: String,
    pub id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn valid_form() -> StudentForm {
        StudentForm {
            student_name: Some(" Ana ".to_string()),
            last_name: Some("Ruiz".to_string()),
            birth_date: Some(date(2005, 3, 14)),
            registration_date: Some(date(2024, 9, 1)),
            registration_end_date: None,
        }
    }

    #[test]
    fn new_students_start_with_the_default_image() {
        let insert = valid_form().prepare_for_insert().unwrap();

        assert_eq!(insert.image_path, DEFAULT_IMAGE);
        assert_eq!(insert.student_name, "Ana");
    }

    #[test]
    fn missing_required_fields_are_reported_per_field() {
        let form = StudentForm {
            last_name: Some(String::new()),
            ..Default::default()
        };

        match form.prepare_for_insert() {
            Err(AppError::ValidationError(errors)) => {
                let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
                assert!(fields.contains(&"student_name"));
                assert!(fields.contains(&"last_name"));
                assert!(fields.contains(&"birth_date"));
                assert!(fields.contains(&"registration_date"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn blank_names_fail_validation() {
        let mut form = valid_form();
        form.student_name = Some("   ".to_string());
        form.last_name = Some("\t".to_string());

        match form.prepare_for_insert() {
            Err(AppError::ValidationError(errors)) => {
                let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
                assert!(fields.contains(&"student_name"));
                assert!(fields.contains(&"last_name"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn apply_to_keeps_the_photo() {
        let mut student = Student {
            id: 7,
            student_name: "Old".to_string(),
            last_name: "Name".to_string(),
            birth_date: date(2000, 1, 1),
            registration_date: date(2020, 1, 1),
            registration_end_date: None,
            image_path: "old.jpg".to_string(),
        };

        let mut form = valid_form();
        form.registration_end_date = Some(date(2028, 6, 30));
        form.apply_to(&mut student).unwrap();

        assert_eq!(student.student_name, "Ana");
        assert_eq!(student.registration_end_date, Some(date(2028, 6, 30)));
        assert_eq!(student.image_path, "old.jpg");
        assert_eq!(student.id, 7);
    }

    #[test]
    fn serializes_with_camel_case_names() {
        let student = Student {
            id: 1,
            student_name: "Ana".to_string(),
            last_name: "Ruiz".to_string(),
            birth_date: date(2005, 3, 14),
            registration_date: date(2024, 9, 1),
            registration_end_date: None,
            image_path: DEFAULT_IMAGE.to_string(),
        };

        let json = serde_json::to_value(&student).unwrap();
        assert_eq!(json["studentName"], "Ana");
        assert_eq!(json["imagePath"], "default.jpg");
        assert_eq!(json["birthDate"], "2005-03-14");
    }
}
