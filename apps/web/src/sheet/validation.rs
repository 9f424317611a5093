//! Ordered validation of the sheet form.
//!
//! Checks run in a fixed order and the first failure wins:
//! school name, exam name, subjects, question count, option count, logo.

use std::fmt;
use std::ops::RangeInclusive;

use thiserror::Error;

use crate::sheet::models::{
    AcceptedLogo, LogoUpload, SheetForm, SheetSpec, ValidatedSheet, DEFAULT_OPTION_COUNT,
    DEFAULT_QUESTIONS_PER_SUBJECT, LOGO_EXTENSIONS, MAX_SUBJECTS, OPTIONS_RANGE, QUESTIONS_RANGE,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredField {
    SchoolName,
    ExamName,
}

impl fmt::Display for RequiredField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequiredField::SchoolName => f.write_str("School name"),
            RequiredField::ExamName => f.write_str("Exam name"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountField {
    QuestionsPerSubject,
    OptionCount,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(RequiredField),

    #[error("At least one subject is required")]
    NoSubjects,

    #[error("Maximum 5 subjects allowed (got {0})")]
    TooManySubjects(usize),

    #[error("{} (got '{raw}')", count_message(.field))]
    OutOfRangeCount { field: CountField, raw: String },

    #[error("Logo must be a PNG, JPG, JPEG, or GIF file (got '{0}')")]
    InvalidLogoType(String),

    #[error("Logo file size must be less than {limit} bytes (got {size})")]
    LogoTooLarge { size: usize, limit: usize },
}

fn count_message(field: &CountField) -> &'static str {
    match field {
        CountField::QuestionsPerSubject => "Questions per subject must be between 1 and 100",
        CountField::OptionCount => "Number of options must be between 2 and 6",
    }
}

/// Validates a raw form submission.
///
/// `max_logo_bytes` bounds the logo upload. An upload with an empty filename is
/// treated as "no logo", matching what browsers send for an untouched file input.
pub fn validate_form(
    form: &SheetForm,
    max_logo_bytes: usize,
) -> Result<ValidatedSheet, ValidationError> {
    let institution = require(&form.school_name, RequiredField::SchoolName)?;
    let exam = require(&form.exam_name, RequiredField::ExamName)?;
    let subjects = parse_subjects(&form.subjects)?;

    let questions_per_subject = parse_count(
        form.questions_per_subject.as_deref(),
        DEFAULT_QUESTIONS_PER_SUBJECT,
        QUESTIONS_RANGE,
        CountField::QuestionsPerSubject,
    )?;
    let option_count = parse_count(
        form.num_options.as_deref(),
        DEFAULT_OPTION_COUNT,
        OPTIONS_RANGE,
        CountField::OptionCount,
    )?;

    let logo = match &form.logo {
        Some(upload) if !upload.file_name.is_empty() => {
            Some(check_logo(upload, max_logo_bytes)?)
        }
        _ => None,
    };

    Ok(ValidatedSheet {
        spec: SheetSpec {
            institution,
            exam,
            subjects,
            questions_per_subject,
            option_count,
            logo: None,
        },
        logo,
    })
}

fn require(raw: &str, field: RequiredField) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    Ok(trimmed.to_string())
}

/// Splits a comma-separated subject list: trimmed, upper-cased, empties dropped.
pub fn parse_subjects(raw: &str) -> Result<Vec<String>, ValidationError> {
    let subjects: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_uppercase)
        .collect();

    if subjects.is_empty() {
        return Err(ValidationError::NoSubjects);
    }
    if subjects.len() > MAX_SUBJECTS {
        return Err(ValidationError::TooManySubjects(subjects.len()));
    }
    Ok(subjects)
}

fn parse_count(
    raw: Option<&str>,
    default: u32,
    range: RangeInclusive<u32>,
    field: CountField,
) -> Result<u32, ValidationError> {
    let Some(raw) = raw else {
        return Ok(default);
    };

    let out_of_range = || ValidationError::OutOfRangeCount {
        field,
        raw: raw.to_string(),
    };

    let value = raw.trim().parse::<i64>().map_err(|_| out_of_range())?;
    u32::try_from(value)
        .ok()
        .filter(|v| range.contains(v))
        .ok_or_else(out_of_range)
}

fn check_logo(upload: &LogoUpload, max_logo_bytes: usize) -> Result<AcceptedLogo, ValidationError> {
    let extension = upload
        .file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| LOGO_EXTENSIONS.contains(&ext.as_str()))
        .ok_or_else(|| ValidationError::InvalidLogoType(upload.file_name.clone()))?;

    if upload.bytes.len() > max_logo_bytes {
        return Err(ValidationError::LogoTooLarge {
            size: upload.bytes.len(),
            limit: max_logo_bytes,
        });
    }

    Ok(AcceptedLogo {
        extension,
        bytes: upload.bytes.clone(),
    })
}
