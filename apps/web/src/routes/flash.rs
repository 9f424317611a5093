//! One-shot user messages carried across a redirect.
//!
//! A redirect sets the `omr_flash` cookie to a short code; the next `GET /`
//! renders the matching message and clears the cookie. Only codes travel in
//! the cookie, so nothing user-supplied is ever reflected from it.

use axum::{
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};

use crate::sheet::validation::{CountField, RequiredField, ValidationError};

pub const FLASH_COOKIE: &str = "omr_flash";
pub const CLEAR_FLASH_COOKIE: &str = "omr_flash=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flash {
    SchoolNameRequired,
    ExamNameRequired,
    SubjectsRequired,
    TooManySubjects,
    InvalidQuestionCount,
    InvalidOptionCount,
    InvalidLogoType,
    LogoTooLarge,
    GenerationFailed,
    InternalError,
}

const ALL: [Flash; 10] = [
    Flash::SchoolNameRequired,
    Flash::ExamNameRequired,
    Flash::SubjectsRequired,
    Flash::TooManySubjects,
    Flash::InvalidQuestionCount,
    Flash::InvalidOptionCount,
    Flash::InvalidLogoType,
    Flash::LogoTooLarge,
    Flash::GenerationFailed,
    Flash::InternalError,
];

impl Flash {
    pub fn code(self) -> &'static str {
        match self {
            Flash::SchoolNameRequired => "school_name_required",
            Flash::ExamNameRequired => "exam_name_required",
            Flash::SubjectsRequired => "subjects_required",
            Flash::TooManySubjects => "too_many_subjects",
            Flash::InvalidQuestionCount => "invalid_question_count",
            Flash::InvalidOptionCount => "invalid_option_count",
            Flash::InvalidLogoType => "invalid_logo_type",
            Flash::LogoTooLarge => "logo_too_large",
            Flash::GenerationFailed => "generation_failed",
            Flash::InternalError => "internal_error",
        }
    }

    pub fn from_code(code: &str) -> Option<Flash> {
        ALL.into_iter().find(|f| f.code() == code)
    }

    pub fn message(self) -> &'static str {
        match self {
            Flash::SchoolNameRequired => "School name is required",
            Flash::ExamNameRequired => "Exam name is required",
            Flash::SubjectsRequired => "At least one subject is required",
            Flash::TooManySubjects => "Maximum 5 subjects allowed",
            Flash::InvalidQuestionCount => "Questions per subject must be between 1 and 100",
            Flash::InvalidOptionCount => "Number of options must be between 2 and 6",
            Flash::InvalidLogoType => "Logo must be a PNG, JPG, JPEG, or GIF file",
            Flash::LogoTooLarge => "Logo file is too large",
            Flash::GenerationFailed => {
                "An error occurred while generating the OMR sheet. Please try again."
            }
            Flash::InternalError => "An internal error occurred. Please try again.",
        }
    }
}

impl From<&ValidationError> for Flash {
    fn from(err: &ValidationError) -> Self {
        match err {
            ValidationError::MissingField(RequiredField::SchoolName) => Flash::SchoolNameRequired,
            ValidationError::MissingField(RequiredField::ExamName) => Flash::ExamNameRequired,
            ValidationError::NoSubjects => Flash::SubjectsRequired,
            ValidationError::TooManySubjects(_) => Flash::TooManySubjects,
            ValidationError::OutOfRangeCount {
                field: CountField::QuestionsPerSubject,
                ..
            } => Flash::InvalidQuestionCount,
            ValidationError::OutOfRangeCount {
                field: CountField::OptionCount,
                ..
            } => Flash::InvalidOptionCount,
            ValidationError::InvalidLogoType(_) => Flash::InvalidLogoType,
            ValidationError::LogoTooLarge { .. } => Flash::LogoTooLarge,
        }
    }
}

/// `303 See Other` to the form, carrying `flash` in a cookie.
pub fn redirect_with_flash(flash: Flash) -> Response {
    let cookie = format!(
        "{FLASH_COOKIE}={}; Path=/; HttpOnly; SameSite=Lax",
        flash.code()
    );
    let mut response = (StatusCode::SEE_OTHER, [(header::LOCATION, "/")]).into_response();
    if let Ok(value) = HeaderValue::from_str(&cookie) {
        response.headers_mut().insert(header::SET_COOKIE, value);
    }
    response
}

/// Raw value of the flash cookie, if the request carries one.
pub fn flash_cookie(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == FLASH_COOKIE)
        .map(|(_, value)| value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_round_trip() {
        for flash in ALL {
            assert_eq!(Flash::from_code(flash.code()), Some(flash));
        }
        assert_eq!(Flash::from_code("<script>"), None);
    }

    #[test]
    fn test_validation_kinds_map_to_flash() {
        assert_eq!(Flash::from(&ValidationError::NoSubjects), Flash::SubjectsRequired);
        assert_eq!(
            Flash::from(&ValidationError::TooManySubjects(6)),
            Flash::TooManySubjects
        );
        assert_eq!(
            Flash::from(&ValidationError::InvalidLogoType("seal.bmp".into())),
            Flash::InvalidLogoType
        );
        assert_eq!(
            Flash::from(&ValidationError::OutOfRangeCount {
                field: CountField::OptionCount,
                raw: "7".into(),
            }),
            Flash::InvalidOptionCount
        );
    }

    #[test]
    fn test_redirect_sets_cookie() {
        let response = redirect_with_flash(Flash::InvalidLogoType);
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/");
        let cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
        assert!(cookie.starts_with("omr_flash=invalid_logo_type;"));
    }

    #[test]
    fn test_flash_cookie_found_among_others() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; omr_flash=subjects_required; lang=en"),
        );
        assert_eq!(flash_cookie(&headers), Some("subjects_required"));
    }

    #[test]
    fn test_flash_cookie_absent() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("theme=dark"));
        assert_eq!(flash_cookie(&headers), None);
        assert_eq!(flash_cookie(&HeaderMap::new()), None);
    }
}
