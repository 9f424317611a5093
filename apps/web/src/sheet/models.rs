use std::ops::RangeInclusive;
use std::path::PathBuf;

use bytes::Bytes;

/// Maximum number of subject columns a sheet can hold.
pub const MAX_SUBJECTS: usize = 5;
pub const QUESTIONS_RANGE: RangeInclusive<u32> = 1..=100;
pub const OPTIONS_RANGE: RangeInclusive<u32> = 2..=6;

pub const DEFAULT_QUESTIONS_PER_SUBJECT: u32 = 25;
pub const DEFAULT_OPTION_COUNT: u32 = 4;

/// Logo extensions accepted on upload (compared lower-cased, without the dot).
pub const LOGO_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif"];

/// The validated parameters describing one sheet.
///
/// Subjects are already trimmed and upper-cased; `logo` points at a file that
/// outlives the layout call (normally a request-scoped temp file).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetSpec {
    pub institution: String,
    pub exam: String,
    pub subjects: Vec<String>,
    pub questions_per_subject: u32,
    pub option_count: u32,
    pub logo: Option<PathBuf>,
}

impl SheetSpec {
    /// Download name for the generated document: spaces become underscores.
    pub fn download_filename(&self) -> String {
        format!("{}_OMR_Sheet.pdf", self.institution.replace(' ', "_"))
    }
}

/// Raw, untrusted form submission as collected from the multipart body.
///
/// Absent text fields are empty strings; the two counts stay `None` when the
/// field was not sent at all so that their defaults can apply.
#[derive(Debug, Clone, Default)]
pub struct SheetForm {
    pub school_name: String,
    pub exam_name: String,
    pub subjects: String,
    pub questions_per_subject: Option<String>,
    pub num_options: Option<String>,
    pub logo: Option<LogoUpload>,
}

#[derive(Debug, Clone)]
pub struct LogoUpload {
    pub file_name: String,
    pub bytes: Bytes,
}

/// A logo upload that passed validation, ready to be written to disk.
#[derive(Debug, Clone)]
pub struct AcceptedLogo {
    /// Lower-cased extension without the dot, one of `LOGO_EXTENSIONS`.
    pub extension: String,
    pub bytes: Bytes,
}

/// Outcome of a successful validation pass.
#[derive(Debug, Clone)]
pub struct ValidatedSheet {
    /// Spec with `logo: None`; the handler fills it in once the upload is persisted.
    pub spec: SheetSpec,
    pub logo: Option<AcceptedLogo>,
}
