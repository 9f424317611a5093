//! POST /generate: validate the form, lay out the sheet, return the PDF.

use std::io::Write;

use anyhow::Context;
use axum::{
    extract::{Multipart, State},
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use tempfile::NamedTempFile;
use tracing::{debug, info};
use uuid::Uuid;

use crate::errors::AppError;
use crate::layout::layout_sheet;
use crate::render::render_pdf;
use crate::sheet::models::{AcceptedLogo, LogoUpload, ValidatedSheet};
use crate::sheet::{validate_form, SheetForm, SheetSpec};
use crate::state::AppState;

/// POST /generate
///
/// Validation failures and internal errors both end in a redirect back to the
/// form (see `AppError`); only a finished document is returned directly.
pub async fn handle_generate(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let form = read_form(multipart).await?;
    let ValidatedSheet { spec, logo } = validate_form(&form, state.config.max_logo_bytes)?;

    let request_id = Uuid::new_v4();
    info!(
        %request_id,
        subjects = spec.subjects.len(),
        questions = spec.questions_per_subject,
        options = spec.option_count,
        has_logo = logo.is_some(),
        "Generating OMR sheet"
    );

    let filename = spec.download_filename();
    let pdf = tokio::task::spawn_blocking(move || generate_sheet(spec, logo))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("sheet generation task failed: {e}")))??;

    info!(%request_id, bytes = pdf.len(), %filename, "OMR sheet generated");
    pdf_attachment(pdf, &filename)
}

/// Collects the multipart body into a `SheetForm`. Unknown fields are ignored.
async fn read_form(mut multipart: Multipart) -> Result<SheetForm, AppError> {
    let mut form = SheetForm::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "school_name" => form.school_name = field.text().await?,
            "exam_name" => form.exam_name = field.text().await?,
            "subjects" => form.subjects = field.text().await?,
            "questions_per_subject" => form.questions_per_subject = Some(field.text().await?),
            "num_options" => form.num_options = Some(field.text().await?),
            "logo" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await?;
                form.logo = Some(LogoUpload { file_name, bytes });
            }
            _ => {}
        }
    }

    Ok(form)
}

/// Blocking half of generation: persist the logo, lay out, render.
///
/// The logo temp file lives until this function returns and is removed on
/// drop, whichever way it returns.
fn generate_sheet(mut spec: SheetSpec, logo: Option<AcceptedLogo>) -> anyhow::Result<Vec<u8>> {
    let logo_file = logo.as_ref().map(persist_logo).transpose()?;
    spec.logo = logo_file.as_ref().map(|f| f.path().to_path_buf());

    let layout = layout_sheet(&spec);
    debug!(
        row_height = layout.metrics.row_height,
        bubble_radius = layout.metrics.bubble_radius,
        commands = layout.commands.len(),
        "Sheet laid out"
    );
    let title = format!("{} OMR Sheet", spec.institution);
    Ok(render_pdf(&layout, &title))
}

fn persist_logo(logo: &AcceptedLogo) -> anyhow::Result<NamedTempFile> {
    let mut file = tempfile::Builder::new()
        .prefix("omr-logo-")
        .suffix(&format!(".{}", logo.extension))
        .tempfile()
        .context("failed to create temporary logo file")?;
    file.write_all(&logo.bytes)
        .and_then(|_| file.flush())
        .context("failed to write temporary logo file")?;
    Ok(file)
}

fn pdf_attachment(pdf: Vec<u8>, filename: &str) -> Result<Response, AppError> {
    let disposition = HeaderValue::from_str(&content_disposition(filename))
        .context("invalid Content-Disposition header")?;
    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("application/pdf")),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        Bytes::from(pdf),
    )
        .into_response())
}

/// `attachment` disposition with an ASCII fallback name, plus an RFC 5987
/// `filename*` when the real name is not plain ASCII.
fn content_disposition(filename: &str) -> String {
    let fallback: String = filename
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_ascii_graphic() || c == ' ' => c,
            _ => '_',
        })
        .collect();

    if fallback == filename {
        format!("attachment; filename=\"{fallback}\"")
    } else {
        format!(
            "attachment; filename=\"{fallback}\"; filename*=UTF-8''{}",
            percent_encode(filename)
        )
    }
}

fn percent_encode(value: &str) -> String {
    let mut out = String::with_capacity(value.len() * 3);
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'!'
            | b'#'
            | b'$'
            | b'&'
            | b'+'
            | b'-'
            | b'.'
            | b'^'
            | b'_'
            | b'`'
            | b'|'
            | b'~' => out.push(byte as char),
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::capture_logs;

    #[test]
    fn test_plain_ascii_disposition() {
        assert_eq!(
            content_disposition("Green_Valley_School_OMR_Sheet.pdf"),
            "attachment; filename=\"Green_Valley_School_OMR_Sheet.pdf\""
        );
    }

    #[test]
    fn test_non_ascii_disposition_has_encoded_name() {
        let value = content_disposition("École_OMR_Sheet.pdf");
        assert!(value.starts_with("attachment; filename=\"_cole_OMR_Sheet.pdf\""));
        assert!(value.ends_with("filename*=UTF-8''%C3%89cole_OMR_Sheet.pdf"));
    }

    #[test]
    fn test_quotes_are_neutralised() {
        let value = content_disposition("A\"B_OMR_Sheet.pdf");
        assert!(value.contains("filename=\"A_B_OMR_Sheet.pdf\""));
        assert!(value.contains("A%22B"));
    }

    #[test]
    fn test_generate_sheet_survives_undecodable_logo() {
        let logo = AcceptedLogo {
            extension: "png".to_string(),
            bytes: Bytes::from_static(b"not an image"),
        };
        let spec = SheetSpec {
            institution: "Hill Academy".to_string(),
            exam: "Finals".to_string(),
            subjects: vec!["MATH".to_string()],
            questions_per_subject: 10,
            option_count: 4,
            logo: None,
        };

        let (pdf, logs) = capture_logs(|| generate_sheet(spec, Some(logo)));
        let pdf = pdf.unwrap();
        assert!(pdf.starts_with(b"%PDF-"));
        assert!(logs.contains("WARN"), "{logs}");
        assert!(logs.contains("Skipping logo"), "{logs}");
        assert!(!pdf.windows(15).any(|w| w == b"/Subtype /Image"));
    }

    #[test]
    fn test_persist_logo_keeps_extension() {
        let logo = AcceptedLogo {
            extension: "gif".to_string(),
            bytes: Bytes::from_static(b"GIF89a"),
        };
        let file = persist_logo(&logo).unwrap();
        let path = file.path().to_path_buf();
        assert_eq!(path.extension().unwrap(), "gif");
        assert_eq!(std::fs::read(&path).unwrap(), b"GIF89a");
        drop(file);
        assert!(!path.exists());
    }
}
