//! The input form page, also used for the 404 and 500 error pages.

use std::any::Any;

use axum::{
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
};
use tracing::error;

use crate::routes::flash::{flash_cookie, Flash, CLEAR_FLASH_COOKIE};

const FORM_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>OMR Sheet Generator</title>
  <style>
    body { font-family: system-ui, sans-serif; background: #f4f6f8; margin: 0; }
    main { max-width: 36rem; margin: 2rem auto; background: #fff; padding: 1.5rem 2rem;
           border-radius: 8px; box-shadow: 0 1px 4px rgba(0, 0, 0, .1); }
    label { display: block; margin-top: 1rem; font-weight: 600; }
    input, select { width: 100%; padding: .5rem; margin-top: .25rem; box-sizing: border-box; }
    small { color: #666; }
    button { margin-top: 1.5rem; padding: .75rem 1.5rem; font-size: 1rem; cursor: pointer; }
    .alert { padding: .75rem 1rem; border-radius: 4px; margin-bottom: 1rem; }
    .alert-error { background: #fde8e8; color: #9b1c1c; border: 1px solid #f8b4b4; }
  </style>
</head>
<body>
<main>
  <h1>OMR Sheet Generator</h1>
  {{FLASH}}
  <form id="omrForm" action="/generate" method="post" enctype="multipart/form-data">
    <label for="school_name">School / Institution name</label>
    <input id="school_name" name="school_name" type="text" required>

    <label for="exam_name">Exam name</label>
    <input id="exam_name" name="exam_name" type="text" required>

    <label for="subjects">Subjects</label>
    <input id="subjects" name="subjects" type="text" placeholder="Math, Science, English" required>
    <small>Comma-separated, at most 5.</small>

    <label for="questions_per_subject">Questions per subject</label>
    <input id="questions_per_subject" name="questions_per_subject" type="number" min="1" max="100" value="25">

    <label for="num_options">Answer options</label>
    <select id="num_options" name="num_options">
      <option value="2">2 (A, B)</option>
      <option value="3">3 (A, B, C)</option>
      <option value="4" selected>4 (A, B, C, D)</option>
      <option value="5">5 (A, B, C, D, E)</option>
      <option value="6">6 (A, B, C, D, E, F)</option>
    </select>

    <label for="logo">Logo (optional)</label>
    <input id="logo" name="logo" type="file" accept=".png,.jpg,.jpeg,.gif">
    <small>PNG, JPG, JPEG or GIF.</small>

    <button id="generateBtn" type="submit">Generate OMR sheet</button>
  </form>
</main>
</body>
</html>
"#;

/// Renders the form, optionally with an error message above it.
pub fn render_form(flash: Option<Flash>) -> Html<String> {
    let alert = flash
        .map(|f| {
            format!(
                r#"<div class="alert alert-error" role="alert">{}</div>"#,
                escape_html(f.message())
            )
        })
        .unwrap_or_default();
    Html(FORM_TEMPLATE.replace("{{FLASH}}", &alert))
}

/// GET /
///
/// Shows any pending flash message exactly once.
pub async fn handle_index(headers: HeaderMap) -> Response {
    let pending = flash_cookie(&headers);
    let mut response = render_form(pending.and_then(Flash::from_code)).into_response();
    if pending.is_some() {
        response.headers_mut().insert(
            header::SET_COOKIE,
            HeaderValue::from_static(CLEAR_FLASH_COOKIE),
        );
    }
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}

/// Router fallback: unknown paths get the form with a 404 status.
pub async fn handle_not_found() -> Response {
    (StatusCode::NOT_FOUND, render_form(None)).into_response()
}

/// Panic handler for `CatchPanicLayer`: the form with a 500 and a generic message.
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic payload");
    error!("Internal server error: {detail}");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        render_form(Some(Flash::InternalError)),
    )
        .into_response()
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
