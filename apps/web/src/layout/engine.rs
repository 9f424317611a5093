//! Sheet layout engine. Turns a `SheetSpec` into an ordered list of draw commands.
//!
//! # Page regions (A4, points, origin bottom-left)
//! - Header: border, optional logo, institution and exam titles, ID boxes.
//! - Grid: one column per subject, one row per question, `option_count`
//!   bubbles per row. Row height shrinks with the question count; the bubble
//!   radius follows it but is capped at `MAX_BUBBLE_RADIUS`.
//! - Footer: declaration and four detail boxes at fixed coordinates.
//!
//! The engine trusts its input: subject and question counts are validated
//! upstream, so column width and row height are always positive here.

use std::sync::Arc;

use tracing::warn;

use crate::layout::commands::{DrawCommand, FontFace, TextAlign};
use crate::layout::logo::load_logo;
use crate::sheet::SheetSpec;

// ────────────────────────────────────────────────────────────────────────────
// Page constants
// ────────────────────────────────────────────────────────────────────────────

pub const PAGE_WIDTH: f32 = 595.2756;
pub const PAGE_HEIGHT: f32 = 841.8898;

const BORDER_INSET: f32 = 20.0;
const BORDER_LINE_WIDTH: f32 = 2.0;
const BOX_LINE_WIDTH: f32 = 1.0;
const BUBBLE_LINE_WIDTH: f32 = 0.75;

const LOGO_X: f32 = 40.0;
const LOGO_TOP_OFFSET: f32 = 110.0;
const LOGO_SIZE: f32 = 70.0;

/// Distance from the page top to the subject header baseline.
const HEADER_TOP_OFFSET: f32 = 160.0;
/// Lowest baseline the grid may reach; the footer lives below it.
const GRID_FLOOR_Y: f32 = 180.0;
const GRID_LEFT: f32 = 50.0;
/// Horizontal space not divided among subject columns.
const GRID_HORIZONTAL_MARGIN: f32 = 120.0;

const QUESTION_NUMBER_OFFSET: f32 = 35.0;
const FIRST_BUBBLE_OFFSET: f32 = 50.0;
/// Part of each column not shared among bubbles (number gutter + padding).
const BUBBLE_INSET: f32 = 80.0;
const BUBBLE_RAISE: f32 = 3.0;

pub const MAX_BUBBLE_RADIUS: f32 = 6.0;
// Text sizes are fixed; on dense sheets letters overflow their bubbles.
const QUESTION_NUMBER_SIZE: f32 = 9.0;
const OPTION_LABEL_SIZE: f32 = 7.0;
const OPTION_LABEL_DROP: f32 = 2.5;

const OPTION_LETTERS: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";

// ────────────────────────────────────────────────────────────────────────────
// Output types
// ────────────────────────────────────────────────────────────────────────────

/// Derived grid dimensions for one sheet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridMetrics {
    pub column_width: f32,
    pub row_height: f32,
    pub bubble_radius: f32,
    pub bubble_spacing: f32,
    /// Baseline of the subject headers; question `q` sits `q * row_height` below it.
    pub header_y: f32,
}

/// A fully laid-out page.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetLayout {
    pub page_width: f32,
    pub page_height: f32,
    pub metrics: GridMetrics,
    pub commands: Vec<DrawCommand>,
}

// ────────────────────────────────────────────────────────────────────────────
// Public entry points
// ────────────────────────────────────────────────────────────────────────────

/// Computes the column/row scaling for a given subject, question and option count.
pub fn grid_metrics(
    subject_count: usize,
    questions_per_subject: u32,
    option_count: u32,
) -> GridMetrics {
    debug_assert!(subject_count >= 1, "subject count validated upstream");
    debug_assert!(questions_per_subject >= 1, "question count validated upstream");

    let column_width = (PAGE_WIDTH - GRID_HORIZONTAL_MARGIN) / subject_count as f32;
    let header_y = PAGE_HEIGHT - HEADER_TOP_OFFSET;
    let available_height = header_y - GRID_FLOOR_Y;
    let row_height = available_height / questions_per_subject as f32;

    GridMetrics {
        column_width,
        row_height,
        bubble_radius: MAX_BUBBLE_RADIUS.min(row_height / 3.0),
        bubble_spacing: (column_width - BUBBLE_INSET) / option_count as f32,
        header_y,
    }
}

/// The first `count` uppercase letters, used as option labels.
pub fn option_labels(count: u32) -> Vec<char> {
    OPTION_LETTERS.chars().take(count as usize).collect()
}

/// Lays out a complete sheet.
///
/// Reads the logo file when one is set; a logo that cannot be loaded is logged
/// and left out, the rest of the page is unaffected.
pub fn layout_sheet(spec: &SheetSpec) -> SheetLayout {
    let metrics = grid_metrics(
        spec.subjects.len(),
        spec.questions_per_subject,
        spec.option_count,
    );

    let mut commands = Vec::new();
    push_header(&mut commands, spec);
    push_grid(&mut commands, spec, &metrics);
    push_footer(&mut commands);

    SheetLayout {
        page_width: PAGE_WIDTH,
        page_height: PAGE_HEIGHT,
        metrics,
        commands,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Regions
// ────────────────────────────────────────────────────────────────────────────

fn push_header(commands: &mut Vec<DrawCommand>, spec: &SheetSpec) {
    commands.push(DrawCommand::Rectangle {
        x: BORDER_INSET,
        y: BORDER_INSET,
        width: PAGE_WIDTH - 2.0 * BORDER_INSET,
        height: PAGE_HEIGHT - 2.0 * BORDER_INSET,
        line_width: BORDER_LINE_WIDTH,
    });

    if let Some(path) = &spec.logo {
        match load_logo(path) {
            Ok(image) => commands.push(DrawCommand::Image {
                x: LOGO_X,
                y: PAGE_HEIGHT - LOGO_TOP_OFFSET,
                width: LOGO_SIZE,
                height: LOGO_SIZE,
                image: Arc::new(image),
            }),
            Err(e) => warn!("Skipping logo {}: {e}", path.display()),
        }
    }

    let center_x = PAGE_WIDTH / 2.0;
    commands.push(DrawCommand::text(
        center_x,
        PAGE_HEIGHT - 50.0,
        spec.institution.to_uppercase(),
        FontFace::HelveticaBold,
        16.0,
        TextAlign::Center,
    ));
    commands.push(DrawCommand::text(
        center_x,
        PAGE_HEIGHT - 75.0,
        format!("ANSWER SHEET - {}", spec.exam.to_uppercase()),
        FontFace::Helvetica,
        12.0,
        TextAlign::Center,
    ));

    // Roll number and booklet number boxes, top right.
    for (top_offset, label) in [(100.0, "ROLL NO."), (140.0, "TEST BOOKLET NUMBER")] {
        let y = PAGE_HEIGHT - top_offset;
        commands.push(DrawCommand::Rectangle {
            x: PAGE_WIDTH - 220.0,
            y,
            width: 180.0,
            height: 30.0,
            line_width: BOX_LINE_WIDTH,
        });
        commands.push(DrawCommand::text(
            PAGE_WIDTH - 215.0,
            y + 15.0,
            label,
            FontFace::HelveticaBold,
            10.0,
            TextAlign::Left,
        ));
    }
}

fn push_grid(commands: &mut Vec<DrawCommand>, spec: &SheetSpec, metrics: &GridMetrics) {
    for (i, subject) in spec.subjects.iter().enumerate() {
        let x = GRID_LEFT + i as f32 * metrics.column_width + metrics.column_width / 2.0;
        commands.push(DrawCommand::text(
            x,
            metrics.header_y,
            subject.to_uppercase(),
            FontFace::HelveticaBold,
            12.0,
            TextAlign::Center,
        ));
    }

    let labels = option_labels(spec.option_count);

    for column in 0..spec.subjects.len() {
        let x_offset = GRID_LEFT + column as f32 * metrics.column_width;

        for question in 1..=spec.questions_per_subject {
            let y = metrics.header_y - question as f32 * metrics.row_height;

            commands.push(DrawCommand::text(
                x_offset + QUESTION_NUMBER_OFFSET,
                y,
                format!("{question:02}"),
                FontFace::Helvetica,
                QUESTION_NUMBER_SIZE,
                TextAlign::Right,
            ));

            for (i, label) in labels.iter().enumerate() {
                let cx = x_offset + FIRST_BUBBLE_OFFSET + i as f32 * metrics.bubble_spacing;
                let cy = y + BUBBLE_RAISE;
                commands.push(DrawCommand::Circle {
                    cx,
                    cy,
                    radius: metrics.bubble_radius,
                    line_width: BUBBLE_LINE_WIDTH,
                });
                commands.push(DrawCommand::text(
                    cx,
                    cy - OPTION_LABEL_DROP,
                    label.to_string(),
                    FontFace::HelveticaBold,
                    OPTION_LABEL_SIZE,
                    TextAlign::Center,
                ));
            }
        }
    }
}

fn push_footer(commands: &mut Vec<DrawCommand>) {
    commands.push(DrawCommand::text(
        50.0,
        140.0,
        "DECLARATION BY THE CANDIDATE",
        FontFace::HelveticaBold,
        10.0,
        TextAlign::Left,
    ));
    commands.push(DrawCommand::text(
        50.0,
        125.0,
        "I declare that I have answered the questions with my own hand.",
        FontFace::Helvetica,
        9.0,
        TextAlign::Left,
    ));

    const DETAIL_BOXES: [(f32, f32, &str); 4] = [
        (50.0, 90.0, "CANDIDATE'S NAME"),
        (270.0, 90.0, "CLASS/SECTION"),
        (50.0, 50.0, "CANDIDATE'S SIGNATURE"),
        (270.0, 50.0, "INVIGILATOR SIGN"),
    ];
    for (x, y, label) in DETAIL_BOXES {
        commands.push(DrawCommand::Rectangle {
            x,
            y,
            width: 200.0,
            height: 30.0,
            line_width: BOX_LINE_WIDTH,
        });
        commands.push(DrawCommand::text(
            x + 5.0,
            y + 15.0,
            label,
            FontFace::Helvetica,
            9.0,
            TextAlign::Left,
        ));
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::capture_logs;
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};

    fn make_spec(subjects: &[&str], questions: u32, options: u32) -> SheetSpec {
        SheetSpec {
            institution: "Green Valley School".to_string(),
            exam: "Midterm".to_string(),
            subjects: subjects.iter().map(|s| s.to_string()).collect(),
            questions_per_subject: questions,
            option_count: options,
            logo: None,
        }
    }

    fn texts(layout: &SheetLayout) -> Vec<&str> {
        layout
            .commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    fn circles(layout: &SheetLayout) -> Vec<(f32, f32, f32)> {
        layout
            .commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Circle { cx, cy, radius, .. } => Some((*cx, *cy, *radius)),
                _ => None,
            })
            .collect()
    }

    fn has_image(layout: &SheetLayout) -> bool {
        layout
            .commands
            .iter()
            .any(|c| matches!(c, DrawCommand::Image { .. }))
    }

    // ── grid_metrics ────────────────────────────────────────────────────────

    #[test]
    fn test_metrics_positive_and_radius_capped_over_full_range() {
        for subjects in 1..=5 {
            for questions in 1..=100 {
                let m = grid_metrics(subjects, questions, 4);
                assert!(m.column_width > 0.0, "{subjects}x{questions}");
                assert!(m.row_height > 0.0, "{subjects}x{questions}");
                assert!(m.bubble_radius > 0.0);
                assert!(m.bubble_radius <= MAX_BUBBLE_RADIUS);
            }
        }
    }

    #[test]
    fn test_bubbles_never_overlap_vertically() {
        for questions in 1..=100 {
            let m = grid_metrics(3, questions, 4);
            assert!(2.0 * m.bubble_radius < m.row_height);
        }
    }

    #[test]
    fn test_small_question_count_hits_radius_cap() {
        let m = grid_metrics(1, 1, 4);
        assert_eq!(m.bubble_radius, MAX_BUBBLE_RADIUS);
    }

    #[test]
    fn test_large_question_count_scales_radius() {
        let m = grid_metrics(1, 100, 4);
        assert!((m.bubble_radius - m.row_height / 3.0).abs() < 1e-5);
        assert!(m.bubble_radius < MAX_BUBBLE_RADIUS);
    }

    #[test]
    fn test_column_width_divides_usable_width() {
        let m = grid_metrics(4, 25, 4);
        assert!((m.column_width * 4.0 - (PAGE_WIDTH - 120.0)).abs() < 1e-3);
    }

    // ── option_labels ───────────────────────────────────────────────────────

    #[test]
    fn test_option_labels_prefix_of_alphabet() {
        assert_eq!(option_labels(2), vec!['A', 'B']);
        assert_eq!(option_labels(6), vec!['A', 'B', 'C', 'D', 'E', 'F']);
    }

    // ── layout_sheet ────────────────────────────────────────────────────────

    #[test]
    fn test_green_valley_scenario() {
        let layout = layout_sheet(&make_spec(&["MATH", "SCIENCE", "ENGLISH"], 25, 4));
        let texts = texts(&layout);

        assert_eq!(layout.page_width, PAGE_WIDTH);
        assert!(texts.contains(&"GREEN VALLEY SCHOOL"));
        assert!(texts.contains(&"ANSWER SHEET - MIDTERM"));
        for header in ["MATH", "SCIENCE", "ENGLISH"] {
            assert_eq!(texts.iter().filter(|t| **t == header).count(), 1);
        }
        // Three columns, each numbered 01..25.
        assert_eq!(texts.iter().filter(|t| **t == "01").count(), 3);
        assert_eq!(texts.iter().filter(|t| **t == "25").count(), 3);
        assert!(!texts.contains(&"26"));

        assert_eq!(circles(&layout).len(), 3 * 25 * 4);
        for letter in ["A", "B", "C", "D"] {
            assert_eq!(texts.iter().filter(|t| **t == letter).count(), 3 * 25);
        }
        assert!(!texts.contains(&"E"));
        assert!(!has_image(&layout));
    }

    #[test]
    fn test_option_letters_once_per_row() {
        for k in 2..=6 {
            let layout = layout_sheet(&make_spec(&["PHYSICS"], 10, k));
            let texts = texts(&layout);
            for (i, letter) in OPTION_LETTERS.chars().enumerate() {
                let expected = if (i as u32) < k { 10 } else { 0 };
                let count = texts
                    .iter()
                    .filter(|t| t.len() == 1 && t.starts_with(letter))
                    .count();
                assert_eq!(count, expected, "letter {letter} with {k} options");
            }
        }
    }

    #[test]
    fn test_rows_stay_above_footer() {
        let layout = layout_sheet(&make_spec(&["A", "B", "C", "D", "E"], 100, 6));
        for (_, cy, r) in circles(&layout) {
            assert!(cy - r >= GRID_FLOOR_Y - MAX_BUBBLE_RADIUS);
            assert!(cy + r <= layout.metrics.header_y);
        }
    }

    #[test]
    fn test_text_sizes_fixed_on_dense_sheet() {
        let layout = layout_sheet(&make_spec(&["A", "B", "C", "D", "E"], 100, 6));
        let text_of = |wanted: &str| {
            layout
                .commands
                .iter()
                .find(|c| matches!(c, DrawCommand::Text { text, .. } if text == wanted))
                .unwrap()
        };
        let (_, cy, _) = circles(&layout)[0];

        assert!(matches!(text_of("100"), DrawCommand::Text { size, .. } if *size == 9.0));
        assert!(matches!(
            text_of("F"),
            DrawCommand::Text { y, size, .. } if *size == 7.0 && (*y - (cy - 2.5)).abs() < 1e-4
        ));
    }

    #[test]
    fn test_question_numbers_are_right_aligned() {
        let layout = layout_sheet(&make_spec(&["MATH"], 5, 4));
        let numbers: Vec<_> = layout
            .commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Text { text, .. } if text == "03"))
            .collect();
        assert_eq!(numbers.len(), 1);
        assert!(matches!(
            numbers[0],
            DrawCommand::Text { align: TextAlign::Right, x, .. } if (*x - 85.0).abs() < 1e-4
        ));
    }

    #[test]
    fn test_footer_independent_of_scaling() {
        let footer = |layout: &SheetLayout| -> Vec<DrawCommand> {
            let n = layout.commands.len();
            layout.commands[n - 10..].to_vec()
        };
        let small = layout_sheet(&make_spec(&["MATH"], 1, 2));
        let large = layout_sheet(&make_spec(&["A", "B", "C", "D", "E"], 100, 6));
        assert_eq!(footer(&small), footer(&large));
        assert!(matches!(
            &footer(&small)[0],
            DrawCommand::Text { text, .. } if text == "DECLARATION BY THE CANDIDATE"
        ));
    }

    #[test]
    fn test_border_comes_first() {
        let layout = layout_sheet(&make_spec(&["MATH"], 10, 4));
        assert_eq!(
            layout.commands[0],
            DrawCommand::Rectangle {
                x: 20.0,
                y: 20.0,
                width: PAGE_WIDTH - 40.0,
                height: PAGE_HEIGHT - 40.0,
                line_width: 2.0,
            }
        );
    }

    #[test]
    fn test_layout_is_deterministic() {
        let spec = make_spec(&["MATH", "SCIENCE"], 40, 5);
        assert_eq!(layout_sheet(&spec), layout_sheet(&spec));
    }

    #[test]
    fn test_logo_included_when_loadable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("crest.png");
        DynamicImage::ImageRgb8(RgbImage::from_pixel(8, 8, Rgb([200, 0, 0])))
            .save_with_format(&path, ImageFormat::Png)
            .unwrap();

        let mut spec = make_spec(&["MATH"], 10, 4);
        spec.logo = Some(path);
        let (first, logs) = capture_logs(|| layout_sheet(&spec));
        assert!(has_image(&first));
        assert!(!logs.contains("Skipping logo"));
        assert!(matches!(
            first.commands[1],
            DrawCommand::Image { width, height, .. } if width == 70.0 && height == 70.0
        ));
        // Same logo bytes, same geometry.
        assert_eq!(first, layout_sheet(&spec));
    }

    #[test]
    fn test_unloadable_logo_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("crest.png");
        std::fs::write(&path, b"corrupted").unwrap();

        let mut spec = make_spec(&["MATH"], 10, 4);
        spec.logo = Some(path);
        let (with_bad_logo, logs) = capture_logs(|| layout_sheet(&spec));
        assert!(logs.contains("WARN"), "{logs}");
        assert!(logs.contains("Skipping logo"), "{logs}");

        spec.logo = None;
        let without_logo = layout_sheet(&spec);

        assert!(!has_image(&with_bad_logo));
        assert_eq!(with_bad_logo, without_logo);
    }
}
