//! PDF backend: draws a `SheetLayout` onto a single page with `pdf-writer`.
//!
//! Output is byte-for-byte reproducible: object numbers are allocated in a
//! fixed order and no creation date or file ID is written.

use pdf_writer::{Content, Finish, Name, Pdf, Rect, Ref, Str, TextStr};

use crate::layout::{DrawCommand, FontFace, LogoImage, SheetLayout};

/// Object numbers, allocated once in a fixed order.
struct ObjectIds {
    catalog: Ref,
    page_tree: Ref,
    page: Ref,
    content: Ref,
    font_regular: Ref,
    font_bold: Ref,
    info: Ref,
    image: Ref,
    image_mask: Ref,
}

impl ObjectIds {
    fn new() -> Self {
        ObjectIds {
            catalog: Ref::new(1),
            page_tree: Ref::new(2),
            page: Ref::new(3),
            content: Ref::new(4),
            font_regular: Ref::new(5),
            font_bold: Ref::new(6),
            info: Ref::new(7),
            image: Ref::new(8),
            image_mask: Ref::new(9),
        }
    }
}

const FONT_REGULAR: Name<'static> = Name(b"F1");
const FONT_BOLD: Name<'static> = Name(b"F2");
const IMAGE_NAME: Name<'static> = Name(b"Im1");

/// Bézier control-point factor for approximating a quarter circle.
const KAPPA: f32 = 0.552_284_8;

/// Renders the layout into a complete PDF file.
///
/// `title` is written into the document information dictionary.
pub fn render_pdf(layout: &SheetLayout, title: &str) -> Vec<u8> {
    let ids = ObjectIds::new();
    let mut pdf = Pdf::new();

    pdf.catalog(ids.catalog).pages(ids.page_tree);
    pdf.pages(ids.page_tree).kids([ids.page]).count(1);

    let mut content = Content::new();
    let mut logo: Option<&LogoImage> = None;

    for command in &layout.commands {
        match command {
            DrawCommand::Rectangle {
                x,
                y,
                width,
                height,
                line_width,
            } => {
                content
                    .set_line_width(*line_width)
                    .rect(*x, *y, *width, *height)
                    .stroke();
            }
            DrawCommand::Circle {
                cx,
                cy,
                radius,
                line_width,
            } => {
                content.set_line_width(*line_width);
                circle_path(&mut content, *cx, *cy, *radius);
                content.stroke();
            }
            DrawCommand::Text {
                y,
                text,
                font,
                size,
                ..
            } => {
                // text_origin_x is always Some for Text commands.
                let x = command.text_origin_x().unwrap_or_default();
                content
                    .begin_text()
                    .set_font(font_resource(*font), *size)
                    .next_line(x, *y)
                    .show(Str(&encode_win_ansi(text)))
                    .end_text();
            }
            DrawCommand::Image {
                x,
                y,
                width,
                height,
                image,
            } => {
                logo = Some(&**image);
                content
                    .save_state()
                    .transform([*width, 0.0, 0.0, *height, *x, *y])
                    .x_object(IMAGE_NAME)
                    .restore_state();
            }
        }
    }

    pdf.stream(ids.content, &content.finish());

    {
        let mut page = pdf.page(ids.page);
        page.media_box(Rect::new(0.0, 0.0, layout.page_width, layout.page_height));
        page.parent(ids.page_tree);
        page.contents(ids.content);
        let mut resources = page.resources();
        resources
            .fonts()
            .pair(FONT_REGULAR, ids.font_regular)
            .pair(FONT_BOLD, ids.font_bold);
        if logo.is_some() {
            resources.x_objects().pair(IMAGE_NAME, ids.image);
        }
        resources.finish();
        page.finish();
    }

    for (id, face) in [
        (ids.font_regular, FontFace::Helvetica),
        (ids.font_bold, FontFace::HelveticaBold),
    ] {
        pdf.type1_font(id)
            .base_font(Name(face.base_font().as_bytes()))
            .encoding_predefined(Name(b"WinAnsiEncoding"));
    }

    pdf.document_info(ids.info)
        .title(TextStr(title))
        .creator(TextStr(env!("CARGO_PKG_NAME")))
        .producer(TextStr(env!("CARGO_PKG_NAME")));

    if let Some(image) = logo {
        write_image(&mut pdf, image, ids.image, ids.image_mask);
    }

    pdf.finish()
}

fn font_resource(face: FontFace) -> Name<'static> {
    match face {
        FontFace::Helvetica => FONT_REGULAR,
        FontFace::HelveticaBold => FONT_BOLD,
    }
}

/// Appends a closed circle path made of four cubic arcs.
fn circle_path(content: &mut Content, cx: f32, cy: f32, r: f32) {
    let k = r * KAPPA;
    content
        .move_to(cx + r, cy)
        .cubic_to(cx + r, cy + k, cx + k, cy + r, cx, cy + r)
        .cubic_to(cx - k, cy + r, cx - r, cy + k, cx - r, cy)
        .cubic_to(cx - r, cy - k, cx - k, cy - r, cx, cy - r)
        .cubic_to(cx + k, cy - r, cx + r, cy - k, cx + r, cy)
        .close_path();
}

fn write_image(pdf: &mut Pdf, image: &LogoImage, image_id: Ref, mask_id: Ref) {
    if let Some(alpha) = &image.alpha {
        let mut mask = pdf.image_xobject(mask_id, alpha);
        mask.width(image.width as i32);
        mask.height(image.height as i32);
        mask.color_space().device_gray();
        mask.bits_per_component(8);
    }

    let mut xobject = pdf.image_xobject(image_id, &image.rgb);
    xobject.width(image.width as i32);
    xobject.height(image.height as i32);
    xobject.color_space().device_rgb();
    xobject.bits_per_component(8);
    if image.alpha.is_some() {
        xobject.s_mask(mask_id);
    }
}

/// Encodes text for a WinAnsi-encoded base font.
///
/// Latin-1 maps one-to-one; a few common typographic marks map to their
/// Windows-1252 slots; everything else becomes `?`.
fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            ' '..='~' => c as u8,
            '\u{a0}'..='\u{ff}' => c as u32 as u8,
            '€' => 0x80,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '–' => 0x96,
            '—' => 0x97,
            _ => b'?',
        })
        .collect()
}
