//! Static glyph-width tables for the two base-14 faces used on the sheet.
//!
//! Widths are in thousandths of an em, taken from the Adobe core-font AFM files.
//! Tables cover ASCII 0x20..=0x7E (95 printable characters); index is
//! `(char as usize) - 32`. Anything outside that range is measured with the
//! table's average width, which is close enough for centring Latin-1 names.

use crate::layout::commands::FontFace;

/// Width array slot layout:
/// ```text
/// [0]=sp  [1]=!   [2]="   [3]=#   [4]=$   [5]=%   [6]=&   [7]='
/// [8]=(   [9]=)   [10]=*  [11]=+  [12]=,  [13]=-  [14]=.  [15]=/
/// [16..25]=0-9
/// [26]=:  [27]=;  [28]=<  [29]==  [30]=>  [31]=?  [32]=@
/// [33..58]=A-Z
/// [59]=[  [60]=\  [61]=]  [62]=^  [63]=_  [64]=`
/// [65..90]=a-z
/// [91]={  [92]=|  [93]=}  [94]=~
/// ```
pub struct FontMetricTable {
    widths: [u16; 95],
    /// Fallback width for characters outside printable ASCII.
    pub average_char_width: u16,
}

impl FontMetricTable {
    /// Width of `text` in points when set at `size` points.
    pub fn measure(&self, text: &str, size: f32) -> f32 {
        let units: u32 = text
            .chars()
            .map(|c| {
                let code = c as usize;
                if (32..=126).contains(&code) {
                    u32::from(self.widths[code - 32])
                } else {
                    u32::from(self.average_char_width)
                }
            })
            .sum();
        units as f32 * size / 1000.0
    }
}

/// Returns the metric table for a face.
pub fn get_metrics(face: FontFace) -> &'static FontMetricTable {
    match face {
        FontFace::Helvetica => &HELVETICA,
        FontFace::HelveticaBold => &HELVETICA_BOLD,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tables
// ────────────────────────────────────────────────────────────────────────────

static HELVETICA: FontMetricTable = FontMetricTable {
    widths: [
        // sp ! " # $ % & '
        278, 278, 355, 556, 556, 889, 667, 191,
        // ( ) * + , - . /
        333, 333, 389, 584, 278, 333, 278, 278,
        // 0-9
        556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
        // : ; < = > ? @
        278, 278, 584, 584, 584, 556, 1015,
        // A-Z
        667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833,
        722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
        // [ \ ] ^ _ `
        278, 278, 278, 469, 556, 333,
        // a-z
        556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833,
        556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500,
        // { | } ~
        334, 260, 334, 584,
    ],
    average_char_width: 556,
};

static HELVETICA_BOLD: FontMetricTable = FontMetricTable {
    widths: [
        // sp ! " # $ % & '
        278, 333, 474, 556, 556, 889, 722, 238,
        // ( ) * + , - . /
        333, 333, 389, 584, 278, 333, 278, 278,
        // 0-9
        556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
        // : ; < = > ? @
        333, 333, 584, 584, 584, 611, 975,
        // A-Z
        722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833,
        722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
        // [ \ ] ^ _ `
        333, 278, 333, 584, 556, 333,
        // a-z
        556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889,
        611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500,
        // { | } ~
        389, 280, 389, 584,
    ],
    average_char_width: 611,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_string_has_zero_width() {
        assert_eq!(get_metrics(FontFace::Helvetica).measure("", 12.0), 0.0);
    }

    #[test]
    fn test_digits_are_tabular() {
        let metrics = get_metrics(FontFace::Helvetica);
        assert_eq!(metrics.measure("01", 9.0), metrics.measure("99", 9.0));
        assert!((metrics.measure("0", 10.0) - 5.56).abs() < 1e-4);
    }

    #[test]
    fn test_bold_is_never_narrower_for_capitals() {
        let regular = get_metrics(FontFace::Helvetica);
        let bold = get_metrics(FontFace::HelveticaBold);
        let caps = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
        assert!(bold.measure(caps, 12.0) >= regular.measure(caps, 12.0));
    }

    #[test]
    fn test_width_scales_linearly_with_size() {
        let metrics = get_metrics(FontFace::HelveticaBold);
        let small = metrics.measure("MATHEMATICS", 6.0);
        let large = metrics.measure("MATHEMATICS", 12.0);
        assert!((large - 2.0 * small).abs() < 1e-3);
    }

    #[test]
    fn test_non_ascii_uses_average_width() {
        let metrics = get_metrics(FontFace::Helvetica);
        assert!((metrics.measure("é", 1000.0) - 556.0).abs() < 1e-3);
    }
}
