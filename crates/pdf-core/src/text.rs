//! Text and shape operator generation

use crate::document::Color;
use crate::{Align, PdfError, Result};

/// Context for rendering text
pub struct TextRenderContext {
    /// PDF font resource name (e.g., "F1")
    pub font_name: String,
    /// Font size in points
    pub font_size: f64,
    /// Text width in points (for alignment)
    pub text_width: f64,
    /// Text color (RGB)
    pub color: Color,
}

/// Encode text into WinAnsiEncoding bytes
///
/// The standard 14 fonts are referenced with `/WinAnsiEncoding`, so text
/// drawn with them must be single-byte. Tabs and line breaks become spaces;
/// any other character without a WinAnsi code is an error.
pub fn encode_win_ansi(text: &str) -> Result<Vec<u8>> {
    text.chars()
        .map(|c| match c as u32 {
            0x20..=0x7E | 0xA0..=0xFF => Ok(c as u32 as u8),
            _ if matches!(c, '\t' | '\n' | '\r') => Ok(b' '),
            _ => WIN_ANSI_HIGH
                .iter()
                .find(|(ch, _)| *ch == c)
                .map(|(_, code)| *code)
                .ok_or(PdfError::UnencodableText(c)),
        })
        .collect()
}

/// Decode single-byte text shown with a simple (non-composite) font
///
/// Codes 0x80..=0x9F follow WinAnsiEncoding; everything else is read as
/// Latin-1. Control bytes are dropped.
pub fn decode_win_ansi(bytes: &[u8]) -> String {
    bytes
        .iter()
        .filter_map(|&b| match b {
            0x80..=0x9F => WIN_ANSI_HIGH
                .iter()
                .find(|(_, code)| *code == b)
                .map(|(ch, _)| *ch),
            0x00..=0x1F | 0x7F => None,
            _ => Some(b as char),
        })
        .collect()
}

/// WinAnsi codes 0x80..=0x9F, which differ from Latin-1
const WIN_ANSI_HIGH: [(char, u8); 27] = [
    ('€', 0x80),
    ('‚', 0x82),
    ('ƒ', 0x83),
    ('„', 0x84),
    ('…', 0x85),
    ('†', 0x86),
    ('‡', 0x87),
    ('ˆ', 0x88),
    ('‰', 0x89),
    ('Š', 0x8A),
    ('‹', 0x8B),
    ('Œ', 0x8C),
    ('Ž', 0x8E),
    ('‘', 0x91),
    ('’', 0x92),
    ('“', 0x93),
    ('”', 0x94),
    ('•', 0x95),
    ('–', 0x96),
    ('—', 0x97),
    ('˜', 0x98),
    ('™', 0x99),
    ('š', 0x9A),
    ('›', 0x9B),
    ('œ', 0x9C),
    ('ž', 0x9E),
    ('Ÿ', 0x9F),
];

/// Format bytes as a PDF literal string, e.g. `(Hello \(world\))`
///
/// Non-printable and non-ASCII bytes are written as octal escapes so the
/// operator stream stays ASCII.
pub fn pdf_literal(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() + 2);
    out.push('(');
    for &b in bytes {
        match b {
            b'(' | b')' | b'\\' => {
                out.push('\\');
                out.push(b as char);
            }
            0x20..=0x7E => out.push(b as char),
            _ => out.push_str(&format!("\\{b:03o}")),
        }
    }
    out.push(')');
    out
}

/// Generate PDF operators for text insertion
///
/// Creates the proper PDF text operators (BT, Tf, Td, Tj, ET) to render text
/// at a specific position with alignment support.
///
/// # Arguments
/// * `text_literal` - PDF string token (e.g., "(Hello)")
/// * `x` - X coordinate in points (PDF coordinates, from left)
/// * `y` - Y coordinate in points (PDF coordinates, from bottom)
/// * `align` - Text alignment relative to `x`
/// * `ctx` - Text rendering context
pub fn generate_text_operators(
    text_literal: &str,
    x: f64,
    y: f64,
    align: Align,
    ctx: &TextRenderContext,
) -> Vec<u8> {
    let mut ops = String::new();

    let x_offset = match align {
        Align::Left => 0.0,
        Align::Center => -ctx.text_width / 2.0,
        Align::Right => -ctx.text_width,
    };
    let final_x = x + x_offset;

    ops.push_str("BT\n");
    ops.push_str(&format!(
        "{} {} {} rg\n",
        ctx.color.r, ctx.color.g, ctx.color.b
    ));
    ops.push_str(&format!("/{} {} Tf\n", ctx.font_name, ctx.font_size));
    ops.push_str(&format!("{final_x} {y} Td\n"));
    ops.push_str(&format!("{text_literal} Tj\n"));
    ops.push_str("ET\n");

    ops.into_bytes()
}

/// Generate PDF operators for an opaque filled rectangle
///
/// The fill color is scoped to a saved graphics state.
pub fn generate_rect_operators(x: f64, y: f64, width: f64, height: f64, color: Color) -> Vec<u8> {
    format!(
        "q\n{} {} {} rg\n{x} {y} {width} {height} re\nf\nQ\n",
        color.r, color.g, color.b
    )
    .into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(font_name: &str, font_size: f64, text_width: f64, color: Color) -> TextRenderContext {
        TextRenderContext {
            font_name: font_name.to_string(),
            font_size,
            text_width,
            color,
        }
    }

    #[test]
    fn test_generate_text_operators_left() {
        let ctx = ctx("F1", 12.0, 100.0, Color::black());
        let ops = generate_text_operators("(Hello)", 100.0, 700.0, Align::Left, &ctx);
        let ops_str = String::from_utf8(ops).unwrap();

        assert!(ops_str.contains("BT"));
        assert!(ops_str.contains("/F1 12 Tf"));
        assert!(ops_str.contains("100 700 Td"));
        assert!(ops_str.contains("(Hello) Tj"));
        assert!(ops_str.contains("ET"));
    }

    #[test]
    fn test_generate_text_operators_center() {
        let ctx = ctx("F2", 10.0, 100.0, Color::black());
        let ops = generate_text_operators("(Page 1 / 2)", 200.0, 14.0, Align::Center, &ctx);
        let ops_str = String::from_utf8(ops).unwrap();

        assert!(ops_str.contains("150 14 Td"));
    }

    #[test]
    fn test_generate_text_operators_right() {
        let ctx = ctx("F3", 16.0, 80.0, Color::black());
        let ops = generate_text_operators("(Right)", 300.0, 500.0, Align::Right, &ctx);
        let ops_str = String::from_utf8(ops).unwrap();

        assert!(ops_str.contains("220 500 Td"));
    }

    #[test]
    fn test_generate_text_operators_with_color() {
        let ctx = ctx("F1", 12.0, 0.0, Color::rgb(1.0, 0.0, 0.0));
        let ops = generate_text_operators("(A)", 100.0, 700.0, Align::Left, &ctx);
        let ops_str = String::from_utf8(ops).unwrap();

        assert!(ops_str.contains("1 0 0 rg"));
    }

    #[test]
    fn test_generate_rect_operators() {
        let ops = generate_rect_operators(10.0, 20.0, 30.0, 40.0, Color::white());
        let ops_str = String::from_utf8(ops).unwrap();

        assert!(ops_str.starts_with("q\n"));
        assert!(ops_str.contains("1 1 1 rg"));
        assert!(ops_str.contains("10 20 30 40 re"));
        assert!(ops_str.contains("\nf\n"));
        assert!(ops_str.ends_with("Q\n"));
    }

    #[test]
    fn test_encode_win_ansi_ascii() {
        assert_eq!(encode_win_ansi("Hello").unwrap(), b"Hello".to_vec());
    }

    #[test]
    fn test_encode_win_ansi_latin1_and_high() {
        assert_eq!(encode_win_ansi("é").unwrap(), vec![0xE9]);
        assert_eq!(encode_win_ansi("€").unwrap(), vec![0x80]);
        assert_eq!(encode_win_ansi("“x”").unwrap(), vec![0x93, b'x', 0x94]);
        assert_eq!(encode_win_ansi("a\tb").unwrap(), b"a b".to_vec());
    }

    #[test]
    fn test_encode_win_ansi_rejects_unmapped() {
        assert!(matches!(
            encode_win_ansi("日本 → ok"),
            Err(PdfError::UnencodableText('日'))
        ));
        assert!(matches!(
            encode_win_ansi("a → b"),
            Err(PdfError::UnencodableText('→'))
        ));
    }

    #[test]
    fn test_decode_win_ansi() {
        assert_eq!(decode_win_ansi(&[b'H', 0xE9, 0x93, 0x94]), "Hé“”");
        assert_eq!(decode_win_ansi(&[0x01, b'a', 0x7F]), "a");
    }

    #[test]
    fn test_pdf_literal_escapes() {
        assert_eq!(pdf_literal(b"a(b)c\\"), "(a\\(b\\)c\\\\)");
        assert_eq!(pdf_literal(&[0xE9]), "(\\351)");
    }
}
