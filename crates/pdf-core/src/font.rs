//! Standard 14 font faces and their metrics

use lopdf::{dictionary, Dictionary};

/// One of the standard PDF fonts used when redrawing text
///
/// Only the Helvetica, Times and Courier families are covered; Symbol and
/// ZapfDingbats are never chosen for edited text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StandardFont {
    Helvetica,
    HelveticaBold,
    HelveticaOblique,
    HelveticaBoldOblique,
    TimesRoman,
    TimesBold,
    TimesItalic,
    TimesBoldItalic,
    Courier,
    CourierBold,
    CourierOblique,
    CourierBoldOblique,
}

/// Family bucket a CSS font family string falls into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FontClass {
    #[default]
    Sans,
    Serif,
    Mono,
}

impl FontClass {
    /// Classify a CSS font family string into a family bucket
    ///
    /// `courier`/`mono`/`consolas` select monospace; `times`/`georgia`, or
    /// `serif` not preceded by `sans`, select serif; anything else is sans.
    pub fn classify(css_family: &str) -> Self {
        let lower = css_family.to_lowercase();
        if lower.contains("courier") || lower.contains("mono") || lower.contains("consolas") {
            return FontClass::Mono;
        }
        if lower.contains("times")
            || lower.contains("georgia")
            || (lower.contains("serif") && !lower.contains("sans"))
        {
            return FontClass::Serif;
        }
        FontClass::Sans
    }
}

impl StandardFont {
    /// All faces, in embedding order
    pub const ALL: [StandardFont; 12] = [
        StandardFont::Helvetica,
        StandardFont::HelveticaBold,
        StandardFont::HelveticaOblique,
        StandardFont::HelveticaBoldOblique,
        StandardFont::TimesRoman,
        StandardFont::TimesBold,
        StandardFont::TimesItalic,
        StandardFont::TimesBoldItalic,
        StandardFont::Courier,
        StandardFont::CourierBold,
        StandardFont::CourierOblique,
        StandardFont::CourierBoldOblique,
    ];

    /// Pick the face for a family bucket and style flags
    pub fn select(class: FontClass, bold: bool, italic: bool) -> Self {
        match (class, bold, italic) {
            (FontClass::Sans, false, false) => StandardFont::Helvetica,
            (FontClass::Sans, true, false) => StandardFont::HelveticaBold,
            (FontClass::Sans, false, true) => StandardFont::HelveticaOblique,
            (FontClass::Sans, true, true) => StandardFont::HelveticaBoldOblique,
            (FontClass::Serif, false, false) => StandardFont::TimesRoman,
            (FontClass::Serif, true, false) => StandardFont::TimesBold,
            (FontClass::Serif, false, true) => StandardFont::TimesItalic,
            (FontClass::Serif, true, true) => StandardFont::TimesBoldItalic,
            (FontClass::Mono, false, false) => StandardFont::Courier,
            (FontClass::Mono, true, false) => StandardFont::CourierBold,
            (FontClass::Mono, false, true) => StandardFont::CourierOblique,
            (FontClass::Mono, true, true) => StandardFont::CourierBoldOblique,
        }
    }

    /// PostScript name used as `/BaseFont`
    pub fn base_font(&self) -> &'static str {
        match self {
            StandardFont::Helvetica => "Helvetica",
            StandardFont::HelveticaBold => "Helvetica-Bold",
            StandardFont::HelveticaOblique => "Helvetica-Oblique",
            StandardFont::HelveticaBoldOblique => "Helvetica-BoldOblique",
            StandardFont::TimesRoman => "Times-Roman",
            StandardFont::TimesBold => "Times-Bold",
            StandardFont::TimesItalic => "Times-Italic",
            StandardFont::TimesBoldItalic => "Times-BoldItalic",
            StandardFont::Courier => "Courier",
            StandardFont::CourierBold => "Courier-Bold",
            StandardFont::CourierOblique => "Courier-Oblique",
            StandardFont::CourierBoldOblique => "Courier-BoldOblique",
        }
    }

    /// Look up a face by its `/BaseFont` name (exact match)
    pub fn from_base_font(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.base_font() == name)
    }

    pub fn class(&self) -> FontClass {
        match self {
            StandardFont::Helvetica
            | StandardFont::HelveticaBold
            | StandardFont::HelveticaOblique
            | StandardFont::HelveticaBoldOblique => FontClass::Sans,
            StandardFont::TimesRoman
            | StandardFont::TimesBold
            | StandardFont::TimesItalic
            | StandardFont::TimesBoldItalic => FontClass::Serif,
            _ => FontClass::Mono,
        }
    }

    pub fn is_bold(&self) -> bool {
        matches!(
            self,
            StandardFont::HelveticaBold
                | StandardFont::HelveticaBoldOblique
                | StandardFont::TimesBold
                | StandardFont::TimesBoldItalic
                | StandardFont::CourierBold
                | StandardFont::CourierBoldOblique
        )
    }

    pub fn is_italic(&self) -> bool {
        matches!(
            self,
            StandardFont::HelveticaOblique
                | StandardFont::HelveticaBoldOblique
                | StandardFont::TimesItalic
                | StandardFont::TimesBoldItalic
                | StandardFont::CourierOblique
                | StandardFont::CourierBoldOblique
        )
    }

    /// Advance width of one character in 1/1000 em
    ///
    /// Courier is fixed pitch. Every other face is measured with the
    /// Helvetica table, which is exact for Helvetica and Helvetica-Oblique
    /// and an approximation for the rest.
    pub fn char_width(&self, c: char) -> u16 {
        if self.class() == FontClass::Mono {
            return 600;
        }
        let code = c as u32;
        if (32..=126).contains(&code) {
            HELVETICA_WIDTHS[(code - 32) as usize]
        } else {
            556
        }
    }

    /// Width of a string in points at the given size
    pub fn text_width(&self, text: &str, size: f64) -> f64 {
        let units: u32 = text.chars().map(|c| self.char_width(c) as u32).sum();
        units as f64 * size / 1000.0
    }

    /// Type1 font dictionary referencing this standard face
    pub fn to_pdf_dictionary(&self) -> Dictionary {
        dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => self.base_font(),
            "Encoding" => "WinAnsiEncoding",
        }
    }
}

/// The twelve faces (three families × four styles) used by a compile pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FontSet;

impl FontSet {
    /// Resolve the face for a CSS family string and style flags
    pub fn resolve(&self, css_family: &str, bold: bool, italic: bool) -> StandardFont {
        StandardFont::select(FontClass::classify(css_family), bold, italic)
    }

    /// Resolve a sans-serif face by style flags
    pub fn sans(&self, bold: bool, italic: bool) -> StandardFont {
        StandardFont::select(FontClass::Sans, bold, italic)
    }
}

/// Helvetica advance widths for ASCII 32..=126
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // '0'..'9'
    278, 278, 584, 584, 584, 556, 1015, // ':'..'@'
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, // 'A'..'M'
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // 'N'..'Z'
    278, 278, 278, 469, 556, 333, // '['..'`'
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, // 'a'..'m'
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // 'n'..'z'
    334, 260, 334, 584, // '{'..'~'
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_mono() {
        assert_eq!(FontClass::classify("Courier New"), FontClass::Mono);
        assert_eq!(FontClass::classify("monospace"), FontClass::Mono);
        assert_eq!(FontClass::classify("Consolas"), FontClass::Mono);
    }

    #[test]
    fn test_classify_serif() {
        assert_eq!(FontClass::classify("Times New Roman"), FontClass::Serif);
        assert_eq!(FontClass::classify("Georgia"), FontClass::Serif);
        assert_eq!(FontClass::classify("serif"), FontClass::Serif);
    }

    #[test]
    fn test_classify_sans() {
        assert_eq!(FontClass::classify("sans-serif"), FontClass::Sans);
        assert_eq!(FontClass::classify("Helvetica, sans-serif"), FontClass::Sans);
        assert_eq!(FontClass::classify("Arial"), FontClass::Sans);
        assert_eq!(FontClass::classify(""), FontClass::Sans);
    }

    #[test]
    fn test_select_covers_all_faces() {
        let mut faces = Vec::new();
        for class in [FontClass::Sans, FontClass::Serif, FontClass::Mono] {
            for bold in [false, true] {
                for italic in [false, true] {
                    let face = StandardFont::select(class, bold, italic);
                    assert_eq!(face.class(), class);
                    assert_eq!(face.is_bold(), bold);
                    assert_eq!(face.is_italic(), italic);
                    faces.push(face);
                }
            }
        }
        faces.sort();
        faces.dedup();
        assert_eq!(faces.len(), 12);
    }

    #[test]
    fn test_base_font_roundtrip() {
        for face in StandardFont::ALL {
            assert_eq!(StandardFont::from_base_font(face.base_font()), Some(face));
        }
        assert_eq!(StandardFont::from_base_font("ArialMT"), None);
    }

    #[test]
    fn test_helvetica_width() {
        // P a g e ' ' 1 ' ' / ' ' 2
        let width = StandardFont::Helvetica.text_width("Page 1 / 2", 10.0);
        assert!((width - 45.59).abs() < 1e-9);
    }

    #[test]
    fn test_courier_fixed_pitch() {
        assert_eq!(StandardFont::Courier.text_width("iiii", 10.0), 24.0);
        assert_eq!(StandardFont::CourierBold.text_width("WWWW", 10.0), 24.0);
    }

    #[test]
    fn test_font_set_resolve() {
        let set = FontSet;
        assert_eq!(set.resolve("Times", true, false), StandardFont::TimesBold);
        assert_eq!(set.resolve("mono", false, true), StandardFont::CourierOblique);
        assert_eq!(set.sans(true, true), StandardFont::HelveticaBoldOblique);
    }

    #[test]
    fn test_pdf_dictionary() {
        let dict = StandardFont::TimesItalic.to_pdf_dictionary();
        assert_eq!(dict.get(b"Subtype").unwrap().as_name().unwrap(), b"Type1");
        assert_eq!(dict.get(b"BaseFont").unwrap().as_name().unwrap(), b"Times-Italic");
    }
}
