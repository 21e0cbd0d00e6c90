//! Read-side page access: geometry, text runs and font metadata
//!
//! Text runs are produced by interpreting the page content stream with a
//! simplified text state machine. Each run carries its text rendering
//! matrix (font size folded in), so `hypot(t[0], t[1])` is the rendered
//! font size and `(t[4], t[5])` the baseline origin in page space.

use crate::document::{number, page_size_of, PageSize};
use crate::font::StandardFont;
use crate::text::decode_win_ansi;
use crate::{PdfError, Result};
use lopdf::content::Content;
use lopdf::{Dictionary, Document, Object, ObjectId};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::warn;

/// Read-only view over a parsed PDF
///
/// Cloning is cheap; pages share the parsed document.
#[derive(Clone)]
pub struct PdfReader {
    doc: Arc<Document>,
}

impl PdfReader {
    /// Parse a PDF from bytes
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let doc = Document::load_mem(data).map_err(|e| PdfError::OpenError(e.to_string()))?;
        if doc.get_pages().is_empty() {
            return Err(PdfError::OpenError("document has no pages".to_string()));
        }
        Ok(Self { doc: Arc::new(doc) })
    }

    /// Get the number of pages in the document
    pub fn page_count(&self) -> usize {
        self.doc.get_pages().len()
    }

    /// Get a page handle
    ///
    /// # Arguments
    /// * `page` - Page number (1-indexed)
    pub fn page(&self, page: usize) -> Result<PdfPage> {
        let pages = self.doc.get_pages();
        let page_id = *pages
            .get(&(page as u32))
            .ok_or(PdfError::InvalidPage(page, pages.len()))?;
        let size = page_size_of(&self.doc, page_id)?;
        Ok(PdfPage {
            doc: Arc::clone(&self.doc),
            page_id,
            number: page,
            size,
        })
    }
}

/// A single page of a [`PdfReader`]
#[derive(Clone)]
pub struct PdfPage {
    doc: Arc<Document>,
    page_id: ObjectId,
    number: usize,
    size: PageSize,
}

/// One run of text as it appears in the content stream
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    /// Decoded text
    pub text: String,
    /// Text rendering matrix `[a, b, c, d, e, f]` in page space
    pub transform: [f64; 6],
    /// Font resource name the run was shown with (e.g. "F1")
    pub font_id: String,
    /// Advance width in page space
    pub width: f64,
    /// Font height in page space
    pub height: f64,
}

/// Style information for one font resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontStyleInfo {
    /// CSS-level family name
    pub font_family: String,
}

/// Text content of a page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextContent {
    pub runs: Vec<TextRun>,
    /// Font resource name -> style information
    pub styles: HashMap<String, FontStyleInfo>,
}

/// Font metadata reported by the document for a font resource
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FontDescriptor {
    /// Descriptor says bold (ForceBold flag or FontWeight >= 600)
    pub bold: bool,
    /// Descriptor says italic (Italic flag or non-zero ItalicAngle)
    pub italic: bool,
    /// Internal font name (BaseFont, subset prefix included)
    pub name: String,
}

/// Page-to-display transform at a given scale
///
/// Display space has its origin at the top-left with y growing downward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub scale: f64,
    /// Display width (page width × scale)
    pub width: f64,
    /// Display height (page height × scale)
    pub height: f64,
}

impl Viewport {
    pub fn new(page: PageSize, scale: f64) -> Self {
        Self {
            scale,
            width: page.width * scale,
            height: page.height * scale,
        }
    }

    /// Convert a page-space point to display space
    pub fn convert_to_viewport_point(&self, x: f64, y: f64) -> (f64, f64) {
        (x * self.scale, self.height - y * self.scale)
    }
}

impl PdfPage {
    /// Page number (1-indexed)
    pub fn number(&self) -> usize {
        self.number
    }

    pub fn size(&self) -> PageSize {
        self.size
    }

    pub fn viewport(&self, scale: f64) -> Viewport {
        Viewport::new(self.size, scale)
    }

    /// Extract text runs and per-font style information
    pub fn text_content(&self) -> Result<TextContent> {
        let fonts = self.fonts()?;
        let raw = self.doc.get_page_content(self.page_id)?;
        let content = Content::decode(&raw)?;

        let mut interpreter = Interpreter::new(&fonts);
        for op in &content.operations {
            interpreter.apply(&op.operator, &op.operands);
        }

        let styles = fonts
            .iter()
            .map(|(key, font)| {
                (
                    key.clone(),
                    FontStyleInfo {
                        font_family: css_family(&font.base_font),
                    },
                )
            })
            .collect();

        Ok(TextContent {
            runs: interpreter.runs,
            styles,
        })
    }

    /// Look up descriptor flags for a font resource
    ///
    /// Returns `None` when the page has no font with that resource name.
    pub fn font_descriptor(&self, font_id: &str) -> Option<FontDescriptor> {
        let fonts = self.fonts().ok()?;
        fonts.get(font_id).map(|font| font.descriptor.clone())
    }

    /// Font resources of the page, keyed by resource name
    fn fonts(&self) -> Result<BTreeMap<String, PageFont>> {
        let mut fonts = BTreeMap::new();
        let Some(font_dict) = self.font_resources()? else {
            return Ok(fonts);
        };
        for (key, value) in font_dict.iter() {
            let dict = match resolve(&self.doc, value).and_then(|obj| obj.as_dict().ok()) {
                Some(dict) => dict,
                None => {
                    warn!(page = self.number, font = %String::from_utf8_lossy(key), "font resource is not a dictionary");
                    continue;
                }
            };
            fonts.insert(
                String::from_utf8_lossy(key).into_owned(),
                PageFont::from_dict(&self.doc, dict),
            );
        }
        Ok(fonts)
    }

    /// The page's `/Resources /Font` dictionary, following inheritance
    fn font_resources(&self) -> Result<Option<Dictionary>> {
        let mut current_id = self.page_id;
        for _ in 0..10 {
            let dict = self
                .doc
                .get_object(current_id)?
                .as_dict()
                .map_err(|_| PdfError::ParseError("Object is not a dictionary".to_string()))?;

            if let Some(resources) = dict
                .get(b"Resources")
                .ok()
                .and_then(|obj| resolve(&self.doc, obj))
                .and_then(|obj| obj.as_dict().ok())
            {
                return Ok(resources
                    .get(b"Font")
                    .ok()
                    .and_then(|obj| resolve(&self.doc, obj))
                    .and_then(|obj| obj.as_dict().ok())
                    .cloned());
            }

            match dict.get(b"Parent") {
                Ok(Object::Reference(parent_id)) => current_id = *parent_id,
                _ => break,
            }
        }
        Ok(None)
    }
}

fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Object> {
    match obj {
        Object::Reference(id) => doc.get_object(*id).ok(),
        other => Some(other),
    }
}

/// Strip a subset prefix (`ABCDEF+Name`) from a BaseFont name
fn strip_subset_prefix(name: &str) -> &str {
    match name.split_once('+') {
        Some((prefix, rest))
            if prefix.len() == 6 && prefix.chars().all(|c| c.is_ascii_uppercase()) =>
        {
            rest
        }
        _ => name,
    }
}

/// CSS family for a BaseFont name: the family part before any style suffix
fn css_family(base_font: &str) -> String {
    let name = strip_subset_prefix(base_font);
    let family = name
        .split([',', '-'])
        .next()
        .unwrap_or(name)
        .trim();
    if family.is_empty() {
        "sans-serif".to_string()
    } else {
        family.to_string()
    }
}

/// Metrics and metadata of one font resource
#[derive(Debug, Clone)]
struct PageFont {
    base_font: String,
    composite: bool,
    first_char: u32,
    widths: Vec<f64>,
    default_width: f64,
    standard: Option<StandardFont>,
    to_unicode: Option<HashMap<u32, String>>,
    descriptor: FontDescriptor,
}

impl PageFont {
    fn from_dict(doc: &Document, dict: &Dictionary) -> Self {
        let base_font = dict
            .get(b"BaseFont")
            .ok()
            .and_then(|obj| obj.as_name_str().ok())
            .unwrap_or("")
            .to_string();
        let composite = matches!(
            dict.get(b"Subtype").ok().and_then(|obj| obj.as_name().ok()),
            Some(b"Type0")
        );

        let first_char = dict
            .get(b"FirstChar")
            .ok()
            .and_then(|obj| obj.as_i64().ok())
            .unwrap_or(0)
            .max(0) as u32;
        let widths = dict
            .get(b"Widths")
            .ok()
            .and_then(|obj| resolve(doc, obj))
            .and_then(|obj| obj.as_array().ok())
            .map(|arr| arr.iter().map(|w| number(w).unwrap_or(0.0)).collect())
            .unwrap_or_default();

        let descriptor_dict = if composite {
            descendant_font(doc, dict).and_then(|d| font_descriptor_dict(doc, d))
        } else {
            font_descriptor_dict(doc, dict)
        };
        let default_width = if composite {
            descendant_font(doc, dict)
                .and_then(|d| d.get(b"DW").ok())
                .and_then(number)
                .unwrap_or(1000.0)
        } else {
            descriptor_dict
                .and_then(|d| d.get(b"MissingWidth").ok())
                .and_then(number)
                .filter(|w| *w > 0.0)
                .unwrap_or(500.0)
        };

        let to_unicode = dict
            .get(b"ToUnicode")
            .ok()
            .and_then(|obj| resolve(doc, obj))
            .and_then(|obj| obj.as_stream().ok())
            .and_then(|stream| stream.decompressed_content().ok())
            .map(|data| parse_to_unicode(&data));

        let descriptor = FontDescriptor {
            bold: descriptor_dict.map(descriptor_is_bold).unwrap_or(false),
            italic: descriptor_dict.map(descriptor_is_italic).unwrap_or(false),
            name: base_font.clone(),
        };

        Self {
            standard: StandardFont::from_base_font(strip_subset_prefix(&base_font)),
            base_font,
            composite,
            first_char,
            widths,
            default_width,
            to_unicode,
            descriptor,
        }
    }

    /// Split shown bytes into character codes
    fn codes(&self, bytes: &[u8]) -> Vec<u32> {
        if self.composite {
            bytes
                .chunks(2)
                .map(|pair| match pair {
                    [hi, lo] => ((*hi as u32) << 8) | *lo as u32,
                    [single] => *single as u32,
                    _ => 0,
                })
                .collect()
        } else {
            bytes.iter().map(|b| *b as u32).collect()
        }
    }

    fn decode(&self, code: u32) -> String {
        if let Some(text) = self.to_unicode.as_ref().and_then(|map| map.get(&code)) {
            return text.clone();
        }
        if self.composite {
            return String::new();
        }
        decode_win_ansi(&[code as u8])
    }

    /// Glyph width in 1/1000 text space units
    fn width(&self, code: u32) -> f64 {
        if !self.composite {
            if let Some(w) = code
                .checked_sub(self.first_char)
                .and_then(|i| self.widths.get(i as usize))
            {
                return *w;
            }
            if let Some(standard) = self.standard {
                let c = decode_win_ansi(&[code as u8]).chars().next().unwrap_or(' ');
                return standard.char_width(c) as f64;
            }
        }
        self.default_width
    }
}

fn descendant_font<'a>(doc: &'a Document, dict: &'a Dictionary) -> Option<&'a Dictionary> {
    dict.get(b"DescendantFonts")
        .ok()
        .and_then(|obj| resolve(doc, obj))
        .and_then(|obj| obj.as_array().ok())
        .and_then(|arr| arr.first())
        .and_then(|obj| resolve(doc, obj))
        .and_then(|obj| obj.as_dict().ok())
}

fn font_descriptor_dict<'a>(doc: &'a Document, dict: &'a Dictionary) -> Option<&'a Dictionary> {
    dict.get(b"FontDescriptor")
        .ok()
        .and_then(|obj| resolve(doc, obj))
        .and_then(|obj| obj.as_dict().ok())
}

const FLAG_ITALIC: i64 = 1 << 6;
const FLAG_FORCE_BOLD: i64 = 1 << 18;

fn descriptor_flags(dict: &Dictionary) -> i64 {
    dict.get(b"Flags")
        .ok()
        .and_then(|obj| obj.as_i64().ok())
        .unwrap_or(0)
}

fn descriptor_is_bold(dict: &Dictionary) -> bool {
    let weight = dict.get(b"FontWeight").ok().and_then(number).unwrap_or(0.0);
    descriptor_flags(dict) & FLAG_FORCE_BOLD != 0 || weight >= 600.0
}

fn descriptor_is_italic(dict: &Dictionary) -> bool {
    let angle = dict.get(b"ItalicAngle").ok().and_then(number).unwrap_or(0.0);
    descriptor_flags(dict) & FLAG_ITALIC != 0 || angle != 0.0
}

/// Parse the `bfchar`/`bfrange` sections of a ToUnicode CMap
fn parse_to_unicode(data: &[u8]) -> HashMap<u32, String> {
    let text = String::from_utf8_lossy(data);
    let mut map = HashMap::new();
    let mut section = "";
    let mut tokens: Vec<&str> = Vec::new();

    for token in cmap_tokens(&text) {
        match token {
            "beginbfchar" | "beginbfrange" => {
                section = token;
                tokens.clear();
            }
            "endbfchar" => {
                for pair in tokens.chunks(2) {
                    if let [src, dst] = pair {
                        if let (Some(code), Some(text)) = (hex_code(src), hex_utf16(dst)) {
                            map.insert(code, text);
                        }
                    }
                }
                section = "";
            }
            "endbfrange" => {
                for triple in tokens.chunks(3) {
                    if let [lo, hi, dst] = triple {
                        let (Some(lo), Some(hi)) = (hex_code(lo), hex_code(hi)) else {
                            continue;
                        };
                        insert_bfrange(&mut map, lo, hi, dst);
                    }
                }
                section = "";
            }
            _ if !section.is_empty() => tokens.push(token),
            _ => {}
        }
    }
    map
}

/// One `bfrange` entry: either an incrementing base or an array of
/// per-code destinations
fn insert_bfrange(map: &mut HashMap<u32, String>, lo: u32, hi: u32, dst: &str) {
    let codes = lo..=hi.min(lo.saturating_add(0xFFFF));
    if let Some(inner) = dst.strip_prefix('[').and_then(|d| d.strip_suffix(']')) {
        for (code, item) in codes.zip(cmap_tokens(inner)) {
            if let Some(text) = hex_utf16(item) {
                map.insert(code, text);
            }
        }
        return;
    }
    let Some(base) = hex_code(dst) else { return };
    for (offset, code) in codes.enumerate() {
        let Some(value) = base.checked_add(offset as u32) else {
            break;
        };
        if let Some(c) = char::from_u32(value) {
            map.insert(code, c.to_string());
        }
    }
}

/// Split CMap text into `<hex>` strings, whole `[...]` arrays and bare
/// words; `%` comments are dropped
fn cmap_tokens(text: &str) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        let start = i;
        match bytes[i] {
            b if b.is_ascii_whitespace() => {
                i += 1;
                continue;
            }
            b'%' => {
                while i < bytes.len() && bytes[i] != b'\n' && bytes[i] != b'\r' {
                    i += 1;
                }
                continue;
            }
            open @ (b'<' | b'[') => {
                let close = if open == b'<' { b'>' } else { b']' };
                match bytes[i..].iter().position(|&b| b == close) {
                    Some(len) => i += len + 1,
                    None => break,
                }
            }
            _ => {
                while i < bytes.len()
                    && !bytes[i].is_ascii_whitespace()
                    && !matches!(bytes[i], b'<' | b'[' | b'%')
                {
                    i += 1;
                }
            }
        }
        tokens.push(&text[start..i]);
    }
    tokens
}

fn hex_code(token: &str) -> Option<u32> {
    let hex = token.strip_prefix('<')?.strip_suffix('>')?;
    u32::from_str_radix(hex, 16).ok()
}

fn hex_utf16(token: &str) -> Option<String> {
    let hex = token.strip_prefix('<')?.strip_suffix('>')?;
    let units: Vec<u16> = hex
        .as_bytes()
        .chunks(4)
        .filter_map(|chunk| std::str::from_utf8(chunk).ok())
        .filter_map(|s| u16::from_str_radix(s, 16).ok())
        .collect();
    String::from_utf16(&units).ok()
}

const IDENTITY: [f64; 6] = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];

/// `a × b` for PDF row-vector matrices
fn multiply(a: &[f64; 6], b: &[f64; 6]) -> [f64; 6] {
    [
        a[0] * b[0] + a[1] * b[2],
        a[0] * b[1] + a[1] * b[3],
        a[2] * b[0] + a[3] * b[2],
        a[2] * b[1] + a[3] * b[3],
        a[4] * b[0] + a[5] * b[2] + b[4],
        a[4] * b[1] + a[5] * b[3] + b[5],
    ]
}

/// Kerning adjustment (thousandths of text space) treated as a word gap
const WORD_GAP_ADJUSTMENT: f64 = -200.0;

/// Text state machine over content stream operators
struct Interpreter<'a> {
    fonts: &'a BTreeMap<String, PageFont>,
    ctm: [f64; 6],
    ctm_stack: Vec<[f64; 6]>,
    text_matrix: [f64; 6],
    line_matrix: [f64; 6],
    font_id: String,
    font_size: f64,
    horiz_scale: f64,
    char_spacing: f64,
    word_spacing: f64,
    leading: f64,
    rise: f64,
    runs: Vec<TextRun>,
}

impl<'a> Interpreter<'a> {
    fn new(fonts: &'a BTreeMap<String, PageFont>) -> Self {
        Self {
            fonts,
            ctm: IDENTITY,
            ctm_stack: Vec::new(),
            text_matrix: IDENTITY,
            line_matrix: IDENTITY,
            font_id: String::new(),
            font_size: 0.0,
            horiz_scale: 1.0,
            char_spacing: 0.0,
            word_spacing: 0.0,
            leading: 0.0,
            rise: 0.0,
            runs: Vec::new(),
        }
    }

    fn apply(&mut self, operator: &str, operands: &[Object]) {
        let num = |i: usize| operands.get(i).and_then(number);
        match operator {
            "q" => self.ctm_stack.push(self.ctm),
            "Q" => {
                if let Some(ctm) = self.ctm_stack.pop() {
                    self.ctm = ctm;
                }
            }
            "cm" => {
                if let Some(m) = matrix(operands) {
                    self.ctm = multiply(&m, &self.ctm);
                }
            }
            "BT" => {
                self.text_matrix = IDENTITY;
                self.line_matrix = IDENTITY;
            }
            "Tf" => {
                if let (Some(Object::Name(name)), Some(size)) = (operands.first(), num(1)) {
                    self.font_id = String::from_utf8_lossy(name).into_owned();
                    self.font_size = size;
                }
            }
            "Tm" => {
                if let Some(m) = matrix(operands) {
                    self.text_matrix = m;
                    self.line_matrix = m;
                }
            }
            "Td" => {
                if let (Some(tx), Some(ty)) = (num(0), num(1)) {
                    self.translate_line(tx, ty);
                }
            }
            "TD" => {
                if let (Some(tx), Some(ty)) = (num(0), num(1)) {
                    self.leading = -ty;
                    self.translate_line(tx, ty);
                }
            }
            "T*" => self.translate_line(0.0, -self.leading),
            "TL" => self.leading = num(0).unwrap_or(self.leading),
            "Tc" => self.char_spacing = num(0).unwrap_or(self.char_spacing),
            "Tw" => self.word_spacing = num(0).unwrap_or(self.word_spacing),
            "Tz" => self.horiz_scale = num(0).map(|v| v / 100.0).unwrap_or(self.horiz_scale),
            "Ts" => self.rise = num(0).unwrap_or(self.rise),
            "Tj" => {
                if let Some(obj @ Object::String(..)) = operands.first() {
                    self.show(std::slice::from_ref(obj));
                }
            }
            "TJ" => {
                if let Some(Object::Array(items)) = operands.first() {
                    self.show(items);
                }
            }
            "'" => {
                self.translate_line(0.0, -self.leading);
                if let Some(obj @ Object::String(..)) = operands.first() {
                    self.show(std::slice::from_ref(obj));
                }
            }
            "\"" => {
                if let (Some(aw), Some(ac)) = (num(0), num(1)) {
                    self.word_spacing = aw;
                    self.char_spacing = ac;
                }
                self.translate_line(0.0, -self.leading);
                if let Some(obj @ Object::String(..)) = operands.get(2) {
                    self.show(std::slice::from_ref(obj));
                }
            }
            _ => {}
        }
    }

    fn translate_line(&mut self, tx: f64, ty: f64) {
        self.line_matrix = multiply(&[1.0, 0.0, 0.0, 1.0, tx, ty], &self.line_matrix);
        self.text_matrix = self.line_matrix;
    }

    /// Show strings (with optional kerning numbers) as a single run
    fn show(&mut self, items: &[Object]) {
        let fonts = self.fonts;
        let Some(font) = fonts.get(&self.font_id) else {
            return;
        };

        let user_matrix = multiply(&self.text_matrix, &self.ctm);
        let transform = multiply(
            &[
                self.font_size * self.horiz_scale,
                0.0,
                0.0,
                self.font_size,
                0.0,
                self.rise,
            ],
            &user_matrix,
        );

        let mut text = String::new();
        let mut advance = 0.0;
        for item in items {
            match item {
                Object::String(bytes, _) => {
                    for code in font.codes(bytes) {
                        let decoded = font.decode(code);
                        let glyph = font.width(code) / 1000.0 * self.font_size;
                        let word = if code == 32 && !font.composite {
                            self.word_spacing
                        } else {
                            0.0
                        };
                        advance += (glyph + self.char_spacing + word) * self.horiz_scale;
                        text.push_str(&decoded);
                    }
                }
                other => {
                    if let Some(adjust) = number(other) {
                        advance -= adjust / 1000.0 * self.font_size * self.horiz_scale;
                        if adjust < WORD_GAP_ADJUSTMENT && !text.ends_with(' ') {
                            text.push(' ');
                        }
                    }
                }
            }
        }

        self.text_matrix = multiply(&[1.0, 0.0, 0.0, 1.0, advance, 0.0], &self.text_matrix);

        if text.is_empty() {
            return;
        }
        let x_scale = user_matrix[0].hypot(user_matrix[1]);
        let y_scale = user_matrix[2].hypot(user_matrix[3]);
        self.runs.push(TextRun {
            text,
            transform,
            font_id: self.font_id.clone(),
            width: advance * x_scale,
            height: self.font_size * y_scale,
        });
    }
}

fn matrix(operands: &[Object]) -> Option<[f64; 6]> {
    if operands.len() < 6 {
        return None;
    }
    let mut m = [0.0; 6];
    for (slot, obj) in m.iter_mut().zip(operands) {
        *slot = number(obj)?;
    }
    Some(m)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_subset_prefix() {
        assert_eq!(strip_subset_prefix("ABCDEF+Arial-BoldMT"), "Arial-BoldMT");
        assert_eq!(strip_subset_prefix("Helvetica"), "Helvetica");
        assert_eq!(strip_subset_prefix("abc+Foo"), "abc+Foo");
    }

    #[test]
    fn test_css_family() {
        assert_eq!(css_family("ABCDEF+TimesNewRoman,Bold"), "TimesNewRoman");
        assert_eq!(css_family("Helvetica-Bold"), "Helvetica");
        assert_eq!(css_family(""), "sans-serif");
    }

    #[test]
    fn test_multiply_translation() {
        let scale = [2.0, 0.0, 0.0, 2.0, 0.0, 0.0];
        let translate = [1.0, 0.0, 0.0, 1.0, 10.0, 20.0];
        assert_eq!(
            multiply(&scale, &translate),
            [2.0, 0.0, 0.0, 2.0, 10.0, 20.0]
        );
        assert_eq!(
            multiply(&translate, &scale),
            [2.0, 0.0, 0.0, 2.0, 20.0, 40.0]
        );
    }

    #[test]
    fn test_viewport_point() {
        let viewport = Viewport::new(
            PageSize {
                width: 600.0,
                height: 800.0,
            },
            1.5,
        );
        assert_eq!(viewport.width, 900.0);
        assert_eq!(viewport.convert_to_viewport_point(100.0, 700.0), (150.0, 150.0));
    }

    #[test]
    fn test_parse_to_unicode() {
        let cmap = b"begincmap\n2 beginbfchar\n<0003> <0020>\n<0024><0041>\nendbfchar\n\
                     1 beginbfrange\n<0044> <0046> <0061>\nendbfrange\nendcmap";
        let map = parse_to_unicode(cmap);
        assert_eq!(map.get(&3).map(String::as_str), Some(" "));
        assert_eq!(map.get(&0x24).map(String::as_str), Some("A"));
        assert_eq!(map.get(&0x45).map(String::as_str), Some("b"));
        assert_eq!(map.len(), 5);
    }

    #[test]
    fn test_parse_to_unicode_array_destination() {
        let cmap = b"2 beginbfrange\n<0010> <0011> [<0066006C> <00660069>]\n\
                     <0020> <0021> <0041>\nendbfrange";
        let map = parse_to_unicode(cmap);
        assert_eq!(map.get(&0x10).map(String::as_str), Some("fl"));
        assert_eq!(map.get(&0x11).map(String::as_str), Some("fi"));
        assert_eq!(map.get(&0x20).map(String::as_str), Some("A"));
        assert_eq!(map.get(&0x21).map(String::as_str), Some("B"));
        assert_eq!(map.len(), 4);
    }

    #[test]
    fn test_parse_to_unicode_range_at_code_limit() {
        let cmap = b"1 beginbfrange\n<FFFFFFFE> <FFFFFFFF> <0041>\nendbfrange";
        let map = parse_to_unicode(cmap);
        assert_eq!(map.get(&0xFFFF_FFFE).map(String::as_str), Some("A"));
        assert_eq!(map.get(&0xFFFF_FFFF).map(String::as_str), Some("B"));
    }

    #[test]
    fn test_cmap_tokens() {
        assert_eq!(
            cmap_tokens("<0001><0041> [<01> <02>] % note\nendbfchar"),
            vec!["<0001>", "<0041>", "[<01> <02>]", "endbfchar"]
        );
    }

    #[test]
    fn test_descriptor_flags() {
        let mut dict = Dictionary::new();
        dict.set("Flags", 1i64 << 18);
        assert!(descriptor_is_bold(&dict));
        assert!(!descriptor_is_italic(&dict));

        let mut dict = Dictionary::new();
        dict.set("Flags", 32i64 + 64);
        dict.set("ItalicAngle", 0i64);
        assert!(descriptor_is_italic(&dict));

        let mut dict = Dictionary::new();
        dict.set("FontWeight", 700i64);
        assert!(descriptor_is_bold(&dict));
    }
}
