//! PDF Document wrapper

use crate::font::{FontSet, StandardFont};
use crate::image::{generate_image_operators, ImageXObject};
use crate::text::{
    encode_win_ansi, generate_rect_operators, generate_text_operators, pdf_literal,
    TextRenderContext,
};
use crate::{Align, PdfError, Result};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// RGB Color (values 0.0 - 1.0)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    /// Create a new RGB color (values 0.0 - 1.0)
    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Create color from RGB values (0-255)
    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
        }
    }

    /// Parse `#rrggbb` (leading `#` optional, case-insensitive)
    ///
    /// Anything else yields black.
    pub fn from_hex(hex: &str) -> Self {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Self::black();
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).unwrap_or(0);
        Self::from_rgb(channel(0), channel(2), channel(4))
    }

    /// Gray level (0.0 black - 1.0 white)
    pub fn gray(level: f32) -> Self {
        Self::rgb(level, level, level)
    }

    /// Black color
    pub fn black() -> Self {
        Self::rgb(0.0, 0.0, 0.0)
    }

    /// White color
    pub fn white() -> Self {
        Self::rgb(1.0, 1.0, 1.0)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::black()
    }
}

/// Page size in points, taken from the page's MediaBox
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width: f64,
    pub height: f64,
}

/// PDF Document wrapper providing high-level drawing operations
///
/// Drawing calls buffer content operators per page; fonts and images are
/// attached to page resources and the buffers are flushed to the content
/// streams in [`PdfDocument::to_bytes`].
pub struct PdfDocument {
    /// The underlying lopdf document
    inner: Document,
    /// Current font face
    current_font: StandardFont,
    /// Current font size
    current_font_size: f64,
    /// Current text color
    current_text_color: Color,
    /// Embedded standard fonts (face -> PDF object ID)
    embedded_fonts: HashMap<StandardFont, ObjectId>,
    /// Page font resources (page number -> resource name -> object ID)
    page_font_resources: HashMap<usize, BTreeMap<String, ObjectId>>,
    /// Next font resource number
    next_font_resource: u32,
    /// Page image resources (page number -> resource name -> object ID)
    page_image_resources: HashMap<usize, BTreeMap<String, ObjectId>>,
    /// Next image resource number
    next_image_resource: u32,
    /// Buffered content operators per page (page number -> operators)
    page_content_buffer: HashMap<usize, Vec<u8>>,
}

impl PdfDocument {
    /// Open a PDF document from bytes
    ///
    /// # Arguments
    /// * `data` - PDF file bytes
    pub fn open_from_bytes(data: &[u8]) -> Result<Self> {
        let inner = Document::load_mem(data).map_err(|e| PdfError::OpenError(e.to_string()))?;

        Ok(Self {
            inner,
            current_font: StandardFont::Helvetica,
            current_font_size: 12.0,
            current_text_color: Color::default(),
            embedded_fonts: HashMap::new(),
            page_font_resources: HashMap::new(),
            next_font_resource: 1,
            page_image_resources: HashMap::new(),
            next_image_resource: 1,
            page_content_buffer: HashMap::new(),
        })
    }

    /// Get the number of pages in the document
    pub fn page_count(&self) -> usize {
        self.inner.get_pages().len()
    }

    /// Get the size of a page in points
    ///
    /// # Arguments
    /// * `page` - Page number (1-indexed)
    pub fn page_size(&self, page: usize) -> Result<PageSize> {
        let page_id = self.page_id(page)?;
        page_size_of(&self.inner, page_id)
    }

    /// Embed a standard font, returning its font dictionary ID
    ///
    /// Embedding the same face twice returns the existing object.
    pub fn embed_standard_font(&mut self, font: StandardFont) -> ObjectId {
        if let Some(id) = self.embedded_fonts.get(&font) {
            return *id;
        }
        let id = self.inner.add_object(font.to_pdf_dictionary());
        self.embedded_fonts.insert(font, id);
        id
    }

    /// Embed all twelve faces used for redrawing text
    pub fn embed_font_set(&mut self) -> FontSet {
        for font in StandardFont::ALL {
            self.embed_standard_font(font);
        }
        FontSet
    }

    /// Set the current font face and size
    pub fn set_font(&mut self, font: StandardFont, size: f64) {
        self.current_font = font;
        self.current_font_size = size;
    }

    /// Set the text color
    pub fn set_text_color(&mut self, color: Color) {
        self.current_text_color = color;
    }

    /// Width of `text` in the current font and size
    pub fn get_text_width(&self, text: &str) -> f64 {
        self.current_font.text_width(text, self.current_font_size)
    }

    /// Insert text at a specific position
    ///
    /// # Arguments
    /// * `text` - Text to insert (drawn on a single line)
    /// * `page` - Page number (1-indexed)
    /// * `x` - X coordinate in points
    /// * `y` - Baseline Y coordinate in points, PDF space (from bottom)
    /// * `align` - Text alignment relative to `x`
    pub fn insert_text(
        &mut self,
        text: &str,
        page: usize,
        x: f64,
        y: f64,
        align: Align,
    ) -> Result<()> {
        let page_count = self.page_count();
        if page == 0 || page > page_count {
            return Err(PdfError::InvalidPage(page, page_count));
        }

        // Skip empty text - nothing to render
        if text.is_empty() {
            return Ok(());
        }

        let encoded = encode_win_ansi(text)?;
        let font = self.current_font;
        let font_resource_name = self.get_or_create_font_ref(font, page);

        let ctx = TextRenderContext {
            font_name: font_resource_name,
            font_size: self.current_font_size,
            text_width: self.get_text_width(text),
            color: self.current_text_color,
        };

        let literal = pdf_literal(&encoded);
        let operators = generate_text_operators(&literal, x, y, align, &ctx);
        self.buffer_content(page, &operators);

        Ok(())
    }

    /// Fill a rectangle with a solid color
    ///
    /// # Arguments
    /// * `page` - Page number (1-indexed)
    /// * `x`, `y` - Lower-left corner in points, PDF space
    /// * `width`, `height` - Size in points
    pub fn fill_rect(
        &mut self,
        page: usize,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        color: Color,
    ) -> Result<()> {
        let page_count = self.page_count();
        if page == 0 || page > page_count {
            return Err(PdfError::InvalidPage(page, page_count));
        }

        let operators = generate_rect_operators(x, y, width, height, color);
        self.buffer_content(page, &operators);
        Ok(())
    }

    /// Insert an image at a specific position
    ///
    /// # Arguments
    /// * `data` - Image file bytes (PNG or JPEG)
    /// * `page` - Page number (1-indexed)
    /// * `x`, `y` - Lower-left corner in points, PDF space
    /// * `width`, `height` - Size in points
    pub fn insert_image(
        &mut self,
        data: &[u8],
        page: usize,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    ) -> Result<()> {
        let page_count = self.page_count();
        if page == 0 || page > page_count {
            return Err(PdfError::InvalidPage(page, page_count));
        }

        let xobject = ImageXObject::from_bytes(data)?;
        let smask_id = xobject
            .smask_stream()
            .map(|stream| self.inner.add_object(stream));
        let image_id = self.inner.add_object(xobject.to_pdf_stream(smask_id));

        let resource_name = format!("InkIm{}", self.next_image_resource);
        self.next_image_resource += 1;
        self.page_image_resources
            .entry(page)
            .or_default()
            .insert(resource_name.clone(), image_id);

        let operators = generate_image_operators(&resource_name, x, y, width, height);
        self.buffer_content(page, &operators);

        Ok(())
    }

    /// Save the document to bytes
    pub fn to_bytes(&mut self) -> Result<Vec<u8>> {
        debug!(
            pages = self.page_content_buffer.len(),
            fonts = self.embedded_fonts.len(),
            "flushing buffered page content"
        );
        self.flush_resources()?;
        self.flush_content_buffers()?;

        let mut buffer = Vec::new();
        self.inner
            .save_to(&mut buffer)
            .map_err(|e| PdfError::SaveError(e.to_string()))?;

        Ok(buffer)
    }

    /// Get or create a font resource name for a specific page
    fn get_or_create_font_ref(&mut self, font: StandardFont, page: usize) -> String {
        let font_id = self.embed_standard_font(font);
        let page_resources = self.page_font_resources.entry(page).or_default();

        if let Some((name, _)) = page_resources.iter().find(|(_, id)| **id == font_id) {
            return name.clone();
        }

        let resource_name = format!("InkF{}", self.next_font_resource);
        self.next_font_resource += 1;
        page_resources.insert(resource_name.clone(), font_id);
        resource_name
    }

    fn page_id(&self, page: usize) -> Result<ObjectId> {
        let pages = self.inner.get_pages();
        pages
            .get(&(page as u32))
            .copied()
            .ok_or(PdfError::InvalidPage(page, pages.len()))
    }

    /// Write the collected font and image references into page resources
    fn flush_resources(&mut self) -> Result<()> {
        let fonts: Vec<(usize, BTreeMap<String, ObjectId>)> =
            self.page_font_resources.drain().collect();
        for (page, entries) in fonts {
            self.add_page_resources(page, b"Font", &entries)?;
        }

        let images: Vec<(usize, BTreeMap<String, ObjectId>)> =
            self.page_image_resources.drain().collect();
        for (page, entries) in images {
            self.add_page_resources(page, b"XObject", &entries)?;
        }

        Ok(())
    }

    /// Add named references to a category (`Font`, `XObject`) of a page's Resources
    ///
    /// Indirect and inherited Resources dictionaries are resolved and copied
    /// onto the page so that other pages sharing them are left untouched.
    fn add_page_resources(
        &mut self,
        page: usize,
        category: &[u8],
        entries: &BTreeMap<String, ObjectId>,
    ) -> Result<()> {
        if entries.is_empty() {
            return Ok(());
        }
        let page_id = self.page_id(page)?;

        let mut resources = self.resolved_resources(page_id)?;
        let mut category_dict = match resources.get(category) {
            Ok(Object::Dictionary(dict)) => dict.clone(),
            Ok(Object::Reference(id)) => self
                .inner
                .get_object(*id)
                .and_then(|obj| obj.as_dict())
                .cloned()
                .unwrap_or_default(),
            _ => Dictionary::new(),
        };
        for (name, id) in entries {
            category_dict.set(name.as_bytes(), Object::Reference(*id));
        }
        resources.set(category, Object::Dictionary(category_dict));

        let mut page_dict = self.page_dict(page_id)?;
        page_dict.set(b"Resources", Object::Dictionary(resources));
        self.inner.objects.insert(page_id, page_dict.into());

        Ok(())
    }

    /// The Resources dictionary that applies to a page, following references
    /// and the parent chain
    fn resolved_resources(&self, page_id: ObjectId) -> Result<Dictionary> {
        let mut current_id = page_id;
        // Follow parent chain up to 10 levels (safety limit)
        for _ in 0..10 {
            let dict = self
                .inner
                .get_object(current_id)?
                .as_dict()
                .map_err(|_| PdfError::ParseError("Object is not a dictionary".to_string()))?;

            match dict.get(b"Resources") {
                Ok(Object::Dictionary(resources)) => return Ok(resources.clone()),
                Ok(Object::Reference(id)) => {
                    let resources = self
                        .inner
                        .get_object(*id)?
                        .as_dict()
                        .map_err(|_| {
                            PdfError::ParseError("Resources is not a dictionary".to_string())
                        })?;
                    return Ok(resources.clone());
                }
                _ => {}
            }

            match dict.get(b"Parent") {
                Ok(Object::Reference(parent_id)) => current_id = *parent_id,
                _ => break,
            }
        }
        Ok(Dictionary::new())
    }

    fn page_dict(&self, page_id: ObjectId) -> Result<Dictionary> {
        self.inner
            .get_object(page_id)?
            .as_dict()
            .cloned()
            .map_err(|_| PdfError::ParseError("Page object is not a dictionary".to_string()))
    }

    /// Buffer content operators for a page (written at save time)
    fn buffer_content(&mut self, page: usize, content: &[u8]) {
        self.page_content_buffer
            .entry(page)
            .or_default()
            .extend_from_slice(content);
    }

    /// Flush all buffered content to page streams
    fn flush_content_buffers(&mut self) -> Result<()> {
        let buffers: Vec<(usize, Vec<u8>)> = self.page_content_buffer.drain().collect();

        for (page, content) in buffers {
            if !content.is_empty() {
                self.append_to_content_stream(page, &content)?;
            }
        }

        Ok(())
    }

    /// Append content to a page's content stream
    ///
    /// The existing content is wrapped in `q`/`Q` so any graphics state it
    /// leaves behind does not leak into the appended operators.
    fn append_to_content_stream(&mut self, page: usize, content: &[u8]) -> Result<()> {
        let page_id = self.page_id(page)?;
        let mut page_dict = self.page_dict(page_id)?;

        let existing_content = match page_dict.get(b"Contents") {
            Ok(Object::Stream(stream)) => stream_bytes(stream),
            Ok(Object::Reference(ref_id)) => match self.inner.get_object(*ref_id) {
                Ok(Object::Stream(stream)) => stream_bytes(stream),
                Ok(Object::Array(arr)) => self.concat_streams(arr),
                _ => Vec::new(),
            },
            Ok(Object::Array(arr)) => self.concat_streams(arr),
            _ => Vec::new(),
        };

        let mut new_content = Vec::with_capacity(existing_content.len() + content.len() + 8);
        if !existing_content.is_empty() {
            new_content.extend_from_slice(b"q\n");
            new_content.extend_from_slice(&existing_content);
            new_content.extend_from_slice(b"\nQ\n");
        }
        new_content.extend_from_slice(content);

        let stream_id = self
            .inner
            .add_object(Stream::new(Dictionary::new(), new_content));
        page_dict.set(b"Contents", Object::Reference(stream_id));
        self.inner.objects.insert(page_id, page_dict.into());

        Ok(())
    }

    fn concat_streams(&self, arr: &[Object]) -> Vec<u8> {
        let mut combined = Vec::new();
        for obj in arr {
            let stream = match obj {
                Object::Reference(ref_id) => match self.inner.get_object(*ref_id) {
                    Ok(Object::Stream(stream)) => stream,
                    _ => continue,
                },
                Object::Stream(stream) => stream,
                _ => continue,
            };
            combined.extend_from_slice(&stream_bytes(stream));
            combined.push(b'\n');
        }
        combined
    }
}

fn stream_bytes(stream: &Stream) -> Vec<u8> {
    stream
        .decompressed_content()
        .unwrap_or_else(|_| stream.content.clone())
}

/// Page size from the MediaBox (or CropBox), following parent inheritance
///
/// Falls back to A4 when no box is found.
pub(crate) fn page_size_of(doc: &Document, page_id: ObjectId) -> Result<PageSize> {
    let mut current_id = page_id;

    for _ in 0..10 {
        let dict = doc
            .get_object(current_id)?
            .as_dict()
            .map_err(|_| PdfError::ParseError("Object is not a dictionary".to_string()))?;

        if let Ok(media_box) = dict.get(b"MediaBox").or_else(|_| dict.get(b"CropBox")) {
            let values = match media_box {
                Object::Array(arr) => arr.clone(),
                Object::Reference(ref_id) => doc
                    .get_object(*ref_id)?
                    .as_array()
                    .map_err(|_| {
                        PdfError::ParseError("MediaBox reference is not an array".to_string())
                    })?
                    .clone(),
                _ => return Err(PdfError::ParseError("MediaBox is not an array".to_string())),
            };
            return size_from_box(&values);
        }

        match dict.get(b"Parent") {
            Ok(Object::Reference(parent_id)) => current_id = *parent_id,
            _ => break,
        }
    }

    Ok(PageSize {
        width: 595.28,
        height: 841.89,
    })
}

fn size_from_box(values: &[Object]) -> Result<PageSize> {
    if values.len() < 4 {
        return Err(PdfError::ParseError("Invalid MediaBox format".to_string()));
    }
    let coord = |i: usize| {
        number(&values[i]).ok_or_else(|| PdfError::ParseError(format!("Invalid MediaBox entry {i}")))
    };
    let (x1, y1, x2, y2) = (coord(0)?, coord(1)?, coord(2)?, coord(3)?);
    Ok(PageSize {
        width: (x2 - x1).abs(),
        height: (y2 - y1).abs(),
    })
}

/// Numeric value of an Integer or Real object
pub(crate) fn number(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(*r as f64),
        _ => None,
    }
}
