//! Text extraction: baseline [`ExtractedText`] records for a page
//!
//! Extraction never fails. Missing descriptors, slow lookups and failed
//! color samples degrade to defaults (regular weight, upright, black).

use crate::config::{ColorSampling, EditorConfig};
use crate::model::{new_id, ExtractedText};
use crate::render::CancellationToken;
use crate::source::PageSource;
use crate::store::{Action, Store};
use image::RgbaImage;
use pdf_core::{FontDescriptor, TextRun};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, warn};

/// Family used when the page reports no style for a font
pub const DEFAULT_CSS_FAMILY: &str = "sans-serif";

const BLACK: &str = "#000000";

/// Guard allowing one extraction per page instance
///
/// The first `try_begin` wins; later calls fail whether the first
/// extraction is still running or has finished.
#[derive(Debug, Default)]
pub struct ExtractionLatch {
    started: AtomicBool,
}

impl ExtractionLatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn try_begin(&self) -> bool {
        !self.started.swap(true, Ordering::AcqRel)
    }

    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::Acquire)
    }
}

/// Resolved bold/italic flags for one font
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FontFlags {
    pub bold: bool,
    pub italic: bool,
}

impl FontFlags {
    /// Descriptor flags, completed by name tokens
    pub fn resolve(descriptor: &FontDescriptor) -> Self {
        let name = descriptor.name.to_lowercase();
        Self {
            bold: descriptor.bold
                || ["bold", "black", "heavy"]
                    .iter()
                    .any(|token| name.contains(token)),
            italic: descriptor.italic || name.contains("italic") || name.contains("oblique"),
        }
    }
}

/// Produces baseline text records from a [`PageSource`]
#[derive(Debug, Clone, Default)]
pub struct TextExtractor {
    config: EditorConfig,
}

impl TextExtractor {
    pub fn new(config: EditorConfig) -> Self {
        Self { config }
    }

    /// Extract the page's text runs
    pub async fn extract<P: PageSource + ?Sized>(&self, page: &P) -> Vec<ExtractedText> {
        let page_index = page.page_index();
        let content = match page.text_content() {
            Ok(content) => content,
            Err(err) => {
                warn!(page = page_index, error = %err, "could not read page text");
                return Vec::new();
            }
        };

        let raster = match self.config.color_sampling {
            ColorSampling::Fixed => None,
            ColorSampling::Raster => {
                let raster = page
                    .render(self.config.sample_scale, &CancellationToken::new())
                    .await;
                if raster.is_none() {
                    debug!(page = page_index, "no raster for color sampling");
                }
                raster
            }
        };
        let sampler = raster.as_ref().map(|image| ColorSampler {
            image,
            scale: self.config.sample_scale,
            offset: self.config.sample_offset,
            near_white: self.config.near_white_threshold,
            page_height: page.size().height,
        });

        let mut flags_by_font: HashMap<String, FontFlags> = HashMap::new();
        let mut texts = Vec::new();
        for run in content.runs.iter().filter(|run| !run.text.trim().is_empty()) {
            let flags = match flags_by_font.get(&run.font_id) {
                Some(flags) => *flags,
                None => {
                    let flags = self.font_flags(page, &run.font_id).await;
                    flags_by_font.insert(run.font_id.clone(), flags);
                    flags
                }
            };

            let css_font_family = content
                .styles
                .get(&run.font_id)
                .map(|style| style.font_family.clone())
                .unwrap_or_else(|| DEFAULT_CSS_FAMILY.to_string());

            let font_size = run.transform[0].hypot(run.transform[1]);
            let color = sampler
                .as_ref()
                .and_then(|sampler| sampler.sample(run, font_size))
                .unwrap_or_else(|| BLACK.to_string());

            texts.push(ExtractedText {
                id: new_id(),
                page_index,
                original_str: run.text.clone(),
                edited_str: None,
                pdf_x: run.transform[4],
                pdf_y: run.transform[5],
                pdf_font_size: font_size,
                pdf_width: run.width,
                pdf_height: run.height,
                font_name: run.font_id.clone(),
                css_font_family,
                is_bold: flags.bold,
                is_italic: flags.italic,
                color,
                transform: run.transform,
                style_edits: None,
            });
        }

        debug!(page = page_index, runs = texts.len(), "extracted text");
        texts
    }

    /// Extract once per latch and append the result to the store
    ///
    /// Returns the number of records appended; zero when the latch was
    /// already taken or the page has no text.
    pub async fn extract_into<P: PageSource + ?Sized>(
        &self,
        page: &P,
        latch: &ExtractionLatch,
        store: &mut Store,
    ) -> usize {
        if !latch.try_begin() {
            debug!(page = page.page_index(), "extraction already started");
            return 0;
        }
        let texts = self.extract(page).await;
        let count = texts.len();
        if count > 0 {
            store.dispatch(Action::AppendExtractedTexts { texts });
        }
        count
    }

    /// Bold/italic for a font id, bounded by the lookup timeout
    async fn font_flags<P: PageSource + ?Sized>(&self, page: &P, font_id: &str) -> FontFlags {
        let timeout = self.config.font_lookup_timeout();
        match tokio::time::timeout(timeout, page.font_descriptor(font_id)).await {
            Ok(Some(descriptor)) => FontFlags::resolve(&descriptor),
            Ok(None) => {
                debug!(page = page.page_index(), font = font_id, "no font descriptor");
                FontFlags::default()
            }
            Err(_) => {
                warn!(
                    page = page.page_index(),
                    font = font_id,
                    timeout_ms = timeout.as_millis() as u64,
                    "font descriptor lookup timed out"
                );
                FontFlags::default()
            }
        }
    }
}

/// Picks a run's fill color from a page raster
struct ColorSampler<'a> {
    image: &'a RgbaImage,
    scale: f64,
    offset: f64,
    near_white: u8,
    page_height: f64,
}

/// Half-size of the square neighborhood scanned around the probe point
const SAMPLE_RADIUS: i64 = 2;

impl ColorSampler<'_> {
    /// First opaque, non-near-white pixel around a point above the baseline
    fn sample(&self, run: &TextRun, font_size: f64) -> Option<String> {
        let x = run.transform[4] * self.scale;
        let y = (self.page_height - run.transform[5]) * self.scale
            - self.offset * font_size * self.scale;
        let (cx, cy) = (x.round() as i64, y.round() as i64);

        for dy in -SAMPLE_RADIUS..=SAMPLE_RADIUS {
            for dx in -SAMPLE_RADIUS..=SAMPLE_RADIUS {
                let (px, py) = (cx + dx, cy + dy);
                if px < 0
                    || py < 0
                    || px >= self.image.width() as i64
                    || py >= self.image.height() as i64
                {
                    continue;
                }
                let [r, g, b, a] = self.image.get_pixel(px as u32, py as u32).0;
                if a == 0 {
                    continue;
                }
                if r >= self.near_white && g >= self.near_white && b >= self.near_white {
                    continue;
                }
                return Some(format!("#{r:02x}{g:02x}{b:02x}"));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use image::Rgba;
    use pdf_core::{FontStyleInfo, PageSize, TextContent};
    use pretty_assertions::assert_eq;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    struct FakePage {
        runs: Vec<TextRun>,
        descriptors: HashMap<String, FontDescriptor>,
        descriptor_delay: Option<Duration>,
        raster: Option<RgbaImage>,
        content_reads: AtomicUsize,
    }

    impl FakePage {
        fn new(runs: Vec<TextRun>) -> Self {
            Self {
                runs,
                descriptors: HashMap::new(),
                descriptor_delay: None,
                raster: None,
                content_reads: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl PageSource for FakePage {
        fn page_index(&self) -> usize {
            1
        }

        fn size(&self) -> PageSize {
            PageSize {
                width: 100.0,
                height: 100.0,
            }
        }

        fn text_content(&self) -> pdf_core::Result<TextContent> {
            self.content_reads.fetch_add(1, Ordering::SeqCst);
            let mut styles = HashMap::new();
            styles.insert(
                "F1".to_string(),
                FontStyleInfo {
                    font_family: "Georgia".to_string(),
                },
            );
            Ok(TextContent {
                runs: self.runs.clone(),
                styles,
            })
        }

        async fn font_descriptor(&self, font_id: &str) -> Option<FontDescriptor> {
            if let Some(delay) = self.descriptor_delay {
                tokio::time::sleep(delay).await;
            }
            self.descriptors.get(font_id).cloned()
        }

        async fn render(&self, _scale: f64, _token: &CancellationToken) -> Option<RgbaImage> {
            self.raster.clone()
        }
    }

    fn run(text: &str, font_id: &str, transform: [f64; 6]) -> TextRun {
        TextRun {
            text: text.to_string(),
            transform,
            font_id: font_id.to_string(),
            width: 40.0,
            height: 12.0,
        }
    }

    #[test]
    fn test_font_flags_resolve() {
        let by_flag = FontDescriptor {
            bold: true,
            italic: false,
            name: "Foo".to_string(),
        };
        assert_eq!(
            FontFlags::resolve(&by_flag),
            FontFlags {
                bold: true,
                italic: false
            }
        );

        let by_name = FontDescriptor {
            bold: false,
            italic: false,
            name: "ABCDEF+Roboto-BlackOblique".to_string(),
        };
        assert_eq!(
            FontFlags::resolve(&by_name),
            FontFlags {
                bold: true,
                italic: true
            }
        );
    }

    #[tokio::test]
    async fn test_extract_fields() {
        let mut page = FakePage::new(vec![
            run("Hello", "F1", [3.0, 4.0, -4.0, 3.0, 20.0, 80.0]),
            run("   ", "F1", [12.0, 0.0, 0.0, 12.0, 0.0, 0.0]),
            run("World", "F2", [10.0, 0.0, 0.0, 10.0, 20.0, 60.0]),
        ]);
        page.descriptors.insert(
            "F1".to_string(),
            FontDescriptor {
                bold: false,
                italic: false,
                name: "Georgia-Bold".to_string(),
            },
        );

        let texts = TextExtractor::default().extract(&page).await;
        assert_eq!(texts.len(), 2);

        let hello = &texts[0];
        assert_eq!(hello.page_index, 1);
        assert_eq!(hello.original_str, "Hello");
        assert_eq!(hello.pdf_font_size, 5.0);
        assert_eq!((hello.pdf_x, hello.pdf_y), (20.0, 80.0));
        assert_eq!(hello.css_font_family, "Georgia");
        assert!(hello.is_bold);
        assert!(!hello.is_italic);
        assert_eq!(hello.color, "#000000");
        assert_eq!(hello.transform, [3.0, 4.0, -4.0, 3.0, 20.0, 80.0]);
        assert_eq!(hello.edited_str, None);

        let world = &texts[1];
        assert_eq!(world.css_font_family, DEFAULT_CSS_FAMILY);
        assert!(!world.is_bold);
        assert_ne!(world.id, hello.id);
    }

    #[tokio::test]
    async fn test_descriptor_timeout_falls_back() {
        let mut page = FakePage::new(vec![run("Slow", "F1", [12.0, 0.0, 0.0, 12.0, 0.0, 0.0])]);
        page.descriptors.insert(
            "F1".to_string(),
            FontDescriptor {
                bold: true,
                italic: true,
                name: "Slow-BoldItalic".to_string(),
            },
        );
        page.descriptor_delay = Some(Duration::from_secs(5));

        let config = EditorConfig {
            font_lookup_timeout_ms: 20,
            ..EditorConfig::default()
        };
        let texts = TextExtractor::new(config).extract(&page).await;
        assert_eq!(texts.len(), 1);
        assert!(!texts[0].is_bold);
        assert!(!texts[0].is_italic);
    }

    #[tokio::test]
    async fn test_extraction_runs_once_per_latch() {
        let page = FakePage::new(vec![run("Once", "F1", [12.0, 0.0, 0.0, 12.0, 10.0, 10.0])]);
        let latch = ExtractionLatch::new();
        let mut store = Store::new();
        let extractor = TextExtractor::default();

        assert_eq!(extractor.extract_into(&page, &latch, &mut store).await, 1);
        assert_eq!(extractor.extract_into(&page, &latch, &mut store).await, 0);

        assert_eq!(store.state().extracted_texts.len(), 1);
        assert_eq!(page.content_reads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_empty_page_does_not_touch_store() {
        let page = FakePage::new(vec![run(" ", "F1", [12.0, 0.0, 0.0, 12.0, 0.0, 0.0])]);
        let mut store = Store::new();
        let before = store.snapshot();

        let appended = TextExtractor::default()
            .extract_into(&page, &ExtractionLatch::new(), &mut store)
            .await;
        assert_eq!(appended, 0);
        assert!(std::sync::Arc::ptr_eq(&before, &store.snapshot()));
    }

    #[tokio::test]
    async fn test_raster_color_sampling_skips_near_white() {
        // 100x100 page at scale 2 -> 200x200 raster, white background
        let mut raster = RgbaImage::from_pixel(200, 200, Rgba([255, 255, 255, 255]));
        // Run at (50, 50) size 10: probe at (100, 100 - 13) = (100, 87)
        raster.put_pixel(101, 88, Rgba([200, 16, 32, 255]));
        raster.put_pixel(99, 86, Rgba([250, 250, 250, 255]));

        let mut page = FakePage::new(vec![
            run("Red", "F1", [10.0, 0.0, 0.0, 10.0, 50.0, 50.0]),
            run("Blank", "F1", [10.0, 0.0, 0.0, 10.0, 10.0, 90.0]),
        ]);
        page.raster = Some(raster);

        let config = EditorConfig {
            color_sampling: ColorSampling::Raster,
            ..EditorConfig::default()
        };
        let texts = TextExtractor::new(config).extract(&page).await;
        assert_eq!(texts[0].color, "#c81020");
        assert_eq!(texts[1].color, "#000000");
    }

    #[tokio::test]
    async fn test_raster_unavailable_defaults_to_black() {
        let page = FakePage::new(vec![run("Text", "F1", [10.0, 0.0, 0.0, 10.0, 50.0, 50.0])]);
        let config = EditorConfig {
            color_sampling: ColorSampling::Raster,
            ..EditorConfig::default()
        };
        let texts = TextExtractor::new(config).extract(&page).await;
        assert_eq!(texts[0].color, "#000000");
    }
}
