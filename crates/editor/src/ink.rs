//! Freehand ink: stroke recording, eraser hit tests and page rasters
//!
//! Rasters are full-page transparent RGBA images at the page's rendered
//! pixel size, handed to the compiler as PNG bytes.

use crate::model::{new_id, DrawingPath, EditorState, Point, Tool};
use crate::store::Action;
use crate::{EditorError, Result};
use image::{ImageFormat, ImageResult, Rgba, RgbaImage};
use pdf_core::Color;
use std::collections::BTreeMap;
use std::io::Cursor;
use std::sync::{Arc, Mutex, Weak};

/// Highlighter ink color
pub const HIGHLIGHT_COLOR: &str = "#FFEB3B";
/// Highlighter width as a multiple of the stroke width
pub const HIGHLIGHT_WIDTH_FACTOR: f64 = 3.0;
pub const HIGHLIGHT_OPACITY: f64 = 0.35;

/// Color, width and opacity of a stroke, fixed when the stroke is committed
#[derive(Debug, Clone, PartialEq)]
pub struct StrokeStyle {
    pub color: String,
    pub width: f64,
    pub opacity: f64,
}

impl StrokeStyle {
    /// Style for the active tool; `None` for tools that do not draw
    pub fn for_tool(tool: Tool, color: &str, stroke_width: f64) -> Option<Self> {
        match tool {
            Tool::Draw => Some(Self {
                color: color.to_string(),
                width: stroke_width,
                opacity: 1.0,
            }),
            Tool::Highlight => Some(Self {
                color: HIGHLIGHT_COLOR.to_string(),
                width: stroke_width * HIGHLIGHT_WIDTH_FACTOR,
                opacity: HIGHLIGHT_OPACITY,
            }),
            Tool::Select | Tool::Text | Tool::Eraser => None,
        }
    }
}

/// Accumulates pointer positions of one drag gesture
#[derive(Debug, Clone)]
pub struct PathRecorder {
    page_index: usize,
    style: StrokeStyle,
    points: Vec<Point>,
}

impl PathRecorder {
    /// Start a stroke at pointer-down
    pub fn begin(page_index: usize, style: StrokeStyle, at: Point) -> Self {
        Self {
            page_index,
            style,
            points: vec![at],
        }
    }

    pub fn push(&mut self, at: Point) {
        self.points.push(at);
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Finish the stroke at pointer-release
    ///
    /// Strokes with fewer than two points are dropped.
    pub fn finish(self) -> Option<DrawingPath> {
        if self.points.len() < 2 {
            return None;
        }
        Some(DrawingPath {
            id: new_id(),
            page_index: self.page_index,
            points: self.points,
            color: self.style.color,
            width: self.style.width,
            opacity: self.style.opacity,
        })
    }
}

/// Whether an erase at `at` touches `path`
///
/// Hit when any point lies closer than `threshold` plus half the stroke
/// width.
pub fn eraser_hits(path: &DrawingPath, at: Point, threshold: f64) -> bool {
    let reach = threshold + path.width / 2.0;
    path.points.iter().any(|point| point.distance(&at) < reach)
}

/// Delete actions for every stroke on the page touched by an erase
pub fn erase_at(state: &EditorState, page_index: usize, at: Point, threshold: f64) -> Vec<Action> {
    state
        .drawings_on(page_index)
        .filter(|path| eraser_hits(path, at, threshold))
        .map(|path| Action::DeleteDrawing {
            id: path.id.clone(),
        })
        .collect()
}

/// Rasterize strokes onto a transparent canvas
///
/// Strokes have round caps and joins; each stroke is composited as a whole
/// with its opacity so overlapping segments do not darken.
pub fn rasterize<'a>(
    width: u32,
    height: u32,
    paths: impl IntoIterator<Item = &'a DrawingPath>,
) -> RgbaImage {
    let mut canvas = RgbaImage::new(width, height);
    for path in paths {
        if path.points.len() < 2 {
            continue;
        }
        paint_stroke(&mut canvas, path);
    }
    canvas
}

fn paint_stroke(canvas: &mut RgbaImage, path: &DrawingPath) {
    if canvas.width() == 0 || canvas.height() == 0 {
        return;
    }
    let half = path.width / 2.0;
    let (min_x, min_y, max_x, max_y) = path.points.iter().fold(
        (f64::MAX, f64::MAX, f64::MIN, f64::MIN),
        |(x0, y0, x1, y1), p| (x0.min(p.x), y0.min(p.y), x1.max(p.x), y1.max(p.y)),
    );
    let clamp_x = |v: f64| v.clamp(0.0, (canvas.width() - 1) as f64) as u32;
    let clamp_y = |v: f64| v.clamp(0.0, (canvas.height() - 1) as f64) as u32;
    let (left, right) = (clamp_x(min_x - half - 1.0), clamp_x(max_x + half + 1.0));
    let (top, bottom) = (clamp_y(min_y - half - 1.0), clamp_y(max_y + half + 1.0));
    if min_x - half - 1.0 > (canvas.width() - 1) as f64
        || min_y - half - 1.0 > (canvas.height() - 1) as f64
        || max_x + half + 1.0 < 0.0
        || max_y + half + 1.0 < 0.0
    {
        return;
    }

    let color = Color::from_hex(&path.color);
    let rgb = [color.r, color.g, color.b];
    let opacity = path.opacity.clamp(0.0, 1.0) as f32;

    for py in top..=bottom {
        for px in left..=right {
            let center = Point::new(px as f64 + 0.5, py as f64 + 0.5);
            let distance = path
                .points
                .windows(2)
                .map(|seg| segment_distance(center, seg[0], seg[1]))
                .fold(f64::MAX, f64::min);
            let coverage = (half + 0.5 - distance).clamp(0.0, 1.0) as f32;
            if coverage > 0.0 {
                blend(canvas.get_pixel_mut(px, py), rgb, coverage * opacity);
            }
        }
    }
}

/// Distance from `p` to the segment `a`-`b`
fn segment_distance(p: Point, a: Point, b: Point) -> f64 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let length_sq = dx * dx + dy * dy;
    if length_sq == 0.0 {
        return p.distance(&a);
    }
    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / length_sq).clamp(0.0, 1.0);
    p.distance(&Point::new(a.x + t * dx, a.y + t * dy))
}

/// Source-over composite of `rgb` at `alpha`
fn blend(pixel: &mut Rgba<u8>, rgb: [f32; 3], alpha: f32) {
    let [dr, dg, db, da] = pixel.0;
    let dst_alpha = da as f32 / 255.0;
    let out_alpha = alpha + dst_alpha * (1.0 - alpha);
    if out_alpha <= 0.0 {
        return;
    }
    let mix = |src: f32, dst: u8| {
        let dst = dst as f32 / 255.0;
        let value = (src * alpha + dst * dst_alpha * (1.0 - alpha)) / out_alpha;
        (value * 255.0).round().clamp(0.0, 255.0) as u8
    };
    pixel.0 = [
        mix(rgb[0], dr),
        mix(rgb[1], dg),
        mix(rgb[2], db),
        (out_alpha * 255.0).round() as u8,
    ];
}

/// Encode a raster as PNG
pub fn encode_png(image: &RgbaImage) -> ImageResult<Vec<u8>> {
    let mut buffer = Vec::new();
    image.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)?;
    Ok(buffer)
}

/// Per-page freehand raster snapshots, as PNG bytes
pub trait RasterSource {
    /// Current raster of a page, or `None` when the page has no ink
    ///
    /// A surface that exists but cannot be captured is an error, never `None`.
    fn page_raster(&self, page_index: usize) -> Result<Option<Vec<u8>>>;
}

/// A live drawing surface owned by the rendering layer
pub trait InkSurface: Send + Sync {
    /// PNG of everything currently drawn on the surface
    fn snapshot_png(&self) -> ImageResult<Vec<u8>>;
}

/// In-memory ink surface for one page
#[derive(Debug)]
pub struct InkCanvas {
    width: u32,
    height: u32,
    paths: Mutex<Vec<DrawingPath>>,
}

impl InkCanvas {
    /// Surface at the page's rendered pixel size
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            paths: Mutex::new(Vec::new()),
        }
    }

    /// Replace the committed strokes (called whenever the page's drawings
    /// change)
    pub fn set_paths(&self, paths: Vec<DrawingPath>) {
        match self.paths.lock() {
            Ok(mut guard) => *guard = paths,
            Err(poisoned) => *poisoned.into_inner() = paths,
        }
    }

    /// Pull the page's committed strokes from a state snapshot
    pub fn sync(&self, state: &EditorState, page_index: usize) {
        self.set_paths(state.drawings_on(page_index).cloned().collect());
    }

    pub fn render(&self) -> RgbaImage {
        let paths = match self.paths.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        };
        rasterize(self.width, self.height, &paths)
    }
}

impl InkSurface for InkCanvas {
    fn snapshot_png(&self) -> ImageResult<Vec<u8>> {
        encode_png(&self.render())
    }
}

/// Page index -> non-owning handle to that page's ink surface
///
/// Surfaces that have been dropped by their owner are skipped.
#[derive(Default)]
pub struct RasterRegistry {
    surfaces: Mutex<BTreeMap<usize, Weak<dyn InkSurface>>>,
}

impl RasterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, page_index: usize, surface: &Arc<dyn InkSurface>) {
        let mut surfaces = match self.surfaces.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        surfaces.insert(page_index, Arc::downgrade(surface));
    }

    pub fn unregister(&self, page_index: usize) {
        let mut surfaces = match self.surfaces.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        surfaces.remove(&page_index);
    }

    fn surface(&self, page_index: usize) -> Option<Arc<dyn InkSurface>> {
        let surfaces = match self.surfaces.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        surfaces.get(&page_index).and_then(Weak::upgrade)
    }
}

impl RasterSource for RasterRegistry {
    fn page_raster(&self, page_index: usize) -> Result<Option<Vec<u8>>> {
        let Some(surface) = self.surface(page_index) else {
            return Ok(None);
        };
        surface
            .snapshot_png()
            .map(Some)
            .map_err(|e| EditorError::Raster {
                page: page_index,
                message: e.to_string(),
            })
    }
}

/// Rasters drawn straight from a state snapshot's drawings
///
/// Used when no live surface exists (headless export). Pages without
/// drawings or without recorded dimensions have no raster.
pub struct StateRasters<'a> {
    state: &'a EditorState,
}

impl<'a> StateRasters<'a> {
    pub fn new(state: &'a EditorState) -> Self {
        Self { state }
    }
}

impl RasterSource for StateRasters<'_> {
    fn page_raster(&self, page_index: usize) -> Result<Option<Vec<u8>>> {
        let Some(dims) = self.state.page_dimensions.get(&page_index) else {
            return Ok(None);
        };
        let mut paths = self.state.drawings_on(page_index).peekable();
        if paths.peek().is_none() {
            return Ok(None);
        }
        let width = dims.width.round().max(1.0) as u32;
        let height = dims.height.round().max(1.0) as u32;
        encode_png(&rasterize(width, height, paths))
            .map(Some)
            .map_err(|e| EditorError::Raster {
                page: page_index,
                message: e.to_string(),
            })
    }
}

/// No rasters at all
pub struct NoRasters;

impl RasterSource for NoRasters {
    fn page_raster(&self, _page_index: usize) -> Result<Option<Vec<u8>>> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::drawing;
    use crate::model::PageDimensions;
    use pretty_assertions::assert_eq;

    fn square() -> DrawingPath {
        drawing(
            "sq",
            0,
            &[(0.0, 0.0), (40.0, 0.0), (40.0, 40.0), (0.0, 40.0), (0.0, 0.0)],
        )
    }

    #[test]
    fn test_eraser_hits_square() {
        let path = square();
        assert!(eraser_hits(&path, Point::new(0.0, 0.0), 12.0));
        assert!(!eraser_hits(&path, Point::new(100.0, 100.0), 12.0));
    }

    #[test]
    fn test_eraser_reach_includes_half_width() {
        let mut path = drawing("p", 0, &[(0.0, 0.0), (1.0, 0.0)]);
        path.width = 10.0;
        // reach = 12 + 5
        assert!(eraser_hits(&path, Point::new(0.0, 16.9), 12.0));
        assert!(!eraser_hits(&path, Point::new(0.0, 17.0), 12.0));
    }

    #[test]
    fn test_erase_at_only_touches_page() {
        let mut state = EditorState::default();
        state.drawings = vec![
            drawing("a", 0, &[(5.0, 5.0), (6.0, 6.0)]),
            drawing("b", 1, &[(5.0, 5.0), (6.0, 6.0)]),
            drawing("c", 0, &[(300.0, 300.0), (301.0, 301.0)]),
        ];
        let actions = erase_at(&state, 0, Point::new(0.0, 0.0), 12.0);
        assert_eq!(actions, vec![Action::DeleteDrawing { id: "a".to_string() }]);
    }

    #[test]
    fn test_highlight_style() {
        let style = StrokeStyle::for_tool(Tool::Highlight, "#000000", 4.0).unwrap();
        assert_eq!(style.color, HIGHLIGHT_COLOR);
        assert_eq!(style.width, 12.0);
        assert_eq!(style.opacity, 0.35);

        let pen = StrokeStyle::for_tool(Tool::Draw, "#ff0000", 4.0).unwrap();
        assert_eq!(pen.color, "#ff0000");
        assert_eq!(pen.opacity, 1.0);

        assert!(StrokeStyle::for_tool(Tool::Eraser, "#000000", 4.0).is_none());
    }

    #[test]
    fn test_recorder_drops_single_point() {
        let style = StrokeStyle::for_tool(Tool::Draw, "#000000", 3.0).unwrap();
        let recorder = PathRecorder::begin(0, style.clone(), Point::new(1.0, 1.0));
        assert!(recorder.finish().is_none());

        let mut recorder = PathRecorder::begin(2, style, Point::new(1.0, 1.0));
        recorder.push(Point::new(5.0, 5.0));
        let path = recorder.finish().unwrap();
        assert_eq!(path.page_index, 2);
        assert_eq!(path.points.len(), 2);
    }

    #[test]
    fn test_rasterize_stroke_pixels() {
        let mut path = drawing("p", 0, &[(2.0, 10.0), (18.0, 10.0)]);
        path.color = "#ff0000".to_string();
        path.width = 4.0;
        let image = rasterize(20, 20, [&path]);

        assert_eq!(image.get_pixel(10, 10).0, [255, 0, 0, 255]);
        assert_eq!(image.get_pixel(10, 2).0[3], 0);
        assert_eq!(image.get_pixel(0, 0).0[3], 0);
    }

    #[test]
    fn test_rasterize_highlight_opacity_is_uniform() {
        let mut path = drawing("h", 0, &[(2.0, 10.0), (18.0, 10.0), (2.0, 10.0)]);
        path.color = HIGHLIGHT_COLOR.to_string();
        path.width = 6.0;
        path.opacity = 0.35;
        let image = rasterize(20, 20, [&path]);

        // Doubled-back segments do not stack
        assert_eq!(image.get_pixel(10, 10).0[3], 89);
    }

    #[test]
    fn test_rasterize_skips_short_paths() {
        let path = drawing("p", 0, &[(10.0, 10.0)]);
        let image = rasterize(20, 20, [&path]);
        assert!(image.pixels().all(|p| p.0[3] == 0));
    }

    #[test]
    fn test_registry_holds_weak_refs() {
        let registry = RasterRegistry::new();
        let canvas = Arc::new(InkCanvas::new(10, 10));
        canvas.set_paths(vec![drawing("p", 0, &[(1.0, 1.0), (8.0, 8.0)])]);
        let surface: Arc<dyn InkSurface> = canvas.clone();
        registry.register(0, &surface);

        let png = registry.page_raster(0).unwrap().unwrap();
        assert_eq!(&png[1..4], b"PNG");
        assert!(registry.page_raster(1).unwrap().is_none());

        drop(surface);
        drop(canvas);
        assert!(registry.page_raster(0).unwrap().is_none());
    }

    #[test]
    fn test_registry_reports_capture_failure() {
        let registry = RasterRegistry::new();
        let canvas = Arc::new(InkCanvas::new(0, 0));
        canvas.set_paths(vec![drawing("p", 2, &[(1.0, 1.0), (4.0, 4.0), (8.0, 2.0)])]);
        let surface: Arc<dyn InkSurface> = canvas;
        registry.register(2, &surface);

        assert!(matches!(
            registry.page_raster(2),
            Err(EditorError::Raster { page: 2, .. })
        ));
    }

    #[test]
    fn test_canvas_snapshot_reflects_latest_strokes() {
        let canvas = InkCanvas::new(10, 10);
        assert!(canvas.render().pixels().all(|p| p.0[3] == 0));

        let mut state = EditorState::default();
        state.drawings = vec![drawing("p", 0, &[(0.0, 5.0), (10.0, 5.0)])];
        canvas.sync(&state, 0);
        assert_eq!(canvas.render().get_pixel(5, 5).0[3], 255);
    }

    #[test]
    fn test_state_rasters() {
        let mut state = EditorState::default();
        state.page_dimensions.insert(
            0,
            PageDimensions {
                width: 60.0,
                height: 80.0,
                scale: 0.1,
            },
        );
        state.drawings = vec![drawing("p", 0, &[(1.0, 1.0), (8.0, 8.0)])];
        let rasters = StateRasters::new(&state);

        let png = rasters.page_raster(0).unwrap().unwrap();
        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (60, 80));
        assert!(rasters.page_raster(1).unwrap().is_none());
    }
}
