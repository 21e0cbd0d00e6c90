//! WASM bindings for inkpdf
//!
//! This crate provides a JavaScript-friendly editing session:
//! - Loading a PDF and dispatching store actions as JSON
//! - Overlay geometry for extracted text
//! - Eraser hit tests
//! - Compiling all edits into a new PDF
//!
//! Text extraction and page rendering happen on the JavaScript side (the
//! host renderer); their results enter the store through
//! `APPEND_EXTRACTED_TEXTS` and `SET_PAGE_DIMENSIONS` actions.
//!
//! # Example (JavaScript)
//!
//! ```javascript
//! import init, { EditorSession } from 'inkpdf-wasm';
//!
//! await init();
//!
//! const session = new EditorSession();
//! session.loadDocument(pdfBytes, 'report.pdf');
//! session.dispatch(JSON.stringify({ type: 'SET_PAGINATION_ENABLED', enabled: true }));
//!
//! const output = session.compile();
//! download(output, session.editedFileName());
//! ```

use editor::{
    edited_file_name, erase_at, load_document, overlay, Action, CompileInput, Compiler,
    EditorConfig, Point, StateRasters, Store,
};
use pdf_core::PdfReader;
use serde::Serialize;
use wasm_bindgen::prelude::*;

// Initialize panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

fn js_error(err: impl std::fmt::Display) -> JsValue {
    js_sys::Error::new(&err.to_string()).into()
}

/// Counts shown next to the export button
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportSummary {
    file_name: String,
    num_pages: usize,
    edit_count: usize,
}

/// One document being edited
#[wasm_bindgen]
pub struct EditorSession {
    store: Store,
    config: EditorConfig,
    reader: Option<PdfReader>,
}

#[wasm_bindgen]
impl EditorSession {
    /// Create a session with default configuration
    #[wasm_bindgen(constructor)]
    pub fn new() -> EditorSession {
        EditorSession {
            store: Store::new(),
            config: EditorConfig::default(),
            reader: None,
        }
    }

    /// Create a session from a configuration JSON string
    ///
    /// @param json - Configuration, camelCase keys; missing keys use defaults
    #[wasm_bindgen(js_name = withConfig)]
    pub fn with_config(json: &str) -> Result<EditorSession, JsValue> {
        let config = EditorConfig::from_json(json).map_err(js_error)?;
        Ok(EditorSession {
            config,
            ..EditorSession::new()
        })
    }

    /// Load a document, replacing all annotations
    ///
    /// On failure the current document and annotations are kept.
    ///
    /// @param data - PDF file bytes (Uint8Array)
    /// @param fileName - Original file name
    /// @returns Number of pages
    #[wasm_bindgen(js_name = loadDocument)]
    pub fn load_document(&mut self, data: &[u8], file_name: &str) -> Result<usize, JsValue> {
        let reader = load_document(&mut self.store, data, file_name).map_err(js_error)?;
        let num_pages = reader.page_count();
        self.reader = Some(reader);
        Ok(num_pages)
    }

    /// Apply a store action
    ///
    /// @param actionJson - e.g. `{"type":"SET_COLOR","color":"#ff0000"}`
    /// @returns Whether the state changed
    pub fn dispatch(&mut self, action_json: &str) -> Result<bool, JsValue> {
        let action: Action = serde_json::from_str(action_json).map_err(js_error)?;
        Ok(self.store.dispatch(action))
    }

    /// Current state as a plain object (without the document bytes)
    #[wasm_bindgen(js_name = summary)]
    pub fn summary(&self) -> Result<JsValue, JsValue> {
        let state = self.store.state();
        let summary = ExportSummary {
            file_name: state.file_name.clone(),
            num_pages: state.num_pages,
            edit_count: state.edit_count(),
        };
        Ok(serde_wasm_bindgen::to_value(&summary)?)
    }

    /// Display geometry of a page's extracted text
    ///
    /// Uses the page's recorded render scale; empty until the page has
    /// dimensions.
    #[wasm_bindgen(js_name = screenItems)]
    pub fn screen_items(&self, page_index: usize) -> Result<JsValue, JsValue> {
        let state = self.store.state();
        let (Some(reader), Some(dims)) = (&self.reader, state.page_dimensions.get(&page_index))
        else {
            return Ok(js_sys::Array::new().into());
        };
        let page = reader.page(page_index + 1).map_err(js_error)?;
        let items = overlay::layout_page(state, page_index, &page.viewport(dims.scale));
        Ok(serde_wasm_bindgen::to_value(&items)?)
    }

    /// Erase every stroke on the page near a display-space point
    ///
    /// @returns Number of strokes removed
    #[wasm_bindgen(js_name = eraseAt)]
    pub fn erase_at(&mut self, page_index: usize, x: f64, y: f64) -> usize {
        let actions = erase_at(
            self.store.state(),
            page_index,
            Point::new(x, y),
            self.config.eraser_threshold,
        );
        actions
            .into_iter()
            .filter(|action| self.store.dispatch(action.clone()))
            .count()
    }

    /// Compile all edits into a new PDF
    ///
    /// @returns PDF bytes (Uint8Array)
    pub fn compile(&self) -> Result<Vec<u8>, JsValue> {
        let state = self.store.snapshot();
        let rasters = StateRasters::new(&state);
        let input = CompileInput::from_state(&state, &rasters).map_err(js_error)?;
        Compiler::new(self.config.clone())
            .compile(&input)
            .map_err(js_error)
    }

    /// Download name for the compiled document
    #[wasm_bindgen(js_name = editedFileName)]
    pub fn edited_file_name(&self) -> String {
        edited_file_name(&self.store.state().file_name)
    }

    /// Number of edits (changed extracted text, text blocks and drawings)
    #[wasm_bindgen(js_name = editCount)]
    pub fn edit_count(&self) -> usize {
        self.store.state().edit_count()
    }
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new()
    }
}
