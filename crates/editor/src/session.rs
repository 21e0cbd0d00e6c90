//! Headless editing sessions: a document plus a scripted list of edits

use crate::compile::{edited_file_name, CompileInput, Compiler};
use crate::config::EditorConfig;
use crate::extract::{ExtractionLatch, TextExtractor};
use crate::ink::StateRasters;
use crate::model::{EditorState, StyleEdits};
use crate::render::RenderSlot;
use crate::source::PageSource;
use crate::store::{Action, Store};
use crate::{load_document, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Edit of an extracted run, addressed by its original text
///
/// Extracted runs get fresh ids on every load, so scripted edits find their
/// target by page and content instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextEdit {
    pub page_index: usize,
    /// Original text of the run to edit
    pub find: String,
    #[serde(default)]
    pub replace: Option<String>,
    #[serde(default)]
    pub style: Option<StyleEdits>,
}

impl TextEdit {
    /// Actions applying this edit to the first matching run
    pub fn resolve(&self, state: &EditorState) -> Vec<Action> {
        let Some(target) = state
            .extracted_texts_on(self.page_index)
            .find(|text| text.original_str == self.find)
        else {
            warn!(page = self.page_index, find = %self.find, "no extracted run matches edit");
            return Vec::new();
        };

        let mut actions = Vec::new();
        if let Some(replace) = &self.replace {
            actions.push(Action::UpdateExtractedText {
                id: target.id.clone(),
                edited_str: replace.clone(),
            });
        }
        if let Some(style) = &self.style {
            actions.push(Action::UpdateExtractedTextStyle {
                id: target.id.clone(),
                edits: style.clone(),
            });
        }
        actions
    }
}

/// A scripted editing session
///
/// ```json
/// {
///   "config": { "fontLookupTimeoutMs": 500 },
///   "textEdits": [{ "pageIndex": 0, "find": "Draft", "replace": "Final" }],
///   "actions": [{ "type": "SET_PAGINATION_ENABLED", "enabled": true }]
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Session {
    pub config: EditorConfig,
    pub text_edits: Vec<TextEdit>,
    pub actions: Vec<Action>,
}

/// Output of a session run
#[derive(Debug, Clone)]
pub struct Compiled {
    pub file_name: String,
    pub edit_count: usize,
    pub bytes: Vec<u8>,
}

impl Session {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load, lay out and extract every page, apply the scripted edits and
    /// compile
    pub async fn run(&self, data: &[u8], file_name: &str) -> Result<Compiled> {
        let mut store = Store::new();
        let reader = load_document(&mut store, data, file_name)?;
        let extractor = TextExtractor::new(self.config.clone());
        let scale = self.config.render_scale(store.state().zoom);

        for number in 1..=reader.page_count() {
            let page = reader.page(number)?;
            let page_index = page.page_index();

            let mut slot = RenderSlot::new(page_index);
            let ticket = slot.begin(scale);
            let viewport = page.viewport(ticket.scale);
            if let Some(dimensions) = slot.commit(&ticket, viewport.width, viewport.height) {
                store.dispatch(Action::SetPageDimensions {
                    page_index,
                    dimensions,
                });
            }

            let found = extractor
                .extract_into(&page, &ExtractionLatch::new(), &mut store)
                .await;
            debug!(page = page_index, runs = found, "extracted page text");
        }

        for action in &self.actions {
            store.dispatch(action.clone());
        }
        for edit in &self.text_edits {
            for action in edit.resolve(store.state()) {
                store.dispatch(action);
            }
        }

        let state = store.snapshot();
        let rasters = StateRasters::new(&state);
        let input = CompileInput::from_state(&state, &rasters)?;
        let bytes = Compiler::new(self.config.clone()).compile(&input)?;

        Ok(Compiled {
            file_name: edited_file_name(file_name),
            edit_count: state.edit_count(),
            bytes,
        })
    }
}
