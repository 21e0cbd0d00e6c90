//! Editor configuration

use crate::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How extracted text color is determined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorSampling {
    /// Every run is black
    #[default]
    Fixed,
    /// Sample the rendered page near each run
    Raster,
}

/// Tunable constants for extraction, rendering and compilation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorConfig {
    /// Render scale at zoom 1.0
    pub base_render_scale: f64,
    /// Upper bound on a single font descriptor lookup
    pub font_lookup_timeout_ms: u64,
    pub color_sampling: ColorSampling,
    /// Supersampling scale of the color-sampling render
    pub sample_scale: f64,
    /// Probe height above the baseline, as a fraction of the font size
    pub sample_offset: f64,
    /// Channels at or above this value count as near-white
    pub near_white_threshold: u8,
    /// Eraser hit radius, added to half the stroke width
    pub eraser_threshold: f64,
    pub footer_gray: f32,
    /// Footer baseline above the page bottom (points)
    pub footer_baseline: f64,
    /// Right margin of a bottom-right footer (points)
    pub footer_margin: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            base_render_scale: 1.5,
            font_lookup_timeout_ms: 3000,
            color_sampling: ColorSampling::Fixed,
            sample_scale: 2.0,
            sample_offset: 0.65,
            near_white_threshold: 245,
            eraser_threshold: 12.0,
            footer_gray: 0.45,
            footer_baseline: 14.0,
            footer_margin: 36.0,
        }
    }
}

impl EditorConfig {
    /// Parse from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn font_lookup_timeout(&self) -> Duration {
        Duration::from_millis(self.font_lookup_timeout_ms)
    }

    /// Render scale for a zoom level
    pub fn render_scale(&self, zoom: f64) -> f64 {
        self.base_render_scale * zoom
    }
}
