//! Canvas zoom level
//!
//! Zoom is view state only. It is never recorded in history.

use serde::{Deserialize, Serialize};

pub const MIN_ZOOM: f64 = 0.5;
pub const MAX_ZOOM: f64 = 2.0;
pub const ZOOM_STEP: f64 = 0.1;
pub const DEFAULT_ZOOM: f64 = 1.0;

/// Zoom factor clamped to `[MIN_ZOOM, MAX_ZOOM]`
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Zoom(f64);

impl Zoom {
    /// Create a zoom level, clamping into range
    ///
    /// Non-finite input falls back to the default level.
    pub fn new(value: f64) -> Self {
        if value.is_finite() {
            Self(value.clamp(MIN_ZOOM, MAX_ZOOM))
        } else {
            Self(DEFAULT_ZOOM)
        }
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    /// One step in, snapped to a tenth
    pub fn stepped_in(&self) -> Self {
        Self::new(snap(self.0 + ZOOM_STEP))
    }

    /// One step out, snapped to a tenth
    pub fn stepped_out(&self) -> Self {
        Self::new(snap(self.0 - ZOOM_STEP))
    }

    /// Zoom as a whole percentage, for labels
    pub fn percent(&self) -> u32 {
        (self.0 * 100.0).round() as u32
    }
}

impl Default for Zoom {
    fn default() -> Self {
        Self(DEFAULT_ZOOM)
    }
}

fn snap(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
