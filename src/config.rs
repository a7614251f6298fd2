//! Configuration types for flipbook rendering and live capture.
//!
//! Physical layout lives in [`LayoutParameters`], capture pacing in
//! [`CaptureConfig`]; [`FlipbookConfig`] bundles both with the GIF switch and
//! an optional progress callback. Every struct is built through a builder
//! whose `build()` validates the values, so a config that exists is a config
//! the renderer can use.

use crate::error::FlipbookError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Physical dimensions of one flipbook card and of the printed sheet.
///
/// Supplied once per render call and never mutated by the renderer.
///
/// # Example
/// ```rust
/// use flipbook_printer::LayoutParameters;
///
/// let params = LayoutParameters::builder()
///     .target_height_cm(4.0)
///     .left_margin_cm(2.0)
///     .build()
///     .unwrap();
/// assert_eq!(params.left_margin_pixels(400), Some(200));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutParameters {
    /// Printed height of every card in centimetres. Default: 3.5.
    ///
    /// Width follows from the card's aspect ratio.
    pub target_height_cm: f64,

    /// White binding margin on the left of every card, in centimetres. Default: 2.5.
    ///
    /// Converted to pixels with the frame height as the physical reference:
    /// `frame_height_px / target_height_cm * left_margin_cm`.
    pub left_margin_cm: f64,

    /// Requested cut-guide line width in pixels. Default: 1.
    ///
    /// Accepted and validated but not applied: the cut guide is always
    /// exactly one pixel wide. A value other than 1 is logged as a warning.
    pub border_linewidth_px: u32,

    /// Page margin on all four sides of every sheet, in centimetres. Default: 1.27.
    pub sheet_margin_cm: f64,

    /// Sheet size the document is laid out on. Default: [`PaperSize::A4`].
    pub paper: PaperSize,
}

impl Default for LayoutParameters {
    fn default() -> Self {
        Self {
            target_height_cm: 3.5,
            left_margin_cm: 2.5,
            border_linewidth_px: 1,
            sheet_margin_cm: 1.27,
            paper: PaperSize::default(),
        }
    }
}

impl LayoutParameters {
    /// Create a new builder for `LayoutParameters`.
    pub fn builder() -> LayoutParametersBuilder {
        LayoutParametersBuilder {
            params: Self::default(),
        }
    }

    /// Left-margin width in pixels for a frame of the given pixel height.
    ///
    /// Rounded to the nearest pixel. `None` when the result is not a
    /// representable pixel count (e.g. a zero target height).
    pub fn left_margin_pixels(&self, frame_height_px: u32) -> Option<u32> {
        let px = (f64::from(frame_height_px) / self.target_height_cm * self.left_margin_cm).round();
        if px.is_finite() && (0.0..=f64::from(u32::MAX)).contains(&px) {
            Some(px as u32)
        } else {
            None
        }
    }

    /// Check the constraints the builder enforces. Parameters assembled
    /// through the public fields are re-checked by the renderer.
    pub fn validate(&self) -> Result<(), FlipbookError> {
        if !self.target_height_cm.is_finite() || self.target_height_cm <= 0.0 {
            return Err(FlipbookError::InvalidConfig(format!(
                "target height must be a positive number of cm, got {}",
                self.target_height_cm
            )));
        }
        if !self.left_margin_cm.is_finite() || self.left_margin_cm < 0.0 {
            return Err(FlipbookError::InvalidConfig(format!(
                "left margin must be ≥ 0 cm, got {}",
                self.left_margin_cm
            )));
        }
        if !self.sheet_margin_cm.is_finite() || self.sheet_margin_cm < 0.0 {
            return Err(FlipbookError::InvalidConfig(format!(
                "sheet margin must be ≥ 0 cm, got {}",
                self.sheet_margin_cm
            )));
        }
        let (w, h) = self.paper.dimensions_cm();
        if 2.0 * self.sheet_margin_cm >= w.min(h) {
            return Err(FlipbookError::InvalidConfig(format!(
                "sheet margin {} cm leaves no printable area on {:?}",
                self.sheet_margin_cm, self.paper
            )));
        }
        if self.border_linewidth_px == 0 {
            return Err(FlipbookError::InvalidConfig(
                "border linewidth must be ≥ 1 px".into(),
            ));
        }
        Ok(())
    }
}

/// Builder for [`LayoutParameters`].
#[derive(Debug)]
pub struct LayoutParametersBuilder {
    params: LayoutParameters,
}

impl LayoutParametersBuilder {
    pub fn target_height_cm(mut self, cm: f64) -> Self {
        self.params.target_height_cm = cm;
        self
    }

    pub fn left_margin_cm(mut self, cm: f64) -> Self {
        self.params.left_margin_cm = cm;
        self
    }

    pub fn border_linewidth_px(mut self, px: u32) -> Self {
        self.params.border_linewidth_px = px;
        self
    }

    pub fn sheet_margin_cm(mut self, cm: f64) -> Self {
        self.params.sheet_margin_cm = cm;
        self
    }

    pub fn paper(mut self, paper: PaperSize) -> Self {
        self.params.paper = paper;
        self
    }

    /// Build the parameters, validating constraints.
    pub fn build(self) -> Result<LayoutParameters, FlipbookError> {
        self.params.validate()?;
        Ok(self.params)
    }
}

/// Live-capture settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Camera index handed to the capture backend. Default: 1.
    pub device_id: u32,

    /// Frames per second the live loop is paced at, and the GIF sidecar
    /// plays back at. Default: 15.
    pub fps: u32,

    /// Crop every live frame to a centred square. Default: false.
    ///
    /// Frames are cropped to the shorter edge, never resized.
    pub square: bool,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            device_id: 1,
            fps: 15,
            square: false,
        }
    }
}

impl CaptureConfig {
    /// Create a new builder for `CaptureConfig`.
    pub fn builder() -> CaptureConfigBuilder {
        CaptureConfigBuilder {
            config: Self::default(),
        }
    }

    /// Poll timeout between two live frames.
    pub fn frame_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(1000 / u64::from(self.fps.max(1)))
    }
}

/// Builder for [`CaptureConfig`].
#[derive(Debug)]
pub struct CaptureConfigBuilder {
    config: CaptureConfig,
}

impl CaptureConfigBuilder {
    pub fn device_id(mut self, id: u32) -> Self {
        self.config.device_id = id;
        self
    }

    pub fn fps(mut self, fps: u32) -> Self {
        self.config.fps = fps;
        self
    }

    pub fn square(mut self, v: bool) -> Self {
        self.config.square = v;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<CaptureConfig, FlipbookError> {
        if self.config.fps == 0 || self.config.fps > 1000 {
            return Err(FlipbookError::InvalidConfig(format!(
                "fps must be 1–1000, got {}",
                self.config.fps
            )));
        }
        Ok(self.config)
    }
}

/// Everything a flipbook job needs: layout, capture and progress reporting.
#[derive(Clone)]
pub struct FlipbookConfig {
    /// Card and sheet geometry.
    pub layout: LayoutParameters,

    /// Live-capture pacing and cropping.
    pub capture: CaptureConfig,

    /// Save a GIF next to every completed live recording. Default: true.
    pub write_gif: bool,

    /// Receives capture and render events. Default: none.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for FlipbookConfig {
    fn default() -> Self {
        Self {
            layout: LayoutParameters::default(),
            capture: CaptureConfig::default(),
            write_gif: true,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for FlipbookConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlipbookConfig")
            .field("layout", &self.layout)
            .field("capture", &self.capture)
            .field("write_gif", &self.write_gif)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn ProgressCallback>"),
            )
            .finish()
    }
}

impl FlipbookConfig {
    /// Create a new builder for `FlipbookConfig`.
    pub fn builder() -> FlipbookConfigBuilder {
        FlipbookConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`FlipbookConfig`].
#[derive(Debug)]
pub struct FlipbookConfigBuilder {
    config: FlipbookConfig,
}

impl FlipbookConfigBuilder {
    pub fn layout(mut self, layout: LayoutParameters) -> Self {
        self.config.layout = layout;
        self
    }

    pub fn capture(mut self, capture: CaptureConfig) -> Self {
        self.config.capture = capture;
        self
    }

    pub fn write_gif(mut self, v: bool) -> Self {
        self.config.write_gif = v;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, re-validating the nested parts.
    pub fn build(self) -> Result<FlipbookConfig, FlipbookError> {
        self.config.layout.validate()?;
        if self.config.capture.fps == 0 {
            return Err(FlipbookError::InvalidConfig("fps must be ≥ 1".into()));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Sheet format the document is paginated on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PaperSize {
    /// 21.0 × 29.7 cm (default).
    #[default]
    A4,
    /// 8.5 × 11 in.
    Letter,
}

impl PaperSize {
    /// Portrait `(width, height)` in centimetres.
    pub fn dimensions_cm(&self) -> (f64, f64) {
        match self {
            PaperSize::A4 => (21.0, 29.7),
            PaperSize::Letter => (21.59, 27.94),
        }
    }
}
