//! Caption auto-fit: walk the font size up or down in fixed steps until the
//! wrapped caption lands inside a height band.
//!
//! Line count changes discretely as the size moves, so block height does not
//! respond smoothly to size and a fixed-step walk is used instead of bisection.
//! The walk ends in one of three ways:
//! - the height falls inside `[min_height, max_height]` ([`FitOutcome::Fitted`]),
//! - the block gets wider than `max_width_allowed` ([`FitOutcome::WidthOverflow`]),
//! - the iteration cap or the size floor is hit ([`FitOutcome::Exhausted`]).

use serde::{Deserialize, Serialize};

use crate::consts::{
    CAPTION_ANCHOR, CAPTION_LINE_PX, CAPTION_MAX_H, CAPTION_MAX_W, CAPTION_MIN_H,
    FIT_INITIAL_PX, FIT_MAX_ITERATIONS, FIT_STEP_PX,
};
use crate::error::Result;
use crate::graphics::{FontSpec, TextMeasure};
use crate::wrap::{find_wrap_width, word_wrap};

/// Target region for a caption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitBox {
    /// Top-left of the rendered block.
    pub anchor: (i32, i32),
    /// Pixel budget per line, used to derive the wrap width.
    pub max_line_px: u32,
    /// Block width above which the search gives up.
    pub max_width_allowed: u32,
    pub min_height: u32,
    pub max_height: u32,
}

impl Default for FitBox {
    fn default() -> Self {
        Self {
            anchor: CAPTION_ANCHOR,
            max_line_px: CAPTION_LINE_PX,
            max_width_allowed: CAPTION_MAX_W,
            min_height: CAPTION_MIN_H,
            max_height: CAPTION_MAX_H,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitParams {
    pub initial_size: u32,
    pub step: u32,
    pub max_iterations: u32,
}

impl Default for FitParams {
    fn default() -> Self {
        Self {
            initial_size: FIT_INITIAL_PX,
            step: FIT_STEP_PX,
            max_iterations: FIT_MAX_ITERATIONS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitOutcome {
    /// Height inside the band.
    Fitted,
    /// Block exceeded `max_width_allowed`; best effort.
    WidthOverflow,
    /// Iteration cap or minimum size reached; best effort.
    Exhausted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FitResult {
    pub text: String,
    pub font: FontSpec,
    pub width: u32,
    pub height: u32,
    pub iterations: u32,
    pub outcome: FitOutcome,
}

impl FitResult {
    pub fn is_fitted(&self) -> bool {
        self.outcome == FitOutcome::Fitted
    }
}

/// Search a font size and wrap width for `text` inside `fit_box`.
///
/// `base` names the font family; its size is ignored. Measurement errors
/// (unknown family) are returned as-is.
pub fn fit_caption<M: TextMeasure + ?Sized>(
    text: &str,
    fit_box: &FitBox,
    base: &FontSpec,
    params: &FitParams,
    measure: &M,
) -> Result<FitResult> {
    let step = params.step.max(1);
    let max_iterations = params.max_iterations.max(1);
    let mut size = params.initial_size.max(1);
    let mut iterations = 0;

    loop {
        iterations += 1;
        let font = base.with_size(size);
        let wrap = find_wrap_width(text, &font, fit_box.max_line_px, measure)?;
        let wrapped = word_wrap(text, wrap);
        let (width, height) = measure.block_bbox(&wrapped, &font, fit_box.anchor)?;
        log::debug!("fit: width={} height={} size={} wrap={}", width, height, size, wrap);

        let result = |outcome| FitResult {
            text: wrapped.clone(),
            font: font.clone(),
            width,
            height,
            iterations,
            outcome,
        };

        if width > fit_box.max_width_allowed {
            log::info!(
                "Caption wider than {} px at size {}, keeping last attempt",
                fit_box.max_width_allowed,
                size
            );
            return Ok(result(FitOutcome::WidthOverflow));
        }
        if (fit_box.min_height..=fit_box.max_height).contains(&height) {
            return Ok(result(FitOutcome::Fitted));
        }
        if iterations >= max_iterations {
            log::warn!("Caption fit gave up after {} iterations (height {})", iterations, height);
            return Ok(result(FitOutcome::Exhausted));
        }

        if height > fit_box.max_height {
            if size <= step {
                log::warn!("Caption still {} px tall at minimum size {}", height, size);
                return Ok(result(FitOutcome::Exhausted));
            }
            size -= step;
        } else {
            size += step;
        }
    }
}
