use serde::{Deserialize, Serialize};

use crate::error::{PriorError, Result};

/// Minimum and maximum default box size of a feature map layer, in pixels of the
/// input image.
///
/// The small square box of every cell uses `min_size`, the big square box uses the
/// geometric mean `sqrt(min_size * max_size)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoxSizeRange {
    pub min_size: f64,
    pub max_size: f64,
}

impl BoxSizeRange {
    pub fn new(min_size: f64, max_size: f64) -> Self {
        Self { min_size, max_size }
    }
}

/// Describes the prior boxes tiled over one detection feature map.
///
/// Relevant excerpt from
///
/// “SSD: Single Shot MultiBox Detector”
/// Authors: Wei Liu, Dragomir Anguelov, Dumitru Erhan, Christian Szegedy,
///          Scott Reed, Cheng-Yang Fu, Alexander C. Berg
/// Link (official): https://arxiv.org/abs/1512.02325
///
/// Default boxes and aspect ratios - Pg. 4 Liu et al.
///
/// We associate a set of default bounding boxes with each feature map cell, for multiple feature
/// maps at the top of the network. The default boxes tile the feature map in a convolutional
/// manner, so that the position of each box relative to its corresponding cell is fixed.
///
/// # Fields
///
/// * `grid_size` - Side length of the square feature map (38 for a 38x38 map).
/// * `stride` - Pixels of the input image covered by one grid cell (the "shrinkage").
/// * `box_sizes` - Square box sizes for this layer.
/// * `aspect_ratios` - Extra ratios applied to the small square box, each one producing
///   a tall and a wide box. Duplicates are kept and produce duplicate boxes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSpec {
    pub grid_size: usize,
    pub stride: f64,
    pub box_sizes: BoxSizeRange,
    pub aspect_ratios: Vec<f64>,
}

impl LayerSpec {
    pub fn new(
        grid_size: usize,
        stride: f64,
        min_size: f64,
        max_size: f64,
        aspect_ratios: Vec<f64>,
    ) -> Self {
        Self {
            grid_size,
            stride,
            box_sizes: BoxSizeRange::new(min_size, max_size),
            aspect_ratios,
        }
    }

    /// Number of boxes emitted for every grid cell: the small and big square boxes
    /// plus a tall/wide pair per aspect ratio.
    pub fn box_count_per_cell(&self) -> usize {
        2 + 2 * self.aspect_ratios.len()
    }

    /// Number of boxes emitted for the whole layer.
    ///
    /// Panics on overflow, [`LayerSpec::validate`] rejects such layers.
    pub fn prior_count(&self) -> usize {
        self.grid_size * self.grid_size * self.box_count_per_cell()
    }

    /// [`LayerSpec::prior_count`], or `None` when it does not fit in `usize`.
    pub fn checked_prior_count(&self) -> Option<usize> {
        self.grid_size
            .checked_mul(self.grid_size)?
            .checked_mul(self.aspect_ratios.len().checked_mul(2)?.checked_add(2)?)
    }

    /// Number of grid cells of this layer that tile `image_size`.
    pub fn scale(&self, image_size: f64) -> f64 {
        image_size / self.stride
    }

    /// Rejects the values that would make prior generation divide by zero or overflow
    /// the box count.
    ///
    /// Nothing else is checked: a `min_size` larger than `max_size` still produces
    /// boxes, and a zero `grid_size` simply contributes none.
    pub fn validate(&self) -> Result<()> {
        if !(self.stride.is_finite() && self.stride > 0.0) {
            return Err(PriorError::invalid_argument(format!(
                "stride must be > 0, got {}",
                self.stride
            )));
        }

        if let Some(ratio) = self
            .aspect_ratios
            .iter()
            .find(|ratio| !(ratio.is_finite() && **ratio > 0.0))
        {
            return Err(PriorError::invalid_argument(format!(
                "aspect ratios must be > 0, got {}",
                ratio
            )));
        }

        if self.checked_prior_count().is_none() {
            return Err(PriorError::invalid_argument(format!(
                "grid_size {} with {} aspect ratios overflows the prior count",
                self.grid_size,
                self.aspect_ratios.len()
            )));
        }

        Ok(())
    }
}
