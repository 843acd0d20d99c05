use burn::{
    prelude::Backend,
    tensor::{Tensor, TensorData, s},
};
use tracing::debug;

use crate::{
    config::{CLIP, IMAGE_SIZE},
    error::{PriorError, Result},
    layers::default_specs,
    specs::LayerSpec,
};

/// A single prior (default) box.
///
/// Every value is a fraction of the input image size. The field order
/// `(center_x, center_y, height, width)` is also the column order of the dense
/// `[num_priors, 4]` representation returned by [`priors_to_tensor`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PriorBox {
    pub center_x: f64,
    pub center_y: f64,
    pub height: f64,
    pub width: f64,
}

impl PriorBox {
    pub fn new(center_x: f64, center_y: f64, height: f64, width: f64) -> Self {
        Self {
            center_x,
            center_y,
            height,
            width,
        }
    }

    /// `[center_x, center_y, height, width]`
    pub fn as_array(&self) -> [f64; 4] {
        [self.center_x, self.center_y, self.height, self.width]
    }

    /// Clamps each of the four values independently to `[0, 1]`.
    pub fn clip(&self) -> Self {
        Self {
            center_x: self.center_x.clamp(0.0, 1.0),
            center_y: self.center_y.clamp(0.0, 1.0),
            height: self.height.clamp(0.0, 1.0),
            width: self.width.clamp(0.0, 1.0),
        }
    }

    /// Converts the box to corner format `[x1, y1, x2, y2]`.
    pub fn to_x1y1x2y2(&self) -> [f64; 4] {
        [
            self.center_x - self.width * 0.5,
            self.center_y - self.height * 0.5,
            self.center_x + self.width * 0.5,
            self.center_y + self.height * 0.5,
        ]
    }
}

/// Returns the number of priors `generate_priors` emits for `specs`.
///
/// Each layer contributes `grid_size² * (2 + 2 * aspect_ratios)` boxes, for SSD300 this
/// is the 8732 boxes of pg 4, fig. 2. Specs must have passed [`LayerSpec::validate`].
pub fn count_priors(specs: &[LayerSpec]) -> usize {
    specs.iter().map(LayerSpec::prior_count).sum()
}

/// Returns the `(height, width)` of every box emitted at a single grid cell of `spec`,
/// in emission order, as fractions of `image_size`.
///
/// 1. the small square box, `min_size`
/// 2. the big square box, `sqrt(min_size * max_size)`
/// 3. for every aspect ratio `ar`, a tall box `(h·√ar, w/√ar)` followed by a wide box
///    `(h/√ar, w·√ar)`
///
/// The aspect ratios are applied to the small square box only, the big square box never
/// gets ratio variants.
pub fn get_default_boxes(spec: &LayerSpec, image_size: f64) -> Vec<(f64, f64)> {
    let mut box_sizes = Vec::with_capacity(spec.box_count_per_cell());

    let small = spec.box_sizes.min_size / image_size;
    box_sizes.push((small, small));

    let big = (spec.box_sizes.max_size * spec.box_sizes.min_size).sqrt() / image_size;
    box_sizes.push((big, big));

    for ratio in spec.aspect_ratios.iter() {
        let ratio = ratio.sqrt();
        box_sizes.push((small * ratio, small / ratio));
        box_sizes.push((small / ratio, small * ratio));
    }

    box_sizes
}

/// Returns the box centers along one axis of the layer grid.
///
/// The center of cell `k` is `(k + 0.5) / scale` where `scale = image_size / stride`
/// is the number of cells tiling the image. The grid is square so the same values are
/// used for x and y.
pub fn get_default_box_centers(spec: &LayerSpec, image_size: f64) -> Vec<f64> {
    let scale = spec.scale(image_size);

    (0..spec.grid_size)
        .map(|k| (k as f64 + 0.5) / scale)
        .collect()
}

/// Generates the prior boxes of all `specs`.
///
/// Boxes are ordered by layer (input order), then by grid row `j`, then by grid column
/// `i`, then by the per cell order of [`get_default_boxes`]. Downstream consumers index
/// priors by position so this order must not change.
///
/// When `clip` is set every value of every box is clamped to `[0, 1]`.
///
/// # Errors
///
/// `PriorError::InvalidArgument` when `image_size` is not strictly positive, a layer
/// fails [`LayerSpec::validate`] or the total box count does not fit in `usize`. Inputs are checked before any box is generated.
pub fn generate_priors(specs: &[LayerSpec], image_size: f64, clip: bool) -> Result<Vec<PriorBox>> {
    if !(image_size.is_finite() && image_size > 0.0) {
        return Err(PriorError::invalid_argument(format!(
            "image_size must be > 0, got {}",
            image_size
        )));
    }

    for spec in specs {
        spec.validate()?;
    }

    let total = specs
        .iter()
        .try_fold(0usize, |total, spec| {
            spec.checked_prior_count()
                .and_then(|count| total.checked_add(count))
        })
        .ok_or_else(|| PriorError::invalid_argument("total prior count overflows usize"))?;

    let mut priors = Vec::with_capacity(total);

    for (layer, spec) in specs.iter().enumerate() {
        let centers = get_default_box_centers(spec, image_size);
        let sizes = get_default_boxes(spec, image_size);

        debug!(
            layer,
            grid_size = spec.grid_size,
            scale = spec.scale(image_size),
            boxes = spec.prior_count(),
            "generating priors"
        );

        for center_y in &centers {
            for center_x in &centers {
                for (height, width) in &sizes {
                    priors.push(PriorBox::new(*center_x, *center_y, *height, *width));
                }
            }
        }
    }

    if clip {
        priors.iter_mut().for_each(|prior| *prior = prior.clip());
    }

    Ok(priors)
}

/// Generates the SSD300 priors: default table, 300 pixel input, clipped.
pub fn generate_default_priors() -> Result<Vec<PriorBox>> {
    generate_priors(&default_specs(), IMAGE_SIZE, CLIP)
}

/// Packs priors into a dense tensor of shape `[num_priors, 4]`.
///
/// e.g. [p0, p1, p2] -> [[cx, cy, h, w], [cx, cy, h, w], [cx, cy, h, w]]
///
/// Values are handed over as `f64` and converted once to the backend float type, an
/// `f64` backend keeps them bit for bit.
pub fn priors_to_tensor<B: Backend>(priors: &[PriorBox], device: &B::Device) -> Tensor<B, 2> {
    let flat: Vec<f64> = priors.iter().flat_map(|prior| prior.as_array()).collect();

    Tensor::<B, 2>::from_data(TensorData::new(flat, [priors.len(), 4]), device)
}

/// Splits a tensor of bounding boxes in any 4 component format (cxcyhw, xyxy, ect..) into
/// individual columns.
///
/// # Arguments
///
/// * `boxes` - Tensor of shape [num_boxes, 4].
///
/// # Returns
///
/// * Tuple of four tensors `(c1, c2, c3, c4)` each of shape [num_boxes, 1].
pub fn boxes_to_components<B: Backend>(
    boxes: Tensor<B, 2>,
) -> (Tensor<B, 2>, Tensor<B, 2>, Tensor<B, 2>, Tensor<B, 2>) {
    (
        boxes.clone().slice(s![.., 0]),
        boxes.clone().slice(s![.., 1]),
        boxes.clone().slice(s![.., 2]),
        boxes.slice(s![.., 3]),
    )
}

/// Converts a tensor of priors from center format (cx, cy, h, w) to corner
/// format (x1, y1, x2, y2).
///
/// # Arguments
///
/// * `a` - Tensor of shape [num_boxes, 4] in cxcyhw format.
///
/// # Returns
///
/// * `Tensor<B, 2>` - Tensor of shape [num_boxes, 4] in xyxy format.
pub fn cxcyhw_to_x1y1x2y2<B: Backend>(a: Tensor<B, 2>) -> Tensor<B, 2> {
    let (cx, cy, h, w) = boxes_to_components(a);

    Tensor::cat(
        vec![
            cx.clone() - w.clone() * 0.5,
            cy.clone() - h.clone() * 0.5,
            cx + w * 0.5,
            cy + h * 0.5,
        ],
        1,
    )
}
