use crate::{
    error::{PriorError, Result},
    specs::LayerSpec,
};

/// Convolutional feature map layers used in the SSD300 (Single Shot MultiBox Detector) architecture.
///
/// Each variant represents a specific convolutional layer over which the SSD model
/// tiles prior (default) boxes. The layers are listed in the order their priors are
/// emitted, from early, high-resolution layers to deeper, lower-resolution layers.
/// Relevant excerpt from
///
/// “SSD: Single Shot MultiBox Detector”
/// Authors: Wei Liu, Dragomir Anguelov, Dumitru Erhan, Christian Szegedy,
///          Scott Reed, Cheng-Yang Fu, Alexander C. Berg
/// Link (official): https://arxiv.org/abs/1512.02325
///
/// - Liu et al. - Pg 3
///
/// Multi-scale feature maps for detection
///
/// We add convolutional feature layers to the end of the truncated base network. These
/// layers decrease in size progressively and allow predictions of detections at multiple
/// scales.
///
#[repr(usize)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SSDConvLayers {
    /// `Conv4_3` — fourth VGG16 convolution block, 38×38.
    Conv4_3,
    /// `Conv7` — converted fully connected layer (originally FC7 in VGG16), 19×19.
    Conv7,
    /// `Conv8_2` — additional SSD feature extraction layer, 10×10.
    Conv8_2,
    /// `Conv9_2` — additional SSD feature extraction layer, 5×5.
    Conv9_2,
    /// `Conv10_2` — additional SSD feature extraction layer, 3×3.
    Conv10_2,
    /// `Conv11_2` — final SSD feature extraction layer, 1×1.
    Conv11_2,
}

impl SSDConvLayers {
    /// Returns all SSD convolution layers in the order their priors are generated.
    ///
    pub fn as_list() -> Vec<SSDConvLayers> {
        vec![
            SSDConvLayers::Conv4_3,
            SSDConvLayers::Conv7,
            SSDConvLayers::Conv8_2,
            SSDConvLayers::Conv9_2,
            SSDConvLayers::Conv10_2,
            SSDConvLayers::Conv11_2,
        ]
    }

    /// Returns the total number of convolution layers used for SSD predictions.
    ///
    pub fn count() -> usize {
        Self::as_list().len()
    }

    /// Returns a 1-based numeric identifier for the layer variant.
    ///
    pub fn get_id(&self) -> usize {
        *self as usize + 1
    }

    /// Lower case layer name as accepted on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            SSDConvLayers::Conv4_3 => "conv4_3",
            SSDConvLayers::Conv7 => "conv7",
            SSDConvLayers::Conv8_2 => "conv8_2",
            SSDConvLayers::Conv9_2 => "conv9_2",
            SSDConvLayers::Conv10_2 => "conv10_2",
            SSDConvLayers::Conv11_2 => "conv11_2",
        }
    }

    pub fn from_name(name: &str) -> Option<SSDConvLayers> {
        let name = name.trim().to_ascii_lowercase();
        Self::as_list().into_iter().find(|layer| layer.name() == name)
    }

    /// Returns the prior box specification of the layer for a 300x300 input.
    ///
    /// | grid | stride | min | max | aspect ratios |
    /// |------|--------|-----|-----|---------------|
    /// | 38   | 8      | 30  | 60  | 2             |
    /// | 19   | 16     | 60  | 111 | 2, 3          |
    /// | 10   | 32     | 111 | 162 | 2, 3          |
    /// | 5    | 64     | 162 | 213 | 2, 3          |
    /// | 3    | 100    | 213 | 264 | 2             |
    /// | 1    | 300    | 264 | 315 | 2             |
    ///
    pub fn spec(&self) -> LayerSpec {
        match self {
            SSDConvLayers::Conv4_3 => LayerSpec::new(38, 8.0, 30.0, 60.0, vec![2.0]),
            SSDConvLayers::Conv7 => LayerSpec::new(19, 16.0, 60.0, 111.0, vec![2.0, 3.0]),
            SSDConvLayers::Conv8_2 => LayerSpec::new(10, 32.0, 111.0, 162.0, vec![2.0, 3.0]),
            SSDConvLayers::Conv9_2 => LayerSpec::new(5, 64.0, 162.0, 213.0, vec![2.0, 3.0]),
            SSDConvLayers::Conv10_2 => LayerSpec::new(3, 100.0, 213.0, 264.0, vec![2.0]),
            SSDConvLayers::Conv11_2 => LayerSpec::new(1, 300.0, 264.0, 315.0, vec![2.0]),
        }
    }
}

/// The SSD300 prior specification table, one entry per layer in detection order.
pub fn default_specs() -> Vec<LayerSpec> {
    SSDConvLayers::as_list().iter().map(|layer| layer.spec()).collect()
}

/// Resolves a comma separated list of layer names (e.g `conv4_3,conv7`) into their
/// specs, keeping the given order.
pub fn select_layers(names: &str) -> Result<Vec<LayerSpec>> {
    names
        .split(',')
        .filter(|name| !name.trim().is_empty())
        .map(|name| {
            SSDConvLayers::from_name(name)
                .map(|layer| layer.spec())
                .ok_or_else(|| PriorError::invalid_argument(format!("unknown layer '{}'", name)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_as_list_order_and_contents() {
        let layers = SSDConvLayers::as_list();
        assert_eq!(layers.len(), 6);
        assert!(matches!(layers[0], SSDConvLayers::Conv4_3));
        assert!(matches!(layers[1], SSDConvLayers::Conv7));
        assert!(matches!(layers[2], SSDConvLayers::Conv8_2));
        assert!(matches!(layers[3], SSDConvLayers::Conv9_2));
        assert!(matches!(layers[4], SSDConvLayers::Conv10_2));
        assert!(matches!(layers[5], SSDConvLayers::Conv11_2));
    }

    #[test]
    fn test_count_matches_default_table() {
        assert_eq!(SSDConvLayers::count(), default_specs().len());
    }

    #[test]
    fn test_get_id_is_one_based() {
        let layers = SSDConvLayers::as_list();
        for (index, layer) in layers.iter().enumerate() {
            assert_eq!(layer.get_id(), index + 1);
        }
    }

    #[test]
    fn test_name_round_trip() {
        for layer in SSDConvLayers::as_list() {
            assert_eq!(SSDConvLayers::from_name(layer.name()), Some(layer));
        }
        assert_eq!(SSDConvLayers::from_name(" Conv7 "), Some(SSDConvLayers::Conv7));
        assert_eq!(SSDConvLayers::from_name("fc7"), None);
    }

    #[test]
    fn test_default_specs_table() {
        let specs = default_specs();
        let grids: Vec<usize> = specs.iter().map(|s| s.grid_size).collect();
        let strides: Vec<f64> = specs.iter().map(|s| s.stride).collect();
        let mins: Vec<f64> = specs.iter().map(|s| s.box_sizes.min_size).collect();
        let maxs: Vec<f64> = specs.iter().map(|s| s.box_sizes.max_size).collect();

        assert_eq!(grids, [38, 19, 10, 5, 3, 1]);
        assert_eq!(strides, [8.0, 16.0, 32.0, 64.0, 100.0, 300.0]);
        assert_eq!(mins, [30.0, 60.0, 111.0, 162.0, 213.0, 264.0]);
        assert_eq!(maxs, [60.0, 111.0, 162.0, 213.0, 264.0, 315.0]);
        assert_eq!(specs[0].aspect_ratios, [2.0]);
        assert_eq!(specs[1].aspect_ratios, [2.0, 3.0]);
        assert_eq!(specs[5].aspect_ratios, [2.0]);
    }

    #[test]
    fn test_default_specs_are_valid() {
        for spec in default_specs() {
            assert!(spec.validate().is_ok());
        }
    }

    #[test]
    fn test_select_layers() {
        let specs = select_layers("conv11_2, conv4_3").unwrap();
        assert_eq!(specs, vec![SSDConvLayers::Conv11_2.spec(), SSDConvLayers::Conv4_3.spec()]);

        assert!(select_layers("").unwrap().is_empty());

        let err = select_layers("conv7,fc7").unwrap_err();
        assert!(matches!(err, PriorError::InvalidArgument { .. }));
    }
}
