use burn::config::Config;
use {argh::FromArgs, std::fmt::Debug};

// The `Config` derive expands to code naming a bare `Result`, keep it unshadowed here.
use crate::{
    boxes::{PriorBox, generate_priors},
    layers::default_specs,
    specs::LayerSpec,
};

pub const IMAGE_SIZE: f64 = 300.0;
pub const CLIP: bool = true;

/// “SSD: Single Shot MultiBox Detector”
/// Authors: Wei Liu, Dragomir Anguelov, Dumitru Erhan, Christian Szegedy,
///          Scott Reed, Cheng-Yang Fu, Alexander C. Berg
/// Link (official): https://arxiv.org/abs/1512.02325
///
/// Everything needed to generate a set of priors: the layer table, the input image
/// size the strides and box sizes refer to, and whether boxes are clipped to the image.
///
/// The config is built by the caller, `PriorsConfig::ssd300()` gives the SSD300 setup.
#[derive(Config, Debug)]
pub struct PriorsConfig {
    pub specs: Vec<LayerSpec>,
    #[config(default = 300.0)]
    pub image_size: f64,
    #[config(default = true)]
    pub clip: bool,
}

impl PriorsConfig {
    pub fn ssd300() -> Self {
        Self::new(default_specs())
    }

    pub fn generate(&self) -> crate::Result<Vec<PriorBox>> {
        generate_priors(&self.specs, self.image_size, self.clip)
    }
}

#[derive(FromArgs, PartialEq, Debug)]
/// Generate SSD prior (default) boxes and print them
pub struct SSDPriorsCmd {
    #[argh(option, short = 's', default = "IMAGE_SIZE")]
    /// input image size in pixels the layer strides and box sizes refer to (default 300)
    pub image_size: f64,
    #[argh(switch)]
    /// keep values outside of [0, 1] instead of clipping them
    pub no_clip: bool,
    #[argh(option, short = 'l')]
    /// comma separated SSD300 layers to generate priors for, in order e.g 'conv4_3,conv7'
    pub layers: Option<String>,
    #[argh(option, short = 'f', default = "BoxFormat::CxCyHw", from_str_fn(parse_format))]
    /// output box format, 'cxcyhw' (default) or 'xyxy'
    pub format: BoxFormat,
    #[argh(option, short = 'p')]
    /// number of decimals used when printing boxes
    pub precision: Option<usize>,
    #[argh(switch)]
    /// only print the number of priors per layer
    pub summary: bool,
}

#[derive(PartialEq, Debug, Clone, Copy)]
pub enum BoxFormat {
    /// center x, center y, height, width
    CxCyHw,
    /// top left x, top left y, bottom right x, bottom right y
    Xyxy,
}

fn parse_format(value: &str) -> std::result::Result<BoxFormat, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "cxcyhw" => Ok(BoxFormat::CxCyHw),
        "xyxy" => Ok(BoxFormat::Xyxy),
        other => Err(format!("unknown box format '{}', expected 'cxcyhw' or 'xyxy'", other)),
    }
}
