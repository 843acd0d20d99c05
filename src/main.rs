use burn::{
    backend::{NdArray, ndarray::NdArrayDevice},
    prelude::Backend,
    tensor::Tensor,
};
use ssd_priors::{
    PriorBox,
    boxes::{cxcyhw_to_x1y1x2y2, priors_to_tensor},
    config::{BoxFormat, PriorsConfig, SSDPriorsCmd},
    debug::set_tensor_dbg_precision,
    init_tracing,
    layers::{default_specs, select_layers},
};
use tracing::{error, info};

fn main() {
    type B = NdArray<f64>;
    let device = NdArrayDevice::default();

    init_tracing();

    let cli_cmd: SSDPriorsCmd = argh::from_env();

    match run::<B>(&cli_cmd, &device) {
        Ok(output) => println!("{}", output),
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    }
}

/// Builds the prior config described by the command line.
fn priors_config(cli_cmd: &SSDPriorsCmd) -> ssd_priors::Result<PriorsConfig> {
    let specs = match &cli_cmd.layers {
        Some(names) => select_layers(names)?,
        None => default_specs(),
    };

    Ok(PriorsConfig::new(specs)
        .with_image_size(cli_cmd.image_size)
        .with_clip(!cli_cmd.no_clip))
}

fn box_tensor<B: Backend>(priors: &[PriorBox], format: BoxFormat, device: &B::Device) -> Tensor<B, 2> {
    let boxes = priors_to_tensor::<B>(priors, device);

    match format {
        BoxFormat::CxCyHw => boxes,
        BoxFormat::Xyxy => cxcyhw_to_x1y1x2y2(boxes),
    }
}

fn summary(config: &PriorsConfig, total: usize) -> String {
    let mut lines = vec![config.to_string()];

    for (k, spec) in config.specs.iter().enumerate() {
        lines.push(format!(
            "layer {}: {}x{} grid, {} boxes per cell, {} priors",
            k + 1,
            spec.grid_size,
            spec.grid_size,
            spec.box_count_per_cell(),
            spec.prior_count()
        ));
    }
    lines.push(format!("total: {}", total));

    lines.join("\n")
}

/// Generates the priors for `cli_cmd` and renders what gets printed.
fn run<B: Backend>(cli_cmd: &SSDPriorsCmd, device: &B::Device) -> ssd_priors::Result<String> {
    let config = priors_config(cli_cmd)?;

    info!(
        layers = config.specs.len(),
        image_size = config.image_size,
        clip = config.clip,
        "generating priors"
    );

    let priors = config.generate()?;

    info!(priors = priors.len(), "generated priors");

    if cli_cmd.summary {
        return Ok(summary(&config, priors.len()));
    }

    if let Some(precision) = cli_cmd.precision {
        set_tensor_dbg_precision(precision);
    }

    Ok(format!("boxes: {}", box_tensor::<B>(&priors, cli_cmd.format, device)))
}
