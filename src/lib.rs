pub mod boxes;
pub mod config;
pub mod debug;
pub mod error;
pub mod layers;
pub mod specs;

pub use boxes::{PriorBox, count_priors, generate_default_priors, generate_priors};
pub use error::{PriorError, Result};
pub use layers::{SSDConvLayers, default_specs};
pub use specs::{BoxSizeRange, LayerSpec};

/// Installs a `tracing` subscriber filtered by `RUST_LOG`.
///
/// Only binaries should call this, the library never installs a subscriber itself.
pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();
}
