//! Format catalog: size estimation and quality option resolution

pub mod models;
pub mod resolver;
pub mod size;

pub use models::{Catalog, QualityOption, ResolutionTag};
pub use resolver::{build_catalog, choose_best_audio};
pub use size::{estimate_from_bitrate, resolve_stream_size};
