//! Level-of-detail assembly for composite models
//!
//! This crate turns a model made of material-tagged mesh fragments into an
//! ordered [`LodSpec`]:
//! - Partitioning fragments into one flattened mesh per material
//! - Decimating each material group and regrouping the results by level
//! - Combining each level into one multi-group mesh
//! - Planning the visibility threshold of every level

pub mod config;
pub mod partition;
pub mod levels;
pub mod combine;
pub mod thresholds;
pub mod pipeline;

pub use config::*;
pub use partition::*;
pub use levels::*;
pub use combine::*;
pub use thresholds::*;
pub use pipeline::*;
