//! Population snapshots, landscapes and the simulation model interface.
//!
//! - `Species`: immutable snapshot of one species at one timestep.
//! - `Landscape`: raster layers the individuals live on.
//! - `Model`: capability interface of an external simulation engine.
//! - `RecordedModel`: `Model` implementation replaying a snapshot database.

pub mod landscape;
pub mod model;
pub mod population;
pub mod replay;

pub use landscape::{Landscape, Layer};
pub use model::{Model, WalkMode};
pub use population::Species;
pub use replay::{ModelParams, RecordedModel};
