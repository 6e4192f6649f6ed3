//! Procedural geometry and growth animation for a plant grown inside a glass
//! vessel.
//!
//! The crate has no platform dependencies: the web and native frontends feed
//! it frame counts, read back the instance transform buffer and the static
//! leaf mesh, and react to growth events through [`GrowthObserver`].

pub mod bezier;
pub mod clock;
pub mod constants;
pub mod cues;
pub mod easing;
pub mod error;
pub mod growth;
pub mod jitter;
pub mod leaf;
pub mod plant;
pub mod state;
pub mod vessel;

pub use bezier::{map_arc_length, CubicBezier};
pub use clock::FrameClock;
pub use constants::*;
pub use cues::*;
pub use easing::*;
pub use error::PlantError;
pub use growth::*;
pub use jitter::JitterNoise;
pub use leaf::*;
pub use plant::*;
pub use state::*;
pub use vessel::*;
