use thiserror::Error;

/// Everything that can go wrong while configuring or generating a plant.
///
/// Configuration errors are reported by [`crate::PlantConfig::validate`] before
/// any geometry exists; the remaining variants come out of `generate` and leave
/// the previous instance set untouched.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PlantError {
    #[error("invalid vessel: {reason} (height={height}, radius={radius}, bevel={bevel})")]
    InvalidVessel {
        reason: &'static str,
        height: f32,
        radius: f32,
        bevel: f32,
    },
    #[error("invalid leaf layout: {stem_segments} stem segments x {leaves_per_segment} leaves")]
    InvalidLayout {
        stem_segments: usize,
        leaves_per_segment: usize,
    },
    #[error("invalid growth timing: {0}")]
    InvalidTiming(&'static str),
    #[error("invalid leaf shape: {0}")]
    InvalidLeafShape(&'static str),
    #[error("frame number must be finite, got {0}")]
    InvalidFrame(f32),
    #[error("stem curve has no length")]
    DegenerateStem,
    #[error("leaf {index} produced a non-finite transform")]
    NonFiniteTransform { index: usize },
}
