use noise::{NoiseFn, Perlin};

/// Coherent 2D noise used to wobble growing leaves.
///
/// Thin wrapper over Perlin noise so the growth engine only sees a seeded
/// `f32` sampler in roughly \[-1, 1\].
#[derive(Clone, Debug)]
pub struct JitterNoise {
    perlin: Perlin,
}

impl JitterNoise {
    pub fn new(seed: u32) -> Self {
        Self {
            perlin: Perlin::new(seed),
        }
    }

    #[inline]
    pub fn sample(&self, x: f32, y: f32) -> f32 {
        self.perlin.get([x as f64, y as f64]) as f32
    }
}

impl Default for JitterNoise {
    fn default() -> Self {
        Self::new(0)
    }
}
