use noise::{NoiseFn, Perlin};

/// Coherent 3D noise sampled as `(x, y, time_slice)`.
///
/// Implementations must be deterministic for a given construction and return values
/// in `[0, 1]`.
pub trait NoiseSource {
    fn sample(&self, x: f64, y: f64, z: f64) -> f64;
}

/// Fractal Perlin noise: 4 octaves, each at double frequency and half amplitude.
#[derive(Clone, Debug)]
pub struct PerlinNoise {
    perlin: Perlin,
    octaves: u32,
    falloff: f64,
}

impl PerlinNoise {
    pub const DEFAULT_OCTAVES: u32 = 4;
    pub const DEFAULT_FALLOFF: f64 = 0.5;

    pub fn new(seed: u32) -> Self {
        Self {
            perlin: Perlin::new(seed),
            octaves: Self::DEFAULT_OCTAVES,
            falloff: Self::DEFAULT_FALLOFF,
        }
    }

    pub fn with_detail(mut self, octaves: u32, falloff: f64) -> Self {
        self.octaves = octaves.max(1);
        self.falloff = falloff.clamp(0.0, 1.0);
        self
    }
}

impl NoiseSource for PerlinNoise {
    fn sample(&self, x: f64, y: f64, z: f64) -> f64 {
        let mut amp = 1.0;
        let mut freq = 1.0;
        let mut sum = 0.0;
        let mut norm = 0.0;

        for _ in 0..self.octaves {
            sum += self.perlin.get([x * freq, y * freq, z * freq]) * amp;
            norm += amp;
            amp *= self.falloff;
            freq *= 2.0;
        }

        let val = if norm > 0.0 { sum / norm } else { 0.0 };
        ((val + 1.0) * 0.5).clamp(0.0, 1.0)
    }
}

impl<N: NoiseSource + ?Sized> NoiseSource for &N {
    fn sample(&self, x: f64, y: f64, z: f64) -> f64 {
        (**self).sample(x, y, z)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/field/noise.rs"]
mod tests;
