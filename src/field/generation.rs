use noise::{MultiFractal, NoiseFn, Perlin, RidgedMulti};

use super::{FieldExtent, TerrainField};
use crate::errors::StrewnResult;

/// Field generation algorithms. Output is always normalized into [0, 1];
/// vertical amplitude is carried by `FieldExtent::height_scale`.
#[derive(Debug, Clone)]
pub enum FieldAlgorithm {
    Flat {
        /// Normalized height of the whole field.
        height: f32,
    },
    Perlin {
        frequency: f64,
        octaves: u32,
    },
    Ridged {
        frequency: f64,
        octaves: u32,
    },
}

/// Main field generator struct
#[derive(Debug, Clone)]
pub struct FieldGenerator {
    pub seed: u32,
    pub algorithm: FieldAlgorithm,
}

impl FieldGenerator {
    /// Create a new field generator
    pub fn new(seed: u32, algorithm: FieldAlgorithm) -> Self {
        Self { seed, algorithm }
    }

    /// Generate a terrain field using the configured algorithm.
    pub fn generate(
        &self,
        resolution_x: u32,
        resolution_z: u32,
        extent: FieldExtent,
    ) -> StrewnResult<TerrainField> {
        let total_points = (resolution_x * resolution_z) as usize;
        let mut heights = Vec::with_capacity(total_points);

        match &self.algorithm {
            FieldAlgorithm::Flat { height } => {
                heights.resize(total_points, *height);
            }
            FieldAlgorithm::Perlin { frequency, octaves } => {
                let perlin = Perlin::new(self.seed);

                // Octave sum stays inside [-total_amplitude, total_amplitude],
                // which remaps exactly onto [0, 1].
                let mut total_amplitude = 0.0;
                let mut amplitude = 1.0;
                for _ in 0..*octaves {
                    total_amplitude += amplitude;
                    amplitude *= 0.5;
                }

                for z in 0..resolution_z {
                    let base_z = z as f64 * frequency;
                    for x in 0..resolution_x {
                        let base_x = x as f64 * frequency;

                        let mut noise_value = 0.0;
                        let mut current_amplitude = 1.0;
                        let mut current_frequency = 1.0;

                        for _ in 0..*octaves {
                            noise_value += perlin
                                .get([base_x * current_frequency, base_z * current_frequency])
                                * current_amplitude;
                            current_amplitude *= 0.5; // Persistence
                            current_frequency *= 2.0; // Lacunarity
                        }

                        let normalized = 0.5 * (noise_value / total_amplitude + 1.0);
                        heights.push(normalized.clamp(0.0, 1.0) as f32);
                    }
                }
            }
            FieldAlgorithm::Ridged { frequency, octaves } => {
                let ridged = RidgedMulti::<Perlin>::new(self.seed)
                    .set_octaves(*octaves as usize)
                    .set_frequency(*frequency);

                for z in 0..resolution_z {
                    for x in 0..resolution_x {
                        let value = ridged.get([x as f64, z as f64]);
                        let normalized = 0.5 * (value + 1.0);
                        heights.push(normalized.clamp(0.0, 1.0) as f32);
                    }
                }
            }
        }

        TerrainField::new(resolution_x, resolution_z, heights, extent)
    }
}

/// Get a predefined field preset
pub fn get_field_preset(name: &str, seed: Option<u32>) -> Option<FieldGenerator> {
    let seed = seed.unwrap_or_else(rand::random);

    match name {
        "plains" => Some(FieldGenerator::new(
            seed,
            FieldAlgorithm::Flat { height: 0.25 },
        )),
        "hills" => Some(FieldGenerator::new(
            seed,
            FieldAlgorithm::Perlin {
                frequency: 0.02,
                octaves: 4,
            },
        )),
        "highlands" => Some(FieldGenerator::new(
            seed,
            FieldAlgorithm::Ridged {
                frequency: 0.008,
                octaves: 5,
            },
        )),
        "dunes" => Some(FieldGenerator::new(
            seed,
            FieldAlgorithm::Perlin {
                frequency: 0.06,
                octaves: 2,
            },
        )),
        _ => None,
    }
}
