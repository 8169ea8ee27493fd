use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::errors::{StrewnError, StrewnResult};

pub mod coordinates;
pub mod generation;

/// World-space footprint of a height field.
///
/// The footprint is corner-origin: world X spans [0, width] and world Z
/// spans [0, length]. World height is `origin_y + normalized * height_scale`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldExtent {
    pub width: f32,
    pub length: f32,
    pub origin_y: f32,
    pub height_scale: f32,
}

impl FieldExtent {
    pub fn new(width: f32, length: f32, origin_y: f32, height_scale: f32) -> Self {
        Self {
            width,
            length,
            origin_y,
            height_scale,
        }
    }

    /// A degenerate extent cannot support placement; the engine refuses to
    /// run against one.
    pub fn is_degenerate(&self) -> bool {
        !(self.width.is_finite()
            && self.length.is_finite()
            && self.origin_y.is_finite()
            && self.height_scale.is_finite())
            || self.width <= 0.0
            || self.length <= 0.0
            || self.height_scale < 0.0
    }
}

/// Narrow read-only capability over the host terrain system.
///
/// The placement engine consumes this trait instead of a concrete terrain
/// type so tests can substitute deterministic fakes.
pub trait HeightField {
    /// Normalized height in [0, 1] at normalized (u, v). Queries outside
    /// the unit square clamp to the boundary.
    fn height(&self, u: f32, v: f32) -> f32;

    /// Surface slope in degrees [0, 90) at normalized (u, v).
    fn slope(&self, u: f32, v: f32) -> f32;

    /// World-space footprint of the field.
    fn extent(&self) -> FieldExtent;

    /// World-space height (Y) at a world XZ position. Positions outside the
    /// footprint clamp to the nearest edge.
    fn sample_world_height(&self, x: f32, z: f32) -> f32;
}

/// Height field backed by a row-major grid of normalized samples.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TerrainField {
    #[validate(range(min = 2, max = 4096))]
    pub resolution_x: u32,
    #[validate(range(min = 2, max = 4096))]
    pub resolution_z: u32,
    /// Flattened 2D array (row-major), every sample in [0, 1].
    pub heights: Vec<f32>,
    pub extent: FieldExtent,
}

impl TerrainField {
    /// Create a new terrain field with validation.
    pub fn new(
        resolution_x: u32,
        resolution_z: u32,
        heights: Vec<f32>,
        extent: FieldExtent,
    ) -> StrewnResult<Self> {
        let expected_size = (resolution_x * resolution_z) as usize;
        if heights.len() != expected_size {
            return Err(StrewnError::InvalidField {
                reason: format!(
                    "Heights array size {} does not match field resolution {}x{} (expected {})",
                    heights.len(),
                    resolution_x,
                    resolution_z,
                    expected_size
                ),
            });
        }

        if extent.is_degenerate() {
            return Err(StrewnError::InvalidField {
                reason: format!("Degenerate extent: {extent:?}"),
            });
        }

        if let Some(bad) = heights.iter().find(|h| !(0.0..=1.0).contains(*h)) {
            return Err(StrewnError::InvalidField {
                reason: format!("Height sample {bad} is outside the normalized range [0, 1]"),
            });
        }

        let field = Self {
            resolution_x,
            resolution_z,
            heights,
            extent,
        };

        field.validate().map_err(|_| StrewnError::InvalidField {
            reason: "Field resolution validation failed".to_string(),
        })?;

        Ok(field)
    }

    /// Create a uniform field at a fixed normalized height, for testing and
    /// for the flat generation preset.
    pub fn flat(
        resolution_x: u32,
        resolution_z: u32,
        height: f32,
        extent: FieldExtent,
    ) -> StrewnResult<Self> {
        let heights = vec![height; (resolution_x * resolution_z) as usize];
        Self::new(resolution_x, resolution_z, heights, extent)
    }

    /// World-space distance between neighboring samples on each axis.
    pub fn cell_size(&self) -> (f32, f32) {
        (
            self.extent.width / (self.resolution_x - 1) as f32,
            self.extent.length / (self.resolution_z - 1) as f32,
        )
    }

    /// Slope at a grid cell from forward differences of world heights.
    fn slope_at_cell(&self, x: u32, z: u32) -> f32 {
        let h_center = coordinates::height_at_cell(self, x, z).unwrap_or(0.0);
        let h_right = coordinates::height_at_cell(self, (x + 1).min(self.resolution_x - 1), z)
            .unwrap_or(h_center);
        let h_up = coordinates::height_at_cell(self, x, (z + 1).min(self.resolution_z - 1))
            .unwrap_or(h_center);

        let (cell_w, cell_l) = self.cell_size();
        let dx = (h_right - h_center) * self.extent.height_scale / cell_w;
        let dz = (h_up - h_center) * self.extent.height_scale / cell_l;

        (dx * dx + dz * dz).sqrt().atan().to_degrees()
    }
}

impl HeightField for TerrainField {
    fn height(&self, u: f32, v: f32) -> f32 {
        coordinates::sample_height_bilinear(self, u, v)
    }

    fn slope(&self, u: f32, v: f32) -> f32 {
        let (gx, gz) = coordinates::uv_to_grid(self, u, v);
        self.slope_at_cell(gx.round() as u32, gz.round() as u32)
    }

    fn extent(&self) -> FieldExtent {
        self.extent
    }

    fn sample_world_height(&self, x: f32, z: f32) -> f32 {
        let (u, v) = coordinates::world_to_uv(&self.extent, x, z);
        let normalized = coordinates::sample_height_bilinear(self, u, v);
        self.extent.origin_y + normalized * self.extent.height_scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extent() -> FieldExtent {
        FieldExtent::new(100.0, 100.0, 2.0, 20.0)
    }

    #[test]
    fn test_terrain_field_creation() {
        let field = TerrainField::new(2, 2, vec![0.0, 0.25, 0.5, 1.0], extent()).unwrap();
        assert_eq!(field.resolution_x, 2);
        assert_eq!(field.resolution_z, 2);
        assert_eq!(field.heights.len(), 4);
    }

    #[test]
    fn test_terrain_field_invalid_size() {
        let result = TerrainField::new(2, 2, vec![0.0, 0.25, 0.5], extent());
        assert!(result.is_err());
    }

    #[test]
    fn test_terrain_field_rejects_out_of_range_heights() {
        let result = TerrainField::new(2, 2, vec![0.0, 0.25, 0.5, 1.5], extent());
        assert!(result.is_err(), "heights above 1.0 should be rejected");
        let result = TerrainField::new(2, 2, vec![0.0, -0.1, 0.5, 1.0], extent());
        assert!(result.is_err(), "negative heights should be rejected");
    }

    #[test]
    fn test_terrain_field_rejects_degenerate_extent() {
        let bad = FieldExtent::new(0.0, 100.0, 0.0, 20.0);
        assert!(TerrainField::flat(4, 4, 0.5, bad).is_err());
        let bad = FieldExtent::new(100.0, 100.0, 0.0, -1.0);
        assert!(TerrainField::flat(4, 4, 0.5, bad).is_err());
    }

    #[test]
    fn test_terrain_field_rejects_single_sample_axis() {
        let result = TerrainField::flat(1, 4, 0.5, extent());
        assert!(result.is_err(), "resolution below 2 should fail validation");
    }

    #[test]
    fn test_flat_field_heights() {
        let field = TerrainField::flat(3, 3, 0.4, extent()).unwrap();
        assert!(field.heights.iter().all(|&h| h == 0.4));
        assert_eq!(field.height(0.5, 0.5), 0.4);
        assert_eq!(field.slope(0.5, 0.5), 0.0);
    }

    #[test]
    fn test_world_height_sampling() {
        let field = TerrainField::flat(3, 3, 0.5, extent()).unwrap();
        // origin_y 2.0 + 0.5 * height_scale 20.0
        let y = field.sample_world_height(50.0, 50.0);
        assert!((y - 12.0).abs() < 1e-5, "expected 12.0, got {y}");
    }

    #[test]
    fn test_slope_of_uniform_ramp() {
        // Heights rise 0.0 -> 1.0 across 100 world units with height_scale
        // 100, so the gradient is 1.0 and the slope is 45 degrees.
        let ramp_extent = FieldExtent::new(100.0, 100.0, 0.0, 100.0);
        let field = TerrainField::new(
            3,
            3,
            vec![0.0, 0.5, 1.0, 0.0, 0.5, 1.0, 0.0, 0.5, 1.0],
            ramp_extent,
        )
        .unwrap();

        let slope = field.slope(0.0, 0.5);
        assert!(
            (slope - 45.0).abs() < 0.5,
            "expected ~45 degrees, got {slope}"
        );
    }

    #[test]
    fn test_usable_as_trait_object() {
        let field = TerrainField::flat(3, 3, 0.3, extent()).unwrap();
        let dyn_field: &dyn HeightField = &field;
        assert_eq!(dyn_field.height(0.1, 0.9), 0.3);
        assert_eq!(dyn_field.extent().width, 100.0);
    }
}
