use super::{FieldExtent, TerrainField};

/// Convert a normalized (u, v) pair to world XZ using the field extent.
///
/// The mapping is corner-origin: (0, 0) is the world origin corner and
/// (1, 1) is (width, length).
pub fn uv_to_world(extent: &FieldExtent, u: f32, v: f32) -> (f32, f32) {
    (u * extent.width, v * extent.length)
}

/// Convert world XZ back to normalized (u, v). Unclamped; callers that need
/// a domain guarantee should check `world_in_extent` first.
pub fn world_to_uv(extent: &FieldExtent, x: f32, z: f32) -> (f32, f32) {
    (x / extent.width, z / extent.length)
}

/// Check whether a world XZ position lies inside the field footprint.
pub fn world_in_extent(extent: &FieldExtent, x: f32, z: f32) -> bool {
    x >= 0.0 && z >= 0.0 && x <= extent.width && z <= extent.length
}

/// Convert normalized (u, v) to fractional grid coordinates, clamping into
/// the domain so boundary queries always resolve to a sample.
pub fn uv_to_grid(field: &TerrainField, u: f32, v: f32) -> (f32, f32) {
    let gx = u.clamp(0.0, 1.0) * (field.resolution_x - 1) as f32;
    let gz = v.clamp(0.0, 1.0) * (field.resolution_z - 1) as f32;
    (gx, gz)
}

/// Get the normalized height at an exact grid cell (no interpolation).
pub fn height_at_cell(field: &TerrainField, x: u32, z: u32) -> Option<f32> {
    if x >= field.resolution_x || z >= field.resolution_z {
        return None;
    }
    let index = (z * field.resolution_x + x) as usize;
    field.heights.get(index).copied()
}

/// Sample the normalized height at (u, v) using bilinear interpolation.
///
/// Inputs outside [0,1] clamp to the boundary, so this is a total function
/// over the whole plane.
pub fn sample_height_bilinear(field: &TerrainField, u: f32, v: f32) -> f32 {
    let (gx, gz) = uv_to_grid(field, u, v);

    let x0 = gx.floor() as u32;
    let z0 = gz.floor() as u32;
    let x1 = (x0 + 1).min(field.resolution_x - 1);
    let z1 = (z0 + 1).min(field.resolution_z - 1);

    let fx = gx.fract();
    let fz = gz.fract();

    // The four corners always resolve after the clamp above.
    let h00 = height_at_cell(field, x0, z0).unwrap_or(0.0);
    let h10 = height_at_cell(field, x1, z0).unwrap_or(0.0);
    let h01 = height_at_cell(field, x0, z1).unwrap_or(0.0);
    let h11 = height_at_cell(field, x1, z1).unwrap_or(0.0);

    let h0 = h00 * (1.0 - fx) + h10 * fx;
    let h1 = h01 * (1.0 - fx) + h11 * fx;

    h0 * (1.0 - fz) + h1 * fz
}
