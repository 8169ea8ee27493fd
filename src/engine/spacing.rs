use glam::Vec3;

/// Run-scoped record of every accepted position, queried for spacing checks.
///
/// Spacing is checked against all instances placed so far in the run,
/// regardless of category, using the candidate's own `min_spacing`. The
/// comparison is strict: a distance of exactly `min_spacing` is allowed.
#[derive(Debug, Default)]
pub struct SpacingField {
    positions: Vec<Vec3>,
}

impl SpacingField {
    pub fn new() -> Self {
        Self {
            positions: Vec::new(),
        }
    }

    /// True when `position` keeps at least `min_spacing` to every stored
    /// point. Distances are full 3D world-space distances.
    pub fn is_clear(&self, position: Vec3, min_spacing: f32) -> bool {
        let min_sq = min_spacing * min_spacing;
        self.positions
            .iter()
            .all(|placed| placed.distance_squared(position) >= min_sq)
    }

    /// Record an accepted position.
    pub fn push(&mut self, position: Vec3) {
        self.positions.push(position);
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}
