use glam::Vec3;
use pathfinding::prelude::{astar, build_path, dijkstra_all};
use tracing::debug;

use crate::errors::{StrewnError, StrewnResult};
use crate::field::{coordinates, FieldExtent, HeightField};

/// Base cost of one grid step, scaled for integer A* math.
const BASE_STEP_COST: f32 = 10.0;
/// Linear factor applied to the height change between adjacent cells.
const SLOPE_COST_FACTOR: f32 = 0.5;

/// Outcome of a path query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathStatus {
    /// The path reaches the requested goal.
    Complete,
    /// The path ends at the closest reachable point short of the goal.
    Partial,
    /// No path exists, or an endpoint was invalid.
    None,
}

/// A polyline path through navigable space.
#[derive(Debug, Clone)]
pub struct NavPath {
    pub status: PathStatus,
    /// Direction-change points from start to end. Empty when `status` is
    /// `None`.
    pub corners: Vec<Vec3>,
}

impl NavPath {
    pub fn none() -> Self {
        Self {
            status: PathStatus::None,
            corners: Vec::new(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.status == PathStatus::Complete
    }
}

/// Navigation queries the placement engine needs: snapping positions onto
/// navigable space and testing connectivity between two points.
pub trait NavigationService {
    /// Nearest navigable point within `radius` of `position`, or `None` if
    /// there is none.
    fn sample_position(&self, position: Vec3, radius: f32) -> Option<Vec3>;

    /// Path between two world positions.
    fn compute_path(&self, from: Vec3, to: Vec3) -> NavPath;
}

/// A single cell in the navigation grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct GridCell {
    x: u32,
    z: u32,
}

impl GridCell {
    fn new(x: u32, z: u32) -> Self {
        Self { x, z }
    }

    /// 4-directional neighbors within the grid bounds.
    fn neighbors(&self, width: u32, depth: u32) -> Vec<GridCell> {
        let mut neighbors = Vec::new();
        if self.z > 0 {
            neighbors.push(GridCell::new(self.x, self.z - 1));
        }
        if self.z < depth - 1 {
            neighbors.push(GridCell::new(self.x, self.z + 1));
        }
        if self.x > 0 {
            neighbors.push(GridCell::new(self.x - 1, self.z));
        }
        if self.x < width - 1 {
            neighbors.push(GridCell::new(self.x + 1, self.z));
        }
        neighbors
    }

    fn euclidean_distance(&self, other: &GridCell) -> f32 {
        let dx = self.x as f32 - other.x as f32;
        let dz = self.z as f32 - other.z as f32;
        (dx * dx + dz * dz).sqrt()
    }

    fn distance_squared(&self, other: &GridCell) -> i64 {
        let dx = self.x as i64 - other.x as i64;
        let dz = self.z as i64 - other.z as i64;
        dx * dx + dz * dz
    }
}

/// Grid-based navigation over a height field.
///
/// Walkability is derived from the field's slope at each cell center; paths
/// run through 4-connected walkable cells with a climb penalty on the step
/// cost.
#[derive(Debug, Clone)]
pub struct GridNavigator {
    walkable: Vec<bool>,
    /// World-space height at each cell center.
    heights: Vec<f32>,
    width: u32,
    depth: u32,
    cell_width: f32,
    cell_depth: f32,
    extent: FieldExtent,
}

impl GridNavigator {
    /// Build a navigator by sampling `field` on a `resolution` x `resolution`
    /// grid of cell centers. Cells steeper than `max_walkable_slope` degrees
    /// are blocked.
    pub fn from_field(
        field: &dyn HeightField,
        resolution: u32,
        max_walkable_slope: f32,
    ) -> StrewnResult<Self> {
        if resolution < 2 {
            return Err(StrewnError::InvalidField {
                reason: format!("Navigation grid resolution must be at least 2, got {resolution}"),
            });
        }
        if !(0.0..=90.0).contains(&max_walkable_slope) {
            return Err(StrewnError::InvalidField {
                reason: format!(
                    "max_walkable_slope must be within [0, 90] degrees, got {max_walkable_slope}"
                ),
            });
        }

        let extent = field.extent();
        if extent.is_degenerate() {
            return Err(StrewnError::InvalidField {
                reason: "Cannot build a navigation grid over a degenerate extent".to_string(),
            });
        }

        let total_cells = (resolution * resolution) as usize;
        let mut walkable = Vec::with_capacity(total_cells);
        let mut heights = Vec::with_capacity(total_cells);
        let cell_width = extent.width / resolution as f32;
        let cell_depth = extent.length / resolution as f32;

        for z in 0..resolution {
            for x in 0..resolution {
                let world_x = (x as f32 + 0.5) * cell_width;
                let world_z = (z as f32 + 0.5) * cell_depth;
                let u = world_x / extent.width;
                let v = world_z / extent.length;

                heights.push(field.sample_world_height(world_x, world_z));
                walkable.push(field.slope(u, v) <= max_walkable_slope);
            }
        }

        let blocked = walkable.iter().filter(|&&w| !w).count();
        debug!(
            "Navigation grid: {resolution}x{resolution} cells, {blocked}/{total_cells} blocked"
        );

        Ok(Self {
            walkable,
            heights,
            width: resolution,
            depth: resolution,
            cell_width,
            cell_depth,
            extent,
        })
    }

    fn index(&self, cell: GridCell) -> usize {
        (cell.z * self.width + cell.x) as usize
    }

    fn is_walkable(&self, cell: GridCell) -> bool {
        if cell.x >= self.width || cell.z >= self.depth {
            return false;
        }
        self.walkable.get(self.index(cell)).copied().unwrap_or(false)
    }

    fn height_at(&self, cell: GridCell) -> f32 {
        self.heights.get(self.index(cell)).copied().unwrap_or(0.0)
    }

    /// Fraction of cells an agent can stand on.
    pub fn walkable_fraction(&self) -> f32 {
        if self.walkable.is_empty() {
            return 0.0;
        }
        let open = self.walkable.iter().filter(|&&w| w).count();
        open as f32 / self.walkable.len() as f32
    }

    pub fn resolution(&self) -> u32 {
        self.width
    }

    /// World position of a cell center, with the sampled surface height.
    fn cell_center(&self, cell: GridCell) -> Vec3 {
        Vec3::new(
            (cell.x as f32 + 0.5) * self.cell_width,
            self.height_at(cell),
            (cell.z as f32 + 0.5) * self.cell_depth,
        )
    }

    /// Containing cell for a world position, or `None` outside the field.
    fn world_to_cell(&self, position: Vec3) -> Option<GridCell> {
        if !coordinates::world_in_extent(&self.extent, position.x, position.z) {
            return None;
        }
        let x = ((position.x / self.cell_width) as u32).min(self.width - 1);
        let z = ((position.z / self.cell_depth) as u32).min(self.depth - 1);
        Some(GridCell::new(x, z))
    }

    /// Step cost between adjacent cells: base cost plus a climb penalty.
    fn movement_cost(&self, from: GridCell, to: GridCell) -> u32 {
        let rise = (self.height_at(to) - self.height_at(from)).abs();
        let cost = BASE_STEP_COST * (1.0 + rise * SLOPE_COST_FACTOR);
        cost as u32
    }

    /// Reach toward an unreachable goal: path to the reachable cell closest
    /// to it. Ties resolve by cell coordinates so results stay reproducible.
    fn partial_path_toward(&self, start: GridCell, goal: GridCell) -> NavPath {
        let parents = dijkstra_all(&start, |cell| {
            let current = *cell;
            cell.neighbors(self.width, self.depth)
                .into_iter()
                .filter(|n| self.is_walkable(*n))
                .map(|n| (n, self.movement_cost(current, n)))
                .collect::<Vec<_>>()
        });

        let best = parents
            .keys()
            .copied()
            .chain(std::iter::once(start))
            .min_by_key(|cell| (cell.distance_squared(&goal), cell.x, cell.z));

        let Some(best) = best else {
            return NavPath::none();
        };

        let cells = if best == start {
            vec![start]
        } else {
            build_path(&best, &parents)
        };

        NavPath {
            status: PathStatus::Partial,
            corners: self.cells_to_corners(&cells),
        }
    }

    /// Convert a cell path to world corners, dropping cells that continue in
    /// a straight line.
    fn cells_to_corners(&self, cells: &[GridCell]) -> Vec<Vec3> {
        let mut corners = Vec::new();
        for (i, cell) in cells.iter().enumerate() {
            if i > 0 && i + 1 < cells.len() {
                let prev = cells[i - 1];
                let next = cells[i + 1];
                let incoming = (cell.x as i64 - prev.x as i64, cell.z as i64 - prev.z as i64);
                let outgoing = (next.x as i64 - cell.x as i64, next.z as i64 - cell.z as i64);
                if incoming == outgoing {
                    continue;
                }
            }
            corners.push(self.cell_center(*cell));
        }
        corners
    }
}

impl NavigationService for GridNavigator {
    fn sample_position(&self, position: Vec3, radius: f32) -> Option<Vec3> {
        if !position.is_finite() || !radius.is_finite() || radius < 0.0 {
            return None;
        }

        // Scan the cell neighborhood covered by the radius, keeping the
        // nearest walkable center. Iteration order breaks ties, which keeps
        // the result deterministic.
        let reach_x = (radius / self.cell_width).ceil() as i64 + 1;
        let reach_z = (radius / self.cell_depth).ceil() as i64 + 1;
        let anchor_x = (position.x / self.cell_width).floor() as i64;
        let anchor_z = (position.z / self.cell_depth).floor() as i64;

        let mut best: Option<(f32, GridCell)> = None;
        for z in (anchor_z - reach_z)..=(anchor_z + reach_z) {
            for x in (anchor_x - reach_x)..=(anchor_x + reach_x) {
                if x < 0 || z < 0 || x >= self.width as i64 || z >= self.depth as i64 {
                    continue;
                }
                let cell = GridCell::new(x as u32, z as u32);
                if !self.is_walkable(cell) {
                    continue;
                }

                let center = self.cell_center(cell);
                let dx = center.x - position.x;
                let dz = center.z - position.z;
                let distance = (dx * dx + dz * dz).sqrt();
                if distance > radius {
                    continue;
                }
                if best.is_none_or(|(best_distance, _)| distance < best_distance) {
                    best = Some((distance, cell));
                }
            }
        }

        best.map(|(_, cell)| self.cell_center(cell))
    }

    fn compute_path(&self, from: Vec3, to: Vec3) -> NavPath {
        let Some(start) = self.world_to_cell(from) else {
            return NavPath::none();
        };
        if !self.is_walkable(start) {
            return NavPath::none();
        }
        let Some(goal) = self.world_to_cell(to) else {
            return NavPath::none();
        };

        if !self.is_walkable(goal) {
            return self.partial_path_toward(start, goal);
        }

        let result = astar(
            &start,
            |cell| {
                let current = *cell;
                cell.neighbors(self.width, self.depth)
                    .into_iter()
                    .filter(|n| self.is_walkable(*n))
                    .map(|n| (n, self.movement_cost(current, n)))
                    .collect::<Vec<_>>()
            },
            |cell| (cell.euclidean_distance(&goal) * 10.0) as u32,
            |cell| *cell == goal,
        );

        match result {
            Some((cells, _cost)) => NavPath {
                status: PathStatus::Complete,
                corners: self.cells_to_corners(&cells),
            },
            None => self.partial_path_toward(start, goal),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{FieldExtent, TerrainField};

    /// Flat field except for an impassably steep band across the middle
    /// (u in [0.4, 0.6)), spanning the full depth.
    struct WallField;

    impl HeightField for WallField {
        fn height(&self, _u: f32, _v: f32) -> f32 {
            0.0
        }

        fn slope(&self, u: f32, _v: f32) -> f32 {
            if (0.4..0.6).contains(&u) { 80.0 } else { 0.0 }
        }

        fn extent(&self) -> FieldExtent {
            FieldExtent::new(100.0, 100.0, 0.0, 1.0)
        }

        fn sample_world_height(&self, _x: f32, _z: f32) -> f32 {
            0.0
        }
    }

    fn flat_navigator() -> GridNavigator {
        let field = TerrainField::flat(16, 16, 0.5, FieldExtent::new(100.0, 100.0, 0.0, 10.0))
            .expect("flat field should build");
        GridNavigator::from_field(&field, 20, 45.0).expect("navigator should build")
    }

    #[test]
    fn test_rejects_bad_parameters() {
        let field = TerrainField::flat(8, 8, 0.0, FieldExtent::new(50.0, 50.0, 0.0, 5.0)).unwrap();
        assert!(GridNavigator::from_field(&field, 1, 45.0).is_err());
        assert!(GridNavigator::from_field(&field, 16, 95.0).is_err());
        assert!(GridNavigator::from_field(&field, 16, -1.0).is_err());
    }

    #[test]
    fn test_flat_field_is_fully_walkable() {
        let nav = flat_navigator();
        assert_eq!(nav.walkable_fraction(), 1.0);
    }

    #[test]
    fn test_flat_field_path_is_complete() {
        let nav = flat_navigator();
        let from = Vec3::new(10.0, 5.0, 10.0);
        let to = Vec3::new(90.0, 5.0, 90.0);

        let path = nav.compute_path(from, to);
        assert_eq!(path.status, PathStatus::Complete);
        assert!(path.corners.len() >= 2);

        let first = path.corners.first().unwrap();
        let last = path.corners.last().unwrap();
        assert!(first.distance(from) < 8.0, "path should begin near 'from'");
        assert!(last.distance(to) < 8.0, "path should end near 'to'");
    }

    #[test]
    fn test_straight_path_compresses_to_two_corners() {
        let nav = flat_navigator();
        let path = nav.compute_path(Vec3::new(12.5, 0.0, 52.5), Vec3::new(87.5, 0.0, 52.5));
        assert_eq!(path.status, PathStatus::Complete);
        assert_eq!(
            path.corners.len(),
            2,
            "a straight run should keep only its endpoints, got {:?}",
            path.corners
        );
    }

    #[test]
    fn test_wall_gives_partial_path() {
        let nav = GridNavigator::from_field(&WallField, 20, 45.0).unwrap();
        let path = nav.compute_path(Vec3::new(10.0, 0.0, 50.0), Vec3::new(90.0, 0.0, 50.0));

        assert_eq!(path.status, PathStatus::Partial);
        let last = path.corners.last().expect("partial path should have corners");
        assert!(
            last.x < 40.0,
            "partial path must stop before the wall, ended at x={}",
            last.x
        );
    }

    #[test]
    fn test_start_inside_wall_returns_none() {
        let nav = GridNavigator::from_field(&WallField, 20, 45.0).unwrap();
        let path = nav.compute_path(Vec3::new(50.0, 0.0, 50.0), Vec3::new(90.0, 0.0, 50.0));
        assert_eq!(path.status, PathStatus::None);
        assert!(path.corners.is_empty());
    }

    #[test]
    fn test_out_of_bounds_endpoints_return_none() {
        let nav = flat_navigator();
        assert_eq!(
            nav.compute_path(Vec3::new(-5.0, 0.0, 10.0), Vec3::new(50.0, 0.0, 50.0)).status,
            PathStatus::None
        );
        assert_eq!(
            nav.compute_path(Vec3::new(50.0, 0.0, 50.0), Vec3::new(50.0, 0.0, 500.0)).status,
            PathStatus::None
        );
    }

    #[test]
    fn test_sample_position_snaps_to_cell_center() {
        let nav = flat_navigator();
        let snapped = nav
            .sample_position(Vec3::new(33.0, 0.0, 67.0), 10.0)
            .expect("flat field should always snap");

        // Cell size is 5, so the nearest center is within half a diagonal.
        assert!(snapped.distance(Vec3::new(33.0, 5.0, 67.0)) < 5.0);
    }

    #[test]
    fn test_sample_position_escapes_the_wall() {
        let nav = GridNavigator::from_field(&WallField, 20, 45.0).unwrap();
        let inside = Vec3::new(50.0, 0.0, 50.0);

        assert!(nav.sample_position(inside, 2.0).is_none());

        let snapped = nav
            .sample_position(inside, 15.0)
            .expect("a wide radius should reach past the band");
        assert!(!(40.0..60.0).contains(&snapped.x), "snapped into the band");
        let dx = snapped.x - inside.x;
        let dz = snapped.z - inside.z;
        assert!((dx * dx + dz * dz).sqrt() <= 15.0);
    }

    #[test]
    fn test_sample_position_rejects_bad_radius() {
        let nav = flat_navigator();
        assert!(nav.sample_position(Vec3::ZERO, -1.0).is_none());
        assert!(nav.sample_position(Vec3::ZERO, f32::NAN).is_none());
    }
}
