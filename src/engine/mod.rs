use std::f32::consts::TAU;

use glam::Vec3;
use rand::Rng;
use tracing::{debug, warn};

use crate::catalog::{CategoryCatalog, CategoryId};
use crate::errors::{StrewnError, StrewnResult};
use crate::field::{coordinates, HeightField};
use crate::layout::{Deficiency, PlacedInstance, PlacementRun, RunWarning};
use crate::nav::NavigationService;

pub mod spacing;
pub mod streams;

use spacing::SpacingField;
use streams::CategoryStreams;

/// Engine-wide placement settings.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Attempt budget multiplier: a category gets `target * this` candidate
    /// draws before giving up.
    pub max_attempts_per_item: u32,
    /// Slope ceiling in degrees for categories without their own limit.
    pub default_max_slope: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_attempts_per_item: 200,
            default_max_slope: 45.0,
        }
    }
}

impl EngineConfig {
    pub fn check(&self) -> StrewnResult<()> {
        if self.max_attempts_per_item == 0 {
            return Err(StrewnError::InvalidConfig {
                reason: "max_attempts_per_item must be at least 1".to_string(),
            });
        }
        if !(0.0..=90.0).contains(&self.default_max_slope) {
            return Err(StrewnError::InvalidConfig {
                reason: format!(
                    "default_max_slope must be within [0, 90] degrees, got {}",
                    self.default_max_slope
                ),
            });
        }
        Ok(())
    }
}

struct NavigationSetup<'a> {
    service: &'a dyn NavigationService,
    start: Vec3,
    sample_radius: f32,
}

/// Constraint-driven scatter placement over a height field.
///
/// Each run processes catalog categories in order. Candidates are drawn by
/// rejection sampling and pass through a fixed check sequence: height gate,
/// slope gate, world resolution, spacing, then reachability. The sequence
/// and the RNG discipline (dedicated count and sample streams per category,
/// yaw drawn only on acceptance) are what make runs reproducible from a
/// seed, so neither may be reordered.
pub struct PlacementEngine<'a> {
    field: &'a dyn HeightField,
    config: EngineConfig,
    navigation: Option<NavigationSetup<'a>>,
}

impl<'a> PlacementEngine<'a> {
    pub fn new(field: &'a dyn HeightField, config: EngineConfig) -> Self {
        Self {
            field,
            config,
            navigation: None,
        }
    }

    /// Enable reachability checking: every accepted instance must be
    /// connected to `start` by a complete path. `start` itself is snapped
    /// onto navigable space once per run using `sample_radius`.
    pub fn with_navigation(
        mut self,
        service: &'a dyn NavigationService,
        start: Vec3,
        sample_radius: f32,
    ) -> Self {
        self.navigation = Some(NavigationSetup {
            service,
            start,
            sample_radius,
        });
        self
    }

    /// Execute one placement run.
    ///
    /// `seed` pins the run for reproduction; `None` draws a fresh seed. The
    /// seed actually used is recorded in the result either way.
    pub fn run(
        &self,
        catalog: &CategoryCatalog,
        seed: Option<u64>,
    ) -> StrewnResult<PlacementRun> {
        catalog.check()?;
        self.config.check()?;

        let extent = self.field.extent();
        if extent.is_degenerate() {
            return Err(StrewnError::InvalidField {
                reason: "Cannot place over a degenerate field extent".to_string(),
            });
        }

        let run_seed = seed.unwrap_or_else(rand::random);
        debug!("Placement run started with seed {run_seed}");

        let mut warnings = Vec::new();

        // Resolve the navigation start once. Failure downgrades the whole
        // run to unchecked reachability instead of aborting it.
        let navigation = match &self.navigation {
            Some(setup) => match setup.service.sample_position(setup.start, setup.sample_radius) {
                Some(start) => Some((setup, start)),
                None => {
                    let reason = format!(
                        "no navigable point within {:.1} of start ({:.1}, {:.1}, {:.1})",
                        setup.sample_radius, setup.start.x, setup.start.y, setup.start.z
                    );
                    warn!("Reachability checks disabled: {reason}");
                    warnings.push(RunWarning::NavigationDisabled { reason });
                    None
                }
            },
            None => None,
        };

        let mut placements = Vec::new();
        let mut deficiencies = Vec::new();
        let mut occupied = SpacingField::new();
        let mut order: u32 = 0;

        for (index, category) in catalog.categories.iter().enumerate() {
            let id = CategoryId(index as u32);
            let mut streams = CategoryStreams::derive(run_seed, index as u32);

            let target = streams
                .count
                .gen_range(category.min_count..=category.max_count);
            let budget = target as u64 * self.config.max_attempts_per_item as u64;
            let slope_limit = category.max_slope.unwrap_or(self.config.default_max_slope);

            let mut placed: u32 = 0;
            let mut attempts: u64 = 0;

            while placed < target && attempts < budget {
                attempts += 1;

                // Each attempt draws exactly u then v. Rejections must not
                // consume anything further or replay diverges.
                let u: f32 = streams.sample.gen_range(0.0..1.0);
                let v: f32 = streams.sample.gen_range(0.0..1.0);

                // 1. Height gate on the normalized surface height.
                let height = self.field.height(u, v);
                if let Some(min_height) = category.min_height {
                    if height < min_height {
                        continue;
                    }
                }
                if let Some(max_height) = category.max_height {
                    if height > max_height {
                        continue;
                    }
                }

                // 2. Slope gate.
                if self.field.slope(u, v) > slope_limit {
                    continue;
                }

                // 3. Resolve the candidate into world space.
                let (world_x, world_z) = coordinates::uv_to_world(&extent, u, v);
                let world_y = self.field.sample_world_height(world_x, world_z);
                let mut candidate = Vec3::new(world_x, world_y, world_z);

                // 4. Spacing against everything placed so far this run.
                if !occupied.is_clear(candidate, category.min_spacing) {
                    continue;
                }

                // 5. Reachability from the run's start point. The accepted
                // position becomes the snapped point.
                if let Some((setup, start)) = &navigation {
                    let Some(snapped) = setup
                        .service
                        .sample_position(candidate, setup.sample_radius)
                    else {
                        continue;
                    };
                    if !setup.service.compute_path(*start, snapped).is_complete() {
                        continue;
                    }
                    candidate = snapped;
                }

                let yaw: f32 = streams.sample.gen_range(0.0..TAU);
                occupied.push(candidate);
                placements.push(PlacedInstance {
                    category: id,
                    position: candidate,
                    yaw,
                    order,
                });
                order += 1;
                placed += 1;
            }

            debug!(
                "Category '{}': placed {placed}/{target} after {attempts} attempts",
                category.name
            );

            if placed < category.min_count {
                warn!(
                    "Category '{}' fell short of its minimum: {placed}/{}",
                    category.name, category.min_count
                );
                deficiencies.push(Deficiency {
                    category: category.name.clone(),
                    placed,
                    min_count: category.min_count,
                });
            }
        }

        Ok(PlacementRun {
            seed: run_seed,
            placements,
            deficiencies,
            warnings,
        })
    }
}
