use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::catalog::CategoryId;
use crate::errors::{StrewnError, StrewnResult};

/// One accepted artifact instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacedInstance {
    pub category: CategoryId,
    /// Final world position. When navigation is active this is the snapped
    /// point returned by the path check, not the raw terrain sample.
    pub position: Vec3,
    /// Heading around the world up axis, radians in [0, 2π).
    pub yaw: f32,
    /// Global acceptance index, increasing across the whole run.
    pub order: u32,
}

/// A category that finished below its minimum count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deficiency {
    pub category: String,
    pub placed: u32,
    pub min_count: u32,
}

/// Non-fatal degradations recorded during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunWarning {
    /// The navigation start point could not be resolved, so reachability
    /// checks were skipped for the entire run.
    NavigationDisabled { reason: String },
}

/// Complete result of one placement run.
///
/// Instances appear in acceptance order, which also groups them by catalog
/// order since categories are processed sequentially.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacementRun {
    /// Seed the run actually used. Always concrete, even when the caller
    /// asked for a random one, so the run can be reproduced.
    pub seed: u64,
    pub placements: Vec<PlacedInstance>,
    pub deficiencies: Vec<Deficiency>,
    pub warnings: Vec<RunWarning>,
}

impl PlacementRun {
    pub fn total_count(&self) -> usize {
        self.placements.len()
    }

    /// Instances of one category, in acceptance order.
    pub fn instances_of(&self, id: CategoryId) -> impl Iterator<Item = &PlacedInstance> {
        self.placements.iter().filter(move |p| p.category == id)
    }

    pub fn placed_count(&self, id: CategoryId) -> usize {
        self.instances_of(id).count()
    }

    pub fn met_all_minimums(&self) -> bool {
        self.deficiencies.is_empty()
    }

    /// Check internal consistency. Used after loading from disk, where the
    /// bytes may not come from this library.
    pub fn check(&self) -> StrewnResult<()> {
        for (index, instance) in self.placements.iter().enumerate() {
            if instance.order != index as u32 {
                return Err(StrewnError::InvalidLayoutData {
                    reason: format!(
                        "Instance at index {index} has order {}, expected {index}",
                        instance.order
                    ),
                });
            }
            if !instance.position.is_finite() {
                return Err(StrewnError::InvalidLayoutData {
                    reason: format!("Instance {index} has a non-finite position"),
                });
            }
            if !instance.yaw.is_finite() {
                return Err(StrewnError::InvalidLayoutData {
                    reason: format!("Instance {index} has a non-finite yaw"),
                });
            }
        }

        for deficiency in &self.deficiencies {
            if deficiency.placed >= deficiency.min_count {
                return Err(StrewnError::InvalidLayoutData {
                    reason: format!(
                        "Deficiency for '{}' reports {} placed against a minimum of {}",
                        deficiency.category, deficiency.placed, deficiency.min_count
                    ),
                });
            }
        }

        Ok(())
    }

    /// Save the run to a binary file.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> StrewnResult<()> {
        let encoded = bincode::serde::encode_to_vec(self, bincode::config::standard()).map_err(
            |e| StrewnError::LayoutSerializationFailed {
                reason: e.to_string(),
            },
        )?;

        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, encoded)?;
        Ok(())
    }

    /// Load a run from a binary file, validating its contents.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> StrewnResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(StrewnError::LayoutFileNotFound {
                path: path.to_path_buf(),
            });
        }

        let data = std::fs::read(path)?;
        let (run, _): (Self, usize) =
            bincode::serde::decode_from_slice(&data, bincode::config::standard()).map_err(|e| {
                StrewnError::CorruptedLayoutFile {
                    reason: e.to_string(),
                }
            })?;

        run.check()?;
        Ok(run)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_run() -> PlacementRun {
        PlacementRun {
            seed: 99,
            placements: vec![
                PlacedInstance {
                    category: CategoryId(0),
                    position: Vec3::new(10.0, 1.0, 20.0),
                    yaw: 1.25,
                    order: 0,
                },
                PlacedInstance {
                    category: CategoryId(0),
                    position: Vec3::new(40.0, 2.0, 60.0),
                    yaw: 4.5,
                    order: 1,
                },
                PlacedInstance {
                    category: CategoryId(1),
                    position: Vec3::new(70.0, 0.5, 15.0),
                    yaw: 0.0,
                    order: 2,
                },
            ],
            deficiencies: vec![Deficiency {
                category: "totem".to_string(),
                placed: 0,
                min_count: 1,
            }],
            warnings: vec![RunWarning::NavigationDisabled {
                reason: "start point off the walkable grid".to_string(),
            }],
        }
    }

    #[test]
    fn test_per_category_queries() {
        let run = sample_run();
        assert_eq!(run.total_count(), 3);
        assert_eq!(run.placed_count(CategoryId(0)), 2);
        assert_eq!(run.placed_count(CategoryId(1)), 1);
        assert_eq!(run.placed_count(CategoryId(7)), 0);
        assert!(!run.met_all_minimums());
    }

    #[test]
    fn test_check_accepts_consistent_run() {
        sample_run().check().expect("sample run should be valid");
    }

    #[test]
    fn test_check_rejects_broken_order() {
        let mut run = sample_run();
        run.placements[2].order = 9;
        assert!(matches!(
            run.check(),
            Err(StrewnError::InvalidLayoutData { .. })
        ));
    }

    #[test]
    fn test_check_rejects_satisfied_deficiency() {
        let mut run = sample_run();
        run.deficiencies[0].placed = 5;
        assert!(run.check().is_err());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("layout.bin");

        let run = sample_run();
        run.save_to_file(&path).expect("save should succeed");

        let loaded = PlacementRun::load_from_file(&path).expect("load should succeed");
        assert_eq!(loaded.seed, run.seed);
        assert_eq!(loaded.total_count(), run.total_count());
        assert_eq!(loaded.placements[1].position, run.placements[1].position);
        assert_eq!(loaded.placements[1].yaw, run.placements[1].yaw);
        assert_eq!(loaded.deficiencies, run.deficiencies);
        assert_eq!(loaded.warnings, run.warnings);
    }

    #[test]
    fn test_load_missing_file() {
        let result = PlacementRun::load_from_file("no/such/layout.bin");
        assert!(matches!(
            result,
            Err(StrewnError::LayoutFileNotFound { .. })
        ));
    }

    #[test]
    fn test_load_corrupted_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garbage.bin");
        std::fs::write(&path, [0xFFu8; 64]).unwrap();

        let result = PlacementRun::load_from_file(&path);
        assert!(matches!(
            result,
            Err(StrewnError::CorruptedLayoutFile { .. })
        ));
    }
}
