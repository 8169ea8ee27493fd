use std::collections::HashSet;
use std::path::Path;

use derive_more::{Display, From};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::errors::{StrewnError, StrewnResult};

/// Index of a category in its catalog (stable for the catalog's lifetime).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, From, Serialize, Deserialize, PartialOrd, Ord,
)]
pub struct CategoryId(pub u32);

/// One placeable artifact category: identity, visual descriptor (opaque to
/// the placement engine), and placement constraints.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Category {
    /// Unique human-readable name (used for lookup and reporting).
    pub name: String,

    /// Visual shape hint, passed through untouched.
    #[serde(default = "default_shape")]
    pub shape: String,

    /// Linear RGB tint, passed through untouched.
    #[serde(default = "default_tint")]
    pub tint: [f32; 3],

    /// Per-instance scale applied by the consumer.
    #[serde(default = "default_scale")]
    pub scale: Vec3,

    /// Instance count bounds; the target count is drawn uniformly from
    /// [min_count, max_count] per run.
    #[validate(range(min = 0, max = 10000))]
    pub min_count: u32,
    #[validate(range(min = 0, max = 10000))]
    pub max_count: u32,

    /// Minimum distance (world units) to every already-placed instance.
    pub min_spacing: f32,

    /// Normalized height gate; `None` leaves that side unconstrained.
    #[serde(default)]
    #[validate(range(min = 0.0, max = 1.0))]
    pub min_height: Option<f32>,
    #[serde(default)]
    #[validate(range(min = 0.0, max = 1.0))]
    pub max_height: Option<f32>,

    /// Maximum slope in degrees; `None` uses the run's global default.
    #[serde(default)]
    #[validate(range(min = 0.0, max = 90.0))]
    pub max_slope: Option<f32>,
}

fn default_shape() -> String {
    "block".to_string()
}

fn default_tint() -> [f32; 3] {
    [0.8, 0.8, 0.8]
}

fn default_scale() -> Vec3 {
    Vec3::ONE
}

impl Category {
    /// Create a category with neutral visuals and no height/slope gates.
    pub fn new(
        name: impl Into<String>,
        min_count: u32,
        max_count: u32,
        min_spacing: f32,
    ) -> StrewnResult<Self> {
        let category = Self {
            name: name.into(),
            shape: default_shape(),
            tint: default_tint(),
            scale: default_scale(),
            min_count,
            max_count,
            min_spacing,
            min_height: None,
            max_height: None,
            max_slope: None,
        };
        category.check()?;
        Ok(category)
    }

    /// Validate field ranges and the cross-field rules that the derive
    /// cannot express.
    pub fn check(&self) -> StrewnResult<()> {
        self.validate().map_err(|e| StrewnError::InvalidCatalog {
            reason: format!("Category '{name}' failed validation: {e}", name = self.name),
        })?;

        if self.name.trim().is_empty() {
            return Err(StrewnError::InvalidCatalog {
                reason: "Category name must not be empty".to_string(),
            });
        }

        if self.min_count > self.max_count {
            return Err(StrewnError::InvalidCatalog {
                reason: format!(
                    "Category '{}': min_count {} exceeds max_count {}",
                    self.name, self.min_count, self.max_count
                ),
            });
        }

        if !self.min_spacing.is_finite() || self.min_spacing <= 0.0 {
            return Err(StrewnError::InvalidCatalog {
                reason: format!(
                    "Category '{}': min_spacing must be a positive finite number, got {}",
                    self.name, self.min_spacing
                ),
            });
        }

        Ok(())
    }
}

/// Ordered list of placeable categories. Instance ids and result lists
/// follow this order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryCatalog {
    pub categories: Vec<Category>,
}

impl CategoryCatalog {
    /// Create a catalog with validation: every category must pass its own
    /// checks and names must be unique.
    pub fn new(categories: Vec<Category>) -> StrewnResult<Self> {
        let catalog = Self { categories };
        catalog.check()?;
        Ok(catalog)
    }

    /// Re-run full validation; the engine calls this before placement since
    /// the fields are public.
    pub fn check(&self) -> StrewnResult<()> {
        let mut seen = HashSet::new();
        for category in &self.categories {
            category.check()?;
            if !seen.insert(category.name.as_str()) {
                return Err(StrewnError::InvalidCatalog {
                    reason: format!("Duplicate category name '{}'", category.name),
                });
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn get(&self, id: CategoryId) -> Option<&Category> {
        self.categories.get(id.0 as usize)
    }

    /// Look up a category id by name.
    pub fn index_of(&self, name: &str) -> Option<CategoryId> {
        self.categories
            .iter()
            .position(|c| c.name == name)
            .map(|i| CategoryId(i as u32))
    }

    /// Load a catalog from a TOML file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> StrewnResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(StrewnError::CatalogFileNotFound {
                path: path.to_path_buf(),
            });
        }

        let contents = std::fs::read_to_string(path)?;
        let catalog: CategoryCatalog = toml::from_str(&contents)?;
        catalog.check()?;
        Ok(catalog)
    }

    /// Save the catalog to a TOML file.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> StrewnResult<()> {
        self.check()?;
        let contents = toml::to_string_pretty(self)?;
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, contents)?;
        Ok(())
    }
}

impl Default for CategoryCatalog {
    /// The built-in artifact set: a spread of count/spacing/height/slope
    /// profiles that exercises every constraint kind.
    fn default() -> Self {
        Self {
            categories: vec![
                Category {
                    name: "monolith".to_string(),
                    shape: "monolith".to_string(),
                    tint: [0.35, 0.32, 0.38],
                    scale: Vec3::new(1.5, 4.0, 1.5),
                    min_count: 2,
                    max_count: 4,
                    min_spacing: 25.0,
                    min_height: Some(0.35),
                    max_height: Some(0.9),
                    max_slope: Some(20.0),
                },
                Category {
                    name: "cairn".to_string(),
                    shape: "cairn".to_string(),
                    tint: [0.55, 0.52, 0.48],
                    scale: Vec3::ONE,
                    min_count: 6,
                    max_count: 12,
                    min_spacing: 8.0,
                    min_height: None,
                    max_height: None,
                    max_slope: None,
                },
                Category {
                    name: "crystal".to_string(),
                    shape: "crystal".to_string(),
                    tint: [0.45, 0.75, 0.95],
                    scale: Vec3::new(0.8, 1.6, 0.8),
                    min_count: 3,
                    max_count: 8,
                    min_spacing: 12.0,
                    min_height: Some(0.5),
                    max_height: Some(1.0),
                    max_slope: Some(35.0),
                },
                Category {
                    name: "totem".to_string(),
                    shape: "totem".to_string(),
                    tint: [0.6, 0.45, 0.3],
                    scale: Vec3::new(1.0, 2.5, 1.0),
                    min_count: 1,
                    max_count: 2,
                    min_spacing: 40.0,
                    min_height: None,
                    max_height: Some(0.6),
                    max_slope: Some(15.0),
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_creation() {
        let category = Category::new("obelisk", 1, 5, 10.0).unwrap();
        assert_eq!(category.name, "obelisk");
        assert_eq!(category.min_count, 1);
        assert_eq!(category.max_count, 5);
        assert_eq!(category.scale, Vec3::ONE);
        assert!(category.min_height.is_none());
    }

    #[test]
    fn test_category_rejects_inverted_counts() {
        let result = Category::new("obelisk", 5, 1, 10.0);
        assert!(result.is_err());
        let message = result.unwrap_err().to_string();
        assert!(message.contains("min_count"), "got: {message}");
    }

    #[test]
    fn test_category_rejects_bad_spacing() {
        assert!(Category::new("obelisk", 1, 2, 0.0).is_err());
        assert!(Category::new("obelisk", 1, 2, -3.0).is_err());
        assert!(Category::new("obelisk", 1, 2, f32::NAN).is_err());
    }

    #[test]
    fn test_category_rejects_out_of_range_gates() {
        let mut category = Category::new("obelisk", 1, 2, 5.0).unwrap();
        category.min_height = Some(1.5);
        assert!(category.check().is_err(), "min_height above 1.0 must fail");

        let mut category = Category::new("obelisk", 1, 2, 5.0).unwrap();
        category.max_slope = Some(120.0);
        assert!(category.check().is_err(), "max_slope above 90 must fail");
    }

    #[test]
    fn test_catalog_rejects_duplicate_names() {
        let result = CategoryCatalog::new(vec![
            Category::new("cairn", 1, 2, 5.0).unwrap(),
            Category::new("cairn", 2, 3, 6.0).unwrap(),
        ]);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Duplicate"));
    }

    #[test]
    fn test_catalog_lookup() {
        let catalog = CategoryCatalog::new(vec![
            Category::new("cairn", 1, 2, 5.0).unwrap(),
            Category::new("crystal", 2, 3, 6.0).unwrap(),
        ])
        .unwrap();

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.index_of("crystal"), Some(CategoryId(1)));
        assert_eq!(catalog.index_of("missing"), None);
        assert_eq!(catalog.get(CategoryId(0)).unwrap().name, "cairn");
        assert!(catalog.get(CategoryId(9)).is_none());
    }

    #[test]
    fn test_default_catalog_is_valid() {
        let catalog = CategoryCatalog::default();
        assert!(!catalog.is_empty());
        catalog.check().expect("built-in catalog should validate");
    }

    #[test]
    fn test_catalog_toml_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("relics.toml");

        let catalog = CategoryCatalog::default();
        catalog.save_to_file(&path).unwrap();

        let loaded = CategoryCatalog::load_from_file(&path).unwrap();
        assert_eq!(loaded.len(), catalog.len());
        for (saved, loaded) in catalog.categories.iter().zip(&loaded.categories) {
            assert_eq!(saved.name, loaded.name);
            assert_eq!(saved.min_count, loaded.min_count);
            assert_eq!(saved.max_count, loaded.max_count);
            assert_eq!(saved.min_spacing, loaded.min_spacing);
            assert_eq!(saved.max_slope, loaded.max_slope);
        }
    }

    #[test]
    fn test_catalog_load_missing_file() {
        let result = CategoryCatalog::load_from_file("definitely/not/here.toml");
        assert!(matches!(
            result,
            Err(StrewnError::CatalogFileNotFound { .. })
        ));
    }

    #[test]
    fn test_catalog_load_rejects_invalid_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(
            &path,
            r#"
[[categories]]
name = "broken"
min_count = 9
max_count = 2
min_spacing = 4.0
"#,
        )
        .unwrap();

        let result = CategoryCatalog::load_from_file(&path);
        assert!(result.is_err(), "inverted counts must fail at load time");
    }
}
