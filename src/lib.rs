pub mod catalog;
pub mod engine;
pub mod errors;
pub mod field;
pub mod layout;
pub mod nav;

// Selective re-exports for external consumers

// Errors - every fallible API returns these
pub use errors::{StrewnError, StrewnResult};

// Catalog - consumers build or load one before running the engine
pub use catalog::{Category, CategoryCatalog, CategoryId};

// Field - the sampling domain and its generators
pub use field::generation::{get_field_preset, FieldAlgorithm, FieldGenerator};
pub use field::{FieldExtent, HeightField, TerrainField};

// Engine - placement runs and their results
pub use engine::{EngineConfig, PlacementEngine};
pub use layout::{Deficiency, PlacedInstance, PlacementRun, RunWarning};

// Navigation - reachability capability and the grid-based default
pub use nav::{GridNavigator, NavPath, NavigationService, PathStatus};
