pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::AppConfig;

pub use adapters::{JsonFileStore, LocalStorage, MemoryStore};
pub use crate::core::{engine::HouseholdEngine, recipes::CookedRecipe};
pub use domain::model::{Household, HouseholdId, Leaderboard, Recipe, RecipeId, RecipeRef};
pub use domain::services::merge_popular_recipes;
pub use utils::error::{HouseholdError, Result};
