pub mod engine;
pub mod households;
pub mod popularity;
pub mod recipes;

pub use crate::domain::model::{Household, Leaderboard, Recipe, RecipeRef};
pub use crate::domain::ports::{ConfigProvider, HouseholdStore, RecipeStore, Storage};
pub use crate::utils::error::Result;
pub use engine::HouseholdEngine;
pub use recipes::CookedRecipe;
