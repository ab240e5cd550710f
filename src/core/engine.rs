use crate::domain::model::{Household, HouseholdId, Recipe, RecipeId, RecipeQuery};
use crate::domain::ports::{ConfigProvider, HouseholdStore, RecipeStore};
use crate::utils::error::{HouseholdError, Result};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// One async mutex per household. Every read-modify-write of a household
/// document runs while holding that household's guard.
#[derive(Debug, Default)]
pub(crate) struct HouseholdLocks {
    locks: Mutex<HashMap<HouseholdId, Arc<AsyncMutex<()>>>>,
}

impl HouseholdLocks {
    pub(crate) async fn acquire(&self, id: HouseholdId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self
                .locks
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            // entries nobody holds or waits on can go
            locks.retain(|key, lock| *key == id || Arc::strong_count(lock) > 1);
            Arc::clone(locks.entry(id).or_default())
        };
        lock.lock_owned().await
    }
}

pub struct HouseholdEngine<H: HouseholdStore, R: RecipeStore> {
    pub(crate) households: H,
    pub(crate) recipes: R,
    pub(crate) locks: HouseholdLocks,
    default_per_page: usize,
    max_per_page: usize,
}

impl<H: HouseholdStore, R: RecipeStore> HouseholdEngine<H, R> {
    pub fn new<C: ConfigProvider>(households: H, recipes: R, config: &C) -> Self {
        Self {
            households,
            recipes,
            locks: HouseholdLocks::default(),
            default_per_page: config.default_per_page(),
            max_per_page: config.max_per_page(),
        }
    }

    /// Builds a listing query with the configured page size rules applied.
    pub fn recipe_query(&self, page: usize, per_page: Option<usize>) -> RecipeQuery {
        RecipeQuery {
            page: page.max(1),
            per_page: per_page
                .unwrap_or(self.default_per_page)
                .clamp(1, self.max_per_page),
            ..Default::default()
        }
    }

    pub(crate) async fn load_household(&self, id: HouseholdId) -> Result<Household> {
        self.households
            .get_household(id)
            .await?
            .ok_or_else(|| HouseholdError::not_found("Household", id))
    }

    pub(crate) async fn load_recipe(&self, id: RecipeId) -> Result<Recipe> {
        self.recipes
            .get_recipe(id)
            .await?
            .ok_or_else(|| HouseholdError::not_found("Recipe", id))
    }
}
