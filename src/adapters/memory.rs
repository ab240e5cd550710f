use crate::adapters::collections::Collections;
use crate::domain::model::{Household, HouseholdId, Recipe, RecipeId, RecipeQuery};
use crate::domain::ports::{HouseholdStore, RecipeStore};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Household and recipe documents held in process memory. Clones share data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    collections: Arc<Mutex<Collections>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecipeStore for MemoryStore {
    async fn insert_recipe(&self, recipe: &Recipe) -> Result<()> {
        self.collections.lock().await.insert_recipe(recipe)
    }

    async fn get_recipe(&self, id: RecipeId) -> Result<Option<Recipe>> {
        Ok(self.collections.lock().await.get_recipe(id))
    }

    async fn save_recipe(&self, recipe: &Recipe) -> Result<()> {
        self.collections.lock().await.save_recipe(recipe)
    }

    async fn delete_recipe(&self, id: RecipeId) -> Result<Option<Recipe>> {
        Ok(self.collections.lock().await.delete_recipe(id))
    }

    async fn list_recipes(
        &self,
        household_id: HouseholdId,
        query: &RecipeQuery,
    ) -> Result<Vec<Recipe>> {
        Ok(self.collections.lock().await.list_recipes(household_id, query))
    }

    async fn top_by_cook_count(&self, household_id: HouseholdId, limit: usize) -> Result<Vec<Recipe>> {
        Ok(self
            .collections
            .lock()
            .await
            .top_by_cook_count(household_id, limit))
    }
}

#[async_trait]
impl HouseholdStore for MemoryStore {
    async fn insert_household(&self, household: &Household) -> Result<()> {
        self.collections.lock().await.insert_household(household)
    }

    async fn get_household(&self, id: HouseholdId) -> Result<Option<Household>> {
        Ok(self.collections.lock().await.get_household(id))
    }

    async fn find_household_by_name(&self, name: &str) -> Result<Option<Household>> {
        Ok(self.collections.lock().await.find_household_by_name(name))
    }

    async fn find_household_by_member(&self, member: &str) -> Result<Option<Household>> {
        Ok(self.collections.lock().await.find_household_by_member(member))
    }

    async fn save_household(&self, household: &Household) -> Result<()> {
        self.collections.lock().await.save_household(household)
    }
}
