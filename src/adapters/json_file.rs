use crate::adapters::collections::Collections;
use crate::domain::model::{Household, HouseholdId, Recipe, RecipeId, RecipeQuery};
use crate::domain::ports::{HouseholdStore, RecipeStore, Storage};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;

pub const DATA_FILE: &str = "household_data.json";

/// Document store that keeps every household and recipe in one JSON file.
///
/// The whole file is read for each call and rewritten after each mutation.
/// Calls through clones of the same store are serialized; separate processes
/// sharing a data directory are not coordinated.
pub struct JsonFileStore<S: Storage> {
    storage: Arc<S>,
    lock: Arc<Mutex<()>>,
}

impl<S: Storage> Clone for JsonFileStore<S> {
    fn clone(&self) -> Self {
        Self {
            storage: Arc::clone(&self.storage),
            lock: Arc::clone(&self.lock),
        }
    }
}

impl<S: Storage> JsonFileStore<S> {
    pub fn new(storage: S) -> Self {
        Self {
            storage: Arc::new(storage),
            lock: Arc::new(Mutex::new(())),
        }
    }

    async fn load(&self) -> Result<Collections> {
        match self.storage.read_file(DATA_FILE).await? {
            Some(bytes) => Ok(serde_json::from_slice(&bytes)?),
            None => {
                tracing::debug!("{} not found, starting with empty collections", DATA_FILE);
                Ok(Collections::default())
            }
        }
    }

    async fn persist(&self, collections: &Collections) -> Result<()> {
        let data = serde_json::to_vec_pretty(collections)?;
        tracing::debug!("Writing {} ({} bytes)", DATA_FILE, data.len());
        self.storage.write_file(DATA_FILE, &data).await
    }

    async fn read<T>(&self, f: impl FnOnce(&Collections) -> T + Send) -> Result<T> {
        let _guard = self.lock.lock().await;
        let collections = self.load().await?;
        Ok(f(&collections))
    }

    async fn write<T>(&self, f: impl FnOnce(&mut Collections) -> Result<T> + Send) -> Result<T> {
        let _guard = self.lock.lock().await;
        let mut collections = self.load().await?;
        let value = f(&mut collections)?;
        self.persist(&collections).await?;
        Ok(value)
    }
}

#[async_trait]
impl<S: Storage> RecipeStore for JsonFileStore<S> {
    async fn insert_recipe(&self, recipe: &Recipe) -> Result<()> {
        self.write(|c| c.insert_recipe(recipe)).await
    }

    async fn get_recipe(&self, id: RecipeId) -> Result<Option<Recipe>> {
        self.read(|c| c.get_recipe(id)).await
    }

    async fn save_recipe(&self, recipe: &Recipe) -> Result<()> {
        self.write(|c| c.save_recipe(recipe)).await
    }

    async fn delete_recipe(&self, id: RecipeId) -> Result<Option<Recipe>> {
        self.write(|c| Ok(c.delete_recipe(id))).await
    }

    async fn list_recipes(
        &self,
        household_id: HouseholdId,
        query: &RecipeQuery,
    ) -> Result<Vec<Recipe>> {
        self.read(|c| c.list_recipes(household_id, query)).await
    }

    async fn top_by_cook_count(&self, household_id: HouseholdId, limit: usize) -> Result<Vec<Recipe>> {
        self.read(|c| c.top_by_cook_count(household_id, limit)).await
    }
}

#[async_trait]
impl<S: Storage> HouseholdStore for JsonFileStore<S> {
    async fn insert_household(&self, household: &Household) -> Result<()> {
        self.write(|c| c.insert_household(household)).await
    }

    async fn get_household(&self, id: HouseholdId) -> Result<Option<Household>> {
        self.read(|c| c.get_household(id)).await
    }

    async fn find_household_by_name(&self, name: &str) -> Result<Option<Household>> {
        self.read(|c| c.find_household_by_name(name)).await
    }

    async fn find_household_by_member(&self, member: &str) -> Result<Option<Household>> {
        self.read(|c| c.find_household_by_member(member)).await
    }

    async fn save_household(&self, household: &Household) -> Result<()> {
        self.write(|c| c.save_household(household)).await
    }
}
