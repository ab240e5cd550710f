use crate::domain::model::{Household, HouseholdId, Recipe, RecipeId, RecipeQuery};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Raw byte storage used by document stores that persist to files.
pub trait Storage: Send + Sync {
    /// Returns `None` when nothing has been written under `path` yet.
    fn read_file(
        &self,
        path: &str,
    ) -> impl std::future::Future<Output = Result<Option<Vec<u8>>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn default_per_page(&self) -> usize;
    fn max_per_page(&self) -> usize;
}

#[async_trait]
pub trait RecipeStore: Send + Sync {
    async fn insert_recipe(&self, recipe: &Recipe) -> Result<()>;
    async fn get_recipe(&self, id: RecipeId) -> Result<Option<Recipe>>;
    async fn save_recipe(&self, recipe: &Recipe) -> Result<()>;
    /// Returns the removed recipe, if it existed.
    async fn delete_recipe(&self, id: RecipeId) -> Result<Option<Recipe>>;
    /// Recipes of one household in creation order, filtered and paged by `query`.
    async fn list_recipes(&self, household_id: HouseholdId, query: &RecipeQuery)
        -> Result<Vec<Recipe>>;
    /// The household's recipes ordered by cook count, highest first. Ties keep
    /// creation order.
    async fn top_by_cook_count(&self, household_id: HouseholdId, limit: usize)
        -> Result<Vec<Recipe>>;
}

#[async_trait]
pub trait HouseholdStore: Send + Sync {
    async fn insert_household(&self, household: &Household) -> Result<()>;
    async fn get_household(&self, id: HouseholdId) -> Result<Option<Household>>;
    async fn find_household_by_name(&self, name: &str) -> Result<Option<Household>>;
    async fn find_household_by_member(&self, member: &str) -> Result<Option<Household>>;
    /// Inserts and saves fail with `Conflict` when a member already belongs to
    /// another household.
    async fn save_household(&self, household: &Household) -> Result<()>;
}
