use crate::core::engine::HouseholdEngine;
use crate::domain::model::{
    Household, HouseholdId, NewRecipe, Recipe, RecipeId, RecipeQuery, RecipeUpdate,
};
use crate::domain::ports::{HouseholdStore, RecipeStore};
use crate::utils::error::{HouseholdError, Result};
use crate::utils::validation::Validate;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct CookedRecipe {
    pub recipe: Recipe,
    pub household: Household,
}

impl<H: HouseholdStore, R: RecipeStore> HouseholdEngine<H, R> {
    /// Stores a new recipe for the household and bumps its recipe total.
    pub async fn create_recipe(&self, household_id: HouseholdId, input: NewRecipe) -> Result<Recipe> {
        input.validate()?;

        let _guard = self.locks.acquire(household_id).await;
        let mut household = self.load_household(household_id).await?;

        let recipe = Recipe::new(household_id, input);
        self.recipes.insert_recipe(&recipe).await?;

        household.recipes.total = household.recipes.total.saturating_add(1);
        household.touch();
        self.households.save_household(&household).await?;

        tracing::info!("📖 Added recipe '{}' ({}) to {}", recipe.title, recipe.id, household_id);
        Ok(recipe)
    }

    pub async fn get_recipe(&self, id: RecipeId) -> Result<Recipe> {
        self.load_recipe(id).await
    }

    pub async fn list_recipes(
        &self,
        household_id: HouseholdId,
        query: &RecipeQuery,
    ) -> Result<Vec<Recipe>> {
        self.load_household(household_id).await?;

        let recipes = self.recipes.list_recipes(household_id, query).await?;
        tracing::debug!(
            "Listed {} recipes of {} (page {}, {} per page)",
            recipes.len(),
            household_id,
            query.page,
            query.per_page
        );
        Ok(recipes)
    }

    /// Applies the provided fields. The cook count cannot be changed here.
    pub async fn update_recipe(&self, id: RecipeId, update: RecipeUpdate) -> Result<Recipe> {
        update.validate()?;

        let household_id = self.load_recipe(id).await?.household_id;
        let _guard = self.locks.acquire(household_id).await;

        let mut recipe = self.load_recipe(id).await?;
        recipe.apply(update);
        self.recipes.save_recipe(&recipe).await?;

        tracing::info!("✏️ Updated recipe '{}' ({})", recipe.title, recipe.id);
        Ok(recipe)
    }

    /// Counts one more cook of the recipe and refreshes the household's
    /// most popular recipes in the same critical section.
    pub async fn mark_cooked(&self, id: RecipeId) -> Result<CookedRecipe> {
        let household_id = self.load_recipe(id).await?.household_id;
        let _guard = self.locks.acquire(household_id).await;

        // the recipe may have been deleted while we waited for the lock
        let mut recipe = self.load_recipe(id).await?;
        recipe.mark_cooked();
        self.recipes.save_recipe(&recipe).await?;

        tracing::info!("🍳 '{}' cooked {} time(s)", recipe.title, recipe.cook_count);

        let household = self.load_household(household_id).await?;
        let household = self.refresh_locked(household).await?;

        Ok(CookedRecipe { recipe, household })
    }

    /// Removes the recipe and returns its household with the recipe total and
    /// leaderboard brought up to date.
    pub async fn delete_recipe(&self, id: RecipeId) -> Result<Household> {
        let household_id = self.load_recipe(id).await?.household_id;
        let _guard = self.locks.acquire(household_id).await;

        let recipe = self
            .recipes
            .delete_recipe(id)
            .await?
            .ok_or_else(|| HouseholdError::not_found("Recipe", id))?;
        tracing::info!("🗑️ Deleted recipe '{}' ({})", recipe.title, recipe.id);

        let mut household = self.load_household(household_id).await?;
        household.recipes.total = household.recipes.total.saturating_sub(1);
        self.refresh_locked(household).await
    }
}
