use crate::core::engine::HouseholdEngine;
use crate::domain::model::{
    Household, HouseholdId, Leaderboard, Recipe, RecipeRef, LEADERBOARD_SIZE,
};
use crate::domain::ports::{HouseholdStore, RecipeStore};
use crate::domain::services::merge_popular_recipes;
use crate::utils::error::Result;

impl<H: HouseholdStore, R: RecipeStore> HouseholdEngine<H, R> {
    /// Recomputes the household's most popular recipes from current cook
    /// counts and saves the result.
    pub async fn refresh_popular_recipes(&self, household_id: HouseholdId) -> Result<Household> {
        let _guard = self.locks.acquire(household_id).await;
        let household = self.load_household(household_id).await?;
        self.refresh_locked(household).await
    }

    /// The leaderboard resolved to full recipes, in rank order. Entries whose
    /// recipe is gone are skipped.
    pub async fn popular_recipes(&self, household_id: HouseholdId) -> Result<Vec<Recipe>> {
        let household = self.load_household(household_id).await?;

        let mut recipes = Vec::with_capacity(household.recipes.most_popular.len());
        for entry in household.recipes.most_popular.iter() {
            match self.recipes.get_recipe(entry.id).await? {
                Some(recipe) if recipe.household_id == household_id => recipes.push(recipe),
                _ => tracing::debug!("Skipping dangling leaderboard entry {}", entry.id),
            }
        }
        Ok(recipes)
    }

    /// Caller must hold the household's lock.
    pub(crate) async fn refresh_locked(&self, mut household: Household) -> Result<Household> {
        let current = self.live_leaderboard(&household).await?;

        let ranked = self
            .recipes
            .top_by_cook_count(household.id, LEADERBOARD_SIZE)
            .await?;
        let candidates = Leaderboard::from_ranked(ranked.iter().map(Recipe::to_ref))?;

        let merged = merge_popular_recipes(&current, &candidates);
        if merged != household.recipes.most_popular {
            tracing::debug!(
                "Leaderboard of {} changed: {:?} -> {:?}",
                household.id,
                household.recipes.most_popular.ids(),
                merged.ids()
            );
        }

        household.recipes.most_popular = merged;
        household.touch();
        self.households.save_household(&household).await?;

        tracing::info!(
            "🏆 Refreshed most popular recipes of '{}': {} entr{}",
            household.name,
            household.recipes.most_popular.len(),
            if household.recipes.most_popular.len() == 1 { "y" } else { "ies" }
        );
        Ok(household)
    }

    /// Re-reads each stored leaderboard entry, dropping references to recipes
    /// that were deleted or belong elsewhere and taking live cook counts for
    /// the rest.
    async fn live_leaderboard(&self, household: &Household) -> Result<Leaderboard> {
        let mut live: Vec<RecipeRef> = Vec::with_capacity(LEADERBOARD_SIZE);

        for entry in household.recipes.most_popular.iter() {
            match self.recipes.get_recipe(entry.id).await? {
                Some(recipe) if recipe.household_id == household.id => live.push(recipe.to_ref()),
                Some(recipe) => tracing::warn!(
                    "⚠️ Leaderboard of {} points at recipe {} of household {}, dropping it",
                    household.id,
                    recipe.id,
                    recipe.household_id
                ),
                None => tracing::warn!(
                    "⚠️ Leaderboard of {} points at deleted recipe {}, dropping it",
                    household.id,
                    entry.id
                ),
            }
        }

        Leaderboard::new(live)
    }
}

#[cfg(test)]
mod tests {
    use crate::adapters::MemoryStore;
    use crate::config::AppConfig;
    use crate::core::engine::HouseholdEngine;
    use crate::domain::model::{HouseholdId, Leaderboard, NewRecipe, RecipeRef};
    use crate::domain::ports::{HouseholdStore, RecipeStore};
    use crate::utils::error::HouseholdError;

    fn new_recipe(title: &str) -> NewRecipe {
        NewRecipe {
            title: title.to_string(),
            created_by: "ana".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_refresh_without_recipes_is_empty() {
        let store = MemoryStore::new();
        let engine = HouseholdEngine::new(store.clone(), store, &AppConfig::default());
        let household = engine.create_household("Flat 4", vec![]).await.unwrap();

        let household = engine.refresh_popular_recipes(household.id).await.unwrap();
        assert!(household.recipes.most_popular.is_empty());
    }

    #[tokio::test]
    async fn test_refresh_missing_household() {
        let store = MemoryStore::new();
        let engine = HouseholdEngine::new(store.clone(), store, &AppConfig::default());

        let result = engine.refresh_popular_recipes(HouseholdId::new()).await;
        assert!(matches!(result, Err(HouseholdError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_refresh_uses_live_counts_for_stored_entries() {
        let store = MemoryStore::new();
        let engine = HouseholdEngine::new(store.clone(), store.clone(), &AppConfig::default());
        let household = engine.create_household("Flat 4", vec![]).await.unwrap();

        let soup = engine.create_recipe(household.id, new_recipe("Soup")).await.unwrap();
        let salad = engine.create_recipe(household.id, new_recipe("Salad")).await.unwrap();
        let stew = engine.create_recipe(household.id, new_recipe("Stew")).await.unwrap();

        // leaderboard written with stale counts by an older version
        let mut stored = store.get_household(household.id).await.unwrap().unwrap();
        stored.recipes.most_popular =
            Leaderboard::new(vec![RecipeRef::new(soup.id, 0), RecipeRef::new(salad.id, 0)]).unwrap();
        store.save_household(&stored).await.unwrap();

        let mut live_soup = store.get_recipe(soup.id).await.unwrap().unwrap();
        live_soup.cook_count = 7;
        store.save_recipe(&live_soup).await.unwrap();
        let mut live_stew = store.get_recipe(stew.id).await.unwrap().unwrap();
        live_stew.cook_count = 3;
        store.save_recipe(&live_stew).await.unwrap();

        let household = engine.refresh_popular_recipes(household.id).await.unwrap();
        assert_eq!(
            household.recipes.most_popular.entries(),
            &[RecipeRef::new(soup.id, 7), RecipeRef::new(stew.id, 3)]
        );

        let popular = engine.popular_recipes(household.id).await.unwrap();
        let titles: Vec<&str> = popular.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["Soup", "Stew"]);
    }

    #[tokio::test]
    async fn test_refresh_drops_foreign_recipes() {
        let store = MemoryStore::new();
        let engine = HouseholdEngine::new(store.clone(), store.clone(), &AppConfig::default());
        let ours = engine.create_household("Flat 4", vec![]).await.unwrap();
        let theirs = engine.create_household("Flat 5", vec![]).await.unwrap();
        let foreign = engine.create_recipe(theirs.id, new_recipe("Curry")).await.unwrap();

        let mut stored = store.get_household(ours.id).await.unwrap().unwrap();
        stored.recipes.most_popular = Leaderboard::new(vec![foreign.to_ref()]).unwrap();
        store.save_household(&stored).await.unwrap();

        assert!(engine.popular_recipes(ours.id).await.unwrap().is_empty());
        let household = engine.refresh_popular_recipes(ours.id).await.unwrap();
        assert!(household.recipes.most_popular.is_empty());
    }
}
