use crate::domain::model::{Household, HouseholdId, Recipe, RecipeId, RecipeQuery};
use crate::utils::error::{HouseholdError, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;

/// Documents kept in insertion order, shared by the memory and file stores.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct Collections {
    #[serde(default)]
    pub households: Vec<Household>,
    #[serde(default)]
    pub recipes: Vec<Recipe>,
}

impl Collections {
    pub fn insert_recipe(&mut self, recipe: &Recipe) -> Result<()> {
        if self.recipes.iter().any(|r| r.id == recipe.id) {
            return Err(HouseholdError::Conflict {
                message: format!("recipe {} already exists", recipe.id),
            });
        }
        self.recipes.push(recipe.clone());
        Ok(())
    }

    pub fn get_recipe(&self, id: RecipeId) -> Option<Recipe> {
        self.recipes.iter().find(|r| r.id == id).cloned()
    }

    pub fn save_recipe(&mut self, recipe: &Recipe) -> Result<()> {
        let slot = self
            .recipes
            .iter_mut()
            .find(|r| r.id == recipe.id)
            .ok_or_else(|| HouseholdError::not_found("Recipe", recipe.id))?;
        *slot = recipe.clone();
        Ok(())
    }

    pub fn delete_recipe(&mut self, id: RecipeId) -> Option<Recipe> {
        let index = self.recipes.iter().position(|r| r.id == id)?;
        Some(self.recipes.remove(index))
    }

    pub fn list_recipes(&self, household_id: HouseholdId, query: &RecipeQuery) -> Vec<Recipe> {
        self.recipes
            .iter()
            .filter(|r| r.household_id == household_id && query.matches(r))
            .skip(query.offset())
            .take(query.per_page)
            .cloned()
            .collect()
    }

    pub fn top_by_cook_count(&self, household_id: HouseholdId, limit: usize) -> Vec<Recipe> {
        let mut ranked: Vec<&Recipe> = self
            .recipes
            .iter()
            .filter(|r| r.household_id == household_id)
            .collect();
        ranked.sort_by_key(|r| (Reverse(r.cook_count), r.created_at, r.id));
        ranked.into_iter().take(limit).cloned().collect()
    }

    pub fn insert_household(&mut self, household: &Household) -> Result<()> {
        if self.households.iter().any(|h| h.id == household.id) {
            return Err(HouseholdError::Conflict {
                message: format!("household {} already exists", household.id),
            });
        }
        if self.find_household_by_name(&household.name).is_some() {
            return Err(HouseholdError::Conflict {
                message: format!("a household named '{}' already exists", household.name),
            });
        }
        self.ensure_members_free(household)?;
        self.households.push(household.clone());
        Ok(())
    }

    pub fn get_household(&self, id: HouseholdId) -> Option<Household> {
        self.households.iter().find(|h| h.id == id).cloned()
    }

    pub fn find_household_by_name(&self, name: &str) -> Option<Household> {
        let name = name.trim();
        self.households
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case(name))
            .cloned()
    }

    pub fn find_household_by_member(&self, member: &str) -> Option<Household> {
        self.households.iter().find(|h| h.has_member(member)).cloned()
    }

    /// Fails when one of the household's members already belongs to another
    /// household.
    fn ensure_members_free(&self, household: &Household) -> Result<()> {
        for member in &household.members {
            let taken = self
                .households
                .iter()
                .find(|h| h.id != household.id && h.has_member(&member.name));
            if let Some(other) = taken {
                return Err(HouseholdError::member_taken(&member.name, &other.name));
            }
        }
        Ok(())
    }

    pub fn save_household(&mut self, household: &Household) -> Result<()> {
        self.ensure_members_free(household)?;
        let slot = self
            .households
            .iter_mut()
            .find(|h| h.id == household.id)
            .ok_or_else(|| HouseholdError::not_found("Household", household.id))?;
        *slot = household.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::NewRecipe;

    use chrono::{Duration, Utc};

    fn recipe(household_id: HouseholdId, title: &str, cook_count: u32) -> Recipe {
        let mut recipe = Recipe::new(
            household_id,
            NewRecipe {
                title: title.to_string(),
                created_by: "ana".to_string(),
                ..Default::default()
            },
        );
        recipe.cook_count = cook_count;
        recipe
    }

    #[test]
    fn test_top_by_cook_count_breaks_ties_by_creation_time() {
        let household = HouseholdId::new();
        let mut collections = Collections::default();
        let start = Utc::now();
        // "c" is stored before "b" but was created later
        for (title, count, age) in [("a", 1, 3), ("c", 5, 1), ("b", 5, 2), ("d", 7, 0)] {
            let mut recipe = recipe(household, title, count);
            recipe.created_at = start - Duration::minutes(age);
            collections.insert_recipe(&recipe).unwrap();
        }
        collections
            .insert_recipe(&recipe(HouseholdId::new(), "other", 100))
            .unwrap();

        let top: Vec<String> = collections
            .top_by_cook_count(household, 3)
            .into_iter()
            .map(|r| r.title)
            .collect();
        assert_eq!(top, vec!["d", "b", "c"]);
    }

    #[test]
    fn test_list_recipes_pages() {
        let household = HouseholdId::new();
        let mut collections = Collections::default();
        for i in 0..5 {
            collections
                .insert_recipe(&recipe(household, &format!("r{}", i), 0))
                .unwrap();
        }

        let query = RecipeQuery {
            page: 2,
            per_page: 2,
            ..Default::default()
        };
        let titles: Vec<String> = collections
            .list_recipes(household, &query)
            .into_iter()
            .map(|r| r.title)
            .collect();
        assert_eq!(titles, vec!["r2", "r3"]);
    }

    #[test]
    fn test_household_names_are_unique_ignoring_case() {
        let mut collections = Collections::default();
        collections
            .insert_household(&Household::new("Flat 4", vec![]))
            .unwrap();

        let result = collections.insert_household(&Household::new("flat 4", vec![]));
        assert!(matches!(result, Err(HouseholdError::Conflict { .. })));
    }

    #[test]
    fn test_member_cannot_join_a_second_household() {
        let mut collections = Collections::default();
        let flat4 = Household::new("Flat 4", vec!["ana".to_string()]);
        collections.insert_household(&flat4).unwrap();

        let flat5 = Household::new("Flat 5", vec!["ana".to_string()]);
        let result = collections.insert_household(&flat5);
        assert!(matches!(result, Err(HouseholdError::Conflict { .. })));
        assert!(collections.get_household(flat5.id).is_none());

        let mut flat6 = Household::new("Flat 6", vec!["ben".to_string()]);
        collections.insert_household(&flat6).unwrap();
        flat6.add_member("ana");
        let result = collections.save_household(&flat6);
        assert!(matches!(result, Err(HouseholdError::Conflict { .. })));

        let stored = collections.get_household(flat6.id).unwrap();
        assert_eq!(stored.member_names(), vec!["ben"]);
        assert_eq!(collections.find_household_by_member("ana").unwrap().id, flat4.id);
    }

    #[test]
    fn test_save_missing_recipe_is_not_found() {
        let mut collections = Collections::default();
        let result = collections.save_recipe(&recipe(HouseholdId::new(), "x", 0));
        assert!(matches!(result, Err(HouseholdError::NotFound { .. })));
    }
}
