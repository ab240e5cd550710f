use crate::core::engine::HouseholdEngine;
use crate::domain::model::{
    Household, HouseholdId, ItemId, NewShoppingListItem, ShoppingList, ShoppingListId,
    ShoppingListItem,
};
use crate::domain::ports::{HouseholdStore, RecipeStore};
use crate::utils::error::{HouseholdError, Result};
use crate::utils::validation::{validate_non_empty_string, Validate};

impl<H: HouseholdStore, R: RecipeStore> HouseholdEngine<H, R> {
    pub async fn create_household(&self, name: &str, members: Vec<String>) -> Result<Household> {
        validate_non_empty_string("name", name)?;

        if self.households.find_household_by_name(name).await?.is_some() {
            return Err(HouseholdError::Conflict {
                message: format!("a household named '{}' already exists", name.trim()),
            });
        }

        let household = Household::new(name, members);
        for member in &household.members {
            if let Some(other) = self.households.find_household_by_member(&member.name).await? {
                return Err(HouseholdError::member_taken(&member.name, &other.name));
            }
        }
        // the store re-checks names and members under its own write lock
        self.households.insert_household(&household).await?;

        tracing::info!("🏠 Created household '{}' ({})", household.name, household.id);
        Ok(household)
    }

    pub async fn get_household(&self, id: HouseholdId) -> Result<Household> {
        self.load_household(id).await
    }

    /// A member belongs to one household at a time; joining a second one is a
    /// `Conflict`.
    pub async fn add_member(&self, id: HouseholdId, member: &str) -> Result<Household> {
        validate_non_empty_string("member", member)?;

        if let Some(other) = self.households.find_household_by_member(member).await? {
            if other.id != id {
                return Err(HouseholdError::member_taken(member.trim(), &other.name));
            }
        }

        self.update_household(id, |household| {
            if !household.add_member(member) {
                tracing::debug!("{} is already a member of {}", member.trim(), household.id);
            }
            Ok(())
        })
        .await
    }

    pub async fn create_shopping_list(&self, id: HouseholdId, title: &str) -> Result<Household> {
        validate_non_empty_string("title", title)?;

        self.update_household(id, |household| {
            household.shopping_lists.push(ShoppingList {
                id: ShoppingListId::new(),
                title: title.trim().to_string(),
                items: Vec::new(),
            });
            Ok(())
        })
        .await
    }

    pub async fn add_shopping_list_item(
        &self,
        id: HouseholdId,
        list_id: ShoppingListId,
        item: NewShoppingListItem,
    ) -> Result<Household> {
        item.validate()?;

        self.update_household(id, |household| {
            household.shopping_list_mut(list_id)?.items.push(ShoppingListItem {
                id: ItemId::new(),
                label: item.label.trim().to_string(),
                amount: item.amount,
                unit: item.unit.trim().to_string(),
                status: Default::default(),
            });
            Ok(())
        })
        .await
    }

    pub async fn toggle_shopping_list_item(
        &self,
        id: HouseholdId,
        list_id: ShoppingListId,
        item_id: ItemId,
    ) -> Result<Household> {
        self.update_household(id, |household| {
            let item = household.shopping_list_mut(list_id)?.item_mut(item_id)?;
            item.status = item.status.toggled();
            Ok(())
        })
        .await
    }

    pub async fn remove_shopping_list_item(
        &self,
        id: HouseholdId,
        list_id: ShoppingListId,
        item_id: ItemId,
    ) -> Result<Household> {
        self.update_household(id, |household| {
            let list = household.shopping_list_mut(list_id)?;
            let before = list.items.len();
            list.items.retain(|item| item.id != item_id);
            if list.items.len() == before {
                return Err(HouseholdError::not_found("Shopping list item", item_id));
            }
            Ok(())
        })
        .await
    }

    pub async fn delete_shopping_list(
        &self,
        id: HouseholdId,
        list_id: ShoppingListId,
    ) -> Result<Household> {
        self.update_household(id, |household| {
            let before = household.shopping_lists.len();
            household.shopping_lists.retain(|list| list.id != list_id);
            if household.shopping_lists.len() == before {
                return Err(HouseholdError::not_found("Shopping list", list_id));
            }
            Ok(())
        })
        .await
    }

    /// Loads, edits and saves one household while holding its lock. Nothing is
    /// written when `edit` fails.
    async fn update_household<F>(&self, id: HouseholdId, edit: F) -> Result<Household>
    where
        F: FnOnce(&mut Household) -> Result<()> + Send,
    {
        let _guard = self.locks.acquire(id).await;

        let mut household = self.load_household(id).await?;
        edit(&mut household)?;
        household.touch();
        self.households.save_household(&household).await?;

        tracing::debug!("Saved household {}", household.id);
        Ok(household)
    }
}

#[cfg(test)]
mod tests {
    use crate::adapters::MemoryStore;
    use crate::config::AppConfig;
    use crate::core::engine::HouseholdEngine;
    use crate::domain::model::{ItemStatus, MemberRole, NewShoppingListItem, ShoppingListId};
    use crate::utils::error::HouseholdError;

    fn engine() -> HouseholdEngine<MemoryStore, MemoryStore> {
        let store = MemoryStore::new();
        HouseholdEngine::new(store.clone(), store, &AppConfig::default())
    }

    fn milk() -> NewShoppingListItem {
        NewShoppingListItem {
            label: "Milk".to_string(),
            amount: 2.0,
            unit: "l".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_household_rejects_duplicate_name() {
        let engine = engine();
        engine.create_household("Flat 4", vec![]).await.unwrap();

        let result = engine.create_household(" flat 4 ", vec![]).await;
        assert!(matches!(result, Err(HouseholdError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_create_household_requires_name() {
        let result = engine().create_household("  ", vec![]).await;
        assert!(matches!(result, Err(HouseholdError::ValidationError { .. })));
    }

    #[tokio::test]
    async fn test_shopping_list_lifecycle() {
        let engine = engine();
        let household = engine.create_household("Flat 4", vec!["ana".into()]).await.unwrap();

        let household = engine
            .create_shopping_list(household.id, "Weekend")
            .await
            .unwrap();
        let list_id = household.shopping_lists[0].id;

        let household = engine
            .add_shopping_list_item(household.id, list_id, milk())
            .await
            .unwrap();
        let item = &household.shopping_lists[0].items[0];
        assert_eq!(item.label, "Milk");
        assert_eq!(item.status, ItemStatus::Pending);
        let item_id = item.id;

        let household = engine
            .toggle_shopping_list_item(household.id, list_id, item_id)
            .await
            .unwrap();
        assert_eq!(household.shopping_lists[0].items[0].status, ItemStatus::Done);

        let household = engine
            .remove_shopping_list_item(household.id, list_id, item_id)
            .await
            .unwrap();
        assert!(household.shopping_lists[0].items.is_empty());

        let household = engine.delete_shopping_list(household.id, list_id).await.unwrap();
        assert!(household.shopping_lists.is_empty());
    }

    #[tokio::test]
    async fn test_missing_list_is_not_found_and_nothing_is_saved() {
        let engine = engine();
        let household = engine.create_household("Flat 4", vec![]).await.unwrap();

        let result = engine
            .add_shopping_list_item(household.id, ShoppingListId::new(), milk())
            .await;
        assert!(matches!(result, Err(HouseholdError::NotFound { .. })));

        let stored = engine.get_household(household.id).await.unwrap();
        assert_eq!(stored.updated_at, household.updated_at);
    }

    #[tokio::test]
    async fn test_add_member_is_idempotent() {
        let engine = engine();
        let household = engine.create_household("Flat 4", vec!["ana".into()]).await.unwrap();

        engine.add_member(household.id, "ben").await.unwrap();
        let household = engine.add_member(household.id, "ben").await.unwrap();
        assert_eq!(household.member_names(), vec!["ana", "ben"]);
        assert_eq!(household.members[0].role, MemberRole::Owner);
        assert_eq!(household.members[1].role, MemberRole::Member);
    }

    #[tokio::test]
    async fn test_member_of_one_household_cannot_found_another() {
        let engine = engine();
        engine.create_household("Flat 4", vec!["ana".into()]).await.unwrap();

        let result = engine
            .create_household("Flat 5", vec!["ben".into(), " ana ".into()])
            .await;
        assert!(matches!(result, Err(HouseholdError::Conflict { .. })));

        // Flat 5 was never stored, so ben is still free
        let flat5 = engine.create_household("Flat 5", vec!["ben".into()]).await;
        assert!(flat5.is_ok());
    }

    #[tokio::test]
    async fn test_member_of_one_household_cannot_join_another() {
        let engine = engine();
        let flat4 = engine.create_household("Flat 4", vec!["ana".into()]).await.unwrap();
        let flat6 = engine.create_household("Flat 6", vec!["ben".into()]).await.unwrap();

        let result = engine.add_member(flat6.id, "ana").await;
        match result {
            Err(HouseholdError::Conflict { message }) => assert!(message.contains("Flat 4")),
            other => panic!("expected a conflict, got {:?}", other),
        }

        let stored = engine.get_household(flat6.id).await.unwrap();
        assert_eq!(stored.member_names(), vec!["ben"]);
        let stored = engine.get_household(flat4.id).await.unwrap();
        assert_eq!(stored.member_names(), vec!["ana"]);
    }
}
