use crate::utils::error::{HouseholdError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_non_negative, validate_url, Validate,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Number of recipes a household keeps on its "most popular" leaderboard.
pub const LEADERBOARD_SIZE: usize = 2;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<Uuid> for $name {
            fn from(value: Uuid) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl FromStr for $name {
            type Err = HouseholdError;

            fn from_str(s: &str) -> Result<Self> {
                Uuid::parse_str(s.trim()).map(Self).map_err(|e| {
                    HouseholdError::validation(stringify!($name), format!("Invalid id '{}': {}", s, e))
                })
            }
        }
    };
}

define_id!(
    /// Identity of a household document.
    HouseholdId
);
define_id!(
    /// Identity of a recipe document.
    RecipeId
);
define_id!(ShoppingListId);
define_id!(ItemId);

/// The slice of a recipe the popularity ranking looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeRef {
    pub id: RecipeId,
    pub cook_count: u32,
}

impl RecipeRef {
    pub fn new(id: RecipeId, cook_count: u32) -> Self {
        Self { id, cook_count }
    }
}

/// Ordered "most popular recipes" list of a household.
///
/// Holds at most [`LEADERBOARD_SIZE`] entries with pairwise distinct ids. The
/// order is rank order as produced by the merge; it is never re-sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<RecipeRef>", into = "Vec<RecipeRef>")]
pub struct Leaderboard(Vec<RecipeRef>);

impl Leaderboard {
    pub fn new(entries: Vec<RecipeRef>) -> Result<Self> {
        if entries.len() > LEADERBOARD_SIZE {
            return Err(HouseholdError::InvalidLeaderboard {
                message: format!(
                    "expected at most {} entries, got {}",
                    LEADERBOARD_SIZE,
                    entries.len()
                ),
            });
        }

        for (i, entry) in entries.iter().enumerate() {
            if entries[..i].iter().any(|other| other.id == entry.id) {
                return Err(HouseholdError::InvalidLeaderboard {
                    message: format!("recipe {} appears more than once", entry.id),
                });
            }
        }

        Ok(Self(entries))
    }

    pub fn empty() -> Self {
        Self(Vec::new())
    }

    /// Builds a candidate list from recipes already ranked by cook count,
    /// keeping only the first [`LEADERBOARD_SIZE`].
    pub fn from_ranked<I>(ranked: I) -> Result<Self>
    where
        I: IntoIterator<Item = RecipeRef>,
    {
        Self::new(ranked.into_iter().take(LEADERBOARD_SIZE).collect())
    }

    /// Wraps entries the merge already knows to be bounded and distinct.
    pub(crate) fn from_merged(entries: Vec<RecipeRef>) -> Self {
        debug_assert!(entries.len() <= LEADERBOARD_SIZE);
        Self(entries)
    }

    pub fn entries(&self) -> &[RecipeRef] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &RecipeRef> {
        self.0.iter()
    }

    pub fn ids(&self) -> Vec<RecipeId> {
        self.0.iter().map(|entry| entry.id).collect()
    }

    pub fn contains(&self, id: RecipeId) -> bool {
        self.0.iter().any(|entry| entry.id == id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl TryFrom<Vec<RecipeRef>> for Leaderboard {
    type Error = HouseholdError;

    fn try_from(entries: Vec<RecipeRef>) -> Result<Self> {
        Self::new(entries)
    }
}

impl From<Leaderboard> for Vec<RecipeRef> {
    fn from(board: Leaderboard) -> Self {
        board.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub label: String,
    pub amount: f64,
    pub unit: String,
}

impl FromStr for Ingredient {
    type Err = HouseholdError;

    /// Parses `label[:amount[:unit]]`, e.g. `flour:200:g`.
    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.splitn(3, ':');
        let label = parts.next().unwrap_or_default().trim().to_string();
        let amount = match parts.next().map(str::trim) {
            Some("") | None => 0.0,
            Some(raw) => raw.parse::<f64>().map_err(|e| {
                HouseholdError::validation("ingredient", format!("Invalid amount '{}': {}", raw, e))
            })?,
        };
        let unit = parts.next().unwrap_or_default().trim().to_string();

        Ok(Self { label, amount, unit })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstructionStep {
    pub text: String,
    #[serde(default = "InstructionStep::default_node_type")]
    pub node_type: String,
}

impl InstructionStep {
    pub fn paragraph(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            node_type: Self::default_node_type(),
        }
    }

    fn default_node_type() -> String {
        "paragraph".to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: RecipeId,
    pub household_id: HouseholdId,
    pub title: String,
    pub created_by: String,
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
    #[serde(default)]
    pub instructions: Vec<InstructionStep>,
    pub url: Option<String>,
    pub note: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub cook_count: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Recipe {
    pub fn new(household_id: HouseholdId, input: NewRecipe) -> Self {
        let now = Utc::now();
        Self {
            id: RecipeId::new(),
            household_id,
            title: input.title.trim().to_string(),
            created_by: input.created_by.trim().to_string(),
            ingredients: input.ingredients,
            instructions: input.instructions,
            url: input.url,
            note: input.note,
            tags: normalize_tags(input.tags),
            cook_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn to_ref(&self) -> RecipeRef {
        RecipeRef::new(self.id, self.cook_count)
    }

    /// Replaces every field present in `update`; the cook count is never touched.
    pub fn apply(&mut self, update: RecipeUpdate) {
        if let Some(title) = update.title {
            self.title = title.trim().to_string();
        }
        if let Some(url) = update.url {
            self.url = Some(url);
        }
        if let Some(note) = update.note {
            self.note = Some(note);
        }
        if let Some(tags) = update.tags {
            self.tags = normalize_tags(tags);
        }
        if let Some(ingredients) = update.ingredients {
            self.ingredients = ingredients;
        }
        if let Some(instructions) = update.instructions {
            self.instructions = instructions;
        }
        self.updated_at = Utc::now();
    }

    pub fn mark_cooked(&mut self) {
        self.cook_count = self.cook_count.saturating_add(1);
        self.updated_at = Utc::now();
    }

    fn mentions(&self, needle: &str) -> bool {
        let hit = |text: &str| text.to_lowercase().contains(needle);

        hit(self.title.as_str())
            || self.note.as_deref().is_some_and(hit)
            || self.tags.iter().any(|tag| hit(tag.as_str()))
            || self.ingredients.iter().any(|i| hit(i.label.as_str()))
            || self.instructions.iter().any(|step| hit(step.text.as_str()))
    }
}

fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    tags.into_iter()
        .map(|tag| tag.trim().to_string())
        .filter(|tag| !tag.is_empty())
        .collect()
}

fn validate_ingredients(ingredients: &[Ingredient]) -> Result<()> {
    for ingredient in ingredients {
        validate_non_empty_string("ingredients.label", &ingredient.label)?;
        validate_non_negative("ingredients.amount", ingredient.amount)?;
    }
    Ok(())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewRecipe {
    pub title: String,
    pub created_by: String,
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
    #[serde(default)]
    pub instructions: Vec<InstructionStep>,
    pub url: Option<String>,
    pub note: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Validate for NewRecipe {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("title", &self.title)?;
        validate_non_empty_string("created_by", &self.created_by)?;
        if let Some(url) = &self.url {
            validate_url("url", url)?;
        }
        validate_ingredients(&self.ingredients)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecipeUpdate {
    pub title: Option<String>,
    pub url: Option<String>,
    pub note: Option<String>,
    pub tags: Option<Vec<String>>,
    pub ingredients: Option<Vec<Ingredient>>,
    pub instructions: Option<Vec<InstructionStep>>,
}

impl RecipeUpdate {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

impl Validate for RecipeUpdate {
    fn validate(&self) -> Result<()> {
        if let Some(title) = &self.title {
            validate_non_empty_string("title", title)?;
        }
        if let Some(url) = &self.url {
            validate_url("url", url)?;
        }
        if let Some(ingredients) = &self.ingredients {
            validate_ingredients(ingredients)?;
        }
        Ok(())
    }
}

/// Filter and page selection for recipe listings. `page` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeQuery {
    pub page: usize,
    pub per_page: usize,
    pub tags: Vec<String>,
    pub search: Option<String>,
}

impl Default for RecipeQuery {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 20,
            tags: Vec::new(),
            search: None,
        }
    }
}

impl RecipeQuery {
    pub fn offset(&self) -> usize {
        self.per_page.saturating_mul(self.page.max(1) - 1)
    }

    /// Tags match when the recipe carries any of them; search is a
    /// case-insensitive substring match over the recipe's text fields.
    pub fn matches(&self, recipe: &Recipe) -> bool {
        if !self.tags.is_empty() && !recipe.tags.iter().any(|t| self.tags.contains(t)) {
            return false;
        }

        match self.search.as_deref().map(str::trim) {
            Some(needle) if !needle.is_empty() => recipe.mentions(&needle.to_lowercase()),
            _ => true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    #[default]
    Pending,
    Done,
}

impl ItemStatus {
    pub fn toggled(self) -> Self {
        match self {
            ItemStatus::Pending => ItemStatus::Done,
            ItemStatus::Done => ItemStatus::Pending,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShoppingListItem {
    pub id: ItemId,
    pub label: String,
    pub amount: f64,
    pub unit: String,
    #[serde(default)]
    pub status: ItemStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewShoppingListItem {
    pub label: String,
    pub amount: f64,
    pub unit: String,
}

impl Validate for NewShoppingListItem {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("label", &self.label)?;
        validate_non_negative("amount", self.amount)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShoppingList {
    pub id: ShoppingListId,
    pub title: String,
    #[serde(default)]
    pub items: Vec<ShoppingListItem>,
}

impl ShoppingList {
    pub fn item_mut(&mut self, item_id: ItemId) -> Result<&mut ShoppingListItem> {
        self.items
            .iter_mut()
            .find(|item| item.id == item_id)
            .ok_or_else(|| HouseholdError::not_found("Shopping list item", item_id))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeSummary {
    pub total: u32,
    pub most_popular: Leaderboard,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Finances {
    pub total: f64,
    pub groceries: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    Owner,
    #[default]
    Member,
}

/// A person belongs to at most one household at a time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HouseholdMember {
    pub name: String,
    pub joined: DateTime<Utc>,
    #[serde(default)]
    pub role: MemberRole,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Household {
    pub id: HouseholdId,
    pub name: String,
    #[serde(default)]
    pub members: Vec<HouseholdMember>,
    #[serde(default)]
    pub shopping_lists: Vec<ShoppingList>,
    #[serde(default)]
    pub recipes: RecipeSummary,
    #[serde(default)]
    pub finances: Finances,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Household {
    pub fn new(name: &str, members: Vec<String>) -> Self {
        let now = Utc::now();
        let mut household = Self {
            id: HouseholdId::new(),
            name: name.trim().to_string(),
            members: Vec::new(),
            shopping_lists: Vec::new(),
            recipes: RecipeSummary::default(),
            finances: Finances::default(),
            created_at: now,
            updated_at: now,
        };
        for member in members {
            household.add_member(&member);
        }
        household
    }

    /// The first member to join becomes the owner. Returns false when the
    /// member was already present.
    pub fn add_member(&mut self, member: &str) -> bool {
        let member = member.trim();
        if member.is_empty() || self.has_member(member) {
            return false;
        }
        let role = if self.members.is_empty() {
            MemberRole::Owner
        } else {
            MemberRole::Member
        };
        self.members.push(HouseholdMember {
            name: member.to_string(),
            joined: Utc::now(),
            role,
        });
        true
    }

    pub fn has_member(&self, member: &str) -> bool {
        let member = member.trim();
        self.members.iter().any(|m| m.name == member)
    }

    pub fn member_names(&self) -> Vec<&str> {
        self.members.iter().map(|m| m.name.as_str()).collect()
    }

    pub fn shopping_list_mut(&mut self, list_id: ShoppingListId) -> Result<&mut ShoppingList> {
        self.shopping_lists
            .iter_mut()
            .find(|list| list.id == list_id)
            .ok_or_else(|| HouseholdError::not_found("Shopping list", list_id))
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(cook_count: u32) -> RecipeRef {
        RecipeRef::new(RecipeId::new(), cook_count)
    }

    #[test]
    fn test_leaderboard_rejects_more_than_two_entries() {
        let result = Leaderboard::new(vec![entry(3), entry(2), entry(1)]);
        assert!(matches!(result, Err(HouseholdError::InvalidLeaderboard { .. })));
    }

    #[test]
    fn test_leaderboard_rejects_duplicate_ids() {
        let a = entry(3);
        let result = Leaderboard::new(vec![a, RecipeRef::new(a.id, 1)]);
        assert!(matches!(result, Err(HouseholdError::InvalidLeaderboard { .. })));
    }

    #[test]
    fn test_leaderboard_from_ranked_truncates() {
        let ranked = vec![entry(9), entry(5), entry(1)];
        let board = Leaderboard::from_ranked(ranked.clone()).unwrap();
        assert_eq!(board.entries(), &ranked[..2]);
    }

    #[test]
    fn test_leaderboard_deserialization_enforces_invariant() {
        let a = entry(1);
        let json = serde_json::to_string(&vec![a, a]).unwrap();
        assert!(serde_json::from_str::<Leaderboard>(&json).is_err());

        let json = serde_json::to_string(&vec![a]).unwrap();
        let board: Leaderboard = serde_json::from_str(&json).unwrap();
        assert_eq!(board.entries(), &[a]);
    }

    #[test]
    fn test_ingredient_parsing() {
        let flour: Ingredient = "flour:200:g".parse().unwrap();
        assert_eq!(flour.label, "flour");
        assert_eq!(flour.amount, 200.0);
        assert_eq!(flour.unit, "g");

        let salt: Ingredient = "salt".parse().unwrap();
        assert_eq!(salt.amount, 0.0);
        assert_eq!(salt.unit, "");

        assert!("eggs:many".parse::<Ingredient>().is_err());
    }

    #[test]
    fn test_recipe_update_keeps_cook_count() {
        let mut recipe = Recipe::new(
            HouseholdId::new(),
            NewRecipe {
                title: "Soup".to_string(),
                created_by: "ana".to_string(),
                ..Default::default()
            },
        );
        recipe.mark_cooked();
        recipe.apply(RecipeUpdate {
            title: Some("Tomato soup".to_string()),
            tags: Some(vec![" dinner ".to_string(), "".to_string()]),
            ..Default::default()
        });

        assert_eq!(recipe.title, "Tomato soup");
        assert_eq!(recipe.tags, vec!["dinner"]);
        assert_eq!(recipe.cook_count, 1);
    }

    #[test]
    fn test_query_matches_tags_and_search() {
        let mut recipe = Recipe::new(
            HouseholdId::new(),
            NewRecipe {
                title: "Pancakes".to_string(),
                created_by: "ana".to_string(),
                tags: vec!["breakfast".to_string()],
                ingredients: vec!["Buttermilk:250:ml".parse().unwrap()],
                ..Default::default()
            },
        );
        recipe.instructions.push(InstructionStep::paragraph("Whisk everything"));

        let by_tag = RecipeQuery {
            tags: vec!["dinner".to_string(), "breakfast".to_string()],
            ..Default::default()
        };
        assert!(by_tag.matches(&recipe));

        let wrong_tag = RecipeQuery {
            tags: vec!["dinner".to_string()],
            ..Default::default()
        };
        assert!(!wrong_tag.matches(&recipe));

        for needle in ["pancake", "BUTTERMILK", "whisk"] {
            let query = RecipeQuery {
                search: Some(needle.to_string()),
                ..Default::default()
            };
            assert!(query.matches(&recipe), "expected match for {}", needle);
        }
    }

    #[test]
    fn test_query_offset() {
        let query = RecipeQuery {
            page: 3,
            per_page: 20,
            ..Default::default()
        };
        assert_eq!(query.offset(), 40);
        assert_eq!(RecipeQuery::default().offset(), 0);
    }

    #[test]
    fn test_household_members_are_unique() {
        let mut household = Household::new(" Flat 4 ", vec!["ana".to_string(), "ana".to_string()]);
        assert_eq!(household.name, "Flat 4");
        assert_eq!(household.member_names(), vec!["ana"]);
        assert!(household.add_member("ben"));
        assert!(!household.add_member(" ben "));

        let roles: Vec<MemberRole> = household.members.iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![MemberRole::Owner, MemberRole::Member]);
    }

    #[test]
    fn test_item_status_toggle() {
        assert_eq!(ItemStatus::Pending.toggled(), ItemStatus::Done);
        assert_eq!(ItemStatus::Done.toggled(), ItemStatus::Pending);
    }
}
