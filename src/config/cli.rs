use crate::domain::model::{
    HouseholdId, Ingredient, InstructionStep, ItemId, NewRecipe, RecipeId, RecipeUpdate,
    ShoppingListId,
};
use clap::{Args, Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "household")]
#[command(about = "Manage households, recipes and shopping lists")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long, global = true, default_value = "household.toml")]
    pub config: String,

    /// Override the data directory from the config file
    #[arg(long, global = true)]
    pub data_dir: Option<String>,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Create and inspect households
    #[command(subcommand)]
    Household(HouseholdCommand),
    /// Edit a household's shopping lists
    #[command(subcommand)]
    List(ListCommand),
    #[command(subcommand)]
    Recipe(RecipeCommand),
    /// Most popular recipes of a household
    #[command(subcommand)]
    Popular(PopularCommand),
}

#[derive(Debug, Clone, Subcommand)]
pub enum HouseholdCommand {
    Create {
        #[arg(long)]
        name: String,
        #[arg(long = "member")]
        members: Vec<String>,
    },
    Show {
        id: HouseholdId,
    },
    AddMember {
        id: HouseholdId,
        member: String,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum ListCommand {
    Create {
        household: HouseholdId,
        #[arg(long)]
        title: String,
    },
    AddItem {
        household: HouseholdId,
        list: ShoppingListId,
        #[arg(long)]
        label: String,
        #[arg(long, default_value = "1")]
        amount: f64,
        #[arg(long, default_value = "")]
        unit: String,
    },
    /// Flip an item between pending and done
    ToggleItem {
        household: HouseholdId,
        list: ShoppingListId,
        item: ItemId,
    },
    RemoveItem {
        household: HouseholdId,
        list: ShoppingListId,
        item: ItemId,
    },
    Delete {
        household: HouseholdId,
        list: ShoppingListId,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum RecipeCommand {
    Create {
        household: HouseholdId,
        #[arg(long)]
        title: String,
        #[arg(long)]
        created_by: String,
        #[command(flatten)]
        fields: RecipeFields,
    },
    Update {
        id: RecipeId,
        #[arg(long)]
        title: Option<String>,
        #[command(flatten)]
        fields: RecipeFields,
    },
    Show {
        id: RecipeId,
    },
    List {
        household: HouseholdId,
        #[arg(long, default_value = "1")]
        page: usize,
        #[arg(long)]
        per_page: Option<usize>,
        #[arg(long, value_delimiter = ',')]
        tags: Vec<String>,
        #[arg(long)]
        search: Option<String>,
    },
    /// Record that the recipe was cooked once more
    Cooked {
        id: RecipeId,
    },
    Delete {
        id: RecipeId,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum PopularCommand {
    /// Recompute the leaderboard from current cook counts
    Refresh { household: HouseholdId },
    Show { household: HouseholdId },
}

#[derive(Debug, Clone, Default, Args)]
pub struct RecipeFields {
    #[arg(long)]
    pub url: Option<String>,
    #[arg(long)]
    pub note: Option<String>,
    #[arg(long = "tag")]
    pub tags: Vec<String>,
    /// Ingredient as label:amount:unit
    #[arg(long = "ingredient")]
    pub ingredients: Vec<Ingredient>,
    /// Instruction step, in order
    #[arg(long = "step")]
    pub steps: Vec<String>,
}

impl RecipeFields {
    pub fn into_new_recipe(self, title: String, created_by: String) -> NewRecipe {
        NewRecipe {
            title,
            created_by,
            ingredients: self.ingredients,
            instructions: self.steps.into_iter().map(InstructionStep::paragraph).collect(),
            url: self.url,
            note: self.note,
            tags: self.tags,
        }
    }

    /// Empty repeated flags leave the stored values alone.
    pub fn into_update(self, title: Option<String>) -> RecipeUpdate {
        RecipeUpdate {
            title,
            url: self.url,
            note: self.note,
            tags: non_empty(self.tags),
            ingredients: non_empty(self.ingredients),
            instructions: non_empty(self.steps)
                .map(|steps| steps.into_iter().map(InstructionStep::paragraph).collect()),
        }
    }
}

fn non_empty<T>(values: Vec<T>) -> Option<Vec<T>> {
    if values.is_empty() {
        None
    } else {
        Some(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_recipe_create() {
        let household = HouseholdId::new();
        let id = household.to_string();
        let config = CliConfig::try_parse_from([
            "household",
            "recipe",
            "create",
            id.as_str(),
            "--title",
            "Pancakes",
            "--created-by",
            "ana",
            "--tag",
            "breakfast",
            "--ingredient",
            "flour:200:g",
            "--step",
            "Mix",
        ])
        .unwrap();

        match config.command {
            Command::Recipe(RecipeCommand::Create {
                household: parsed,
                title,
                created_by,
                fields,
            }) => {
                assert_eq!(parsed, household);
                let recipe = fields.into_new_recipe(title, created_by);
                assert_eq!(recipe.title, "Pancakes");
                assert_eq!(recipe.tags, vec!["breakfast"]);
                assert_eq!(recipe.ingredients[0].unit, "g");
                assert_eq!(recipe.instructions[0].text, "Mix");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_update_without_flags_is_empty() {
        let update = RecipeFields::default().into_update(None);
        assert!(update.is_empty());
    }

    #[test]
    fn test_update_only_replaces_given_lists() {
        let fields = RecipeFields {
            ingredients: vec!["salt:1:tsp".parse().unwrap()],
            ..Default::default()
        };
        let update = fields.into_update(None);

        assert_eq!(update.ingredients.map(|i| i.len()), Some(1));
        assert!(update.tags.is_none());
        assert!(update.instructions.is_none());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let id = HouseholdId::new().to_string();
        let config = CliConfig::try_parse_from([
            "household",
            "popular",
            "show",
            id.as_str(),
            "--data-dir",
            "/tmp/kitchen",
            "-v",
        ])
        .unwrap();

        assert_eq!(config.data_dir.as_deref(), Some("/tmp/kitchen"));
        assert!(config.verbose);
    }

    #[test]
    fn test_invalid_id_is_rejected() {
        let result = CliConfig::try_parse_from(["household", "household", "show", "not-an-id"]);
        assert!(result.is_err());
    }
}
