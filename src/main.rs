use anyhow::Context;
use clap::Parser;
use household_hub::config::cli::{
    Command, HouseholdCommand, ListCommand, PopularCommand, RecipeCommand,
};
use household_hub::config::StorageBackend;
use household_hub::domain::model::NewShoppingListItem;
use household_hub::domain::ports::{HouseholdStore, RecipeStore};
use household_hub::utils::error::ErrorSeverity;
use household_hub::utils::{logger, validation::Validate};
use household_hub::{
    AppConfig, CliConfig, HouseholdEngine, JsonFileStore, LocalStorage, MemoryStore,
};
use serde::Serialize;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 載入配置，命令列參數優先
    let mut config = AppConfig::from_file_or_default(&cli.config)
        .with_context(|| format!("failed to load config file '{}'", cli.config))?;
    if let Some(data_dir) = &cli.data_dir {
        config.storage.data_dir = data_dir.clone();
    }

    // 初始化日誌
    logger::init_cli_logger(
        cli.verbose,
        config.logging.format,
        config.logging.level.as_deref(),
    );
    tracing::debug!("CLI config: {:?}", cli);

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(1);
    }

    let result = match config.storage.backend {
        StorageBackend::Memory => {
            tracing::warn!("Using the in-memory store, nothing will be persisted");
            let store = MemoryStore::new();
            run(HouseholdEngine::new(store.clone(), store, &config), cli.command).await
        }
        StorageBackend::File => {
            tracing::debug!("Using data directory {}", config.storage.data_dir);
            let store = JsonFileStore::new(LocalStorage::new(&config.storage.data_dir));
            run(HouseholdEngine::new(store.clone(), store, &config), cli.command).await
        }
    };

    match result {
        Ok(output) => println!("{}", output),
        Err(e) => {
            tracing::error!(
                "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            // 根據錯誤嚴重程度決定退出碼
            let exit_code = match e.severity() {
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };
            std::process::exit(exit_code);
        }
    }

    Ok(())
}

async fn run<H, R>(engine: HouseholdEngine<H, R>, command: Command) -> household_hub::Result<String>
where
    H: HouseholdStore,
    R: RecipeStore,
{
    match command {
        Command::Household(command) => match command {
            HouseholdCommand::Create { name, members } => {
                named("household", &engine.create_household(&name, members).await?)
            }
            HouseholdCommand::Show { id } => named("household", &engine.get_household(id).await?),
            HouseholdCommand::AddMember { id, member } => {
                named("household", &engine.add_member(id, &member).await?)
            }
        },
        Command::List(command) => {
            let household = match command {
                ListCommand::Create { household, title } => {
                    engine.create_shopping_list(household, &title).await?
                }
                ListCommand::AddItem {
                    household,
                    list,
                    label,
                    amount,
                    unit,
                } => {
                    let item = NewShoppingListItem {
                        label,
                        amount,
                        unit,
                    };
                    engine.add_shopping_list_item(household, list, item).await?
                }
                ListCommand::ToggleItem {
                    household,
                    list,
                    item,
                } => engine.toggle_shopping_list_item(household, list, item).await?,
                ListCommand::RemoveItem {
                    household,
                    list,
                    item,
                } => engine.remove_shopping_list_item(household, list, item).await?,
                ListCommand::Delete { household, list } => {
                    engine.delete_shopping_list(household, list).await?
                }
            };
            named("household", &household)
        }
        Command::Recipe(command) => match command {
            RecipeCommand::Create {
                household,
                title,
                created_by,
                fields,
            } => {
                let input = fields.into_new_recipe(title, created_by);
                named("recipe", &engine.create_recipe(household, input).await?)
            }
            RecipeCommand::Update { id, title, fields } => {
                named("recipe", &engine.update_recipe(id, fields.into_update(title)).await?)
            }
            RecipeCommand::Show { id } => named("recipe", &engine.get_recipe(id).await?),
            RecipeCommand::List {
                household,
                page,
                per_page,
                tags,
                search,
            } => {
                let mut query = engine.recipe_query(page, per_page);
                query.tags = tags;
                query.search = search;
                named("recipes", &engine.list_recipes(household, &query).await?)
            }
            RecipeCommand::Cooked { id } => data(&engine.mark_cooked(id).await?),
            RecipeCommand::Delete { id } => named("household", &engine.delete_recipe(id).await?),
        },
        Command::Popular(command) => match command {
            PopularCommand::Refresh { household } => named(
                "household",
                &engine.refresh_popular_recipes(household).await?,
            ),
            PopularCommand::Show { household } => {
                named("recipes", &engine.popular_recipes(household).await?)
            }
        },
    }
}

/// `{"data": value}`
fn data<T: Serialize>(value: &T) -> household_hub::Result<String> {
    let body = serde_json::json!({ "data": value });
    Ok(serde_json::to_string_pretty(&body)?)
}

/// `{"data": {key: value}}`
fn named<T: Serialize>(key: &str, value: &T) -> household_hub::Result<String> {
    let mut inner = serde_json::Map::new();
    inner.insert(key.to_string(), serde_json::to_value(value)?);
    data(&inner)
}
