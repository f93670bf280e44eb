use anyhow::{anyhow, Context, Result};
use diet_engine::adherence::{compare, MacroTargets};
use diet_engine::cli::{parse_args, Command};
use diet_engine::config::{Config, CATALOG_ENV_VAR, PROFILES_ENV_VAR};
use diet_engine::macro_aggregator::{aggregate, ingredient_breakdown};
use diet_engine::models::{FoodNutrientRecord, Recipe};
use diet_engine::providers::{open_catalog, require_profile, JsonProfileFile};
use diet_engine::restriction_evaluator::conflict_report;
use diet_engine::substitution::plan_substitution;
use log::{debug, info};
use serde::Serialize;
use serde_json::json;
use std::path::{Path, PathBuf};
use tokio::fs;

async fn read_recipe(path: &Path) -> Result<Recipe> {
    let contents = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read recipe file '{}'", path.display()))?;
    let recipe: Recipe = serde_json::from_str(&contents)
        .with_context(|| format!("Recipe file '{}' is not valid recipe JSON", path.display()))?;
    debug!("Read recipe '{}' with {} ingredients", recipe.recipe_title, recipe.ingredients.len());
    Ok(recipe)
}

fn print_json(value: &impl Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn profiles_path(cli_path: Option<PathBuf>, config: &Config) -> Result<PathBuf> {
    cli_path
        .or_else(|| config.profiles_path.clone())
        .ok_or_else(|| anyhow!("No restriction profiles configured; pass --profiles or set {}", PROFILES_ENV_VAR))
}

fn find_food<'a>(catalog: &'a [FoodNutrientRecord], food_id: &str) -> Result<&'a FoodNutrientRecord> {
    catalog
        .iter()
        .find(|food| food.id == food_id)
        .ok_or_else(|| anyhow!("Food '{}' is not in the catalog", food_id))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = parse_args();
    let config = Config::load(cli.config.as_deref())?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.log_level.as_str())).init();

    let catalog_path = cli
        .catalog
        .clone()
        .or_else(|| config.catalog_path.clone())
        .ok_or_else(|| anyhow!("No food catalog configured; pass --catalog or set {}", CATALOG_ENV_VAR))?;
    let catalog = open_catalog(&catalog_path)?
        .foods()
        .with_context(|| format!("Failed to load food catalog from '{}'", catalog_path.display()))?;
    info!("Food catalog loaded: {} items", catalog.len());

    match cli.command {
        Command::Totals { recipe, servings } => {
            let recipe = read_recipe(&recipe).await?;
            let totals = aggregate(&recipe.ingredients, &catalog);
            let servings = servings.filter(|s| *s > 0.0).or_else(|| recipe.serving_count());
            let per_serving = servings.map(|s| totals.scaled(1.0 / s).rounded(config.display_decimals));

            print_json(&json!({
                "recipe_title": recipe.recipe_title,
                "totals": totals.rounded(config.display_decimals),
                "servings": servings,
                "per_serving": per_serving,
                "energy_split": totals.energy_split(),
                "ingredients": ingredient_breakdown(&recipe.ingredients, &catalog),
            }))?;
        }
        Command::Conflicts { recipe, user } => {
            let recipe = read_recipe(&recipe).await?;
            let profiles = JsonProfileFile::new(profiles_path(cli.profiles, &config)?);
            let profile = require_profile(&profiles, &user)?;
            let report = conflict_report(&recipe.ingredients, &catalog, Some(&profile));
            info!("{} of {} ingredients flagged for user '{}'", report.len(), recipe.ingredients.len(), user);
            print_json(&report)?;
        }
        Command::Substitutes { food, user } => {
            let profiles = JsonProfileFile::new(profiles_path(cli.profiles, &config)?);
            let profile = require_profile(&profiles, &user)?;
            let conflicting = find_food(&catalog, &food)?;
            let plan = plan_substitution(conflicting, &profile, &catalog, &config.substitution_rules);
            print_json(&plan)?;
        }
        Command::Adherence { recipe, protein, carbs, fat, calories } => {
            let recipe = read_recipe(&recipe).await?;
            let consumed = aggregate(&recipe.ingredients, &catalog);
            let targets = MacroTargets {
                proteins: protein,
                carbs,
                fats: fat,
                calories,
            };
            print_json(&json!({
                "consumed": consumed.rounded(config.display_decimals),
                "report": compare(&consumed, &targets),
            }))?;
        }
    }

    Ok(())
}
