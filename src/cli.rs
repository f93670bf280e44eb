use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Macro totals and dietary conflict checks for recipes", long_about = None)]
pub struct Cli {
    /// JSON configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Food catalog (.csv or .json); overrides the configured one
    #[arg(long, global = true)]
    pub catalog: Option<PathBuf>,

    /// Restriction profiles (.json keyed by user id); overrides the configured one
    #[arg(long, global = true)]
    pub profiles: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Macro and calorie totals of a recipe
    Totals {
        #[arg(short, long)]
        recipe: PathBuf,
        /// Number of servings; overrides the recipe's own
        #[arg(short, long)]
        servings: Option<f64>,
    },
    /// Ingredients of a recipe that conflict with (or suit) a user
    Conflicts {
        #[arg(short, long)]
        recipe: PathBuf,
        #[arg(short, long)]
        user: String,
    },
    /// Conflict-free replacements for one food
    Substitutes {
        #[arg(short, long)]
        food: String,
        #[arg(short, long)]
        user: String,
    },
    /// Recipe totals compared with macro targets in grams
    Adherence {
        #[arg(short, long)]
        recipe: PathBuf,
        #[arg(long)]
        protein: Option<f64>,
        #[arg(long)]
        carbs: Option<f64>,
        #[arg(long)]
        fat: Option<f64>,
        /// Kcal target; derived from the macro targets when all three are given
        #[arg(long)]
        calories: Option<f64>,
    },
}

pub fn parse_args() -> Cli {
    Cli::parse()
}
