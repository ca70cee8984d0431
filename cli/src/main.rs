mod assistant;
mod commands;
mod config;
mod gemini;
mod server;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use crate::commands::{
    RecipeArgs, cmd_chat, cmd_ingredient_add, cmd_ingredient_delete, cmd_ingredient_list,
    cmd_recipe_add, cmd_recipe_list, cmd_suggest,
};
use crate::config::Config;
use crate::gemini::GeminiClient;
use pantry_core::service::{PantryService, TextGenerator};

#[derive(Parser)]
#[command(
    name = "pantry",
    version,
    about = "Track your pantry, keep recipes, ask what to cook"
)]
struct Cli {
    /// Path to the SQLite database (overrides PANTRY_DB_PATH)
    #[arg(long, global = true, value_name = "PATH")]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the REST API server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "5000")]
        port: u16,
        /// Address to bind to (default: 127.0.0.1, use 0.0.0.0 to expose to network)
        #[arg(short, long, default_value = "127.0.0.1")]
        bind: String,
    },
    /// Manage pantry ingredients
    Ingredient {
        #[command(subcommand)]
        command: IngredientCommands,
    },
    /// Manage recipes
    Recipe {
        #[command(subcommand)]
        command: RecipeCommands,
    },
    /// Ask for recipe ideas in plain words (e.g. "something sweet with eggs and flour")
    Chat {
        /// Free-text message
        message: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Suggest a recipe for a taste and a set of ingredients on hand
    Suggest {
        /// Taste preference (sweet, savory, spicy, salty)
        #[arg(short, long)]
        preference: String,
        /// Ingredient you have (repeatable)
        #[arg(long = "have", value_name = "INGREDIENT", required = true)]
        have: Vec<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum IngredientCommands {
    /// Add an ingredient or replace its quantity and unit
    Add {
        /// Ingredient name
        name: String,
        /// Quantity on hand
        quantity: f64,
        /// Unit (e.g. g, ml, pcs)
        unit: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List pantry ingredients
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete an ingredient by name
    Delete {
        /// Ingredient name
        name: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum RecipeCommands {
    /// Add a recipe
    Add {
        /// Recipe title
        title: String,
        /// Ingredient as "name" or "name:amount" (repeatable)
        #[arg(short, long = "ingredient", value_name = "NAME[:AMOUNT]")]
        ingredients: Vec<String>,
        /// Preparation instructions
        #[arg(long)]
        instructions: Option<String>,
        /// Taste tag (e.g. sweet, savory)
        #[arg(long)]
        taste: Option<String>,
        /// Cuisine (e.g. Italian)
        #[arg(long)]
        cuisine: Option<String>,
        /// Preparation time (e.g. 30 or "1 hour")
        #[arg(long)]
        prep_time: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List recipes
    List {
        /// Only recipes whose taste contains this tag
        #[arg(long)]
        taste: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn text_generator(config: &Config) -> Result<Option<Arc<dyn TextGenerator>>> {
    let Some(ref settings) = config.gemini else {
        return Ok(None);
    };
    let client = GeminiClient::new(settings)?;
    Ok(Some(Arc::new(client)))
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.db)?;
    let service = PantryService::open(&config.db_path)?;

    match cli.command {
        Commands::Serve { port, bind } => {
            let generator = text_generator(&config)?;
            server::start_server(service, generator, port, &bind).await
        }
        Commands::Ingredient { command } => match command {
            IngredientCommands::Add {
                name,
                quantity,
                unit,
                json,
            } => cmd_ingredient_add(&service, &name, quantity, &unit, json),
            IngredientCommands::List { json } => cmd_ingredient_list(&service, json),
            IngredientCommands::Delete { name, json } => {
                cmd_ingredient_delete(&service, &name, json)
            }
        },
        Commands::Recipe { command } => match command {
            RecipeCommands::Add {
                title,
                ingredients,
                instructions,
                taste,
                cuisine,
                prep_time,
                json,
            } => cmd_recipe_add(
                &service,
                RecipeArgs {
                    title,
                    ingredients,
                    instructions,
                    taste,
                    cuisine,
                    prep_time,
                },
                json,
            ),
            RecipeCommands::List { taste, json } => {
                cmd_recipe_list(&service, taste.as_deref(), json)
            }
        },
        Commands::Chat { message, json } => {
            let generator = text_generator(&config)?;
            cmd_chat(&service, generator.as_deref(), &message, json).await
        }
        Commands::Suggest {
            preference,
            have,
            json,
        } => cmd_suggest(&service, &preference, &have, json),
    }
}
