#![forbid(unsafe_code)]

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use indexmap::IndexMap;
use tracing::{Level as TraceLevel, debug};
use tracing_subscriber::FmtSubscriber;

use cli::{Cli, Command, composition};
use mixmaster_config::constants::storage;
use mixmaster_config::{AssetDirectory, FallbackReason, JsonDirStorage, Recipe, Station};

fn init_logging() -> Result<()> {
    // Parse log level from environment variable
    let log_level = match std::env::var("LOG_LEVEL")
        .unwrap_or_else(|_| "info".to_string())
        .to_lowercase()
        .as_str()
    {
        "trace" => TraceLevel::TRACE,
        "debug" => TraceLevel::DEBUG,
        "warn" => TraceLevel::WARN,
        "error" => TraceLevel::ERROR,
        _ => TraceLevel::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber).context("Failed to install log subscriber")
}

fn print_volumes(volumes: &IndexMap<String, f64>) {
    for (ingredient, ml) in volumes {
        println!("    {ingredient:<24} {ml:>7.1} ml");
    }
}

fn print_recipe(recipe: &Recipe) {
    let marker = if recipe.is_protected() { " (starter)" } else { "" };
    println!("{}{marker}, {} ml glass", recipe.name(), recipe.glass_size());
    for (ingredient, percentage) in recipe.ingredients() {
        println!("    {ingredient:<24} {percentage:>6.1} %");
    }
}

fn main() -> Result<()> {
    init_logging()?;
    let cli = Cli::parse();

    let data_dir = cli.data_dir.unwrap_or_else(JsonDirStorage::default_dir);
    let assets_dir = cli
        .assets_dir
        .unwrap_or_else(|| data_dir.join(storage::ASSETS_DIR));
    debug!(data_dir = %data_dir.display(), assets_dir = %assets_dir.display(), "Resolved directories");

    let (station, fallbacks) = Station::open_reporting(JsonDirStorage::new(&data_dir));
    let mut station = station.with_assets(AssetDirectory::new(assets_dir));
    for fallback in fallbacks {
        match fallback.reason {
            FallbackReason::Missing => {}
            FallbackReason::Unreadable(reason) | FallbackReason::Corrupt(reason) => {
                eprintln!("warning: stored {} unusable ({reason}), using defaults", fallback.resource);
            }
        }
    }

    match cli.command {
        Command::Show => {
            println!("Glass size: {} ml", station.glass_size());
            println!();
            println!("Ingredients:");
            for ingredient in station.ingredients().list() {
                println!("    {:<24} {}", ingredient.name, ingredient.slot);
            }
            println!();
            println!("Recipes:");
            for recipe in station.recipes().list() {
                print_recipe(recipe);
            }
        }
        Command::Ingredients => {
            for ingredient in station.ingredients().list() {
                println!("{:<24} {}", ingredient.name, ingredient.slot);
            }
        }
        Command::Slots { excluding } => {
            let free: Vec<String> = station
                .available_slots(excluding.as_deref())
                .iter()
                .map(ToString::to_string)
                .collect();
            println!("{}", free.join(" "));
        }
        Command::AddIngredient { name, slot } => {
            station
                .register_ingredient(&name, slot)
                .with_context(|| format!("Failed to add ingredient '{name}'"))?;
            println!("{name} added (slot {slot})");
        }
        Command::Assign { name, slot } => {
            station
                .assign_slot(&name, slot)
                .with_context(|| format!("Failed to assign slot {slot} to '{name}'"))?;
            println!("{name} now uses slot {slot}");
        }
        Command::RemoveIngredient { name } => {
            station
                .unregister_ingredient(&name)
                .with_context(|| format!("Failed to remove ingredient '{name}'"))?;
            println!("{name} removed");
        }
        Command::Recipes => {
            for recipe in station.recipes().list() {
                print_recipe(recipe);
                print_volumes(&recipe.volumes());
            }
        }
        Command::AddRecipe { name, image, ingredients } => {
            let ingredients = composition(ingredients)?;
            station
                .add_recipe_with_image(&name, image.as_deref().unwrap_or_default(), ingredients)
                .with_context(|| format!("Failed to add recipe '{name}'"))?;
            println!("{name} added");
            print_volumes(&station.recipe_volumes(&name)?);
        }
        Command::UpdateRecipe { name, ingredients } => {
            let ingredients = composition(ingredients)?;
            station
                .update_recipe(&name, ingredients)
                .with_context(|| format!("Failed to update recipe '{name}'"))?;
            println!("{name} updated");
            print_volumes(&station.recipe_volumes(&name)?);
        }
        Command::DeleteRecipe { name } => {
            station
                .delete_recipe(&name)
                .with_context(|| format!("Failed to delete recipe '{name}'"))?;
            println!("{name} deleted");
        }
        Command::Volumes { name } => {
            print_volumes(&station.recipe_volumes(&name)?);
        }
        Command::Glass { ml: None } => {
            println!("{} ml", station.glass_size());
        }
        Command::Glass { ml: Some(ml) } => {
            station
                .set_glass_size(ml)
                .context("Failed to change glass size")?;
            println!("Glass size set to {} ml", station.glass_size());
        }
    }

    Ok(())
}
