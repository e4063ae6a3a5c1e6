//! Command-line arguments for the `mixmaster` admin front end

use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use mixmaster_config::{Composition, Slot};

#[derive(Debug, Parser)]
#[command(name = "mixmaster")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(arg_required_else_help = true)]
#[command(about = "Configure dispenser slots, recipes and glass size of the cocktail station")]
pub struct Cli {
    /// Directory holding ingredients.json, recipes.json and glass_size.json
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Directory holding recipe images (defaults to <data dir>/assets)
    #[arg(long, global = true)]
    pub assets_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the whole configuration
    Show,
    /// List ingredients and their slots
    Ingredients,
    /// List free dispenser slots
    Slots {
        /// Treat this ingredient's own slot as free
        #[arg(long)]
        excluding: Option<String>,
    },
    /// Register a new ingredient
    AddIngredient {
        name: String,
        /// Slot 1-10, or "-" for unassigned
        #[arg(long, default_value = "-")]
        slot: Slot,
    },
    /// Move an ingredient to another slot ("-" clears it)
    Assign { name: String, slot: Slot },
    /// Remove an ingredient
    RemoveIngredient { name: String },
    /// List recipes with their volumes
    Recipes,
    /// Add a recipe using the current glass size
    AddRecipe {
        name: String,
        /// Image reference produced by the asset manager
        #[arg(long)]
        image: Option<String>,
        /// Share of the glass, e.g. -i Gin=20 -i Tonic=80
        #[arg(short = 'i', long = "ingredient", value_parser = parse_share, required = true)]
        ingredients: Vec<(String, f64)>,
    },
    /// Replace a recipe's ingredient shares
    UpdateRecipe {
        name: String,
        #[arg(short = 'i', long = "ingredient", value_parser = parse_share, required = true)]
        ingredients: Vec<(String, f64)>,
    },
    /// Delete a recipe (starter recipes are protected)
    DeleteRecipe { name: String },
    /// Show milliliters per ingredient for a recipe
    Volumes { name: String },
    /// Show or change the station glass size in ml
    Glass { ml: Option<u32> },
}

/// Parse `NAME=PERCENT`; the name may itself contain spaces
fn parse_share(raw: &str) -> Result<(String, f64), String> {
    let (name, value) = raw
        .rsplit_once('=')
        .ok_or_else(|| format!("expected NAME=PERCENT, got '{raw}'"))?;
    let value = value
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("invalid percentage '{value}': {e}"))?;
    Ok((name.trim().to_string(), value))
}

/// Collect `-i` shares in the order given; naming an ingredient twice is an error
pub fn composition(shares: Vec<(String, f64)>) -> Result<Composition> {
    let mut composition = Composition::with_capacity(shares.len());
    for (name, percentage) in shares {
        if let Some(first) = composition.insert(name.clone(), percentage) {
            bail!("ingredient '{name}' is listed more than once ({first}% and {percentage}%)");
        }
    }
    Ok(composition)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_share() {
        assert_eq!(
            parse_share("Schweppes Raspberry=60").unwrap(),
            ("Schweppes Raspberry".to_string(), 60.0)
        );
        assert_eq!(parse_share(" Gin = 33.3 ").unwrap(), ("Gin".to_string(), 33.3));
        assert!(parse_share("Gin").is_err());
        assert!(parse_share("Gin=lots").is_err());
    }

    #[test]
    fn test_parse_add_recipe() {
        let cli = Cli::try_parse_from([
            "mixmaster",
            "add-recipe",
            "Mojito",
            "-i",
            "Rum=30",
            "-i",
            "Limette=10",
            "--ingredient",
            "Mineralwasser=60",
        ])
        .unwrap();
        match cli.command {
            Command::AddRecipe { name, image, ingredients } => {
                assert_eq!(name, "Mojito");
                assert_eq!(image, None);
                assert_eq!(ingredients.len(), 3);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_composition_keeps_order() {
        let shares = vec![("Tonic".to_string(), 80.0), ("Gin".to_string(), 20.0)];
        let composition = composition(shares).unwrap();
        let names: Vec<&str> = composition.keys().map(String::as_str).collect();
        assert_eq!(names, ["Tonic", "Gin"]);
    }

    #[test]
    fn test_composition_rejects_repeated_ingredient() {
        let cli = Cli::try_parse_from([
            "mixmaster",
            "add-recipe",
            "Double Gin",
            "-i",
            "Gin=50",
            "-i",
            "Tonic=50",
            "-i",
            "Gin=50",
        ])
        .unwrap();
        let Command::AddRecipe { ingredients, .. } = cli.command else {
            panic!("expected add-recipe");
        };

        let err = composition(ingredients).unwrap_err();
        assert!(err.to_string().contains("'Gin' is listed more than once"));
    }

    #[test]
    fn test_parse_assign_unassigned() {
        let cli = Cli::try_parse_from(["mixmaster", "assign", "Gin", "-"]).unwrap();
        assert!(matches!(cli.command, Command::Assign { slot: Slot::Unassigned, .. }));
    }

    #[test]
    fn test_rejects_out_of_range_slot() {
        assert!(Cli::try_parse_from(["mixmaster", "assign", "Gin", "11"]).is_err());
    }
}
