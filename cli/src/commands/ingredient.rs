use std::process;

use anyhow::Result;

use pantry_core::error::PantryError;
use pantry_core::models::IngredientDraft;
use pantry_core::service::{INGREDIENT_DELETED, INGREDIENT_SAVED, PantryService};

use super::helpers::{json_error, print_ingredient_table};

pub(crate) fn cmd_ingredient_add(
    service: &PantryService,
    name: &str,
    quantity: f64,
    unit: &str,
    json: bool,
) -> Result<()> {
    let saved = service.add_or_update_ingredient(IngredientDraft {
        name: Some(name.to_string()),
        quantity: Some(quantity),
        unit: Some(unit.to_string()),
    })?;

    if json {
        println!("{}", serde_json::to_string_pretty(&saved)?);
    } else {
        println!("{INGREDIENT_SAVED}");
        println!("  {} {} {}", saved.name, saved.quantity, saved.unit);
    }
    Ok(())
}

pub(crate) fn cmd_ingredient_list(service: &PantryService, json: bool) -> Result<()> {
    let ingredients = service.list_ingredients()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&ingredients)?);
    } else if ingredients.is_empty() {
        println!("Pantry is empty. Add one with: pantry ingredient add <name> <quantity> <unit>");
    } else {
        print_ingredient_table(&ingredients);
    }
    Ok(())
}

pub(crate) fn cmd_ingredient_delete(service: &PantryService, name: &str, json: bool) -> Result<()> {
    match service.delete_ingredient(name) {
        Ok(()) => {
            if json {
                println!("{}", serde_json::json!({ "message": INGREDIENT_DELETED }));
            } else {
                println!("{INGREDIENT_DELETED}");
            }
            Ok(())
        }
        Err(PantryError::NotFound(msg)) => {
            if json {
                println!("{}", json_error(&msg));
            } else {
                eprintln!("{msg}");
            }
            process::exit(2);
        }
        Err(e) => Err(e.into()),
    }
}
