use anyhow::Result;

use pantry_core::models::RecipeDraft;
use pantry_core::service::{PantryService, RECIPE_ADDED};

use super::helpers::{
    format_ingredient_list, parse_amount, parse_recipe_ingredient, print_recipe_table,
};

pub(crate) struct RecipeArgs {
    pub title: String,
    pub ingredients: Vec<String>,
    pub instructions: Option<String>,
    pub taste: Option<String>,
    pub cuisine: Option<String>,
    pub prep_time: Option<String>,
}

pub(crate) fn cmd_recipe_add(service: &PantryService, args: RecipeArgs, json: bool) -> Result<()> {
    let ingredients = args
        .ingredients
        .iter()
        .map(|s| parse_recipe_ingredient(s))
        .collect::<Result<Vec<_>>>()?;

    let recipe = service.add_recipe(RecipeDraft {
        title: Some(args.title),
        ingredients: Some(ingredients),
        taste: args.taste,
        cuisine: args.cuisine,
        preparation_time: args.prep_time.as_deref().map(parse_amount),
        reviews: None,
        instructions: args.instructions,
    })?;

    if json {
        println!("{}", serde_json::to_string_pretty(&recipe)?);
    } else {
        println!("{RECIPE_ADDED}");
        println!("  {}: {}", recipe.title, format_ingredient_list(&recipe.ingredients));
    }
    Ok(())
}

pub(crate) fn cmd_recipe_list(
    service: &PantryService,
    taste: Option<&str>,
    json: bool,
) -> Result<()> {
    let recipes = service.list_recipes(taste)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&recipes)?);
    } else if recipes.is_empty() {
        match taste {
            Some(t) => println!("No recipes with taste '{t}'."),
            None => println!("No recipes yet. Add one with: pantry recipe add <title> ..."),
        }
    } else {
        print_recipe_table(&recipes);
    }
    Ok(())
}
