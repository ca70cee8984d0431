use anyhow::{Result, bail};
use serde::Serialize;
use serde_json::Value;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use pantry_core::models::{Ingredient, Recipe, RecipeIngredient};

/// Numbers stay numbers; anything else is kept as free text ("2 cups", "a pinch").
pub(crate) fn parse_amount(s: &str) -> Value {
    let s = s.trim();
    if let Ok(n) = s.parse::<i64>() {
        return Value::from(n);
    }
    match s.parse::<f64>() {
        Ok(f) if f.is_finite() => Value::from(f),
        _ => Value::from(s),
    }
}

/// Parse `name` or `name:amount` from the command line.
pub(crate) fn parse_recipe_ingredient(s: &str) -> Result<RecipeIngredient> {
    let (name, amount) = match s.split_once(':') {
        Some((name, amount)) => (name.trim(), Some(amount.trim())),
        None => (s.trim(), None),
    };
    if name.is_empty() {
        bail!("Invalid ingredient '{s}'. Use 'name' or 'name:amount'");
    }
    Ok(RecipeIngredient {
        name: name.to_string(),
        amount: amount.filter(|a| !a.is_empty()).map(parse_amount),
    })
}

pub(crate) fn format_amount(amount: Option<&Value>) -> String {
    match amount {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

pub(crate) fn format_ingredient_list(ingredients: &[RecipeIngredient]) -> String {
    ingredients
        .iter()
        .map(|i| match format_amount(i.amount.as_ref()) {
            a if a.is_empty() => i.name.clone(),
            a => format!("{} ({a})", i.name),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

pub(crate) fn print_ingredient_table(ingredients: &[Ingredient]) {
    #[derive(Tabled)]
    struct IngredientRow {
        #[tabled(rename = "Name")]
        name: String,
        #[tabled(rename = "Quantity")]
        quantity: String,
        #[tabled(rename = "Unit")]
        unit: String,
        #[tabled(rename = "Updated")]
        updated: String,
    }

    let rows: Vec<IngredientRow> = ingredients
        .iter()
        .map(|i| IngredientRow {
            name: truncate(&i.name, 30),
            quantity: format!("{}", i.quantity),
            unit: i.unit.clone(),
            updated: i.updated_at.chars().take(19).collect(),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(1..2)).with(Alignment::right()))
        .to_string();
    println!("{table}");
}

pub(crate) fn print_recipe_table(recipes: &[Recipe]) {
    #[derive(Tabled)]
    struct RecipeRow {
        #[tabled(rename = "Title")]
        title: String,
        #[tabled(rename = "Taste")]
        taste: String,
        #[tabled(rename = "Cuisine")]
        cuisine: String,
        #[tabled(rename = "Prep")]
        prep: String,
        #[tabled(rename = "Ingredients")]
        ingredients: String,
    }

    let rows: Vec<RecipeRow> = recipes
        .iter()
        .map(|r| RecipeRow {
            title: truncate(&r.title, 30),
            taste: r.taste.clone().unwrap_or_else(|| "-".into()),
            cuisine: r.cuisine.clone().unwrap_or_else(|| "-".into()),
            prep: r
                .preparation_time
                .as_ref()
                .map_or_else(|| "-".into(), |v| format_amount(Some(v))),
            ingredients: truncate(&format_ingredient_list(&r.ingredients), 50),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(3..4)).with(Alignment::right()))
        .to_string();
    println!("{table}");
}

pub(crate) fn json_error(message: &str) -> String {
    #[derive(Serialize)]
    struct CliError<'a> {
        error: &'a str,
    }
    serde_json::to_string(&CliError { error: message })
        .unwrap_or_else(|_| format!("{{\"error\":\"{message}\"}}"))
}

pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let end = s.char_indices().nth(max - 3).map_or(s.len(), |(i, _)| i);
        format!("{}...", &s[..end])
    }
}
