use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params, types::Type};
use serde_json::Value;

use crate::models::{Ingredient, NewIngredient, NewRecipe, Recipe, RecipeIngredient};

const RECIPE_COLUMNS: &str =
    "id, title, ingredients, taste, cuisine, preparation_time, reviews, instructions";

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        let db = Database { conn };
        db.migrate()?;
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Database { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<()> {
        let version: i64 = self
            .conn
            .pragma_query_value(None, "user_version", |row| row.get(0))?;

        if version < 1 {
            self.conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS ingredients (
                    name TEXT PRIMARY KEY NOT NULL,
                    quantity REAL NOT NULL,
                    unit TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS recipes (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    title TEXT NOT NULL,
                    ingredients TEXT NOT NULL,
                    taste TEXT,
                    cuisine TEXT,
                    preparation_time TEXT,
                    reviews TEXT,
                    instructions TEXT NOT NULL
                );

                PRAGMA user_version = 1;",
            )?;
        }

        Ok(())
    }

    // --- Row mapping helpers ---

    fn ingredient_from_row(row: &rusqlite::Row) -> rusqlite::Result<Ingredient> {
        Ok(Ingredient {
            name: row.get(0)?,
            quantity: row.get(1)?,
            unit: row.get(2)?,
            updated_at: row.get(3)?,
        })
    }

    // Expects RECIPE_COLUMNS order.
    fn recipe_from_row(row: &rusqlite::Row) -> rusqlite::Result<Recipe> {
        let ingredients: Vec<RecipeIngredient> = json_column(row, 2)?;
        let preparation_time: Option<Value> = optional_json_column(row, 5)?;
        let reviews: Option<Value> = optional_json_column(row, 6)?;
        Ok(Recipe {
            id: row.get(0)?,
            title: row.get(1)?,
            ingredients,
            taste: row.get(3)?,
            cuisine: row.get(4)?,
            preparation_time,
            reviews,
            instructions: row.get(7)?,
        })
    }

    // --- Ingredients ---

    /// Insert or replace quantity/unit for `name`, stamping `updated_at` with the current UTC time.
    pub fn upsert_ingredient(&self, ingredient: &NewIngredient) -> Result<Ingredient> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO ingredients (name, quantity, unit, updated_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(name) DO UPDATE SET
                quantity = excluded.quantity,
                unit = excluded.unit,
                updated_at = excluded.updated_at",
            params![ingredient.name, ingredient.quantity, ingredient.unit, now],
        )?;
        self.get_ingredient(&ingredient.name)?
            .context("Ingredient vanished after upsert")
    }

    pub fn get_ingredient(&self, name: &str) -> Result<Option<Ingredient>> {
        let ingredient = self
            .conn
            .query_row(
                "SELECT name, quantity, unit, updated_at FROM ingredients WHERE name = ?1",
                params![name],
                Self::ingredient_from_row,
            )
            .optional()?;
        Ok(ingredient)
    }

    pub fn list_ingredients(&self) -> Result<Vec<Ingredient>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name, quantity, unit, updated_at FROM ingredients ORDER BY rowid")?;
        let ingredients = stmt
            .query_map([], Self::ingredient_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ingredients)
    }

    /// Returns false when nothing was stored under `name`.
    pub fn delete_ingredient(&self, name: &str) -> Result<bool> {
        let rows = self
            .conn
            .execute("DELETE FROM ingredients WHERE name = ?1", params![name])?;
        Ok(rows > 0)
    }

    // --- Recipes ---

    pub fn insert_recipe(&self, recipe: &NewRecipe) -> Result<Recipe> {
        let ingredients =
            serde_json::to_string(&recipe.ingredients).context("failed to encode ingredients")?;
        let preparation_time = recipe
            .preparation_time
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .context("failed to encode preparation_time")?;
        let reviews = recipe
            .reviews
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .context("failed to encode reviews")?;

        self.conn.execute(
            "INSERT INTO recipes
                (title, ingredients, taste, cuisine, preparation_time, reviews, instructions)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                recipe.title,
                ingredients,
                recipe.taste,
                recipe.cuisine,
                preparation_time,
                reviews,
                recipe.instructions,
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        self.get_recipe_by_id(id)
    }

    pub fn get_recipe_by_id(&self, id: i64) -> Result<Recipe> {
        self.conn
            .query_row(
                &format!("SELECT {RECIPE_COLUMNS} FROM recipes WHERE id = ?1"),
                params![id],
                Self::recipe_from_row,
            )
            .context("Recipe not found")
    }

    pub fn list_recipes(&self) -> Result<Vec<Recipe>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {RECIPE_COLUMNS} FROM recipes ORDER BY id"))?;
        let recipes = stmt
            .query_map([], Self::recipe_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(recipes)
    }
}

fn json_column<T: serde::de::DeserializeOwned>(
    row: &rusqlite::Row,
    idx: usize,
) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn optional_json_column<T: serde::de::DeserializeOwned>(
    row: &rusqlite::Row,
    idx: usize,
) -> rusqlite::Result<Option<T>> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|s| {
        serde_json::from_str(&s)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
    })
    .transpose()
}
