use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{PantryError, PantryResult};

pub const MISSING_INGREDIENT_FIELDS: &str = "Missing fields: name, quantity, or unit";
pub const MISSING_RECIPE_FIELDS: &str = "Missing fields: title, ingredients, or instructions";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    pub quantity: f64,
    pub unit: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewIngredient {
    pub name: String,
    pub quantity: f64,
    pub unit: String,
}

/// Ingredient payload as received from a client, before presence checks.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IngredientDraft {
    pub name: Option<String>,
    pub quantity: Option<f64>,
    pub unit: Option<String>,
}

impl IngredientDraft {
    /// Every field must be present and non-empty; a zero quantity counts as missing.
    pub fn validate(self) -> PantryResult<NewIngredient> {
        let name = self.name.filter(|n| !n.is_empty());
        let quantity = self.quantity.filter(|q| *q != 0.0);
        let unit = self.unit.filter(|u| !u.is_empty());

        match (name, quantity, unit) {
            (Some(name), Some(quantity), Some(unit)) => Ok(NewIngredient {
                name,
                quantity,
                unit,
            }),
            _ => Err(PantryError::validation(MISSING_INGREDIENT_FIELDS)),
        }
    }
}

/// One line of a recipe's ingredient list. `amount` is free-form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeIngredient {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Value>,
}

impl RecipeIngredient {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            amount: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    #[serde(skip)]
    pub id: i64,
    pub title: String,
    pub ingredients: Vec<RecipeIngredient>,
    pub taste: Option<String>,
    pub cuisine: Option<String>,
    pub preparation_time: Option<Value>,
    pub reviews: Option<Value>,
    pub instructions: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewRecipe {
    pub title: String,
    pub ingredients: Vec<RecipeIngredient>,
    pub taste: Option<String>,
    pub cuisine: Option<String>,
    pub preparation_time: Option<Value>,
    pub reviews: Option<Value>,
    pub instructions: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecipeDraft {
    pub title: Option<String>,
    pub ingredients: Option<Vec<RecipeIngredient>>,
    pub taste: Option<String>,
    pub cuisine: Option<String>,
    pub preparation_time: Option<Value>,
    pub reviews: Option<Value>,
    pub instructions: Option<String>,
}

impl RecipeDraft {
    pub fn validate(self) -> PantryResult<NewRecipe> {
        let title = self.title.filter(|t| !t.is_empty());
        let ingredients = self.ingredients.filter(|i| !i.is_empty());
        let instructions = self.instructions.filter(|i| !i.is_empty());

        let (Some(title), Some(ingredients), Some(instructions)) = (title, ingredients, instructions)
        else {
            return Err(PantryError::validation(MISSING_RECIPE_FIELDS));
        };

        Ok(NewRecipe {
            title,
            ingredients,
            taste: self.taste,
            cuisine: self.cuisine,
            preparation_time: self.preparation_time,
            reviews: self.reviews,
            instructions,
        })
    }
}

/// What the chatbot hands back for a matched recipe.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecipeSummary {
    pub title: String,
    pub ingredients: Vec<RecipeIngredient>,
    pub instructions: String,
}

impl From<&Recipe> for RecipeSummary {
    fn from(recipe: &Recipe) -> Self {
        Self {
            title: recipe.title.clone(),
            ingredients: recipe.ingredients.clone(),
            instructions: recipe.instructions.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatReply {
    pub response: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub recipes: Vec<RecipeSummary>,
    /// Free-form answer from the text generator, when one is configured and succeeded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated: Option<String>,
}
