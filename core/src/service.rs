use std::collections::HashSet;
use std::future::Future;
use std::path::Path;
use std::pin::Pin;

use anyhow::Result;

use crate::db::Database;
use crate::error::{PantryError, PantryResult};
use crate::matcher::{KeywordClassifier, MessageClassifier, match_recipes, taste_matches};
use crate::models::{
    ChatReply, Ingredient, IngredientDraft, Recipe, RecipeDraft, RecipeSummary,
};

pub const INGREDIENT_SAVED: &str = "Ingredient added/updated successfully.";
pub const INGREDIENT_DELETED: &str = "Ingredient deleted successfully.";
pub const INGREDIENT_NOT_FOUND: &str = "Ingredient not found.";
pub const RECIPE_ADDED: &str = "Recipe added successfully.";
pub const MISSING_MESSAGE: &str = "Missing field: message";
pub const MISSING_SUGGEST_FIELDS: &str = "Missing fields: preference or available_ingredients";
pub const NO_FREE_TEXT_MATCH: &str =
    "Sorry, we couldn't find any recipes that match your preferences.";
pub const NO_STRUCTURED_MATCH: &str = "No matching recipes found.";

/// Free-text completion provider used to enrich chatbot answers.
///
/// The server implements this with reqwest against Gemini; tests use canned
/// fakes. Matching never depends on it.
pub trait TextGenerator: Send + Sync {
    fn generate<'a>(
        &'a self,
        prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>>;
}

pub struct PantryService {
    db: Database,
    classifier: Box<dyn MessageClassifier>,
}

impl PantryService {
    pub fn new(db: Database) -> Self {
        Self {
            db,
            classifier: Box::new(KeywordClassifier),
        }
    }

    pub fn open(db_path: &Path) -> Result<Self> {
        Ok(Self::new(Database::open(db_path)?))
    }

    pub fn open_in_memory() -> Result<Self> {
        Ok(Self::new(Database::open_in_memory()?))
    }

    #[must_use]
    pub fn with_classifier(mut self, classifier: Box<dyn MessageClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    // --- Ingredients ---

    pub fn add_or_update_ingredient(&self, draft: IngredientDraft) -> PantryResult<Ingredient> {
        let ingredient = draft.validate()?;
        Ok(self.db.upsert_ingredient(&ingredient)?)
    }

    pub fn list_ingredients(&self) -> PantryResult<Vec<Ingredient>> {
        Ok(self.db.list_ingredients()?)
    }

    pub fn delete_ingredient(&self, name: &str) -> PantryResult<()> {
        if self.db.delete_ingredient(name)? {
            Ok(())
        } else {
            Err(PantryError::not_found(INGREDIENT_NOT_FOUND))
        }
    }

    // --- Recipes ---

    pub fn add_recipe(&self, draft: RecipeDraft) -> PantryResult<Recipe> {
        let recipe = draft.validate()?;
        Ok(self.db.insert_recipe(&recipe)?)
    }

    /// All recipes, or only those whose taste contains `taste` when given.
    /// Filtering folds case the same way the chatbot matcher does.
    pub fn list_recipes(&self, taste: Option<&str>) -> PantryResult<Vec<Recipe>> {
        let mut recipes = self.db.list_recipes()?;
        if let Some(taste) = taste {
            recipes.retain(|r| taste_matches(r.taste.as_deref(), taste));
        }
        Ok(recipes)
    }

    // --- Chatbot ---

    /// Recipes fully covered by `available` whose taste contains `preference`.
    pub fn suggest(
        &self,
        preference: &str,
        available: &HashSet<String>,
    ) -> PantryResult<Vec<RecipeSummary>> {
        let recipes = self.db.list_recipes()?;
        Ok(match_recipes(preference, available, &recipes))
    }

    /// Structured variant: caller already knows the preference and pantry contents.
    /// Answers with the first match only.
    pub fn suggest_reply(
        &self,
        preference: Option<&str>,
        available: Option<&[String]>,
    ) -> PantryResult<ChatReply> {
        let preference = preference.filter(|p| !p.is_empty());
        let available = available.filter(|a| !a.is_empty());
        let (Some(preference), Some(available)) = (preference, available) else {
            return Err(PantryError::validation(MISSING_SUGGEST_FIELDS));
        };

        let available: HashSet<String> = available.iter().cloned().collect();
        let matches = self.suggest(preference, &available)?;
        let response = matches
            .first()
            .map_or_else(|| NO_STRUCTURED_MATCH.to_string(), describe_recipe);
        Ok(ChatReply {
            response,
            recipes: matches.into_iter().take(1).collect(),
            generated: None,
        })
    }

    /// Free-text variant: preference and ingredients are pulled out of the message.
    pub fn chat(&self, message: Option<&str>) -> PantryResult<ChatReply> {
        let Some(message) = message.filter(|m| !m.is_empty()) else {
            return Err(PantryError::validation(MISSING_MESSAGE));
        };

        let preference = self.classifier.preference(message);
        let available: HashSet<String> = self.classifier.ingredients(message).into_iter().collect();
        let matches = self.suggest(&preference, &available)?;

        let response = if matches.is_empty() {
            NO_FREE_TEXT_MATCH.to_string()
        } else {
            format!(
                "Here are some recipes you can try based on your preferences: {}",
                to_json(&matches)
            )
        };
        Ok(ChatReply {
            response,
            recipes: matches,
            generated: None,
        })
    }
}

fn describe_recipe(recipe: &RecipeSummary) -> String {
    format!(
        "Try making {}! Ingredients: {}. Instructions: {}",
        recipe.title,
        to_json(&recipe.ingredients),
        recipe.instructions
    )
}

fn to_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RecipeIngredient;
    use serde_json::json;

    fn draft_recipe(title: &str, taste: &str, ingredients: &[&str]) -> RecipeDraft {
        RecipeDraft {
            title: Some(title.to_string()),
            ingredients: Some(
                ingredients
                    .iter()
                    .map(|n| RecipeIngredient::named(*n))
                    .collect(),
            ),
            taste: Some(taste.to_string()),
            instructions: Some("mix and bake".to_string()),
            ..RecipeDraft::default()
        }
    }

    fn service_with_cake() -> PantryService {
        let svc = PantryService::open_in_memory().unwrap();
        svc.add_recipe(draft_recipe("Cake", "sweet", &["egg", "flour"]))
            .unwrap();
        svc
    }

    #[test]
    fn test_add_ingredient_validation_error() {
        let svc = PantryService::open_in_memory().unwrap();
        let err = svc
            .add_or_update_ingredient(IngredientDraft {
                name: Some("milk".to_string()),
                quantity: None,
                unit: Some("ml".to_string()),
            })
            .unwrap_err();
        assert!(matches!(err, PantryError::Validation(_)));
        assert!(svc.list_ingredients().unwrap().is_empty());
    }

    #[test]
    fn test_delete_ingredient_not_found() {
        let svc = PantryService::open_in_memory().unwrap();
        let err = svc.delete_ingredient("butter").unwrap_err();
        assert!(matches!(err, PantryError::NotFound(_)));
        assert_eq!(err.to_string(), INGREDIENT_NOT_FOUND);
    }

    #[test]
    fn test_delete_ingredient_removes_record() {
        let svc = PantryService::open_in_memory().unwrap();
        svc.add_or_update_ingredient(IngredientDraft {
            name: Some("butter".to_string()),
            quantity: Some(250.0),
            unit: Some("g".to_string()),
        })
        .unwrap();
        svc.delete_ingredient("butter").unwrap();
        assert!(svc.list_ingredients().unwrap().is_empty());
    }

    #[test]
    fn test_add_recipe_missing_instructions_inserts_nothing() {
        let svc = PantryService::open_in_memory().unwrap();
        let mut draft = draft_recipe("Cake", "sweet", &["egg"]);
        draft.instructions = None;
        assert!(matches!(
            svc.add_recipe(draft).unwrap_err(),
            PantryError::Validation(_)
        ));
        assert!(svc.list_recipes(None).unwrap().is_empty());
    }

    #[test]
    fn test_list_recipes_with_taste_filter() {
        let svc = service_with_cake();
        svc.add_recipe(draft_recipe("Chips", "salty", &["salt"]))
            .unwrap();

        assert_eq!(svc.list_recipes(None).unwrap().len(), 2);
        let salty = svc.list_recipes(Some("salty")).unwrap();
        assert_eq!(salty.len(), 1);
        assert_eq!(salty[0].title, "Chips");
    }

    #[test]
    fn test_list_recipes_taste_filter_ignores_case_and_wildcards() {
        let svc = service_with_cake();
        svc.add_recipe(draft_recipe("Chili", "Spicy and Savory", &["bean"]))
            .unwrap();
        let mut plain = draft_recipe("Plain Bread", "x", &["flour"]);
        plain.taste = None;
        svc.add_recipe(plain).unwrap();

        let savory = svc.list_recipes(Some("SAVORY")).unwrap();
        assert_eq!(savory.len(), 1);
        assert_eq!(savory[0].title, "Chili");

        assert!(svc.list_recipes(Some("sour")).unwrap().is_empty());
        assert!(svc.list_recipes(Some("%")).unwrap().is_empty());
        assert!(svc.list_recipes(Some("sw_et")).unwrap().is_empty());
    }

    #[test]
    fn test_list_recipes_taste_filter_agrees_with_matcher_on_non_ascii() {
        let svc = PantryService::open_in_memory().unwrap();
        svc.add_recipe(draft_recipe("Lebkuchen", "SÜSS", &["egg"]))
            .unwrap();

        let available: HashSet<String> = std::iter::once("egg".to_string()).collect();
        let matched = svc.suggest("süss", &available).unwrap();
        let listed = svc.list_recipes(Some("süss")).unwrap();

        assert_eq!(matched.len(), 1);
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].title, matched[0].title);
    }

    #[test]
    fn test_suggest_cake_scenario() {
        let svc = service_with_cake();
        let available: HashSet<String> = ["egg", "flour", "sugar"]
            .iter()
            .map(ToString::to_string)
            .collect();
        let matches = svc.suggest("sweet", &available).unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].title, "Cake");

        let only_egg: HashSet<String> = std::iter::once("egg".to_string()).collect();
        assert!(svc.suggest("sweet", &only_egg).unwrap().is_empty());
    }

    #[test]
    fn test_suggest_reply_first_match() {
        let svc = service_with_cake();
        svc.add_recipe(draft_recipe("Pancakes", "sweet", &["egg", "flour"]))
            .unwrap();

        let available = vec!["egg".to_string(), "flour".to_string()];
        let reply = svc.suggest_reply(Some("sweet"), Some(&available)).unwrap();
        assert_eq!(
            reply.response,
            r#"Try making Cake! Ingredients: [{"name":"egg"},{"name":"flour"}]. Instructions: mix and bake"#
        );
        assert_eq!(reply.recipes.len(), 1);
    }

    #[test]
    fn test_suggest_reply_no_match() {
        let svc = service_with_cake();
        let available = vec!["egg".to_string()];
        let reply = svc.suggest_reply(Some("sweet"), Some(&available)).unwrap();
        assert_eq!(reply.response, NO_STRUCTURED_MATCH);
        assert!(reply.recipes.is_empty());
    }

    #[test]
    fn test_suggest_reply_missing_fields() {
        let svc = service_with_cake();
        let available = vec!["egg".to_string()];
        assert!(svc.suggest_reply(None, Some(&available)).is_err());
        assert!(svc.suggest_reply(Some("sweet"), Some(&[])).is_err());
        let err = svc.suggest_reply(Some(""), None).unwrap_err();
        assert_eq!(err.to_string(), MISSING_SUGGEST_FIELDS);
    }

    #[test]
    fn test_chat_finds_cake() {
        let svc = service_with_cake();
        let reply = svc
            .chat(Some("Can I make something sweet with eggs and flour?"))
            .unwrap();
        assert!(
            reply
                .response
                .starts_with("Here are some recipes you can try based on your preferences: ")
        );
        assert!(reply.response.contains(r#""title":"Cake""#));
        assert_eq!(reply.recipes.len(), 1);
    }

    #[test]
    fn test_chat_no_match() {
        let svc = service_with_cake();
        let reply = svc.chat(Some("something sweet with just eggs")).unwrap();
        assert_eq!(reply.response, NO_FREE_TEXT_MATCH);
        assert!(reply.recipes.is_empty());
    }

    #[test]
    fn test_chat_missing_message() {
        let svc = service_with_cake();
        let err = svc.chat(None).unwrap_err();
        assert_eq!(err.to_string(), MISSING_MESSAGE);
        assert!(svc.chat(Some("")).is_err());
    }

    #[test]
    fn test_chat_uses_custom_classifier() {
        struct Fixed;
        impl MessageClassifier for Fixed {
            fn preference(&self, _message: &str) -> String {
                "sweet".to_string()
            }
            fn ingredients(&self, _message: &str) -> Vec<String> {
                vec!["egg".to_string(), "flour".to_string()]
            }
        }

        let svc = service_with_cake().with_classifier(Box::new(Fixed));
        let reply = svc.chat(Some("anything at all")).unwrap();
        assert_eq!(reply.recipes.len(), 1);
        assert_eq!(
            serde_json::to_value(&reply.recipes[0]).unwrap(),
            json!({
                "title": "Cake",
                "ingredients": [{"name": "egg"}, {"name": "flour"}],
                "instructions": "mix and bake"
            })
        );
    }
}
