//! Keyword extraction and recipe matching for the chatbot.
//!
//! Everything here is pure: no store access, no I/O. The vocabularies are
//! deliberately tiny and the extraction is plain substring search.

use std::collections::HashSet;

use crate::models::{Recipe, RecipeSummary};

/// Checked in this order; the first hit wins regardless of where it appears in the text.
pub const PREFERENCES: &[&str] = &["sweet", "savory", "spicy", "salty"];

pub const ANY_PREFERENCE: &str = "any";

pub const INGREDIENT_VOCABULARY: &[&str] = &[
    "egg",
    "flour",
    "sugar",
    "butter",
    "milk",
    "vanilla",
    "chocolate",
    "salt",
];

/// Classifies a free-text message into a preference tag and a list of mentioned ingredients.
pub trait MessageClassifier: Send + Sync {
    fn preference(&self, message: &str) -> String;
    fn ingredients(&self, message: &str) -> Vec<String>;
}

/// The fixed-vocabulary substring classifier.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordClassifier;

impl MessageClassifier for KeywordClassifier {
    fn preference(&self, message: &str) -> String {
        extract_preference(message)
    }

    fn ingredients(&self, message: &str) -> Vec<String> {
        extract_ingredients(message)
    }
}

#[must_use]
pub fn extract_preference(message: &str) -> String {
    let lower = message.to_lowercase();
    PREFERENCES
        .iter()
        .find(|pref| lower.contains(**pref))
        .unwrap_or(&ANY_PREFERENCE)
        .to_string()
}

/// Vocabulary order, not text order. Substring hits count, so "salty" also yields "salt".
#[must_use]
pub fn extract_ingredients(message: &str) -> Vec<String> {
    let lower = message.to_lowercase();
    INGREDIENT_VOCABULARY
        .iter()
        .filter(|ing| lower.contains(**ing))
        .map(ToString::to_string)
        .collect()
}

/// Case-insensitive substring test against the recipe's taste tag.
///
/// "any" gets no special treatment: it only matches a taste that literally
/// contains "any". A recipe without a taste never matches.
#[must_use]
pub fn taste_matches(taste: Option<&str>, preference: &str) -> bool {
    let preference = preference.to_lowercase();
    taste.is_some_and(|t| t.to_lowercase().contains(&preference))
}

/// Exact, case-sensitive membership for every listed ingredient name.
#[must_use]
pub fn ingredients_covered(recipe: &Recipe, available: &HashSet<String>) -> bool {
    recipe
        .ingredients
        .iter()
        .all(|ing| available.contains(&ing.name))
}

/// Recipes whose taste matches and whose ingredients are all available, in input order.
#[must_use]
pub fn match_recipes(
    preference: &str,
    available: &HashSet<String>,
    recipes: &[Recipe],
) -> Vec<RecipeSummary> {
    recipes
        .iter()
        .filter(|r| taste_matches(r.taste.as_deref(), preference))
        .filter(|r| ingredients_covered(r, available))
        .map(RecipeSummary::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RecipeIngredient;

    fn recipe(title: &str, taste: Option<&str>, ingredients: &[&str]) -> Recipe {
        Recipe {
            id: 0,
            title: title.to_string(),
            ingredients: ingredients
                .iter()
                .map(|n| RecipeIngredient::named(*n))
                .collect(),
            taste: taste.map(ToString::to_string),
            cuisine: None,
            preparation_time: None,
            reviews: None,
            instructions: format!("make {title}"),
        }
    }

    fn set(items: &[&str]) -> HashSet<String> {
        items.iter().map(ToString::to_string).collect()
    }

    fn titles(matches: &[RecipeSummary]) -> Vec<&str> {
        matches.iter().map(|m| m.title.as_str()).collect()
    }

    #[test]
    fn test_single_preference_word() {
        for pref in PREFERENCES {
            let msg = format!("I'd like something {pref} tonight");
            assert_eq!(extract_preference(&msg), *pref);
        }
    }

    #[test]
    fn test_no_preference_is_any() {
        assert_eq!(extract_preference("what can I cook?"), "any");
        assert_eq!(extract_preference(""), "any");
    }

    #[test]
    fn test_preference_case_insensitive() {
        assert_eq!(extract_preference("Something SPICY please"), "spicy");
    }

    #[test]
    fn test_preference_uses_vocabulary_order() {
        // "salty" comes first in the text but "sweet" comes first in the vocabulary
        assert_eq!(extract_preference("salty or sweet, either works"), "sweet");
        assert_eq!(extract_preference("spicy then savory"), "savory");
    }

    #[test]
    fn test_extract_ingredients_vocabulary_order() {
        let found = extract_ingredients("I have Milk, some FLOUR, eggs and a carrot");
        assert_eq!(found, vec!["egg", "flour", "milk"]);
    }

    #[test]
    fn test_extract_ingredients_none() {
        assert!(extract_ingredients("just carrots and potatoes").is_empty());
    }

    #[test]
    fn test_extract_ingredients_substring_hits() {
        // "salty" contains "salt"; "buttermilk" contains both "butter" and "milk"
        assert_eq!(extract_ingredients("salty buttermilk"), vec!["butter", "milk", "salt"]);
    }

    #[test]
    fn test_keyword_classifier_delegates() {
        let classifier = KeywordClassifier;
        let msg = "Can I make something sweet with eggs and flour?";
        assert_eq!(classifier.preference(msg), "sweet");
        assert_eq!(classifier.ingredients(msg), vec!["egg", "flour"]);
    }

    #[test]
    fn test_cake_scenario() {
        let recipes = vec![recipe("Cake", Some("sweet"), &["egg", "flour"])];

        let matched = match_recipes("sweet", &set(&["egg", "flour", "sugar"]), &recipes);
        assert_eq!(titles(&matched), vec!["Cake"]);
        assert_eq!(matched[0].instructions, "make Cake");

        let matched = match_recipes("sweet", &set(&["egg"]), &recipes);
        assert!(matched.is_empty());
    }

    #[test]
    fn test_taste_substring_case_insensitive() {
        let recipes = vec![
            recipe("Glazed Ham", Some("Sweet and Salty"), &["salt"]),
            recipe("Curry", Some("spicy"), &["salt"]),
        ];
        let matched = match_recipes("SWEET", &set(&["salt"]), &recipes);
        assert_eq!(titles(&matched), vec!["Glazed Ham"]);
    }

    #[test]
    fn test_any_preference_is_literal() {
        let recipes = vec![
            recipe("Toast", Some("savory"), &["butter"]),
            recipe("Mystery", Some("any"), &["butter"]),
        ];
        let matched = match_recipes("any", &set(&["butter"]), &recipes);
        assert_eq!(titles(&matched), vec!["Mystery"]);
    }

    #[test]
    fn test_missing_taste_never_matches() {
        let recipes = vec![recipe("Plain", None, &["egg"])];
        assert!(match_recipes("sweet", &set(&["egg"]), &recipes).is_empty());
        assert!(match_recipes("", &set(&["egg"]), &recipes).is_empty());
    }

    #[test]
    fn test_ingredient_names_exact_match() {
        let recipes = vec![recipe("Omelette", Some("savory"), &["eggs"])];
        // "egg" is not "eggs"
        assert!(match_recipes("savory", &set(&["egg"]), &recipes).is_empty());
        // Case matters for available ingredients
        let recipes = vec![recipe("Omelette", Some("savory"), &["Egg"])];
        assert!(match_recipes("savory", &set(&["egg"]), &recipes).is_empty());
    }

    #[test]
    fn test_preserves_store_order_and_duplicates() {
        let recipes = vec![
            recipe("B", Some("sweet"), &["sugar"]),
            recipe("A", Some("sweet"), &["sugar"]),
            recipe("B", Some("sweet"), &["sugar"]),
        ];
        let matched = match_recipes("sweet", &set(&["sugar"]), &recipes);
        assert_eq!(titles(&matched), vec!["B", "A", "B"]);
    }

    #[test]
    fn test_never_returns_uncovered_recipe() {
        let recipes = vec![
            recipe("Cake", Some("sweet"), &["egg", "flour", "sugar"]),
            recipe("Cookies", Some("sweet"), &["butter", "sugar", "flour"]),
            recipe("Custard", Some("sweet"), &["egg", "milk", "sugar", "vanilla"]),
            recipe("Fudge", Some("sweet"), &["chocolate", "butter", "sugar"]),
        ];
        let pantries: Vec<HashSet<String>> = vec![
            set(&[]),
            set(&["egg"]),
            set(&["egg", "flour", "sugar"]),
            set(&["butter", "sugar", "flour", "chocolate"]),
            INGREDIENT_VOCABULARY.iter().map(ToString::to_string).collect(),
        ];
        for available in &pantries {
            for m in match_recipes("sweet", available, &recipes) {
                assert!(
                    m.ingredients.iter().all(|i| available.contains(&i.name)),
                    "{} matched without all ingredients",
                    m.title
                );
            }
        }
        let everything = &pantries[4];
        assert_eq!(match_recipes("sweet", everything, &recipes).len(), 4);
    }
}
