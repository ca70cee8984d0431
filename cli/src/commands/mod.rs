mod chat;
mod helpers;
mod ingredient;
mod recipe;

pub(crate) use chat::{cmd_chat, cmd_suggest};
pub(crate) use ingredient::{cmd_ingredient_add, cmd_ingredient_delete, cmd_ingredient_list};
pub(crate) use recipe::{RecipeArgs, cmd_recipe_add, cmd_recipe_list};
