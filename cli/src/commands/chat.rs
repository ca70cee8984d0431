use anyhow::Result;

use pantry_core::models::ChatReply;
use pantry_core::service::{PantryService, TextGenerator};

use super::helpers::format_ingredient_list;
use crate::assistant;

pub(crate) async fn cmd_chat(
    service: &PantryService,
    generator: Option<&dyn TextGenerator>,
    message: &str,
    json: bool,
) -> Result<()> {
    let mut reply = service.chat(Some(message))?;
    reply.generated = assistant::enrich(generator, message).await;
    print_reply(&reply, json)
}

pub(crate) fn cmd_suggest(
    service: &PantryService,
    preference: &str,
    have: &[String],
    json: bool,
) -> Result<()> {
    let reply = service.suggest_reply(Some(preference), Some(have))?;
    print_reply(&reply, json)
}

fn print_reply(reply: &ChatReply, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(reply)?);
        return Ok(());
    }

    if reply.recipes.is_empty() {
        println!("{}", reply.response);
    } else {
        for recipe in &reply.recipes {
            println!("{}", recipe.title);
            println!("  Ingredients: {}", format_ingredient_list(&recipe.ingredients));
            println!("  Instructions: {}", recipe.instructions);
        }
    }

    if let Some(ref text) = reply.generated {
        println!();
        println!("{text}");
    }
    Ok(())
}
