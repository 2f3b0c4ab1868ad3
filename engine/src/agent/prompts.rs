//! Fixed instructions and the `fetch_recipe` tool declaration

use crate::llm::FunctionDeclaration;
use serde_json::json;

/// Name of the single tool the model may call
pub const FETCH_RECIPE_TOOL: &str = "fetch_recipe";

/// Reply marker the model emits when a guided recipe is finished
pub const DONE_SENTINEL: &str = "Done";

/// Instruction for intent classification.
///
/// Asks for the structured form first; the literal labels remain valid
/// answers so an unstructured reply still parses.
pub const INTENT_INSTRUCTION: &str = r#"Identify the user's intent. Answer with a JSON object {"intent": ..., "item": ...}.

Allowed intents:
1. "fetch_recipe": the user wants a recipe for a bakery item or a beverage. Set "item" to the name of the dish in lower case with words separated by underscores (for example "sourdough_bread"). If you cannot answer in JSON, print "Fetch the recipe for <item>".
2. "none": ordinary conversation that is not covered by point 3. If you cannot answer in JSON, print "None".
3. "fallback": the user asks for programming help, any STEM question, or a recipe for something that is neither a bakery item nor a beverage. If you cannot answer in JSON, print "Fallback".

Not every mention of food is a recipe request. Exclamations such as "Ah! Those sizzling bagels!" are "none"."#;

/// Instruction for casual conversation (Idle mode)
pub const CASUAL_CHAT_INSTRUCTION: &str = "Talk with the user the way a friendly person would. \
Offer ideas when it fits and ask for their opinion now and then (\"Ain't that so?\", \
\"What do you think?\"). Keep the conversation natural and avoid sounding like a bot.";

/// Instruction for guiding the user through a fetched recipe (Contextual mode)
pub const GUIDED_COOKING_INSTRUCTION: &str = "Guide the user through the recipe one step at a time. \
List quantities whenever you list ingredients. Pause whenever the user asks you to wait. \
When the whole recipe is finished, or the user clearly decides not to cook after all, reply with \"Done\".";

/// Instruction for requests the agent does not handle
pub const FALLBACK_INSTRUCTION: &str =
    "Tell the user, briefly and kindly, that you were not built to handle that kind of query.";

/// Reply used when even the fallback generation fails
pub const FALLBACK_REPLY: &str =
    "Sorry, I'm not built to handle that kind of query. I'm happiest talking about bakes and drinks!";

/// Declaration of `fetch_recipe(item: string)`
pub fn fetch_recipe_declaration() -> FunctionDeclaration {
    FunctionDeclaration {
        name: FETCH_RECIPE_TOOL.to_string(),
        description: "Fetch the recipe for a specific item".to_string(),
        parameters: json!({
            "type": "OBJECT",
            "properties": {
                "item": {
                    "type": "STRING",
                    "description": "The bakery item or beverage the user wants to make"
                }
            },
            "required": ["item"]
        }),
    }
}

/// Response schema for structured intent classification
pub fn intent_schema() -> serde_json::Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "intent": {
                "type": "STRING",
                "enum": ["none", "fallback", "fetch_recipe"]
            },
            "item": {
                "type": "STRING",
                "nullable": true
            }
        },
        "required": ["intent"]
    })
}
