use serde_json::Value;

use crate::summary::Summary;

const SYSTEM_INSTRUCTION: &str = include_str!("../prompts/system_instruction.txt");
const SCHEMA: &str = include_str!("../prompts/scene_schema.json");

// Schema handed to the backend for schema-constrained decoding.
pub fn response_schema() -> Result<Value, serde_json::Error> {
    serde_json::from_str(SCHEMA)
}

// A fully formatted generation request: the static ruleset plus the factual
// grounding for this turn. Building one is pure formatting and cannot fail.
#[derive(Debug, Clone)]
pub struct Prompt {
    pub system_instruction: &'static str,
    pub user_prompt: String,
}

impl Prompt {
    pub fn build(summary: &Summary) -> Self {
        let user_prompt = format!(
            "Below is a JSON summary of the current game state. Generate the \"next scene\" from it.\n\
             \n\
             Hard requirements:\n\
             - Keep the first book's chain of major events intact, and advance naturally from the current situation to the next beat.\n\
             - Never repeat a situation similar to last3Beats.\n\
             - text is 6-10 sentences.\n\
             - Exactly 3 choices (A/B/C), each with a clearly different flavor.\n\
             - stats may shift slightly (0-10).\n\
             - beatTag is the key keyword of this scene.\n\
             - mood is one of the allowed values.\n\
             \n\
             State summary:\n\
             {}",
            summary.to_prompt_format()
        );
        Prompt {
            system_instruction: SYSTEM_INSTRUCTION,
            user_prompt,
        }
    }
}
