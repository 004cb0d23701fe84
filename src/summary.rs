use serde::Serialize;
use serde_json::{Map, Value};

use crate::game_state::{GameState, Stats};
use crate::scene::INITIAL_SCENE_ID;

// Reference list of the canonical first-book beats, handed to the model so
// it can keep the large-scale plot on track.
pub const CANON_BEATS: [&str; 11] = [
    "letter",
    "hagrid_visit",
    "diagon_alley",
    "hogwarts_express",
    "sorting",
    "classes_begin",
    "troll",
    "quidditch",
    "mirror",
    "trapdoor",
    "stone_final",
];

// Cap on the prior scene text, to bound prompt size.
pub const LAST_STORY_MAX_CHARS: usize = 420;

#[derive(Debug, Clone, Serialize)]
pub struct Protagonist {
    pub name: &'static str,
    pub role: &'static str,
    pub traits: [&'static str; 3],
}

pub const PROTAGONIST: Protagonist = Protagonist {
    name: "Ver Black",
    role: "takes the hero's place in the first-book events",
    traits: [
        "bears the Black family name, with strong Muggle blood",
        "black-haired girl",
        "exceptional magical talent",
    ],
};

// Prior choices are passed to the model as id/label only; delta is a client
// concern.
#[derive(Debug, Clone, Serialize)]
pub struct ChoicePreview {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

// Bounded fact sheet handed to the model as grounding. Every field is
// defaulted independently, so any shape of client state produces a usable
// summary.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub protagonist: Protagonist,
    pub at: String,
    pub stats: Stats,
    pub flags: Map<String, Value>,
    pub current_beat: String,
    pub last3_beats: Vec<String>,
    pub last_story: String,
    pub last_choices: Vec<ChoicePreview>,
    pub picked: Option<String>,
    pub canon_beats: [&'static str; 11],
}

impl Summary {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    // Serializing a Summary cannot realistically fail, but the prompt has to
    // be produced either way.
    pub fn to_prompt_format(&self) -> String {
        self.to_json().unwrap_or_else(|_| "{}".to_string())
    }
}

pub fn summarize(state: &GameState, picked: Option<&str>) -> Summary {
    let pending = state.pending();

    let last_story: String = pending
        .text()
        .unwrap_or("")
        .chars()
        .take(LAST_STORY_MAX_CHARS)
        .collect();

    let last_choices: Vec<ChoicePreview> = pending
        .choices()
        .map(|list| {
            list.iter()
                .take(3)
                .map(|choice| ChoicePreview {
                    id: choice
                        .get("id")
                        .and_then(Value::as_str)
                        .map(str::to_string),
                    label: choice
                        .get("label")
                        .and_then(Value::as_str)
                        .map(str::to_string),
                })
                .collect()
        })
        .unwrap_or_default();

    Summary {
        protagonist: PROTAGONIST,
        at: state.at().unwrap_or(INITIAL_SCENE_ID).to_string(),
        stats: state.stats(),
        flags: state.flags().cloned().unwrap_or_default(),
        current_beat: pending.beat_tag().unwrap_or("unknown").to_string(),
        last3_beats: state.last3_beats(),
        last_story,
        last_choices,
        picked: picked.map(str::to_string),
        canon_beats: CANON_BEATS,
    }
}
