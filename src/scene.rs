use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum_macros::{Display, EnumString};

use crate::game_state::{DEFAULT_STATS, GameState, Stats, coerce_stat};

pub const CHOICE_IDS: [&str; 3] = ["A", "B", "C"];
pub const INITIAL_SCENE_ID: &str = "scene_001";

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Mood {
    #[default]
    Neutral,
    Happy,
    Angry,
    Scared,
    Thinking,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    pub id: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delta: Option<Map<String, Value>>,
}

// The canonical unit of story output returned to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    pub scene_id: String,
    pub text: String,
    pub choices: Vec<Choice>,
    pub stats: Stats,
    pub flags: Map<String, Value>,
    pub mood: Mood,
    pub beat_tag: String,
    pub is_ending: bool,
}

impl Scene {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    // Backstop for whatever the model returned: every field falls back to
    // the prior state and then to a fixed default, so the wire contract
    // holds even for partially-shaped, extra-field or wrongly-typed output.
    pub fn normalize(candidate: &Value, prior: &GameState) -> Scene {
        let pending = prior.pending();

        let scene_id = candidate
            .get("sceneId")
            .and_then(Value::as_str)
            .or_else(|| prior.at())
            .unwrap_or(INITIAL_SCENE_ID)
            .to_string();

        let text = candidate
            .get("text")
            .and_then(Value::as_str)
            .or_else(|| pending.text())
            .unwrap_or("")
            .to_string();

        let raw_choices: Vec<Value> = match candidate.get("choices").and_then(Value::as_array) {
            Some(list) => list.iter().take(3).cloned().collect(),
            None => pending
                .choices()
                .map(|list| list.iter().take(3).cloned().collect())
                .unwrap_or_default(),
        };
        let mut choices: Vec<Choice> = raw_choices
            .iter()
            .enumerate()
            .map(|(index, entry)| normalize_choice(entry, index))
            .collect();
        while choices.len() < CHOICE_IDS.len() {
            let id = CHOICE_IDS[choices.len()];
            choices.push(Choice {
                id: id.to_string(),
                label: placeholder_label(id),
                delta: None,
            });
        }

        let stats = Stats {
            hp: stat_chain(candidate, prior, "hp", DEFAULT_STATS.hp),
            luck: stat_chain(candidate, prior, "luck", DEFAULT_STATS.luck),
            sanity: stat_chain(candidate, prior, "sanity", DEFAULT_STATS.sanity),
        }
        .clamped();

        let flags = candidate
            .get("flags")
            .and_then(Value::as_object)
            .cloned()
            .or_else(|| prior.flags().cloned())
            .unwrap_or_default();

        let mood = candidate
            .get("mood")
            .and_then(Value::as_str)
            .and_then(|raw| Mood::from_str(raw).ok())
            .or_else(|| pending.mood().and_then(|raw| Mood::from_str(raw).ok()))
            .unwrap_or_default();

        let beat_tag = candidate
            .get("beatTag")
            .and_then(Value::as_str)
            .or_else(|| pending.beat_tag())
            .unwrap_or("unknown")
            .to_string();

        let is_ending = candidate.get("isEnding").map(truthy).unwrap_or(false);

        Scene {
            scene_id,
            text,
            choices,
            stats,
            flags,
            mood,
            beat_tag,
            is_ending,
        }
    }
}

fn placeholder_label(id: &str) -> String {
    format!("Choice {id}")
}

// id and label only count when they are non-empty strings; delta only when
// it is itself an object.
fn normalize_choice(entry: &Value, index: usize) -> Choice {
    let id = entry
        .get("id")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
        .unwrap_or(CHOICE_IDS[index.min(CHOICE_IDS.len() - 1)])
        .to_string();
    let label = entry
        .get("label")
        .and_then(Value::as_str)
        .filter(|label| !label.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| placeholder_label(&id));
    let delta = entry.get("delta").and_then(Value::as_object).cloned();
    Choice { id, label, delta }
}

// candidate -> prior state -> fixed default, each link dropped when it does
// not coerce to a finite number.
fn stat_chain(candidate: &Value, prior: &GameState, field: &str, default: i64) -> i64 {
    candidate
        .get("stats")
        .and_then(|stats| stats.get(field))
        .and_then(coerce_stat)
        .or_else(|| prior.stats_value(field).and_then(coerce_stat))
        .unwrap_or(default)
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
