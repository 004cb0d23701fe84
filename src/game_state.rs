use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const STAT_MIN: i64 = 0;
pub const STAT_MAX: i64 = 10;

// Starting stats when the client supplies none.
pub const DEFAULT_STATS: Stats = Stats {
    hp: 7,
    luck: 3,
    sanity: 5,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub hp: i64,
    pub luck: i64,
    pub sanity: i64,
}

impl Stats {
    pub fn clamped(self) -> Self {
        Stats {
            hp: self.hp.clamp(STAT_MIN, STAT_MAX),
            luck: self.luck.clamp(STAT_MIN, STAT_MAX),
            sanity: self.sanity.clamp(STAT_MIN, STAT_MAX),
        }
    }
}

// Number() the way the model and the client both get away with: plain
// numbers, numeric strings and booleans count, everything else does not.
pub fn coerce_stat(value: &Value) -> Option<i64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        Value::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        _ => return None,
    };
    if n.is_finite() { Some(n.round() as i64) } else { None }
}

// Client-owned state, resubmitted in full with every request. The client is
// not trusted to send well-formed data, so every accessor falls back on its
// own instead of failing the whole request.
#[derive(Debug, Clone, Default)]
pub struct GameState {
    raw: Value,
}

impl GameState {
    pub fn from_value(raw: Value) -> Self {
        GameState { raw }
    }

    pub fn as_value(&self) -> &Value {
        &self.raw
    }

    pub fn at(&self) -> Option<&str> {
        self.raw.get("at").and_then(Value::as_str)
    }

    pub fn stats_value(&self, field: &str) -> Option<&Value> {
        self.raw.get("stats").and_then(|stats| stats.get(field))
    }

    pub fn stats(&self) -> Stats {
        Stats {
            hp: self.stat_or_default("hp", DEFAULT_STATS.hp),
            luck: self.stat_or_default("luck", DEFAULT_STATS.luck),
            sanity: self.stat_or_default("sanity", DEFAULT_STATS.sanity),
        }
    }

    fn stat_or_default(&self, field: &str, default: i64) -> i64 {
        self.stats_value(field)
            .and_then(coerce_stat)
            .unwrap_or(default)
    }

    pub fn flags(&self) -> Option<&Map<String, Value>> {
        self.raw.get("flags").and_then(Value::as_object)
    }

    // The up-to-3 most recent beat tags, most-recent-last.
    pub fn last3_beats(&self) -> Vec<String> {
        let Some(beats) = self.raw.get("last3Beats").and_then(Value::as_array) else {
            return Vec::new();
        };
        beats
            .iter()
            .skip(beats.len().saturating_sub(3))
            .filter_map(|beat| beat.as_str().map(str::to_string))
            .collect()
    }

    pub fn pending(&self) -> Pending<'_> {
        Pending {
            raw: self.raw.get("pending").unwrap_or(&Value::Null),
        }
    }
}

// View over the previously generated scene, the fallback source for
// normalization defaults.
#[derive(Debug, Clone, Copy)]
pub struct Pending<'a> {
    raw: &'a Value,
}

impl<'a> Pending<'a> {
    pub fn text(&self) -> Option<&'a str> {
        self.raw.get("text").and_then(Value::as_str)
    }

    pub fn mood(&self) -> Option<&'a str> {
        self.raw.get("mood").and_then(Value::as_str)
    }

    pub fn beat_tag(&self) -> Option<&'a str> {
        self.raw.get("beatTag").and_then(Value::as_str)
    }

    pub fn choices(&self) -> Option<&'a Vec<Value>> {
        self.raw.get("choices").and_then(Value::as_array)
    }
}
