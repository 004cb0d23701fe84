use serde::Deserialize;
use serde_json::Value;

// Typed view of the backend's generateContent answer. Only the fields the
// pipeline reads are modeled; some gateways flatten the text to the top
// level, so that spot is checked first.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub candidates: Vec<ResponseCandidate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResponseCandidate {
    #[serde(default)]
    pub content: Option<ResponseContent>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResponseContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResponsePart {
    #[serde(default)]
    pub text: Option<String>,
}

// Whatever shape the backend hands back, the pipeline needs exactly one
// thing from it: the generated text. Adapting happens here, once, at the
// boundary; an empty string means nothing usable was returned.
pub trait TextBearingResponse {
    fn text_content(&self) -> String;
}

impl TextBearingResponse for GenerateContentResponse {
    fn text_content(&self) -> String {
        if let Some(text) = &self.text {
            return text.clone();
        }
        let Some(candidate) = self.candidates.first() else {
            return String::new();
        };
        let Some(content) = &candidate.content else {
            return String::new();
        };
        content
            .parts
            .iter()
            .filter_map(|part| part.text.as_deref())
            .collect::<Vec<_>>()
            .join("")
    }
}

// Best-effort recovery of a JSON object from model text that may carry
// leading prose, a Markdown code fence or trailing commentary. Inputs with
// several independent objects, or braces inside string literals, can defeat
// the boundary search; callers treat None as a retryable decode failure.
pub fn extract_json(raw: &str) -> Option<Value> {
    let mut t = raw.trim();

    if let Some(rest) = t.strip_prefix("```") {
        let rest = match rest.as_bytes().get(..4) {
            Some(tag) if tag.eq_ignore_ascii_case(b"json") => &rest[4..],
            _ => rest,
        };
        t = rest.trim_start();
    }
    if let Some(rest) = t.strip_suffix("```") {
        t = rest.trim_end();
    }

    let first = t.find('{')?;
    let last = t.rfind('}')?;
    if last <= first {
        return None;
    }
    serde_json::from_str(&t[first..=last]).ok()
}

// Strict parse first; the extractor only runs when the model decorated its
// output.
pub fn parse_scene_candidate(raw: &str) -> Option<Value> {
    serde_json::from_str(raw).ok().or_else(|| extract_json(raw))
}
