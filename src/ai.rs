use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::ai_response::{GenerateContentResponse, TextBearingResponse, parse_scene_candidate};
use crate::error::{AIError, AppError};
use crate::game_state::GameState;
use crate::prompt::{self, Prompt};
use crate::scene::Scene;
use crate::settings::Settings;
use crate::summary::summarize;

const GENERATE_URL_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

// Higher sampling temperature or a longer output cap both raise the odds of
// broken JSON coming back.
const TEMPERATURE: f32 = 0.85;
const TOP_P: f32 = 0.9;
const MAX_OUTPUT_TOKENS: u32 = 750;

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<RequestContent>,
    #[serde(rename = "systemInstruction")]
    system_instruction: RequestContent,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct RequestContent {
    parts: Vec<RequestPart>,
}

#[derive(Debug, Serialize)]
struct RequestPart {
    text: String,
}

// Fixed generation configuration; part of the contract with the backend,
// not a per-request knob.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
    pub top_p: f32,
    pub max_output_tokens: u32,
    pub response_mime_type: String,
    pub response_schema: Value,
}

impl GenerationConfig {
    fn fixed() -> Result<Self, serde_json::Error> {
        Ok(GenerationConfig {
            temperature: TEMPERATURE,
            top_p: TOP_P,
            max_output_tokens: MAX_OUTPUT_TOKENS,
            response_mime_type: "application/json".to_string(),
            response_schema: prompt::response_schema()?,
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base: Duration,
    pub step: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: 3,
            base: Duration::from_millis(400),
            step: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    pub fn from_settings(settings: &Settings) -> Self {
        RetryPolicy {
            max_attempts: settings.max_attempts.max(1),
            base: Duration::from_millis(settings.backoff_base_ms),
            step: Duration::from_millis(settings.backoff_step_ms),
        }
    }

    // Strictly increasing with the attempt index, so retries spread out
    // instead of hammering a rate-limited backend.
    pub fn delay(&self, attempt: u32) -> Duration {
        self.base + self.step * attempt
    }
}

// One attempt against the generation backend: prompt in, raw model text out.
#[async_trait]
pub trait SceneGenerator: Send + Sync {
    async fn generate(&self, prompt: &Prompt) -> Result<String, AIError>;
}

// Immutable handle to the generation backend, built once at startup and
// shared read-only across request tasks.
pub struct StoryAI {
    client: reqwest::Client,
    api_key: String,
    model: String,
    config: GenerationConfig,
    retry: RetryPolicy,
}

impl StoryAI {
    pub fn new(settings: &Settings) -> Result<Self, AppError> {
        let api_key = settings
            .gemini_api_key
            .clone()
            .ok_or(AppError::MissingApiKey)?;
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(AIError::Request)?;

        Ok(StoryAI {
            client,
            api_key,
            model: settings.model.clone(),
            config: GenerationConfig::fixed()?,
            retry: RetryPolicy::from_settings(settings),
        })
    }

    // The next scene for the supplied client state, with retry and backoff
    // absorbed.
    pub async fn next_scene(
        &self,
        state: &GameState,
        picked: Option<&str>,
    ) -> Result<Scene, AIError> {
        generate_scene(self, self.retry, state, picked).await
    }
}

#[async_trait]
impl SceneGenerator for StoryAI {
    async fn generate(&self, prompt: &Prompt) -> Result<String, AIError> {
        let url = format!(
            "{GENERATE_URL_BASE}/{}:generateContent?key={}",
            self.model, self.api_key
        );
        let request = GenerateContentRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart {
                    text: prompt.user_prompt.clone(),
                }],
            }],
            system_instruction: RequestContent {
                parts: vec![RequestPart {
                    text: prompt.system_instruction.to_string(),
                }],
            },
            generation_config: self.config.clone(),
        };

        let response = self.client.post(&url).json(&request).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AIError::Api {
                status: status.as_u16(),
                message: api_error_message(&body),
            });
        }

        let decoded: GenerateContentResponse = response.json().await?;
        Ok(decoded.text_content())
    }
}

// The backend wraps failures in {"error": {"message": ...}}; fall back to
// the raw body when it does not.
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("error")
                .and_then(|error| error.get("message"))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.trim().chars().take(200).collect())
}

// Drives up to `retry.max_attempts` generation attempts. A decode failure or
// a transient backend error consumes a retry slot after a backoff delay;
// anything else is surfaced immediately. Attempts are strictly sequential.
pub async fn generate_scene<G: SceneGenerator + ?Sized>(
    backend: &G,
    retry: RetryPolicy,
    state: &GameState,
    picked: Option<&str>,
) -> Result<Scene, AIError> {
    let summary = summarize(state, picked);
    let prompt = Prompt::build(&summary);

    let mut last_error = String::new();
    for attempt in 0..retry.max_attempts {
        match backend.generate(&prompt).await {
            Ok(raw) => match parse_scene_candidate(&raw) {
                Some(candidate) => return Ok(Scene::normalize(&candidate, state)),
                None => {
                    last_error = AIError::MalformedOutput.to_string();
                    log::warn!("attempt {}: no JSON object in model output", attempt + 1);
                }
            },
            Err(err) if err.is_retryable() => {
                last_error = err.to_string();
                log::warn!("attempt {}: retryable backend error: {err}", attempt + 1);
            }
            Err(err) => {
                log::error!("fatal backend error: {err}");
                return Err(err);
            }
        }
        if attempt + 1 < retry.max_attempts {
            tokio::time::sleep(retry.delay(attempt)).await;
        }
    }

    Err(AIError::Exhausted {
        attempts: retry.max_attempts,
        last: last_error,
    })
}
