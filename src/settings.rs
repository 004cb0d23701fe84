use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::io::{self, Write};

// Define a structure to hold server settings with serialization and
// deserialization capabilities.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Settings {
    pub gemini_api_key: Option<String>, // Optional API key for the generation backend.
    pub model: String,
    pub bind_addr: String,    // Address the HTTP server listens on.
    pub max_attempts: u32,    // Generation attempt ceiling per request.
    pub backoff_base_ms: u64, // First retry delay.
    pub backoff_step_ms: u64, // Added per further attempt.
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            gemini_api_key: None, // No API key by default.
            model: "gemini-2.0-flash".to_string(),
            bind_addr: "0.0.0.0:3000".to_string(),
            max_attempts: 3,
            backoff_base_ms: 400,
            backoff_step_ms: 500,
        }
    }
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    // Load settings from the default file path, then let the environment
    // override the credential.
    pub fn load() -> Self {
        let mut settings =
            Self::load_settings_from_file("./data/settings.json").unwrap_or_default();
        if let Ok(key) = env::var("GEMINI_API_KEY") {
            if !key.is_empty() {
                settings.gemini_api_key = Some(key);
            }
        }
        settings
    }

    // Load settings from a specified file path.
    pub fn load_settings_from_file(path: &str) -> io::Result<Self> {
        let data = fs::read_to_string(path)?;
        let settings = serde_json::from_str(&data)?;
        Ok(settings)
    }

    // Save current settings to a specified file path.
    pub fn save_to_file(&self, path: &str) -> io::Result<()> {
        let data = serde_json::to_string_pretty(self)?;
        if let Some(parent) = std::path::Path::new(path).parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = fs::File::create(path)?;
        file.write_all(data.as_bytes())?;
        Ok(())
    }
}
