use thiserror::Error;

// Enum for application-level errors outside the generation pipeline.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("AI error: {0}")]
    AI(#[from] AIError), // Errors from the generation pipeline.

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error), // Errors related to data serialization.

    #[error("IO error: {0}")]
    IO(#[from] std::io::Error), // Input/output errors.

    #[error("Missing GEMINI_API_KEY")]
    MissingApiKey, // The backend credential is absent.
}

// Errors raised while producing a scene. Retryable variants are absorbed by
// the retry loop; everything else escapes to the HTTP boundary.
#[derive(Debug, Error)]
pub enum AIError {
    #[error("Backend request error: {0}")]
    Request(#[from] reqwest::Error), // Transport-level failures.

    #[error("Backend returned {status}: {message}")]
    Api { status: u16, message: String }, // Non-2xx answers from the backend.

    #[error("Bad model output (json parse failed)")]
    MalformedOutput, // No recoverable JSON object in the model text.

    #[error("Story generation failed after {attempts} attempts: {last}")]
    Exhausted { attempts: u32, last: String }, // Retry ceiling reached.
}

// Substrings that mark a backend failure as transient, matched
// case-insensitively against the error message.
const TRANSIENT_PATTERNS: &[&str] = &[
    "rate",
    "quota",
    "429",
    "timeout",
    "temporar",
    "overload",
    "unavailable",
    "connection reset",
    "econnreset",
    "network",
    "fetch failed",
];

pub fn transient_message(message: &str) -> bool {
    let lower = message.to_lowercase();
    TRANSIENT_PATTERNS.iter().any(|p| lower.contains(p))
}

fn retryable_status(status: u16) -> bool {
    status == 429 || status == 408 || (500..=599).contains(&status)
}

impl AIError {
    // Whether this failure is worth another attempt. Rate limits, timeouts,
    // server-side errors and broken model output all qualify; anything else
    // (bad request, auth failure) is surfaced immediately.
    pub fn is_retryable(&self) -> bool {
        match self {
            AIError::Request(err) => {
                err.is_timeout()
                    || err.is_connect()
                    || err
                        .status()
                        .is_some_and(|s| retryable_status(s.as_u16()))
                    || transient_message(&err.to_string())
            }
            AIError::Api { status, message } => {
                retryable_status(*status) || transient_message(message)
            }
            AIError::MalformedOutput => true,
            AIError::Exhausted { .. } => false,
        }
    }
}
