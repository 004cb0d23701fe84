pub mod ai;
pub mod ai_response;
pub mod error;
pub mod game_state;
pub mod logging;
pub mod prompt;
pub mod scene;
pub mod server;
pub mod settings;
pub mod summary;

// Re-export commonly used items for easier access
pub use ai::{RetryPolicy, SceneGenerator, StoryAI, generate_scene};
pub use ai_response::{TextBearingResponse, extract_json, parse_scene_candidate};
pub use error::{AIError, AppError};
pub use game_state::{DEFAULT_STATS, GameState, Stats};
pub use scene::{Choice, Mood, Scene};
pub use settings::Settings;
pub use summary::{Summary, summarize};
