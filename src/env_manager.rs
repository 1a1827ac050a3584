use log::{debug, info};
use std::path::Path;

/// Files read for secrets, in order. Variables already set are never overwritten.
pub const ENV_FILES: &[&str] = &[".secrets", ".env"];

/// Environment variables todocal reads
pub const KNOWN_ENV_VARS: &[&str] = &[
    "GOOGLE_CALENDAR_ID",
    "GOOGLE_CREDENTIALS_PATH",
    "OPENAI_API_KEY",
    "TODOCAL_DAILY_DIR",
    "TODOCAL_TIMEZONE",
    "TODOCAL_LLM_PROVIDER",
    "TODOCAL_LLM_MODEL",
];

/// Load every env file that exists. Returns the files that were loaded.
pub fn load_env_files() -> Vec<String> {
    load_env_files_from(Path::new("."))
}

pub fn load_env_files_from(dir: &Path) -> Vec<String> {
    let mut loaded = Vec::new();
    for name in ENV_FILES {
        let path = dir.join(name);
        match dotenvy::from_path(&path) {
            Ok(()) => {
                info!("Loaded environment from {:?}", path);
                loaded.push(name.to_string());
            }
            Err(e) => debug!("Skipping {:?}: {}", path, e),
        }
    }
    loaded
}
