use crate::extract::MAX_DURATION_MINUTES;
use anyhow::{anyhow, bail, Context, Result};
use chrono_tz::Tz;
use directories::ProjectDirs;
use log::debug;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub calendar: CalendarConfig,
    #[serde(default)]
    pub notes: NotesConfig,
    #[serde(default)]
    pub language_model: LanguageModelConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarConfig {
    pub calendar_id: String,
    pub credentials_path: Option<PathBuf>,
    pub timezone: String,
    pub default_duration_minutes: i64,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            calendar_id: "primary".to_string(),
            credentials_path: None,
            timezone: "America/Los_Angeles".to_string(),
            default_duration_minutes: 60,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotesConfig {
    pub daily_dir: String,
}

impl Default for NotesConfig {
    fn default() -> Self {
        Self { daily_dir: "~/zettelkasten/daily".to_string() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LLMProvider {
    #[default]
    Ollama,
    OpenAI,
}

impl std::str::FromStr for LLMProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "ollama" => Ok(LLMProvider::Ollama),
            "openai" => Ok(LLMProvider::OpenAI),
            other => Err(anyhow!("Unknown language model provider: {}", other)),
        }
    }
}

impl LLMProvider {
    /// Model used when the config does not name one
    pub fn default_model(&self) -> &'static str {
        match self {
            LLMProvider::Ollama => "llama3:8b-instruct-q5_0",
            LLMProvider::OpenAI => "gpt-4o-mini",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LanguageModelConfig {
    pub provider: LLMProvider,
    /// Falls back to the provider's default model
    pub model: Option<String>,
    /// Overrides the provider's default endpoint
    pub base_url: Option<String>,
}

impl LanguageModelConfig {
    pub fn model_name(&self) -> &str {
        self.model.as_deref().unwrap_or_else(|| self.provider.default_model())
    }
}

impl Config {
    /// Load from the default location, falling back to defaults when no file exists.
    pub fn load() -> Result<Self> {
        Self::load_from(&get_config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No config file at {}, using defaults", path.display());
            return Ok(Config::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;
        config
            .validate()
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).context("Failed to write config file")?;
        Ok(())
    }

    /// Apply overrides from the process environment.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|name| env::var(name).ok().filter(|v| !v.trim().is_empty()))
    }

    fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(id) = lookup("GOOGLE_CALENDAR_ID") {
            self.calendar.calendar_id = id;
        }
        if let Some(path) = lookup("GOOGLE_CREDENTIALS_PATH") {
            self.calendar.credentials_path = Some(PathBuf::from(path));
        }
        if let Some(tz) = lookup("TODOCAL_TIMEZONE") {
            self.calendar.timezone = tz;
        }
        if let Some(dir) = lookup("TODOCAL_DAILY_DIR") {
            self.notes.daily_dir = dir;
        }
        if let Some(provider) = lookup("TODOCAL_LLM_PROVIDER") {
            self.language_model.provider = provider.parse()?;
        }
        if let Some(model) = lookup("TODOCAL_LLM_MODEL") {
            self.language_model.model = Some(model);
        }
        self.validate()
    }

    /// Check values that would otherwise fail deep inside a run.
    pub fn validate(&self) -> Result<()> {
        let minutes = self.calendar.default_duration_minutes;
        if !(1..=MAX_DURATION_MINUTES).contains(&minutes) {
            bail!(
                "calendar.default_duration_minutes must be between 1 and {}, got {}",
                MAX_DURATION_MINUTES,
                minutes
            );
        }
        Ok(())
    }

    pub fn timezone(&self) -> Result<Tz> {
        self.calendar
            .timezone
            .parse::<Tz>()
            .map_err(|_| anyhow!("Unknown timezone: {}", self.calendar.timezone))
    }

    /// The daily notes directory with a leading `~` expanded.
    pub fn daily_dir(&self) -> PathBuf {
        expand_home(&self.notes.daily_dir)
    }
}

fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    } else if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}

pub fn get_config_path() -> Result<PathBuf> {
    let proj_dirs = ProjectDirs::from("com", "todocal", "todocal")
        .context("Failed to determine config directory")?;

    Ok(proj_dirs.config_dir().join("config.toml"))
}
