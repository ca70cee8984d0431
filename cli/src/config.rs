use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::path::PathBuf;

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";

pub struct Config {
    pub db_path: PathBuf,
    pub gemini: Option<GeminiSettings>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeminiSettings {
    pub api_key: String,
    pub model: String,
}

impl Config {
    /// Resolve paths and settings. `db_override` wins over `PANTRY_DB_PATH`,
    /// which wins over `<data_dir>/pantry.db`.
    pub fn load(db_override: Option<PathBuf>) -> Result<Self> {
        let proj_dirs =
            ProjectDirs::from("", "", "pantry").context("Could not determine home directory")?;

        let data_dir = proj_dirs.data_dir().to_path_buf();
        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;

        let db_path = db_override
            .or_else(|| env_var("PANTRY_DB_PATH").map(PathBuf::from))
            .unwrap_or_else(|| data_dir.join("pantry.db"));

        let gemini = GeminiSettings::from_lookup(env_var);

        Ok(Config { db_path, gemini })
    }
}

impl GeminiSettings {
    /// `None` when no API key is available, which disables text generation.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Option<Self> {
        let api_key = lookup("GEMINI_API_KEY").or_else(|| lookup("GOOGLE_API_KEY"))?;
        let model =
            lookup("PANTRY_GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string());
        Some(Self { api_key, model })
    }
}

fn env_var(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
