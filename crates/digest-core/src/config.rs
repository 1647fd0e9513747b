//! Layered configuration loader and path helpers.
//!
//! Uses Figment to merge compiled defaults + `config.toml` + `config.<env>.toml`
//! + `APP_*` env vars + the raw `PERSONA`/`JOB_TO_BE_DONE` variables.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::error::DigestError;

pub const DEFAULT_PERSONA: &str = "Travel Planner";
pub const DEFAULT_JOB_TO_BE_DONE: &str = "Plan a trip of 4 days for a group of 10 college friends.";
pub const DEFAULT_OUTPUT_FILE: &str = "challenge1b_output.json";
pub const DEFAULT_MODEL_ID: &str = "sentence-transformers/all-MiniLM-L6-v2";

/// Everything a run needs, after all layers are merged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub persona: String,
    pub job_to_be_done: String,
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub output_file: String,
    pub selection: SelectionConfig,
    pub refine: RefineConfig,
    pub embedding: EmbeddingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    pub max_sections: usize,
    pub max_per_document: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefineConfig {
    pub max_chars: usize,
    pub fallback_sentences: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub model_id: String,
    pub model_dir: Option<PathBuf>,
    pub max_len: usize,
    pub batch_size: usize,
    pub use_fake: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            persona: DEFAULT_PERSONA.to_string(),
            job_to_be_done: DEFAULT_JOB_TO_BE_DONE.to_string(),
            input_dir: PathBuf::from("input"),
            output_dir: PathBuf::from("output"),
            output_file: DEFAULT_OUTPUT_FILE.to_string(),
            selection: SelectionConfig::default(),
            refine: RefineConfig::default(),
            embedding: EmbeddingConfig::default(),
        }
    }
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self { max_sections: 5, max_per_document: 2 }
    }
}

impl Default for RefineConfig {
    fn default() -> Self {
        Self { max_chars: 1000, fallback_sentences: 3 }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self { model_id: DEFAULT_MODEL_ID.to_string(), model_dir: None, max_len: 256, batch_size: 16, use_fake: false }
    }
}

impl AppConfig {
    /// Query string shared by the ranker and the refiner.
    pub fn query(&self) -> String {
        format!("{} {}", self.persona, self.job_to_be_done)
    }

    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(&self.output_file)
    }

    pub fn validate(&self) -> Result<(), DigestError> {
        if self.selection.max_sections == 0 {
            return Err(DigestError::InvalidConfig("selection.max_sections must be at least 1".into()));
        }
        if self.selection.max_per_document == 0 {
            return Err(DigestError::InvalidConfig("selection.max_per_document must be at least 1".into()));
        }
        if self.refine.max_chars < 4 {
            return Err(DigestError::InvalidConfig(format!(
                "refine.max_chars must leave room for an ellipsis, got {}",
                self.refine.max_chars
            )));
        }
        if self.embedding.batch_size == 0 || self.embedding.max_len == 0 {
            return Err(DigestError::InvalidConfig("embedding.batch_size and embedding.max_len must be positive".into()));
        }
        if self.output_file.trim().is_empty() {
            return Err(DigestError::InvalidConfig("output_file must not be empty".into()));
        }
        Ok(())
    }
}

pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        Self::load_with(None)
    }

    /// Layered load: defaults, `config.toml`, `config.<env>.toml`, an optional
    /// explicit file, `APP_*` vars, then raw `PERSONA`/`JOB_TO_BE_DONE`.
    pub fn load_with(extra_file: Option<&Path>) -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::from(Serialized::defaults(AppConfig::default())).merge(Toml::file("config.toml"));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => {}
        }
        if let Some(path) = extra_file {
            if !path.exists() {
                return Err(DigestError::InvalidConfig(format!("config file {} does not exist", path.display())).into());
            }
            figment = figment.merge(Toml::file(path));
        }
        figment = figment
            .merge(Env::prefixed("APP_").split("__"))
            .merge(Env::raw().only(&["persona", "job_to_be_done"]));

        Ok(Self { figment })
    }

    pub fn get<T>(&self, key: &str) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| anyhow::anyhow!("Failed to get '{}': {}", key, e))
    }

    /// Extract and validate the full application config, expanding paths.
    pub fn app(&self) -> anyhow::Result<AppConfig> {
        let mut app: AppConfig = self
            .figment
            .extract()
            .map_err(|e| anyhow::anyhow!("Failed to extract config: {}", e))?;
        app.input_dir = expand_path(app.input_dir.to_string_lossy());
        app.output_dir = expand_path(app.output_dir.to_string_lossy());
        app.embedding.model_dir = app.embedding.model_dir.map(|p| expand_path(p.to_string_lossy()));
        app.validate()?;
        Ok(app)
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}
