//! Interview configuration: built-in defaults, then an optional file, then `INCIDENT_*`
//! environment variables (nested keys separated by `__`).
//!
//! | Key | Env | Default |
//! |-----|-----|---------|
//! | user_name | INCIDENT_USER_NAME | unset (anonymous greeting) |
//! | default_language | INCIDENT_DEFAULT_LANGUAGE | unset (ask) |
//! | intro_lead_in_ms | INCIDENT_INTRO_LEAD_IN_MS | 1000 |
//! | question_lead_in_ms | INCIDENT_QUESTION_LEAD_IN_MS | 500 |
//! | simulation.* | INCIDENT_SIMULATION__SPEAK_SETTLE_MS, ... | see `SimulationConfig` |

use crate::error::InterviewResult;
use incident_voice::SimulationConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

fn default_intro_lead_in_ms() -> u64 {
    1000
}

fn default_question_lead_in_ms() -> u64 {
    500
}

fn environment() -> config::Environment {
    config::Environment::with_prefix("INCIDENT")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterviewConfig {
    /// Reporter name used in the spoken greeting.
    #[serde(default)]
    pub user_name: Option<String>,
    /// Skip the language prompt when set.
    #[serde(default)]
    pub default_language: Option<String>,
    /// Pause before the intro is spoken.
    #[serde(default = "default_intro_lead_in_ms")]
    pub intro_lead_in_ms: u64,
    /// Pause before each following question is spoken.
    #[serde(default = "default_question_lead_in_ms")]
    pub question_lead_in_ms: u64,
    #[serde(default)]
    pub simulation: SimulationConfig,
}

impl Default for InterviewConfig {
    fn default() -> Self {
        Self {
            user_name: None,
            default_language: None,
            intro_lead_in_ms: default_intro_lead_in_ms(),
            question_lead_in_ms: default_question_lead_in_ms(),
            simulation: SimulationConfig::default(),
        }
    }
}

impl InterviewConfig {
    /// Load from `INCIDENT_CONFIG` (default `config/interview`, extension optional) and the
    /// environment.
    pub fn load() -> InterviewResult<Self> {
        let config_path =
            std::env::var("INCIDENT_CONFIG").unwrap_or_else(|_| "config/interview".to_string());
        Self::load_from(Path::new(&config_path))
    }

    pub fn load_from(path: &Path) -> InterviewResult<Self> {
        Self::load_layered(path, environment())
    }

    fn load_layered(path: &Path, env: config::Environment) -> InterviewResult<Self> {
        let builder = config::Config::builder()
            .set_default("intro_lead_in_ms", default_intro_lead_in_ms() as i64)?
            .set_default("question_lead_in_ms", default_question_lead_in_ms() as i64)?;

        let builder = if path.exists() {
            builder.add_source(config::File::from(path))
        } else {
            builder.add_source(config::File::with_name(&path.to_string_lossy()).required(false))
        };

        let built = builder.add_source(env).build()?;
        Ok(built.try_deserialize()?)
    }

    pub fn intro_lead_in(&self) -> Duration {
        Duration::from_millis(self.intro_lead_in_ms)
    }

    pub fn question_lead_in(&self) -> Duration {
        Duration::from_millis(self.question_lead_in_ms)
    }
}
