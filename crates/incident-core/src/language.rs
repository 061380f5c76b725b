//! **LanguageGate**: the step before the interview. Nothing is spoken until a language tag has
//! been chosen.

use crate::catalog::QuestionCatalog;
use crate::config::InterviewConfig;
use crate::error::{InterviewError, InterviewResult};
use crate::interview::{InterviewSession, Phase};
use incident_voice::VoiceEngines;
use std::sync::Arc;
use tracing::{info, warn};

/// Languages offered to the reporter. Other non-empty tags are carried through as-is.
pub const SUPPORTED_LANGUAGES: [&str; 5] = ["english", "tamil", "malay", "chinese", "burmese"];

/// Greeting spoken before the first question.
pub fn intro_text(user_name: Option<&str>) -> String {
    match user_name.map(str::trim).filter(|n| !n.is_empty()) {
        Some(name) => format!("Hello {name}! Let's start with the first question. "),
        None => "Let's start with the first question. ".to_string(),
    }
}

pub struct LanguageGate {
    catalog: Arc<QuestionCatalog>,
    engines: VoiceEngines,
    config: InterviewConfig,
    language: Option<String>,
}

impl LanguageGate {
    pub fn new(catalog: Arc<QuestionCatalog>, engines: VoiceEngines, config: InterviewConfig) -> Self {
        Self {
            catalog,
            engines,
            config,
            language: None,
        }
    }

    pub fn phase(&self) -> Phase {
        Phase::LanguageSelect
    }

    pub fn supported_languages(&self) -> &'static [&'static str] {
        &SUPPORTED_LANGUAGES
    }

    pub fn selected(&self) -> Option<&str> {
        self.language.as_deref()
    }

    /// Record the language tag (trimmed, lower-cased). Blank tags are rejected.
    pub fn select_language(&mut self, tag: &str) -> InterviewResult<&str> {
        let tag = tag.trim().to_lowercase();
        if tag.is_empty() {
            return Err(InterviewError::invalid_state("language tag must not be empty"));
        }
        if !SUPPORTED_LANGUAGES.contains(&tag.as_str()) {
            warn!(language = %tag, "language not in the supported list; carrying it through");
        }
        Ok(self.language.insert(tag).as_str())
    }

    /// Enter the interview: question 0, intro and first question spoken.
    /// Must be called inside a tokio runtime.
    pub fn start(&self) -> InterviewResult<InterviewSession> {
        let language = self
            .language
            .clone()
            .ok_or_else(|| InterviewError::invalid_state("select a language before starting"))?;
        info!(language = %language, "Language selected, starting interview");
        let intro = intro_text(self.config.user_name.as_deref());
        InterviewSession::begin(
            Arc::clone(&self.catalog),
            self.engines.clone(),
            language,
            self.config.user_name.clone(),
            &intro,
            self.config.intro_lead_in(),
            self.config.question_lead_in(),
        )
    }
}

/// Entry point: select `language` and start the standard interview in one step.
pub fn start_interview(
    language: &str,
    engines: VoiceEngines,
    config: InterviewConfig,
) -> InterviewResult<InterviewSession> {
    let mut gate = LanguageGate::new(Arc::new(QuestionCatalog::standard()), engines, config);
    gate.select_language(language)?;
    gate.start()
}

#[cfg(test)]
mod tests {
    use super::*;
    use incident_voice::{ChannelMode, SimulationConfig};

    fn gate() -> LanguageGate {
        LanguageGate::new(
            Arc::new(QuestionCatalog::standard()),
            VoiceEngines::simulated(&SimulationConfig::default()),
            InterviewConfig::default(),
        )
    }

    #[test]
    fn intro_greets_by_name() {
        assert_eq!(
            intro_text(Some("Aung")),
            "Hello Aung! Let's start with the first question. "
        );
        assert_eq!(intro_text(Some("  ")), "Let's start with the first question. ");
        assert_eq!(intro_text(None), "Let's start with the first question. ");
    }

    #[test]
    fn select_normalizes_and_rejects_blank() {
        let mut gate = gate();
        assert_eq!(gate.phase(), Phase::LanguageSelect);
        assert!(matches!(
            gate.select_language("   "),
            Err(InterviewError::InvalidState(_))
        ));
        assert_eq!(gate.selected(), None);
        assert_eq!(gate.select_language(" Tamil ").unwrap(), "tamil");
        assert_eq!(gate.select_language("klingon").unwrap(), "klingon");
        assert_eq!(gate.selected(), Some("klingon"));
    }

    #[tokio::test]
    async fn start_requires_language() {
        let gate = gate();
        assert!(matches!(gate.start(), Err(InterviewError::InvalidState(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn start_enters_interview_speaking() {
        let mut gate = gate();
        gate.select_language("english").unwrap();
        let session = gate.start().unwrap();
        assert_eq!(session.phase(), Phase::Interview);
        assert_eq!(session.cursor(), 0);
        assert!(session.answers().is_empty());
        assert_eq!(session.channel_state().mode, ChannelMode::Speaking);
        assert_eq!(session.language(), "english");
    }

    #[tokio::test]
    async fn start_interview_rejects_empty_language() {
        let result = start_interview(
            "",
            VoiceEngines::simulated(&SimulationConfig::default()),
            InterviewConfig::default(),
        );
        assert!(matches!(result, Err(InterviewError::InvalidState(_))));
    }
}
