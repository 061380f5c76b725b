//! The fixed, ordered question set walked by the interview.

use crate::error::{InterviewError, InterviewResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Basic Info")]
    BasicInfo,
    Details,
    Impact,
    Response,
    Resolution,
    Prevention,
}

impl Category {
    pub fn label(&self) -> &'static str {
        match self {
            Category::BasicInfo => "Basic Info",
            Category::Details => "Details",
            Category::Impact => "Impact",
            Category::Response => "Response",
            Category::Resolution => "Resolution",
            Category::Prevention => "Prevention",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub text: String,
    pub category: Category,
}

impl Question {
    pub fn new(id: impl Into<String>, text: impl Into<String>, category: Category) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            category,
        }
    }
}

/// Ordered, immutable list of questions. Never empty; ids are unique.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionCatalog {
    questions: Vec<Question>,
}

impl QuestionCatalog {
    pub fn new(questions: Vec<Question>) -> InterviewResult<Self> {
        if questions.is_empty() {
            return Err(InterviewError::invalid_state("question catalog is empty"));
        }
        let mut seen = HashSet::new();
        for q in &questions {
            if q.id.trim().is_empty() || q.text.trim().is_empty() {
                return Err(InterviewError::invalid_state("question id and text must not be blank"));
            }
            if !seen.insert(q.id.as_str()) {
                return Err(InterviewError::invalid_state(format!(
                    "duplicate question id '{}'",
                    q.id
                )));
            }
        }
        Ok(Self { questions })
    }

    /// The eight incident questions, in interview order.
    pub fn standard() -> Self {
        use Category::*;
        let questions = vec![
            Question::new("title", "What is the title or brief description of this incident?", BasicInfo),
            Question::new("location", "Where did this incident occur? Please specify the building, floor, room, or system location.", BasicInfo),
            Question::new("incident_type", "What type of incident is this? For example: system outage, performance issue, security breach, hardware failure, or software bug.", Details),
            Question::new("description", "Can you describe what happened in detail? Please explain the sequence of events.", Details),
            Question::new("impact", "What was the impact of this incident? How many users were affected and what services were impacted?", Impact),
            Question::new("actions", "What immediate actions were taken to address this incident?", Response),
            Question::new("resolution", "How was the incident resolved? What steps were taken?", Resolution),
            Question::new("prevention", "What preventative measures should be taken to avoid similar incidents in the future?", Prevention),
        ];
        Self { questions }
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn last_index(&self) -> usize {
        self.questions.len() - 1
    }

    pub fn get(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    pub fn as_slice(&self) -> &[Question] {
        &self.questions
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.questions.iter().position(|q| q.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Question> {
        self.questions.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.questions.iter().map(|q| q.id.as_str())
    }
}

impl Default for QuestionCatalog {
    fn default() -> Self {
        Self::standard()
    }
}
