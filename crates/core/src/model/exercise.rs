use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use thiserror::Error;

use crate::model::ids::ExerciseId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ExerciseError {
    #[error("exercise {id} has no choices")]
    NoChoices { id: ExerciseId },

    #[error("exercise {id} has an empty expected answer")]
    EmptyExpectedAnswer { id: ExerciseId },

    #[error("exercise {id} has a malformed pair choice: {raw:?}")]
    MalformedPair { id: ExerciseId, raw: String },
}

//
// ─── KIND ──────────────────────────────────────────────────────────────────────
//

/// The question type of an exercise.
///
/// Decoding never fails: codes outside the known set land in `Unsupported`
/// so one odd question does not take down a whole lesson.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "String")]
pub enum ExerciseKind {
    Translation,
    MultipleChoice,
    FillBlank,
    WordArrangement,
    MatchPairs,
    Unsupported(String),
}

impl ExerciseKind {
    /// Parse a wire code. Accepts the canonical kebab-case names and the
    /// legacy backend codes `MCQ` / `FITB`.
    #[must_use]
    pub fn from_code(code: &str) -> Self {
        match code {
            "translation" => Self::Translation,
            "multiple-choice" | "MCQ" => Self::MultipleChoice,
            "fill-blank" | "FITB" => Self::FillBlank,
            "word-arrangement" => Self::WordArrangement,
            "match-pairs" => Self::MatchPairs,
            other => Self::Unsupported(other.to_string()),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Translation => "translation",
            Self::MultipleChoice => "multiple-choice",
            Self::FillBlank => "fill-blank",
            Self::WordArrangement => "word-arrangement",
            Self::MatchPairs => "match-pairs",
            Self::Unsupported(code) => code,
        }
    }

    /// Kinds answered by picking a single option.
    #[must_use]
    pub fn is_single_choice(&self) -> bool {
        matches!(
            self,
            Self::Translation | Self::MultipleChoice | Self::FillBlank
        )
    }

    #[must_use]
    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Unsupported(_))
    }
}

impl From<String> for ExerciseKind {
    fn from(code: String) -> Self {
        Self::from_code(&code)
    }
}

impl Serialize for ExerciseKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl fmt::Display for ExerciseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//
// ─── MATCH PAIR ────────────────────────────────────────────────────────────────
//

/// One `word:meaning` pair of a match-pairs exercise.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MatchPair {
    pub word: String,
    pub meaning: String,
}

impl MatchPair {
    /// Split `word:meaning` on the first colon. No trimming is applied.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let (word, meaning) = raw.split_once(':')?;
        Some(Self {
            word: word.to_string(),
            meaning: meaning.to_string(),
        })
    }

    /// Parse a comma-separated list of pairs. Returns `None` if any entry is malformed.
    #[must_use]
    pub fn parse_list(raw: &str) -> Option<Vec<Self>> {
        if raw.is_empty() {
            return Some(Vec::new());
        }
        raw.split(',').map(Self::parse).collect()
    }
}

//
// ─── EXERCISE ──────────────────────────────────────────────────────────────────
//

/// One question of a lesson.
///
/// `choices` holds options, word tokens, or `word:meaning` strings depending
/// on `kind`; `expected_answer` is interpreted the same way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    #[serde(alias = "question_id")]
    id: ExerciseId,
    #[serde(alias = "content")]
    prompt: String,
    #[serde(alias = "question_type", alias = "type")]
    kind: ExerciseKind,
    #[serde(default, alias = "options")]
    choices: Vec<String>,
    #[serde(alias = "answer", alias = "correct_answer", alias = "expected_answer")]
    expected_answer: String,
    #[serde(default, alias = "points", alias = "point_value")]
    point_value: u32,
    #[serde(default, alias = "image_url", skip_serializing_if = "Option::is_none")]
    image_url: Option<String>,
}

impl Exercise {
    /// Build and validate an exercise.
    ///
    /// # Errors
    ///
    /// Returns `ExerciseError` if the exercise cannot be answered.
    pub fn new(
        id: ExerciseId,
        prompt: impl Into<String>,
        kind: ExerciseKind,
        choices: Vec<String>,
        expected_answer: impl Into<String>,
    ) -> Result<Self, ExerciseError> {
        let exercise = Self {
            id,
            prompt: prompt.into(),
            kind,
            choices,
            expected_answer: expected_answer.into(),
            point_value: 0,
            image_url: None,
        };
        exercise.validate()?;
        Ok(exercise)
    }

    #[must_use]
    pub fn with_point_value(mut self, point_value: u32) -> Self {
        self.point_value = point_value;
        self
    }

    #[must_use]
    pub fn with_image_url(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = Some(image_url.into());
        self
    }

    /// Checks the invariants needed to present and score the exercise.
    ///
    /// Unsupported kinds pass validation; they simply never score as correct.
    ///
    /// # Errors
    ///
    /// Returns `ExerciseError::NoChoices` for a known kind without choices,
    /// `ExerciseError::EmptyExpectedAnswer` when there is nothing to compare
    /// against, and `ExerciseError::MalformedPair` for match-pairs choices
    /// without a colon.
    pub fn validate(&self) -> Result<(), ExerciseError> {
        if !self.kind.is_supported() {
            return Ok(());
        }
        if self.choices.is_empty() {
            return Err(ExerciseError::NoChoices { id: self.id });
        }
        if self.expected_answer.is_empty() {
            return Err(ExerciseError::EmptyExpectedAnswer { id: self.id });
        }
        if self.kind == ExerciseKind::MatchPairs {
            if let Some(raw) = self.choices.iter().find(|c| MatchPair::parse(c).is_none()) {
                return Err(ExerciseError::MalformedPair {
                    id: self.id,
                    raw: raw.clone(),
                });
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn id(&self) -> ExerciseId {
        self.id
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn kind(&self) -> &ExerciseKind {
        &self.kind
    }

    #[must_use]
    pub fn choices(&self) -> &[String] {
        &self.choices
    }

    /// Mutable view for reordering choices; the set itself cannot change.
    pub fn choices_mut(&mut self) -> &mut [String] {
        &mut self.choices
    }

    #[must_use]
    pub fn expected_answer(&self) -> &str {
        &self.expected_answer
    }

    #[must_use]
    pub fn point_value(&self) -> u32 {
        self.point_value
    }

    #[must_use]
    pub fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }

    /// Pairs offered by a match-pairs exercise, in choice order.
    #[must_use]
    pub fn pairs(&self) -> Vec<MatchPair> {
        self.choices
            .iter()
            .filter_map(|c| MatchPair::parse(c))
            .collect()
    }
}
