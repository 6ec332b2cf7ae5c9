use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use std::fmt;

use lesson_core::model::{
    Exercise, ExerciseKind, LessonId, LessonSummary, PairSide, SessionRules, Submission,
};
use lesson_core::scorer;

use super::progress::{LessonStatus, SessionProgress};
use crate::error::SessionError;

//
// ─── TRANSITIONS ───────────────────────────────────────────────────────────────
//

/// Result of `LessonSession::advance`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    /// Nothing was submitted, or the lesson already ended.
    Unchanged,
    /// Moved to the step at this zero-based index.
    Next { step: usize },
    /// All steps consumed with lives remaining.
    Completed(LessonSummary),
    /// Lives exhausted.
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Terminal {
    Completed(LessonSummary),
    Failed,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One learner's attempt at a lesson.
///
/// Steps through the exercises in order. Each step is answered, submitted
/// (which scores it and updates lives/XP) and then advanced. The session ends
/// in `Failed` when lives run out or `Completed` after the last step.
pub struct LessonSession {
    lesson_id: LessonId,
    rules: SessionRules,
    exercises: Vec<Exercise>,
    step: usize,
    submission: Submission,
    is_submitted: bool,
    is_correct: bool,
    lives_remaining: u32,
    correct_count: u32,
    xp_earned: u32,
    started_at: DateTime<Utc>,
    terminal: Option<Terminal>,
    reported: bool,
}

impl LessonSession {
    /// Open a lesson attempt.
    ///
    /// `started_at` should come from the services layer clock to keep time deterministic.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Empty` if there are no exercises.
    pub fn new(
        lesson_id: LessonId,
        exercises: Vec<Exercise>,
        rules: SessionRules,
        started_at: DateTime<Utc>,
    ) -> Result<Self, SessionError> {
        let Some(first) = exercises.first() else {
            return Err(SessionError::Empty);
        };
        let submission = Submission::for_kind(first.kind());

        Ok(Self {
            lesson_id,
            rules,
            exercises,
            step: 0,
            submission,
            is_submitted: false,
            is_correct: false,
            lives_remaining: rules.starting_lives(),
            correct_count: 0,
            xp_earned: 0,
            started_at,
            terminal: None,
            reported: false,
        })
    }

    /// Shuffle the display order of every exercise's choices.
    ///
    /// Scoring is order independent for choice kinds, and arrangements refer
    /// to bank positions after shuffling, so answers stay valid.
    #[must_use]
    pub fn with_shuffled_choices(mut self) -> Self {
        let mut rng = rand::rng();
        for exercise in &mut self.exercises {
            exercise.choices_mut().shuffle(&mut rng);
        }
        self
    }

    #[must_use]
    pub fn lesson_id(&self) -> LessonId {
        self.lesson_id
    }

    #[must_use]
    pub fn rules(&self) -> SessionRules {
        self.rules
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn exercises(&self) -> &[Exercise] {
        &self.exercises
    }

    /// Zero-based index of the current step.
    #[must_use]
    pub fn step_index(&self) -> usize {
        self.step
    }

    #[must_use]
    pub fn current_exercise(&self) -> &Exercise {
        &self.exercises[self.step]
    }

    #[must_use]
    pub fn submission(&self) -> &Submission {
        &self.submission
    }

    #[must_use]
    pub fn is_submitted(&self) -> bool {
        self.is_submitted
    }

    #[must_use]
    pub fn is_correct(&self) -> bool {
        self.is_correct
    }

    #[must_use]
    pub fn lives_remaining(&self) -> u32 {
        self.lives_remaining
    }

    #[must_use]
    pub fn correct_count(&self) -> u32 {
        self.correct_count
    }

    #[must_use]
    pub fn xp_earned(&self) -> u32 {
        self.xp_earned
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.terminal.is_some()
    }

    /// The completion summary, once the lesson is `Completed`.
    #[must_use]
    pub fn summary(&self) -> Option<&LessonSummary> {
        match &self.terminal {
            Some(Terminal::Completed(summary)) => Some(summary),
            _ => None,
        }
    }

    #[must_use]
    pub fn status(&self) -> LessonStatus {
        match &self.terminal {
            Some(Terminal::Completed(_)) => LessonStatus::Completed,
            Some(Terminal::Failed) => LessonStatus::Failed,
            None if self.is_submitted => LessonStatus::Submitted {
                correct: self.is_correct,
            },
            None => LessonStatus::Answering,
        }
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        SessionProgress {
            total: self.exercises.len(),
            step: self.step + 1,
            lives_remaining: self.lives_remaining,
            correct_count: self.correct_count,
            xp_earned: self.xp_earned,
            status: self.status(),
        }
    }

    /// Word and meaning columns for a match-pairs step.
    ///
    /// Words keep choice order; meanings are sorted so the two columns do
    /// not line up with the answer.
    #[must_use]
    pub fn pair_columns(&self) -> Option<(Vec<String>, Vec<String>)> {
        let exercise = self.current_exercise();
        if exercise.kind() != &ExerciseKind::MatchPairs {
            return None;
        }
        let pairs = exercise.pairs();
        let words = pairs.iter().map(|p| p.word.clone()).collect();
        let mut meanings: Vec<String> = pairs.into_iter().map(|p| p.meaning).collect();
        meanings.sort();
        Some((words, meanings))
    }

    //
    // ─── ANSWERING ─────────────────────────────────────────────────────────────
    //

    fn ensure_editable(&self) -> Result<(), SessionError> {
        if self.terminal.is_some() {
            return Err(SessionError::Finished);
        }
        if self.is_submitted {
            return Err(SessionError::AlreadySubmitted);
        }
        Ok(())
    }

    fn wrong_kind(&self) -> SessionError {
        SessionError::WrongKind {
            actual: self.current_exercise().kind().clone(),
        }
    }

    /// Pick an option of a translation, multiple-choice or fill-blank step.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::WrongKind` for other kinds, `SessionError::UnknownChoice`
    /// if `option` is not offered, and `Finished` / `AlreadySubmitted` when frozen.
    pub fn select_option(&mut self, option: &str) -> Result<(), SessionError> {
        self.ensure_editable()?;
        let exercise = self.current_exercise();
        if !exercise.kind().is_single_choice() {
            return Err(self.wrong_kind());
        }
        if !exercise.choices().iter().any(|c| c == option) {
            return Err(SessionError::UnknownChoice(option.to_string()));
        }
        self.submission.select(option);
        Ok(())
    }

    /// Toggle a word of a word-arrangement step.
    ///
    /// Takes back the most recently placed occurrence of `word` if there is
    /// one, otherwise places the first unused bank token equal to `word`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::WrongKind` for other kinds, `SessionError::UnknownChoice`
    /// if no bank token matches, and `Finished` / `AlreadySubmitted` when frozen.
    pub fn toggle_word(&mut self, word: &str) -> Result<(), SessionError> {
        self.ensure_editable()?;
        let exercise = self.current_exercise();
        if exercise.kind() != &ExerciseKind::WordArrangement {
            return Err(self.wrong_kind());
        }
        let choices = exercise.choices();
        let Submission::Arrangement { placed } = &self.submission else {
            return Err(self.wrong_kind());
        };

        let index = placed
            .iter()
            .rev()
            .copied()
            .find(|&i| choices[i] == word)
            .or_else(|| {
                choices
                    .iter()
                    .enumerate()
                    .find(|(i, c)| c.as_str() == word && !placed.contains(i))
                    .map(|(i, _)| i)
            })
            .ok_or_else(|| SessionError::UnknownChoice(word.to_string()))?;

        self.submission.toggle_placed(index);
        Ok(())
    }

    /// Toggle the bank token at `index` of a word-arrangement step.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::WrongKind` for other kinds, `SessionError::UnknownChoice`
    /// if `index` is out of range, and `Finished` / `AlreadySubmitted` when frozen.
    pub fn toggle_word_at(&mut self, index: usize) -> Result<(), SessionError> {
        self.ensure_editable()?;
        let exercise = self.current_exercise();
        if exercise.kind() != &ExerciseKind::WordArrangement {
            return Err(self.wrong_kind());
        }
        if index >= exercise.choices().len() {
            return Err(SessionError::UnknownChoice(format!("#{index}")));
        }
        self.submission.toggle_placed(index);
        Ok(())
    }

    /// Toggle a word or meaning of a match-pairs step.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::WrongKind` for other kinds, `SessionError::UnknownChoice`
    /// if `item` is not in the given column, and `Finished` / `AlreadySubmitted` when frozen.
    pub fn toggle_pair_element(&mut self, side: PairSide, item: &str) -> Result<(), SessionError> {
        self.ensure_editable()?;
        let exercise = self.current_exercise();
        if exercise.kind() != &ExerciseKind::MatchPairs {
            return Err(self.wrong_kind());
        }
        let offered = exercise.pairs().iter().any(|p| match side {
            PairSide::Word => p.word == item,
            PairSide::Meaning => p.meaning == item,
        });
        if !offered {
            return Err(SessionError::UnknownChoice(item.to_string()));
        }
        self.submission.toggle_pair(side, item);
        Ok(())
    }

    /// Freeze and score the current answer.
    ///
    /// Returns whether the answer was correct.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NoAnswer` if nothing has been answered yet, and
    /// `Finished` / `AlreadySubmitted` when frozen. Errors leave the state untouched.
    pub fn submit(&mut self) -> Result<bool, SessionError> {
        self.ensure_editable()?;
        if self.submission.is_empty() {
            return Err(SessionError::NoAnswer);
        }

        let correct = scorer::score_exercise(self.current_exercise(), &self.submission);
        self.is_submitted = true;
        self.is_correct = correct;
        if correct {
            self.correct_count = self.correct_count.saturating_add(1);
            self.xp_earned = self.xp_earned.saturating_add(self.rules.xp_per_correct());
        } else {
            self.lives_remaining = self.lives_remaining.saturating_sub(1);
        }
        tracing::debug!(
            lesson_id = %self.lesson_id,
            step = self.step,
            correct,
            lives = self.lives_remaining,
            "step submitted"
        );
        Ok(correct)
    }

    /// Leave a submitted step.
    ///
    /// `now` stamps the completion summary and should come from the services clock.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Summary` if the completion time precedes the start.
    pub fn advance(&mut self, now: DateTime<Utc>) -> Result<Advance, SessionError> {
        if self.terminal.is_some() || !self.is_submitted {
            return Ok(Advance::Unchanged);
        }

        if self.lives_remaining == 0 {
            self.terminal = Some(Terminal::Failed);
            return Ok(Advance::Failed);
        }

        if self.step + 1 >= self.exercises.len() {
            let summary = LessonSummary::new(
                self.lesson_id,
                self.started_at,
                now,
                self.exercises.len(),
                self.correct_count,
                self.xp_earned,
            )?;
            self.terminal = Some(Terminal::Completed(summary.clone()));
            return Ok(Advance::Completed(summary));
        }

        self.step += 1;
        self.submission = Submission::for_kind(self.exercises[self.step].kind());
        self.is_submitted = false;
        self.is_correct = false;
        Ok(Advance::Next { step: self.step })
    }

    pub(crate) fn is_reported(&self) -> bool {
        self.reported
    }

    pub(crate) fn mark_reported(&mut self) {
        self.reported = true;
    }
}

impl fmt::Debug for LessonSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LessonSession")
            .field("lesson_id", &self.lesson_id)
            .field("exercises_len", &self.exercises.len())
            .field("step", &self.step)
            .field("lives_remaining", &self.lives_remaining)
            .field("correct_count", &self.correct_count)
            .field("xp_earned", &self.xp_earned)
            .field("status", &self.status())
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use lesson_core::model::ExerciseId;
    use lesson_core::time::fixed_now;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    fn mcq(id: u64, answer: &str) -> Exercise {
        Exercise::new(
            ExerciseId::new(id),
            format!("Question {id}"),
            ExerciseKind::MultipleChoice,
            strings(&["halo", "terima kasih", "sampai jumpa"]),
            answer,
        )
        .unwrap()
    }

    fn arrangement() -> Exercise {
        Exercise::new(
            ExerciseId::new(10),
            "Arrange",
            ExerciseKind::WordArrangement,
            strings(&["makan", "saya", "nasi"]),
            "saya makan nasi",
        )
        .unwrap()
    }

    fn match_pairs() -> Exercise {
        Exercise::new(
            ExerciseId::new(20),
            "Match",
            ExerciseKind::MatchPairs,
            strings(&["cat:gato", "dog:perro"]),
            "cat:gato,dog:perro",
        )
        .unwrap()
    }

    fn session(exercises: Vec<Exercise>) -> LessonSession {
        LessonSession::new(LessonId::new(1), exercises, SessionRules::default(), fixed_now())
            .unwrap()
    }

    fn answer_mcq(s: &mut LessonSession, option: &str) -> bool {
        s.select_option(option).unwrap();
        s.submit().unwrap()
    }

    #[test]
    fn empty_lesson_is_rejected() {
        let err = LessonSession::new(
            LessonId::new(1),
            Vec::new(),
            SessionRules::default(),
            fixed_now(),
        )
        .unwrap_err();
        assert!(matches!(err, SessionError::Empty));
    }

    #[test]
    fn multiple_choice_expected_answer_is_correct() {
        let mut s = session(vec![mcq(1, "halo")]);
        assert!(answer_mcq(&mut s, "halo"));
        assert!(s.is_submitted());
        assert!(s.is_correct());

        let mut s = session(vec![mcq(1, "halo")]);
        assert!(!answer_mcq(&mut s, "sampai jumpa"));
        assert!(!s.is_correct());
    }

    #[test]
    fn selecting_unknown_option_is_rejected() {
        let mut s = session(vec![mcq(1, "halo")]);
        let err = s.select_option("hello").unwrap_err();
        assert!(matches!(err, SessionError::UnknownChoice(_)));
        assert!(s.submission().is_empty());
    }

    #[test]
    fn submit_without_answer_changes_nothing() {
        let mut s = session(vec![mcq(1, "halo")]);
        assert!(matches!(s.submit(), Err(SessionError::NoAnswer)));
        assert_eq!(s.lives_remaining(), 5);
        assert!(!s.is_submitted());
    }

    #[test]
    fn answers_are_frozen_after_submit() {
        let mut s = session(vec![mcq(1, "halo")]);
        answer_mcq(&mut s, "terima kasih");
        assert!(matches!(s.select_option("halo"), Err(SessionError::AlreadySubmitted)));
        assert!(matches!(s.submit(), Err(SessionError::AlreadySubmitted)));
        assert_eq!(s.lives_remaining(), 4);
    }

    #[test]
    fn advance_before_submit_is_noop() {
        let mut s = session(vec![mcq(1, "halo"), mcq(2, "halo")]);
        s.select_option("halo").unwrap();
        let before = s.progress();
        assert_eq!(s.advance(fixed_now()).unwrap(), Advance::Unchanged);
        assert_eq!(s.progress(), before);
        assert_eq!(s.step_index(), 0);
        assert_eq!(s.submission(), &Submission::Choice { selected: Some("halo".into()) });
    }

    #[test]
    fn advance_resets_step_state() {
        let mut s = session(vec![mcq(1, "halo"), arrangement()]);
        answer_mcq(&mut s, "halo");
        assert_eq!(s.advance(fixed_now()).unwrap(), Advance::Next { step: 1 });
        assert!(!s.is_submitted());
        assert!(!s.is_correct());
        assert_eq!(s.submission(), &Submission::Arrangement { placed: Vec::new() });
    }

    #[test]
    fn word_arrangement_is_order_sensitive() {
        let mut s = session(vec![arrangement()]);
        for word in ["saya", "makan", "nasi"] {
            s.toggle_word(word).unwrap();
        }
        assert!(s.submit().unwrap());

        let mut s = session(vec![arrangement()]);
        for word in ["makan", "saya", "nasi"] {
            s.toggle_word(word).unwrap();
        }
        assert!(!s.submit().unwrap());
    }

    #[test]
    fn toggle_word_takes_back_placed_word() {
        let mut s = session(vec![arrangement()]);
        s.toggle_word("saya").unwrap();
        s.toggle_word("nasi").unwrap();
        s.toggle_word("nasi").unwrap();
        assert_eq!(s.submission().arranged_words(s.current_exercise().choices()), vec!["saya"]);
        assert!(matches!(s.toggle_word("ikan"), Err(SessionError::UnknownChoice(_))));
    }

    #[test]
    fn duplicate_tokens_can_be_placed_by_index() {
        let exercise = Exercise::new(
            ExerciseId::new(11),
            "Arrange",
            ExerciseKind::WordArrangement,
            strings(&["the", "cat", "the", "mat", "on"]),
            "the cat on the mat",
        )
        .unwrap();
        let mut s = session(vec![exercise]);
        for i in [0, 1, 4, 2, 3] {
            s.toggle_word_at(i).unwrap();
        }
        assert!(s.submit().unwrap());
    }

    #[test]
    fn match_pairs_scenarios() {
        let correct = [("cat", "gato"), ("dog", "perro")];
        let swapped = [("dog", "gato"), ("cat", "perro")];
        let partial = [("cat", "gato")];

        for (pairs, expected) in [(&correct[..], true), (&swapped[..], false), (&partial[..], false)] {
            let mut s = session(vec![match_pairs()]);
            for (word, meaning) in pairs {
                s.toggle_pair_element(PairSide::Word, word).unwrap();
                s.toggle_pair_element(PairSide::Meaning, meaning).unwrap();
            }
            assert_eq!(s.submit().unwrap(), expected, "pairs {pairs:?}");
        }
    }

    #[test]
    fn repeated_word_is_matched_to_each_meaning() {
        let exercise = Exercise::new(
            ExerciseId::new(22),
            "Match",
            ExerciseKind::MatchPairs,
            strings(&["bank:tepi", "bank:uang"]),
            "bank:tepi,bank:uang",
        )
        .unwrap();
        let mut s = session(vec![exercise]);
        for (side, item) in [
            (PairSide::Word, "bank"),
            (PairSide::Meaning, "tepi"),
            (PairSide::Word, "bank"),
            (PairSide::Meaning, "uang"),
        ] {
            s.toggle_pair_element(side, item).unwrap();
        }
        assert!(s.submit().unwrap());
    }

    #[test]
    fn pair_element_must_be_offered() {
        let mut s = session(vec![match_pairs()]);
        let err = s.toggle_pair_element(PairSide::Word, "gato").unwrap_err();
        assert!(matches!(err, SessionError::UnknownChoice(_)));
    }

    #[test]
    fn operation_for_wrong_kind_is_rejected() {
        let mut s = session(vec![match_pairs()]);
        assert!(matches!(s.select_option("cat"), Err(SessionError::WrongKind { .. })));
        assert!(matches!(s.toggle_word("cat"), Err(SessionError::WrongKind { .. })));
    }

    #[test]
    fn pair_columns_do_not_reveal_answer() {
        let exercise = Exercise::new(
            ExerciseId::new(21),
            "Match",
            ExerciseKind::MatchPairs,
            strings(&["satu:one", "dua:two", "tiga:three"]),
            "satu:one,dua:two,tiga:three",
        )
        .unwrap();
        let s = session(vec![exercise]);
        let (words, meanings) = s.pair_columns().unwrap();
        assert_eq!(words, strings(&["satu", "dua", "tiga"]));
        assert_eq!(meanings, strings(&["one", "three", "two"]));
    }

    #[test]
    fn lives_drop_by_one_and_stop_at_zero() {
        let exercises: Vec<_> = (1..=7).map(|i| mcq(i, "halo")).collect();
        let mut s = session(exercises);
        let mut last = s.lives_remaining();
        let mut outcome = Advance::Unchanged;
        while !s.is_finished() {
            answer_mcq(&mut s, "sampai jumpa");
            assert_eq!(s.lives_remaining(), last - 1);
            last = s.lives_remaining();
            outcome = s.advance(fixed_now()).unwrap();
        }
        assert_eq!(outcome, Advance::Failed);
        assert_eq!(s.lives_remaining(), 0);
        assert_eq!(s.step_index(), 4);
        assert_eq!(s.status(), LessonStatus::Failed);
        assert!(s.summary().is_none());
    }

    #[test]
    fn failed_is_terminal() {
        let rules = SessionRules::new(1, 10).unwrap();
        let mut s =
            LessonSession::new(LessonId::new(1), vec![mcq(1, "halo"), mcq(2, "halo")], rules, fixed_now())
                .unwrap();
        answer_mcq(&mut s, "sampai jumpa");
        assert_eq!(s.advance(fixed_now()).unwrap(), Advance::Failed);
        assert!(matches!(s.select_option("halo"), Err(SessionError::Finished)));
        assert!(matches!(s.submit(), Err(SessionError::Finished)));
        assert_eq!(s.advance(fixed_now()).unwrap(), Advance::Unchanged);
    }

    #[test]
    fn completed_lesson_rejects_every_interaction() {
        let mut s = session(vec![arrangement(), match_pairs()]);
        for word in ["saya", "makan", "nasi"] {
            s.toggle_word(word).unwrap();
        }
        s.submit().unwrap();
        s.advance(fixed_now()).unwrap();
        s.toggle_pair_element(PairSide::Word, "cat").unwrap();
        s.toggle_pair_element(PairSide::Meaning, "gato").unwrap();
        s.submit().unwrap();
        assert!(matches!(s.advance(fixed_now()).unwrap(), Advance::Completed(_)));

        assert!(matches!(
            s.toggle_pair_element(PairSide::Word, "dog"),
            Err(SessionError::Finished)
        ));
        assert!(matches!(s.toggle_word("saya"), Err(SessionError::Finished)));
        assert!(matches!(s.toggle_word_at(0), Err(SessionError::Finished)));
        assert!(matches!(s.select_option("halo"), Err(SessionError::Finished)));
    }

    #[test]
    fn failed_lesson_rejects_word_and_pair_toggles() {
        let rules = SessionRules::new(1, 10).unwrap();
        let mut s = LessonSession::new(
            LessonId::new(1),
            vec![arrangement(), match_pairs()],
            rules,
            fixed_now(),
        )
        .unwrap();
        s.toggle_word("nasi").unwrap();
        assert!(!s.submit().unwrap());
        assert_eq!(s.advance(fixed_now()).unwrap(), Advance::Failed);

        assert!(matches!(s.toggle_word("saya"), Err(SessionError::Finished)));
        assert!(matches!(s.toggle_word_at(1), Err(SessionError::Finished)));
        assert!(matches!(
            s.toggle_pair_element(PairSide::Meaning, "gato"),
            Err(SessionError::Finished)
        ));
    }

    #[test]
    fn losing_last_life_on_last_step_fails() {
        let rules = SessionRules::new(1, 10).unwrap();
        let mut s = LessonSession::new(LessonId::new(1), vec![mcq(1, "halo")], rules, fixed_now())
            .unwrap();
        answer_mcq(&mut s, "terima kasih");
        assert_eq!(s.advance(fixed_now()).unwrap(), Advance::Failed);
    }

    #[test]
    fn xp_grows_by_ten_per_correct_answer() {
        let mut s = session((1..=4).map(|i| mcq(i, "halo")).collect());
        let mut xp = Vec::new();
        for option in ["halo", "terima kasih", "halo", "halo"] {
            answer_mcq(&mut s, option);
            xp.push(s.xp_earned());
            s.advance(fixed_now()).unwrap();
        }
        assert_eq!(xp, vec![10, 10, 20, 30]);
    }

    #[test]
    fn three_step_lesson_completes_with_one_miss() {
        let mut s = session(vec![mcq(1, "halo"), mcq(2, "terima kasih"), mcq(3, "halo")]);
        let end = fixed_now() + chrono::Duration::minutes(2);

        answer_mcq(&mut s, "halo");
        s.advance(fixed_now()).unwrap();
        answer_mcq(&mut s, "terima kasih");
        s.advance(fixed_now()).unwrap();
        answer_mcq(&mut s, "sampai jumpa");
        let Advance::Completed(summary) = s.advance(end).unwrap() else {
            panic!("expected completion");
        };

        assert_eq!(s.correct_count(), 2);
        assert_eq!(s.xp_earned(), 20);
        assert_eq!(s.lives_remaining(), 4);
        assert_eq!(s.status(), LessonStatus::Completed);
        assert_eq!(summary.pass_count(), 2);
        assert_eq!(summary.fail_count(), 1);
        assert_eq!(summary.started_at(), fixed_now());
        assert_eq!(summary.completed_at(), end);
        // completion is produced once
        assert_eq!(s.advance(end).unwrap(), Advance::Unchanged);
        assert_eq!(s.summary(), Some(&summary));
    }

    #[test]
    fn unsupported_kind_scores_wrong() {
        let odd = Exercise::new(
            ExerciseId::new(30),
            "Say it",
            ExerciseKind::Unsupported("SA".into()),
            Vec::new(),
            "halo",
        )
        .unwrap();
        let mut s = session(vec![odd]);
        assert!(!s.submit().unwrap());
        assert_eq!(s.lives_remaining(), 4);
    }

    #[test]
    fn shuffled_arrangement_still_scores_by_token() {
        let mut s = session(vec![arrangement()]).with_shuffled_choices();
        for word in ["saya", "makan", "nasi"] {
            s.toggle_word(word).unwrap();
        }
        assert!(s.submit().unwrap());
    }
}
