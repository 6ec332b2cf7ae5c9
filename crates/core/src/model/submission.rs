use std::collections::BTreeMap;

use crate::model::exercise::ExerciseKind;

/// Which column of a match-pairs exercise an item belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PairSide {
    Word,
    Meaning,
}

/// The learner's in-progress answer for one step.
///
/// Each exercise kind has exactly one shape, so the scorer can match on it
/// exhaustively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// Translation, multiple-choice and fill-blank.
    Choice { selected: Option<String> },
    /// Word arrangement: indices into the exercise choices, in placement order.
    Arrangement { placed: Vec<usize> },
    /// Match pairs, keyed by meaning.
    Pairs {
        pending_word: Option<String>,
        pending_meaning: Option<String>,
        pairs: BTreeMap<String, String>,
    },
    /// Placeholder for kinds the engine cannot present.
    Unsupported,
}

impl Submission {
    /// The empty answer for an exercise of the given kind.
    #[must_use]
    pub fn for_kind(kind: &ExerciseKind) -> Self {
        match kind {
            ExerciseKind::Translation | ExerciseKind::MultipleChoice | ExerciseKind::FillBlank => {
                Self::Choice { selected: None }
            }
            ExerciseKind::WordArrangement => Self::Arrangement { placed: Vec::new() },
            ExerciseKind::MatchPairs => Self::Pairs {
                pending_word: None,
                pending_meaning: None,
                pairs: BTreeMap::new(),
            },
            ExerciseKind::Unsupported(_) => Self::Unsupported,
        }
    }

    /// True when there is nothing to check yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Choice { selected } => selected.is_none(),
            Self::Arrangement { placed } => placed.is_empty(),
            Self::Pairs { pairs, .. } => pairs.is_empty(),
            Self::Unsupported => false,
        }
    }

    /// Placed tokens resolved against the exercise choices.
    #[must_use]
    pub fn arranged_words<'a>(&self, choices: &'a [String]) -> Vec<&'a str> {
        match self {
            Self::Arrangement { placed } => placed
                .iter()
                .filter_map(|&i| choices.get(i).map(String::as_str))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Replace the selected option. Returns `false` for other shapes.
    pub fn select(&mut self, option: &str) -> bool {
        match self {
            Self::Choice { selected } => {
                *selected = Some(option.to_string());
                true
            }
            _ => false,
        }
    }

    /// Place the bank token at `index`, or take it back if already placed.
    /// Returns `false` for other shapes.
    pub fn toggle_placed(&mut self, index: usize) -> bool {
        let Self::Arrangement { placed } = self else {
            return false;
        };
        if let Some(pos) = placed.iter().position(|&i| i == index) {
            placed.remove(pos);
        } else {
            placed.push(index);
        }
        true
    }

    /// Pair a word with a meaning, returning `true` if a new pair was formed.
    ///
    /// A word may be paired with several meanings, so a paired word can be
    /// selected again. A meaning keeps at most one word: toggling a paired
    /// meaning removes its pair, unless a word is pending, in which case the
    /// meaning is re-paired with that word.
    pub fn toggle_pair(&mut self, side: PairSide, item: &str) -> bool {
        let Self::Pairs {
            pending_word,
            pending_meaning,
            pairs,
        } = self
        else {
            return false;
        };

        if side == PairSide::Meaning && pending_word.is_none() && pairs.remove(item).is_some() {
            return false;
        }

        let pending = match side {
            PairSide::Word => &mut *pending_word,
            PairSide::Meaning => &mut *pending_meaning,
        };
        if pending.as_deref() == Some(item) {
            *pending = None;
            return false;
        }
        *pending = Some(item.to_string());

        if let (Some(word), Some(meaning)) = (pending_word.as_ref(), pending_meaning.as_ref()) {
            pairs.insert(meaning.clone(), word.clone());
            *pending_word = None;
            *pending_meaning = None;
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs_of(submission: &Submission) -> BTreeMap<String, String> {
        match submission {
            Submission::Pairs { pairs, .. } => pairs.clone(),
            _ => panic!("not a pairs submission"),
        }
    }

    #[test]
    fn empty_payload_matches_kind() {
        assert_eq!(
            Submission::for_kind(&ExerciseKind::FillBlank),
            Submission::Choice { selected: None }
        );
        assert!(Submission::for_kind(&ExerciseKind::WordArrangement).is_empty());
        assert!(Submission::for_kind(&ExerciseKind::MatchPairs).is_empty());
    }

    #[test]
    fn placing_twice_takes_token_back() {
        let mut s = Submission::for_kind(&ExerciseKind::WordArrangement);
        s.toggle_placed(2);
        s.toggle_placed(0);
        s.toggle_placed(2);
        assert_eq!(s, Submission::Arrangement { placed: vec![0] });
        assert!(!s.select("x"));
    }

    #[test]
    fn word_then_meaning_forms_pair() {
        let mut s = Submission::for_kind(&ExerciseKind::MatchPairs);
        assert!(!s.toggle_pair(PairSide::Word, "cat"));
        assert!(s.toggle_pair(PairSide::Meaning, "gato"));
        assert_eq!(pairs_of(&s).get("gato").map(String::as_str), Some("cat"));
    }

    #[test]
    fn toggling_paired_meaning_unpairs_it() {
        let mut s = Submission::for_kind(&ExerciseKind::MatchPairs);
        s.toggle_pair(PairSide::Meaning, "gato");
        s.toggle_pair(PairSide::Word, "cat");
        assert!(!s.toggle_pair(PairSide::Meaning, "gato"));
        assert!(pairs_of(&s).is_empty());
        assert_eq!(s, Submission::for_kind(&ExerciseKind::MatchPairs));
    }

    #[test]
    fn paired_word_can_be_selected_again() {
        let mut s = Submission::for_kind(&ExerciseKind::MatchPairs);
        s.toggle_pair(PairSide::Word, "cat");
        s.toggle_pair(PairSide::Meaning, "gato");
        s.toggle_pair(PairSide::Word, "cat");
        // selecting and deselecting keeps the existing pair
        s.toggle_pair(PairSide::Word, "cat");
        assert_eq!(pairs_of(&s).len(), 1);
        let Submission::Pairs { pending_word, .. } = &s else {
            unreachable!()
        };
        assert!(pending_word.is_none());
    }

    #[test]
    fn repeated_word_pairs_with_each_meaning() {
        let mut s = Submission::for_kind(&ExerciseKind::MatchPairs);
        assert!(!s.toggle_pair(PairSide::Word, "bank"));
        assert!(s.toggle_pair(PairSide::Meaning, "tepi"));
        assert!(!s.toggle_pair(PairSide::Word, "bank"));
        assert!(s.toggle_pair(PairSide::Meaning, "uang"));

        let pairs = pairs_of(&s);
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs.get("tepi").map(String::as_str), Some("bank"));
        assert_eq!(pairs.get("uang").map(String::as_str), Some("bank"));
    }

    #[test]
    fn pending_word_reassigns_paired_meaning() {
        let mut s = Submission::for_kind(&ExerciseKind::MatchPairs);
        s.toggle_pair(PairSide::Word, "cat");
        s.toggle_pair(PairSide::Meaning, "gato");
        s.toggle_pair(PairSide::Word, "dog");
        assert!(s.toggle_pair(PairSide::Meaning, "gato"));
        assert_eq!(pairs_of(&s).get("gato").map(String::as_str), Some("dog"));
        assert_eq!(pairs_of(&s).len(), 1);
    }

    #[test]
    fn toggling_pending_item_deselects_it() {
        let mut s = Submission::for_kind(&ExerciseKind::MatchPairs);
        s.toggle_pair(PairSide::Word, "cat");
        s.toggle_pair(PairSide::Word, "cat");
        s.toggle_pair(PairSide::Meaning, "gato");
        assert!(pairs_of(&s).is_empty());
        let Submission::Pairs { pending_meaning, .. } = &s else {
            unreachable!()
        };
        assert_eq!(pending_meaning.as_deref(), Some("gato"));
    }
}
