//! Answer checking for every exercise kind.
//!
//! Matching is exact: case-sensitive, no trimming, no normalisation.

use crate::model::{Exercise, ExerciseKind, MatchPair, Submission};

/// Returns whether `submission` answers an exercise of `kind` correctly.
///
/// - Single-choice kinds compare the selected option with `expected`.
/// - Word arrangement joins the placed tokens with single spaces.
/// - Match pairs requires the same number of pairs and every expected
///   `word:meaning` to be formed. `expected` is a comma-separated list.
///
/// A submission whose shape does not fit `kind`, and any unsupported kind,
/// scores `false`.
#[must_use]
pub fn score(kind: &ExerciseKind, submission: &Submission, expected: &str, choices: &[String]) -> bool {
    match (kind, submission) {
        (
            ExerciseKind::Translation | ExerciseKind::MultipleChoice | ExerciseKind::FillBlank,
            Submission::Choice { selected },
        ) => selected.as_deref() == Some(expected),
        (ExerciseKind::WordArrangement, Submission::Arrangement { .. }) => {
            submission.arranged_words(choices).join(" ") == expected
        }
        (ExerciseKind::MatchPairs, Submission::Pairs { pairs, .. }) => {
            let Some(expected_pairs) = MatchPair::parse_list(expected) else {
                return false;
            };
            pairs.len() == expected_pairs.len()
                && expected_pairs
                    .iter()
                    .all(|pair| pairs.get(&pair.meaning) == Some(&pair.word))
        }
        _ => false,
    }
}

/// Convenience wrapper scoring against an exercise.
#[must_use]
pub fn score_exercise(exercise: &Exercise, submission: &Submission) -> bool {
    score(
        exercise.kind(),
        submission,
        exercise.expected_answer(),
        exercise.choices(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PairSide;

    fn choices(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| (*w).to_string()).collect()
    }

    fn pairs(entries: &[(&str, &str)]) -> Submission {
        let mut s = Submission::for_kind(&ExerciseKind::MatchPairs);
        for (word, meaning) in entries {
            s.toggle_pair(PairSide::Word, word);
            s.toggle_pair(PairSide::Meaning, meaning);
        }
        s
    }

    fn arrangement(placed: &[usize]) -> Submission {
        Submission::Arrangement {
            placed: placed.to_vec(),
        }
    }

    #[test]
    fn multiple_choice_is_exact() {
        let opts = choices(&["Apa kabar", "apa kabar"]);
        let pick = |o: &str| Submission::Choice {
            selected: Some(o.into()),
        };
        assert!(score(&ExerciseKind::MultipleChoice, &pick("Apa kabar"), "Apa kabar", &opts));
        assert!(!score(&ExerciseKind::MultipleChoice, &pick("apa kabar"), "Apa kabar", &opts));
        assert!(!score(&ExerciseKind::FillBlank, &pick("Apa kabar "), "Apa kabar", &opts));
    }

    #[test]
    fn nothing_selected_is_wrong() {
        let s = Submission::Choice { selected: None };
        assert!(!score(&ExerciseKind::Translation, &s, "", &choices(&[""])));
    }

    #[test]
    fn word_arrangement_is_order_sensitive() {
        let bank = choices(&["saya", "makan", "nasi"]);
        assert!(score(&ExerciseKind::WordArrangement, &arrangement(&[0, 1, 2]), "saya makan nasi", &bank));
        assert!(!score(&ExerciseKind::WordArrangement, &arrangement(&[1, 0, 2]), "saya makan nasi", &bank));
        assert!(!score(&ExerciseKind::WordArrangement, &arrangement(&[0, 1]), "saya makan nasi", &bank));
    }

    #[test]
    fn match_pairs_correct() {
        let s = pairs(&[("cat", "gato"), ("dog", "perro")]);
        assert!(score(&ExerciseKind::MatchPairs, &s, "cat:gato,dog:perro", &[]));
    }

    #[test]
    fn match_pairs_swapped_is_wrong() {
        let s = pairs(&[("dog", "gato"), ("cat", "perro")]);
        assert!(!score(&ExerciseKind::MatchPairs, &s, "cat:gato,dog:perro", &[]));
    }

    #[test]
    fn match_pairs_partial_is_wrong() {
        let s = pairs(&[("cat", "gato")]);
        assert!(!score(&ExerciseKind::MatchPairs, &s, "cat:gato,dog:perro", &[]));
    }

    #[test]
    fn match_pairs_repeated_word_can_be_correct() {
        let expected = "bank:tepi,bank:uang";
        let word_first = pairs(&[("bank", "tepi"), ("bank", "uang")]);
        assert!(score(&ExerciseKind::MatchPairs, &word_first, expected, &[]));

        let mut meaning_first = Submission::for_kind(&ExerciseKind::MatchPairs);
        for (side, item) in [
            (PairSide::Meaning, "tepi"),
            (PairSide::Word, "bank"),
            (PairSide::Meaning, "uang"),
            (PairSide::Word, "bank"),
        ] {
            meaning_first.toggle_pair(side, item);
        }
        assert!(score(&ExerciseKind::MatchPairs, &meaning_first, expected, &[]));
    }

    #[test]
    fn match_pairs_malformed_expected_is_wrong() {
        let s = pairs(&[("cat", "gato")]);
        assert!(!score(&ExerciseKind::MatchPairs, &s, "cat-gato", &[]));
    }

    #[test]
    fn mismatched_shape_and_unsupported_kind_are_wrong() {
        let s = Submission::Choice {
            selected: Some("a".into()),
        };
        assert!(!score(&ExerciseKind::WordArrangement, &s, "a", &choices(&["a"])));
        assert!(!score(&ExerciseKind::Unsupported("SA".into()), &s, "a", &choices(&["a"])));
    }
}
