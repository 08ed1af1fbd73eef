//! General-English lexicon scorer for short video titles.

/// Word polarities.
///
/// Keys are lowercase single words. Values in `(0.0, 1.0]` are positive,
/// in `[-1.0, 0.0)` are negative.
pub(crate) const LEXICON: &[(&str, f64)] = &[
    // Positive
    ("amazing", 0.6),
    ("awesome", 1.0),
    ("beautiful", 0.85),
    ("best", 1.0),
    ("better", 0.5),
    ("brilliant", 0.9),
    ("cool", 0.35),
    ("cute", 0.5),
    ("delicious", 1.0),
    ("easy", 0.43),
    ("epic", 0.6),
    ("excellent", 1.0),
    ("excited", 0.4),
    ("fantastic", 0.4),
    ("favorite", 0.5),
    ("fun", 0.3),
    ("funny", 0.25),
    ("good", 0.7),
    ("great", 0.8),
    ("happy", 0.8),
    ("incredible", 0.9),
    ("insane", 0.5),
    ("love", 0.5),
    ("loved", 0.7),
    ("lovely", 0.5),
    ("nice", 0.6),
    ("perfect", 1.0),
    ("quick", 0.33),
    ("satisfying", 0.5),
    ("success", 0.3),
    ("super", 0.33),
    ("tasty", 0.5),
    ("top", 0.5),
    ("useful", 0.3),
    ("viral", 0.2),
    ("win", 0.8),
    ("wonderful", 1.0),
    ("wow", 0.1),
    // Negative
    ("angry", -0.5),
    ("annoying", -0.8),
    ("awful", -1.0),
    ("bad", -0.7),
    ("boring", -1.0),
    ("broken", -0.4),
    ("crazy", -0.6),
    ("dangerous", -0.6),
    ("disaster", -0.8),
    ("dumb", -0.38),
    ("fail", -0.5),
    ("failed", -0.5),
    ("fake", -0.5),
    ("hard", -0.29),
    ("hate", -0.8),
    ("horrible", -1.0),
    ("lost", -0.2),
    ("mad", -0.63),
    ("poor", -0.4),
    ("sad", -0.5),
    ("scary", -0.5),
    ("stupid", -0.8),
    ("terrible", -1.0),
    ("ugly", -0.7),
    ("weird", -0.5),
    ("worse", -0.4),
    ("worst", -1.0),
    ("wrong", -0.5),
];

/// Words that flip and dampen the polarity of the next scored word.
const NEGATORS: &[&str] = &[
    "not", "never", "no", "isn't", "wasn't", "don't", "doesn't", "didn't", "can't", "won't",
    "aren't", "ain't",
];

/// Factor applied to a negated word, as in common pattern-based scorers.
const NEGATION_FACTOR: f64 = -0.5;

/// Words that scale the polarity of the next scored word.
const INTENSIFIERS: &[(&str, f64)] = &[
    ("very", 1.3),
    ("really", 1.3),
    ("so", 1.3),
    ("extremely", 1.5),
    ("totally", 1.2),
    ("absolutely", 1.4),
    ("slightly", 0.5),
];

fn lookup(table: &[(&str, f64)], word: &str) -> Option<f64> {
    table
        .iter()
        .find_map(|&(w, weight)| (w == word).then_some(weight))
}

/// Score a text string using the lexicon.
///
/// Splits text into lowercase words and averages the polarity of every
/// lexicon word found. A directly preceding negator multiplies a word by
/// `-0.5`; a preceding intensifier multiplies it by its factor. The result
/// is clamped to `[-1.0, 1.0]`. Returns `0.0` for empty or unknown text.
#[must_use]
pub fn polarity(text: &str) -> f64 {
    let mut scores: Vec<f64> = Vec::new();
    let mut negated = false;
    let mut intensity = 1.0_f64;

    for raw in text.split_whitespace() {
        let word = raw
            .trim_matches(|c: char| !c.is_alphanumeric())
            .to_lowercase();
        if word.is_empty() {
            continue;
        }

        if NEGATORS.contains(&word.as_str()) {
            negated = true;
            continue;
        }
        if let Some(factor) = lookup(INTENSIFIERS, &word) {
            intensity *= factor;
            continue;
        }

        if let Some(weight) = lookup(LEXICON, &word) {
            let mut score = weight * intensity;
            if negated {
                score *= NEGATION_FACTOR;
            }
            scores.push(score.clamp(-1.0, 1.0));
        }
        negated = false;
        intensity = 1.0;
    }

    if scores.is_empty() {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let denom = scores.len() as f64;
    (scores.iter().sum::<f64>() / denom).clamp(-1.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_string_returns_zero() {
        assert_eq!(polarity(""), 0.0);
    }

    #[test]
    fn whitespace_only_returns_zero() {
        assert_eq!(polarity("   "), 0.0);
    }

    #[test]
    fn unknown_text_returns_zero() {
        assert_eq!(polarity("morning workout routine"), 0.0);
    }

    #[test]
    fn positive_keyword_returns_positive() {
        let score = polarity("Amazing sunset view!");
        assert!(score > 0.0, "expected positive score, got {score}");
    }

    #[test]
    fn negative_keyword_returns_negative() {
        let score = polarity("worst recipe fail");
        assert!(score < 0.0, "expected negative score, got {score}");
    }

    #[test]
    fn score_is_mean_of_matched_words() {
        // good (0.7) and bad (-0.7) cancel out
        let score = polarity("good and bad");
        assert!(score.abs() < 1e-12, "expected zero, got {score}");
    }

    #[test]
    fn negation_flips_and_dampens() {
        let score = polarity("not good");
        assert!((score - (-0.35)).abs() < 1e-12, "got {score}");
    }

    #[test]
    fn intensifier_scales_up_and_clamps() {
        let plain = polarity("great");
        let boosted = polarity("very great");
        assert!(boosted > plain, "{boosted} should exceed {plain}");
        assert_eq!(polarity("extremely perfect"), 1.0);
    }

    #[test]
    fn modifier_only_applies_to_next_scored_word() {
        // an unscored word between the negator and "funny" cancels the negation
        let score = polarity("not cat funny");
        assert!(score > 0.0, "got {score}");
    }

    #[test]
    fn punctuation_stripped_from_words() {
        let score = polarity("great!!!");
        assert!(score > 0.0, "expected positive score for 'great!!!', got {score}");
    }

    #[test]
    fn score_stays_in_range() {
        for text in ["best best best", "worst awful terrible", "so so so so perfect"] {
            let score = polarity(text);
            assert!((-1.0..=1.0).contains(&score), "{text}: {score}");
        }
    }
}
