//! Title text features: hashtags, emojis, and word counts.
//!
//! Emoji detection scans code points directly rather than pulling in an
//! emoji database; the ranges below cover the pictographic blocks used in
//! titles in practice.

use std::sync::LazyLock;

use regex::Regex;

static HASHTAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#\S+").expect("valid hashtag regex"));

const ZWJ: char = '\u{200D}';
const KEYCAP: char = '\u{20E3}';

/// Number of `#tag` tokens in `title`.
#[must_use]
pub fn hashtag_count(title: &str) -> usize {
    HASHTAG.find_iter(title).count()
}

/// `title` with every `#tag` token removed and whitespace collapsed.
#[must_use]
pub fn clean_title(title: &str) -> String {
    let stripped = HASHTAG.replace_all(title, "");
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Number of whitespace-separated words.
#[must_use]
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Number of emojis in `text`.
///
/// A ZWJ sequence (`👨‍🍳`), a flag (`🇫🇷`), a keycap (`1️⃣`), and a base
/// character followed by skin-tone or variation selectors each count once.
#[must_use]
pub fn emoji_count(text: &str) -> usize {
    let mut count = 0usize;
    let mut joined = false;
    let mut open_flag = false;

    for c in text.chars() {
        if c == ZWJ {
            joined = true;
            continue;
        }
        if is_modifier(c) {
            continue;
        }
        if c == KEYCAP {
            count += 1;
        } else if is_regional_indicator(c) {
            // Two regional indicators form one flag.
            if !open_flag {
                count += 1;
            }
            open_flag = !open_flag;
            joined = false;
            continue;
        } else if is_pictographic(c) && !joined {
            count += 1;
        }
        joined = false;
        open_flag = false;
    }

    count
}

fn is_modifier(c: char) -> bool {
    matches!(
        u32::from(c),
        0xFE0E..=0xFE0F       // variation selectors
            | 0x1F3FB..=0x1F3FF // skin tones
            | 0xE0020..=0xE007F // tag sequences (subdivision flags)
    )
}

fn is_regional_indicator(c: char) -> bool {
    matches!(u32::from(c), 0x1F1E6..=0x1F1FF)
}

fn is_pictographic(c: char) -> bool {
    matches!(
        u32::from(c),
        0x1F300..=0x1F5FF
            | 0x1F600..=0x1F64F
            | 0x1F680..=0x1F6FF
            | 0x1F7E0..=0x1F7FF
            | 0x1F900..=0x1F9FF
            | 0x1FA70..=0x1FAFF
            | 0x1F004
            | 0x1F170..=0x1F171
            | 0x1F17E..=0x1F17F
            | 0x1F0CF
            | 0x1F18E
            | 0x1F191..=0x1F19A
            | 0x1F201..=0x1F251
            | 0x00A9
            | 0x00AE
            | 0x203C
            | 0x2049
            | 0x2122
            | 0x2139
            | 0x2194..=0x2199
            | 0x21A9..=0x21AA
            | 0x24C2
            | 0x25AA..=0x25AB
            | 0x25B6
            | 0x25C0
            | 0x25FB..=0x25FE
            | 0x2934..=0x2935
            | 0x2600..=0x27BF
            | 0x231A..=0x231B
            | 0x23E9..=0x23FA
            | 0x2B05..=0x2B07
            | 0x2B1B..=0x2B1C
            | 0x2B50
            | 0x2B55
            | 0x3030
            | 0x303D
            | 0x3297
            | 0x3299
    )
}
