//! Unicode-aware line tokenization
//!
//! Text is walked by extended grapheme cluster (UAX #29) so that emoji
//! sequences, flags and combining marks are handled as single units.
//! ASCII punctuation and curly double quotes separate words, emoji (the
//! Unicode Emoji property via `unic-emoji-char`, plus the pictograph and
//! symbol blocks) are dropped or kept as standalone words, and words are
//! lowercased.

use unicode_segmentation::UnicodeSegmentation;

/// Turns raw line text into an ordered sequence of word tokens.
///
/// This is the only place where "word" is defined, and therefore what
/// multiset equality between lines means. Implementations must be
/// deterministic and free of side effects.
pub trait Tokenize: Send + Sync {
    fn tokenize(&self, text: &str) -> Vec<String>;

    /// Identifies the tokenizer and every setting that changes its output.
    /// Prepared corpora record it and refuse reuse under a different one.
    fn signature(&self) -> String {
        std::any::type_name::<Self>().to_string()
    }
}

/// The default tokenizer
#[derive(Debug, Clone, Default)]
pub struct Tokenizer {
    /// Keep emoji as standalone words instead of stripping them
    keep_emoji: bool,
}

impl Tokenizer {
    /// Create a new tokenizer with default settings
    pub fn new() -> Self {
        Self { keep_emoji: false }
    }

    /// Keep emoji as standalone words
    pub fn with_keep_emoji(mut self, keep_emoji: bool) -> Self {
        self.keep_emoji = keep_emoji;
        self
    }

    /// Tokenize text into lowercase words
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let mut words = Vec::new();
        let mut current = String::new();

        for grapheme in text.graphemes(true) {
            if is_separator(grapheme) {
                flush(&mut current, &mut words);
            } else if is_emoji(grapheme) {
                if self.keep_emoji {
                    flush(&mut current, &mut words);
                    words.push(grapheme.to_string());
                }
            } else {
                current.extend(grapheme.chars().flat_map(char::to_lowercase));
            }
        }
        flush(&mut current, &mut words);

        words
    }
}

impl Tokenize for Tokenizer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        Tokenizer::tokenize(self, text)
    }

    fn signature(&self) -> String {
        format!("default(keep_emoji={})", self.keep_emoji)
    }
}

fn flush(current: &mut String, words: &mut Vec<String>) {
    if !current.is_empty() {
        words.push(std::mem::take(current));
    }
}

fn is_separator(grapheme: &str) -> bool {
    let mut chars = grapheme.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => c.is_whitespace() || c.is_ascii_punctuation() || c == '“' || c == '”',
        // "\r\n" is a single grapheme
        _ => grapheme.chars().all(char::is_whitespace),
    }
}

fn is_emoji(grapheme: &str) -> bool {
    grapheme.chars().any(is_pictographic)
}

/// Emoji code points, joiners and selectors. ASCII digits, `#` and `*`
/// carry the Emoji property but stay word characters.
fn is_pictographic(c: char) -> bool {
    (!c.is_ascii() && unic_emoji_char::is_emoji(c))
        || matches!(
            c as u32,
            0x1F000..=0x1FAFF   // pictographs added after the bundled emoji data
                | 0x2300..=0x23FF   // misc technical
                | 0x2600..=0x27BF   // misc symbols, dingbats
                | 0x2B00..=0x2BFF   // arrows, stars
                | 0x20E3            // combining enclosing keycap
                | 0xFE0F            // emoji presentation selector
                | 0x200D            // zero width joiner
                | 0xE0020..=0xE007F // tag sequences
        )
}
