//! Text wrapping and character classification

use crate::font::FontMetrics;
use tracing::trace;

/// Whether `ch` is a CJK ideograph (Unified, Extension A, Compatibility or Extension B)
pub fn is_cjk_ideograph(ch: char) -> bool {
    matches!(
        ch,
        '\u{4E00}'..='\u{9FFF}'
            | '\u{3400}'..='\u{4DBF}'
            | '\u{F900}'..='\u{FAFF}'
            | '\u{20000}'..='\u{2A6DF}'
    )
}

/// Whether `ch` is a precomposed Hangul syllable
pub fn is_hangul_syllable(ch: char) -> bool {
    matches!(ch, '\u{AC00}'..='\u{D7A3}')
}

/// Characters that occupy a full em square in CJK fonts
pub fn is_wide_char(ch: char) -> bool {
    is_cjk_ideograph(ch)
        || is_hangul_syllable(ch)
        || matches!(ch, '\u{3000}'..='\u{303F}' | '\u{FF01}'..='\u{FF60}')
}

/// Hangul syllables of a reading, in order, with spaces and punctuation dropped
pub fn reading_syllables(reading: &str) -> Vec<String> {
    reading
        .chars()
        .filter(|ch| is_hangul_syllable(*ch))
        .map(String::from)
        .collect()
}

/// Greedy line filler measuring with font metrics
struct LineFitter<'a> {
    metrics: &'a dyn FontMetrics,
    font_size: f32,
    max_width: f32,
    lines: Vec<String>,
    line: String,
    width: f32,
}

impl LineFitter<'_> {
    fn flush(&mut self) {
        if !self.line.is_empty() {
            self.lines.push(std::mem::take(&mut self.line));
        }
        self.width = 0.0;
    }

    fn push_word(&mut self, word: &str) {
        let word_width = self.metrics.text_width(word, self.font_size);
        if word_width > self.max_width {
            self.flush();
            self.push_chars(word);
            return;
        }

        let mut space = if self.line.is_empty() {
            0.0
        } else {
            self.metrics.char_width(' ', self.font_size)
        };
        if space > 0.0 && self.width + space + word_width > self.max_width {
            self.flush();
            space = 0.0;
        }
        if space > 0.0 {
            self.line.push(' ');
        }
        self.line.push_str(word);
        self.width += space + word_width;
    }

    /// Place a word that cannot fit on any line, breaking between characters
    fn push_chars(&mut self, word: &str) {
        for ch in word.chars() {
            let ch_width = self.metrics.char_width(ch, self.font_size);
            if !self.line.is_empty() && self.width + ch_width > self.max_width {
                self.flush();
            }
            self.line.push(ch);
            self.width += ch_width;
        }
    }
}

/// Break text into lines that fit within `max_width` points using font metrics.
///
/// Explicit newlines are kept. Words wider than a line are split between
/// characters.
pub fn wrap_text_with_metrics(
    text: &str,
    max_width: f32,
    font_size: f32,
    metrics: &dyn FontMetrics,
) -> Vec<String> {
    if text.is_empty() {
        return vec![String::new()];
    }

    let mut fitter = LineFitter {
        metrics,
        font_size,
        max_width,
        lines: Vec::new(),
        line: String::new(),
        width: 0.0,
    };
    for segment in text.split('\n') {
        let mut words = segment.split_whitespace().peekable();
        if words.peek().is_none() {
            fitter.lines.push(String::new());
            continue;
        }
        for word in words {
            fitter.push_word(word);
        }
        fitter.flush();
    }

    trace!("Wrapped {} chars into {} lines", text.chars().count(), fitter.lines.len());
    fitter.lines
}
