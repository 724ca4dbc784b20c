//! Character wrap width from a pixel budget, and the greedy word wrap that consumes it.

use crate::error::Result;
use crate::graphics::{FontSpec, TextMeasure};

/// Number of leading chars of `text` that fit on one line of `max_line_px`.
///
/// The prefix grows one char at a time and is re-measured after each append;
/// the scan stops at the first prefix whose width reaches the budget. A prefix
/// landing exactly on the budget is kept, one that overshoots is not. Text that
/// never reaches the budget returns its full char count.
pub fn find_wrap_width<M: TextMeasure + ?Sized>(
    text: &str,
    font: &FontSpec,
    max_line_px: u32,
    measure: &M,
) -> Result<usize> {
    let mut prefix = String::with_capacity(text.len());
    for (i, ch) in text.chars().enumerate() {
        prefix.push(ch);
        let width = measure.line_width(&prefix, font)?;
        if width >= max_line_px {
            return Ok(if width == max_line_px { i + 1 } else { i });
        }
    }
    Ok(text.chars().count())
}

/// Greedy word wrap at `width` chars per line.
///
/// Runs of whitespace (newlines included) collapse to one separator. Words are
/// never split: one longer than `width` gets a line of its own.
pub fn word_wrap(text: &str, width: usize) -> String {
    let width = width.max(1);
    let mut out = String::with_capacity(text.len());
    let mut line_len = 0;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        if line_len == 0 {
            out.push_str(word);
            line_len = word_len;
        } else if line_len + 1 + word_len <= width {
            out.push(' ');
            out.push_str(word);
            line_len += 1 + word_len;
        } else {
            out.push('\n');
            out.push_str(word);
            line_len = word_len;
        }
    }
    out
}
