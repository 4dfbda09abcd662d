//! Numeric text field: an editing surface that only ever holds partial numbers.
//!
//! Every edit (typed character, deletion, paste) is turned into a candidate string
//! and offered to [`NumericTextField::on_keystroke`]. A rejected candidate leaves
//! both the text and the cursor where they were.

use adder_types::{MAX_NUMERIC_LEN, NumberLocale, NumericText};
use tracing::debug;

/// Cursor positions are char indices. Accepted text is ASCII, so they are also byte indices.
#[derive(Debug, Clone, Default)]
pub struct NumericTextField {
    value: NumericText,
    cursor: usize,
    focused: bool,
}

impl NumericTextField {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn value(&self) -> &NumericText {
        &self.value
    }

    #[must_use]
    pub fn text(&self) -> &str {
        self.value.as_str()
    }

    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    #[must_use]
    pub fn is_focused(&self) -> bool {
        self.focused
    }

    #[must_use]
    pub fn to_number(&self) -> f64 {
        self.value.to_number()
    }

    /// Accept `raw` as the new value iff it is a partial number of at most
    /// [`MAX_NUMERIC_LEN`] characters. The cursor moves to the end.
    pub fn on_keystroke(&mut self, raw: &str) -> bool {
        let len = raw.chars().count();
        self.propose(raw, len)
    }

    /// Normalize the value and drop focus.
    pub fn on_blur(&mut self) {
        let normalized = self.value.normalized();
        if normalized != self.value {
            debug!(from = %self.value, to = %normalized, "Normalized numeric field on blur");
        }
        self.value = normalized;
        self.cursor = self.cursor.min(self.value.len());
        self.focused = false;
    }

    pub fn focus(&mut self) {
        self.focused = true;
        self.cursor = self.value.len();
    }

    /// Preview text for the focus tooltip.
    #[must_use]
    pub fn preview(&self, locale: &NumberLocale) -> String {
        self.value.preview(locale)
    }

    pub fn enter_char(&mut self, c: char) {
        if self.value.len() >= MAX_NUMERIC_LEN {
            return;
        }
        let mut candidate = self.value.as_str().to_string();
        candidate.insert(self.cursor, c);
        self.propose(&candidate, self.cursor + 1);
    }

    /// Insert pasted text at the cursor, truncated to the remaining capacity.
    pub fn enter_text(&mut self, text: &str) {
        let room = MAX_NUMERIC_LEN.saturating_sub(self.value.len());
        let inserted: String = text
            .chars()
            .filter(|c| !matches!(c, '\r' | '\n'))
            .take(room)
            .collect();
        if inserted.is_empty() {
            return;
        }
        let mut candidate = self.value.as_str().to_string();
        candidate.insert_str(self.cursor, &inserted);
        let cursor = self.cursor + inserted.chars().count();
        self.propose(&candidate, cursor);
    }

    pub fn delete_char(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let mut candidate = self.value.as_str().to_string();
        candidate.remove(self.cursor - 1);
        self.propose(&candidate, self.cursor - 1);
    }

    pub fn delete_char_forward(&mut self) {
        if self.cursor >= self.value.len() {
            return;
        }
        let mut candidate = self.value.as_str().to_string();
        candidate.remove(self.cursor);
        self.propose(&candidate, self.cursor);
    }

    pub fn clear(&mut self) {
        self.propose("", 0);
    }

    pub fn move_cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_cursor_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.value.len());
    }

    pub fn move_cursor_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_cursor_end(&mut self) {
        self.cursor = self.value.len();
    }

    fn propose(&mut self, candidate: &str, cursor: usize) -> bool {
        if candidate.chars().count() > MAX_NUMERIC_LEN {
            debug!(max = MAX_NUMERIC_LEN, "Rejected numeric edit: too long");
            return false;
        }
        match NumericText::new(candidate) {
            Ok(value) => {
                self.cursor = cursor.min(value.len());
                self.value = value;
                true
            }
            Err(err) => {
                debug!("Rejected numeric edit: {err}");
                false
            }
        }
    }
}
