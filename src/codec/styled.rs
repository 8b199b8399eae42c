//! Style-tagged text fragments.

use crate::core::TextStyle;
use serde::Serialize;
use std::fmt;

/// A run of text sharing one style.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Fragment {
    /// The text.
    pub text: String,
    /// Color and font.
    pub style: TextStyle,
}

/// Text made of styled fragments.
///
/// Adjacent pushes with the same style are folded into one fragment, and
/// empty pushes are dropped, so the fragment list depends only on the
/// resulting characters and their styles.
///
/// # Examples
///
/// ```
/// use uart_log::codec::StyledText;
/// use uart_log::core::TextStyle;
///
/// let mut text = StyledText::new();
/// text.push("AT", TextStyle::default_tx());
/// text.push("\r\n", TextStyle::default_tx());
/// text.push("OK", TextStyle::default_rx());
///
/// assert_eq!(text.fragments().len(), 2);
/// assert_eq!(text.plain_text(), "AT\r\nOK");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StyledText {
    fragments: Vec<Fragment>,
}

impl StyledText {
    /// Creates empty text.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            fragments: Vec::new(),
        }
    }

    /// Creates text holding a single fragment.
    #[must_use]
    pub fn styled(text: &str, style: TextStyle) -> Self {
        let mut styled = Self::new();
        styled.push(text, style);
        styled
    }

    /// Appends text in the given style.
    pub fn push(&mut self, text: &str, style: TextStyle) {
        if text.is_empty() {
            return;
        }
        match self.fragments.last_mut() {
            Some(last) if last.style == style => last.text.push_str(text),
            _ => self.fragments.push(Fragment {
                text: text.to_string(),
                style,
            }),
        }
    }

    /// Appends all fragments of `other`.
    pub fn append(&mut self, other: Self) {
        for fragment in other.fragments {
            self.push(&fragment.text, fragment.style);
        }
    }

    /// The fragments in order.
    #[must_use]
    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    /// Concatenated text without styling.
    #[must_use]
    pub fn plain_text(&self) -> String {
        self.fragments.iter().map(|f| f.text.as_str()).collect()
    }

    /// Total length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fragments.iter().map(|f| f.text.len()).sum()
    }

    /// Returns true if there is no text.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Removes all text.
    pub fn clear(&mut self) {
        self.fragments.clear();
    }
}

impl fmt::Display for StyledText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for fragment in &self.fragments {
            f.write_str(&fragment.text)?;
        }
        Ok(())
    }
}
