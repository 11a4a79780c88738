/// The paragraph a session asks the user to type.
///
/// Stored as chars so per-position comparisons never split a UTF-8
/// sequence. Immutable once built; a reset swaps in a new value wholesale.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetText {
    text: String,
    chars: Vec<char>,
}

impl TargetText {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let chars = text.chars().collect();
        Self { text, chars }
    }

    /// Length in chars, not bytes.
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn char_at(&self, idx: usize) -> Option<char> {
        self.chars.get(idx).copied()
    }

    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl From<&str> for TargetText {
    fn from(s: &str) -> Self {
        TargetText::new(s)
    }
}

impl From<String> for TargetText {
    fn from(s: String) -> Self {
        TargetText::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_len_counts_chars() {
        let text = TargetText::new("naïve");
        assert_eq!(text.len(), 5);
        assert_eq!(text.as_str().len(), 6);
    }

    #[test]
    fn test_char_at() {
        let text = TargetText::from("hey");
        assert_eq!(text.char_at(0), Some('h'));
        assert_eq!(text.char_at(2), Some('y'));
        assert_eq!(text.char_at(3), None);
    }

    #[test]
    fn test_default_is_empty() {
        let text = TargetText::default();
        assert!(text.is_empty());
        assert_eq!(text.len(), 0);
    }
}
