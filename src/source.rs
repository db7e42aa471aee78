//! Character sources consumed by the lexer.

use std::str::Chars;

/// Three primitives the lexer reads characters through.
pub trait CharSource {
    /// Next character without consuming it.
    fn peek(&mut self) -> Option<char>;
    /// Consume and return the next character.
    fn next(&mut self) -> Option<char>;
    /// Return one character to the front of the source.
    fn push_back(&mut self, c: char);
}

/// In-memory source over a string slice.
pub struct StrSource<'a> {
    chars: Chars<'a>,
    pushed: Vec<char>,
}

impl<'a> StrSource<'a> {
    #[must_use]
    pub fn new(input: &'a str) -> Self {
        let input = input.strip_prefix('\u{FEFF}').unwrap_or(input);
        Self {
            chars: input.chars(),
            pushed: Vec::new(),
        }
    }
}

impl CharSource for StrSource<'_> {
    fn peek(&mut self) -> Option<char> {
        self.pushed
            .last()
            .copied()
            .or_else(|| self.chars.clone().next())
    }

    fn next(&mut self) -> Option<char> {
        self.pushed.pop().or_else(|| self.chars.next())
    }

    fn push_back(&mut self, c: char) {
        self.pushed.push(c);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn peek_does_not_consume() {
        let mut src = StrSource::new("ab");
        assert_eq!(src.peek(), Some('a'));
        assert_eq!(src.peek(), Some('a'));
        assert_eq!(src.next(), Some('a'));
        assert_eq!(src.next(), Some('b'));
        assert_eq!(src.peek(), None);
        assert_eq!(src.next(), None);
    }

    #[test]
    fn push_back_is_read_first() {
        let mut src = StrSource::new("bc");
        assert_eq!(src.next(), Some('b'));
        src.push_back('/');
        assert_eq!(src.peek(), Some('/'));
        assert_eq!(src.next(), Some('/'));
        assert_eq!(src.next(), Some('c'));
    }

    #[test]
    fn bom_is_skipped() {
        let mut src = StrSource::new("\u{FEFF}x");
        assert_eq!(src.next(), Some('x'));
    }
}
