//! Lexer for tokenizing shell input.
//!
//! Handles:
//! - Whitespace-separated words
//! - Single and double quotes (consumed, not emitted, non-nesting)
//! - Quoted sections adjoining bare text (`a"b c"d` is one word)
//! - Unterminated quotes, which absorb the rest of the line

use std::iter::Peekable;
use std::str::Chars;

// =============================================================================
// Lexer
// =============================================================================

/// Lexer for tokenizing shell input
pub struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given input
    pub fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
        }
    }

    /// Tokenize the entire input into a vector
    ///
    /// This is a convenience method that collects all tokens.
    /// For lazy evaluation, use the `Iterator` implementation directly.
    pub fn tokenize(self) -> Vec<String> {
        self.collect()
    }

    fn skip_whitespace(&mut self) {
        while self.chars.next_if(|c| c.is_whitespace()).is_some() {}
    }

    /// Read up to the closing `quote`, or to the end of input if there is none.
    fn read_quoted(&mut self, quote: char, word: &mut String) {
        for c in self.chars.by_ref() {
            if c == quote {
                return;
            }
            word.push(c);
        }
    }
}

impl Iterator for Lexer<'_> {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        self.skip_whitespace();
        self.chars.peek()?;

        let mut word = String::new();
        while let Some(c) = self.chars.next_if(|c| !c.is_whitespace()) {
            match c {
                '"' | '\'' => self.read_quoted(c, &mut word),
                _ => word.push(c),
            }
        }
        Some(word)
    }
}

// =============================================================================
// Tests
// =============================================================================
