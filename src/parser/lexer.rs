//! Lexer (tokenizer) for Jack source code
//!
//! Pull-based scanner over an immutable source buffer: each call to
//! [`Lexer::next_token`] skips insignificant input (spaces, newlines, tabs,
//! comments) and produces one classified [`Token`], or `None` at end of
//! input. [`Lexer::peek_tokens`] looks ahead an arbitrary number of tokens
//! without consuming them, which is how the parser disambiguates grammar
//! alternatives without backtracking.

use crate::parser::cst::{SourceLocation, Token, TokenKind};
use rustc_hash::FxHashSet;
use std::fmt;

/// The reserved words of the language. Any word run matching one of these
/// is a `Keyword` token, never an identifier.
pub const KEYWORDS: [&str; 21] = [
    "class",
    "constructor",
    "function",
    "method",
    "field",
    "static",
    "var",
    "int",
    "char",
    "boolean",
    "void",
    "true",
    "false",
    "null",
    "this",
    "let",
    "do",
    "if",
    "else",
    "while",
    "return",
];

/// The 19 one-character symbols of the language.
pub const SYMBOLS: [char; 19] = [
    '{', '}', '(', ')', '[', ']', '.', ',', ';', '+', '-', '*', '/', '&', '|', '<', '>', '=', '~',
];

/// Width a tab advances the column counter by, approximating fixed-width
/// rendering for diagnostics.
const TAB_WIDTH: usize = 4;

/// Lexer error type
#[derive(Debug)]
pub struct LexError {
    pub message: String,
    pub file: String,
    pub location: SourceLocation,
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Lexical error in {} at line {}, column {}: {}",
            self.file, self.location.line, self.location.column, self.message
        )
    }
}

impl std::error::Error for LexError {}

/// Scan position over the source buffer.
///
/// Copying the cursor is how lookahead rewinds: `peek_tokens` saves a copy,
/// lets the scanner advance, and restores it, leaving the lexer untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Cursor {
    position: usize,
    line: usize,
    column: usize,
}

/// Lexer for Jack source code
pub struct Lexer {
    input: Vec<char>,
    file: String,
    cursor: Cursor,
    keywords: FxHashSet<&'static str>,
    symbols: FxHashSet<char>,
}

impl Lexer {
    /// Create a new lexer over `source`. `file` is used only in
    /// diagnostics.
    pub fn new(source: &str, file: &str) -> Self {
        Self {
            input: source.chars().collect(),
            file: file.to_string(),
            cursor: Cursor {
                position: 0,
                line: 1,
                column: 1,
            },
            keywords: KEYWORDS.iter().copied().collect(),
            symbols: SYMBOLS.iter().copied().collect(),
        }
    }

    /// Get the next token, or `None` at end of input.
    pub fn next_token(&mut self) -> Result<Option<Token>, LexError> {
        self.skip_insignificant();

        let loc = self.location();
        let ch = match self.peek() {
            Some(ch) => ch,
            None => return Ok(None),
        };

        if self.symbols.contains(&ch) {
            self.advance();
            return Ok(Some(Token::new(TokenKind::Symbol, ch.to_string(), loc)));
        }

        if ch == '"' {
            return self.string_constant(loc).map(Some);
        }

        self.word(loc).map(Some)
    }

    /// Look at the next `depth` tokens without consuming them.
    ///
    /// Entries past end of input are `None`. The cursor is restored exactly
    /// afterwards, including when a lexical error is hit, so peeking any
    /// number of times never changes what `next_token` returns next.
    pub fn peek_tokens(&mut self, depth: usize) -> Result<Vec<Option<Token>>, LexError> {
        let saved = self.cursor;
        let mut tokens = Vec::with_capacity(depth);

        for _ in 0..depth {
            match self.next_token() {
                Ok(token) => tokens.push(token),
                Err(err) => {
                    self.cursor = saved;
                    return Err(err);
                }
            }
        }

        self.cursor = saved;
        Ok(tokens)
    }

    /// Current cursor position, used for end-of-input diagnostics.
    pub fn location(&self) -> SourceLocation {
        SourceLocation::new(self.cursor.line, self.cursor.column)
    }

    /// File identifier this lexer scans.
    pub fn file(&self) -> &str {
        &self.file
    }

    /// Scan a string constant. The raw lexeme spans from the opening to the
    /// closing quote inclusive.
    fn string_constant(&mut self, loc: SourceLocation) -> Result<Token, LexError> {
        let mut raw = String::from('"');
        self.advance(); // opening quote

        while let Some(ch) = self.advance() {
            raw.push(ch);
            if ch == '"' {
                return Ok(Token::new(TokenKind::StringConstant, raw, loc));
            }
        }

        Err(self.error("unterminated string constant", loc))
    }

    /// Scan a maximal run of characters that are neither whitespace nor
    /// symbols, then classify it as a keyword, integer constant, or
    /// identifier. Comment starters begin with `/`, itself a symbol, so a
    /// run can never contain one.
    fn word(&mut self, loc: SourceLocation) -> Result<Token, LexError> {
        let mut run = String::new();

        while let Some(ch) = self.peek() {
            if ch.is_whitespace() || self.symbols.contains(&ch) {
                break;
            }
            run.push(ch);
            self.advance();
        }

        if self.keywords.contains(run.as_str()) {
            Ok(Token::new(TokenKind::Keyword, run, loc))
        } else if run.starts_with(|c: char| c.is_ascii_digit()) {
            if run.chars().all(|c| c.is_ascii_digit()) {
                Ok(Token::new(TokenKind::IntegerConstant, run, loc))
            } else {
                Err(self.error(&format!("malformed integer constant '{}'", run), loc))
            }
        } else if is_identifier(&run) {
            Ok(Token::new(TokenKind::Identifier, run, loc))
        } else {
            Err(self.error(&format!("invalid identifier '{}'", run), loc))
        }
    }

    /// Skip spaces, newlines, tabs, and comments until the next significant
    /// character or end of input.
    fn skip_insignificant(&mut self) {
        loop {
            match self.peek() {
                Some(' ') | Some('\t') | Some('\r') | Some('\n') => {
                    self.advance();
                }
                Some('/') if self.peek_ahead(1) == Some('/') => self.skip_line_comment(),
                Some('/') if self.peek_ahead(1) == Some('*') => self.skip_block_comment(),
                _ => break,
            }
        }
    }

    /// Skip a single-line comment (`// ...`), including its terminating
    /// newline.
    fn skip_line_comment(&mut self) {
        while let Some(ch) = self.advance() {
            if ch == '\n' {
                break;
            }
        }
    }

    /// Skip a block comment (`/* ... */` or `/** ... */`, non-nesting).
    /// An unterminated comment consumes the rest of the input.
    fn skip_block_comment(&mut self) {
        self.advance(); // skip '/'
        self.advance(); // skip '*'

        while let Some(ch) = self.peek() {
            if ch == '*' && self.peek_ahead(1) == Some('/') {
                self.advance(); // skip '*'
                self.advance(); // skip '/'
                return;
            }
            self.advance();
        }
    }

    /// Peek at current character without consuming
    fn peek(&self) -> Option<char> {
        self.input.get(self.cursor.position).copied()
    }

    /// Peek ahead n characters
    fn peek_ahead(&self, n: usize) -> Option<char> {
        self.input.get(self.cursor.position + n).copied()
    }

    /// Advance to the next character, keeping the line and column counters
    /// in step. `\n`, `\r`, and `\r\n` each count as a single line break;
    /// a tab widens the column by [`TAB_WIDTH`].
    fn advance(&mut self) -> Option<char> {
        let ch = *self.input.get(self.cursor.position)?;
        self.cursor.position += 1;

        match ch {
            '\n' => {
                self.cursor.line += 1;
                self.cursor.column = 1;
            }
            '\r' => {
                // \r\n is one break; let the following \n account for it
                if self.peek() != Some('\n') {
                    self.cursor.line += 1;
                    self.cursor.column = 1;
                }
            }
            '\t' => self.cursor.column += TAB_WIDTH,
            _ => self.cursor.column += 1,
        }

        Some(ch)
    }

    fn error(&self, message: &str, location: SourceLocation) -> LexError {
        LexError {
            message: message.to_string(),
            file: self.file.clone(),
            location,
        }
    }
}

/// `[A-Za-z_][A-Za-z_0-9]*`
fn is_identifier(run: &str) -> bool {
    let mut chars = run.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenize(source: &str) -> Vec<Token> {
        let mut lexer = Lexer::new(source, "test.jack");
        let mut tokens = Vec::new();
        while let Some(token) = lexer.next_token().unwrap() {
            tokens.push(token);
        }
        tokens
    }

    #[test]
    fn test_simple_tokens() {
        let tokens = tokenize("class Main { }");

        assert_eq!(tokens.len(), 4);
        assert!(matches!(tokens[0].kind, TokenKind::Keyword));
        assert_eq!(tokens[0].raw, "class");
        assert!(matches!(tokens[1].kind, TokenKind::Identifier));
        assert_eq!(tokens[1].raw, "Main");
        assert!(matches!(tokens[2].kind, TokenKind::Symbol));
        assert_eq!(tokens[2].raw, "{");
        assert_eq!(tokens[3].raw, "}");
    }

    #[test]
    fn test_string_constant_keeps_quotes() {
        let tokens = tokenize(r#"let s = "hi there";"#);

        assert!(matches!(tokens[3].kind, TokenKind::StringConstant));
        assert_eq!(tokens[3].raw, "\"hi there\"");
    }

    #[test]
    fn test_comments_skipped() {
        let tokens =
            tokenize("var int x; // trailing\nvar int y; /* block\ncomment */ var int z;");

        let raws: Vec<&str> = tokens.iter().map(|t| t.raw.as_str()).collect();
        assert_eq!(
            raws,
            vec!["var", "int", "x", ";", "var", "int", "y", ";", "var", "int", "z", ";"]
        );
    }

    #[test]
    fn test_doc_comment_skipped() {
        let tokens = tokenize("/** API comment */ class Main { }");
        assert_eq!(tokens[0].raw, "class");
    }

    #[test]
    fn test_line_accounting_per_break_style() {
        let tokens = tokenize("a\nb\rc\r\nd");

        assert_eq!(tokens[0].location.line, 1);
        assert_eq!(tokens[1].location.line, 2);
        assert_eq!(tokens[2].location.line, 3);
        assert_eq!(tokens[3].location.line, 4);
    }

    #[test]
    fn test_tab_widens_column() {
        let tokens = tokenize("\tlet");

        assert_eq!(tokens[0].location.line, 1);
        assert_eq!(tokens[0].location.column, 1 + TAB_WIDTH);
    }

    #[test]
    fn test_peek_is_idempotent() {
        let mut lexer = Lexer::new("do Output.printInt(1);", "test.jack");

        let first = lexer.peek_tokens(3).unwrap();
        let second = lexer.peek_tokens(3).unwrap();
        assert_eq!(first, second);

        // Consuming afterwards yields exactly the peeked sequence
        for peeked in first {
            assert_eq!(lexer.next_token().unwrap(), peeked);
        }
    }

    #[test]
    fn test_peek_past_end_of_input() {
        let mut lexer = Lexer::new(";", "test.jack");

        let tokens = lexer.peek_tokens(3).unwrap();
        assert!(tokens[0].is_some());
        assert!(tokens[1].is_none());
        assert!(tokens[2].is_none());

        assert!(lexer.next_token().unwrap().is_some());
        assert!(lexer.next_token().unwrap().is_none());
    }

    #[test]
    fn test_malformed_integer() {
        let mut lexer = Lexer::new("123abc", "test.jack");
        let err = lexer.next_token().unwrap_err();
        assert!(err.message.contains("malformed integer"));
    }

    #[test]
    fn test_unterminated_string() {
        let mut lexer = Lexer::new("\"unterminated", "test.jack");
        let err = lexer.next_token().unwrap_err();
        assert!(err.message.contains("unterminated string"));
    }

    #[test]
    fn test_invalid_identifier() {
        let mut lexer = Lexer::new("what$ever", "test.jack");
        let err = lexer.next_token().unwrap_err();
        assert!(err.message.contains("invalid identifier"));
    }

    #[test]
    fn test_peek_restores_cursor_after_error() {
        let mut lexer = Lexer::new("x 123abc", "test.jack");

        assert!(lexer.peek_tokens(2).is_err());
        // The good token before the bad run is still next in line
        let token = lexer.next_token().unwrap().unwrap();
        assert_eq!(token.raw, "x");
    }

    #[test]
    fn test_keyword_vs_identifier() {
        let tokens = tokenize("return returned");

        assert!(matches!(tokens[0].kind, TokenKind::Keyword));
        assert!(matches!(tokens[1].kind, TokenKind::Identifier));
    }

    #[test]
    fn test_lexical_set_sizes() {
        assert_eq!(KEYWORDS.len(), 21);
        assert_eq!(SYMBOLS.len(), 19);
    }
}
