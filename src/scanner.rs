//! Streaming lexer: `&str` in, [`Token`]s out.
//!
//! [`Scanner`] is an iterator over `Result<Token>`.  Whitespace and `//`
//! comments are skipped, exactly one `EOF` token closes the stream, and the
//! iterator is fused afterwards.  A lexical error is yielded in place of the
//! offending lexeme and scanning carries on behind it, so one pass reports
//! every bad character of a source.
//!
//! ```rust
//! use rox::scanner::Scanner;
//!
//! let kinds: Vec<String> = Scanner::new("print 1;")
//!     .filter_map(|t| t.ok())
//!     .map(|t| t.token_type.name())
//!     .collect();
//!
//! assert_eq!(kinds, ["PRINT", "NUMBER", "SEMICOLON", "EOF"]);
//! ```

use crate::error::{LoxError, Result};
use crate::token::{Token, TokenType};
use log::{debug, info};
use memchr::memchr;
use phf::phf_map;
use std::iter::FusedIterator;

static KEYWORDS: phf::Map<&'static [u8], TokenType> = phf_map! {
    b"and"    => TokenType::AND,
    b"class"  => TokenType::CLASS,
    b"else"   => TokenType::ELSE,
    b"false"  => TokenType::FALSE,
    b"fun"    => TokenType::FUN,
    b"for"    => TokenType::FOR,
    b"if"     => TokenType::IF,
    b"nil"    => TokenType::NIL,
    b"or"     => TokenType::OR,
    b"print"  => TokenType::PRINT,
    b"return" => TokenType::RETURN,
    b"super"  => TokenType::SUPER,
    b"this"   => TokenType::THIS,
    b"true"   => TokenType::TRUE,
    b"var"    => TokenType::VAR,
    b"while"  => TokenType::WHILE,
};

pub struct Scanner<'a> {
    /// Source text; lexemes are sliced out of it.
    text: &'a str,
    /// The same source as bytes, for byte-wise matching.
    src: &'a [u8],
    /// First byte of the lexeme being scanned.
    start: usize,
    /// Next byte to examine.
    curr: usize,
    line: usize,
    emitted_eof: bool,
}

impl<'a> Scanner<'a> {
    pub fn new(text: &'a str) -> Self {
        info!("Scanner created over {} bytes", text.len());

        Self {
            text,
            src: text.as_bytes(),
            start: 0,
            curr: 0,
            line: 1,
            emitted_eof: false,
        }
    }

    #[inline(always)]
    fn is_at_end(&self) -> bool {
        self.curr >= self.src.len()
    }

    /// Only called when not at the end.
    #[inline(always)]
    fn advance(&mut self) -> u8 {
        let b: u8 = self.src[self.curr];
        self.curr += 1;
        b
    }

    /// Current byte, or `0` past the end.
    #[inline(always)]
    fn peek(&self) -> u8 {
        self.src.get(self.curr).copied().unwrap_or(0)
    }

    #[inline(always)]
    fn peek_next(&self) -> u8 {
        self.src.get(self.curr + 1).copied().unwrap_or(0)
    }

    /// `with_equal` if the next byte is `=` (consuming it), else `alone`.
    fn one_or_two(&mut self, alone: TokenType, with_equal: TokenType) -> TokenType {
        if self.peek() == b'=' {
            self.curr += 1;
            with_equal
        } else {
            alone
        }
    }

    /// Scan one lexeme starting at `self.start`.  `Ok(None)` means it was
    /// whitespace or a comment.
    fn scan_token(&mut self) -> Result<Option<TokenType>> {
        let kind: TokenType = match self.advance() {
            b'(' => TokenType::LEFT_PAREN,
            b')' => TokenType::RIGHT_PAREN,
            b'{' => TokenType::LEFT_BRACE,
            b'}' => TokenType::RIGHT_BRACE,
            b',' => TokenType::COMMA,
            b'.' => TokenType::DOT,
            b'-' => TokenType::MINUS,
            b'+' => TokenType::PLUS,
            b';' => TokenType::SEMICOLON,
            b'*' => TokenType::STAR,

            b'!' => self.one_or_two(TokenType::BANG, TokenType::BANG_EQUAL),
            b'=' => self.one_or_two(TokenType::EQUAL, TokenType::EQUAL_EQUAL),
            b'<' => self.one_or_two(TokenType::LESS, TokenType::LESS_EQUAL),
            b'>' => self.one_or_two(TokenType::GREATER, TokenType::GREATER_EQUAL),

            b'/' if self.peek() == b'/' => {
                // the newline itself is left for the line counter
                self.curr = match memchr(b'\n', &self.src[self.curr..]) {
                    Some(offset) => self.curr + offset,
                    None => self.src.len(),
                };
                return Ok(None);
            }
            b'/' => TokenType::SLASH,

            b' ' | b'\r' | b'\t' => return Ok(None),

            b'\n' => {
                self.line += 1;
                return Ok(None);
            }

            b'"' => self.string()?,

            b'0'..=b'9' => self.number(),

            b'a'..=b'z' | b'A'..=b'Z' | b'_' => self.identifier(),

            _ => {
                // keep `curr` on a char boundary
                while self.peek() & 0xC0 == 0x80 {
                    self.curr += 1;
                }

                return Err(LoxError::lex(
                    self.line,
                    format!("Unexpected character: {}", &self.text[self.start..self.curr]),
                ));
            }
        };

        Ok(Some(kind))
    }

    /// Strings may span lines; the token is stamped with the closing line.
    fn string(&mut self) -> Result<TokenType> {
        while !self.is_at_end() && self.peek() != b'"' {
            if self.advance() == b'\n' {
                self.line += 1;
            }
        }

        if self.is_at_end() {
            return Err(LoxError::lex(self.line, "Unterminated string."));
        }

        self.curr += 1;

        let contents: &str = &self.text[self.start + 1..self.curr - 1];
        Ok(TokenType::STRING(contents.to_owned()))
    }

    /// `123` or `3.14`; a trailing `.` is not part of the number.
    fn number(&mut self) -> TokenType {
        while self.peek().is_ascii_digit() {
            self.curr += 1;
        }

        if self.peek() == b'.' && self.peek_next().is_ascii_digit() {
            self.curr += 1;

            while self.peek().is_ascii_digit() {
                self.curr += 1;
            }
        }

        // only ASCII digits and at most one '.' were consumed
        let value: f64 = self.text[self.start..self.curr].parse().unwrap_or(0.0);
        TokenType::NUMBER(value)
    }

    fn identifier(&mut self) -> TokenType {
        while self.peek().is_ascii_alphanumeric() || self.peek() == b'_' {
            self.curr += 1;
        }

        KEYWORDS
            .get(&self.src[self.start..self.curr])
            .cloned()
            .unwrap_or(TokenType::IDENTIFIER)
    }
}

impl<'a> Iterator for Scanner<'a> {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.is_at_end() {
            self.start = self.curr;

            match self.scan_token() {
                Err(e) => return Some(Err(e)),
                Ok(None) => continue,
                Ok(Some(kind)) => {
                    let lexeme: &str = &self.text[self.start..self.curr];
                    debug!("Scanned {:?} on line {}", kind, self.line);

                    return Some(Ok(Token::new(kind, lexeme, self.line)));
                }
            }
        }

        if self.emitted_eof {
            return None;
        }

        self.emitted_eof = true;
        Some(Ok(Token::new(TokenType::EOF, "", self.line)))
    }
}

impl<'a> FusedIterator for Scanner<'a> {}
