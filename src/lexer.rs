//! byte stream → token stream (`spec.md` §4.1).
//!
//! The cursor mirrors `y-lang`'s `lexer::Lexer`: a `Peekable<Chars>` plus
//! running line/column counters. The analyser gets its two-token lookahead
//! from [`crate::cursor::Cursor`] over the fully pre-lexed token vector this
//! module's [`tokenize`] produces, not from re-reading the character stream.
use std::collections::HashMap;
use std::iter::Peekable;
use std::str::Chars;

use once_cell::sync::Lazy;

use crate::error::{CompileError, ErrorKind};
use crate::position::Position;
use crate::token::{Token, TokenKind};

static KEYWORDS: Lazy<HashMap<&'static str, TokenKind>> = Lazy::new(|| {
    use TokenKind::*;
    HashMap::from([
        ("int", Int),
        ("char", Char),
        ("double", Double),
        ("void", Void),
        ("const", Const),
        ("if", If),
        ("else", Else),
        ("while", While),
        ("return", Return),
        ("print", Print),
        ("scan", Scan),
    ])
});

/// Characters allowed unescaped inside a char/string literal (the grammar's
/// C-char / S-char set): printable ASCII excluding the literal's own
/// delimiter and the backslash, plus space and tab.
fn is_literal_char(ch: char, delimiter: char) -> bool {
    ch.is_ascii_graphic() && ch != delimiter && ch != '\\' || ch == ' ' || ch == '\t'
}

pub struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    line: u32,
    column: u32,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            chars: source.chars().peekable(),
            line: 1,
            column: 1,
        }
    }

    fn pos(&self) -> Position {
        Position::new(self.line, self.column)
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.chars.next()?;
        match ch {
            '\n' => {
                self.line += 1;
                self.column = 1;
            }
            _ => self.column += 1,
        }
        Some(ch)
    }

    fn eat_whitespace_and_comments(&mut self) -> Result<(), CompileError> {
        loop {
            match self.peek() {
                Some(ch) if ch.is_whitespace() => {
                    self.bump();
                }
                Some('/') => {
                    let start = self.pos();
                    self.bump();
                    match self.peek() {
                        Some('/') => {
                            self.bump();
                            while let Some(ch) = self.peek() {
                                if ch == '\n' {
                                    break;
                                }
                                self.bump();
                            }
                        }
                        Some('*') => {
                            self.bump();
                            loop {
                                match self.bump() {
                                    Some('*') if self.peek() == Some('/') => {
                                        self.bump();
                                        break;
                                    }
                                    Some(_) => continue,
                                    None => {
                                        return Err(CompileError::new(
                                            ErrorKind::UnterminatedComment,
                                            start,
                                        ))
                                    }
                                }
                            }
                        }
                        _ => return Ok(()),
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    pub fn next_token(&mut self) -> Result<Token, CompileError> {
        self.eat_whitespace_and_comments()?;

        let start = self.pos();

        let Some(ch) = self.peek() else {
            return Ok(Token::new(TokenKind::Eof, start, start));
        };

        let kind = match ch {
            '0'..='9' => self.lex_number()?,
            c if c.is_ascii_alphabetic() => self.lex_identifier(),
            '\'' => self.lex_char_literal(start)?,
            '"' => self.lex_string_literal(start)?,
            _ => self.lex_operator(start)?,
        };

        let end = self.pos();
        Ok(Token::new(kind, start, end))
    }

    fn lex_number(&mut self) -> Result<TokenKind, CompileError> {
        let start = self.pos();
        let first = self.bump().unwrap();

        if first == '0' {
            if matches!(self.peek(), Some('x') | Some('X')) {
                self.bump();
                let mut digits = String::new();
                while let Some(ch) = self.peek() {
                    if ch.is_ascii_hexdigit() {
                        digits.push(ch);
                        self.bump();
                    } else {
                        break;
                    }
                }
                if digits.is_empty() {
                    return Err(CompileError::new(ErrorKind::InvalidInteger, start));
                }
                if let Some(ch) = self.peek() {
                    if ch.is_ascii_alphabetic() {
                        return Err(CompileError::new(ErrorKind::InvalidIdentifier, start));
                    }
                }
                let value = i64::from_str_radix(&digits, 16)
                    .map_err(|_| CompileError::new(ErrorKind::InvalidHexInteger, start))?;
                let value = i32::try_from(value)
                    .map_err(|_| CompileError::new(ErrorKind::IntegerOverflow, start))?;
                return Ok(TokenKind::IntLiteral(value));
            }

            if self.peek().map(|c| c.is_ascii_digit()).unwrap_or(false) {
                return Err(CompileError::new(ErrorKind::InvalidInteger, start));
            }
            if self.peek().map(|c| c.is_ascii_alphabetic()).unwrap_or(false) {
                return Err(CompileError::new(ErrorKind::InvalidIdentifier, start));
            }
            return Ok(TokenKind::IntLiteral(0));
        }

        let mut digits = String::new();
        digits.push(first);
        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                digits.push(ch);
                self.bump();
            } else {
                break;
            }
        }
        if self.peek().map(|c| c.is_ascii_alphabetic()).unwrap_or(false) {
            return Err(CompileError::new(ErrorKind::InvalidIdentifier, start));
        }
        let value = digits
            .parse::<i32>()
            .map_err(|_| CompileError::new(ErrorKind::IntegerOverflow, start))?;
        Ok(TokenKind::IntLiteral(value))
    }

    fn lex_identifier(&mut self) -> TokenKind {
        let mut text = String::new();
        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() {
                text.push(ch);
                self.bump();
            } else {
                break;
            }
        }
        KEYWORDS
            .get(text.as_str())
            .cloned()
            .unwrap_or(TokenKind::Identifier(text))
    }

    /// Decode a single escape sequence (the cursor is positioned right after
    /// the backslash). Yields a raw byte, not a `char`: `\xHH` names a byte
    /// value directly, and casting it through `char` would UTF-8-re-encode
    /// any value above `0x7f` into two bytes instead of leaving it as one.
    fn read_escape(&mut self, start: Position, err: ErrorKind) -> Result<u8, CompileError> {
        let Some(ch) = self.bump() else {
            return Err(CompileError::new(err, start));
        };
        Ok(match ch {
            '\\' => b'\\',
            '\'' => b'\'',
            '"' => b'"',
            'n' => b'\n',
            'r' => b'\r',
            't' => b'\t',
            'x' => {
                let mut hex = String::new();
                for _ in 0..2 {
                    match self.bump() {
                        Some(h) if h.is_ascii_hexdigit() => hex.push(h),
                        _ => return Err(CompileError::new(err, start)),
                    }
                }
                u8::from_str_radix(&hex, 16).unwrap()
            }
            _ => return Err(CompileError::new(err, start)),
        })
    }

    fn lex_char_literal(&mut self, start: Position) -> Result<TokenKind, CompileError> {
        self.bump(); // opening '
        let value = match self.peek() {
            Some('\\') => {
                self.bump();
                self.read_escape(start, ErrorKind::InvalidChar)?
            }
            Some(ch) if is_literal_char(ch, '\'') => {
                self.bump();
                ch as u8
            }
            _ => return Err(CompileError::new(ErrorKind::InvalidChar, start)),
        };
        if self.bump() != Some('\'') {
            return Err(CompileError::new(ErrorKind::InvalidChar, start));
        }
        Ok(TokenKind::CharLiteral(value))
    }

    fn lex_string_literal(&mut self, start: Position) -> Result<TokenKind, CompileError> {
        self.bump(); // opening "
        let mut bytes = Vec::new();
        loop {
            match self.peek() {
                Some('"') => {
                    self.bump();
                    break;
                }
                Some('\\') => {
                    self.bump();
                    bytes.push(self.read_escape(start, ErrorKind::InvalidString)?);
                }
                Some(ch) if is_literal_char(ch, '"') => {
                    self.bump();
                    bytes.push(ch as u8);
                }
                _ => return Err(CompileError::new(ErrorKind::InvalidString, start)),
            }
        }
        Ok(TokenKind::StringLiteral(bytes))
    }

    fn lex_operator(&mut self, start: Position) -> Result<TokenKind, CompileError> {
        let ch = self.bump().unwrap();
        use TokenKind::*;
        let kind = match ch {
            '+' => Plus,
            '-' => Minus,
            '*' => Star,
            '(' => LParen,
            ')' => RParen,
            '{' => LBrace,
            '}' => RBrace,
            ',' => Comma,
            ';' => Semicolon,
            '=' => {
                if self.peek() == Some('=') {
                    self.bump();
                    Eq
                } else {
                    Assign
                }
            }
            '!' => {
                if self.peek() == Some('=') {
                    self.bump();
                    Neq
                } else {
                    return Err(CompileError::new(ErrorKind::InvalidInput(ch), start));
                }
            }
            '<' => {
                if self.peek() == Some('=') {
                    self.bump();
                    Le
                } else {
                    Lt
                }
            }
            '>' => {
                if self.peek() == Some('=') {
                    self.bump();
                    Ge
                } else {
                    Gt
                }
            }
            _ => return Err(CompileError::new(ErrorKind::InvalidInput(ch), start)),
        };
        Ok(kind)
    }
}

/// Lex the full token stream, stopping at (and including) `Eof`.
pub fn tokenize(source: &str) -> Result<Vec<Token>, CompileError> {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token()?;
        let is_eof = matches!(token.kind, TokenKind::Eof);
        tokens.push(token);
        if is_eof {
            return Ok(tokens);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        tokenize(src)
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn lexes_keywords_and_identifiers() {
        assert_eq!(
            kinds("int main"),
            vec![TokenKind::Int, TokenKind::Identifier("main".into()), TokenKind::Eof]
        );
    }

    #[test]
    fn lexes_decimal_and_hex_integers() {
        assert_eq!(
            kinds("0 42 0x2A"),
            vec![
                TokenKind::IntLiteral(0),
                TokenKind::IntLiteral(42),
                TokenKind::IntLiteral(42),
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn rejects_leading_zero_decimal() {
        let err = tokenize("07").unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidInteger);
    }

    #[test]
    fn rejects_identifier_starting_with_digit() {
        let err = tokenize("1abc").unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidIdentifier);
    }

    #[test]
    fn rejects_underscore_in_identifiers() {
        assert!(tokenize("int _foo").is_err());
        assert!(tokenize("int foo_bar").is_err());
    }

    #[test]
    fn literal_tab_is_allowed_inside_char_and_string_literals() {
        assert_eq!(kinds("'\t'"), vec![TokenKind::CharLiteral(b'\t'), TokenKind::Eof]);
        assert_eq!(
            kinds("\"a\tb\""),
            vec![TokenKind::StringLiteral(b"a\tb".to_vec()), TokenKind::Eof]
        );
    }

    #[test]
    fn lexes_char_and_string_escapes() {
        assert_eq!(
            kinds(r#"'\n' "a\tb""#),
            vec![
                TokenKind::CharLiteral(b'\n'),
                TokenKind::StringLiteral(b"a\tb".to_vec()),
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn high_byte_hex_escape_in_a_string_stays_a_single_raw_byte() {
        assert_eq!(
            kinds(r"'\xff'"),
            vec![TokenKind::CharLiteral(0xff), TokenKind::Eof]
        );
        assert_eq!(
            kinds(r#""\xff""#),
            vec![TokenKind::StringLiteral(vec![0xff]), TokenKind::Eof]
        );
    }

    #[test]
    fn lexes_hex_escape() {
        assert_eq!(kinds(r"'\x41'"), vec![TokenKind::CharLiteral(b'A'), TokenKind::Eof]);
    }

    #[test]
    fn discards_comments() {
        assert_eq!(
            kinds("// comment\nint /* block \n comment */ x"),
            vec![TokenKind::Int, TokenKind::Identifier("x".into()), TokenKind::Eof]
        );
    }

    #[test]
    fn tracks_line_and_column_across_newlines() {
        let tokens = tokenize("int\nx").unwrap();
        assert_eq!(tokens[0].start.line, 1);
        assert_eq!(tokens[1].start.line, 2);
        assert_eq!(tokens[1].start.column, 1);
    }
}
