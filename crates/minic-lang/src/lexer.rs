//! # MiniC Lexer
//!
//! Turns source text into a flat token stream. Scanning does not stop at
//! the first problem: every lexical error is collected with its line and
//! column so a single run reports all of them.

use std::fmt;
use std::iter::Peekable;
use std::str::CharIndices;
use thiserror::Error;

/// A single lexical token and where it starts.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub line: usize,
    pub col: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // --- Literals ---
    Identifier(String),
    Int(i64),
    Float(f64),
    Str(String),

    // --- Keywords ---
    Let,
    Print,
    If,
    Else,
    While,
    True,
    False,

    // --- Operators ---
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Assign,
    EqEq,
    NotEq,
    Less,
    LessEq,
    Greater,
    GreaterEq,
    AndAnd,
    OrOr,
    Bang,

    // --- Delimiters ---
    LParen,
    RParen,
    LBrace,
    RBrace,
    Semicolon,

    EndOfFile,
}

impl TokenKind {
    /// Coarse category shown in the token table.
    pub fn category(&self) -> &'static str {
        match self {
            TokenKind::Identifier(_) => "identifier",
            TokenKind::Int(_) => "integer",
            TokenKind::Float(_) => "float",
            TokenKind::Str(_) => "string",
            TokenKind::Let
            | TokenKind::Print
            | TokenKind::If
            | TokenKind::Else
            | TokenKind::While
            | TokenKind::True
            | TokenKind::False => "keyword",
            TokenKind::LParen
            | TokenKind::RParen
            | TokenKind::LBrace
            | TokenKind::RBrace
            | TokenKind::Semicolon => "delimiter",
            TokenKind::EndOfFile => "eof",
            _ => "operator",
        }
    }
}

fn keyword(text: &str) -> Option<TokenKind> {
    match text {
        "let" => Some(TokenKind::Let),
        "print" => Some(TokenKind::Print),
        "if" => Some(TokenKind::If),
        "else" => Some(TokenKind::Else),
        "while" => Some(TokenKind::While),
        "true" => Some(TokenKind::True),
        "false" => Some(TokenKind::False),
        _ => None,
    }
}

/// An error encountered during lexical analysis.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{line}:{col}: {message}")]
pub struct LexError {
    pub message: String,
    pub line: usize,
    pub col: usize,
}

/// Scans `source` into tokens, ending with [`TokenKind::EndOfFile`].
pub fn scan(source: &str) -> Result<Vec<Token>, Vec<LexError>> {
    let mut lexer = Lexer::new(source);
    lexer.scan_tokens();
    if lexer.errors.is_empty() {
        Ok(lexer.tokens)
    } else {
        Err(lexer.errors)
    }
}

/// Token table used as the lexical phase report.
pub struct TokenTable<'a>(pub &'a [Token]);

impl fmt::Display for TokenTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:<10} {:<12} {}", "LINE:COL", "KIND", "LEXEME")?;
        let mut count = 0;
        for token in self.0.iter().filter(|t| t.kind != TokenKind::EndOfFile) {
            count += 1;
            writeln!(
                f,
                "{:<10} {:<12} {}",
                format!("{}:{}", token.line, token.col),
                token.kind.category(),
                token.lexeme.replace('\n', "\\n")
            )?;
        }
        write!(f, "{} token{}", count, if count == 1 { "" } else { "s" })
    }
}

// --- Internal Lexer Implementation ---

struct Lexer<'a> {
    source: &'a str,
    chars: Peekable<CharIndices<'a>>,
    tokens: Vec<Token>,
    errors: Vec<LexError>,

    start_pos: usize,
    line: usize,
    col: usize,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str) -> Self {
        Lexer {
            source,
            chars: source.char_indices().peekable(),
            tokens: Vec::new(),
            errors: Vec::new(),
            start_pos: 0,
            line: 1,
            col: 1,
        }
    }

    fn scan_tokens(&mut self) {
        loop {
            self.skip_trivia();
            self.start_pos = self.current_pos();
            let (line, col) = (self.line, self.col);

            let Some(c) = self.advance() else {
                self.tokens.push(Token {
                    kind: TokenKind::EndOfFile,
                    lexeme: String::new(),
                    line,
                    col,
                });
                break;
            };

            if let Some(kind) = self.scan_token(c, line, col) {
                let lexeme = self.slice().to_string();
                self.tokens.push(Token { kind, lexeme, line, col });
            }
        }
    }

    fn scan_token(&mut self, c: char, line: usize, col: usize) -> Option<TokenKind> {
        let kind = match c {
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            ';' => TokenKind::Semicolon,
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '%' => TokenKind::Percent,
            '=' => if self.match_char('=') { TokenKind::EqEq } else { TokenKind::Assign },
            '!' => if self.match_char('=') { TokenKind::NotEq } else { TokenKind::Bang },
            '<' => if self.match_char('=') { TokenKind::LessEq } else { TokenKind::Less },
            '>' => if self.match_char('=') { TokenKind::GreaterEq } else { TokenKind::Greater },
            '&' if self.match_char('&') => TokenKind::AndAnd,
            '|' if self.match_char('|') => TokenKind::OrOr,
            '&' | '|' => {
                self.error_at(line, col, format!("unexpected character '{c}' (did you mean '{c}{c}'?)"));
                return None;
            }
            '"' => return self.string(line, col),
            c if c.is_ascii_digit() => return self.number(line, col),
            c if c.is_alphabetic() || c == '_' => self.identifier(),
            other => {
                self.error_at(line, col, format!("unexpected character '{}'", other.escape_default()));
                return None;
            }
        };
        Some(kind)
    }

    /// Whitespace, `// line` and `/* block */` comments.
    fn skip_trivia(&mut self) {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.advance();
                }
                Some('/') if self.peek_next() == Some('/') => {
                    while !matches!(self.peek(), None | Some('\n')) {
                        self.advance();
                    }
                }
                Some('/') if self.peek_next() == Some('*') => {
                    let (line, col) = (self.line, self.col);
                    self.advance();
                    self.advance();
                    loop {
                        match self.advance() {
                            Some('*') if self.peek() == Some('/') => {
                                self.advance();
                                break;
                            }
                            Some(_) => {}
                            None => {
                                self.error_at(line, col, "unterminated block comment".to_string());
                                return;
                            }
                        }
                    }
                }
                _ => return,
            }
        }
    }

    fn identifier(&mut self) -> TokenKind {
        while matches!(self.peek(), Some(c) if c.is_alphanumeric() || c == '_') {
            self.advance();
        }
        let text = self.slice();
        keyword(text).unwrap_or_else(|| TokenKind::Identifier(text.to_string()))
    }

    fn number(&mut self, line: usize, col: usize) -> Option<TokenKind> {
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.advance();
        }

        let mut is_float = false;
        if self.peek() == Some('.') && matches!(self.peek_next(), Some(c) if c.is_ascii_digit()) {
            is_float = true;
            self.advance();
            while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                self.advance();
            }
        }

        // `12abc` or `1.5.2` is one malformed literal, not several tokens.
        if matches!(self.peek(), Some(c) if c.is_alphanumeric() || c == '_' || c == '.') {
            while matches!(self.peek(), Some(c) if c.is_alphanumeric() || c == '_' || c == '.') {
                self.advance();
            }
            let message = format!("malformed number '{}'", self.slice());
            self.error_at(line, col, message);
            return None;
        }

        let text = self.slice();
        if is_float {
            match text.parse::<f64>() {
                Ok(v) => Some(TokenKind::Float(v)),
                Err(_) => {
                    self.error_at(line, col, format!("malformed number '{}'", text));
                    None
                }
            }
        } else {
            match text.parse::<i64>() {
                Ok(v) => Some(TokenKind::Int(v)),
                Err(_) => {
                    self.error_at(line, col, format!("integer literal '{}' out of range", text));
                    None
                }
            }
        }
    }

    /// String literals may not span lines.
    fn string(&mut self, line: usize, col: usize) -> Option<TokenKind> {
        let mut value = String::new();
        let mut valid = true;
        loop {
            match self.peek() {
                None | Some('\n') => {
                    self.error_at(line, col, "unterminated string literal".to_string());
                    return None;
                }
                Some('"') => {
                    self.advance();
                    break;
                }
                Some('\\') => {
                    let (esc_line, esc_col) = (self.line, self.col);
                    self.advance();
                    match self.advance() {
                        Some('n') => value.push('\n'),
                        Some('t') => value.push('\t'),
                        Some('"') => value.push('"'),
                        Some('\\') => value.push('\\'),
                        Some(other) => {
                            valid = false;
                            self.error_at(
                                esc_line,
                                esc_col,
                                format!("unknown escape sequence '\\{}'", other.escape_default()),
                            );
                        }
                        None => {
                            self.error_at(line, col, "unterminated string literal".to_string());
                            return None;
                        }
                    }
                }
                Some(c) => {
                    value.push(c);
                    self.advance();
                }
            }
        }
        valid.then_some(TokenKind::Str(value))
    }

    // --- Character helpers ---

    fn advance(&mut self) -> Option<char> {
        let (_, c) = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(c)
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|&(_, c)| c)
    }

    fn peek_next(&self) -> Option<char> {
        let mut ahead = self.chars.clone();
        ahead.next();
        ahead.next().map(|(_, c)| c)
    }

    fn current_pos(&mut self) -> usize {
        self.chars.peek().map(|&(i, _)| i).unwrap_or(self.source.len())
    }

    /// Text of the token being scanned.
    fn slice(&mut self) -> &'a str {
        let source = self.source;
        let end = self.current_pos();
        &source[self.start_pos..end]
    }

    fn error_at(&mut self, line: usize, col: usize, message: String) {
        self.errors.push(LexError { message, line, col });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        scan(source).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_assignment() {
        assert_eq!(
            kinds("x = 1"),
            vec![
                TokenKind::Identifier("x".into()),
                TokenKind::Assign,
                TokenKind::Int(1),
                TokenKind::EndOfFile,
            ]
        );
    }

    #[test]
    fn test_two_char_operators_and_keywords() {
        assert_eq!(
            kinds("if a <= 2 && !b { print 1.5 }"),
            vec![
                TokenKind::If,
                TokenKind::Identifier("a".into()),
                TokenKind::LessEq,
                TokenKind::Int(2),
                TokenKind::AndAnd,
                TokenKind::Bang,
                TokenKind::Identifier("b".into()),
                TokenKind::LBrace,
                TokenKind::Print,
                TokenKind::Float(1.5),
                TokenKind::RBrace,
                TokenKind::EndOfFile,
            ]
        );
    }

    #[test]
    fn test_positions_and_comments() {
        let tokens = scan("// header\nlet y = /* inline */ 3\n").unwrap();
        assert_eq!((tokens[0].line, tokens[0].col), (2, 1));
        assert_eq!(tokens[3].lexeme, "3");
        assert_eq!((tokens[3].line, tokens[3].col), (2, 22));
    }

    #[test]
    fn test_string_escapes() {
        let tokens = scan(r#"print "a\tb\"c""#).unwrap();
        assert_eq!(tokens[1].kind, TokenKind::Str("a\tb\"c".into()));
        assert_eq!(tokens[1].lexeme, r#""a\tb\"c""#);
    }

    #[test]
    fn test_errors_are_collected() {
        let errors = scan("x = 1 @ 2\ny = \"open\nz = 12ab").unwrap_err();
        let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
        assert_eq!(
            messages,
            vec![
                "1:7: unexpected character '@'",
                "2:5: unterminated string literal",
                "3:5: malformed number '12ab'",
            ]
        );
    }

    #[test]
    fn test_unterminated_comment() {
        let errors = scan("x = 1 /* never closed").unwrap_err();
        assert_eq!(errors[0].message, "unterminated block comment");
        assert_eq!((errors[0].line, errors[0].col), (1, 7));
    }

    #[test]
    fn test_token_table() {
        let tokens = scan("x = 1").unwrap();
        let table = TokenTable(&tokens).to_string();
        assert!(table.starts_with("LINE:COL"));
        assert!(table.contains("1:1        identifier   x"));
        assert!(table.ends_with("3 tokens"));
    }
}
