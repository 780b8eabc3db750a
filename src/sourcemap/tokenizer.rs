//! Minimal JavaScript tokenizer for identity source maps
//!
//! Only token boundaries and positions matter here, not a full grammar.
//! Comments and whitespace are skipped. A template literal, including its
//! `${...}` substitutions, is a single token. Whether `/` starts a regular
//! expression is decided from the previous significant token.

/// Kinds of tokens the tokenizer distinguishes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Identifier,
    Keyword,
    Punctuator,
    Numeric,
    String,
    Template,
    RegularExpression,
}

/// A token with its 1-based line and 0-based UTF-16 column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    pub line: u32,
    pub column: u32,
}

impl Token<'_> {
    /// Symbol name recorded in a source map, for identifiers only
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        (self.kind == TokenKind::Identifier).then_some(self.text)
    }
}

const KEYWORDS: [&str; 42] = [
    "await", "break", "case", "catch", "class", "const", "continue", "debugger", "default",
    "delete", "do", "else", "enum", "export", "extends", "false", "finally", "for", "function",
    "if", "import", "in", "instanceof", "let", "new", "null", "return", "static", "super",
    "switch", "this", "throw", "true", "try", "typeof", "var", "void", "while", "with", "yield",
    "of", "async",
];

/// Keywords after which a `/` begins a regular expression
const REGEX_PRECEDING_KEYWORDS: [&str; 14] = [
    "return", "typeof", "instanceof", "in", "of", "new", "delete", "void", "throw", "case", "do",
    "else", "yield", "await",
];

/// Multi-character punctuators, longest first
const PUNCTUATORS: [&str; 37] = [
    ">>>=", "...", "===", "!==", "**=", "<<=", ">>=", ">>>", "&&=", "||=", "??=", "=>", "==", "!=",
    "<=", ">=", "&&", "||", "??", "?.", "++", "--", "+=", "-=", "*=", "/=", "%=", "&=", "|=", "^=",
    "<<", ">>", "**", "{", "}", "(", ")",
];

fn is_line_terminator(c: char) -> bool {
    matches!(c, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

fn is_identifier_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$' || c == '\\'
}

fn is_identifier_part(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$' || c == '\\' || c == '\u{200c}' || c == '\u{200d}'
}

struct Lexer<'a> {
    src: &'a str,
    pos: usize,
    line: u32,
    column: u32,
}

impl<'a> Lexer<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            pos: 0,
            line: 1,
            column: 0,
        }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        self.rest().chars().nth(1)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        match c {
            // `\r\n` ends one line, counted at the `\n`.
            '\r' if self.peek() == Some('\n') => {}
            c if is_line_terminator(c) => {
                self.line += 1;
                self.column = 0;
            }
            c => self.column += c.len_utf16() as u32,
        }
        Some(c)
    }

    fn bump_while(&mut self, predicate: impl Fn(char) -> bool) {
        while self.peek().is_some_and(&predicate) {
            self.bump();
        }
    }

    fn skip_trivia(&mut self) {
        loop {
            let rest = self.rest();
            if rest.starts_with("//") || rest.starts_with("<!--") {
                self.bump_while(|c| !is_line_terminator(c));
            } else if rest.starts_with("/*") {
                match rest[2..].find("*/") {
                    Some(end) => {
                        let target = self.pos + 2 + end + 2;
                        while self.pos < target {
                            self.bump();
                        }
                    }
                    None => while self.bump().is_some() {},
                }
            } else if self
                .peek()
                .is_some_and(|c| c.is_whitespace() || c == '\u{feff}')
            {
                self.bump();
            } else {
                return;
            }
        }
    }

    fn next_token(&mut self, previous: Option<&Token<'a>>) -> Option<Token<'a>> {
        self.skip_trivia();
        let c = self.peek()?;
        let (start, line, column) = (self.pos, self.line, self.column);

        let kind = if is_identifier_start(c) {
            self.bump_while(is_identifier_part);
            if KEYWORDS.contains(&&self.src[start..self.pos]) {
                TokenKind::Keyword
            } else {
                TokenKind::Identifier
            }
        } else if c.is_ascii_digit() || (c == '.' && self.peek_second().is_some_and(|d| d.is_ascii_digit())) {
            self.numeric();
            TokenKind::Numeric
        } else if c == '"' || c == '\'' {
            self.string(c);
            TokenKind::String
        } else if c == '`' {
            self.template();
            TokenKind::Template
        } else if c == '/' && regex_allowed(previous) {
            self.regex();
            TokenKind::RegularExpression
        } else {
            self.punctuator();
            TokenKind::Punctuator
        };

        Some(Token {
            kind,
            text: &self.src[start..self.pos],
            line,
            column,
        })
    }

    fn numeric(&mut self) {
        let start = self.pos;
        let mut previous = '\0';
        while let Some(c) = self.peek() {
            let is_hex = self.src[start..self.pos].starts_with("0x")
                || self.src[start..self.pos].starts_with("0X");
            let exponent_sign = (c == '+' || c == '-') && matches!(previous, 'e' | 'E') && !is_hex;
            if c.is_ascii_alphanumeric() || c == '.' || c == '_' || exponent_sign {
                previous = c;
                self.bump();
            } else {
                break;
            }
        }
    }

    fn string(&mut self, quote: char) {
        self.bump();
        while let Some(c) = self.peek() {
            if c == quote {
                self.bump();
                return;
            }
            if c == '\\' {
                self.bump();
                self.bump();
                continue;
            }
            // Unterminated string ends at the line break.
            if c == '\n' || c == '\r' {
                return;
            }
            self.bump();
        }
    }

    fn template(&mut self) {
        self.bump();
        while let Some(c) = self.peek() {
            match c {
                '`' => {
                    self.bump();
                    return;
                }
                '\\' => {
                    self.bump();
                    self.bump();
                }
                '$' if self.peek_second() == Some('{') => {
                    self.bump();
                    self.bump();
                    self.substitution();
                }
                _ => {
                    self.bump();
                }
            }
        }
    }

    /// Skip the tokens of a `${...}` substitution up to its closing brace
    fn substitution(&mut self) {
        let mut depth = 0usize;
        let mut previous: Option<Token<'a>> = None;
        while let Some(token) = self.next_token(previous.as_ref()) {
            if token.kind == TokenKind::Punctuator {
                match token.text {
                    "{" => depth += 1,
                    "}" if depth == 0 => return,
                    "}" => depth -= 1,
                    _ => {}
                }
            }
            previous = Some(token);
        }
    }

    fn regex(&mut self) {
        self.bump();
        let mut in_class = false;
        while let Some(c) = self.peek() {
            if is_line_terminator(c) {
                return;
            }
            self.bump();
            match c {
                '\\' => {
                    self.bump();
                }
                '[' => in_class = true,
                ']' => in_class = false,
                '/' if !in_class => break,
                _ => {}
            }
        }
        self.bump_while(is_identifier_part);
    }

    fn punctuator(&mut self) {
        let rest = self.rest();
        let len = PUNCTUATORS
            .iter()
            .find(|p| rest.starts_with(**p))
            // `a?.5:b` is a conditional, not optional chaining.
            .filter(|p| !(**p == "?." && rest[2..].starts_with(|c: char| c.is_ascii_digit())))
            .map(|p| p.chars().count())
            .unwrap_or(1);
        for _ in 0..len {
            self.bump();
        }
    }
}

fn regex_allowed(previous: Option<&Token<'_>>) -> bool {
    match previous {
        None => true,
        Some(token) => match token.kind {
            TokenKind::Punctuator => !matches!(token.text, ")" | "]" | "}"),
            TokenKind::Keyword => REGEX_PRECEDING_KEYWORDS.contains(&token.text),
            _ => false,
        },
    }
}

/// Split JavaScript source into tokens
#[must_use]
pub fn tokenize(source: &str) -> Vec<Token<'_>> {
    let mut lexer = Lexer::new(source);
    let mut tokens: Vec<Token<'_>> = Vec::new();
    while let Some(token) = lexer.next_token(tokens.last()) {
        tokens.push(token);
    }
    tokens
}
