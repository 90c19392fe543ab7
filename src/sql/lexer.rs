//! Tokenizer for SQL schema dumps.

use std::iter::Peekable;
use std::str::Chars;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Keywords
    Create,
    Alter,
    Add,
    Table,
    Index,
    Only,
    Primary,
    Key,
    Foreign,
    References,
    Constraint,
    Not,
    Null,
    Unique,
    Default,
    Check,
    Collate,
    On,
    Delete,
    Update,
    Cascade,
    Restrict,
    If,
    Exists,

    Ident(String),
    Str(String),
    Num(String),

    LParen,
    RParen,
    Comma,
    Semicolon,
    Dot,

    Eof,
}

impl Token {
    fn keyword(word: &str) -> Option<Self> {
        let token = match word.to_ascii_uppercase().as_str() {
            "CREATE" => Self::Create,
            "ALTER" => Self::Alter,
            "ADD" => Self::Add,
            "TABLE" => Self::Table,
            "INDEX" => Self::Index,
            "ONLY" => Self::Only,
            "PRIMARY" => Self::Primary,
            "KEY" => Self::Key,
            "FOREIGN" => Self::Foreign,
            "REFERENCES" => Self::References,
            "CONSTRAINT" => Self::Constraint,
            "NOT" => Self::Not,
            "NULL" => Self::Null,
            "UNIQUE" => Self::Unique,
            "DEFAULT" => Self::Default,
            "CHECK" => Self::Check,
            "COLLATE" => Self::Collate,
            "ON" => Self::On,
            "DELETE" => Self::Delete,
            "UPDATE" => Self::Update,
            "CASCADE" => Self::Cascade,
            "RESTRICT" => Self::Restrict,
            "IF" => Self::If,
            "EXISTS" => Self::Exists,
            _ => return None,
        };
        Some(token)
    }

    /// Whether this is the bare word `word`, compared case-insensitively.
    pub fn is_word(&self, word: &str) -> bool {
        matches!(self, Self::Ident(s) if s.eq_ignore_ascii_case(word))
    }
}

pub struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
        }
    }

    pub fn tokenize(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let done = token == Token::Eof;
            tokens.push(token);
            if done {
                return tokens;
            }
        }
    }

    fn next_token(&mut self) -> Token {
        loop {
            let Some(c) = self.chars.next() else {
                return Token::Eof;
            };

            match c {
                c if c.is_whitespace() => {}
                '-' if self.chars.peek() == Some(&'-') => self.skip_line(),
                '-' if self.chars.peek().is_some_and(char::is_ascii_digit) => {
                    return Token::Num(self.read_number('-'));
                }
                '#' => self.skip_line(),
                '/' if self.chars.peek() == Some(&'*') => {
                    self.chars.next();
                    self.skip_block_comment();
                }
                '(' => return Token::LParen,
                ')' => return Token::RParen,
                ',' => return Token::Comma,
                ';' => return Token::Semicolon,
                '.' => return Token::Dot,
                '"' | '`' => return Token::Ident(self.read_quoted(c)),
                '[' => return Token::Ident(self.read_until(']')),
                '\'' => return Token::Str(self.read_string()),
                c if c.is_ascii_digit() => return Token::Num(self.read_number(c)),
                c if c.is_alphabetic() || c == '_' => {
                    let word = self.read_word(c);
                    return Token::keyword(&word).unwrap_or(Token::Ident(word));
                }
                // Casts, operators and the like carry nothing for the schema.
                _ => {}
            }
        }
    }

    fn skip_line(&mut self) {
        for c in self.chars.by_ref() {
            if c == '\n' {
                break;
            }
        }
    }

    fn skip_block_comment(&mut self) {
        while let Some(c) = self.chars.next() {
            if c == '*' && self.chars.peek() == Some(&'/') {
                self.chars.next();
                break;
            }
        }
    }

    fn read_word(&mut self, first: char) -> String {
        let mut word = String::from(first);
        while let Some(&c) = self.chars.peek() {
            if c.is_alphanumeric() || c == '_' || c == '$' {
                word.push(c);
                self.chars.next();
            } else {
                break;
            }
        }
        word
    }

    fn read_number(&mut self, first: char) -> String {
        let mut num = String::from(first);
        while let Some(&c) = self.chars.peek() {
            if c.is_ascii_digit() || (c == '.' && !num.contains('.')) {
                num.push(c);
                self.chars.next();
            } else {
                break;
            }
        }
        num
    }

    // Doubled quote characters stand for the quote itself.
    fn read_quoted(&mut self, quote: char) -> String {
        let mut text = String::new();
        while let Some(c) = self.chars.next() {
            if c == quote {
                if self.chars.peek() == Some(&quote) {
                    self.chars.next();
                    text.push(quote);
                } else {
                    break;
                }
            } else {
                text.push(c);
            }
        }
        text
    }

    fn read_string(&mut self) -> String {
        let mut text = String::new();
        while let Some(c) = self.chars.next() {
            match c {
                '\'' if self.chars.peek() == Some(&'\'') => {
                    self.chars.next();
                    text.push('\'');
                }
                '\'' => break,
                '\\' => match self.chars.next() {
                    Some('n') => text.push('\n'),
                    Some('t') => text.push('\t'),
                    Some('r') => text.push('\r'),
                    Some(other) => text.push(other),
                    None => break,
                },
                c => text.push(c),
            }
        }
        text
    }

    fn read_until(&mut self, end: char) -> String {
        let mut text = String::new();
        for c in self.chars.by_ref() {
            if c == end {
                break;
            }
            text.push(c);
        }
        text
    }
}
