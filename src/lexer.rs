//! Scanning turns raw source text into a flat list of [Token]s, always
//! capped with exactly one end-of-input token. Bad input never aborts the
//! scan: the rest of the offending line is dropped, one diagnostic is
//! recorded, and scanning picks up on the next line.

use indexmap::IndexMap;

use crate::{Category, Diagnostic, Token};

/// The keyword table. Any other run of letters and digits defaults to a
/// register, which must then start with 'r'. Lookups are case-sensitive, so
/// `loadi` is not a keyword.
fn keywords() -> IndexMap<&'static str, Category> {
    let mut map = IndexMap::new();
    map.insert("load", Category::Load);
    map.insert("loadI", Category::LoadI);
    map.insert("store", Category::Store);
    map.insert("add", Category::Add);
    map.insert("sub", Category::Sub);
    map.insert("mult", Category::Mult);
    map.insert("lshift", Category::Lshift);
    map.insert("rshift", Category::Rshift);
    map.insert("output", Category::Output);
    map.insert("nop", Category::Nop);
    map
}

struct Lexer {
    // source characters, reversed so the next one is a pop away
    rchars: Vec<char>,
    keywords: IndexMap<&'static str, Category>,
    tokens: Vec<Token>,
    diagnostics: Vec<Diagnostic>,
    line: usize,
}

/// Scan one basic block of source. Best effort: every problem costs the
/// rest of its line and one diagnostic, never the rest of the scan.
pub fn lex(text: &str) -> (Vec<Token>, Vec<Diagnostic>) {
    let mut lexer = Lexer {
        rchars: text.chars().rev().collect(),
        keywords: keywords(),
        tokens: Vec::new(),
        diagnostics: Vec::new(),
        line: 1,
    };
    lexer.run();
    debug!(
        "lexed {} tokens with {} problems",
        lexer.tokens.len(),
        lexer.diagnostics.len()
    );
    (lexer.tokens, lexer.diagnostics)
}

impl Lexer {
    fn run(&mut self) {
        while let Some(c) = self.bump() {
            match c {
                ',' => self.push(Category::Comma, ",".to_string()),
                '=' => {
                    if self.eat('>') {
                        self.push(Category::Arrow, "=>".to_string());
                    } else {
                        let message = match self.peek() {
                            Some(next) => format!("Expected > but found {}", next),
                            None => "Expected > but found end of file".to_string(),
                        };
                        self.error(message);
                    }
                }
                '/' => {
                    if self.eat('/') {
                        // comment runs to the end of the line; the newline
                        // itself still gets counted by the main loop
                        while let Some(next) = self.peek() {
                            if next == '\n' {
                                break;
                            }
                            self.bump();
                        }
                    } else {
                        self.error("Unexpected character".to_string());
                    }
                }
                ' ' | '\t' | '\r' => (),
                '\n' => self.line += 1,
                c if c.is_ascii_digit() => self.number(c),
                c if c.is_ascii_alphabetic() => self.word(c),
                _ => self.error("Unexpected character".to_string()),
            }
        }
        let line = self.line;
        self.push_token(Category::Eof, String::new(), line);
    }

    /// A maximal run of digits
    fn number(&mut self, first: char) {
        let mut text = first.to_string();
        while let Some(next) = self.peek() {
            if !next.is_ascii_digit() {
                break;
            }
            text.push(next);
            self.bump();
        }
        self.push(Category::Number, text);
    }

    /// A maximal run of letters and digits: either a keyword or a register
    fn word(&mut self, first: char) {
        let mut text = first.to_string();
        while let Some(next) = self.peek() {
            if !next.is_ascii_alphanumeric() {
                break;
            }
            text.push(next);
            self.bump();
        }
        let category = self
            .keywords
            .get(text.as_str())
            .copied()
            .unwrap_or(Category::Register);
        if category == Category::Register && !text.starts_with('r') {
            self.error("Register expected".to_string());
            return;
        }
        self.push(category, text);
    }

    fn error(&mut self, message: String) {
        let line = self.line;
        self.diagnostics.push(Diagnostic::on_line(line, message));
        self.skip_line();
    }

    /// Line-level recovery: drop everything up to and including the next
    /// newline, so one bad line yields exactly one diagnostic
    fn skip_line(&mut self) {
        while let Some(next) = self.peek() {
            if next == '\n' {
                break;
            }
            self.bump();
        }
        if self.bump().is_some() {
            self.line += 1;
        }
    }

    fn push(&mut self, category: Category, lexeme: String) {
        let line = self.line;
        self.push_token(category, lexeme, line);
    }

    fn push_token(&mut self, category: Category, lexeme: String, line: usize) {
        self.tokens.push(Token { category, lexeme, line });
    }

    fn peek(&self) -> Option<char> {
        self.rchars.last().copied()
    }

    fn bump(&mut self) -> Option<char> {
        self.rchars.pop()
    }

    /// Consume the next character only if it's the wanted one
    fn eat(&mut self, want: char) -> bool {
        if self.peek() == Some(want) {
            self.bump();
            true
        } else {
            false
        }
    }
}
