// all roads lead to lib.rs: the shared leaf types live here, the passes in
// their own modules. The pipeline is strictly text -> tokens -> instructions
// -> renamed block, and build_block runs the front half of it.

#[macro_use]
extern crate log;

mod ir;
mod lexer;
mod parser;
mod renamer;

pub use crate::ir::Instruction;
pub use crate::lexer::lex;
pub use crate::parser::parse;
pub use crate::renamer::{max_source_register, rename, Rename, RenamedBlock};

use std::fmt;

/// The kind of word a token is. Every opcode gets its own category so the
/// parser can dispatch on the leading token directly; Error only ever
/// appears on placeholder tokens the parser makes for itself.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum Category {
    Comma,
    Arrow,
    Register,
    Number,
    Load,
    LoadI,
    Store,
    Add,
    Sub,
    Mult,
    Lshift,
    Rshift,
    Output,
    Nop,
    Error,
    Eof,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use Category::*;
        let s = match self {
            Comma => ",",
            Arrow => "=>",
            Register => "register",
            Number => "number",
            Load => "load",
            LoadI => "loadI",
            Store => "store",
            Add => "add",
            Sub => "sub",
            Mult => "mult",
            Lshift => "lshift",
            Rshift => "rshift",
            Output => "output",
            Nop => "nop",
            Error => "error",
            Eof => "end of file",
        };
        write!(f, "{}", s)
    }
}

/// A category and lexeme pairing, with the line it was found on
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct Token {
    pub category: Category,
    pub lexeme: String,
    pub line: usize,
}

impl Token {
    /// The numeric part of a register lexeme (`r12` -> 12). None when the
    /// token isn't a register, or when its name has no number (`rx` is a
    /// legal register lexeme but nothing the renamer can work with)
    pub fn register_number(&self) -> Option<usize> {
        if self.category != Category::Register || !self.lexeme.starts_with('r') {
            return None;
        }
        self.lexeme[1..].parse().ok()
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} '{}' at line {}", self.category, self.lexeme, self.line)
    }
}

/// What a diagnostic points at, beyond its line number
#[derive(PartialEq, Eq, Clone, Debug)]
pub enum Context {
    Bare,
    AtEnd,
    At(String),
}

/// One reported problem. Diagnostics are accumulated, never thrown: a bad
/// line or statement costs exactly one of these and the pass moves on.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct Diagnostic {
    pub line: usize,
    pub message: String,
    pub context: Context,
}

impl Diagnostic {
    /// A problem with no particular token to point at
    pub fn on_line(line: usize, message: String) -> Diagnostic {
        Diagnostic { line, message, context: Context::Bare }
    }

    /// A problem anchored to a token; end-of-input gets its own wording
    pub fn at_token(token: &Token, message: String) -> Diagnostic {
        let context = if token.category == Category::Eof {
            Context::AtEnd
        } else {
            Context::At(token.lexeme.clone())
        };
        Diagnostic { line: token.line, message, context }
    }
}

impl fmt::Display for Diagnostic {
    // Driver format: `ERROR <line>: <message> <context>`, continuation
    // lines of a multi-line message unprefixed
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut lines = self.message.lines();
        write!(f, "ERROR {}: {}", self.line, lines.next().unwrap_or(""))?;
        match &self.context {
            Context::Bare => (),
            Context::AtEnd => write!(f, " at end")?,
            Context::At(lexeme) => write!(f, " at '{}'", lexeme)?,
        }
        for continuation in lines {
            write!(f, "\n{}", continuation)?;
        }
        Ok(())
    }
}

/// Run the front end over one basic block of source text. Ok is the parsed
/// instruction sequence; Err is every lexical and syntactic diagnostic found
/// in one run. A caller must not rename an Err'd block.
pub fn build_block(text: &str) -> Result<Vec<Instruction>, Vec<Diagnostic>> {
    let (tokens, mut diagnostics) = lexer::lex(text);
    let (block, parse_diagnostics) = parser::parse(&tokens);
    diagnostics.extend(parse_diagnostics);
    if diagnostics.is_empty() {
        Ok(block)
    } else {
        Err(diagnostics)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn diagnostics_follow_the_driver_format() {
        let plain = Diagnostic::on_line(3, "Unexpected character".to_string());
        assert_eq!(plain.to_string(), "ERROR 3: Unexpected character");

        let register = Token {
            category: Category::Register,
            lexeme: "r9".to_string(),
            line: 7,
        };
        let at = Diagnostic::at_token(&register, "Unexpected token".to_string());
        assert_eq!(at.to_string(), "ERROR 7: Unexpected token at 'r9'");

        let eof = Token { category: Category::Eof, lexeme: String::new(), line: 9 };
        let at_end = Diagnostic::at_token(&eof, "Expected => after register name".to_string());
        assert_eq!(at_end.to_string(), "ERROR 9: Expected => after register name at end");
    }

    #[test]
    fn continuation_lines_print_unprefixed() {
        let d = Diagnostic::on_line(1, "first line\nsecond line".to_string());
        assert_eq!(d.to_string(), "ERROR 1: first line\nsecond line");
    }

    #[test]
    fn register_numbers_come_off_the_lexeme() {
        let r12 = Token { category: Category::Register, lexeme: "r12".to_string(), line: 1 };
        assert_eq!(r12.register_number(), Some(12));
        let named = Token { category: Category::Register, lexeme: "rx".to_string(), line: 1 };
        assert_eq!(named.register_number(), None);
        let number = Token { category: Category::Number, lexeme: "12".to_string(), line: 1 };
        assert_eq!(number.register_number(), None);
    }

    #[test]
    fn build_block_gates_on_any_diagnostic() {
        assert!(build_block("@\nnop\n").is_err());
        assert!(build_block("add r1 r2 => r3\n").is_err());
        let block = build_block("nop\n").expect("clean source should build");
        assert_eq!(block.len(), 1);
    }
}
