//! Recursive descent over the token list, one statement shape per opcode.
//! Errors never stop the parse: the first mismatch in a statement is
//! reported once against the statement's opening token, the rest of that
//! source line is discarded, the statement finishes its shape on error
//! placeholders and is dropped, and parsing goes again on the next line.

use crate::ir::Instruction;
use crate::{Category, Diagnostic, Token};

/// Parse a token stream into the longest well-formed instruction sequence
/// it contains. The returned diagnostics double as the aggregate error
/// flag: a caller must not rename the block unless they are empty.
pub fn parse(tokens: &[Token]) -> (Vec<Instruction>, Vec<Diagnostic>) {
    if tokens.is_empty() {
        return (Vec::new(), Vec::new());
    }
    let mut parser = Parser {
        tokens,
        current: 0,
        statement_start: 0,
        statement_errored: false,
        instructions: Vec::new(),
        diagnostics: Vec::new(),
    };
    while !parser.at_end() {
        parser.statement();
    }
    debug!(
        "parsed {} instructions with {} problems",
        parser.instructions.len(),
        parser.diagnostics.len()
    );
    (parser.instructions, parser.diagnostics)
}

struct Parser<'t> {
    tokens: &'t [Token],
    current: usize,
    // first token of the statement being parsed; diagnostics anchor here
    statement_start: usize,
    statement_errored: bool,
    instructions: Vec<Instruction>,
    diagnostics: Vec<Diagnostic>,
}

impl<'t> Parser<'t> {
    fn statement(&mut self) {
        use Category::*;
        self.statement_start = self.current;
        self.statement_errored = false;
        let instruction = match self.peek().category {
            Add | Sub | Mult | Lshift | Rshift => self.arithmetic(),
            Load | Store => self.load_store(),
            LoadI => self.load_immediate(),
            Output => self.output(),
            Nop => Some(Instruction::Zero { opcode: self.advance().clone() }),
            _ => {
                self.report("Unexpected token".to_string());
                None
            }
        };
        if let Some(instruction) = instruction {
            self.instructions.push(instruction);
        }
    }

    /// `op REG, REG => REG`
    fn arithmetic(&mut self) -> Option<Instruction> {
        let opcode = self.advance().clone();
        let first = self.expect(
            Category::Register,
            format!("Expected source register 1 but found {}", self.peek().lexeme),
        );
        self.expect(Category::Comma, "Expected a comma after register name".to_string());
        let second = self.expect(
            Category::Register,
            format!("Expected source register 2 but found {}", self.peek().lexeme),
        );
        self.expect(Category::Arrow, "Expected => after register name".to_string());
        let third = self.expect(
            Category::Register,
            format!("Expected destination register but found {}", self.peek().lexeme),
        );
        if first.category == Category::Error
            || second.category == Category::Error
            || third.category == Category::Error
        {
            return None;
        }
        Some(Instruction::Three { opcode, first, second, third })
    }

    /// `op REG => REG`
    fn load_store(&mut self) -> Option<Instruction> {
        let opcode = self.advance().clone();
        let first = self.expect(
            Category::Register,
            format!("Expected source register but found {}", self.peek().lexeme),
        );
        self.expect(Category::Arrow, "Expected => after register name".to_string());
        let second = self.expect(
            Category::Register,
            format!("Expected destination register but found {}", self.peek().lexeme),
        );
        if first.category == Category::Error || second.category == Category::Error {
            return None;
        }
        Some(Instruction::Two { opcode, first, second })
    }

    /// `loadI NUMBER => REG`
    fn load_immediate(&mut self) -> Option<Instruction> {
        let opcode = self.advance().clone();
        let first = self.expect(
            Category::Number,
            format!("Expected number but found {}", self.peek().lexeme),
        );
        self.expect(Category::Arrow, "Expected => after number value".to_string());
        let second = self.expect(
            Category::Register,
            format!("Expected destination register but found {}", self.peek().lexeme),
        );
        if first.category == Category::Error || second.category == Category::Error {
            return None;
        }
        Some(Instruction::Two { opcode, first, second })
    }

    /// `output NUMBER`
    fn output(&mut self) -> Option<Instruction> {
        let opcode = self.advance().clone();
        let first = self.expect(
            Category::Number,
            format!("Expected number but found {}", self.peek().lexeme),
        );
        if first.category == Category::Error {
            return None;
        }
        Some(Instruction::One { opcode, first })
    }

    /// Consume-or-error. Takes the next token when it matches. Otherwise
    /// the statement's first mismatch is reported (which also skips the
    /// rest of the line) and an error placeholder comes back, so the
    /// statement can finish its shape before being dropped; later steps of
    /// an already-errored statement stay silent and consume nothing.
    fn expect(&mut self, want: Category, message: String) -> Token {
        if !self.statement_errored {
            if self.peek().category == want {
                return self.advance().clone();
            }
            self.report(message);
        }
        Token {
            category: Category::Error,
            lexeme: self.peek().lexeme.clone(),
            line: self.peek().line,
        }
    }

    /// Record one diagnostic against the statement's opening token, then
    /// resynchronize at the next source line
    fn report(&mut self, message: String) {
        self.statement_errored = true;
        let at = &self.tokens[self.statement_start];
        let line = at.line;
        let diagnostic = Diagnostic::at_token(at, message);
        self.diagnostics.push(diagnostic);
        self.skip_line(line);
    }

    fn skip_line(&mut self, line: usize) {
        while !self.at_end() && self.peek().line == line {
            self.current += 1;
        }
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn advance(&mut self) -> &Token {
        if !self.at_end() {
            self.current += 1;
        }
        &self.tokens[self.current - 1]
    }

    fn at_end(&self) -> bool {
        self.peek().category == Category::Eof
    }
}
