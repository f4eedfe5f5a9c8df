//! The instruction forms of the block language. One basic block is just a
//! `Vec<Instruction>` in source order; the parser builds it and the renamer
//! walks it without ever changing it.

use std::fmt;

use crate::Token;

/// A parsed statement, tagged by operand count. Operand order matches the
/// source: sources first, then the destination where the shape has one.
/// The set of shapes is closed, so consumers match exhaustively and a new
/// shape is a compile-visible change everywhere.
#[derive(PartialEq, Eq, Clone, Debug)]
pub enum Instruction {
    Zero { opcode: Token },
    One { opcode: Token, first: Token },
    Two { opcode: Token, first: Token, second: Token },
    Three { opcode: Token, first: Token, second: Token, third: Token },
}

impl Instruction {
    pub fn opcode(&self) -> &Token {
        match self {
            Instruction::Zero { opcode }
            | Instruction::One { opcode, .. }
            | Instruction::Two { opcode, .. }
            | Instruction::Three { opcode, .. } => opcode,
        }
    }

    /// The operand tokens in declared order, opcode excluded
    pub fn operands(&self) -> Vec<&Token> {
        match self {
            Instruction::Zero { .. } => vec![],
            Instruction::One { first, .. } => vec![first],
            Instruction::Two { first, second, .. } => vec![first, second],
            Instruction::Three { first, second, third, .. } => vec![first, second, third],
        }
    }

    pub fn arity(&self) -> usize {
        match self {
            Instruction::Zero { .. } => 0,
            Instruction::One { .. } => 1,
            Instruction::Two { .. } => 2,
            Instruction::Three { .. } => 3,
        }
    }

    /// The operand slot this instruction writes, if any. Every two- and
    /// three-operand form puts its destination last; `output` only reads
    /// its operand and `nop` has none.
    pub fn destination_slot(&self) -> Option<usize> {
        match self {
            Instruction::Zero { .. } | Instruction::One { .. } => None,
            Instruction::Two { .. } => Some(1),
            Instruction::Three { .. } => Some(2),
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Instruction::Zero { opcode } => write!(f, "{}", opcode.lexeme),
            Instruction::One { opcode, first } => {
                write!(f, "{} {}", opcode.lexeme, first.lexeme)
            }
            Instruction::Two { opcode, first, second } => {
                write!(f, "{} {} => {}", opcode.lexeme, first.lexeme, second.lexeme)
            }
            Instruction::Three { opcode, first, second, third } => write!(
                f,
                "{} {}, {} => {}",
                opcode.lexeme, first.lexeme, second.lexeme, third.lexeme
            ),
        }
    }
}
