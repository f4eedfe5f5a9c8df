// Thin driver around the library: argument handling, file IO, and printing
// the renamed block. Everything with an invariant lives in lib.rs's modules.

use std::process::exit;

use docopt::Docopt;

use riloc::{build_block, max_source_register, rename, Instruction, RenamedBlock, Token};

const USAGE: &str = "
riloc - basic-block front end and live-range renaming for a small
register-transfer language.

Usage:
    riloc <k> <filename>
    riloc -x <filename>
    riloc (-h | --help)

Options:
    -h --help  Show this message.
    -x         Rename source registers into live ranges and print the
               renamed block.
";

fn main() {
    env_logger::init();
    let args = Docopt::new(USAGE)
        .and_then(|d| d.parse())
        .unwrap_or_else(|e| e.exit());

    if !args.get_bool("-x") {
        match args.get_str("<k>").parse::<usize>() {
            Ok(k) if k >= 3 && k <= 64 => {
                // the spill-aware allocator that consumes k is a separate
                // tool; until one is attached, k is only range-checked and
                // the renamed block is what gets printed
                log::warn!("no allocator attached; k={} is only range-checked", k);
            }
            _ => {
                eprintln!("ERROR: k must be an integer between 3 and 64.");
                exit(1);
            }
        }
    }

    let filename = args.get_str("<filename>").to_string();
    let source = match std::fs::read_to_string(&filename) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("ERROR: could not read {}: {}", filename, err);
            exit(1);
        }
    };

    let block = match build_block(&source) {
        Ok(block) => block,
        Err(diagnostics) => {
            for diagnostic in &diagnostics {
                eprintln!("{}", diagnostic);
            }
            eprintln!("Parse unsuccessful");
            exit(1);
        }
    };

    let bound = max_source_register(&block).unwrap_or(0);
    let renamed = rename(&block, bound);
    print_renamed(&block, &renamed);
}

/// Print the block in source syntax with every register operand rewritten
/// to its virtual-register name
fn print_renamed(block: &[Instruction], renamed: &RenamedBlock) {
    for (index, instruction) in block.iter().enumerate() {
        match instruction {
            Instruction::Zero { opcode } => println!("{}", opcode.lexeme),
            Instruction::One { opcode, first } => {
                println!("{} {}", opcode.lexeme, operand(renamed, index, 0, first))
            }
            Instruction::Two { opcode, first, second } => println!(
                "{} {} => {}",
                opcode.lexeme,
                operand(renamed, index, 0, first),
                operand(renamed, index, 1, second)
            ),
            Instruction::Three { opcode, first, second, third } => println!(
                "{} {}, {} => {}",
                opcode.lexeme,
                operand(renamed, index, 0, first),
                operand(renamed, index, 1, second),
                operand(renamed, index, 2, third)
            ),
        }
    }
}

fn operand(renamed: &RenamedBlock, instruction: usize, slot: usize, token: &Token) -> String {
    match renamed.get(instruction, slot) {
        Some(rename) => format!("vr{}", rename.virtual_register),
        None => token.lexeme.clone(),
    }
}
