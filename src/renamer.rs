//! The backward live-range pass: squeeze the programmer's sparse register
//! numbers into dense virtual registers, one per live range, and stamp
//! every register operand with the index of its next use. A downstream
//! allocator reads the next-use distances to pick spill candidates.
//!
//! The pass owns its output: annotations live in a [RenamedBlock] side
//! table indexed by (instruction, operand slot), and the parsed
//! instructions are never touched, reordered, or removed.

use crate::ir::Instruction;
use crate::{Category, Token};

/// What the pass learned about one register operand
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct Rename {
    /// dense id, one per live range, handed out 0, 1, 2, .. in the order
    /// the backward scan discovers ranges
    pub virtual_register: usize,
    /// index of the next instruction that reads this value, None when the
    /// value is never read again
    pub next_use: Option<usize>,
}

/// Annotations for a whole block, one slot per operand position
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct RenamedBlock {
    slots: Vec<Vec<Option<Rename>>>,
    virtual_registers: usize,
}

impl RenamedBlock {
    /// The annotation for one operand position; None for operands that
    /// aren't registers
    pub fn get(&self, instruction: usize, slot: usize) -> Option<Rename> {
        self.slots[instruction][slot]
    }

    /// Instruction count, always equal to the renamed block's
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// How many distinct live ranges the pass found
    pub fn virtual_registers(&self) -> usize {
        self.virtual_registers
    }
}

/// The largest register number mentioned anywhere in the block, for
/// drivers that derive the renaming bound from the block itself. Register
/// operands without a numeric name don't count (and will not survive
/// [rename]'s preconditions either).
pub fn max_source_register(block: &[Instruction]) -> Option<usize> {
    block
        .iter()
        .flat_map(|instruction| instruction.operands())
        .filter_map(|operand| operand.register_number())
        .max()
}

/// Rename every live range in `block` onto a fresh virtual register, in
/// one backward pass. Register numbers must lie in `0..=max_register`.
///
/// The block is expected to come out of an error-free [crate::build_block]
/// run; a register above the bound, or one with no numeric name, is a
/// broken precondition and panics rather than producing a diagnostic.
pub fn rename(block: &[Instruction], max_register: usize) -> RenamedBlock {
    // per-invocation state, sized by the declared bound and thrown away
    // with the pass
    let mut active: Vec<Option<usize>> = vec![None; max_register + 1];
    let mut next_use: Vec<Option<usize>> = vec![None; max_register + 1];
    let mut fresh = 0;
    let mut slots: Vec<Vec<Option<Rename>>> = block
        .iter()
        .map(|instruction| vec![None; instruction.arity()])
        .collect();

    for index in (0..block.len()).rev() {
        let instruction = &block[index];
        let operands = instruction.operands();
        let destination = instruction.destination_slot();

        // The destination goes first: writing a register ends the live
        // range scanned so far, and the sources of this same instruction
        // belong to the ranges before the write (`add r1, r1 => r1` reads
        // a different value than it defines).
        if let Some(slot) = destination {
            if let Some(sr) = checked_register(operands[slot], max_register) {
                let vr = open(&mut active, &mut fresh, sr);
                slots[index][slot] = Some(Rename { virtual_register: vr, next_use: next_use[sr] });
                active[sr] = None;
                next_use[sr] = None;
            }
        }

        // Sources are all stamped against the state below this instruction
        // before any of them records itself as the next use, so two reads
        // of the same register in one instruction agree on their
        // annotation.
        for slot in 0..operands.len() {
            if Some(slot) == destination {
                continue;
            }
            if let Some(sr) = checked_register(operands[slot], max_register) {
                let vr = open(&mut active, &mut fresh, sr);
                slots[index][slot] = Some(Rename { virtual_register: vr, next_use: next_use[sr] });
            }
        }
        for slot in 0..operands.len() {
            if Some(slot) == destination {
                continue;
            }
            if let Some(sr) = checked_register(operands[slot], max_register) {
                next_use[sr] = Some(index);
            }
        }
    }

    debug!(
        "renamed {} instructions onto {} virtual registers",
        block.len(),
        fresh
    );
    RenamedBlock { slots, virtual_registers: fresh }
}

/// Reuse the live range already open for `sr`, or open a fresh one
fn open(active: &mut [Option<usize>], fresh: &mut usize, sr: usize) -> usize {
    match active[sr] {
        Some(vr) => vr,
        None => {
            let vr = *fresh;
            *fresh += 1;
            active[sr] = Some(vr);
            vr
        }
    }
}

/// The register number behind an operand, with the pass preconditions
/// checked; non-register operands (immediates) rename to nothing
fn checked_register(operand: &Token, max_register: usize) -> Option<usize> {
    if operand.category != Category::Register {
        return None;
    }
    let sr = match operand.register_number() {
        Some(sr) => sr,
        None => panic!("register operand '{}' has no numeric name", operand.lexeme),
    };
    assert!(
        sr <= max_register,
        "register r{} is outside the declared range 0..={}",
        sr,
        max_register
    );
    Some(sr)
}
