use std::{
    fs::File,
    io::{
        self,
        Read,
    },
};

use thiserror::Error;

use crate::constants;

/// Built-in hex glyphs, 5 bytes per digit, loaded at the bottom of memory in
/// canonical order 0-9 then A-F.
#[rustfmt::skip]
const GLYPHS: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9

    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80  // F
];

#[derive(Error, Debug)]
pub enum RamError {
    #[error("address {0:#06x} is outside memory")]
    OutOfBounds(usize),
}

pub struct Ram {
    memory: [u8; constants::TOTAL_RAM],
}

impl Default for Ram {
    fn default() -> Self {
        Self::new()
    }
}

impl Ram {
    pub fn new() -> Self {
        let mut ram = Ram {
            memory: [0; constants::TOTAL_RAM],
        };
        ram.memory[constants::GLYPH_OFFSET..constants::GLYPH_OFFSET + GLYPHS.len()].copy_from_slice(&GLYPHS);

        ram
    }

    /// Writes `data` starting at `offset`, overwriting existing content.
    pub fn load_at(&mut self, data: &[u8], offset: usize) -> Result<(), RamError> {
        let end = offset + data.len();
        if end > constants::TOTAL_RAM {
            return Err(RamError::OutOfBounds(end - 1));
        }
        self.memory[offset..end].copy_from_slice(data);

        Ok(())
    }

    /// Inclusive byte range `[from, to]`.
    pub fn read_range(&self, from: usize, to: usize) -> Result<&[u8], RamError> {
        if from > to {
            return Err(RamError::OutOfBounds(from));
        }
        self.memory.get(from..=to).ok_or(RamError::OutOfBounds(to))
    }

    pub fn get<T: Into<usize>>(&self, index: T) -> Result<u8, RamError> {
        let idx = index.into();
        self.memory.get(idx).ok_or(RamError::OutOfBounds(idx)).copied()
    }

    pub fn get_mut<T: Into<usize>>(&mut self, index: T) -> Result<&mut u8, RamError> {
        let idx = index.into();
        self.memory.get_mut(idx).ok_or(RamError::OutOfBounds(idx))
    }

    /// Big-endian instruction word at `addr`.
    pub fn word(&self, addr: usize) -> Result<u16, RamError> {
        let high = self.get(addr)? as u16;
        let low = self.get(addr + 1)? as u16;

        Ok((high << 8) | low)
    }
}

#[derive(Error, Debug)]
pub enum RomError {
    #[error("loading rom failed: {0}")]
    Io(#[from] io::Error),

    #[error("rom does not fit in the program region, {rom_size} > {available}")]
    OutOfMemory { rom_size: usize, available: usize },
}

pub struct Rom {
    data: Vec<u8>,
}

impl Rom {
    pub fn load(path: &str) -> Result<Self, RomError> {
        let mut file = File::open(path)?;
        let mut data = vec![];

        file.read_to_end(&mut data)?;

        if data.len() > constants::AVAILABLE_RAM {
            Err(RomError::OutOfMemory {
                rom_size: data.len(),
                available: constants::AVAILABLE_RAM,
            })?
        }

        Ok(Self { data })
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

/// Sixteen general-purpose 8-bit registers; VF doubles as the
/// carry/borrow/collision flag.
#[derive(Default)]
pub struct Registers {
    v: [u8; 16],
}

impl Registers {
    pub fn get(&self, index: u8) -> u8 {
        self.v[index as usize & 0xF]
    }

    pub fn get_mut(&mut self, index: u8) -> &mut u8 {
        &mut self.v[index as usize & 0xF]
    }

    pub fn set(&mut self, index: u8, val: u8) {
        self.v[index as usize & 0xF] = val;
    }

    pub fn set_flag(&mut self, flag: bool) {
        self.v[0xF] = flag as u8;
    }

    pub fn flag(&self) -> u8 {
        self.v[0xF]
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum StackError {
    #[error("call stack is full")]
    Overflow,

    #[error("return with an empty call stack")]
    Underflow,
}

/// Bounded LIFO of saved return addresses.
#[derive(Default)]
pub struct AddressStack(Vec<u16>);

impl AddressStack {
    pub fn push(&mut self, val: u16) -> Result<(), StackError> {
        if self.0.len() >= constants::STACK_DEPTH {
            return Err(StackError::Overflow);
        }
        self.0.push(val);

        Ok(())
    }

    pub fn pop(&mut self) -> Result<u16, StackError> {
        self.0.pop().ok_or(StackError::Underflow)
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glyphs_preloaded_at_base() {
        let ram = Ram::new();
        // '0' bitmap occupies the first slot
        assert_eq!(ram.read_range(0, 4).unwrap(), &[0xF0, 0x90, 0x90, 0x90, 0xF0]);
        // 'F' bitmap occupies the last slot
        assert_eq!(ram.read_range(75, 79).unwrap(), &[0xF0, 0x80, 0xF0, 0x80, 0x80]);
        // everything past the glyph region starts zeroed
        assert_eq!(ram.read_range(80, 0xFFF).unwrap(), &[0; 0x1000 - 80][..]);
    }

    #[test]
    fn load_at_places_bytes() {
        let mut ram = Ram::new();
        ram.load_at(&[1, 2, 3, 4], 0x200).unwrap();
        assert_eq!(ram.read_range(0x200, 0x203).unwrap(), &[1, 2, 3, 4]);
    }

    #[test]
    fn load_at_rejects_overrun() {
        let mut ram = Ram::new();
        assert!(ram.load_at(&[0; 8], 0xFFC).is_err());
        // failed load leaves memory untouched
        assert_eq!(ram.read_range(0xFFC, 0xFFF).unwrap(), &[0; 4]);
    }

    #[test]
    fn word_is_big_endian() {
        let mut ram = Ram::new();
        ram.load_at(&[0xA2, 0x1E], 0x200).unwrap();
        assert_eq!(ram.word(0x200).unwrap(), 0xA21E);
    }

    #[test]
    fn word_fetch_past_end_fails() {
        let ram = Ram::new();
        assert!(ram.word(0xFFF).is_err());
    }

    #[test]
    fn read_range_out_of_bounds() {
        let ram = Ram::new();
        assert!(ram.read_range(0xFFE, 0x1000).is_err());
    }

    #[test]
    fn stack_respects_capacity() {
        let mut stack = AddressStack::default();
        for addr in 0..16 {
            stack.push(addr).unwrap();
        }
        assert_eq!(stack.push(16), Err(StackError::Overflow));
        assert_eq!(stack.depth(), 16);

        for addr in (0..16).rev() {
            assert_eq!(stack.pop().unwrap(), addr);
        }
        assert_eq!(stack.pop(), Err(StackError::Underflow));
    }

    #[test]
    fn flag_register_is_vf() {
        let mut registers = Registers::default();
        registers.set_flag(true);
        assert_eq!(registers.get(0xF), 1);
        registers.set_flag(false);
        assert_eq!(registers.flag(), 0);
    }
}
