#![allow(non_snake_case)]

use rand::Rng;
use thiserror::Error;

use crate::{
    constants,
    display::Display,
    emulator::{
        ProgramCounter,
        Timers,
    },
    keypad::{
        Keypad,
        KeypadError,
    },
    mem::{
        AddressStack,
        Ram,
        RamError,
        Registers,
        StackError,
    },
};

#[derive(Error, Debug)]
pub enum ProcessingError {
    #[error("call stack fault: {source}")]
    Stack {
        #[from]
        source: StackError,
    },

    #[error("memory fault: {source}")]
    Memory {
        #[from]
        source: RamError,
    },

    #[error("keypad fault: {source}")]
    Keypad {
        #[from]
        source: KeypadError,
    },

    #[error("key wait interrupted by host shutdown")]
    Interrupted,
}

pub fn op_00E0(display: &mut impl Display) {
    display.clear();
}

pub fn op_00EE(pc: &mut ProgramCounter, stack: &mut AddressStack) -> Result<(), ProcessingError> {
    pc.jump(stack.pop()?);
    Ok(())
}

pub fn op_1NNN(pc: &mut ProgramCounter, nnn: u16) {
    pc.jump(nnn);
}

pub fn op_2NNN(stack: &mut AddressStack, pc: &mut ProgramCounter, nnn: u16) -> Result<(), ProcessingError> {
    stack.push(pc.inner())?;
    pc.jump(nnn);
    Ok(())
}

pub fn op_3XNN(registers: &Registers, x: u8, nn: u8, pc: &mut ProgramCounter) {
    if registers.get(x) == nn {
        pc.advance();
    }
}

pub fn op_4XNN(registers: &Registers, x: u8, nn: u8, pc: &mut ProgramCounter) {
    if registers.get(x) != nn {
        pc.advance();
    }
}

pub fn op_5XY0(registers: &Registers, x: u8, y: u8, pc: &mut ProgramCounter) {
    if registers.get(x) == registers.get(y) {
        pc.advance();
    }
}

pub fn op_6XNN(registers: &mut Registers, x: u8, nn: u8) {
    registers.set(x, nn);
}

pub fn op_7XNN(registers: &mut Registers, x: u8, nn: u8) {
    registers.set(x, registers.get(x).wrapping_add(nn));
}

pub fn op_8XY0(registers: &mut Registers, x: u8, y: u8) {
    registers.set(x, registers.get(y));
}

pub fn op_8XY1(registers: &mut Registers, x: u8, y: u8) {
    let val = registers.get(y);
    *registers.get_mut(x) |= val;
}

pub fn op_8XY2(registers: &mut Registers, x: u8, y: u8) {
    let val = registers.get(y);
    *registers.get_mut(x) &= val;
}

pub fn op_8XY3(registers: &mut Registers, x: u8, y: u8) {
    let val = registers.get(y);
    *registers.get_mut(x) ^= val;
}

pub fn op_8XY4(registers: &mut Registers, x: u8, y: u8) {
    let (val, carry) = registers.get(x).overflowing_add(registers.get(y));
    registers.set(x, val);
    registers.set_flag(carry);
}

pub fn op_8XY5(registers: &mut Registers, x: u8, y: u8) {
    // not-borrow flag is the strict comparison; equal operands clear it
    let not_borrow = registers.get(x) > registers.get(y);
    let val = registers.get(x).wrapping_sub(registers.get(y));
    registers.set(x, val);
    registers.set_flag(not_borrow);
}

pub fn op_8XY6(registers: &mut Registers, x: u8) {
    let lsb = registers.get(x) & 1;
    registers.set(x, registers.get(x) >> 1);
    registers.set_flag(lsb == 1);
}

pub fn op_8XY7(registers: &mut Registers, x: u8, y: u8) {
    let not_borrow = registers.get(y) > registers.get(x);
    let val = registers.get(y).wrapping_sub(registers.get(x));
    registers.set(x, val);
    registers.set_flag(not_borrow);
}

pub fn op_8XYE(registers: &mut Registers, x: u8) {
    let msb = registers.get(x) >> 7;
    registers.set(x, registers.get(x) << 1);
    registers.set_flag(msb == 1);
}

pub fn op_9XY0(registers: &Registers, x: u8, y: u8, pc: &mut ProgramCounter) {
    if registers.get(x) != registers.get(y) {
        pc.advance();
    }
}

pub fn op_ANNN(index_register: &mut u16, nnn: u16) {
    *index_register = nnn;
}

pub fn op_BNNN(registers: &Registers, pc: &mut ProgramCounter, nnn: u16) {
    pc.jump(nnn + registers.get(0) as u16);
}

pub fn op_CXNN(registers: &mut Registers, x: u8, nn: u8, rng: &mut impl Rng) {
    registers.set(x, rng.gen::<u8>() & nn);
}

pub fn op_DXYN(
    ram: &Ram,
    registers: &mut Registers,
    index_register: u16,
    display: &mut impl Display,
    x: u8,
    y: u8,
    n: u8,
) -> Result<(), ProcessingError> {
    let base = index_register as usize;
    let sprite = if n == 0 {
        &[][..]
    } else {
        ram.read_range(base, base + n as usize - 1)?
    };

    let collided = display.xor_sprite(sprite, registers.get(x), registers.get(y));
    registers.set_flag(collided);

    Ok(())
}

pub fn op_EX9E(
    registers: &Registers,
    keypad: &impl Keypad,
    pc: &mut ProgramCounter,
    x: u8,
) -> Result<(), ProcessingError> {
    if keypad.is_pressed(registers.get(x))? {
        pc.advance();
    }
    Ok(())
}

pub fn op_EXA1(
    registers: &Registers,
    keypad: &impl Keypad,
    pc: &mut ProgramCounter,
    x: u8,
) -> Result<(), ProcessingError> {
    if !keypad.is_pressed(registers.get(x))? {
        pc.advance();
    }
    Ok(())
}

pub fn op_FX07(registers: &mut Registers, x: u8, timers: &Timers) {
    registers.set(x, timers.delay);
}

/// Blocks until some key 0-F is observed pressed, scanning in ascending
/// order. `Keypad::idle` runs between scan rounds so the host can keep its
/// timer cadence going or cancel the wait.
pub fn op_FX0A(
    registers: &mut Registers,
    x: u8,
    keypad: &mut impl Keypad,
    timers: &mut Timers,
) -> Result<(), ProcessingError> {
    loop {
        for key in 0x0..=0xF {
            if keypad.is_pressed(key)? {
                registers.set(x, key);
                return Ok(());
            }
        }

        if !keypad.idle(timers) {
            return Err(ProcessingError::Interrupted);
        }
    }
}

pub fn op_FX15(registers: &Registers, x: u8, timers: &mut Timers) {
    timers.delay = registers.get(x);
}

pub fn op_FX18(registers: &Registers, x: u8, timers: &mut Timers) {
    timers.sound = registers.get(x);
}

pub fn op_FX1E(registers: &Registers, x: u8, index_register: &mut u16) {
    // 16-bit add, no overflow flag on this machine
    *index_register = index_register.wrapping_add(registers.get(x) as u16);
}

pub fn op_FX29(registers: &Registers, x: u8, index_register: &mut u16) {
    let glyph = registers.get(x) as usize;
    *index_register = (constants::GLYPH_OFFSET + glyph * constants::GLYPH_SIZE) as u16;
}

pub fn op_FX33(
    registers: &Registers,
    ram: &mut Ram,
    x: u8,
    index_register: u16,
) -> Result<(), ProcessingError> {
    let val = registers.get(x);
    let base = index_register as usize;

    *ram.get_mut(base)? = val / 100;
    *ram.get_mut(base + 1)? = val / 10 % 10;
    *ram.get_mut(base + 2)? = val % 10;

    Ok(())
}

pub fn op_FX55(
    registers: &Registers,
    ram: &mut Ram,
    index_register: u16,
    x: u8,
) -> Result<(), ProcessingError> {
    for i in 0..=x {
        *ram.get_mut(index_register as usize + i as usize)? = registers.get(i);
    }
    Ok(())
}

pub fn op_FX65(
    registers: &mut Registers,
    ram: &Ram,
    index_register: u16,
    x: u8,
) -> Result<(), ProcessingError> {
    for i in 0..=x {
        registers.set(i, ram.get(index_register as usize + i as usize)?);
    }
    Ok(())
}
