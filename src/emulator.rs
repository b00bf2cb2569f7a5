use rand::Rng;

use crate::{
    constants,
    display::Display,
    instruction::Instruction,
    keypad::Keypad,
    mem::{
        AddressStack,
        Ram,
        RamError,
        Registers,
    },
    process::{
        self,
        ProcessingError,
    },
};

pub struct ProgramCounter(u16);

impl ProgramCounter {
    pub fn inner(&self) -> u16 {
        self.0
    }

    pub fn advance(&mut self) {
        self.0 = self.0.wrapping_add(2);
    }

    pub fn jump(&mut self, address: u16) {
        self.0 = address;
    }
}

/// Delay and sound countdown timers. Only the register-to-timer opcodes load
/// them; `tick` is the sole way down, clamped at zero.
#[derive(Default)]
pub struct Timers {
    pub delay: u8,
    pub sound: u8,
}

impl Timers {
    pub fn tick(&mut self) {
        self.delay = self.delay.saturating_sub(1);
        self.sound = self.sound.saturating_sub(1);
    }
}

/// The machine: memory, register file, call stack, timers and the
/// fetch/decode/dispatch loop, generic over its display, keypad and random
/// source collaborators.
pub struct Emulator<D, K, R> {
    ram: Ram,
    pc: ProgramCounter,
    stack: AddressStack,
    registers: Registers,
    index_register: u16,
    timers: Timers,
    display: D,
    keypad: K,
    rng: R,
}

impl<D: Display, K: Keypad, R: Rng> Emulator<D, K, R> {
    pub fn new(display: D, keypad: K, rng: R) -> Self {
        Self {
            ram: Ram::new(),
            pc: ProgramCounter(constants::MEMORY_OFFSET as u16),
            stack: AddressStack::default(),
            registers: Registers::default(),
            index_register: 0,
            timers: Timers::default(),
            display,
            keypad,
            rng,
        }
    }

    /// Writes the program image at the fixed load base (0x200).
    pub fn load_program(&mut self, program: &[u8]) -> Result<(), RamError> {
        self.ram.load_at(program, constants::MEMORY_OFFSET)
    }

    /// Fetches, decodes and executes exactly one instruction.
    pub fn step(&mut self) -> Result<(), ProcessingError> {
        let word = self.ram.word(self.pc.inner() as usize)?;
        self.pc.advance();

        self.execute(Instruction::from(word))
    }

    /// One tick of the external 60 Hz cadence.
    pub fn tick_timers(&mut self) {
        self.timers.tick();
    }

    fn execute(&mut self, instruction: Instruction) -> Result<(), ProcessingError> {
        let Instruction { x, y, n, kk, nnn, .. } = instruction;

        match instruction.command {
            0x0 => match kk {
                0xE0 => process::op_00E0(&mut self.display),
                0xEE => process::op_00EE(&mut self.pc, &mut self.stack)?,
                _ => {}
            },
            0x1 => process::op_1NNN(&mut self.pc, nnn),
            0x2 => process::op_2NNN(&mut self.stack, &mut self.pc, nnn)?,
            0x3 => process::op_3XNN(&self.registers, x, kk, &mut self.pc),
            0x4 => process::op_4XNN(&self.registers, x, kk, &mut self.pc),
            0x5 => process::op_5XY0(&self.registers, x, y, &mut self.pc),
            0x6 => process::op_6XNN(&mut self.registers, x, kk),
            0x7 => process::op_7XNN(&mut self.registers, x, kk),
            0x8 => match n {
                0x0 => process::op_8XY0(&mut self.registers, x, y),
                0x1 => process::op_8XY1(&mut self.registers, x, y),
                0x2 => process::op_8XY2(&mut self.registers, x, y),
                0x3 => process::op_8XY3(&mut self.registers, x, y),
                0x4 => process::op_8XY4(&mut self.registers, x, y),
                0x5 => process::op_8XY5(&mut self.registers, x, y),
                0x6 => process::op_8XY6(&mut self.registers, x),
                0x7 => process::op_8XY7(&mut self.registers, x, y),
                0xE => process::op_8XYE(&mut self.registers, x),
                _ => {}
            },
            0x9 => process::op_9XY0(&self.registers, x, y, &mut self.pc),
            0xA => process::op_ANNN(&mut self.index_register, nnn),
            0xB => process::op_BNNN(&self.registers, &mut self.pc, nnn),
            0xC => process::op_CXNN(&mut self.registers, x, kk, &mut self.rng),
            0xD => process::op_DXYN(
                &self.ram,
                &mut self.registers,
                self.index_register,
                &mut self.display,
                x,
                y,
                n,
            )?,
            0xE => match kk {
                0x9E => process::op_EX9E(&self.registers, &self.keypad, &mut self.pc, x)?,
                0xA1 => process::op_EXA1(&self.registers, &self.keypad, &mut self.pc, x)?,
                _ => {}
            },
            0xF => match kk {
                0x07 => process::op_FX07(&mut self.registers, x, &self.timers),
                0x0A => process::op_FX0A(&mut self.registers, x, &mut self.keypad, &mut self.timers)?,
                0x15 => process::op_FX15(&self.registers, x, &mut self.timers),
                0x18 => process::op_FX18(&self.registers, x, &mut self.timers),
                0x1E => process::op_FX1E(&self.registers, x, &mut self.index_register),
                0x29 => process::op_FX29(&self.registers, x, &mut self.index_register),
                0x33 => process::op_FX33(&self.registers, &mut self.ram, x, self.index_register)?,
                0x55 => process::op_FX55(&self.registers, &mut self.ram, self.index_register, x)?,
                0x65 => process::op_FX65(&mut self.registers, &self.ram, self.index_register, x)?,
                _ => {}
            },
            _ => {}
        }

        Ok(())
    }

    pub fn registers(&self) -> &Registers {
        &self.registers
    }

    pub fn program_counter(&self) -> u16 {
        self.pc.inner()
    }

    pub fn index_register(&self) -> u16 {
        self.index_register
    }

    pub fn timers(&self) -> &Timers {
        &self.timers
    }

    pub fn stack(&self) -> &AddressStack {
        &self.stack
    }

    pub fn ram(&self) -> &Ram {
        &self.ram
    }

    pub fn display(&self) -> &D {
        &self.display
    }
}
