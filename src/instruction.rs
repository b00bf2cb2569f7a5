const NNN_MASK: u16 = 0x0FFF;
const N_MASK: u16 = 0x000F;
const X_MASK: u16 = 0x0F00;
const Y_MASK: u16 = 0x00F0;
const KK_MASK: u16 = 0x00FF;
const COMMAND_MASK: u16 = 0xF000;

/// One decoded instruction word. Every 16-bit value decodes; unknown
/// combinations are a dispatch concern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    pub word: u16,
    /// Primary opcode, top 4 bits.
    pub command: u8,
    /// Register index X, bits 8-11.
    pub x: u8,
    /// Register index Y, bits 4-7.
    pub y: u8,
    /// Nibble literal, low 4 bits.
    pub n: u8,
    /// Immediate byte, low 8 bits.
    pub kk: u8,
    /// Address literal, low 12 bits.
    pub nnn: u16,
}

impl From<u16> for Instruction {
    fn from(word: u16) -> Self {
        Self {
            word,
            command: ((word & COMMAND_MASK) >> 12) as u8,
            x: ((word & X_MASK) >> 8) as u8,
            y: ((word & Y_MASK) >> 4) as u8,
            n: (word & N_MASK) as u8,
            kk: (word & KK_MASK) as u8,
            nnn: word & NNN_MASK,
        }
    }
}
