pub const TOTAL_RAM: usize = 0x1000;
pub const MEMORY_OFFSET: usize = 0x200;
pub const AVAILABLE_RAM: usize = TOTAL_RAM - MEMORY_OFFSET;

pub const GLYPH_OFFSET: usize = 0x000;
pub const GLYPH_SIZE: usize = 5;

pub const STACK_DEPTH: usize = 16;

pub const SCREEN_WIDTH: usize = 64;
pub const SCREEN_HEIGHT: usize = 32;

pub const INSTRUCTIONS_PER_SECOND: usize = 700;
pub const MS_PER_INSTRUCTION: f64 = 1000.0 / INSTRUCTIONS_PER_SECOND as f64;
pub const MS_60HZ: f64 = 1000.0 / 60.0;
