use std::sync::{
    Arc,
    Mutex,
};

use crate::constants::{
    SCREEN_HEIGHT,
    SCREEN_WIDTH,
};

/// Display surface the draw opcode writes to. The core never owns pixels; it
/// only hands sprite bytes across this seam.
pub trait Display {
    fn clear(&mut self);

    /// XORs sprite rows onto the grid at (x, y), wrapping on both axes.
    /// Returns true if the operation erased at least one set pixel.
    fn xor_sprite(&mut self, data: &[u8], x: u8, y: u8) -> bool;
}

/// Canonical 64x32 monochrome pixel grid.
pub struct FrameBuffer {
    pixels: [bool; SCREEN_WIDTH * SCREEN_HEIGHT],
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self {
            pixels: [false; SCREEN_WIDTH * SCREEN_HEIGHT],
        }
    }
}

impl FrameBuffer {
    pub fn pixel(&self, x: usize, y: usize) -> bool {
        self.pixels[(y % SCREEN_HEIGHT) * SCREEN_WIDTH + (x % SCREEN_WIDTH)]
    }

    pub fn lit_count(&self) -> usize {
        self.pixels.iter().filter(|p| **p).count()
    }
}

impl Display for FrameBuffer {
    fn clear(&mut self) {
        self.pixels.fill(false);
    }

    fn xor_sprite(&mut self, data: &[u8], x: u8, y: u8) -> bool {
        let mut collision = false;

        for (row, byte) in data.iter().enumerate() {
            let py = (y as usize + row) % SCREEN_HEIGHT;
            for col in 0..8 {
                if (byte >> (7 - col)) & 1 == 0 {
                    continue;
                }
                let px = (x as usize + col) % SCREEN_WIDTH;
                let pixel = &mut self.pixels[py * SCREEN_WIDTH + px];

                if *pixel {
                    collision = true;
                }
                *pixel = !*pixel;
            }
        }

        collision
    }
}

/// Frame buffer behind a mutex, so the machine thread draws while the render
/// thread reads.
#[derive(Clone, Default)]
pub struct SharedFrameBuffer(Arc<Mutex<FrameBuffer>>);

impl SharedFrameBuffer {
    pub fn with<T>(&self, f: impl FnOnce(&FrameBuffer) -> T) -> T {
        f(&self.0.lock().unwrap_or_else(|poison| poison.into_inner()))
    }

    fn with_mut<T>(&self, f: impl FnOnce(&mut FrameBuffer) -> T) -> T {
        f(&mut self.0.lock().unwrap_or_else(|poison| poison.into_inner()))
    }
}

impl Display for SharedFrameBuffer {
    fn clear(&mut self) {
        self.with_mut(|fb| fb.clear());
    }

    fn xor_sprite(&mut self, data: &[u8], x: u8, y: u8) -> bool {
        self.with_mut(|fb| fb.xor_sprite(data, x, y))
    }
}
