use std::{
    sync::Arc,
    thread,
    time::{
        Duration,
        Instant,
    },
};

use anyhow::{
    anyhow,
    Error,
};
use macroquad::{
    color,
    input::{
        is_key_down,
        KeyCode,
    },
    shapes::draw_rectangle,
    window::{
        clear_background,
        next_frame,
    },
};
use rand::{
    rngs::StdRng,
    SeedableRng,
};

pub mod constants;
pub mod display;
pub mod emulator;
pub mod instruction;
pub mod keypad;
pub mod mem;
pub mod process;

use display::SharedFrameBuffer;
use emulator::Emulator;
use keypad::{
    KeyState,
    SharedKeypad,
};
use process::ProcessingError;

/// Fixed-interval wall-clock gate for the 60 Hz timer cadence.
pub struct Cadence {
    interval: Duration,
    last_tick: Instant,
}

impl Cadence {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_tick: Instant::now(),
        }
    }

    pub fn sixty_hz() -> Self {
        Self::new(Duration::from_secs_f64(constants::MS_60HZ / 1000.0))
    }

    /// True at most once per interval. After a long stall the gate
    /// resynchronizes instead of replaying the backlog.
    pub fn tick(&mut self) -> bool {
        let elapsed = self.last_tick.elapsed();
        if elapsed < self.interval {
            return false;
        }

        if elapsed >= self.interval * 2 {
            self.last_tick = Instant::now();
        } else {
            self.last_tick += self.interval;
        }
        true
    }
}

const KEY_MAP: [(KeyCode, u8); 16] = [
    (KeyCode::Key1, 0x1),
    (KeyCode::Key2, 0x2),
    (KeyCode::Key3, 0x3),
    (KeyCode::Key4, 0xC),
    (KeyCode::Q, 0x4),
    (KeyCode::W, 0x5),
    (KeyCode::E, 0x6),
    (KeyCode::R, 0xD),
    (KeyCode::A, 0x7),
    (KeyCode::S, 0x8),
    (KeyCode::D, 0x9),
    (KeyCode::F, 0xE),
    (KeyCode::Z, 0xA),
    (KeyCode::X, 0x0),
    (KeyCode::C, 0xB),
    (KeyCode::V, 0xF),
];

fn held_key_mask() -> u16 {
    KEY_MAP.iter().fold(
        0,
        |mask, (code, hex)| {
            if is_key_down(*code) {
                mask | 1 << hex
            } else {
                mask
            }
        },
    )
}

fn render(frame_buffer: &SharedFrameBuffer, pixel_size: i32) {
    frame_buffer.with(|fb| {
        for y in 0..constants::SCREEN_HEIGHT {
            for x in 0..constants::SCREEN_WIDTH {
                if !fb.pixel(x, y) {
                    continue;
                }
                draw_rectangle(
                    (x as i32 * pixel_size) as f32,
                    (y as i32 * pixel_size) as f32,
                    pixel_size as f32,
                    pixel_size as f32,
                    color::GREEN,
                );
            }
        }
    });
}

fn machine_loop(
    mut emulator: Emulator<SharedFrameBuffer, SharedKeypad, StdRng>,
    keys: &KeyState,
) -> Result<(), ProcessingError> {
    let pace = Duration::from_secs_f64(constants::MS_PER_INSTRUCTION / 1000.0);
    let mut cadence = Cadence::sixty_hz();

    while !keys.is_closed() {
        if cadence.tick() {
            emulator.tick_timers();
        }

        match emulator.step() {
            Ok(()) => {}
            Err(ProcessingError::Interrupted) => break,
            Err(err) => {
                keys.close();
                return Err(err);
            }
        }

        thread::sleep(pace);
    }

    Ok(())
}

/// Loads a ROM and runs it: the machine on its own thread, the macroquad
/// frame loop mirroring keys in and pixels out until Escape or the machine
/// stops.
pub async fn run(path: &str, pixel_size: i32) -> Result<(), Error> {
    let rom = mem::Rom::load(path)?;

    let frame_buffer = SharedFrameBuffer::default();
    let keys = Arc::new(KeyState::default());

    let mut emulator = Emulator::new(
        frame_buffer.clone(),
        SharedKeypad::new(Arc::clone(&keys)),
        StdRng::from_entropy(),
    );
    emulator.load_program(rom.data())?;

    let machine = thread::spawn({
        let keys = Arc::clone(&keys);
        move || machine_loop(emulator, &keys)
    });

    loop {
        keys.set_held(held_key_mask());
        if is_key_down(KeyCode::Escape) || keys.is_closed() {
            break;
        }

        clear_background(color::BLACK);
        render(&frame_buffer, pixel_size);
        next_frame().await;
    }

    keys.close();
    machine.join().map_err(|_| anyhow!("machine thread panicked"))??;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cadence_fires_once_per_interval() {
        let mut cadence = Cadence::new(Duration::from_millis(5));
        assert!(!cadence.tick());

        thread::sleep(Duration::from_millis(6));
        assert!(cadence.tick());
        assert!(!cadence.tick());
    }

    #[test]
    fn cadence_resyncs_after_a_stall() {
        let mut cadence = Cadence::new(Duration::from_millis(1));
        thread::sleep(Duration::from_millis(10));

        assert!(cadence.tick());
        // the stall is forgiven, not replayed as a burst
        assert!(!cadence.tick());
    }
}
