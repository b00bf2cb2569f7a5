use clap::Parser;
use macroquad::window::{
    next_frame,
    request_new_screen_size,
};
use okto::constants::{
    SCREEN_HEIGHT,
    SCREEN_WIDTH,
};

#[derive(Parser)]
#[command(about = "CHIP-8 emulator")]
struct Args {
    /// ROM to emulate
    rom: String,

    /// Screen scale, host pixels per cell
    #[arg(short, long, default_value_t = 10)]
    scale: i32,
}

#[macroquad::main("okto")]
async fn main() {
    let args = Args::parse();

    request_new_screen_size(
        (SCREEN_WIDTH as i32 * args.scale) as f32,
        (SCREEN_HEIGHT as i32 * args.scale) as f32,
    );
    next_frame().await;

    if let Err(err) = okto::run(&args.rom, args.scale).await {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}
