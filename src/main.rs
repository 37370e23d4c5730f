use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use clap::Parser;
use log::{error, info, warn};
use sdl2::audio::{AudioCallback, AudioDevice, AudioSpecDesired};
use sdl2::event::Event;
use sdl2::gfx::primitives::DrawRenderer;
use sdl2::keyboard::{KeyboardState, Keycode, Scancode};
use sdl2::pixels;
use sdl2::render::Canvas;
use sdl2::video::Window;

use chip8::{Chip8, Keypad, Speed, HEIGHT, WIDTH};

static FRAME: Duration = Duration::from_micros(16_667);

// hex keypad on the left-hand side of a qwerty keyboard
//   1 2 3 C      1 2 3 4
//   4 5 6 D  =>  Q W E R
//   7 8 9 E      A S D F
//   A 0 B F      Z X C V
const KEYMAP: [(Scancode, u8); 16] = [
    (Scancode::X, 0x0),
    (Scancode::Num1, 0x1),
    (Scancode::Num2, 0x2),
    (Scancode::Num3, 0x3),
    (Scancode::Q, 0x4),
    (Scancode::W, 0x5),
    (Scancode::E, 0x6),
    (Scancode::A, 0x7),
    (Scancode::S, 0x8),
    (Scancode::D, 0x9),
    (Scancode::Z, 0xA),
    (Scancode::C, 0xB),
    (Scancode::Num4, 0xC),
    (Scancode::R, 0xD),
    (Scancode::F, 0xE),
    (Scancode::V, 0xF),
];

#[derive(Parser, Debug)]
#[command(name = "chip8", about = "CHIP-8 emulator. Drop a ROM on the window to load it.")]
struct Args {
    /// ROM image to load at startup
    rom: Option<PathBuf>,

    /// Instructions executed per 60Hz frame (O/P adjust at runtime)
    #[arg(long, default_value_t = chip8::speed::DEFAULT_CYCLES_PER_FRAME)]
    cycles_per_frame: u32,

    /// Window pixels per display cell
    #[arg(long, default_value_t = 10)]
    scale: u32,

    /// Disable the tone
    #[arg(long)]
    mute: bool,
}

struct SquareWave {
    phase_inc: f32,
    phase: f32,
    volume: f32,
}

impl AudioCallback for SquareWave {
    type Channel = f32;

    fn callback(&mut self, out: &mut [f32]) {
        for x in out.iter_mut() {
            *x = if self.phase <= 0.5 {
                self.volume
            } else {
                -self.volume
            };
            self.phase = (self.phase + self.phase_inc) % 1.0;
        }
    }
}

fn open_beeper(sdl_ctx: &sdl2::Sdl) -> Result<AudioDevice<SquareWave>> {
    let audio = sdl_ctx.audio().map_err(|e| anyhow!(e))?;
    let desired = AudioSpecDesired {
        freq: Some(44_100),
        channels: Some(1),
        samples: None,
    };
    audio
        .open_playback(None, &desired, |spec| SquareWave {
            phase_inc: 440.0 / spec.freq as f32,
            phase: 0.0,
            volume: 0.15,
        })
        .map_err(|e| anyhow!(e))
}

fn read_keypad(state: &KeyboardState) -> Keypad {
    let mut keys = Keypad::default();
    for (scancode, key) in KEYMAP.iter() {
        if state.is_scancode_pressed(*scancode) {
            keys.press(*key);
        }
    }
    keys
}

fn load(emu: &mut Chip8, path: &Path) -> bool {
    emu.reset();
    match emu.load_rom_file(path) {
        Ok(_) => {
            info!("running {}", path.display());
            true
        }
        Err(e) => {
            warn!("couldn't load {}: {}", path.display(), e);
            false
        }
    }
}

fn render(canvas: &mut Canvas<Window>, emu: &Chip8, scale: i16) -> Result<()> {
    let black = pixels::Color::RGB(0, 0, 0);
    let white = pixels::Color::RGB(255, 255, 255);
    canvas.set_draw_color(black);
    canvas.clear();
    for (x, y) in emu.framebuffer().lit() {
        let x = x as i16 * scale;
        let y = y as i16 * scale;
        canvas
            .box_(x, y, x + scale - 1, y + scale - 1, white)
            .map_err(|e| anyhow!(e))?;
    }
    canvas.present();
    Ok(())
}

fn render_idle(canvas: &mut Canvas<Window>, scale: i16) -> Result<()> {
    let message = "Drop a ROM file to play";
    let x = (WIDTH as i16 * scale - message.len() as i16 * 8) / 2;
    let y = HEIGHT as i16 * scale / 2 - 4;
    canvas.set_draw_color(pixels::Color::RGB(0, 0, 0));
    canvas.clear();
    canvas
        .string(x, y, message, pixels::Color::RGB(255, 255, 255))
        .map_err(|e| anyhow!(e))?;
    canvas.present();
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let sdl_ctx = sdl2::init().map_err(|e| anyhow!(e))?;
    let video = sdl_ctx.video().map_err(|e| anyhow!(e))?;

    let scale = args.scale.max(1);
    let window = video
        .window("CHIP-8", WIDTH as u32 * scale, HEIGHT as u32 * scale)
        .position_centered()
        .build()?;
    let mut canvas = window.into_canvas().build()?;
    let scale = scale as i16;

    let beeper = if args.mute {
        None
    } else {
        match open_beeper(&sdl_ctx) {
            Ok(device) => Some(device),
            Err(e) => {
                warn!("no audio: {}", e);
                None
            }
        }
    };

    let mut event_pump = sdl_ctx.event_pump().map_err(|e| anyhow!(e))?;

    let mut emu = Chip8::new();
    let mut speed = Speed::new(args.cycles_per_frame);
    let mut rom = args.rom;
    let mut halted = false;
    if let Some(path) = &rom {
        load(&mut emu, path);
    }

    'main: loop {
        let frame_start = Instant::now();

        for e in event_pump.poll_iter() {
            match e {
                Event::Quit { .. }
                | Event::KeyDown {
                    keycode: Some(Keycode::Escape),
                    ..
                } => break 'main,
                Event::DropFile { filename, .. } => {
                    let path = PathBuf::from(filename);
                    halted = !load(&mut emu, &path);
                    rom = Some(path);
                }
                Event::KeyDown {
                    keycode: Some(Keycode::O),
                    repeat: false,
                    ..
                } => {
                    speed.faster();
                    info!("{} cycles per frame", speed.cycles_per_frame());
                }
                Event::KeyDown {
                    keycode: Some(Keycode::P),
                    repeat: false,
                    ..
                } => {
                    speed.slower();
                    info!("{} cycles per frame", speed.cycles_per_frame());
                }
                Event::KeyDown {
                    keycode: Some(Keycode::Backspace),
                    repeat: false,
                    ..
                } => {
                    if let Some(path) = &rom {
                        halted = !load(&mut emu, path);
                    }
                }
                _ => {}
            }
        }

        if emu.is_loaded() && !halted {
            let keys = read_keypad(&event_pump.keyboard_state());
            if let Err(fault) = emu.run_frame(&keys, speed.cycles_per_frame()) {
                error!("machine halted: {}", fault);
                halted = true;
            }

            if let Some(device) = &beeper {
                if emu.sound_flag() {
                    device.resume();
                } else {
                    device.pause();
                }
            }

            if emu.take_draw_flag() {
                render(&mut canvas, &emu, scale)?;
            }
        } else {
            if let Some(device) = &beeper {
                device.pause();
            }
            if emu.is_loaded() {
                render(&mut canvas, &emu, scale)?;
            } else {
                render_idle(&mut canvas, scale)?;
            }
        }

        if let Some(rest) = FRAME.checked_sub(frame_start.elapsed()) {
            std::thread::sleep(rest);
        }
    }

    Ok(())
}
