use std::fs::File;
use std::io::{BufReader, Read};
use std::ops::Range;
use std::path::Path;

use log::{debug, info, log_enabled, trace, Level};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{Fault, LoadError};

pub mod display;
pub mod font;
pub mod keypad;
pub mod opcode;
pub mod timers;

use display::Framebuffer;
use font::{FONTSET, GLYPH_BYTES};
use keypad::Keypad;
use opcode::Opcode;
use timers::Timers;

pub const MEMORY_SIZE: usize = 4096;
/// programs are loaded, and start executing, here
pub const PROGRAM_START: u16 = 0x200;
pub const MAX_ROM_SIZE: usize = MEMORY_SIZE - PROGRAM_START as usize;
pub const STACK_DEPTH: usize = 16;

type OpcodeFn = fn(&mut Chip8, Opcode, &Keypad) -> Result<(), Fault>;

// one handler per top nibble
const OPCODE_FNS: [OpcodeFn; 16] = [
    Chip8::cls_ret, // 00**
    Chip8::jmp,     // 1NNN
    Chip8::call,    // 2NNN
    Chip8::eb,      // 3XNN
    Chip8::neb,     // 4XNN
    Chip8::er,      // 5XY0
    Chip8::ld,      // 6XNN
    Chip8::addb,    // 7XNN
    Chip8::alu,     // 8XY*
    Chip8::ner,     // 9XY0
    Chip8::si,      // ANNN
    Chip8::jmpo,    // BNNN
    Chip8::rng,     // CXNN
    Chip8::draw,    // DXYN
    Chip8::key,     // EX**
    Chip8::ex,      // FX**
];

pub struct Chip8 {
    // CHIP-8 VM
    memory: [u8; MEMORY_SIZE], // system memory
    v: [u8; 16],               // registers V0-VE (VF is flag for some instructions)
    i: u16,                    // address register, not masked to 12 bits
    pc: u16,                   // program counter
    gfx: Framebuffer,
    timers: Timers,
    stack: [u16; STACK_DEPTH],
    sp: usize, // stack pointer
    loaded: bool,

    // emulator resources
    draw_flag: bool,
    rng: StdRng,
}

impl Default for Chip8 {
    fn default() -> Self {
        Self::new()
    }
}

impl Chip8 {
    pub fn new() -> Self {
        Self::power_on(StdRng::from_entropy())
    }

    /// a machine whose CXNN results are reproducible
    pub fn with_seed(seed: u64) -> Self {
        Self::power_on(StdRng::seed_from_u64(seed))
    }

    fn power_on(rng: StdRng) -> Self {
        let mut memory = [0; MEMORY_SIZE];

        // CHIP-8 systems had the interpreter in the first 512 bytes of memory
        // since we're emulating that we can just store the fontset there
        memory[..FONTSET.len()].copy_from_slice(&FONTSET);

        Self {
            memory,
            v: [0; 16],
            i: 0,
            pc: PROGRAM_START,
            gfx: Framebuffer::default(),
            timers: Timers::default(),
            stack: [0; STACK_DEPTH],
            sp: 0,
            loaded: false,

            draw_flag: true,
            rng,
        }
    }

    /// Return to power-on state. The random source carries over.
    pub fn reset(&mut self) {
        *self = Self::power_on(self.rng.clone());
        info!("machine reset");
    }

    /// Copy a program into memory at 0x200. Nothing is written unless the whole
    /// source was read and fits. At most one byte past the limit is consumed.
    pub fn load_rom<R: Read>(&mut self, reader: R) -> Result<usize, LoadError> {
        let mut rom = Vec::new();
        reader.take(MAX_ROM_SIZE as u64 + 1).read_to_end(&mut rom)?;
        if rom.len() > MAX_ROM_SIZE {
            return Err(LoadError::TooLarge {
                size: rom.len(),
                max: MAX_ROM_SIZE,
            });
        }

        let start = PROGRAM_START as usize;
        self.memory[start..start + rom.len()].copy_from_slice(&rom);
        self.loaded = true;
        info!("loaded {} byte ROM", rom.len());
        Ok(rom.len())
    }

    pub fn load_rom_file<P: AsRef<Path>>(&mut self, path: P) -> Result<usize, LoadError> {
        let file = File::open(path)?;
        self.load_rom(BufReader::new(file))
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Fetch, decode and execute a single instruction. `keys` is only read.
    pub fn step(&mut self, keys: &Keypad) -> Result<(), Fault> {
        let pc = self.pc as usize;
        if pc + 1 >= MEMORY_SIZE {
            return Err(Fault::AddressOutOfRange {
                addr: pc + 1,
                pc: self.pc,
            });
        }

        // two-byte opcodes
        let opcode = Opcode::from_bytes(self.memory[pc], self.memory[pc + 1]);
        trace!("{:03X}: {}", pc, opcode);
        self.pc += 2;

        let f = OPCODE_FNS[opcode.family()];
        f(self, opcode, keys)?;

        if log_enabled!(Level::Trace) {
            trace!(
                "V={:02X?} I={:X} PC={:X} SP={} stack={:03X?}",
                self.v,
                self.i,
                self.pc,
                self.sp,
                &self.stack[..self.sp]
            );
        }
        Ok(())
    }

    /// Count both timers down once. Called at 60Hz, independent of how many
    /// instructions ran.
    pub fn tick_timers(&mut self) {
        self.timers.tick();
    }

    /// One host frame: `cycles` instructions followed by a single timer tick.
    /// A fault ends the frame early without ticking.
    pub fn run_frame(&mut self, keys: &Keypad, cycles: u32) -> Result<(), Fault> {
        for _ in 0..cycles {
            self.step(keys)?;
        }
        self.tick_timers();
        Ok(())
    }

    pub fn gfx(&self) -> &[u8] {
        self.gfx.cells()
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.gfx
    }

    /// true if the screen was cleared or drawn to since the last call
    pub fn take_draw_flag(&mut self) -> bool {
        std::mem::replace(&mut self.draw_flag, false)
    }

    pub fn sound_flag(&self) -> bool {
        self.timers.sound_active()
    }

    pub fn registers(&self) -> &[u8; 16] {
        &self.v
    }

    pub fn set_register(&mut self, x: usize, value: u8) {
        self.v[x & 0xF] = value;
    }

    pub fn pc(&self) -> u16 {
        self.pc
    }

    pub fn index(&self) -> u16 {
        self.i
    }

    pub fn set_index(&mut self, i: u16) {
        self.i = i;
    }

    /// return addresses currently on the stack, oldest first
    pub fn stack(&self) -> &[u16] {
        &self.stack[..self.sp]
    }

    pub fn delay_timer(&self) -> u8 {
        self.timers.delay
    }

    pub fn sound_timer(&self) -> u8 {
        self.timers.sound
    }

    pub fn memory(&self) -> &[u8] {
        &self.memory
    }

    /// Host-side poke, outside of any instruction.
    pub fn write_memory(&mut self, addr: u16, bytes: &[u8]) -> Result<(), Fault> {
        let start = addr as usize;
        let end = start + bytes.len();
        if end > MEMORY_SIZE {
            return Err(Fault::WriteOutOfRange { addr: end - 1 });
        }
        self.memory[start..end].copy_from_slice(bytes);
        Ok(())
    }

    // bounds-check `len` bytes from `start` for the instruction being executed
    fn mem_range(&self, start: usize, len: usize) -> Result<Range<usize>, Fault> {
        if len == 0 {
            return Ok(0..0);
        }
        let end = start + len;
        if end > MEMORY_SIZE {
            return Err(Fault::AddressOutOfRange {
                addr: end - 1,
                pc: self.pc.wrapping_sub(2),
            });
        }
        Ok(start..end)
    }

    fn skip_if(&mut self, cond: bool) {
        if cond {
            self.pc += 2;
        }
    }

    fn cls_ret(&mut self, op: Opcode, _: &Keypad) -> Result<(), Fault> {
        match op.nn() {
            0xE0 => {
                // 00E0
                // clear screen
                self.gfx.clear();
                self.draw_flag = true;
            }
            0xEE => {
                // 00EE
                // return from subroutine
                if self.sp == 0 {
                    return Err(Fault::StackUnderflow { pc: self.pc - 2 });
                }
                self.sp -= 1;
                self.pc = self.stack[self.sp];
            }
            // 0NNN machine routines are not emulated
            _ => debug!("ignoring opcode {}", op),
        }
        Ok(())
    }

    fn jmp(&mut self, op: Opcode, _: &Keypad) -> Result<(), Fault> {
        // 1NNN
        // jump to NNN
        self.pc = op.nnn();
        Ok(())
    }

    fn call(&mut self, op: Opcode, _: &Keypad) -> Result<(), Fault> {
        // 2NNN
        // call subroutine at NNN
        if self.sp >= STACK_DEPTH {
            return Err(Fault::StackOverflow { pc: self.pc - 2 });
        }
        self.stack[self.sp] = self.pc;
        self.sp += 1;
        self.pc = op.nnn();
        Ok(())
    }

    fn eb(&mut self, op: Opcode, _: &Keypad) -> Result<(), Fault> {
        // 3XNN
        // skip if VX == NN
        self.skip_if(self.v[op.x()] == op.nn());
        Ok(())
    }

    fn neb(&mut self, op: Opcode, _: &Keypad) -> Result<(), Fault> {
        // 4XNN
        // skip if VX != NN
        self.skip_if(self.v[op.x()] != op.nn());
        Ok(())
    }

    fn er(&mut self, op: Opcode, _: &Keypad) -> Result<(), Fault> {
        // 5XY0
        // skip if VX == VY, low nibble is not checked
        self.skip_if(self.v[op.x()] == self.v[op.y()]);
        Ok(())
    }

    fn ld(&mut self, op: Opcode, _: &Keypad) -> Result<(), Fault> {
        // 6XNN
        // set VX to NN
        self.v[op.x()] = op.nn();
        Ok(())
    }

    fn addb(&mut self, op: Opcode, _: &Keypad) -> Result<(), Fault> {
        // 7XNN
        // add NN to VX (no carry)
        let x = op.x();
        self.v[x] = self.v[x].wrapping_add(op.nn());
        Ok(())
    }

    // VF is written before VX in every flag-setting case, so when X is F the
    // result wins and when Y is F the fresh flag is the operand.
    fn alu(&mut self, op: Opcode, _: &Keypad) -> Result<(), Fault> {
        let x = op.x();
        let y = op.y();
        match op.n() {
            0x0 => {
                // 8XY0
                // set VX to VY
                self.v[x] = self.v[y];
            }
            0x1 => {
                // 8XY1
                // set VX to VX OR VY
                self.v[x] |= self.v[y];
            }
            0x2 => {
                // 8XY2
                // set VX to VX AND VY
                self.v[x] &= self.v[y];
            }
            0x3 => {
                // 8XY3
                // set VX to VX XOR VY
                self.v[x] ^= self.v[y];
            }
            0x4 => {
                // 8XY4
                // add VY to VX (set VF = 1 if there's a carry)
                let sum = self.v[x] as u16 + self.v[y] as u16;
                self.v[0xF] = (sum > 0xFF) as u8;
                self.v[x] = sum as u8;
            }
            0x5 => {
                // 8XY5
                // sub VY from VX (VF = 1 if VX > VY)
                self.v[0xF] = (self.v[x] > self.v[y]) as u8;
                self.v[x] = self.v[x].wrapping_sub(self.v[y]);
            }
            0x6 => {
                // 8XY6
                // store the LSB of VX in VF and shift VX one to the right
                self.v[0xF] = self.v[x] & 0x1;
                self.v[x] >>= 1;
            }
            0x7 => {
                // 8XY7
                // set VX to VY - VX (VF = 1 if VY > VX)
                self.v[0xF] = (self.v[y] > self.v[x]) as u8;
                self.v[x] = self.v[y].wrapping_sub(self.v[x]);
            }
            0xE => {
                // 8XYE
                // store the MSB of VX in VF and shift VX one to the left
                self.v[0xF] = self.v[x] >> 7;
                self.v[x] <<= 1;
            }
            _ => debug!("ignoring opcode {}", op),
        }
        Ok(())
    }

    fn ner(&mut self, op: Opcode, _: &Keypad) -> Result<(), Fault> {
        // 9XY0
        // skip if VX != VY
        self.skip_if(self.v[op.x()] != self.v[op.y()]);
        Ok(())
    }

    fn si(&mut self, op: Opcode, _: &Keypad) -> Result<(), Fault> {
        // ANNN
        // set I to NNN
        self.i = op.nnn();
        Ok(())
    }

    fn jmpo(&mut self, op: Opcode, _: &Keypad) -> Result<(), Fault> {
        // BNNN
        // jump to NNN + V0, may land outside memory and fault on the next fetch
        self.pc = op.nnn() + self.v[0] as u16;
        Ok(())
    }

    fn rng(&mut self, op: Opcode, _: &Keypad) -> Result<(), Fault> {
        // CXNN
        // Set VX = RNG[0, 256) & NN
        self.v[op.x()] = self.rng.gen::<u8>() & op.nn();
        Ok(())
    }

    fn draw(&mut self, op: Opcode, _: &Keypad) -> Result<(), Fault> {
        // DXYN
        // draw a sprite at VX,VY with a width of 8 pixels and a height of N pixels
        // each row of 8 pixels is bit-coded in memory starting at I
        // VF is set to 1 if any currently drawn pixels are unset during this
        let rows = self.mem_range(self.i as usize, op.n() as usize)?;
        let vx = self.v[op.x()];
        let vy = self.v[op.y()];

        self.v[0xF] = 0;
        let collision = self.gfx.draw_sprite(vx, vy, &self.memory[rows]);
        if collision {
            self.v[0xF] = 1;
        }

        self.draw_flag = true;
        Ok(())
    }

    fn key(&mut self, op: Opcode, keys: &Keypad) -> Result<(), Fault> {
        let pressed = keys.is_pressed(self.v[op.x()]);
        match op.nn() {
            0x9E => {
                // EX9E
                // skip if key stored in VX is pressed
                self.skip_if(pressed);
            }
            0xA1 => {
                // EXA1
                // skip if key stored in VX isn't pressed
                self.skip_if(!pressed);
            }
            _ => debug!("ignoring opcode {}", op),
        }
        Ok(())
    }

    fn ex(&mut self, op: Opcode, keys: &Keypad) -> Result<(), Fault> {
        let x = op.x();
        match op.nn() {
            0x07 => {
                // FX07
                // set VX to delay timer
                self.v[x] = self.timers.delay;
            }
            0x0A => {
                // FX0A
                // store next key press in VX, blocking instruction
                match keys.first_pressed() {
                    Some(k) => self.v[x] = k,
                    None => {
                        // refetch this instruction next cycle
                        self.pc -= 2;
                        trace!("waiting for key at {:03X}", self.pc);
                    }
                }
            }
            0x15 => {
                // FX15
                // set delay timer to VX
                self.timers.delay = self.v[x];
            }
            0x18 => {
                // FX18
                // set sound timer to VX
                self.timers.sound = self.v[x];
            }
            0x1E => {
                // FX1E
                // add VX to I, VF untouched
                self.i = self.i.wrapping_add(self.v[x] as u16);
            }
            0x29 => {
                // FX29
                // set I to location in memory of sprite for character in VX
                self.i = self.v[x] as u16 * GLYPH_BYTES;
            }
            0x33 => {
                // FX33
                // store the BCD representation of VX at I
                // so 193 becomes [1, 9, 3] in memory at I
                let range = self.mem_range(self.i as usize, 3)?;
                let vx = self.v[x];
                self.memory[range].copy_from_slice(&[vx / 100, (vx / 10) % 10, vx % 10]);
            }
            0x55 => {
                // FX55
                // store V0 to VX (inclusive) in memory at I
                let range = self.mem_range(self.i as usize, x + 1)?;
                self.memory[range].copy_from_slice(&self.v[..=x]);
            }
            0x65 => {
                // FX65
                // fill V0 to VX (inclusive) from memory at I
                let range = self.mem_range(self.i as usize, x + 1)?;
                self.v[..=x].copy_from_slice(&self.memory[range]);
            }
            _ => debug!("ignoring opcode {}", op),
        }
        Ok(())
    }
}
