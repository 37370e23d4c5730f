use std::io::{self, Read};

use chip8::{Chip8, LoadError, MAX_ROM_SIZE, PROGRAM_START};

struct BrokenReader;

impl Read for BrokenReader {
    fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::Other, "device unplugged"))
    }
}

#[test]
fn largest_rom_fits() {
    let mut chip = Chip8::new();
    let rom = vec![0xAB; MAX_ROM_SIZE];
    assert_eq!(MAX_ROM_SIZE, 3584);
    assert_eq!(chip.load_rom(&rom[..]).unwrap(), 3584);
    assert!(chip.is_loaded());
    assert_eq!(chip.memory()[PROGRAM_START as usize], 0xAB);
    assert_eq!(chip.memory()[4095], 0xAB);
}

#[test]
fn oversize_rom_is_rejected() {
    let mut chip = Chip8::new();
    let rom = vec![0xAB; MAX_ROM_SIZE + 1];
    match chip.load_rom(&rom[..]) {
        Err(LoadError::TooLarge { size, max }) => {
            assert_eq!(size, 3585);
            assert_eq!(max, 3584);
        }
        other => panic!("expected TooLarge, got {:?}", other),
    }
    assert!(!chip.is_loaded());
    assert!(chip.memory()[PROGRAM_START as usize..].iter().all(|b| *b == 0));
}

#[test]
fn failed_load_keeps_previous_program() {
    let mut chip = Chip8::new();
    chip.load_rom(&[0x12, 0x34][..]).unwrap();

    assert!(matches!(
        chip.load_rom(BrokenReader),
        Err(LoadError::Io(_))
    ));
    assert!(chip.load_rom(&vec![0xFF; 4000][..]).is_err());

    assert!(chip.is_loaded());
    assert_eq!(&chip.memory()[0x200..0x203], &[0x12, 0x34, 0x00]);
}

#[test]
fn unreadable_source_leaves_machine_unloaded() {
    let mut chip = Chip8::new();
    assert!(chip.load_rom(BrokenReader).is_err());
    assert!(!chip.is_loaded());
}

#[test]
fn missing_file_is_io_error() {
    let mut chip = Chip8::new();
    let err = chip
        .load_rom_file("this/path/does/not/exist.ch8")
        .unwrap_err();
    assert!(matches!(err, LoadError::Io(_)));
    assert!(!chip.is_loaded());
}

#[test]
fn rom_file_round_trip() {
    let path = std::env::temp_dir().join(format!("chip8-rom-{}.ch8", std::process::id()));
    std::fs::write(&path, [0x00, 0xE0, 0x12, 0x00]).unwrap();

    let mut chip = Chip8::new();
    let loaded = chip.load_rom_file(&path);
    std::fs::remove_file(&path).unwrap();

    assert_eq!(loaded.unwrap(), 4);
    assert_eq!(&chip.memory()[0x200..0x204], &[0x00, 0xE0, 0x12, 0x00]);
}

#[test]
fn load_error_messages() {
    let err = LoadError::TooLarge {
        size: 4000,
        max: 3584,
    };
    assert_eq!(err.to_string(), "ROM is larger than 3584 bytes");
}

struct CountingReader {
    remaining: usize,
    consumed: usize,
}

impl Read for CountingReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = buf.len().min(self.remaining);
        for b in &mut buf[..n] {
            *b = 0x6A;
        }
        self.remaining -= n;
        self.consumed += n;
        Ok(n)
    }
}

#[test]
fn huge_source_is_rejected_after_one_byte_past_the_limit() {
    let mut chip = Chip8::new();
    let mut src = CountingReader {
        remaining: 64 << 20,
        consumed: 0,
    };
    match chip.load_rom(&mut src) {
        Err(LoadError::TooLarge { size, .. }) => assert_eq!(size, MAX_ROM_SIZE + 1),
        other => panic!("expected TooLarge, got {:?}", other),
    }
    assert!(src.consumed <= MAX_ROM_SIZE + 1);
    assert!(!chip.is_loaded());
}

#[test]
fn endless_source_is_rejected() {
    let mut chip = Chip8::new();
    assert!(matches!(
        chip.load_rom(io::repeat(0x12)),
        Err(LoadError::TooLarge { .. })
    ));
    assert!(!chip.is_loaded());
}
