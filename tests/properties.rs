use chip8::{Chip8, Keypad};
use proptest::prelude::*;

fn machine(program: &[u8], regs: [u8; 16]) -> Chip8 {
    let mut chip = Chip8::with_seed(3);
    chip.load_rom(program).unwrap();
    for (x, v) in regs.iter().enumerate() {
        chip.set_register(x, *v);
    }
    chip
}

proptest! {
    #[test]
    fn load_immediate_touches_only_vx(x in 0usize..16, nn in any::<u8>(), regs in any::<[u8; 16]>()) {
        let mut chip = machine(&[0x60 | x as u8, nn], regs);
        chip.step(&Keypad::default()).unwrap();

        let mut expected = regs;
        expected[x] = nn;
        prop_assert_eq!(chip.registers(), &expected);
        prop_assert_eq!(chip.pc(), 0x202);
    }

    #[test]
    fn add_registers_matches_widened_sum(a in any::<u8>(), b in any::<u8>()) {
        let mut regs = [0; 16];
        regs[1] = a;
        regs[2] = b;
        let mut chip = machine(&[0x81, 0x24], regs);
        chip.step(&Keypad::default()).unwrap();

        let sum = a as u16 + b as u16;
        prop_assert_eq!(chip.registers()[1], (sum & 0xFF) as u8);
        prop_assert_eq!(chip.registers()[0xF], (sum > 0xFF) as u8);
    }

    #[test]
    fn store_then_load_round_trips(x in 0usize..16, regs in any::<[u8; 16]>(), i in 0x300u16..0xF00) {
        // FX55, scramble V0..VX, FX65
        let op = 0xF0 | x as u8;
        let mut chip = machine(&[op, 0x55, op, 0x65], regs);
        chip.set_index(i);
        let keys = Keypad::default();

        chip.step(&keys).unwrap();
        for r in 0..=x {
            chip.set_register(r, !regs[r]);
        }
        chip.step(&keys).unwrap();

        prop_assert_eq!(&chip.registers()[..=x], &regs[..=x]);
        prop_assert_eq!(&chip.memory()[i as usize..=i as usize + x], &regs[..=x]);
        prop_assert_eq!(chip.index(), i);
    }
}
