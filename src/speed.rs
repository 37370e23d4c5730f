pub const DEFAULT_CYCLES_PER_FRAME: u32 = 10;

/// How many instructions the host runs per 60Hz frame. Changing it never
/// touches machine state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Speed {
    cycles_per_frame: u32,
}

impl Default for Speed {
    fn default() -> Self {
        Self::new(DEFAULT_CYCLES_PER_FRAME)
    }
}

impl Speed {
    /// at least one cycle per frame
    pub fn new(cycles_per_frame: u32) -> Self {
        Self {
            cycles_per_frame: cycles_per_frame.max(1),
        }
    }

    pub fn cycles_per_frame(self) -> u32 {
        self.cycles_per_frame
    }

    pub fn faster(&mut self) {
        self.cycles_per_frame = self.cycles_per_frame.saturating_add(1);
    }

    pub fn slower(&mut self) {
        if self.cycles_per_frame > 1 {
            self.cycles_per_frame -= 1;
        }
    }
}
