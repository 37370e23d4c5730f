pub const WIDTH: usize = 64;
pub const HEIGHT: usize = 32;

/// 64x32 monochrome display, one byte (0 or 1) per cell, row-major
#[derive(Clone)]
pub struct Framebuffer {
    cells: [u8; WIDTH * HEIGHT],
}

impl Default for Framebuffer {
    fn default() -> Self {
        Self {
            cells: [0; WIDTH * HEIGHT],
        }
    }
}

impl Framebuffer {
    pub fn clear(&mut self) {
        self.cells = [0; WIDTH * HEIGHT];
    }

    /// XOR an 8-pixel-wide sprite onto the display with its top-left corner at
    /// (x, y). The origin wraps onto the screen, but pixels that would land
    /// past the right or bottom edge are dropped.
    ///
    /// Returns true if any lit cell was switched off.
    pub fn draw_sprite(&mut self, x: u8, y: u8, rows: &[u8]) -> bool {
        let x0 = x as usize % WIDTH;
        let y0 = y as usize % HEIGHT;

        let mut collision = false;
        for (row, bits) in rows.iter().enumerate() {
            let py = y0 + row;
            if py >= HEIGHT {
                break;
            }
            for p in 0..8 {
                // iter bit shift across sprite row, MSB is leftmost
                if bits & (0x80 >> p) == 0 {
                    continue;
                }
                let px = x0 + p;
                if px >= WIDTH {
                    break;
                }
                let cell = &mut self.cells[py * WIDTH + px];
                if *cell == 1 {
                    collision = true;
                }
                *cell ^= 1;
            }
        }
        collision
    }

    pub fn get(&self, x: usize, y: usize) -> bool {
        x < WIDTH && y < HEIGHT && self.cells[y * WIDTH + x] == 1
    }

    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    /// iterate the coordinates of every lit cell
    pub fn lit(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, p)| **p == 1)
            .map(|(i, _)| (i % WIDTH, i / WIDTH))
    }
}
