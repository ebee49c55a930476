//! The machine's monochrome framebuffer. The interpreter writes it; a
//! renderer reads it whenever `take_dirty` says something changed.

pub const SCREEN_WIDTH: usize = 64;
pub const SCREEN_HEIGHT: usize = 32;

/// 64x32 grid of pixels stored one per byte as 0 or 1, row major
#[derive(Clone)]
pub struct Display {
    pixels: [u8; SCREEN_WIDTH * SCREEN_HEIGHT],
    dirty: bool,
}

impl Display {
    pub fn new() -> Self {
        Display {
            pixels: [0; SCREEN_WIDTH * SCREEN_HEIGHT],
            dirty: false,
        }
    }

    /// zero every pixel
    pub fn clear(&mut self) {
        self.pixels = [0; SCREEN_WIDTH * SCREEN_HEIGHT];
        self.dirty = true;
    }

    /// XOR a sprite onto the grid with its top-left corner at (x, y). Each
    /// row byte is 8 pixels wide, MSB leftmost; pixels past an edge wrap to
    /// the opposite one. Returns true if any lit pixel was switched off.
    pub fn draw(&mut self, rows: &[u8], x: u8, y: u8) -> bool {
        let mut collided = false;
        for (r, row) in rows.iter().enumerate() {
            let py = (y as usize + r) % SCREEN_HEIGHT;
            for c in 0..8 {
                if row & (0x80 >> c) == 0 {
                    continue;
                }
                let px = (x as usize + c) % SCREEN_WIDTH;
                let pixel = &mut self.pixels[py * SCREEN_WIDTH + px];
                if *pixel == 1 {
                    collided = true;
                }
                *pixel ^= 1;
            }
        }
        self.dirty = true;
        collided
    }

    /// Checks and clears the dirty flag
    pub fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// 0 or 1; coordinates wrap like sprite drawing does
    pub fn pixel(&self, x: usize, y: usize) -> u8 {
        self.pixels[(y % SCREEN_HEIGHT) * SCREEN_WIDTH + x % SCREEN_WIDTH]
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// rows of SCREEN_WIDTH pixels, top to bottom
    pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
        self.pixels.chunks(SCREEN_WIDTH)
    }

    /// (x, y) of every lit pixel
    pub fn lit(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.pixels
            .iter()
            .enumerate()
            .filter(|(_, p)| **p == 1)
            .map(|(i, _)| (i % SCREEN_WIDTH, i / SCREEN_WIDTH))
    }
}

impl Default for Display {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_display_is_blank_and_clean() {
        let mut d = Display::new();
        assert!(d.pixels().iter().all(|p| *p == 0));
        assert!(!d.take_dirty());
    }

    #[test]
    fn test_draw_one_row() {
        let mut d = Display::new();
        let collided = d.draw(&[0b10101011], 8, 2);
        assert!(!collided);
        let row: Vec<u8> = d.rows().nth(2).unwrap()[7..17].to_vec();
        assert_eq!(row, vec![0, 1, 0, 1, 0, 1, 0, 1, 1, 0]);
        assert_eq!(d.lit().count(), 5);
    }

    #[test]
    fn test_draw_multi_row() {
        let mut d = Display::new();
        d.draw(&[0x80, 0x40, 0x20], 0, 0);
        assert_eq!(d.lit().collect::<Vec<_>>(), vec![(0, 0), (1, 1), (2, 2)]);
    }

    #[test]
    fn test_draw_collision_switches_pixel_off() {
        let mut d = Display::new();
        d.draw(&[0b11000000], 10, 10);
        let collided = d.draw(&[0b01100000], 10, 10);
        assert!(collided);
        assert_eq!(d.pixel(10, 10), 1);
        assert_eq!(d.pixel(11, 10), 0);
        assert_eq!(d.pixel(12, 10), 1);
    }

    #[test]
    fn test_draw_without_overlap_does_not_collide() {
        let mut d = Display::new();
        d.draw(&[0b11110000], 0, 0);
        assert!(!d.draw(&[0b00001111], 0, 0));
        assert_eq!(d.lit().count(), 8);
    }

    #[test]
    fn test_draw_wraps_horizontally() {
        let mut d = Display::new();
        d.draw(&[0xff], 60, 0);
        assert_eq!(
            d.lit().collect::<Vec<_>>(),
            vec![(0, 0), (1, 0), (2, 0), (3, 0), (60, 0), (61, 0), (62, 0), (63, 0)]
        );
    }

    #[test]
    fn test_draw_wraps_vertically() {
        let mut d = Display::new();
        d.draw(&[0x80, 0x80, 0x80], 5, 31);
        assert_eq!(d.lit().collect::<Vec<_>>(), vec![(5, 0), (5, 1), (5, 31)]);
    }

    #[test]
    fn test_draw_start_coordinates_wrap() {
        let mut d = Display::new();
        d.draw(&[0x80], 64 + 3, 32 + 4);
        assert_eq!(d.pixel(3, 4), 1);
    }

    #[test]
    fn test_draw_twice_restores_grid() {
        let mut d = Display::new();
        let sprite = [0x3c, 0x42, 0x81, 0xff];
        assert!(!d.draw(&sprite, 30, 14));
        assert!(d.draw(&sprite, 30, 14));
        assert!(d.pixels().iter().all(|p| *p == 0));
    }

    #[test]
    fn test_clear_marks_dirty() {
        let mut d = Display::new();
        d.draw(&[0xff], 0, 0);
        assert!(d.take_dirty());
        d.clear();
        assert!(d.is_dirty());
        assert!(d.take_dirty());
        assert!(!d.take_dirty());
        assert_eq!(d.lit().count(), 0);
    }
}
