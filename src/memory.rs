use std::io::{self, Read};

use crate::error::VmError;

// NB. addresses are u16 as per the chip-8; lengths are usize to stop endless casting

/// Represents the addressable memory of the machine. Every access is bounds
/// checked; nothing wraps around.
pub trait MemoryMap {
    /// write a chunk of bytes into "RAM"
    fn write(&mut self, data: &[u8], addr: u16) -> Result<(), VmError> {
        self.get_rw_slice(addr, data.len())?.copy_from_slice(data);
        Ok(())
    }

    fn read_byte(&self, addr: u16) -> Result<u8, VmError> {
        Ok(self.get_ro_slice(addr, 1)?[0])
    }

    fn write_byte(&mut self, addr: u16, value: u8) -> Result<(), VmError> {
        self.get_rw_slice(addr, 1)?[0] = value;
        Ok(())
    }

    /// get a big-endian two-byte word (opcodes)
    fn get_word(&self, addr: u16) -> Result<u16, VmError> {
        let word = self.get_ro_slice(addr, 2)?;
        Ok(u16::from_be_bytes([word[0], word[1]]))
    }

    /// get a r/w slice of the underlying memory
    fn get_rw_slice(&mut self, addr: u16, len: usize) -> Result<&mut [u8], VmError>;

    /// get a r/o slice of the underlying memory
    fn get_ro_slice(&self, addr: u16, len: usize) -> Result<&[u8], VmError>;
}

/// how much RAM we have
pub const CHIP8_RAM_SIZE_BYTES: usize = 4096;

/// where the program is loaded
pub const CHIP8_PROGRAM_ADDR: u16 = 0x0200;

/// largest program that fits between the program address and the top of RAM
pub const CHIP8_MAX_PROGRAM_BYTES: usize = CHIP8_RAM_SIZE_BYTES - CHIP8_PROGRAM_ADDR as usize;

/// where the hex font lives; glyph `n` starts at `n * CHIP8_FONT_GLYPH_BYTES`
pub const CHIP8_FONT_ADDR: u16 = 0x000;
pub const CHIP8_FONT_GLYPH_BYTES: u16 = 5;

/// Defines the CHIP-8 memory map:
///   0x0000-0x004f  hex font, 16 glyphs of 5 bytes
///   0x0050-0x01ff  unused, zeroed
///   0x0200-0x0fff  program and data
pub struct Chip8MemoryMap {
    bytes: Box<[u8]>,
}

impl MemoryMap for Chip8MemoryMap {
    fn get_rw_slice(&mut self, addr: u16, len: usize) -> Result<&mut [u8], VmError> {
        let a = Self::check_range(addr, len)?;
        Ok(&mut self.bytes[a..(a + len)])
    }

    fn get_ro_slice(&self, addr: u16, len: usize) -> Result<&[u8], VmError> {
        let a = Self::check_range(addr, len)?;
        Ok(&self.bytes[a..(a + len)])
    }
}

impl Chip8MemoryMap {
    /// zeroed memory with the font installed
    pub fn new() -> Self {
        let mut bytes = vec![0u8; CHIP8_RAM_SIZE_BYTES].into_boxed_slice();
        let font = CHIP8_FONT_ADDR as usize;
        bytes[font..font + CHIP8_FONT.len()].copy_from_slice(&CHIP8_FONT);
        Chip8MemoryMap { bytes }
    }

    /// load a CHIP-8 program at 0x200; oversized programs are rejected before
    /// anything is written, reading at most one byte past the limit
    pub fn load_program(&mut self, reader: &mut impl io::Read) -> Result<usize, VmError> {
        let mut buf = Vec::new();
        let len = reader
            .by_ref()
            .take(CHIP8_MAX_PROGRAM_BYTES as u64 + 1)
            .read_to_end(&mut buf)?;
        if len > CHIP8_MAX_PROGRAM_BYTES {
            return Err(VmError::RomTooLarge {
                size: len,
                max_size: CHIP8_MAX_PROGRAM_BYTES,
            });
        }
        self.write(&buf, CHIP8_PROGRAM_ADDR)?;
        Ok(len)
    }

    fn check_range(addr: u16, len: usize) -> Result<usize, VmError> {
        let a = addr as usize;
        if a + len > CHIP8_RAM_SIZE_BYTES {
            return Err(VmError::MemoryOutOfBounds {
                address: a.max(CHIP8_RAM_SIZE_BYTES),
            });
        }
        Ok(a)
    }
}

impl Default for Chip8MemoryMap {
    fn default() -> Self {
        Self::new()
    }
}

#[rustfmt::skip]
const CHIP8_FONT: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_zeroed() {
        let m = Chip8MemoryMap::new();
        // NB. only the font lives below 0x200
        assert_eq!(m.bytes[0x50..], [0; 0xfb0]);
    }

    #[test]
    fn test_font_installed() -> Result<(), VmError> {
        let m = Chip8MemoryMap::new();
        assert_eq!(m.get_ro_slice(0, 5)?, &[0xF0, 0x90, 0x90, 0x90, 0xF0]);
        // glyph F is the last one
        let f = 0xF * CHIP8_FONT_GLYPH_BYTES;
        assert_eq!(m.get_ro_slice(f, 5)?, &[0xF0, 0x80, 0xF0, 0x80, 0x80]);
        Ok(())
    }

    #[test]
    fn test_write_slice_ok() -> Result<(), VmError> {
        let mut dst = Chip8MemoryMap::new();
        dst.write(&[0, 1, 2, 3, 4, 5, 6, 7], 0x308)?;
        assert_eq!(
            dst.bytes[0x300..0x310],
            [0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 2, 3, 4, 5, 6, 7]
        );
        Ok(())
    }

    #[test]
    fn test_read_word() -> Result<(), VmError> {
        let mut m = Chip8MemoryMap::new();
        m.write(&[0, 1, 2, 3, 4, 5, 6, 7], 0x300)?;
        assert_eq!(m.get_word(0x304)?, 0x0405);
        Ok(())
    }

    #[test]
    fn test_last_byte_is_addressable() -> Result<(), VmError> {
        let mut m = Chip8MemoryMap::new();
        m.write_byte(0xfff, 0xab)?;
        assert_eq!(m.read_byte(0xfff)?, 0xab);
        Ok(())
    }

    #[test]
    fn test_read_past_end_fails() {
        let m = Chip8MemoryMap::new();
        assert!(matches!(
            m.get_word(0xfff),
            Err(VmError::MemoryOutOfBounds { address: 0x1000 })
        ));
        assert!(matches!(
            m.read_byte(0x1000),
            Err(VmError::MemoryOutOfBounds { address: 0x1000 })
        ));
    }

    #[test]
    fn test_write_past_end_leaves_memory_untouched() {
        let mut dst = Chip8MemoryMap::new();
        assert!(dst.write(&[1; 8], 4089).is_err());
        assert_eq!(dst.bytes[4089..], [0; 7]);
    }

    #[test]
    fn test_program_load_ok() -> Result<(), VmError> {
        let mut dst = Chip8MemoryMap::new();
        let mut prog: &[u8] = &[0x00, 0xe0]; // clear screen
        assert_eq!(dst.load_program(&mut prog)?, 2);
        assert_eq!(dst.get_ro_slice(0x200, 2)?, &[0x00, 0xe0]);
        Ok(())
    }

    #[test]
    fn test_program_filling_memory_loads() -> Result<(), VmError> {
        let mut dst = Chip8MemoryMap::new();
        let prog = vec![0x12; CHIP8_MAX_PROGRAM_BYTES];
        assert_eq!(dst.load_program(&mut prog.as_slice())?, 0xe00);
        assert_eq!(dst.read_byte(0xfff)?, 0x12);
        Ok(())
    }

    #[test]
    fn test_program_too_large() {
        let mut dst = Chip8MemoryMap::new();
        let prog = vec![0x12; CHIP8_MAX_PROGRAM_BYTES + 1];
        match dst.load_program(&mut prog.as_slice()) {
            Err(VmError::RomTooLarge { size, max_size }) => {
                assert_eq!(size, 0xe01);
                assert_eq!(max_size, 0xe00);
            }
            other => panic!("expected RomTooLarge, got {:?}", other),
        }
        assert_eq!(dst.bytes[0x200..], [0; 0xe00]);
    }

    #[test]
    fn test_load_endless_program_stops_reading() {
        let mut dst = Chip8MemoryMap::new();
        let mut src = io::repeat(0x12).take(64 << 20);
        assert!(matches!(
            dst.load_program(&mut src),
            Err(VmError::RomTooLarge { max_size: 0xe00, .. })
        ));
        // only the byte past the limit was consumed
        assert_eq!(src.limit(), (64 << 20) - 0xe01);
        assert_eq!(dst.bytes[0x200..], [0; 0xe00]);
    }
}
