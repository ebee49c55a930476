/// number of general purpose registers, V0..VF
pub const REGISTER_COUNT: usize = 16;

/// the register that doubles as carry/borrow/collision flag
pub const FLAG_REGISTER: u8 = 0xF;

/// The sixteen 8-bit V registers plus the 16-bit I (index) register.
///
/// Register indices come from 4-bit opcode fields, so they are masked to
/// 0x0..=0xF rather than checked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterFile {
    v: [u8; REGISTER_COUNT],
    pub i: u16,
}

impl RegisterFile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, x: u8) -> u8 {
        self.v[(x & 0xF) as usize]
    }

    pub fn set(&mut self, x: u8, value: u8) {
        self.v[(x & 0xF) as usize] = value;
    }

    /// VF := 1 or 0
    pub fn set_flag(&mut self, flag: bool) {
        self.set(FLAG_REGISTER, flag as u8);
    }

    pub fn flag(&self) -> u8 {
        self.get(FLAG_REGISTER)
    }

    /// V0..=Vx
    pub fn up_to(&self, x: u8) -> &[u8] {
        &self.v[..=(x & 0xF) as usize]
    }

    /// V0..=Vx, mutably
    pub fn up_to_mut(&mut self, x: u8) -> &mut [u8] {
        &mut self.v[..=(x & 0xF) as usize]
    }
}
