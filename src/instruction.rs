use std::fmt;

/// A decoded CHIP-8 instruction. `x`/`y` are register indices, `nn` an 8-bit
/// immediate, `nnn` a 12-bit address and `n` a 4-bit sprite height.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// 00E0
    ClearScreen,
    /// 00EE
    Return,
    /// 1NNN
    Jump { nnn: u16 },
    /// 2NNN
    Call { nnn: u16 },
    /// 3XNN
    SkipIfEqualImm { x: u8, nn: u8 },
    /// 4XNN
    SkipIfNotEqualImm { x: u8, nn: u8 },
    /// 5XY0
    SkipIfEqual { x: u8, y: u8 },
    /// 6XNN
    LoadImm { x: u8, nn: u8 },
    /// 7XNN
    AddImm { x: u8, nn: u8 },
    /// 8XY0
    Move { x: u8, y: u8 },
    /// 8XY1
    Or { x: u8, y: u8 },
    /// 8XY2
    And { x: u8, y: u8 },
    /// 8XY3
    Xor { x: u8, y: u8 },
    /// 8XY4
    Add { x: u8, y: u8 },
    /// 8XY5
    Sub { x: u8, y: u8 },
    /// 8XY6
    ShiftRight { x: u8 },
    /// 8XY7
    SubReverse { x: u8, y: u8 },
    /// 8XYE
    ShiftLeft { x: u8 },
    /// 9XY0
    SkipIfNotEqual { x: u8, y: u8 },
    /// ANNN
    LoadIndex { nnn: u16 },
    /// BNNN
    JumpOffset { nnn: u16 },
    /// CXNN
    Random { x: u8, nn: u8 },
    /// DXYN
    Draw { x: u8, y: u8, n: u8 },
    /// EX9E
    SkipIfKey { x: u8 },
    /// EXA1
    SkipIfNotKey { x: u8 },
    /// FX07
    LoadDelay { x: u8 },
    /// FX0A
    WaitKey { x: u8 },
    /// FX15
    SetDelay { x: u8 },
    /// FX18
    SetSound { x: u8 },
    /// FX1E
    AddIndex { x: u8 },
    /// FX29
    LoadGlyph { x: u8 },
    /// FX33
    StoreBcd { x: u8 },
    /// FX55
    StoreRegisters { x: u8 },
    /// FX65
    LoadRegisters { x: u8 },
    /// anything else; executes as a two-byte no-op
    Unknown(u16),
}

impl Instruction {
    pub fn decode(opcode: u16) -> Self {
        use Instruction::*;

        let nibbles = (
            (opcode >> 12) as u8,
            (opcode >> 8 & 0xF) as u8,
            (opcode >> 4 & 0xF) as u8,
            (opcode & 0xF) as u8,
        );
        let nnn = opcode & 0x0FFF;
        let nn = (opcode & 0x00FF) as u8;

        match nibbles {
            (0x0, 0x0, 0xE, 0x0) => ClearScreen,
            (0x0, 0x0, 0xE, 0xE) => Return,
            (0x1, _, _, _) => Jump { nnn },
            (0x2, _, _, _) => Call { nnn },
            (0x3, x, _, _) => SkipIfEqualImm { x, nn },
            (0x4, x, _, _) => SkipIfNotEqualImm { x, nn },
            (0x5, x, y, 0x0) => SkipIfEqual { x, y },
            (0x6, x, _, _) => LoadImm { x, nn },
            (0x7, x, _, _) => AddImm { x, nn },
            (0x8, x, y, 0x0) => Move { x, y },
            (0x8, x, y, 0x1) => Or { x, y },
            (0x8, x, y, 0x2) => And { x, y },
            (0x8, x, y, 0x3) => Xor { x, y },
            (0x8, x, y, 0x4) => Add { x, y },
            (0x8, x, y, 0x5) => Sub { x, y },
            (0x8, x, _, 0x6) => ShiftRight { x },
            (0x8, x, y, 0x7) => SubReverse { x, y },
            (0x8, x, _, 0xE) => ShiftLeft { x },
            (0x9, x, y, 0x0) => SkipIfNotEqual { x, y },
            (0xA, _, _, _) => LoadIndex { nnn },
            (0xB, _, _, _) => JumpOffset { nnn },
            (0xC, x, _, _) => Random { x, nn },
            (0xD, x, y, n) => Draw { x, y, n },
            (0xE, x, 0x9, 0xE) => SkipIfKey { x },
            (0xE, x, 0xA, 0x1) => SkipIfNotKey { x },
            (0xF, x, 0x0, 0x7) => LoadDelay { x },
            (0xF, x, 0x0, 0xA) => WaitKey { x },
            (0xF, x, 0x1, 0x5) => SetDelay { x },
            (0xF, x, 0x1, 0x8) => SetSound { x },
            (0xF, x, 0x1, 0xE) => AddIndex { x },
            (0xF, x, 0x2, 0x9) => LoadGlyph { x },
            (0xF, x, 0x3, 0x3) => StoreBcd { x },
            (0xF, x, 0x5, 0x5) => StoreRegisters { x },
            (0xF, x, 0x6, 0x5) => LoadRegisters { x },
            _ => Unknown(opcode),
        }
    }

    /// decode a big-endian byte pair as it sits in memory
    pub fn from_bytes(hi: u8, lo: u8) -> Self {
        Self::decode(u16::from_be_bytes([hi, lo]))
    }
}

/// assembler-style mnemonics, for diagnostics
impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Instruction::*;

        match *self {
            ClearScreen => write!(f, "CLS"),
            Return => write!(f, "RET"),
            Jump { nnn } => write!(f, "JP {:#05x}", nnn),
            Call { nnn } => write!(f, "CALL {:#05x}", nnn),
            SkipIfEqualImm { x, nn } => write!(f, "SE V{:X}, {:#04x}", x, nn),
            SkipIfNotEqualImm { x, nn } => write!(f, "SNE V{:X}, {:#04x}", x, nn),
            SkipIfEqual { x, y } => write!(f, "SE V{:X}, V{:X}", x, y),
            LoadImm { x, nn } => write!(f, "LD V{:X}, {:#04x}", x, nn),
            AddImm { x, nn } => write!(f, "ADD V{:X}, {:#04x}", x, nn),
            Move { x, y } => write!(f, "LD V{:X}, V{:X}", x, y),
            Or { x, y } => write!(f, "OR V{:X}, V{:X}", x, y),
            And { x, y } => write!(f, "AND V{:X}, V{:X}", x, y),
            Xor { x, y } => write!(f, "XOR V{:X}, V{:X}", x, y),
            Add { x, y } => write!(f, "ADD V{:X}, V{:X}", x, y),
            Sub { x, y } => write!(f, "SUB V{:X}, V{:X}", x, y),
            ShiftRight { x } => write!(f, "SHR V{:X}", x),
            SubReverse { x, y } => write!(f, "SUBN V{:X}, V{:X}", x, y),
            ShiftLeft { x } => write!(f, "SHL V{:X}", x),
            SkipIfNotEqual { x, y } => write!(f, "SNE V{:X}, V{:X}", x, y),
            LoadIndex { nnn } => write!(f, "LD I, {:#05x}", nnn),
            JumpOffset { nnn } => write!(f, "JP V0, {:#05x}", nnn),
            Random { x, nn } => write!(f, "RND V{:X}, {:#04x}", x, nn),
            Draw { x, y, n } => write!(f, "DRW V{:X}, V{:X}, {}", x, y, n),
            SkipIfKey { x } => write!(f, "SKP V{:X}", x),
            SkipIfNotKey { x } => write!(f, "SKNP V{:X}", x),
            LoadDelay { x } => write!(f, "LD V{:X}, DT", x),
            WaitKey { x } => write!(f, "LD V{:X}, K", x),
            SetDelay { x } => write!(f, "LD DT, V{:X}", x),
            SetSound { x } => write!(f, "LD ST, V{:X}", x),
            AddIndex { x } => write!(f, "ADD I, V{:X}", x),
            LoadGlyph { x } => write!(f, "LD F, V{:X}", x),
            StoreBcd { x } => write!(f, "LD B, V{:X}", x),
            StoreRegisters { x } => write!(f, "LD [I], V{:X}", x),
            LoadRegisters { x } => write!(f, "LD V{:X}, [I]", x),
            Unknown(opcode) => write!(f, "DW {:#06x}", opcode),
        }
    }
}
