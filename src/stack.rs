/// how many nested calls the machine supports
pub const STACK_DEPTH: usize = 16;

/// Fixed-depth return address stack. The pointer is the next free slot, so it
/// runs 0..=STACK_DEPTH.
#[derive(Debug, Clone, Default)]
pub struct Stack {
    frames: [u16; STACK_DEPTH],
    sp: usize,
}

impl Stack {
    pub fn new() -> Self {
        Self::default()
    }

    /// push a return address; false, and nothing pushed, when every frame
    /// is in use
    pub fn push(&mut self, addr: u16) -> bool {
        match self.frames.get_mut(self.sp) {
            Some(slot) => {
                *slot = addr;
                self.sp += 1;
                true
            }
            None => false,
        }
    }

    /// pop the most recent return address; `None` when empty
    pub fn pop(&mut self) -> Option<u16> {
        self.sp = self.sp.checked_sub(1)?;
        Some(self.frames[self.sp])
    }

    pub fn depth(&self) -> usize {
        self.sp
    }

    pub fn is_empty(&self) -> bool {
        self.sp == 0
    }

    pub fn is_full(&self) -> bool {
        self.sp == STACK_DEPTH
    }
}
