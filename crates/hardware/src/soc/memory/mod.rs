//! Backing storage for memory regions.

/// A contiguous, byte-addressable storage region mapped at a base address.
#[derive(Clone, Debug)]
pub struct Memory {
    base: u32,
    bytes: Vec<u8>,
}

impl Memory {
    /// Creates a zero-filled region.
    ///
    /// # Arguments
    ///
    /// * `base` - Physical base address.
    /// * `size` - Size in bytes.
    pub fn new(base: u32, size: u32) -> Self {
        Self {
            base,
            bytes: vec![0; size as usize],
        }
    }

    /// Base address of the region.
    pub const fn base(&self) -> u32 {
        self.base
    }

    /// Size of the region in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns true for a zero-sized region.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Byte offset of `addr` if `len` bytes from it lie inside the region.
    fn offset(&self, addr: u32, len: usize) -> Option<usize> {
        let off = addr.checked_sub(self.base)? as usize;
        (off.checked_add(len)? <= self.bytes.len()).then_some(off)
    }

    /// Returns true if the aligned word at `addr` lies inside the region.
    pub fn contains(&self, addr: u32) -> bool {
        self.offset(addr & !3, 4).is_some()
    }

    /// Reads the aligned word containing `addr`.
    pub fn read_word(&self, addr: u32) -> Option<u32> {
        let off = self.offset(addr & !3, 4)?;
        let b = &self.bytes[off..off + 4];
        Some(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// Writes the bytes of `data` selected by `mask` into the word at `addr`.
    ///
    /// # Returns
    ///
    /// `false` if the word lies outside the region.
    pub fn write_word(&mut self, addr: u32, data: u32, mask: u8) -> bool {
        let Some(off) = self.offset(addr & !3, 4) else {
            return false;
        };
        for (i, byte) in data.to_le_bytes().iter().enumerate() {
            if mask & (1 << i) != 0 {
                self.bytes[off + i] = *byte;
            }
        }
        true
    }

    /// Copies `data` into the region starting at `addr`.
    ///
    /// # Returns
    ///
    /// `false` if any part falls outside the region; nothing is written then.
    pub fn load(&mut self, addr: u32, data: &[u8]) -> bool {
        let Some(off) = self.offset(addr, data.len()) else {
            return false;
        };
        self.bytes[off..off + data.len()].copy_from_slice(data);
        true
    }
}
