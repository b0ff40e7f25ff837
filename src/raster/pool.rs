//! Per-canvas scratch buffer pools.
//!
//! Span fills and mask compositing need transient buffers every frame;
//! pooling them per canvas keeps the hot path allocation-free without any
//! cross-canvas locking. Worker-side rasterization allocates its own
//! output instead, which is cached across frames by the outline cache.

/// Reusable scratch storage owned by one renderer.
#[derive(Default)]
pub(crate) struct ScratchPools {
    /// Premultiplied sample row for gradient span fills.
    pub scanline: Vec<u32>,
    /// Off-screen pixel buffers for alpha/luma masks.
    mask_bufs: Vec<Vec<u32>>,
    /// Coverage byte buffers for clip-path masks.
    cov_bufs: Vec<Vec<u8>>,
}

impl ScratchPools {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take_mask_buf(&mut self, len: usize) -> Vec<u32> {
        let mut buf = self.mask_bufs.pop().unwrap_or_default();
        buf.clear();
        buf.resize(len, 0);
        buf
    }

    pub fn put_mask_buf(&mut self, buf: Vec<u32>) {
        self.mask_bufs.push(buf);
    }

    pub fn take_cov_buf(&mut self, len: usize) -> Vec<u8> {
        let mut buf = self.cov_bufs.pop().unwrap_or_default();
        buf.clear();
        buf.resize(len, 0);
        buf
    }

    pub fn put_cov_buf(&mut self, buf: Vec<u8>) {
        self.cov_bufs.push(buf);
    }

    /// Memory hygiene between frames; a no-op while capacities stay small.
    pub fn trim(&mut self) {
        self.mask_bufs.truncate(4);
        self.cov_bufs.truncate(4);
        self.scanline.shrink_to(4096);
    }
}
