//! Shared trial buffers
//!
//! One `x` and one `y` allocation serve every trial of a sweep. Each thread
//! works on its own `n`-element chunk of both, so the buffers are shared
//! without locking and without overlapping writes.

/// Initial value of every `x` element.
pub const X_INIT: f32 = 1.0;

/// `x`/`y` storage for `threads` disjoint chunks.
#[derive(Debug, Default)]
pub struct Buffers {
    x: Vec<f32>,
    y: Vec<f32>,
}

impl Buffers {
    /// Empty buffers; storage is allocated by [`Buffers::prepare`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Grow storage to hold `threads` chunks of `n` elements.
    ///
    /// Storage only grows, so a sweep allocates once per new maximum length.
    pub fn ensure(&mut self, n: usize, threads: usize) {
        let len = n * threads;
        if self.x.len() < len {
            self.x.resize(len, X_INIT);
            self.y.resize(len, 0.0);
        }
    }

    /// [`Buffers::ensure`], then reset the used part of `y` to zero.
    pub fn prepare(&mut self, n: usize, threads: usize) {
        self.ensure(n, threads);
        self.y[..n * threads].fill(0.0);
    }

    /// Per-thread `(x, y)` chunks of `n` elements.
    pub fn chunks(&mut self, n: usize, threads: usize) -> Vec<(&[f32], &mut [f32])> {
        let len = n * threads;
        self.x[..len]
            .chunks(n)
            .zip(self.y[..len].chunks_mut(n))
            .collect()
    }

    /// Allocated elements per buffer
    pub fn capacity(&self) -> usize {
        self.x.len()
    }
}
