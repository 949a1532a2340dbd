//! Inclusive integer index boxes

use serde::{Deserialize, Serialize};

/// Rectangular region of cell indices, inclusive on both ends
///
/// A box with `hi < lo` on any axis is empty. Offsets into a box are
/// x-fastest: `(k - lo.z) * ny * nx + (j - lo.y) * nx + (i - lo.x)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellBox {
    pub lo: [i32; 3],
    pub hi: [i32; 3],
}

impl CellBox {
    #[must_use]
    pub const fn new(lo: [i32; 3], hi: [i32; 3]) -> Self {
        Self { lo, hi }
    }

    /// Box covering `[0, n)` on each axis
    #[must_use]
    pub fn from_size(n: [usize; 3]) -> Self {
        Self {
            lo: [0; 3],
            hi: [n[0] as i32 - 1, n[1] as i32 - 1, n[2] as i32 - 1],
        }
    }

    /// An empty box
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            lo: [0; 3],
            hi: [-1; 3],
        }
    }

    pub fn is_empty(&self) -> bool {
        (0..3).any(|d| self.hi[d] < self.lo[d])
    }

    /// Number of cells along one axis
    pub fn length(&self, axis: usize) -> usize {
        if self.is_empty() {
            0
        } else {
            (self.hi[axis] - self.lo[axis] + 1) as usize
        }
    }

    pub fn size(&self) -> [usize; 3] {
        [self.length(0), self.length(1), self.length(2)]
    }

    pub fn num_cells(&self) -> usize {
        self.length(0) * self.length(1) * self.length(2)
    }

    pub fn contains(&self, cell: [i32; 3]) -> bool {
        (0..3).all(|d| cell[d] >= self.lo[d] && cell[d] <= self.hi[d])
    }

    /// True when every cell of `other` lies inside `self` (always true for an empty `other`)
    pub fn contains_box(&self, other: &CellBox) -> bool {
        other.is_empty() || (self.contains(other.lo) && self.contains(other.hi))
    }

    #[must_use]
    pub fn intersect(&self, other: &CellBox) -> CellBox {
        let mut out = *self;
        for d in 0..3 {
            out.lo[d] = self.lo[d].max(other.lo[d]);
            out.hi[d] = self.hi[d].min(other.hi[d]);
        }
        out
    }

    /// Grow (or shrink, for negative `n`) by `n` cells on every face
    #[must_use]
    pub fn grow(&self, n: i32) -> CellBox {
        if self.is_empty() {
            return *self;
        }
        CellBox {
            lo: [self.lo[0] - n, self.lo[1] - n, self.lo[2] - n],
            hi: [self.hi[0] + n, self.hi[1] + n, self.hi[2] + n],
        }
    }

    /// Linear offset of `cell` within this box
    #[inline]
    pub fn offset_of(&self, cell: [i32; 3]) -> usize {
        let [nx, ny, _] = self.size();
        let i = (cell[0] - self.lo[0]) as usize;
        let j = (cell[1] - self.lo[1]) as usize;
        let k = (cell[2] - self.lo[2]) as usize;
        k * (ny * nx) + j * nx + i
    }

    /// Inverse of [`CellBox::offset_of`]
    #[inline]
    pub fn cell_at(&self, offset: usize) -> [i32; 3] {
        let [nx, ny, _] = self.size();
        let i = offset % nx;
        let j = (offset / nx) % ny;
        let k = offset / (nx * ny);
        [
            self.lo[0] + i as i32,
            self.lo[1] + j as i32,
            self.lo[2] + k as i32,
        ]
    }
}

/// Chop `domain` into patches of at most `max_size` cells per axis
///
/// Stand-in for the host's load balancer. Patches tile the domain exactly,
/// ordered x-fastest.
pub fn partition(domain: &CellBox, max_size: usize) -> Vec<CellBox> {
    if domain.is_empty() || max_size == 0 {
        return Vec::new();
    }
    let step = max_size as i32;
    let mut patches = Vec::new();
    let mut k = domain.lo[2];
    while k <= domain.hi[2] {
        let mut j = domain.lo[1];
        while j <= domain.hi[1] {
            let mut i = domain.lo[0];
            while i <= domain.hi[0] {
                patches.push(CellBox::new(
                    [i, j, k],
                    [
                        (i + step - 1).min(domain.hi[0]),
                        (j + step - 1).min(domain.hi[1]),
                        (k + step - 1).min(domain.hi[2]),
                    ],
                ));
                i += step;
            }
            j += step;
        }
        k += step;
    }
    patches
}
