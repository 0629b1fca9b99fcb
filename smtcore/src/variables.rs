//! Variable count tracking.
//!
//! The teacher's incremental solver kept a three-tier user/global/solver variable renaming scheme
//! here to support variable hiding and assumption-based incrementality. That scheme is out of scope
//! (see [`crate::theory`]'s sibling decision to drop `Incremental`, and DESIGN.md); atoms are
//! created once, directly as solver variables, by [`crate::atoms::AtomTable`], so this module only
//! needs to track how many solver variables exist.

/// Number of solver variables currently allocated.
#[derive(Default)]
pub struct Variables {
    watermark: usize,
}

impl Variables {
    /// Number of allocated solver variables.
    pub fn solver_watermark(&self) -> usize {
        self.watermark
    }

    /// Raise the watermark to at least `count`.
    pub fn set_watermark(&mut self, count: usize) {
        self.watermark = self.watermark.max(count);
    }
}
