#![forbid(unsafe_code)]

//! Layout sizes reported by the renderer.

/// Width and height of a laid-out element, in device pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    /// Zero-area size.
    pub const ZERO: Self = Self::new(0, 0);

    /// Create a new size.
    #[inline]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Whether the size covers no area in either dimension.
    ///
    /// Matches the browser's `offsetWidth || offsetHeight` visibility test:
    /// a size is empty only when both sides are zero.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.width == 0 && self.height == 0
    }
}
