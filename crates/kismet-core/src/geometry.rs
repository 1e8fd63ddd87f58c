use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle, `left`/`top` in the same space as its siblings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn center_y(&self) -> f64 {
        self.top + self.height / 2.0
    }

    /// A rect with no area has not been laid out yet.
    pub fn is_laid_out(&self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.left.is_finite() && self.top.is_finite()
    }

    /// This rect expressed relative to `origin`'s top-left corner.
    pub fn relative_to(&self, origin: &Rect) -> Rect {
        Rect::new(
            self.left - origin.left,
            self.top - origin.top,
            self.width,
            self.height,
        )
    }
}
