use std::ops::Mul;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect<T> {
    pub x: T,
    pub y: T,
    pub width: T,
    pub height: T,
}

impl<T> Rect<T> {
    pub const fn new(x: T, y: T, width: T, height: T) -> Self {
        Rect {
            x,
            y,
            width,
            height,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Size<T> {
    pub width: T,
    pub height: T,
}

impl<T> Size<T> {
    pub const fn new(width: T, height: T) -> Self {
        Size { width, height }
    }

    pub fn cast<U: From<T>>(self) -> Size<U> {
        Size {
            width: U::from(self.width),
            height: U::from(self.height),
        }
    }
}

impl<T: Mul + Copy> Mul<T> for Size<T> {
    type Output = Size<<T as Mul>::Output>;

    fn mul(self, rhs: T) -> Self::Output {
        Size {
            width: self.width * rhs,
            height: self.height * rhs,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Pos<T> {
    pub x: T,
    pub y: T,
}

/// An edge-described rectangle in window pixels.
///
/// This is the layout the host windowing system reports content and visible
/// frames in. A `Bounds` with `right <= left` or `bottom <= top` is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Bounds {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Bounds {
    pub const ZERO: Bounds = Bounds::new(0, 0, 0, 0);

    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    #[inline]
    pub const fn width(&self) -> i32 {
        self.right - self.left
    }

    #[inline]
    pub const fn height(&self) -> i32 {
        self.bottom - self.top
    }

    /// Area in pixels. Negative extents count as zero.
    pub fn area(&self) -> i64 {
        i64::from(self.width().max(0)) * i64::from(self.height().max(0))
    }

    pub const fn is_empty(&self) -> bool {
        self.width() <= 0 || self.height() <= 0
    }

    /// Converts to an origin + extent rectangle.
    pub fn to_rect(&self) -> Rect<f64> {
        Rect::new(
            f64::from(self.left),
            f64::from(self.top),
            f64::from(self.width()),
            f64::from(self.height()),
        )
    }
}

/// Distances from each window edge to the unobstructed content area.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Insets {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Insets {
    pub const ZERO: Insets = Insets::new(0.0, 0.0, 0.0, 0.0);

    pub const fn new(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_extent() {
        let bounds = Bounds::new(0, 1500, 1000, 2000);
        assert_eq!(bounds.width(), 1000);
        assert_eq!(bounds.height(), 500);
        assert_eq!(bounds.area(), 500_000);
        assert!(!bounds.is_empty());
        assert_eq!(bounds.to_rect(), Rect::new(0.0, 1500.0, 1000.0, 500.0));
    }

    #[test]
    fn inverted_bounds_are_empty() {
        let bounds = Bounds::new(10, 10, 5, 20);
        assert!(bounds.is_empty());
        assert_eq!(bounds.area(), 0);
    }

    #[test]
    fn size_scaling() {
        let size = Size::new(2.0, 3.0) * 2.0;
        assert_eq!(size, Size::new(4.0, 6.0));
        let wide: Size<u64> = Size::new(4u32, 5u32).cast();
        assert_eq!(wide.width, 4u64);
    }
}
