//! Axis-aligned bounding boxes in XYXY pixel format.

use serde::{Deserialize, Serialize};

/// An axis-aligned bounding box (xmin, ymin, xmax, ymax) in pixel space,
/// with (0, 0) at the image's top-left corner and y growing downward.
///
/// Note: the constructor does NOT enforce min < max. Malformed boxes can be
/// represented; the reconstructor classifies and drops them rather than the
/// parser refusing the frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
}

impl BBox {
    /// Creates a bounding box from explicit corner coordinates.
    #[inline]
    pub fn from_xyxy(xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> Self {
        Self {
            xmin,
            ymin,
            xmax,
            ymax,
        }
    }

    /// Returns the width. May be negative for a malformed box.
    #[inline]
    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }

    /// Returns the height. May be negative for a malformed box.
    #[inline]
    pub fn height(&self) -> f64 {
        self.ymax - self.ymin
    }

    /// Returns the box center.
    #[inline]
    pub fn center(&self) -> (f64, f64) {
        (
            (self.xmin + self.xmax) / 2.0,
            (self.ymin + self.ymax) / 2.0,
        )
    }

    /// Returns the bottom-center point.
    ///
    /// Used as the cell-assignment reference for pieces: a tall piece's box
    /// extends upward well past the square it stands on, so its base, not
    /// its center, approximates where the piece actually sits.
    #[inline]
    pub fn bottom_center(&self) -> (f64, f64) {
        ((self.xmin + self.xmax) / 2.0, self.ymax)
    }

    /// Returns true if all coordinates are finite (not NaN or infinite).
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.xmin.is_finite()
            && self.ymin.is_finite()
            && self.xmax.is_finite()
            && self.ymax.is_finite()
    }

    /// Returns true if the box is properly ordered (min <= max on both axes).
    #[inline]
    pub fn is_ordered(&self) -> bool {
        self.xmin <= self.xmax && self.ymin <= self.ymax
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimensions() {
        let bbox = BBox::from_xyxy(10.0, 20.0, 100.0, 80.0);
        assert_eq!(bbox.width(), 90.0);
        assert_eq!(bbox.height(), 60.0);
    }

    #[test]
    fn reference_points() {
        let bbox = BBox::from_xyxy(10.0, 20.0, 30.0, 100.0);
        assert_eq!(bbox.center(), (20.0, 60.0));
        assert_eq!(bbox.bottom_center(), (20.0, 100.0));
    }

    #[test]
    fn ordering() {
        assert!(BBox::from_xyxy(10.0, 20.0, 100.0, 80.0).is_ordered());
        assert!(!BBox::from_xyxy(100.0, 80.0, 10.0, 20.0).is_ordered());
    }

    #[test]
    fn finiteness() {
        assert!(BBox::from_xyxy(0.0, 0.0, 1.0, 1.0).is_finite());
        assert!(!BBox::from_xyxy(f64::NAN, 0.0, 1.0, 1.0).is_finite());
    }
}
