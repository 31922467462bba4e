//! Pure dimension math for the fit-inside, never-upscale resize.

use serde::{Deserialize, Serialize};

/// Pixel dimensions of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Box an image has to fit inside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub max_width: u32,
    pub max_height: u32,
}

impl BoundingBox {
    pub fn square(max_dimension: u32) -> Self {
        Self {
            max_width: max_dimension,
            max_height: max_dimension,
        }
    }

    /// Largest size that fits inside the box with the original aspect ratio.
    ///
    /// Images already inside the box come back unchanged, so no edge ever
    /// grows. Neither edge shrinks below one pixel.
    ///
    /// # Examples
    /// ```
    /// # use pixfit_core::pipeline::{BoundingBox, Dimensions};
    /// let fitted = BoundingBox::square(1000).fit(Dimensions::new(4000, 3000));
    /// assert_eq!(fitted, Dimensions::new(1000, 750));
    ///
    /// let small = BoundingBox::square(1000).fit(Dimensions::new(640, 480));
    /// assert_eq!(small, Dimensions::new(640, 480));
    /// ```
    pub fn fit(&self, original: Dimensions) -> Dimensions {
        let Dimensions { width, height } = original;
        if width == 0 || height == 0 {
            return original;
        }
        if width <= self.max_width && height <= self.max_height {
            return original;
        }

        let scale_w = self.max_width as f64 / width as f64;
        let scale_h = self.max_height as f64 / height as f64;

        if scale_w <= scale_h {
            // Width is the binding edge
            let h = (height as f64 * scale_w).round() as u32;
            Dimensions::new(self.max_width.max(1), h.clamp(1, self.max_height.max(1)))
        } else {
            let w = (width as f64 * scale_h).round() as u32;
            Dimensions::new(w.clamp(1, self.max_width.max(1)), self.max_height.max(1))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_landscape_downscale() {
        let fitted = BoundingBox::square(2560).fit(Dimensions::new(6000, 4000));
        assert_eq!(fitted, Dimensions::new(2560, 1707));
    }

    #[test]
    fn test_portrait_downscale() {
        let fitted = BoundingBox::square(1000).fit(Dimensions::new(3000, 4000));
        assert_eq!(fitted, Dimensions::new(750, 1000));
    }

    #[test]
    fn test_square_downscale() {
        let fitted = BoundingBox::square(500).fit(Dimensions::new(2000, 2000));
        assert_eq!(fitted, Dimensions::new(500, 500));
    }

    #[test]
    fn test_never_upscales() {
        for (w, h) in [(100, 50), (1000, 1000), (1, 999), (999, 1)] {
            let original = Dimensions::new(w, h);
            assert_eq!(BoundingBox::square(1000).fit(original), original);
        }
    }

    #[test]
    fn test_one_edge_over_limit() {
        let fitted = BoundingBox::square(1000).fit(Dimensions::new(1200, 300));
        assert_eq!(fitted, Dimensions::new(1000, 250));
    }

    #[test]
    fn test_extreme_aspect_keeps_one_pixel() {
        let fitted = BoundingBox::square(100).fit(Dimensions::new(100_000, 10));
        assert_eq!(fitted, Dimensions::new(100, 1));
    }

    #[test]
    fn test_fitted_never_exceeds_box_or_original() {
        let boxes = [BoundingBox::square(64), BoundingBox::square(333)];
        let sizes = [(65, 64), (640, 480), (123, 4567), (333, 334), (10, 10)];
        for bbox in boxes {
            for (w, h) in sizes {
                let fitted = bbox.fit(Dimensions::new(w, h));
                assert!(fitted.width <= w && fitted.height <= h);
                assert!(fitted.width <= bbox.max_width && fitted.height <= bbox.max_height);
            }
        }
    }
}
