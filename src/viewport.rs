//! Viewport tracking for window resizes.
//!
//! The viewport stores the logical window size and the device pixel ratio,
//! clamped to [`MAX_PIXEL_RATIO`]. The camera reads its aspect ratio from here
//! and the renderer sizes its scene target from [`Viewport::drawing_buffer_size`],
//! so on very dense displays the scene is rendered at no more than twice the
//! logical resolution.

/// Upper bound for the pixel ratio used by the renderer.
pub const MAX_PIXEL_RATIO: f64 = 2.0;

/// Logical viewport size plus the pixel ratio it is rendered at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    width: f64,
    height: f64,
    pixel_ratio: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64, device_pixel_ratio: f64) -> Self {
        let mut vp = Self {
            width: 1.0,
            height: 1.0,
            pixel_ratio: 1.0,
        };
        vp.resize(width, height, device_pixel_ratio);
        vp
    }

    /// Build from a physical window size and its scale factor.
    pub fn from_physical(size: winit::dpi::PhysicalSize<u32>, scale_factor: f64) -> Self {
        let logical = size.to_logical::<f64>(scale_factor);
        Self::new(logical.width, logical.height, scale_factor)
    }

    /// Apply a resize.
    ///
    /// Returns `false` and leaves the viewport untouched when either dimension
    /// is zero, which is what a minimized window reports.
    pub fn resize(&mut self, width: f64, height: f64, device_pixel_ratio: f64) -> bool {
        if !(width > 0.0 && height > 0.0) {
            return false;
        }
        self.width = width;
        self.height = height;
        self.pixel_ratio = clamp_pixel_ratio(device_pixel_ratio);
        true
    }

    /// Width divided by height.
    pub fn aspect(&self) -> f32 {
        (self.width / self.height) as f32
    }

    /// Logical size as reported to the camera and renderer.
    pub fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    pub fn pixel_ratio(&self) -> f64 {
        self.pixel_ratio
    }

    /// Size in pixels of the buffer the scene is drawn into.
    pub fn drawing_buffer_size(&self) -> (u32, u32) {
        let w = (self.width * self.pixel_ratio).round().max(1.0) as u32;
        let h = (self.height * self.pixel_ratio).round().max(1.0) as u32;
        (w, h)
    }
}

/// `min(device_pixel_ratio, 2)`. Negative and NaN ratios fall back to 1.
pub fn clamp_pixel_ratio(device_pixel_ratio: f64) -> f64 {
    if device_pixel_ratio.is_nan() || device_pixel_ratio < 0.0 {
        return 1.0;
    }
    device_pixel_ratio.min(MAX_PIXEL_RATIO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_aspect_is_width_over_height() {
        for (w, h) in [(800.0, 600.0), (1920.0, 1080.0), (333.0, 777.0), (1.0, 1.0)] {
            let vp = Viewport::new(w, h, 1.0);
            assert_eq!(vp.aspect(), (w / h) as f32);
            assert_eq!(vp.size(), (w, h));
        }
    }

    #[test]
    fn test_resize_updates_aspect() {
        let mut vp = Viewport::new(800.0, 600.0, 1.0);
        assert_relative_eq!(vp.aspect(), 1.333, epsilon = 1e-3);
        assert!(vp.resize(1920.0, 1080.0, 1.0));
        assert_relative_eq!(vp.aspect(), 1.778, epsilon = 1e-3);
    }

    #[test]
    fn test_pixel_ratio_is_clamped_to_two() {
        for dpr in [0.0, 0.5, 1.0, 1.5, 2.0, 2.5, 3.0, 4.0, f64::INFINITY] {
            let vp = Viewport::new(100.0, 100.0, dpr);
            assert_eq!(vp.pixel_ratio(), f64::min(dpr, 2.0));
        }
    }

    #[test]
    fn test_unusable_pixel_ratio_falls_back_to_one() {
        for dpr in [-1.0, -0.5, f64::NEG_INFINITY, f64::NAN] {
            let vp = Viewport::new(640.0, 480.0, dpr);
            assert_eq!(vp.pixel_ratio(), 1.0);
            assert_eq!(vp.drawing_buffer_size(), (640, 480));
        }
    }

    #[test]
    fn test_drawing_buffer_uses_clamped_ratio() {
        let vp = Viewport::new(1280.0, 720.0, 3.0);
        assert_eq!(vp.drawing_buffer_size(), (2560, 1440));
        let vp = Viewport::new(1280.0, 720.0, 1.25);
        assert_eq!(vp.drawing_buffer_size(), (1600, 900));
    }

    #[test]
    fn test_zero_size_resize_is_ignored() {
        let mut vp = Viewport::new(800.0, 600.0, 1.0);
        assert!(!vp.resize(0.0, 600.0, 1.0));
        assert_eq!(vp.size(), (800.0, 600.0));
    }

    #[test]
    fn test_resize_is_idempotent() {
        let mut vp = Viewport::new(800.0, 600.0, 1.0);
        vp.resize(1024.0, 768.0, 2.0);
        let once = vp;
        vp.resize(1024.0, 768.0, 2.0);
        assert_eq!(vp, once);
    }

    #[test]
    fn test_from_physical_divides_by_scale_factor() {
        let vp = Viewport::from_physical(winit::dpi::PhysicalSize::new(2560, 1440), 2.0);
        assert_eq!(vp.size(), (1280.0, 720.0));
        assert_eq!(vp.drawing_buffer_size(), (2560, 1440));
    }
}
