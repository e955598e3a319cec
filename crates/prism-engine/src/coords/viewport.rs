/// Output surface size in logical pixels plus the device pixel ratio.
///
/// Physical size is `width * pixel_ratio` by `height * pixel_ratio`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SurfaceSize {
    pub width: f32,
    pub height: f32,
    pub pixel_ratio: f32,
}

impl SurfaceSize {
    #[inline]
    pub const fn new(width: f32, height: f32, pixel_ratio: f32) -> Self {
        Self { width, height, pixel_ratio }
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self.width > 0.0
            && self.height > 0.0
            && self.pixel_ratio > 0.0
            && self.width.is_finite()
            && self.height.is_finite()
            && self.pixel_ratio.is_finite()
    }

    /// Width over height. Falls back to `1.0` for a degenerate size.
    #[inline]
    pub fn aspect(self) -> f32 {
        if self.height > 0.0 { self.width / self.height } else { 1.0 }
    }

    /// Size in physical pixels, at least 1x1.
    #[inline]
    pub fn physical(self) -> (u32, u32) {
        let w = (self.width * self.pixel_ratio).round().max(1.0) as u32;
        let h = (self.height * self.pixel_ratio).round().max(1.0) as u32;
        (w, h)
    }

    /// Converts a logical-pixel position (top-left origin, +Y down) to
    /// normalized device coordinates (+Y up, `[-1, 1]` on both axes).
    #[inline]
    pub fn to_ndc(self, x: f32, y: f32) -> glam::Vec2 {
        let w = self.width.max(f32::MIN_POSITIVE);
        let h = self.height.max(f32::MIN_POSITIVE);
        glam::Vec2::new((x / w) * 2.0 - 1.0, -(y / h) * 2.0 + 1.0)
    }
}

impl Default for SurfaceSize {
    fn default() -> Self {
        Self::new(1.0, 1.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ndc_corners_and_center() {
        let s = SurfaceSize::new(800.0, 600.0, 2.0);
        assert_eq!(s.to_ndc(0.0, 0.0), glam::Vec2::new(-1.0, 1.0));
        assert_eq!(s.to_ndc(800.0, 600.0), glam::Vec2::new(1.0, -1.0));
        assert_eq!(s.to_ndc(400.0, 300.0), glam::Vec2::ZERO);
    }

    #[test]
    fn physical_rounds_and_never_hits_zero() {
        assert_eq!(SurfaceSize::new(100.0, 50.0, 1.5).physical(), (150, 75));
        assert_eq!(SurfaceSize::new(0.0, 0.0, 1.0).physical(), (1, 1));
    }

    #[test]
    fn degenerate_aspect_is_one() {
        assert_eq!(SurfaceSize::new(10.0, 0.0, 1.0).aspect(), 1.0);
        assert!(!SurfaceSize::new(10.0, 0.0, 1.0).is_valid());
    }
}
