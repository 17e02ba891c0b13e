//! Quarter-turn rotation transforms
//!
//! Coordinates use the raster convention: origin at the top-left, y grows
//! downward, positive angles turn clockwise on screen.

use crate::types::Rotation;

/// A 2D affine transform.
///
/// Maps `(x, y)` to `(a*x + c*y + e, b*x + d*y + f)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Affine2 {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Affine2 {
    pub fn identity() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: 0.0,
            f: 0.0,
        }
    }

    pub fn translate(tx: f64, ty: f64) -> Self {
        Self {
            e: tx,
            f: ty,
            ..Self::identity()
        }
    }

    /// Exact rotation by a quarter turn (no floating-point drift)
    pub fn rotate(rotation: Rotation) -> Self {
        let (cos, sin) = match rotation {
            Rotation::None => (1.0, 0.0),
            Rotation::Clockwise90 => (0.0, 1.0),
            Rotation::Clockwise180 => (-1.0, 0.0),
            Rotation::Clockwise270 => (0.0, -1.0),
        };
        Self {
            a: cos,
            b: sin,
            c: -sin,
            d: cos,
            e: 0.0,
            f: 0.0,
        }
    }

    /// Compose: apply `self` first, then `next`
    pub fn then(self, next: Affine2) -> Self {
        Self {
            a: next.a * self.a + next.c * self.b,
            b: next.b * self.a + next.d * self.b,
            c: next.a * self.c + next.c * self.d,
            d: next.b * self.c + next.d * self.d,
            e: next.a * self.e + next.c * self.f + next.e,
            f: next.b * self.e + next.d * self.f + next.f,
        }
    }

    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.a * x + self.c * y + self.e,
            self.b * x + self.d * y + self.f,
        )
    }
}

/// Dimensions of a `width` x `height` region after rotation
pub fn rotated_dimensions(width: u32, height: u32, rotation: Rotation) -> (u32, u32) {
    if rotation.swaps_dimensions() {
        (height, width)
    } else {
        (width, height)
    }
}

/// Transform that rotates a `width` x `height` region about its own center and
/// places the result at the origin of the rotated canvas.
pub fn rotation_about_center(width: f64, height: f64, rotation: Rotation) -> Affine2 {
    let (out_width, out_height) = if rotation.swaps_dimensions() {
        (height, width)
    } else {
        (width, height)
    };

    Affine2::translate(-width / 2.0, -height / 2.0)
        .then(Affine2::rotate(rotation))
        .then(Affine2::translate(out_width / 2.0, out_height / 2.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds(transform: &Affine2, width: f64, height: f64) -> (f64, f64, f64, f64) {
        let corners = [(0.0, 0.0), (width, 0.0), (0.0, height), (width, height)];
        let mapped: Vec<_> = corners
            .iter()
            .map(|&(x, y)| transform.apply(x, y))
            .collect();
        let min_x = mapped.iter().map(|p| p.0).fold(f64::INFINITY, f64::min);
        let min_y = mapped.iter().map(|p| p.1).fold(f64::INFINITY, f64::min);
        let max_x = mapped.iter().map(|p| p.0).fold(f64::NEG_INFINITY, f64::max);
        let max_y = mapped.iter().map(|p| p.1).fold(f64::NEG_INFINITY, f64::max);
        (min_x, min_y, max_x, max_y)
    }

    #[test]
    fn test_rotated_dimensions() {
        assert_eq!(rotated_dimensions(400, 200, Rotation::None), (400, 200));
        assert_eq!(rotated_dimensions(400, 200, Rotation::Clockwise90), (200, 400));
        assert_eq!(rotated_dimensions(400, 200, Rotation::Clockwise180), (400, 200));
        assert_eq!(rotated_dimensions(400, 200, Rotation::Clockwise270), (200, 400));
    }

    #[test]
    fn test_rotation_fills_output_canvas() {
        for rotation in [
            Rotation::None,
            Rotation::Clockwise90,
            Rotation::Clockwise180,
            Rotation::Clockwise270,
        ] {
            let transform = rotation_about_center(400.0, 200.0, rotation);
            let (out_w, out_h) = rotated_dimensions(400, 200, rotation);
            assert_eq!(
                bounds(&transform, 400.0, 200.0),
                (0.0, 0.0, out_w as f64, out_h as f64),
                "{:?}",
                rotation
            );
        }
    }

    #[test]
    fn test_clockwise_quarter_turn_moves_top_left_to_top_right() {
        let transform = rotation_about_center(4.0, 2.0, Rotation::Clockwise90);
        assert_eq!(transform.apply(0.0, 0.0), (2.0, 0.0));
        assert_eq!(transform.apply(4.0, 2.0), (0.0, 4.0));
    }

    #[test]
    fn test_center_is_fixed_point_up_to_translation() {
        let transform = rotation_about_center(10.0, 6.0, Rotation::Clockwise270);
        // Center of the source maps to the center of the rotated canvas
        assert_eq!(transform.apply(5.0, 3.0), (3.0, 5.0));
    }
}
