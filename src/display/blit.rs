//! Rotated sprite draws.
//!
//! Places a pre-rendered image so its unrotated center lands on a target
//! point of the destination surface, rotated about that point. The rotation
//! is handed to the surface draw primitive as an explicit transform value,
//! so no transform state survives the call.

use crate::geometry::{Rect, Transform2D};

use super::surface::Surface;

/// Draw `image` at its natural size, rotated `angle_deg` degrees clockwise
/// about the destination point `(center_x, center_y)`
pub fn draw_rotated(
    dest: &mut Surface,
    image: &Surface,
    angle_deg: f32,
    center_x: f32,
    center_y: f32,
) {
    draw_rotated_sized(
        dest,
        image,
        angle_deg,
        center_x,
        center_y,
        image.width() as f32,
        image.height() as f32,
    );
}

/// Draw `image` scaled into a `width` x `height` rectangle, rotated about
/// `(center_x, center_y)`. Used to fit a square dial pane to the window
/// content area.
///
/// The destination rectangle is sized by truncating `width`/`height` to
/// whole pixels; the at-most-one-pixel rounding this causes is accepted.
/// Angles wrap modulo 360 through the trig functions.
pub fn draw_rotated_sized(
    dest: &mut Surface,
    image: &Surface,
    angle_deg: f32,
    center_x: f32,
    center_y: f32,
    width: f32,
    height: f32,
) {
    if image.width() == 0 || image.height() == 0 || width < 1.0 || height < 1.0 {
        return;
    }

    // Rectangle whose center is the target point before any rotation
    let rect = Rect::new(
        center_x - width / 2.0,
        center_y - height / 2.0,
        width.trunc(),
        height.trunc(),
    );

    // Rotate the draw about the rectangle's (integer) center on the
    // destination, not about the origin
    let (pivot_x, pivot_y) = rect.center_trunc();
    let transform = Transform2D::rotation_about(angle_deg, pivot_x, pivot_y);

    dest.draw_image(image, rect, &transform);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::surface::Color;

    fn white_square(side: u32) -> Surface {
        let mut s = Surface::new(side, side);
        s.clear(Color::WHITE);
        s
    }

    /// Bounding box of all non-transparent pixels
    fn coverage(s: &Surface) -> Option<(i32, i32, i32, i32)> {
        let mut bounds = None;
        for y in 0..s.height() as i32 {
            for x in 0..s.width() as i32 {
                if s.get_pixel(x, y).map(|c| c.a > 0) == Some(true) {
                    let (x0, y0, x1, y1) = bounds.unwrap_or((x, y, x, y));
                    bounds = Some((x0.min(x), y0.min(y), x1.max(x), y1.max(y)));
                }
            }
        }
        bounds
    }

    #[test]
    fn test_angle_zero_centers_rect() {
        let mut dest = Surface::new(40, 40);
        let img = white_square(10);
        draw_rotated(&mut dest, &img, 0.0, 20.0, 20.0);
        assert_eq!(coverage(&dest), Some((15, 15, 24, 24)));
    }

    #[test]
    fn test_rotated_square_occupies_exact_rect() {
        // 10x10 opaque white square rotated 90 degrees about (250, 250) on a
        // transparent 500x500 surface: a square is rotation-invariant in
        // shape, so it must cover exactly (245,245)-(254,254)
        let mut dest = Surface::new(500, 500);
        let img = white_square(10);
        draw_rotated(&mut dest, &img, 90.0, 250.0, 250.0);

        for y in 245..=254 {
            for x in 245..=254 {
                assert_eq!(dest.get_pixel(x, y), Some(Color::WHITE), "at ({x}, {y})");
            }
        }
        assert_eq!(coverage(&dest), Some((245, 245, 254, 254)));
    }

    #[test]
    fn test_angles_summing_to_360_match() {
        let img = white_square(12);

        let mut a = Surface::new(64, 64);
        draw_rotated(&mut a, &img, 90.0, 32.0, 32.0);
        let mut b = Surface::new(64, 64);
        draw_rotated(&mut b, &img, 270.0, 32.0, 32.0);

        assert_eq!(coverage(&a), coverage(&b));
        assert_eq!(coverage(&a), Some((26, 26, 37, 37)));
    }

    #[test]
    fn test_full_turn_matches_identity() {
        let img = white_square(10);

        let mut a = Surface::new(40, 40);
        draw_rotated(&mut a, &img, 0.0, 20.0, 20.0);
        let mut b = Surface::new(40, 40);
        draw_rotated(&mut b, &img, 360.0, 20.0, 20.0);

        assert_eq!(coverage(&a), coverage(&b));
    }

    #[test]
    fn test_no_transform_leaks_into_later_draws() {
        let mut dest = Surface::new(64, 64);
        let img = white_square(8);
        draw_rotated(&mut dest, &img, 45.0, 20.0, 20.0);

        // A plain axis-aligned fill afterwards must stay axis-aligned
        dest.fill_rect(40, 40, 10, 4, Color::rgb(255, 0, 0));
        for y in 40..44 {
            for x in 40..50 {
                assert_eq!(dest.get_pixel(x, y), Some(Color::rgb(255, 0, 0)));
            }
        }
        assert_eq!(dest.get_pixel(39, 41).map(|c| c.r), Some(0));
        assert_eq!(dest.get_pixel(50, 41).map(|c| c.r), Some(0));
    }

    #[test]
    fn test_zero_size_image_is_noop() {
        let mut dest = Surface::new(16, 16);
        let img = Surface::new(0, 0);
        draw_rotated(&mut dest, &img, 30.0, 8.0, 8.0);
        assert_eq!(coverage(&dest), None);
    }

    #[test]
    fn test_sized_draw_scales_sprite() {
        let mut dest = Surface::new(64, 64);
        let img = white_square(4);
        draw_rotated_sized(&mut dest, &img, 0.0, 32.0, 32.0, 16.0, 16.0);
        assert_eq!(coverage(&dest), Some((24, 24, 39, 39)));
    }
}
