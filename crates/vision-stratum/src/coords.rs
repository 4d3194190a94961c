//! Rescale image-space coordinates to host logical screen coordinates
//! (spec.md §4.C6, §8 scenario S6).

use crate::model::{ImagePoint, ScreenSize};

/// Scale `point`, given in a fixed image-space of `image_width` (aspect
/// preserved relative to `screen`), onto `screen`'s logical pixel grid.
pub fn scale_to_screen(point: ImagePoint, image_width: u32, screen: &ScreenSize) -> (i32, i32) {
    let scale = screen.width as f64 / image_width as f64;
    let x = (point.x * scale).round() as i32;
    let y = (point.y * scale).round() as i32;
    (x, y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scales_image_coordinates_to_host_screen_per_spec_s6() {
        let screen = ScreenSize {
            width: 2560,
            height: 1440,
        };
        let (x, y) = scale_to_screen(ImagePoint { x: 320.0, y: 200.0 }, 1280, &screen);
        assert!((x - 640).abs() <= 1);
        assert!((y - 400).abs() <= 1);
    }
}
