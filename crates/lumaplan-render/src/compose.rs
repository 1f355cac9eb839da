//! Per-pixel derivation of overlay, tint and placeholder images

use image::{DynamicImage, Rgb, RgbImage, Rgba, RgbaImage};
use lumaplan_core::{LumaplanError, Result};

/// Hue of the tint layer; 1.0 wraps around to red
const TINT_HUE: f32 = 1.0;
const TINT_SATURATION: f32 = 0.75;

/// Mean absolute channel difference, truncated
pub fn pixel_difference(a: Rgb<u8>, b: Rgb<u8>) -> u8 {
    let sum: u32 = a
        .0
        .iter()
        .zip(b.0.iter())
        .map(|(x, y)| (*x as i32 - *y as i32).unsigned_abs())
        .sum();
    (sum / 3) as u8
}

/// Keep the combo pixels that differ from the base by more than
/// `sensitivity`; everything else becomes fully transparent.
pub fn diff_overlay(base: &RgbImage, combo: &RgbImage, sensitivity: u8) -> Result<RgbaImage> {
    if base.dimensions() != combo.dimensions() {
        return Err(LumaplanError::ImageError(format!(
            "overlay size mismatch: base {:?}, combination {:?}",
            base.dimensions(),
            combo.dimensions()
        )));
    }
    let (width, height) = base.dimensions();
    Ok(RgbaImage::from_fn(width, height, |x, y| {
        let lit = *combo.get_pixel(x, y);
        if pixel_difference(*base.get_pixel(x, y), lit) > sensitivity {
            Rgba([lit[0], lit[1], lit[2], 255])
        } else {
            Rgba([0, 0, 0, 0])
        }
    }))
}

/// HSB to RGB with `(v * 255 + 0.5)` rounding per channel
pub fn hsb_to_rgb(hue: f32, saturation: f32, brightness: f32) -> [u8; 3] {
    let to_byte = |c: f32| (c * 255.0 + 0.5).clamp(0.0, 255.0) as u8;
    if saturation == 0.0 {
        let v = to_byte(brightness);
        return [v, v, v];
    }
    let h = (hue - hue.floor()) * 6.0;
    let f = h - h.floor();
    let p = brightness * (1.0 - saturation);
    let q = brightness * (1.0 - saturation * f);
    let t = brightness * (1.0 - saturation * (1.0 - f));
    let (r, g, b) = match h as u32 {
        0 => (brightness, t, p),
        1 => (q, brightness, p),
        2 => (p, brightness, t),
        3 => (p, q, brightness),
        4 => (t, p, brightness),
        _ => (brightness, p, q),
    };
    [to_byte(r), to_byte(g), to_byte(b)]
}

/// Recolor every visible pixel red, keeping its brightness.
///
/// Clients hue-rotate this layer to approximate the light's actual color.
pub fn red_tint(image: &RgbaImage) -> RgbaImage {
    let (width, height) = image.dimensions();
    RgbaImage::from_fn(width, height, |x, y| {
        let px = image.get_pixel(x, y);
        if px[3] == 0 {
            return Rgba([0, 0, 0, 0]);
        }
        let brightness = px[0].max(px[1]).max(px[2]) as f32 / 255.0;
        let [r, g, b] = hsb_to_rgb(TINT_HUE, TINT_SATURATION, brightness);
        Rgba([r, g, b, 255])
    })
}

/// A fully transparent image
pub fn transparent_image(width: u32, height: u32) -> RgbaImage {
    RgbaImage::new(width, height)
}

/// An opaque RGBA copy of a rendered frame
pub fn opaque(frame: &RgbImage) -> RgbaImage {
    DynamicImage::ImageRgb8(frame.clone()).to_rgba8()
}
