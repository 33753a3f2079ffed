//! Image preprocessing applied before OCR.
//!
//! The transform order matters: grayscale, contrast stretch, sharpen,
//! binarize. Each step is a pure function of the input image.

use image::{imageops, DynamicImage, GrayImage, Luma};

/// Pixels below this intensity become black after binarization.
pub const BINARIZE_THRESHOLD: u8 = 160;

/// 3x3 sharpen kernel, weights summing to 1.
const SHARPEN_KERNEL: [f32; 9] = [
    -2.0 / 16.0,
    -2.0 / 16.0,
    -2.0 / 16.0,
    -2.0 / 16.0,
    32.0 / 16.0,
    -2.0 / 16.0,
    -2.0 / 16.0,
    -2.0 / 16.0,
    -2.0 / 16.0,
];

/// Normalizes a page image for OCR: grayscale, full-range contrast
/// stretch, sharpen, then hard binarization.
pub fn preprocess_for_ocr(img: &DynamicImage) -> GrayImage {
    let gray = img.to_luma8();
    let stretched = stretch_contrast(&gray);
    let sharpened = imageops::filter3x3(&stretched, &SHARPEN_KERNEL);
    binarize(sharpened, BINARIZE_THRESHOLD)
}

/// Linearly remaps pixel intensities so the darkest pixel becomes 0 and the
/// brightest 255. A flat image is returned unchanged.
fn stretch_contrast(gray: &GrayImage) -> GrayImage {
    let mut min = u8::MAX;
    let mut max = u8::MIN;
    for Luma([v]) in gray.pixels() {
        min = min.min(*v);
        max = max.max(*v);
    }
    if min >= max {
        return gray.clone();
    }

    let range = (max - min) as u32;
    let mut out = gray.clone();
    for Luma([v]) in out.pixels_mut() {
        *v = ((*v - min) as u32 * 255 / range) as u8;
    }
    out
}

fn binarize(mut gray: GrayImage, threshold: u8) -> GrayImage {
    for Luma([v]) in gray.pixels_mut() {
        *v = if *v < threshold { 0 } else { 255 };
    }
    gray
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient_image() -> GrayImage {
        GrayImage::from_fn(16, 1, |x, _| Luma([64 + (x as u8) * 8]))
    }

    #[test]
    fn test_stretch_contrast_reaches_full_range() {
        let stretched = stretch_contrast(&gradient_image());
        let values: Vec<u8> = stretched.pixels().map(|p| p.0[0]).collect();
        assert_eq!(*values.iter().min().unwrap(), 0);
        assert_eq!(*values.iter().max().unwrap(), 255);
    }

    #[test]
    fn test_stretch_contrast_flat_image_unchanged() {
        let flat = GrayImage::from_pixel(8, 8, Luma([127]));
        let stretched = stretch_contrast(&flat);
        assert!(stretched.pixels().all(|p| p.0[0] == 127));
    }

    #[test]
    fn test_binarize_is_bilevel() {
        let out = binarize(gradient_image(), BINARIZE_THRESHOLD);
        assert!(out.pixels().all(|p| p.0[0] == 0 || p.0[0] == 255));
    }

    #[test]
    fn test_binarize_threshold_boundary() {
        let img = GrayImage::from_fn(2, 1, |x, _| {
            Luma([if x == 0 { BINARIZE_THRESHOLD - 1 } else { BINARIZE_THRESHOLD }])
        });
        let out = binarize(img, BINARIZE_THRESHOLD);
        assert_eq!(out.get_pixel(0, 0).0[0], 0);
        assert_eq!(out.get_pixel(1, 0).0[0], 255);
    }

    #[test]
    fn test_preprocess_preserves_dimensions() {
        let img = DynamicImage::ImageRgb8(image::RgbImage::new(24, 32));
        let out = preprocess_for_ocr(&img);
        assert_eq!(out.dimensions(), (24, 32));
    }

}
