//! Test fixtures: in-memory images and placeholder video bytes.

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};

fn gradient(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    }))
}

fn encode(img: &DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), format)
        .expect("encode test image");
    buf
}

pub fn create_test_png(width: u32, height: u32) -> Vec<u8> {
    encode(&gradient(width, height), ImageFormat::Png)
}

pub fn create_test_jpeg(width: u32, height: u32) -> Vec<u8> {
    encode(&gradient(width, height), ImageFormat::Jpeg)
}

pub fn create_test_webp(width: u32, height: u32) -> Vec<u8> {
    encode(
        &DynamicImage::ImageRgba8(gradient(width, height).to_rgba8()),
        ImageFormat::WebP,
    )
}

pub fn create_test_gif(width: u32, height: u32) -> Vec<u8> {
    encode(
        &DynamicImage::ImageRgba8(gradient(width, height).to_rgba8()),
        ImageFormat::Gif,
    )
}

pub fn create_test_svg() -> Vec<u8> {
    br#"<svg xmlns="http://www.w3.org/2000/svg" width="4" height="4"><rect width="4" height="4" fill="teal"/></svg>"#
        .to_vec()
}

/// Opaque bytes standing in for a container file; never decoded.
pub fn create_test_video(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}
