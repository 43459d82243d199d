//! Artwork fingerprinting
//!
//! A perceptual 64-bit blockhash of decoded cover art, exposed as a
//! plain `u64` so callers can compare fingerprints with Hamming
//! distance, plus the average colour used for artwork placeholders.
//! A track with no embedded artwork is an expected, recoverable case
//! surfaced as [`Error::NotFound`], not a crash.

use crate::error::{Error, Result};
use blockhash::blockhash64;
use image::io::Reader;
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;

fn image_format_from_mime(mime_type: &str) -> Option<ImageFormat> {
    match mime_type {
        "image/png" => Some(ImageFormat::Png),
        "image/jpeg" => Some(ImageFormat::Jpeg),
        "image/gif" => Some(ImageFormat::Gif),
        "image/webp" => Some(ImageFormat::WebP),
        "image/tiff" => Some(ImageFormat::Tiff),
        "image/bmp" => Some(ImageFormat::Bmp),
        "image/x-icon" => Some(ImageFormat::Ico),
        _ => None,
    }
}

fn decode_image(data: &[u8], mime_type: &str) -> Result<DynamicImage> {
    let format = image_format_from_mime(mime_type)
        .ok_or_else(|| Error::UnsupportedMimeType(mime_type.to_string()))?;

    let mut reader = Reader::new(Cursor::new(data));
    reader.set_format(format);

    Ok(reader.decode()?)
}

/// Perceptual fingerprint of a piece of artwork.
///
/// `data` is the raw encoded image (e.g. the embedded cover art tag);
/// `None` or empty data means the track has no artwork and yields
/// [`Error::NotFound`]. The result is the 64-bit blockhash in big-endian
/// bit order; equal images hash equal, and near-duplicates land within a
/// small Hamming distance (the threshold is caller policy).
pub fn fingerprint(data: Option<&[u8]>, mime_type: &str) -> Result<u64> {
    let data = match data {
        Some(data) if !data.is_empty() => data,
        _ => {
            return Err(Error::NotFound(
                "no artwork data to fingerprint".to_string(),
            ))
        }
    };

    let image = decode_image(data, mime_type)?;
    let hash: [u8; 8] = blockhash64(&image).into();

    Ok(u64::from_be_bytes(hash))
}

/// An 8-bit RGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Rgb {
    /// CSS hex form, `#rrggbb`.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.red, self.green, self.blue)
    }
}

/// Average colour of a piece of artwork: the per-channel mean over all
/// pixels of the decoded image.
pub fn average_colour(data: &[u8], mime_type: &str) -> Result<Rgb> {
    let image = decode_image(data, mime_type)?.to_rgb8();

    let pixel_count = u64::from(image.width()) * u64::from(image.height());
    if pixel_count == 0 {
        return Err(Error::NotFound("artwork image has no pixels".to_string()));
    }

    let mut sums = [0u64; 3];
    for pixel in image.pixels() {
        sums[0] += u64::from(pixel[0]);
        sums[1] += u64::from(pixel[1]);
        sums[2] += u64::from(pixel[2]);
    }

    Ok(Rgb {
        red: (sums[0] / pixel_count) as u8,
        green: (sums[1] / pixel_count) as u8,
        blue: (sums[2] / pixel_count) as u8,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    fn png_bytes(image: &RgbImage) -> Vec<u8> {
        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(image.clone())
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn missing_artwork_is_not_found() {
        assert!(matches!(
            fingerprint(None, "image/png"),
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            fingerprint(Some(&[]), "image/png"),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn unknown_mime_type_is_rejected() {
        assert!(matches!(
            fingerprint(Some(b"data"), "application/pdf"),
            Err(Error::UnsupportedMimeType(_))
        ));
    }

    #[test]
    fn identical_images_hash_equal() {
        let image = RgbImage::from_fn(32, 32, |x, y| {
            image::Rgb([(x * 8) as u8, (y * 8) as u8, 128])
        });
        let bytes = png_bytes(&image);

        let a = fingerprint(Some(&bytes), "image/png").unwrap();
        let b = fingerprint(Some(&bytes), "image/png").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn unrelated_images_are_hamming_distant() {
        let left_right = RgbImage::from_fn(32, 32, |x, _| {
            image::Rgb(if x < 16 { [255, 255, 255] } else { [0, 0, 0] })
        });
        let top_bottom = RgbImage::from_fn(32, 32, |_, y| {
            image::Rgb(if y < 16 { [255, 255, 255] } else { [0, 0, 0] })
        });

        let a = fingerprint(Some(&png_bytes(&left_right)), "image/png").unwrap();
        let b = fingerprint(Some(&png_bytes(&top_bottom)), "image/png").unwrap();
        assert!((a ^ b).count_ones() > 0);
    }

    #[test]
    fn average_colour_of_solid_image() {
        let image = RgbImage::from_pixel(16, 16, image::Rgb([10, 200, 30]));
        let colour = average_colour(&png_bytes(&image), "image/png").unwrap();

        assert_eq!(
            colour,
            Rgb {
                red: 10,
                green: 200,
                blue: 30
            }
        );
        assert_eq!(colour.to_hex(), "#0ac81e");
    }
}
