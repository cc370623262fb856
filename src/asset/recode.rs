//! Image recoding for queued raster assets.
//!
//! Assets from the image drain phase pass through here before being
//! persisted. Recoding is best-effort: anything that is not a decodable
//! raster image, or that fails to re-encode, is stored as fetched.

use std::io::Cursor;

use image::ImageFormat;
use image::codecs::jpeg::JpegEncoder;
use url::Url;

use crate::config::{ImageConfig, RecodeFormat};
use crate::debug;

/// Re-encode a fetched image to the configured format.
///
/// Returns the input unchanged when no recode target is configured,
/// the payload is not a raster image, or the image already has the
/// target format.
pub fn recode_image(config: &ImageConfig, url: &Url, data: Vec<u8>) -> Vec<u8> {
    let Some(target) = config.recode else {
        return data;
    };
    let target_format = match target {
        RecodeFormat::Jpeg => ImageFormat::Jpeg,
        RecodeFormat::Png => ImageFormat::Png,
    };

    let Ok(current) = image::guess_format(&data) else {
        return data;
    };
    if current == target_format {
        return data;
    }

    let Ok(decoded) = image::load_from_memory(&data) else {
        debug!("image"; "{} did not decode, stored as fetched", url);
        return data;
    };

    let mut out = Cursor::new(Vec::new());
    let encoded = match target {
        // JPEG has no alpha channel; flatten before encoding.
        RecodeFormat::Jpeg => decoded
            .to_rgb8()
            .write_with_encoder(JpegEncoder::new_with_quality(&mut out, config.quality)),
        RecodeFormat::Png => decoded.write_to(&mut out, ImageFormat::Png),
    };

    match encoded {
        Ok(()) => out.into_inner(),
        Err(e) => {
            debug!("image"; "recoding {} failed: {}", url, e);
            data
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};

    fn sample_png() -> Vec<u8> {
        let img = ImageBuffer::from_pixel(2, 2, Rgb::<u8>([200, 10, 10]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    fn url() -> Url {
        Url::parse("https://example.com/a.png").unwrap()
    }

    #[test]
    fn test_no_target_is_passthrough() {
        let data = sample_png();
        let out = recode_image(&ImageConfig::default(), &url(), data.clone());
        assert_eq!(out, data);
    }

    #[test]
    fn test_non_image_is_passthrough() {
        let config = ImageConfig {
            recode: Some(RecodeFormat::Jpeg),
            quality: 85,
        };
        let data = b"body { color: red; }".to_vec();
        let out = recode_image(&config, &url(), data.clone());
        assert_eq!(out, data);
    }

    #[test]
    fn test_same_format_is_passthrough() {
        let config = ImageConfig {
            recode: Some(RecodeFormat::Png),
            quality: 85,
        };
        let data = sample_png();
        let out = recode_image(&config, &url(), data.clone());
        assert_eq!(out, data);
    }

    #[test]
    fn test_png_recodes_to_jpeg() {
        let config = ImageConfig {
            recode: Some(RecodeFormat::Jpeg),
            quality: 85,
        };
        let out = recode_image(&config, &url(), sample_png());
        assert_eq!(image::guess_format(&out).unwrap(), ImageFormat::Jpeg);
    }
}
