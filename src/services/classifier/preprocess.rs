use crate::error::AppError;
use image::{DynamicImage, ImageReader};
use ndarray::Array4;
use std::io::Cursor;
use std::path::PathBuf;
use std::sync::Arc;

// Linear rescale of [0, 255] to [0, 1]
const NORMALIZE_MEAN: f32 = 0.0;
const NORMALIZE_STD: f32 = 255.0;

/// Where a picked or captured photo comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageSource {
    File(PathBuf),
    Encoded(Arc<Vec<u8>>),
}

impl ImageSource {
    pub fn describe(&self) -> String {
        match self {
            ImageSource::File(path) => path.display().to_string(),
            ImageSource::Encoded(bytes) => format!("<{} bytes>", bytes.len()),
        }
    }
}

fn loading_error(cause: impl std::fmt::Display) -> AppError {
    AppError::decode(format!("Error loading image: {}", cause))
}

pub fn decode_image(source: &ImageSource) -> Result<DynamicImage, AppError> {
    let decoded = match source {
        ImageSource::File(path) => ImageReader::open(path)
            .map_err(|e| loading_error(format!("{}: {}", path.display(), e)))?
            .with_guessed_format()
            .map_err(|e| loading_error(format!("{}: {}", path.display(), e)))?
            .decode(),
        ImageSource::Encoded(bytes) => ImageReader::new(Cursor::new(bytes.as_slice()))
            .with_guessed_format()
            .map_err(loading_error)?
            .decode(),
    };

    decoded.map_err(loading_error)
}

/// Turns any decoded bitmap into the NHWC float tensor the model declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preprocessor {
    pub width: u32,
    pub height: u32,
}

impl Preprocessor {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn preprocess(&self, img: &DynamicImage) -> Array4<f32> {
        let rgb = img
            .resize_exact(self.width, self.height, image::imageops::FilterType::Triangle)
            .to_rgb8();

        Array4::from_shape_fn(
            (1, self.height as usize, self.width as usize, 3),
            |(_, y, x, c)| {
                let value = rgb.get_pixel(x as u32, y as u32)[c] as f32;
                ((value - NORMALIZE_MEAN) / NORMALIZE_STD).clamp(0.0, 1.0)
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn gradient(width: u32, height: u32) -> DynamicImage {
        let img = RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
        });
        DynamicImage::ImageRgb8(img)
    }

    #[test]
    fn output_shape_follows_model_not_input() {
        let pre = Preprocessor::new(224, 160);
        for (w, h) in [(1, 1), (640, 480), (100, 900), (224, 160)] {
            let tensor = pre.preprocess(&gradient(w, h));
            assert_eq!(tensor.shape(), &[1, 160, 224, 3]);
        }
    }

    #[test]
    fn values_are_rescaled_into_unit_range() {
        let pre = Preprocessor::new(32, 32);
        let tensor = pre.preprocess(&gradient(300, 300));
        assert!(tensor.iter().all(|v| (0.0..=1.0).contains(v)));

        let white = DynamicImage::ImageRgb8(RgbImage::from_pixel(10, 10, Rgb([255, 255, 255])));
        let tensor = pre.preprocess(&white);
        assert!(tensor.iter().all(|v| (*v - 1.0).abs() < 1e-6));

        let black = DynamicImage::ImageRgb8(RgbImage::from_pixel(10, 10, Rgb([0, 0, 0])));
        let tensor = pre.preprocess(&black);
        assert!(tensor.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn channels_stay_in_rgb_order() {
        let red = DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 4, Rgb([255, 0, 51])));
        let tensor = Preprocessor::new(2, 2).preprocess(&red);
        assert!((tensor[[0, 1, 1, 0]] - 1.0).abs() < 1e-6);
        assert_eq!(tensor[[0, 1, 1, 1]], 0.0);
        assert!((tensor[[0, 1, 1, 2]] - 0.2).abs() < 1e-6);
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        let source = ImageSource::Encoded(Arc::new(b"definitely not a png".to_vec()));
        let err = decode_image(&source).unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::ImageDecode);
        assert!(err.message.starts_with("Error loading image: "));
    }

    #[test]
    fn missing_file_uses_same_message() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gone.jpg");
        let err = decode_image(&ImageSource::File(path.clone())).unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::ImageDecode);
        assert!(err.message.starts_with("Error loading image: "));
        assert!(err.message.contains(&path.display().to_string()));
    }

    #[test]
    fn encoded_png_round_trips_through_decoder() {
        let mut buf = Vec::new();
        gradient(8, 6)
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        let img = decode_image(&ImageSource::Encoded(Arc::new(buf))).unwrap();
        assert_eq!((img.width(), img.height()), (8, 6));
    }
}
