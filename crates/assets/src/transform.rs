// SPDX-License-Identifier: LGPL-2.1-or-later
// Copyright (C) 2025 Shahzad A. Bhatti <bhatti@plexobject.com>
//
// This file is part of Depot.
//
// Depot is free software: you can redistribute it and/or modify
// it under the terms of the GNU Lesser General Public License as published by
// the Free Software Foundation, either version 2.1 of the License, or
// (at your option) any later version.
//
// Depot is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Lesser General Public License for more details.
//
// You should have received a copy of the GNU Lesser General Public License
// along with Depot. If not, see <https://www.gnu.org/licenses/>.

//! On-the-fly image transformation
//!
//! ## Purpose
//! Maps (raw bytes, declared content type, [`TransformRequest`]) to a
//! [`TransformResult`]. Pure and synchronous: callers on an async runtime run
//! it on a blocking worker.
//!
//! ## Pipeline
//! Operations always compose in the same order:
//! decode -> resize -> quality -> format -> serialize.
//! Resizing first means quality and format apply to the final pixels.
//!
//! ## Fit modes
//! | Mode | Result |
//! |---|---|
//! | `cover` (default) | exact box, aspect kept, overflow center-cropped |
//! | `contain` | exact box, aspect kept, letterboxed on opaque black |
//! | `fill` | exact box, aspect ignored |
//! | `inside` | fits within the box, aspect kept |
//! | `outside` | covers the box, aspect kept, no crop |

use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::error::{ImageFormatHint, UnsupportedError};
use image::imageops::{self, FilterType};
use image::{ColorType, DynamicImage, GenericImageView, ImageError, ImageFormat, Rgba, RgbaImage};
use std::collections::HashMap;
use std::fmt;
use std::io::Cursor;
use std::str::FromStr;

use crate::config::DEFAULT_MAX_DIMENSION;
use crate::{AssetError, AssetResult};

/// JPEG quality used when the request does not name one
pub const DEFAULT_JPEG_QUALITY: u8 = 80;

const RESAMPLE_FILTER: FilterType = FilterType::Lanczos3;

/// Opaque black, used behind `contain` letterboxing
const LETTERBOX: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// How an image is scaled or cropped into the requested box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FitMode {
    #[default]
    Cover,
    Contain,
    Fill,
    Inside,
    Outside,
}

impl FitMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FitMode::Cover => "cover",
            FitMode::Contain => "contain",
            FitMode::Fill => "fill",
            FitMode::Inside => "inside",
            FitMode::Outside => "outside",
        }
    }
}

impl FromStr for FitMode {
    type Err = AssetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cover" => Ok(FitMode::Cover),
            "contain" => Ok(FitMode::Contain),
            "fill" => Ok(FitMode::Fill),
            "inside" => Ok(FitMode::Inside),
            "outside" => Ok(FitMode::Outside),
            _ => Err(AssetError::ValidationFailure(format!(
                "Unsupported fit '{}', expected one of cover, contain, fill, inside, outside",
                s
            ))),
        }
    }
}

impl fmt::Display for FitMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Encodings the engine can produce
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Jpeg,
    Png,
    Gif,
    Webp,
    Bmp,
    Tiff,
}

impl OutputFormat {
    /// Canonical MIME type
    pub fn mime_type(&self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::Png => "image/png",
            OutputFormat::Gif => "image/gif",
            OutputFormat::Webp => "image/webp",
            OutputFormat::Bmp => "image/bmp",
            OutputFormat::Tiff => "image/tiff",
        }
    }

    /// Only lossy encoders honour a quality setting
    pub fn is_lossy(&self) -> bool {
        matches!(self, OutputFormat::Jpeg)
    }

    pub fn image_format(&self) -> ImageFormat {
        match self {
            OutputFormat::Jpeg => ImageFormat::Jpeg,
            OutputFormat::Png => ImageFormat::Png,
            OutputFormat::Gif => ImageFormat::Gif,
            OutputFormat::Webp => ImageFormat::WebP,
            OutputFormat::Bmp => ImageFormat::Bmp,
            OutputFormat::Tiff => ImageFormat::Tiff,
        }
    }

    pub fn from_image_format(format: ImageFormat) -> Option<Self> {
        match format {
            ImageFormat::Jpeg => Some(OutputFormat::Jpeg),
            ImageFormat::Png => Some(OutputFormat::Png),
            ImageFormat::Gif => Some(OutputFormat::Gif),
            ImageFormat::WebP => Some(OutputFormat::Webp),
            ImageFormat::Bmp => Some(OutputFormat::Bmp),
            ImageFormat::Tiff => Some(OutputFormat::Tiff),
            _ => None,
        }
    }
}

impl FromStr for OutputFormat {
    type Err = AssetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "jpeg" | "jpg" => Ok(OutputFormat::Jpeg),
            "png" => Ok(OutputFormat::Png),
            "gif" => Ok(OutputFormat::Gif),
            "webp" => Ok(OutputFormat::Webp),
            "bmp" => Ok(OutputFormat::Bmp),
            "tiff" | "tif" => Ok(OutputFormat::Tiff),
            _ => Err(AssetError::ValidationFailure(format!(
                "Unsupported format '{}', expected one of jpeg, png, gif, webp, bmp, tiff",
                s
            ))),
        }
    }
}

/// Optional transform parameters requested on read
///
/// Every field is independent; `None` leaves that axis untouched. Width and
/// height travel together, and `fit` needs both (see [`TransformRequest::validate`]).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransformRequest {
    pub fit: Option<FitMode>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub quality: Option<u8>,
    pub format: Option<OutputFormat>,
}

impl TransformRequest {
    /// Parse query-string parameters
    ///
    /// Unknown keys are ignored and empty values count as absent. Every
    /// present value must parse cleanly; nothing is coerced.
    pub fn from_query(params: &HashMap<String, String>, max_dimension: u32) -> AssetResult<Self> {
        let value = |key: &str| {
            params
                .get(key)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
        };

        let request = Self {
            fit: value("fit").map(FitMode::from_str).transpose()?,
            width: value("width")
                .map(|v| parse_dimension("width", v, max_dimension))
                .transpose()?,
            height: value("height")
                .map(|v| parse_dimension("height", v, max_dimension))
                .transpose()?,
            quality: value("quality").map(parse_quality).transpose()?,
            format: value("format").map(OutputFormat::from_str).transpose()?,
        };

        request.validate()?;
        Ok(request)
    }

    /// Check the cross-field rules
    pub fn validate(&self) -> AssetResult<()> {
        match (self.width, self.height) {
            (Some(0), _) | (_, Some(0)) => {
                return Err(AssetError::ValidationFailure(
                    "width and height must be positive integers".to_string(),
                ))
            }
            (Some(_), None) | (None, Some(_)) => {
                return Err(AssetError::ValidationFailure(
                    "width and height must be given together".to_string(),
                ))
            }
            (None, None) if self.fit.is_some() => {
                return Err(AssetError::ValidationFailure(
                    "fit requires both width and height".to_string(),
                ))
            }
            _ => {}
        }

        if let Some(quality) = self.quality {
            if !(1..=100).contains(&quality) {
                return Err(AssetError::ValidationFailure(format!(
                    "quality must be between 1 and 100, got {}",
                    quality
                )));
            }
        }

        Ok(())
    }

    /// True when no parameter was supplied
    pub fn is_empty(&self) -> bool {
        self.fit.is_none()
            && self.width.is_none()
            && self.height.is_none()
            && self.quality.is_none()
            && self.format.is_none()
    }

    /// Target box, when one was requested
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.width.zip(self.height)
    }
}

/// Output of a transform: bytes plus the content type to serve them with
#[derive(Debug, Clone, PartialEq)]
pub struct TransformResult {
    pub data: Bytes,
    pub content_type: String,
}

/// Run the transform pipeline over an image
///
/// An empty request hands the input back untouched. Otherwise the image is
/// decoded, resized, and re-encoded; the whole output exists before this
/// returns, so a failure can never leave a half-written body behind.
/// Animated sources are decoded to their first frame only.
///
/// ## Errors
/// - `ValidationFailure` when the request breaks the cross-field rules
/// - `TransformFailure` for any decode or encode error, including source
///   formats that cannot be re-encoded
pub fn transform(
    data: Bytes,
    declared_content_type: &str,
    request: &TransformRequest,
) -> AssetResult<TransformResult> {
    transform_within(data, declared_content_type, request, DEFAULT_MAX_DIMENSION)
}

/// [`transform`] with an explicit bound on the output's width and height
///
/// `outside` grows the image past the requested box on one axis; a result
/// wider or taller than `max_dimension` is a `ValidationFailure` and is
/// rejected before any pixel buffer is allocated.
pub fn transform_within(
    data: Bytes,
    declared_content_type: &str,
    request: &TransformRequest,
    max_dimension: u32,
) -> AssetResult<TransformResult> {
    request.validate()?;

    if request.is_empty() {
        return Ok(TransformResult {
            data,
            content_type: declared_content_type.to_string(),
        });
    }

    let source_format = image::guess_format(&data)?;
    let mut image = image::load_from_memory_with_format(&data, source_format)?;

    if let Some((width, height)) = request.dimensions() {
        let fit = request.fit.unwrap_or_default();
        let (out_w, out_h) = output_dimensions(image.dimensions(), fit, width, height);
        if out_w > max_dimension || out_h > max_dimension {
            return Err(AssetError::ValidationFailure(format!(
                "fit={} on a {}x{} image would produce {}x{}, over the {} pixel limit",
                fit,
                image.width(),
                image.height(),
                out_w,
                out_h,
                max_dimension
            )));
        }
        image = resize(image, fit, width, height);
    }

    let (output_format, content_type) = match request.format {
        Some(format) => (format, format.mime_type().to_string()),
        None => {
            let format = OutputFormat::from_image_format(source_format).ok_or_else(|| {
                ImageError::Unsupported(UnsupportedError::from(ImageFormatHint::Exact(
                    source_format,
                )))
            })?;
            (format, declared_content_type.to_string())
        }
    };

    let encoded = encode(&image, output_format, request.quality)?;

    Ok(TransformResult {
        data: Bytes::from(encoded),
        content_type,
    })
}

/// Scale/crop `image` into a `width` x `height` box according to `fit`
pub fn resize(image: DynamicImage, fit: FitMode, width: u32, height: u32) -> DynamicImage {
    match fit {
        FitMode::Fill => image.resize_exact(width, height, RESAMPLE_FILTER),
        FitMode::Cover => image.resize_to_fill(width, height, RESAMPLE_FILTER),
        FitMode::Inside => image.resize(width, height, RESAMPLE_FILTER),
        FitMode::Outside => {
            let (w, h) = outside_dimensions(image.dimensions(), (width, height));
            image.resize_exact(w, h, RESAMPLE_FILTER)
        }
        FitMode::Contain => {
            let scaled = image.resize(width, height, RESAMPLE_FILTER).to_rgba8();
            let mut canvas = RgbaImage::from_pixel(width, height, LETTERBOX);
            let x = (width - scaled.width().min(width)) / 2;
            let y = (height - scaled.height().min(height)) / 2;
            imageops::overlay(&mut canvas, &scaled, i64::from(x), i64::from(y));
            DynamicImage::ImageRgba8(canvas)
        }
    }
}

/// Upper bound of the size `resize` produces for `fit`
fn output_dimensions(source: (u32, u32), fit: FitMode, width: u32, height: u32) -> (u32, u32) {
    match fit {
        FitMode::Outside => outside_dimensions(source, (width, height)),
        _ => (width, height),
    }
}

/// Smallest aspect-preserving size that covers the target box
fn outside_dimensions(source: (u32, u32), target: (u32, u32)) -> (u32, u32) {
    let (sw, sh) = (f64::from(source.0.max(1)), f64::from(source.1.max(1)));
    let (tw, th) = target;
    let scale = (f64::from(tw) / sw).max(f64::from(th) / sh);
    let w = ((sw * scale).round() as u32).max(tw);
    let h = ((sh * scale).round() as u32).max(th);
    (w, h)
}

fn encode(
    image: &DynamicImage,
    format: OutputFormat,
    quality: Option<u8>,
) -> Result<Vec<u8>, ImageError> {
    let mut buf = Cursor::new(Vec::new());

    match format {
        OutputFormat::Jpeg => {
            let quality = quality.unwrap_or(DEFAULT_JPEG_QUALITY);
            let rgb = DynamicImage::ImageRgb8(image.to_rgb8());
            rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut buf, quality))?;
        }
        other => {
            normalize_for(image, other).write_to(&mut buf, other.image_format())?;
        }
    }

    Ok(buf.into_inner())
}

/// Convert to a pixel layout the target encoder accepts
///
/// PNG and TIFF keep the decoded layout where they can, so a lossless
/// round trip leaves pixels untouched.
fn normalize_for(image: &DynamicImage, format: OutputFormat) -> DynamicImage {
    let color = image.color();
    let keep = match format {
        OutputFormat::Png => !matches!(color, ColorType::Rgb32F | ColorType::Rgba32F),
        OutputFormat::Tiff => matches!(
            color,
            ColorType::L8
                | ColorType::L16
                | ColorType::Rgb8
                | ColorType::Rgb16
                | ColorType::Rgba8
                | ColorType::Rgba16
        ),
        _ => matches!(color, ColorType::Rgb8 | ColorType::Rgba8),
    };

    if keep {
        image.clone()
    } else if color.has_alpha() {
        DynamicImage::ImageRgba8(image.to_rgba8())
    } else {
        DynamicImage::ImageRgb8(image.to_rgb8())
    }
}

fn parse_dimension(name: &str, value: &str, max_dimension: u32) -> AssetResult<u32> {
    let parsed: u32 = value.parse().map_err(|_| {
        AssetError::ValidationFailure(format!("{} must be a positive integer, got '{}'", name, value))
    })?;

    if parsed == 0 || parsed > max_dimension {
        return Err(AssetError::ValidationFailure(format!(
            "{} must be between 1 and {}, got {}",
            name, max_dimension, parsed
        )));
    }

    Ok(parsed)
}

fn parse_quality(value: &str) -> AssetResult<u8> {
    value
        .parse::<u8>()
        .ok()
        .filter(|q| (1..=100).contains(q))
        .ok_or_else(|| {
            AssetError::ValidationFailure(format!(
                "quality must be an integer between 1 and 100, got '{}'",
                value
            ))
        })
}
