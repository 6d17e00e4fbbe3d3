// 该文件是 Endocris 项目的一部分。
// src/input/read_label_file.rs - 标签图像文件输入
//
// 本文件根据 Apache 许可证第 2.0 版（以下简称“许可证”）授权使用；
// 除非遵守该许可证条款，否则您不得使用本文件。
// 您可通过以下网址获取许可证副本：
// http://www.apache.org/licenses/LICENSE-2.0
// 除非适用法律要求或书面同意，根据本许可协议分发的软件均按“原样”提供，
// 不附带任何形式的明示或暗示的保证或条件。
// 有关许可权限与限制的具体条款，请参阅本许可协议。
//
// Copyright (C) 2026 Endocris Contributors

use std::path::{Path, PathBuf};

use image::{ColorType, DynamicImage, GrayImage, ImageBuffer, ImageReader, Luma, Pixel};
use thiserror::Error;
use tracing::{debug, error};

use crate::{FromPath, mask::LabelMask};

#[derive(Error, Debug)]
pub enum LabelFileError {
  #[error("无法打开标签图像 {path}: {source}")]
  IoError {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
  #[error("无法解码标签图像 {path}: {source}")]
  ImageLoadError {
    path: PathBuf,
    #[source]
    source: image::ImageError,
  },
  #[error("标签图像不是单通道 8 位图像 {path}: {color:?}")]
  NotSingleChannel { path: PathBuf, color: ColorType },
}

impl FromPath for LabelMask {
  type Error = LabelFileError;

  fn from_path(path: &Path) -> Result<Self, Self::Error> {
    let image = ImageReader::open(path)
      .map_err(|source| LabelFileError::IoError {
        path: path.to_path_buf(),
        source,
      })?
      .decode()
      .map_err(|source| LabelFileError::ImageLoadError {
        path: path.to_path_buf(),
        source,
      })?;

    let color = image.color();
    debug!("读取标签图像 {} ({:?})", path.display(), color);

    match into_single_channel(image) {
      Some(gray) => Ok(LabelMask::from(gray)),
      None => {
        error!("标签图像不是单通道图像: {} ({:?})", path.display(), color);
        Err(LabelFileError::NotSingleChannel {
          path: path.to_path_buf(),
          color,
        })
      }
    }
  }
}

pub fn read_label_mask(path: impl AsRef<Path>) -> Result<LabelMask, LabelFileError> {
  LabelMask::from_path(path.as_ref())
}

// 调色板 BMP 会被解码为 RGB(A), 只要每个像素 R == G == B 即视为单通道
fn into_single_channel(image: DynamicImage) -> Option<GrayImage> {
  match image {
    DynamicImage::ImageLuma8(gray) => Some(gray),
    DynamicImage::ImageLumaA8(gray_alpha) => Some(ImageBuffer::from_fn(
      gray_alpha.width(),
      gray_alpha.height(),
      |x, y| Luma([gray_alpha.get_pixel(x, y)[0]]),
    )),
    DynamicImage::ImageRgb8(rgb) => gray_from_color(&rgb),
    DynamicImage::ImageRgba8(rgba) => gray_from_color(&rgba),
    _ => None,
  }
}

fn gray_from_color<P>(image: &ImageBuffer<P, Vec<u8>>) -> Option<GrayImage>
where
  P: Pixel<Subpixel = u8>,
{
  let mut gray = GrayImage::new(image.width(), image.height());
  for (x, y, pixel) in image.enumerate_pixels() {
    let channels = pixel.channels();
    if channels[0] != channels[1] || channels[1] != channels[2] {
      return None;
    }
    gray.put_pixel(x, y, Luma([channels[0]]));
  }
  Some(gray)
}
