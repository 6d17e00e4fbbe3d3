// 该文件是 Endocris 项目的一部分。
// src/mask.rs - 标签掩码与二值掩码
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

use image::{GrayImage, ImageBuffer, Luma};

use crate::catalog::{BACKGROUND_ID, ClassCatalog};

pub const SELECTED: u8 = 255;
pub const NOT_SELECTED: u8 = 0;

const PIXEL_VALUES: usize = u8::MAX as usize + 1;

/// 单通道标签图像, 像素值即类别 id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelMask {
  image: GrayImage,
}

impl From<GrayImage> for LabelMask {
  fn from(image: GrayImage) -> Self {
    Self { image }
  }
}

impl LabelMask {
  pub fn width(&self) -> u32 {
    self.image.width()
  }

  pub fn height(&self) -> u32 {
    self.image.height()
  }

  pub fn as_image(&self) -> &GrayImage {
    &self.image
  }

  /// 所有非背景像素
  pub fn union_mask(&self) -> BinaryMask {
    self.select(|value| value != BACKGROUND_ID)
  }

  /// 像素值恰好等于 `id` 的像素
  pub fn exact_mask(&self, id: u8) -> BinaryMask {
    self.select(|value| value == id)
  }

  fn select(&self, predicate: impl Fn(u8) -> bool) -> BinaryMask {
    let image = ImageBuffer::from_fn(self.width(), self.height(), |x, y| {
      if predicate(self.image.get_pixel(x, y)[0]) {
        Luma([SELECTED])
      } else {
        Luma([NOT_SELECTED])
      }
    });
    BinaryMask { image }
  }

  /// 各像素值出现的次数, 按像素值升序, 只包含出现过的值
  pub fn histogram(&self) -> Vec<(u8, u64)> {
    let mut counts = [0u64; PIXEL_VALUES];
    for &value in self.image.as_raw() {
      counts[value as usize] += 1;
    }
    counts
      .iter()
      .enumerate()
      .filter(|(_, count)| **count > 0)
      .map(|(value, count)| (value as u8, *count))
      .collect()
  }

  pub fn distinct_values(&self) -> Vec<u8> {
    self.histogram().into_iter().map(|(value, _)| value).collect()
  }

  /// 类别表中不存在的非背景像素值。这些像素只计入合并掩码。
  pub fn unknown_values(&self, catalog: &ClassCatalog) -> Vec<u8> {
    self
      .distinct_values()
      .into_iter()
      .filter(|value| *value != BACKGROUND_ID && !catalog.contains_id(*value))
      .collect()
  }
}

/// 二值掩码, 选中像素为 255, 其余为 0
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryMask {
  image: GrayImage,
}

impl BinaryMask {
  pub fn width(&self) -> u32 {
    self.image.width()
  }

  pub fn height(&self) -> u32 {
    self.image.height()
  }

  pub fn as_image(&self) -> &GrayImage {
    &self.image
  }

  pub fn into_image(self) -> GrayImage {
    self.image
  }

  pub fn is_selected(&self, x: u32, y: u32) -> bool {
    self.image.get_pixel(x, y)[0] == SELECTED
  }

  pub fn selected_pixels(&self) -> u64 {
    self
      .image
      .as_raw()
      .iter()
      .filter(|value| **value == SELECTED)
      .count() as u64
  }

  pub fn is_empty(&self) -> bool {
    !self.image.as_raw().contains(&SELECTED)
  }
}
