// 该文件是 Endocris 项目的一部分。
// src/output.rs - 掩码输出
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

use crate::mask::BinaryMask;

pub const DEFAULT_MASKS_DIR: &str = "cris_masks";
pub const DEFAULT_MASK_EXTENSION: &str = "png";

/// 保存一张二值掩码, 返回相对数据集根目录的掩码路径
pub trait MaskWriter {
  fn write_mask(
    &mut self,
    stem: &str,
    class_name: &str,
    mask: &BinaryMask,
  ) -> Result<String, MaskOutputError>;
}

mod save_mask_file;
pub use self::save_mask_file::{DirectoryMaskOutput, MaskOutputError};

/// `<stem>_<class_name>.<extension>`
pub fn mask_file_name(stem: &str, class_name: &str, extension: &str) -> String {
  format!("{stem}_{class_name}.{extension}")
}

/// 只计算掩码路径, 不写文件
#[derive(Debug, Clone)]
pub struct DryRunMaskOutput {
  directory: String,
  extension: String,
  planned: Vec<String>,
}

impl DryRunMaskOutput {
  pub fn new(directory: &str, extension: &str) -> Self {
    Self {
      directory: directory.to_string(),
      extension: extension.to_string(),
      planned: Vec::new(),
    }
  }

  pub fn planned(&self) -> &[String] {
    &self.planned
  }
}

impl MaskWriter for DryRunMaskOutput {
  fn write_mask(
    &mut self,
    stem: &str,
    class_name: &str,
    _mask: &BinaryMask,
  ) -> Result<String, MaskOutputError> {
    let relative = format!(
      "{}/{}",
      self.directory,
      mask_file_name(stem, class_name, &self.extension)
    );
    self.planned.push(relative.clone());
    Ok(relative)
  }
}

impl<W: MaskWriter> MaskWriter for &mut W {
  fn write_mask(
    &mut self,
    stem: &str,
    class_name: &str,
    mask: &BinaryMask,
  ) -> Result<String, MaskOutputError> {
    (**self).write_mask(stem, class_name, mask)
  }
}
