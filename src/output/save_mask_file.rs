// 该文件是 Endocris 项目的一部分。
// src/output/save_mask_file.rs - 保存掩码文件
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

use thiserror::Error;
use tracing::{debug, info};

use crate::{
  mask::BinaryMask,
  output::{MaskWriter, mask_file_name},
};

#[derive(Error, Debug)]
pub enum MaskOutputError {
  #[error("无法创建掩码目录 {path}: {source}")]
  IoError {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
  #[error("无法保存掩码 {path}: {source}")]
  ImageError {
    path: PathBuf,
    #[source]
    source: image::ImageError,
  },
}

/// 将掩码写入 `<root>/<directory>/<stem>_<class>.<extension>`
#[derive(Debug, Clone)]
pub struct DirectoryMaskOutput {
  root: PathBuf,
  directory: String,
  extension: String,
}

impl DirectoryMaskOutput {
  /// 目录不存在时创建, 已有文件保留
  pub fn create(
    root: impl AsRef<Path>,
    directory: &str,
    extension: &str,
  ) -> Result<Self, MaskOutputError> {
    let root = root.as_ref().to_path_buf();
    let masks_dir = root.join(directory);
    if !masks_dir.exists() {
      std::fs::create_dir_all(&masks_dir).map_err(|source| MaskOutputError::IoError {
        path: masks_dir.clone(),
        source,
      })?;
      info!("创建掩码目录: {}", masks_dir.display());
    }

    Ok(Self {
      root,
      directory: directory.to_string(),
      extension: extension.to_string(),
    })
  }

  pub fn masks_dir(&self) -> PathBuf {
    self.root.join(&self.directory)
  }
}

impl MaskWriter for DirectoryMaskOutput {
  fn write_mask(
    &mut self,
    stem: &str,
    class_name: &str,
    mask: &BinaryMask,
  ) -> Result<String, MaskOutputError> {
    let file_name = mask_file_name(stem, class_name, &self.extension);
    let path = self.masks_dir().join(&file_name);

    mask
      .as_image()
      .save(&path)
      .map_err(|source| MaskOutputError::ImageError {
        path: path.clone(),
        source,
      })?;
    debug!("保存掩码: {}", path.display());

    Ok(format!("{}/{}", self.directory, file_name))
  }
}
