// 该文件是 Endocris 项目的一部分。
// src/input.rs - 数据集与标签图像输入
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

use thiserror::Error;

mod dataset_dir;
mod read_label_file;

pub use self::dataset_dir::{
  ANNOTATIONS_DIR, DEFAULT_LABEL_EXTENSION, DatasetDir, DatasetError, IMAGES_DIR, Sample,
  annotation_file_name,
};
pub use self::read_label_file::{LabelFileError, read_label_mask};

#[derive(Error, Debug)]
pub enum InputError {
  #[error("数据集目录错误: {0}")]
  DatasetError(#[from] DatasetError),
  #[error("标签图像错误: {0}")]
  LabelFileError(#[from] LabelFileError),
}
