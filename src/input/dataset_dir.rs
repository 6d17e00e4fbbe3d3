// 该文件是 Endocris 项目的一部分。
// src/input/dataset_dir.rs - 数据集目录遍历
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

use crate::FromPath;

pub const IMAGES_DIR: &str = "images";
pub const ANNOTATIONS_DIR: &str = "annotations";
pub const DEFAULT_LABEL_EXTENSION: &str = "bmp";

// 这些扩展名的原图对应的标签文件改用标签扩展名, 其余原样保留
const RELABELED_EXTENSIONS: &[&str] = &["jpg", "png"];

#[derive(Error, Debug)]
pub enum DatasetError {
  #[error("数据集根目录不存在: {0}")]
  MissingRoot(PathBuf),
  #[error("无法读取图像目录 {path}: {source}")]
  ReadImages {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
  #[error("文件名不是有效的 UTF-8: {0}")]
  NonUtf8Name(PathBuf),
}

/// 一张原图及其预期的标签图像位置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample {
  /// 原图文件名, 如 `seq_1_frame000.jpg`
  pub file_name: String,
  /// 去掉扩展名的文件名, 用于掩码命名
  pub stem: String,
  pub image_path: PathBuf,
  /// 相对数据集根目录的原图路径, 以 `/` 分隔
  pub relative_image_path: String,
  pub label_path: PathBuf,
}

impl Sample {
  pub fn has_label(&self) -> bool {
    self.label_path.is_file()
  }
}

/// 按文件名字典序遍历 `<root>/images` 下的原图
#[derive(Debug)]
pub struct DatasetDir {
  root: PathBuf,
  samples: std::vec::IntoIter<Sample>,
}

impl FromPath for DatasetDir {
  type Error = DatasetError;

  fn from_path(path: &Path) -> Result<Self, Self::Error> {
    Self::open(path, DEFAULT_LABEL_EXTENSION)
  }
}

impl DatasetDir {
  pub fn open(root: impl AsRef<Path>, label_extension: &str) -> Result<Self, DatasetError> {
    let root = root.as_ref().to_path_buf();
    if !root.is_dir() {
      return Err(DatasetError::MissingRoot(root));
    }

    let images_dir = root.join(IMAGES_DIR);
    let read_images = |source: std::io::Error| DatasetError::ReadImages {
      path: images_dir.clone(),
      source,
    };

    let mut file_names = Vec::new();
    for entry in std::fs::read_dir(&images_dir).map_err(read_images)? {
      let entry = entry.map_err(read_images)?;
      let path = entry.path();
      if !path.is_file() {
        debug!("跳过非文件条目: {}", path.display());
        continue;
      }
      let file_name = entry
        .file_name()
        .into_string()
        .map_err(|_| DatasetError::NonUtf8Name(path.clone()))?;
      file_names.push(file_name);
    }
    file_names.sort();

    info!(
      "在 {} 中找到 {} 张图像",
      images_dir.display(),
      file_names.len()
    );

    let samples: Vec<Sample> = file_names
      .into_iter()
      .map(|file_name| sample_for(&root, file_name, label_extension))
      .collect();

    Ok(Self {
      root,
      samples: samples.into_iter(),
    })
  }

  pub fn root(&self) -> &Path {
    &self.root
  }
}

impl Iterator for DatasetDir {
  type Item = Sample;

  fn next(&mut self) -> Option<Self::Item> {
    self.samples.next()
  }

  fn size_hint(&self) -> (usize, Option<usize>) {
    self.samples.size_hint()
  }
}

impl ExactSizeIterator for DatasetDir {}

fn sample_for(root: &Path, file_name: String, label_extension: &str) -> Sample {
  let stem = Path::new(&file_name)
    .file_stem()
    .and_then(|stem| stem.to_str())
    .unwrap_or(&file_name)
    .to_string();

  Sample {
    image_path: root.join(IMAGES_DIR).join(&file_name),
    relative_image_path: format!("{IMAGES_DIR}/{file_name}"),
    label_path: root
      .join(ANNOTATIONS_DIR)
      .join(annotation_file_name(&file_name, label_extension)),
    stem,
    file_name,
  }
}

/// 原图文件名对应的标签文件名
///
/// `.jpg` 与 `.png` (不区分大小写) 替换为 `label_extension`,
/// 其他扩展名保持不变。
pub fn annotation_file_name(file_name: &str, label_extension: &str) -> String {
  match file_name.rsplit_once('.') {
    Some((stem, extension))
      if !stem.is_empty()
        && RELABELED_EXTENSIONS
          .iter()
          .any(|known| extension.eq_ignore_ascii_case(known)) =>
    {
      format!("{stem}.{label_extension}")
    }
    _ => file_name.to_string(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::fs;

  #[test]
  fn test_annotation_file_name() {
    assert_eq!(annotation_file_name("frame000.jpg", "bmp"), "frame000.bmp");
    assert_eq!(annotation_file_name("frame000.PNG", "bmp"), "frame000.bmp");
    assert_eq!(annotation_file_name("frame000.bmp", "bmp"), "frame000.bmp");
    assert_eq!(annotation_file_name("frame000.tif", "bmp"), "frame000.tif");
    assert_eq!(annotation_file_name("a.b.jpg", "png"), "a.b.png");
    assert_eq!(annotation_file_name("noext", "bmp"), "noext");
    assert_eq!(annotation_file_name(".jpg", "bmp"), ".jpg");
  }

  #[test]
  fn test_lists_images_in_lexicographic_order() {
    let dir = tempfile::tempdir().unwrap();
    let images = dir.path().join(IMAGES_DIR);
    fs::create_dir_all(images.join("nested")).unwrap();
    for name in ["seq_2_frame000.jpg", "seq_1_frame001.png", "seq_1_frame000.jpg"] {
      fs::write(images.join(name), b"").unwrap();
    }

    let dataset = DatasetDir::from_path(dir.path()).unwrap();
    assert_eq!(dataset.len(), 3);
    let samples: Vec<Sample> = dataset.collect();
    let names: Vec<&str> = samples.iter().map(|s| s.file_name.as_str()).collect();
    assert_eq!(
      names,
      vec!["seq_1_frame000.jpg", "seq_1_frame001.png", "seq_2_frame000.jpg"]
    );

    let first = &samples[0];
    assert_eq!(first.stem, "seq_1_frame000");
    assert_eq!(first.relative_image_path, "images/seq_1_frame000.jpg");
    assert_eq!(
      first.label_path,
      dir.path().join("annotations").join("seq_1_frame000.bmp")
    );
    assert!(!first.has_label());
  }

  #[test]
  fn test_missing_root_or_images_dir() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
      DatasetDir::open(dir.path().join("nope"), "bmp"),
      Err(DatasetError::MissingRoot(_))
    ));
    assert!(matches!(
      DatasetDir::open(dir.path(), "bmp"),
      Err(DatasetError::ReadImages { .. })
    ));
  }
}
