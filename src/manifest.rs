// 该文件是 Endocris 项目的一部分。
// src/manifest.rs - CRIS 清单
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

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::FromPath;

#[derive(Error, Debug)]
pub enum ManifestError {
  #[error("清单文件 I/O 错误 {path}: {source}")]
  IoError {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
  #[error("清单 JSON 错误: {0}")]
  JsonError(#[from] serde_json::Error),
}

/// 一张已保存的掩码及其描述语句
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestRecord {
  pub img_path: String,
  pub mask_path: String,
  pub num_sents: usize,
  pub sents: Vec<String>,
}

impl ManifestRecord {
  pub fn new(img_path: impl Into<String>, mask_path: impl Into<String>, sents: &[String]) -> Self {
    Self {
      img_path: img_path.into(),
      mask_path: mask_path.into(),
      num_sents: sents.len(),
      sents: sents.to_vec(),
    }
  }
}

/// 按处理顺序排列的清单记录, 序列化为 JSON 数组
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manifest {
  records: Vec<ManifestRecord>,
}

impl FromPath for Manifest {
  type Error = ManifestError;

  fn from_path(path: &Path) -> Result<Self, Self::Error> {
    let file = File::open(path).map_err(|source| ManifestError::IoError {
      path: path.to_path_buf(),
      source,
    })?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
  }
}

impl Manifest {
  pub fn push(&mut self, record: ManifestRecord) {
    self.records.push(record);
  }

  pub fn records(&self) -> &[ManifestRecord] {
    &self.records
  }

  pub fn len(&self) -> usize {
    self.records.len()
  }

  pub fn is_empty(&self) -> bool {
    self.records.is_empty()
  }

  pub fn write_to(&self, path: &Path, pretty: bool) -> Result<(), ManifestError> {
    let io_error = |source: std::io::Error| ManifestError::IoError {
      path: path.to_path_buf(),
      source,
    };

    let mut writer = BufWriter::new(File::create(path).map_err(io_error)?);
    if pretty {
      serde_json::to_writer_pretty(&mut writer, self)?;
    } else {
      serde_json::to_writer(&mut writer, self)?;
    }
    writer.flush().map_err(io_error)?;

    info!("写入 {} 条清单记录到 {}", self.len(), path.display());
    Ok(())
  }
}

impl Extend<ManifestRecord> for Manifest {
  fn extend<T: IntoIterator<Item = ManifestRecord>>(&mut self, iter: T) {
    self.records.extend(iter);
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn sents(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
  }

  #[test]
  fn test_record_counts_sents() {
    let record = ManifestRecord::new(
      "images/frame.jpg",
      "cris_masks/frame_large_needle_driver.png",
      &sents(&["large needle driver", "needle driver"]),
    );
    assert_eq!(record.num_sents, 2);
    assert_eq!(record.num_sents, record.sents.len());
  }

  #[test]
  fn test_serializes_as_json_array() {
    let mut manifest = Manifest::default();
    manifest.push(ManifestRecord::new(
      "images/a.jpg",
      "cris_masks/a_vessel_sealer.png",
      &sents(&["vessel sealer"]),
    ));

    let json = serde_json::to_string(&manifest).unwrap();
    assert_eq!(
      json,
      r#"[{"img_path":"images/a.jpg","mask_path":"cris_masks/a_vessel_sealer.png","num_sents":1,"sents":["vessel sealer"]}]"#
    );
    assert_eq!(serde_json::to_string(&Manifest::default()).unwrap(), "[]");
  }

  #[test]
  fn test_write_and_read_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cris_train.json");
    let mut manifest = Manifest::default();
    manifest.extend([
      ManifestRecord::new("images/a.jpg", "cris_masks/a_instrument.png", &sents(&["tool"])),
      ManifestRecord::new("images/b.jpg", "cris_masks/b_instrument.png", &sents(&["tool"])),
    ]);

    manifest.write_to(&path, true).unwrap();
    assert_eq!(Manifest::from_path(&path).unwrap(), manifest);
  }

  #[test]
  fn test_write_to_missing_directory_fails() {
    let dir = tempfile::tempdir().unwrap();
    let result = Manifest::default().write_to(&dir.path().join("missing/out.json"), false);
    assert!(matches!(result, Err(ManifestError::IoError { .. })));
  }
}
