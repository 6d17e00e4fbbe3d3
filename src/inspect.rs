// 该文件是 Endocris 项目的一部分。
// src/inspect.rs - 标签图像像素值检查
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

use std::fmt;
use std::path::Path;

use crate::{FromPath, catalog::ClassCatalog, input::LabelFileError, mask::LabelMask};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueReport {
  pub value: u8,
  pub pixels: u64,
  /// 类别表中对应的类别名称
  pub class_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelReport {
  pub width: u32,
  pub height: u32,
  pub values: Vec<ValueReport>,
}

impl LabelReport {
  pub fn new(label: &LabelMask, catalog: &ClassCatalog) -> Self {
    let values = label
      .histogram()
      .into_iter()
      .map(|(value, pixels)| ValueReport {
        value,
        pixels,
        class_name: catalog.class_by_id(value).map(|class| class.name.clone()),
      })
      .collect();

    Self {
      width: label.width(),
      height: label.height(),
      values,
    }
  }

  pub fn distinct_values(&self) -> Vec<u8> {
    self.values.iter().map(|value| value.value).collect()
  }

  pub fn unknown_values(&self) -> Vec<u8> {
    self
      .values
      .iter()
      .filter(|value| value.class_name.is_none())
      .map(|value| value.value)
      .collect()
  }

  /// 每行一个像素值: 值, 类别名称, 像素数
  pub fn counts(&self) -> CountsTable<'_> {
    CountsTable(self)
  }
}

impl fmt::Display for LabelReport {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "包含的像素值: {:?}", self.distinct_values())
  }
}

pub struct CountsTable<'a>(&'a LabelReport);

impl fmt::Display for CountsTable<'_> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for value in &self.0.values {
      writeln!(
        f,
        "{:>3}  {:<28} {}",
        value.value,
        value.class_name.as_deref().unwrap_or("<未知>"),
        value.pixels
      )?;
    }
    Ok(())
  }
}

pub fn inspect_label(path: &Path, catalog: &ClassCatalog) -> Result<LabelReport, LabelFileError> {
  let label = LabelMask::from_path(path)?;
  Ok(LabelReport::new(&label, catalog))
}

#[cfg(test)]
mod tests {
  use super::*;
  use image::GrayImage;

  #[test]
  fn test_report_sorted_values_with_names() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("seq_1_frame000.bmp");
    GrayImage::from_raw(3, 2, vec![3, 0, 0, 1, 9, 3])
      .unwrap()
      .save(&path)
      .unwrap();

    let report = inspect_label(&path, &ClassCatalog::endovis2017()).unwrap();
    assert_eq!((report.width, report.height), (3, 2));
    assert_eq!(report.distinct_values(), vec![0, 1, 3, 9]);
    assert_eq!(report.unknown_values(), vec![9]);
    assert_eq!(report.to_string(), "包含的像素值: [0, 1, 3, 9]");

    let table = report.counts().to_string();
    let lines: Vec<&str> = table.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[2].contains("large_needle_driver"));
    assert!(lines[2].trim_end().ends_with('2'));
    assert!(lines[3].contains("<未知>"));
  }

  #[test]
  fn test_missing_label_fails_loudly() {
    let dir = tempfile::tempdir().unwrap();
    let result = inspect_label(&dir.path().join("nope.bmp"), &ClassCatalog::endovis2017());
    assert!(result.is_err());
  }
}
