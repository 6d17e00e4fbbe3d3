// 该文件是 Endocris 项目的一部分。
// src/task.rs - 清单生成任务
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

use std::collections::BTreeMap;
use std::path::PathBuf;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
  FromPath,
  catalog::ClassCatalog,
  derive::{ClassMaskDeriver, Derive, DeriveResult},
  input::{DEFAULT_LABEL_EXTENSION, DatasetDir, InputError, Sample},
  manifest::{Manifest, ManifestError, ManifestRecord},
  mask::LabelMask,
  output::{
    DEFAULT_MASK_EXTENSION, DEFAULT_MASKS_DIR, DirectoryMaskOutput, DryRunMaskOutput,
    MaskOutputError, MaskWriter,
  },
};

#[derive(Error, Debug)]
pub enum TaskError {
  #[error("输入错误: {0}")]
  InputError(#[from] InputError),
  #[error("掩码输出错误: {0}")]
  MaskOutputError(#[from] MaskOutputError),
  #[error("清单错误: {0}")]
  ManifestError(#[from] ManifestError),
}

pub trait Task<I, M, O>: Sized {
  type Output;
  type Error;
  fn run_task(self, input: I, model: M, output: O) -> Result<Self::Output, Self::Error>;
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TaskSummary {
  pub images: usize,
  pub skipped_missing_label: usize,
  pub without_foreground: usize,
  pub masks_per_class: BTreeMap<String, usize>,
}

impl TaskSummary {
  pub fn masks_written(&self) -> usize {
    self.masks_per_class.values().sum()
  }

  pub fn print_summary(&self) {
    info!("=== 处理汇总 ===");
    info!("图像总数: {}", self.images);
    info!("缺少标签而跳过: {}", self.skipped_missing_label);
    info!("没有器械像素: {}", self.without_foreground);
    info!("生成掩码: {}", self.masks_written());
    for (class_name, count) in &self.masks_per_class {
      info!("  - {}: {}", class_name, count);
    }
    if self.skipped_missing_label > 0 {
      warn!("共有 {} 张图像缺少标签", self.skipped_missing_label);
    }
  }
}

#[derive(Debug, Clone)]
pub struct TaskReport {
  pub manifest: Manifest,
  pub summary: TaskSummary,
}

/// 逐张处理原图: 读取标签, 生成掩码, 保存非空掩码并记录清单。
/// 缺少标签的图像被跳过, 其他错误立即终止任务。
#[derive(Debug, Default)]
pub struct BuildManifestTask;

impl<'a, I, M, O> Task<I, M, O> for BuildManifestTask
where
  I: Iterator<Item = Sample>,
  M: Derive<Input = LabelMask, Output = DeriveResult<'a>>,
  O: MaskWriter,
{
  type Output = TaskReport;
  type Error = TaskError;

  fn run_task(self, input: I, model: M, mut output: O) -> Result<Self::Output, Self::Error> {
    info!("开始生成掩码...");
    let mut manifest = Manifest::default();
    let mut summary = TaskSummary::default();

    for sample in input {
      summary.images += 1;

      if !sample.has_label() {
        warn!(
          "找不到 {} 的标签图像: {}",
          sample.file_name,
          sample.label_path.display()
        );
        summary.skipped_missing_label += 1;
        continue;
      }

      let label = LabelMask::from_path(&sample.label_path).map_err(InputError::from)?;
      let result = model.derive(&label);

      if !result.unknown_values.is_empty() {
        warn!(
          "{} 含有类别表之外的像素值 {:?}, 只计入合并掩码",
          sample.label_path.display(),
          result.unknown_values
        );
      }
      if result.is_empty() {
        debug!("{} 没有器械像素", sample.file_name);
        summary.without_foreground += 1;
        continue;
      }

      for item in result.items {
        let mask_path = output.write_mask(&sample.stem, item.class_name, &item.mask)?;
        manifest.push(ManifestRecord::new(
          sample.relative_image_path.clone(),
          mask_path,
          item.sents,
        ));
        *summary
          .masks_per_class
          .entry(item.class_name.to_string())
          .or_default() += 1;
      }
    }

    summary.print_summary();
    Ok(TaskReport { manifest, summary })
  }
}

/// 一次完整运行的参数
#[derive(Debug, Clone)]
pub struct BuildOptions {
  pub root: PathBuf,
  /// 相对 `root` 的清单文件名
  pub manifest_file: String,
  pub masks_dir: String,
  pub label_extension: String,
  pub mask_extension: String,
  pub pretty: bool,
  pub dry_run: bool,
}

impl BuildOptions {
  pub fn new(root: impl Into<PathBuf>, manifest_file: impl Into<String>) -> Self {
    Self {
      root: root.into(),
      manifest_file: manifest_file.into(),
      masks_dir: DEFAULT_MASKS_DIR.to_string(),
      label_extension: DEFAULT_LABEL_EXTENSION.to_string(),
      mask_extension: DEFAULT_MASK_EXTENSION.to_string(),
      pretty: false,
      dry_run: false,
    }
  }

  pub fn manifest_path(&self) -> PathBuf {
    self.root.join(&self.manifest_file)
  }
}

/// 遍历数据集, 写出掩码, 全部成功后一次性写出清单
pub fn build_manifest(
  options: &BuildOptions,
  catalog: &ClassCatalog,
) -> Result<TaskReport, TaskError> {
  let dataset =
    DatasetDir::open(&options.root, &options.label_extension).map_err(InputError::from)?;
  let deriver = ClassMaskDeriver::new(catalog);

  if options.dry_run {
    let output = DryRunMaskOutput::new(&options.masks_dir, &options.mask_extension);
    let report = BuildManifestTask.run_task(dataset, deriver, output)?;
    info!(
      "试运行: 将生成 {} 条清单记录, 未写入任何文件",
      report.manifest.len()
    );
    return Ok(report);
  }

  let output = DirectoryMaskOutput::create(
    &options.root,
    &options.masks_dir,
    &options.mask_extension,
  )?;
  let report = BuildManifestTask.run_task(dataset, deriver, output)?;
  report
    .manifest
    .write_to(&options.manifest_path(), options.pretty)?;
  Ok(report)
}

#[cfg(test)]
mod tests {
  use super::*;
  use image::GrayImage;
  use std::fs;

  fn sample(dir: &std::path::Path, stem: &str, values: Option<&[u8]>) -> Sample {
    let label_path = dir.join(format!("{stem}.bmp"));
    if let Some(values) = values {
      GrayImage::from_raw(values.len() as u32, 1, values.to_vec())
        .unwrap()
        .save(&label_path)
        .unwrap();
    }
    Sample {
      file_name: format!("{stem}.jpg"),
      stem: stem.to_string(),
      image_path: dir.join(format!("{stem}.jpg")),
      relative_image_path: format!("images/{stem}.jpg"),
      label_path,
    }
  }

  #[test]
  fn test_task_records_only_non_empty_masks() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = ClassCatalog::endovis2017();
    let samples = vec![
      sample(dir.path(), "a", Some(&[0u8, 1, 3][..])),
      sample(dir.path(), "b", None),
      sample(dir.path(), "c", Some(&[0u8, 0, 0][..])),
    ];
    let mut output = DryRunMaskOutput::new("cris_masks", "png");

    let report = BuildManifestTask
      .run_task(
        samples.into_iter(),
        ClassMaskDeriver::new(&catalog),
        &mut output,
      )
      .unwrap();

    let masks: Vec<&str> = report
      .manifest
      .records()
      .iter()
      .map(|record| record.mask_path.as_str())
      .collect();
    assert_eq!(
      masks,
      vec![
        "cris_masks/a_instrument.png",
        "cris_masks/a_bipolar_forceps.png",
        "cris_masks/a_large_needle_driver.png",
      ]
    );
    assert_eq!(output.planned().len(), 3);
    assert!(
      report
        .manifest
        .records()
        .iter()
        .all(|record| record.img_path == "images/a.jpg" && record.num_sents == record.sents.len())
    );

    assert_eq!(report.summary.images, 3);
    assert_eq!(report.summary.skipped_missing_label, 1);
    assert_eq!(report.summary.without_foreground, 1);
    assert_eq!(report.summary.masks_written(), 3);
    assert_eq!(report.summary.masks_per_class.get("prograsp_forceps"), None);
  }

  #[test]
  fn test_dry_run_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("images")).unwrap();
    fs::create_dir_all(dir.path().join("annotations")).unwrap();
    fs::write(dir.path().join("images/f.png"), b"").unwrap();
    GrayImage::from_raw(2, 1, vec![0, 5])
      .unwrap()
      .save(dir.path().join("annotations/f.bmp"))
      .unwrap();

    let mut options = BuildOptions::new(dir.path(), "cris.json");
    options.dry_run = true;
    let report = build_manifest(&options, &ClassCatalog::endovis2017()).unwrap();

    assert_eq!(report.manifest.len(), 2);
    assert!(!dir.path().join("cris_masks").exists());
    assert!(!options.manifest_path().exists());
  }

  #[test]
  fn test_undecodable_label_aborts() {
    let dir = tempfile::tempdir().unwrap();
    let broken = sample(dir.path(), "broken", None);
    fs::write(&broken.label_path, b"garbage").unwrap();
    let catalog = ClassCatalog::endovis2017();

    let result = BuildManifestTask.run_task(
      vec![broken].into_iter(),
      ClassMaskDeriver::new(&catalog),
      DryRunMaskOutput::new("cris_masks", "png"),
    );
    assert!(matches!(result, Err(TaskError::InputError(_))));
  }
}
