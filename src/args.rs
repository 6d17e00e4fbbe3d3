// 该文件是 Endocris 项目的一部分。
// src/args.rs - 项目参数配置
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

use std::path::PathBuf;

use clap::Parser;

use endocris::{
  input::DEFAULT_LABEL_EXTENSION,
  output::{DEFAULT_MASK_EXTENSION, DEFAULT_MASKS_DIR},
  task::BuildOptions,
};

/// 由 EndoVis 标签图像生成 CRIS 二值掩码与清单
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 数据集根目录, 包含 images 与 annotations 子目录
  #[arg(value_name = "ROOT")]
  pub root: PathBuf,

  /// 清单文件名 (相对数据集根目录)
  #[arg(value_name = "MANIFEST")]
  pub manifest: String,

  /// 类别表 TOML 文件, 缺省使用内置的 EndoVis 2017 类别表
  #[arg(long, value_name = "FILE")]
  pub catalog: Option<PathBuf>,

  /// 掩码输出目录名 (相对数据集根目录)
  #[arg(long, default_value = DEFAULT_MASKS_DIR, value_name = "DIR")]
  pub masks_dir: String,

  /// 标签图像扩展名
  #[arg(long, default_value = DEFAULT_LABEL_EXTENSION, value_name = "EXT")]
  pub label_ext: String,

  /// 以缩进格式写出清单
  #[arg(long)]
  pub pretty: bool,

  /// 只统计, 不写入掩码与清单
  #[arg(long)]
  pub dry_run: bool,
}

impl Args {
  pub fn to_build_options(&self) -> BuildOptions {
    let mut options = BuildOptions::new(&self.root, &self.manifest);
    options.masks_dir = self.masks_dir.clone();
    options.label_extension = self.label_ext.trim_start_matches('.').to_string();
    options.mask_extension = DEFAULT_MASK_EXTENSION.to_string();
    options.pretty = self.pretty;
    options.dry_run = self.dry_run;
    options
  }
}
