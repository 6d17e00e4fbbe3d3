// 该文件是 Endocris 项目的一部分。
// src/bin/inspect_label.rs - 查看标签图像包含的像素值
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

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use endocris::{FromPath, catalog::ClassCatalog, inspect::inspect_label};

/// 在运行清单生成前确认标签图像的类别编码
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 标签图像路径
  #[arg(value_name = "LABEL")]
  pub path: PathBuf,
  /// 同时输出每个像素值的像素数
  #[arg(long)]
  pub counts: bool,
  /// 类别表 TOML 文件
  #[arg(long, value_name = "FILE")]
  pub catalog: Option<PathBuf>,
}

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = Args::parse();

  let catalog = match &args.catalog {
    Some(path) => ClassCatalog::from_path(path)
      .with_context(|| format!("无法加载类别表: {}", path.display()))?,
    None => ClassCatalog::endovis2017(),
  };

  let report = inspect_label(&args.path, &catalog)
    .with_context(|| format!("无法检查标签图像: {}", args.path.display()))?;
  info!("标签图像尺寸: {}x{}", report.width, report.height);

  println!("{report}");
  if args.counts {
    print!("{}", report.counts());
  }

  let unknown = report.unknown_values();
  if !unknown.is_empty() {
    warn!("类别表中没有这些像素值: {:?}", unknown);
  }

  Ok(())
}
