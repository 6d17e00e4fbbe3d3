// 该文件是 Endocris 项目的一部分。
// src/main.rs - 清单生成主程序
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

mod args;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use endocris::{FromPath, catalog::ClassCatalog, task::build_manifest};

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = args::Args::parse();
  let options = args.to_build_options();

  info!("数据集根目录: {}", options.root.display());
  info!("清单文件: {}", options.manifest_path().display());
  info!("掩码目录: {}", options.root.join(&options.masks_dir).display());

  let catalog = match &args.catalog {
    Some(path) => ClassCatalog::from_path(path)
      .with_context(|| format!("无法加载类别表: {}", path.display()))?,
    None => ClassCatalog::endovis2017(),
  };
  info!(
    "类别表: {} 个类别, 合并类别 '{}'",
    catalog.len(),
    catalog.union_class().name
  );

  let report = build_manifest(&options, &catalog)
    .with_context(|| format!("处理数据集失败: {}", options.root.display()))?;

  if !options.dry_run {
    info!(
      "完成! 共 {} 条记录, 已保存至 {}",
      report.manifest.len(),
      options.manifest_path().display()
    );
  }

  Ok(())
}
