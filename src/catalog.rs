// 该文件是 Endocris 项目的一部分。
// src/catalog.rs - 器械类别表
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

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::FromPath;

const ENDOVIS2017_TOML: &str = include_str!("../labels/endovis2017.toml");

pub const BACKGROUND_ID: u8 = 0;
pub const BACKGROUND_NAME: &str = "background";

#[derive(Error, Debug)]
pub enum CatalogError {
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("类别表解析错误: {0}")]
  ParseError(#[from] toml::de::Error),
  #[error("缺少背景类别 (id 0)")]
  MissingBackground,
  #[error("背景类别名称必须为 'background', 实际为 '{0}'")]
  BackgroundMisnamed(String),
  #[error("类别 id 重复: {0}")]
  DuplicateId(u8),
  #[error("类别名称重复: {0}")]
  DuplicateName(String),
  #[error("类别名称无效: '{0}'")]
  InvalidName(String),
  #[error("类别 '{0}' 没有描述语句")]
  EmptySents(String),
  #[error("类别 '{0}' 含有空白描述语句")]
  BlankSent(String),
}

/// 标签图像中的一个类别, `id` 即像素值
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClassEntry {
  pub id: u8,
  pub name: String,
  pub sents: Vec<String>,
}

/// 所有非背景像素合并而成的通用类别
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UnionEntry {
  pub name: String,
  pub sents: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
  union: UnionEntry,
  classes: Vec<ClassEntry>,
}

/// 类别 id 与描述语句的显式映射, 构造时即完成校验, 之后不可变。
///
/// 类别按 id 升序保存, 因此 [`ClassCatalog::instruments`] 的顺序与
/// 标签编码顺序一致, 与文件中的书写顺序无关。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassCatalog {
  union: UnionEntry,
  classes: Vec<ClassEntry>,
}

impl Default for ClassCatalog {
  fn default() -> Self {
    Self::endovis2017()
  }
}

impl FromPath for ClassCatalog {
  type Error = CatalogError;

  fn from_path(path: &Path) -> Result<Self, Self::Error> {
    let content = std::fs::read_to_string(path)?;
    debug!("读取类别表: {}", path.display());
    Self::from_toml_str(&content)
  }
}

impl ClassCatalog {
  /// 内置的 EndoVis 2017 类别表
  pub fn endovis2017() -> Self {
    Self::from_toml_str(ENDOVIS2017_TOML).expect("内置类别表无效")
  }

  pub fn from_toml_str(content: &str) -> Result<Self, CatalogError> {
    let CatalogFile { union, classes } = toml::from_str(content)?;
    Self::new(union, classes)
  }

  pub fn new(union: UnionEntry, mut classes: Vec<ClassEntry>) -> Result<Self, CatalogError> {
    classes.sort_by_key(|class| class.id);

    let mut ids = HashSet::new();
    let mut names = HashSet::new();
    check_entry(&union.name, &union.sents)?;
    names.insert(union.name.as_str());

    for class in &classes {
      check_entry(&class.name, &class.sents)?;
      if !ids.insert(class.id) {
        return Err(CatalogError::DuplicateId(class.id));
      }
      if !names.insert(class.name.as_str()) {
        return Err(CatalogError::DuplicateName(class.name.clone()));
      }
    }

    match classes.first() {
      Some(first) if first.id == BACKGROUND_ID && first.name != BACKGROUND_NAME => {
        return Err(CatalogError::BackgroundMisnamed(first.name.clone()));
      }
      Some(first) if first.id == BACKGROUND_ID => {}
      _ => return Err(CatalogError::MissingBackground),
    }

    Ok(Self { union, classes })
  }

  pub fn union_class(&self) -> &UnionEntry {
    &self.union
  }

  pub fn background(&self) -> &ClassEntry {
    // new() 保证首个类别为背景
    &self.classes[0]
  }

  /// 全部非背景类别, 按 id 升序
  pub fn instruments(&self) -> impl Iterator<Item = &ClassEntry> {
    self.classes.iter().filter(|class| class.id != BACKGROUND_ID)
  }

  pub fn classes(&self) -> &[ClassEntry] {
    &self.classes
  }

  pub fn class_by_id(&self, id: u8) -> Option<&ClassEntry> {
    self
      .classes
      .binary_search_by_key(&id, |class| class.id)
      .ok()
      .map(|index| &self.classes[index])
  }

  pub fn class_by_name(&self, name: &str) -> Option<&ClassEntry> {
    self.classes.iter().find(|class| class.name == name)
  }

  pub fn contains_id(&self, id: u8) -> bool {
    self.class_by_id(id).is_some()
  }

  pub fn len(&self) -> usize {
    self.classes.len()
  }

  pub fn is_empty(&self) -> bool {
    self.classes.is_empty()
  }
}

// 类别名称会进入掩码文件名, 只允许字母、数字、下划线与连字符
fn check_entry(name: &str, sents: &[String]) -> Result<(), CatalogError> {
  let valid_name = !name.is_empty()
    && name
      .chars()
      .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
  if !valid_name {
    return Err(CatalogError::InvalidName(name.to_string()));
  }
  if sents.is_empty() {
    return Err(CatalogError::EmptySents(name.to_string()));
  }
  if sents.iter().any(|sent| sent.trim().is_empty()) {
    return Err(CatalogError::BlankSent(name.to_string()));
  }
  Ok(())
}
