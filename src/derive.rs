// 该文件是 Endocris 项目的一部分。
// src/derive.rs - 由标签图像生成各类别二值掩码
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

use crate::{
  catalog::{BACKGROUND_ID, ClassCatalog},
  mask::{BinaryMask, LabelMask},
};

pub trait Derive {
  type Input;
  type Output;

  fn derive(&self, input: &Self::Input) -> Self::Output;
}

#[derive(Debug, Clone)]
pub struct DeriveItem<'a> {
  /// 合并类别为 `None`
  pub class_id: Option<u8>,
  pub class_name: &'a str,
  pub sents: &'a [String],
  pub mask: BinaryMask,
}

#[derive(Debug, Clone, Default)]
pub struct DeriveResult<'a> {
  pub items: Vec<DeriveItem<'a>>,
  /// 类别表之外的非背景像素值
  pub unknown_values: Vec<u8>,
}

impl DeriveResult<'_> {
  pub fn is_empty(&self) -> bool {
    self.items.is_empty()
  }
}

/// 先输出合并类别的掩码, 再按 id 升序输出各器械类别的掩码。
/// 空掩码不会出现在结果中。
#[derive(Debug, Clone, Copy)]
pub struct ClassMaskDeriver<'a> {
  catalog: &'a ClassCatalog,
}

impl<'a> ClassMaskDeriver<'a> {
  pub fn new(catalog: &'a ClassCatalog) -> Self {
    Self { catalog }
  }

  pub fn catalog(&self) -> &'a ClassCatalog {
    self.catalog
  }
}

impl<'a> Derive for ClassMaskDeriver<'a> {
  type Input = LabelMask;
  type Output = DeriveResult<'a>;

  fn derive(&self, label: &LabelMask) -> DeriveResult<'a> {
    let present = label.distinct_values();
    let mut result = DeriveResult::default();

    if present.iter().any(|value| *value != BACKGROUND_ID) {
      let union = self.catalog.union_class();
      result.items.push(DeriveItem {
        class_id: None,
        class_name: &union.name,
        sents: &union.sents,
        mask: label.union_mask(),
      });
    }

    for class in self.catalog.instruments() {
      if present.binary_search(&class.id).is_err() {
        continue;
      }
      result.items.push(DeriveItem {
        class_id: Some(class.id),
        class_name: &class.name,
        sents: &class.sents,
        mask: label.exact_mask(class.id),
      });
    }

    result.unknown_values = present
      .into_iter()
      .filter(|value| *value != BACKGROUND_ID && !self.catalog.contains_id(*value))
      .collect();

    result
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use image::GrayImage;

  fn label(values: &[u8]) -> LabelMask {
    LabelMask::from(GrayImage::from_raw(values.len() as u32, 1, values.to_vec()).unwrap())
  }

  fn names<'a>(result: &'a DeriveResult) -> Vec<&'a str> {
    result.items.iter().map(|item| item.class_name).collect()
  }

  #[test]
  fn test_forceps_and_needle_driver() {
    let catalog = ClassCatalog::endovis2017();
    let result = ClassMaskDeriver::new(&catalog).derive(&label(&[0, 1, 3, 3, 0]));

    assert_eq!(
      names(&result),
      vec!["instrument", "bipolar_forceps", "large_needle_driver"]
    );
    assert_eq!(result.items[0].class_id, None);
    assert_eq!(result.items[0].mask.selected_pixels(), 3);
    assert_eq!(result.items[1].class_id, Some(1));
    assert_eq!(result.items[1].mask.selected_pixels(), 1);
    assert_eq!(result.items[2].class_id, Some(3));
    assert_eq!(result.items[2].sents, &["large needle driver", "needle driver"]);
    assert!(result.items.iter().all(|item| !item.mask.is_empty()));
    assert!(result.unknown_values.is_empty());
  }

  #[test]
  fn test_pure_background_yields_nothing() {
    let catalog = ClassCatalog::endovis2017();
    let result = ClassMaskDeriver::new(&catalog).derive(&label(&[0; 8]));
    assert!(result.is_empty());
  }

  #[test]
  fn test_unknown_ids_only_reach_union() {
    let catalog = ClassCatalog::endovis2017();
    let result = ClassMaskDeriver::new(&catalog).derive(&label(&[0, 8, 8, 7]));

    assert_eq!(
      names(&result),
      vec!["instrument", "other_medical_instruments"]
    );
    assert_eq!(result.items[0].mask.selected_pixels(), 3);
    assert_eq!(result.unknown_values, vec![8]);
  }
}
