// crates/tg_gis/src/table.rs

//! 要素表
//!
//! 矢量数据集的内存表示：每个要素由一个多边形集合和一组属性构成，
//! 表级字段定义保证所有要素的属性模式一致。

use crate::field::{FieldType, FieldValue};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tg_foundation::{TgError, TgResult};
use tg_geo::MultiPolygon;

/// 字段定义
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    /// 字段名
    pub name: String,
    /// 字段类型
    pub ftype: FieldType,
}

impl FieldDef {
    /// 创建字段定义
    pub fn new(name: impl Into<String>, ftype: FieldType) -> Self {
        Self {
            name: name.into(),
            ftype,
        }
    }
}

/// 矢量要素
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    /// 要素几何
    pub geometry: MultiPolygon,
    /// 属性（字段名 -> 值）
    pub attributes: BTreeMap<String, FieldValue>,
}

impl Feature {
    /// 创建无属性要素
    #[must_use]
    pub fn new(geometry: MultiPolygon) -> Self {
        Self {
            geometry,
            attributes: BTreeMap::new(),
        }
    }

    /// 设置属性（链式）
    #[must_use]
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// 读取属性
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&FieldValue> {
        self.attributes.get(name)
    }

    /// 要素面积（平方米）
    #[must_use]
    pub fn area(&self) -> f64 {
        self.geometry.area()
    }
}

/// 要素表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureTable {
    /// 数据集名称
    pub name: String,
    /// 字段定义（有序）
    pub fields: Vec<FieldDef>,
    /// 要素列表
    pub features: Vec<Feature>,
}

impl FeatureTable {
    /// 创建空表
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            features: Vec::new(),
        }
    }

    /// 创建带字段定义的空表
    pub fn with_fields(name: impl Into<String>, fields: Vec<FieldDef>) -> Self {
        Self {
            name: name.into(),
            fields,
            features: Vec::new(),
        }
    }

    /// 要素数量
    #[must_use]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// 是否为空表
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// 字段是否存在
    #[must_use]
    pub fn has_field(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f.name == name)
    }

    /// 查找字段定义
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// 校验一组字段的存在性
    ///
    /// `should_exist = true` 时要求全部存在，收集所有缺失字段后返回
    /// [`TgError::FieldNotFound`]；`should_exist = false` 时要求全部不存在，
    /// 任何已存在字段触发 [`TgError::FieldAlreadyExists`]。
    pub fn check_fields(&self, should_exist: bool, fields: &[&str]) -> TgResult<()> {
        if should_exist {
            let missing: Vec<String> = fields
                .iter()
                .filter(|f| !self.has_field(f))
                .map(|f| (*f).to_string())
                .collect();
            if !missing.is_empty() {
                return Err(TgError::fields_not_found(&self.name, missing));
            }
        } else {
            for f in fields {
                if self.has_field(f) {
                    return Err(TgError::field_already_exists(&self.name, *f));
                }
            }
        }
        Ok(())
    }

    /// 添加字段
    ///
    /// 字段已存在时：`overwrite = false` 返回 [`TgError::FieldAlreadyExists`]；
    /// `overwrite = true` 则替换字段定义并清除各要素上的旧值。
    pub fn add_field(&mut self, name: &str, ftype: FieldType, overwrite: bool) -> TgResult<()> {
        if self.has_field(name) {
            if !overwrite {
                return Err(TgError::field_already_exists(&self.name, name));
            }
            if let Some(def) = self.fields.iter_mut().find(|f| f.name == name) {
                def.ftype = ftype;
            }
            for feat in &mut self.features {
                feat.attributes.remove(name);
            }
            return Ok(());
        }
        self.fields.push(FieldDef::new(name, ftype));
        Ok(())
    }

    /// 用同一个值填充字段（字段必须已存在）
    pub fn populate_field(&mut self, name: &str, value: FieldValue) -> TgResult<()> {
        self.check_fields(true, &[name])?;
        self.check_value_type(name, &value)?;
        for feat in &mut self.features {
            feat.attributes.insert(name.to_string(), value.clone());
        }
        Ok(())
    }

    /// 逐要素计算填充字段（字段必须已存在）
    pub fn populate_with<F>(&mut self, name: &str, mut f: F) -> TgResult<()>
    where
        F: FnMut(&Feature) -> FieldValue,
    {
        self.check_fields(true, &[name])?;
        let expected = self.field(name).map(|def| def.ftype);
        for feat in &mut self.features {
            let value = f(feat);
            if let Some(expected) = expected {
                if expected != value.field_type() {
                    return Err(TgError::field_type_mismatch(
                        &self.name,
                        name,
                        expected.as_str(),
                        value.field_type().as_str(),
                    ));
                }
            }
            feat.attributes.insert(name.to_string(), value);
        }
        Ok(())
    }

    /// 校验值与字段定义的类型一致
    fn check_value_type(&self, name: &str, value: &FieldValue) -> TgResult<()> {
        if let Some(def) = self.field(name) {
            if def.ftype != value.field_type() {
                return Err(TgError::field_type_mismatch(
                    &self.name,
                    name,
                    def.ftype.as_str(),
                    value.field_type().as_str(),
                ));
            }
        }
        Ok(())
    }

    /// 重命名字段
    ///
    /// 旧字段必须存在，新字段名必须未被占用；要素属性键同步改名。
    pub fn rename_field(&mut self, old: &str, new: &str) -> TgResult<()> {
        self.check_fields(true, &[old])?;
        self.check_fields(false, &[new])?;
        if let Some(def) = self.fields.iter_mut().find(|f| f.name == old) {
            def.name = new.to_string();
        }
        for feat in &mut self.features {
            if let Some(value) = feat.attributes.remove(old) {
                feat.attributes.insert(new.to_string(), value);
            }
        }
        Ok(())
    }

    /// 添加要素
    pub fn push(&mut self, feature: Feature) {
        self.features.push(feature);
    }

    /// 全表几何总面积（平方米）
    #[must_use]
    pub fn total_area(&self) -> f64 {
        self.features.iter().map(Feature::area).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tg_geo::Polygon;

    fn unit_square_table(name: &str) -> FeatureTable {
        let mut t = FeatureTable::new(name);
        t.push(Feature::new(MultiPolygon::from_polygon(Polygon::rect(
            0.0, 0.0, 1.0, 1.0,
        ))));
        t.push(Feature::new(MultiPolygon::from_polygon(Polygon::rect(
            2.0, 0.0, 4.0, 1.0,
        ))));
        t
    }

    #[test]
    fn test_check_fields_collects_missing() {
        let mut t = unit_square_table("zones");
        t.add_field("id", FieldType::Long, false).unwrap();
        let err = t.check_fields(true, &["id", "surge", "slr"]).unwrap_err();
        match err {
            TgError::FieldNotFound { table, fields } => {
                assert_eq!(table, "zones");
                assert_eq!(fields, vec!["surge".to_string(), "slr".to_string()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_add_field_overwrite_contract() {
        let mut t = unit_square_table("t");
        t.add_field("area", FieldType::Double, false).unwrap();
        t.populate_field("area", FieldValue::Double(1.0)).unwrap();

        // 不允许覆盖时重复添加报错
        let err = t.add_field("area", FieldType::Double, false).unwrap_err();
        assert!(matches!(err, TgError::FieldAlreadyExists { .. }));

        // 允许覆盖时旧值被清除
        t.add_field("area", FieldType::Long, true).unwrap();
        assert!(t.features[0].attr("area").is_none());
        assert_eq!(t.field("area").unwrap().ftype, FieldType::Long);
    }

    #[test]
    fn test_populate_with() {
        let mut t = unit_square_table("t");
        t.add_field("totalarea", FieldType::Double, false).unwrap();
        t.populate_with("totalarea", |f| FieldValue::Double(f.area()))
            .unwrap();
        assert_eq!(t.features[0].attr("totalarea"), Some(&FieldValue::Double(1.0)));
        assert_eq!(t.features[1].attr("totalarea"), Some(&FieldValue::Double(2.0)));
    }

    #[test]
    fn test_populate_type_mismatch() {
        let mut t = unit_square_table("t");
        t.add_field("count", FieldType::Long, false).unwrap();
        let err = t
            .populate_field("count", FieldValue::Text("x".into()))
            .unwrap_err();
        assert!(matches!(err, TgError::FieldTypeMismatch { .. }));
    }

    #[test]
    fn test_rename_field() {
        let mut t = unit_square_table("t");
        t.add_field("gridcode", FieldType::Long, false).unwrap();
        t.populate_field("gridcode", FieldValue::Long(4)).unwrap();
        t.rename_field("gridcode", "GeoID").unwrap();
        assert!(!t.has_field("gridcode"));
        assert_eq!(t.features[0].attr("GeoID"), Some(&FieldValue::Long(4)));

        // 目标字段已存在时报错
        t.add_field("other", FieldType::Long, false).unwrap();
        assert!(t.rename_field("GeoID", "other").is_err());
    }

    #[test]
    fn test_populate_missing_field() {
        let mut t = unit_square_table("t");
        assert!(t.populate_field("ghost", FieldValue::Long(0)).is_err());
    }
}
