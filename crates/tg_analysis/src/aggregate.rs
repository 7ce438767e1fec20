// crates/tg_analysis/src/aggregate.rs

//! 分区聚合
//!
//! 按潮闸编号字段分组，对数值列做归约。两种归约方式：
//! 去重计数（建筑物数量，同一建筑的多个碎片只算一次）和
//! 求和（湿地面积，跨碎片累加）。

use std::collections::{BTreeMap, BTreeSet};
use tg_foundation::{TgError, TgResult};
use tg_gis::{FeatureTable, FieldValue};

/// 归约的取值列
#[derive(Debug, Clone, Copy)]
pub enum ValueField<'a> {
    /// 属性字段的值
    Attribute(&'a str),
    /// 要素几何面积
    Area,
}

/// 归约方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Reducer {
    /// 组内不同取值的个数（默认）
    #[default]
    DistinctCount,
    /// 组内数值求和
    Sum,
}

/// 按分组字段归约
///
/// 分组字段（以及取值为属性时的取值字段）必须存在，缺失字段在主循环前
/// 一次性检出并以 [`TgError::FieldNotFound`] 报告。行在分组前按
/// (分组值, 取值) 全排序，返回的映射按分组值升序，与输入行顺序无关。
pub fn aggregate_by_group(
    table: &FeatureTable,
    group_field: &str,
    value: ValueField<'_>,
    reducer: Reducer,
) -> TgResult<BTreeMap<FieldValue, f64>> {
    let mut wanted = vec![group_field];
    if let ValueField::Attribute(name) = value {
        wanted.push(name);
    }
    table.check_fields(true, &wanted)?;

    // (分组值, 取值)
    let mut rows: Vec<(FieldValue, FieldValue)> = Vec::with_capacity(table.len());
    for feat in &table.features {
        let Some(key) = feat.attr(group_field).cloned() else {
            continue;
        };
        let val = match value {
            ValueField::Area => FieldValue::Double(feat.area()),
            ValueField::Attribute(name) => match feat.attr(name) {
                Some(v) => v.clone(),
                None => continue,
            },
        };
        rows.push((key, val));
    }
    rows.sort();

    let mut result: BTreeMap<FieldValue, f64> = BTreeMap::new();
    let mut i = 0;
    while i < rows.len() {
        let key = rows[i].0.clone();
        let mut j = i;
        while j < rows.len() && rows[j].0 == key {
            j += 1;
        }
        let group = &rows[i..j];
        let reduced = match reducer {
            Reducer::Sum => {
                let mut sum = 0.0;
                for (_, v) in group {
                    sum += v.as_f64().ok_or_else(|| {
                        TgError::invalid_input(format!(
                            "分组 {key} 的取值不是数值，无法求和: {v}"
                        ))
                    })?;
                }
                sum
            }
            Reducer::DistinctCount => {
                let distinct: BTreeSet<&FieldValue> = group.iter().map(|(_, v)| v).collect();
                distinct.len() as f64
            }
        };
        result.insert(key, reduced);
        i = j;
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tg_geo::{MultiPolygon, Polygon};
    use tg_gis::{Feature, FieldDef, FieldType};

    fn impact_table() -> FeatureTable {
        let mut t = FeatureTable::with_fields(
            "impacts",
            vec![
                FieldDef::new("GeoID", FieldType::Long),
                FieldDef::new("STRUCT_ID", FieldType::Text),
            ],
        );
        let rows: &[(i64, &str, f64)] = &[
            (1, "b1", 1.0),
            (1, "b2", 2.0),
            (1, "b1", 3.0),
            (2, "b3", 4.0),
        ];
        for &(zone, bldg, size) in rows {
            t.push(
                Feature::new(MultiPolygon::from_polygon(Polygon::rect(
                    0.0, 0.0, size, 1.0,
                )))
                .with_attr("GeoID", zone)
                .with_attr("STRUCT_ID", bldg),
            );
        }
        t
    }

    #[test]
    fn test_distinct_count() {
        let t = impact_table();
        let counts = aggregate_by_group(
            &t,
            "GeoID",
            ValueField::Attribute("STRUCT_ID"),
            Reducer::DistinctCount,
        )
        .unwrap();
        // b1 出现两次但只算一栋
        assert_eq!(counts[&FieldValue::Long(1)], 2.0);
        assert_eq!(counts[&FieldValue::Long(2)], 1.0);
    }

    #[test]
    fn test_sum_of_areas() {
        let t = impact_table();
        let areas = aggregate_by_group(&t, "GeoID", ValueField::Area, Reducer::Sum).unwrap();
        assert!((areas[&FieldValue::Long(1)] - 6.0).abs() < 1e-9);
        assert!((areas[&FieldValue::Long(2)] - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_determinism_under_permutation() {
        let t = impact_table();
        let mut reversed = t.clone();
        reversed.features.reverse();
        let a = aggregate_by_group(
            &t,
            "GeoID",
            ValueField::Attribute("STRUCT_ID"),
            Reducer::DistinctCount,
        )
        .unwrap();
        let b = aggregate_by_group(
            &reversed,
            "GeoID",
            ValueField::Attribute("STRUCT_ID"),
            Reducer::DistinctCount,
        )
        .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_missing_fields_reported_up_front() {
        let t = impact_table();
        let err = aggregate_by_group(
            &t,
            "ghost",
            ValueField::Attribute("phantom"),
            Reducer::Sum,
        )
        .unwrap_err();
        match err {
            TgError::FieldNotFound { fields, .. } => {
                assert_eq!(
                    fields,
                    vec!["ghost".to_string(), "phantom".to_string()]
                );
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_sum_rejects_text() {
        let t = impact_table();
        let err = aggregate_by_group(
            &t,
            "GeoID",
            ValueField::Attribute("STRUCT_ID"),
            Reducer::Sum,
        )
        .unwrap_err();
        assert!(matches!(err, TgError::InvalidInput { .. }));
    }
}
