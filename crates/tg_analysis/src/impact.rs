// crates/tg_analysis/src/impact.rs

//! 影响评估
//!
//! 把淹没多边形与资产图层（湿地、建筑物）求交，按潮闸聚合影响，
//! 结果以新属性列写回淹没图层。哨兵约定：0 表示计算出的零影响，
//! -999 / -1 表示该潮闸根本没有参与聚合（无重叠记录）。

use crate::aggregate::{aggregate_by_group, Reducer, ValueField};
use crate::bridge;
use std::collections::BTreeMap;
use tg_foundation::naming::temp_name;
use tg_foundation::TgResult;
use tg_gis::{
    FeatureTable, FieldType, FieldValue, GeoWorkspace, LayerSource, OverwriteGuard,
};
use tracing::info;

/// 建筑物唯一编号的默认字段名
pub const DEFAULT_BUILDING_ID: &str = "STRUCT_ID";
/// 湿地影响输出的默认数据集名
pub const DEFAULT_WETLANDS_OUTPUT: &str = "flooded_continuous";
/// 建筑物影响输出的默认数据集名（临时）
pub const DEFAULT_BUILDINGS_OUTPUT: &str = "flooded_discrete";

/// 无重叠记录的面积哨兵
pub const AREA_SENTINEL: f64 = -999.0;
/// 无重叠记录的计数哨兵
pub const COUNT_SENTINEL: i64 = -1;

/// 影响评估的可选输入
#[derive(Debug, Clone, Default)]
pub struct ImpactOptions {
    /// 湿地图层
    pub wetlands: Option<LayerSource>,
    /// 湿地影响输出名
    pub wetlands_output: Option<String>,
    /// 建筑物图层
    pub buildings: Option<LayerSource>,
    /// 建筑物影响输出名
    pub buildings_output: Option<String>,
    /// 建筑物唯一编号字段，None 时用 `STRUCT_ID`
    pub building_id_field: Option<String>,
    /// 评估完成后删除资产影响的中间结果
    pub cleanup: bool,
}

/// 评估淹没造成的影响
///
/// 总是在淹没图层上写 `totalarea` 列（几何面积）；提供湿地图层时追加
/// `wetlands` 面积列，提供建筑物图层时追加 `buildings` 计数列。
/// 两步相互独立，缺省任一资产图层是合法模式，对应输出为 None。
///
/// 返回 (淹没图层名, 湿地影响输出名, 建筑物影响输出名)。
pub fn assess_impact(
    gis: &dyn GeoWorkspace,
    floods_name: &str,
    flood_id_field: &str,
    options: &ImpactOptions,
) -> TgResult<(String, Option<String>, Option<String>)> {
    let mut floods = gis.fetch_table(floods_name)?;
    floods.add_field("totalarea", FieldType::Double, true)?;
    floods.populate_with("totalarea", |f| FieldValue::Double(f.area()))?;
    store_in_place(gis, floods)?;

    let flooded_wetlands = match &options.wetlands {
        Some(wetlands) => {
            let output = area_of_impacts(
                gis,
                floods_name,
                flood_id_field,
                wetlands,
                "wetlands",
                options.wetlands_output.as_deref(),
                options.cleanup,
            )?;
            Some(output)
        }
        None => None,
    };

    let flooded_buildings = match &options.buildings {
        Some(buildings) => {
            let output = count_of_impacts(
                gis,
                floods_name,
                flood_id_field,
                buildings,
                "buildings",
                options
                    .building_id_field
                    .as_deref()
                    .unwrap_or(DEFAULT_BUILDING_ID),
                options.buildings_output.as_deref(),
            )?;
            Some(output)
        }
        None => None,
    };

    Ok((floods_name.to_string(), flooded_wetlands, flooded_buildings))
}

/// 计算被淹资产的面积
///
/// 交集碎片按潮闸融合后做面积求和，写入淹没图层的 `fieldname` 列
/// （无重叠记录的潮闸取 -999）。返回被淹资产数据集名。
pub fn area_of_impacts(
    gis: &dyn GeoWorkspace,
    floods_name: &str,
    flood_id_field: &str,
    assets: &LayerSource,
    fieldname: &str,
    assets_output: Option<&str>,
    cleanup: bool,
) -> TgResult<String> {
    let output = assets_output.unwrap_or(DEFAULT_WETLANDS_OUTPUT).to_string();
    info!(floods = floods_name, output = %output, "评估资产面积影响");

    let floods = gis.fetch_table(floods_name)?;
    let asset_table = bridge::resolve_layer(gis, assets)?;

    let temp_output = temp_name(&output);
    let intersected = gis.intersect(&[&floods, &asset_table], &temp_output)?;
    gis.store_table(intersected.clone())?;

    let dissolved = bridge::dissolve_by_zone(gis, &intersected, flood_id_field)?;
    let mut flooded_assets = dissolved;
    flooded_assets.name = output.clone();
    gis.store_table(flooded_assets.clone())?;

    let areas = aggregate_by_group(
        &flooded_assets,
        flood_id_field,
        ValueField::Area,
        Reducer::Sum,
    )?;
    write_impact_column(
        gis,
        floods_name,
        flood_id_field,
        fieldname,
        FieldType::Double,
        &areas,
        |total| FieldValue::Double(total),
        FieldValue::Double(AREA_SENTINEL),
    )?;

    if cleanup {
        gis.delete(&temp_output)?;
    }
    Ok(output)
}

/// 统计被淹资产的数量
///
/// 交集不做融合（碎片携带的资产编号用于去重计数），按潮闸统计
/// 不同 `asset_id_field` 取值的个数，写入淹没图层的 `fieldname` 列
/// （无重叠记录的潮闸取 -1）。返回被淹资产数据集名。
pub fn count_of_impacts(
    gis: &dyn GeoWorkspace,
    floods_name: &str,
    flood_id_field: &str,
    assets: &LayerSource,
    fieldname: &str,
    asset_id_field: &str,
    assets_output: Option<&str>,
) -> TgResult<String> {
    let output = match assets_output {
        Some(name) => name.to_string(),
        None => temp_name(DEFAULT_BUILDINGS_OUTPUT),
    };
    info!(floods = floods_name, output = %output, "评估资产数量影响");

    let floods = gis.fetch_table(floods_name)?;
    let asset_table = bridge::resolve_layer(gis, assets)?;

    let mut intersected = gis.intersect(&[&floods, &asset_table], &output)?;
    intersected.name = output.clone();
    gis.store_table(intersected.clone())?;

    let counts = aggregate_by_group(
        &intersected,
        flood_id_field,
        ValueField::Attribute(asset_id_field),
        Reducer::DistinctCount,
    )?;
    write_impact_column(
        gis,
        floods_name,
        flood_id_field,
        fieldname,
        FieldType::Long,
        &counts,
        |count| FieldValue::Long(count as i64),
        FieldValue::Long(COUNT_SENTINEL),
    )?;

    Ok(output)
}

/// 把聚合结果写回淹没图层的新列
#[allow(clippy::too_many_arguments)]
fn write_impact_column(
    gis: &dyn GeoWorkspace,
    floods_name: &str,
    flood_id_field: &str,
    fieldname: &str,
    ftype: FieldType,
    values: &BTreeMap<FieldValue, f64>,
    convert: impl Fn(f64) -> FieldValue,
    sentinel: FieldValue,
) -> TgResult<()> {
    let mut floods = gis.fetch_table(floods_name)?;
    floods.add_field(fieldname, ftype, true)?;
    floods.populate_with(fieldname, |feat| {
        feat.attr(flood_id_field)
            .and_then(|key| values.get(key))
            .map_or_else(|| sentinel.clone(), |&v| convert(v))
    })?;
    store_in_place(gis, floods)
}

/// 覆盖回写已存在的数据集（属性列在取出的副本上修改）
fn store_in_place(gis: &dyn GeoWorkspace, table: FeatureTable) -> TgResult<()> {
    let _overwrite = OverwriteGuard::new(gis.env(), true);
    gis.store_table(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tg_geo::{MultiPolygon, Polygon};
    use tg_gis::{Feature, FieldDef, MemoryWorkspace};

    /// 两个淹没区：1 号 [0,4]x[0,4]，2 号 [10,14]x[0,4]
    fn floods_table() -> FeatureTable {
        let mut t =
            FeatureTable::with_fields("floods", vec![FieldDef::new("GeoID", FieldType::Long)]);
        t.push(
            Feature::new(MultiPolygon::from_polygon(Polygon::rect(0.0, 0.0, 4.0, 4.0)))
                .with_attr("GeoID", 1_i64),
        );
        t.push(
            Feature::new(MultiPolygon::from_polygon(Polygon::rect(10.0, 0.0, 14.0, 4.0)))
                .with_attr("GeoID", 2_i64),
        );
        t
    }

    /// 湿地只与 1 号淹没区重叠
    fn wetlands_table() -> FeatureTable {
        let mut t =
            FeatureTable::with_fields("wetlands", vec![FieldDef::new("WETCODE", FieldType::Long)]);
        t.push(
            Feature::new(MultiPolygon::from_polygon(Polygon::rect(2.0, 0.0, 6.0, 2.0)))
                .with_attr("WETCODE", 11_i64),
        );
        t
    }

    /// 两栋建筑压在 1 号淹没区上，其中一栋拆成两个图形
    fn buildings_table() -> FeatureTable {
        let mut t = FeatureTable::with_fields(
            "buildings",
            vec![FieldDef::new(DEFAULT_BUILDING_ID, FieldType::Text)],
        );
        t.push(
            Feature::new(MultiPolygon::from_polygon(Polygon::rect(0.0, 0.0, 1.0, 1.0)))
                .with_attr(DEFAULT_BUILDING_ID, "b1"),
        );
        t.push(
            Feature::new(MultiPolygon::from_polygon(Polygon::rect(1.5, 0.0, 2.0, 1.0)))
                .with_attr(DEFAULT_BUILDING_ID, "b2"),
        );
        t.push(
            Feature::new(MultiPolygon::from_polygon(Polygon::rect(2.0, 1.0, 3.0, 2.0)))
                .with_attr(DEFAULT_BUILDING_ID, "b2"),
        );
        t
    }

    fn workspace() -> MemoryWorkspace {
        let ws = MemoryWorkspace::new();
        ws.store_table(floods_table()).unwrap();
        ws.store_table(wetlands_table()).unwrap();
        ws.store_table(buildings_table()).unwrap();
        ws
    }

    #[test]
    fn test_totalarea_always_written() {
        let ws = workspace();
        let (floods_name, wet, bldg) =
            assess_impact(&ws, "floods", "GeoID", &ImpactOptions::default()).unwrap();
        assert_eq!(floods_name, "floods");
        assert!(wet.is_none());
        assert!(bldg.is_none());

        let floods = ws.fetch_table("floods").unwrap();
        assert_eq!(
            floods.features[0].attr("totalarea"),
            Some(&FieldValue::Double(16.0))
        );
    }

    #[test]
    fn test_wetland_area_and_sentinel() {
        let ws = workspace();
        let options = ImpactOptions {
            wetlands: Some(LayerSource::from("wetlands")),
            ..Default::default()
        };
        let (_, wet, _) = assess_impact(&ws, "floods", "GeoID", &options).unwrap();
        assert_eq!(wet.as_deref(), Some(DEFAULT_WETLANDS_OUTPUT));

        let floods = ws.fetch_table("floods").unwrap();
        // 1 号区与湿地重叠 [2,4]x[0,2] = 4
        assert_eq!(
            floods.features[0].attr("wetlands"),
            Some(&FieldValue::Double(4.0))
        );
        // 2 号区无重叠记录 → 哨兵 -999
        assert_eq!(
            floods.features[1].attr("wetlands"),
            Some(&FieldValue::Double(AREA_SENTINEL))
        );

        // 被淹湿地输出已写入工作区
        let flooded = ws.fetch_table(DEFAULT_WETLANDS_OUTPUT).unwrap();
        assert_eq!(flooded.len(), 1);
    }

    #[test]
    fn test_building_count_dedupes_fragments() {
        let ws = workspace();
        let options = ImpactOptions {
            buildings: Some(LayerSource::from("buildings")),
            buildings_output: Some("hit_buildings".to_string()),
            ..Default::default()
        };
        let (_, _, bldg) = assess_impact(&ws, "floods", "GeoID", &options).unwrap();
        assert_eq!(bldg.as_deref(), Some("hit_buildings"));

        let floods = ws.fetch_table("floods").unwrap();
        // b2 有两个图形但只算一栋 → 1 号区 2 栋
        assert_eq!(
            floods.features[0].attr("buildings"),
            Some(&FieldValue::Long(2))
        );
        // 2 号区无重叠记录 → 哨兵 -1
        assert_eq!(
            floods.features[1].attr("buildings"),
            Some(&FieldValue::Long(COUNT_SENTINEL))
        );
    }

    #[test]
    fn test_default_buildings_output_is_temp() {
        let ws = workspace();
        let options = ImpactOptions {
            buildings: Some(LayerSource::from("buildings")),
            ..Default::default()
        };
        let (_, _, bldg) = assess_impact(&ws, "floods", "GeoID", &options).unwrap();
        assert_eq!(bldg.as_deref(), Some("_temp_flooded_discrete"));
        assert!(ws.exists("_temp_flooded_discrete"));
    }

    #[test]
    fn test_steps_are_order_independent() {
        let ws1 = workspace();
        let ws2 = workspace();

        let both = ImpactOptions {
            wetlands: Some(LayerSource::from("wetlands")),
            buildings: Some(LayerSource::from("buildings")),
            ..Default::default()
        };
        assess_impact(&ws1, "floods", "GeoID", &both).unwrap();

        // 单独评估两次，结果列相同
        let only_bldg = ImpactOptions {
            buildings: Some(LayerSource::from("buildings")),
            ..Default::default()
        };
        assess_impact(&ws2, "floods", "GeoID", &only_bldg).unwrap();
        let only_wet = ImpactOptions {
            wetlands: Some(LayerSource::from("wetlands")),
            ..Default::default()
        };
        assess_impact(&ws2, "floods", "GeoID", &only_wet).unwrap();

        let f1 = ws1.fetch_table("floods").unwrap();
        let f2 = ws2.fetch_table("floods").unwrap();
        for (a, b) in f1.features.iter().zip(&f2.features) {
            assert_eq!(a.attr("wetlands"), b.attr("wetlands"));
            assert_eq!(a.attr("buildings"), b.attr("buildings"));
        }
    }

    #[test]
    fn test_cleanup_removes_intersection_temp() {
        let ws = workspace();
        let options = ImpactOptions {
            wetlands: Some(LayerSource::from("wetlands")),
            cleanup: true,
            ..Default::default()
        };
        assess_impact(&ws, "floods", "GeoID", &options).unwrap();
        assert!(!ws.exists("_temp_flooded_continuous"));
        assert!(ws.exists(DEFAULT_WETLANDS_OUTPUT));
    }
}
