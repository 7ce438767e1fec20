// crates/tg_scenario/tests/standard_scenarios.rs

//! 标准情景全量批处理测试：28 个（风暴潮 × 海平面上升）情景
//! 在内存工作区上从头跑到尾。

use std::collections::BTreeSet;
use tg_geo::{MultiPolygon, Point2D, Polygon};
use tg_gis::{
    Feature, FeatureTable, FieldDef, FieldType, FieldValue, GeoWorkspace, MemoryWorkspace,
};
use tg_raster::{ElevationGrid, GridTemplate};
use tg_scenario::FloodBatch;

/// 西侧 1 m 低地（所有标准水位都会淹没），东侧 30 m 高地（永不淹没）
fn build_workspace() -> MemoryWorkspace {
    let ws = MemoryWorkspace::new();

    let template = GridTemplate::new(Point2D::ZERO, 1.0, 4, 4).unwrap();
    let mut dem = Vec::with_capacity(16);
    for _row in 0..4 {
        for col in 0..4 {
            dem.push(if col < 2 { 1.0 } else { 30.0 });
        }
    }
    ws.store_elevation("dem", ElevationGrid::from_data(template, dem).unwrap())
        .unwrap();

    let mut zones =
        FeatureTable::with_fields("zones", vec![FieldDef::new("GeoID", FieldType::Long)]);
    zones.push(
        Feature::new(MultiPolygon::from_polygon(Polygon::rect(0.0, 0.0, 2.0, 4.0)))
            .with_attr("GeoID", 1_i64),
    );
    zones.push(
        Feature::new(MultiPolygon::from_polygon(Polygon::rect(2.0, 0.0, 4.0, 4.0)))
            .with_attr("GeoID", 2_i64),
    );
    ws.store_table(zones).unwrap();

    let mut wetlands =
        FeatureTable::with_fields("wetlands", vec![FieldDef::new("WETCODE", FieldType::Long)]);
    wetlands.push(
        Feature::new(MultiPolygon::from_polygon(Polygon::rect(0.0, 0.0, 1.0, 1.0)))
            .with_attr("WETCODE", 9_i64),
    );
    ws.store_table(wetlands).unwrap();

    ws
}

#[test]
fn standard_batch_runs_all_28_scenarios() {
    let ws = build_workspace();
    let batch = FloodBatch {
        workspace: "scratch".to_string(),
        dem: "dem".to_string(),
        zones: "zones".to_string(),
        id_field: "GeoID".to_string(),
        elevation: None,
        flood_output: "floods".to_string(),
        wetlands: Some("wetlands".to_string()),
        wetland_output: None,
        buildings: None,
        building_output: None,
        building_id_field: None,
        cleanup: true,
    };

    let outputs = batch.run(&ws).unwrap();
    assert_eq!(outputs.scenario_count, 28);
    assert_eq!(outputs.floods, "floods");
    assert_eq!(outputs.wetlands.as_deref(), Some("output_wetlands"));
    assert!(outputs.buildings.is_none());

    // 每个情景只淹没西侧潮闸 → 合并后 28 行
    let floods = ws.fetch_table("floods").unwrap();
    assert_eq!(floods.len(), 28);

    // 情景标注列齐全，(surge, slr) 组合唯一
    let mut pairs = BTreeSet::new();
    for f in &floods.features {
        assert_eq!(f.attr("GeoID"), Some(&FieldValue::Long(1)));
        let elev = match f.attr("flood_elev") {
            Some(FieldValue::Double(v)) => *v,
            other => panic!("flood_elev 缺失或类型不对: {other:?}"),
        };
        assert!((4.0..=16.5).contains(&elev));
        let surge = match f.attr("surge") {
            Some(FieldValue::Text(s)) => s.clone(),
            other => panic!("surge 缺失或类型不对: {other:?}"),
        };
        let slr = match f.attr("slr") {
            Some(FieldValue::Long(v)) => *v,
            other => panic!("slr 缺失或类型不对: {other:?}"),
        };
        pairs.insert((surge, slr));
    }
    assert_eq!(pairs.len(), 28);

    // 湿地影响连接回基线几何，每行都带基线属性与情景列
    let wet = ws.fetch_table("output_wetlands").unwrap();
    assert_eq!(wet.len(), 28);
    for f in &wet.features {
        assert_eq!(f.attr("WETCODE"), Some(&FieldValue::Long(9)));
        assert!(f.attr("flood_elev").is_some());
        assert!(f.attr("surge").is_some());
    }

    // 共享栅格与各情景中间结果已清理
    assert!(!ws.exists("_temp_pgon_as_rstr"));
    assert!(!ws.exists("_temp_clipped2zones"));
    assert!(!ws.exists("_temp_floods_raster"));
}

#[test]
fn batch_config_round_trips_through_json() {
    let json = r#"{
        "workspace": "scratch",
        "dem": "dem",
        "zones": "zones",
        "id_field": "GeoID",
        "flood_output": "floods"
    }"#;
    let batch: FloodBatch = serde_json::from_str(json).unwrap();
    assert_eq!(batch.workspace, "scratch");
    assert!(batch.elevation.is_none());
    assert!(batch.wetlands.is_none());
    // 省略时默认清理
    assert!(batch.cleanup);
}
