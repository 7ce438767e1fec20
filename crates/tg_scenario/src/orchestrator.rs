// crates/tg_scenario/src/orchestrator.rs

//! 批处理编排
//!
//! 状态机：栅格化一次 → 逐情景 (掩膜 → 矢量化 → 融合 → 打标 → 影响评估)
//! → 合并 → 可选的基线连接 → 尽力而为的清理。
//! 整个批次串行执行：工作区与覆盖开关是全局环境状态，
//! 并发情景会互相破坏中间结果。

use crate::scenario::{enumerate, Scenario};
use serde::{Deserialize, Serialize};
use tg_analysis::flood::{TEMP_CLIPPED_DEM, TEMP_ZONE_RASTER};
use tg_analysis::{assess_impact, flood_area, process_dem_and_zones, FloodGrids, ImpactOptions};
use tg_foundation::naming::{temp_name, temp_name_with_prefix};
use tg_foundation::TgResult;
use tg_gis::{
    ElevationSource, FeatureTable, FieldType, FieldValue, GeoWorkspace, LayerSource,
    OverwriteGuard, WorkspaceGuard,
};
use tracing::{info, warn};

/// 批处理配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FloodBatch {
    /// 工作区名称（执行期间临时切换）
    pub workspace: String,
    /// DEM 数据集名
    pub dem: String,
    /// 影响区多边形数据集名
    pub zones: String,
    /// 潮闸编号字段
    pub id_field: String,
    /// 自定义洪水位（英尺）；None 时枚举全部标准情景
    #[serde(default)]
    pub elevation: Option<Vec<f64>>,
    /// 合并后淹没结果的输出名
    pub flood_output: String,
    /// 湿地图层名
    #[serde(default)]
    pub wetlands: Option<String>,
    /// 湿地影响合并输出名，None 时用 `output_<wetlands>`
    #[serde(default)]
    pub wetland_output: Option<String>,
    /// 建筑物图层名
    #[serde(default)]
    pub buildings: Option<String>,
    /// 建筑物影响合并输出名，None 时用 `output_<buildings>`
    #[serde(default)]
    pub building_output: Option<String>,
    /// 建筑物唯一编号字段，None 时用 `STRUCT_ID`
    #[serde(default)]
    pub building_id_field: Option<String>,
    /// 合并后删除各情景的中间结果
    #[serde(default = "default_cleanup")]
    pub cleanup: bool,
}

fn default_cleanup() -> bool {
    true
}

/// 批处理最终输出的数据集名
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOutputs {
    /// 合并后的淹没结果
    pub floods: String,
    /// 合并后的湿地影响（提供了湿地图层时）
    pub wetlands: Option<String>,
    /// 合并后的建筑物影响（提供了建筑物图层时）
    pub buildings: Option<String>,
    /// 已执行的情景数量
    pub scenario_count: usize,
}

impl FloodBatch {
    /// 执行整批情景分析
    pub fn run(&self, gis: &dyn GeoWorkspace) -> TgResult<BatchOutputs> {
        let _workspace = WorkspaceGuard::new(gis.env(), &self.workspace);
        let _overwrite = OverwriteGuard::new(gis.env(), true);

        info!(workspace = %self.workspace, "准备整批共享栅格");
        let grids = process_dem_and_zones(
            gis,
            &ElevationSource::from(self.dem.clone()),
            &LayerSource::from(self.zones.clone()),
            &self.id_field,
        )?;

        let scenarios = enumerate(self.elevation.as_deref())?;
        info!(count = scenarios.len(), "情景枚举完成");

        let mut all_floods = Vec::with_capacity(scenarios.len());
        let mut all_wetlands = Vec::with_capacity(scenarios.len());
        let mut all_buildings = Vec::with_capacity(scenarios.len());

        for (num, scenario) in scenarios.iter().enumerate() {
            let (floods, wetlands, buildings) = self.analyze(gis, &grids, scenario, num)?;
            all_floods.push(floods);
            if let Some(name) = wetlands {
                all_wetlands.push(name);
            }
            if let Some(name) = buildings {
                all_buildings.push(name);
            }
        }

        let floods_out = self.flood_output.clone();
        finish_results(gis, &floods_out, &all_floods, None, self.cleanup)?;

        let wetlands_out = match &self.wetlands {
            Some(source) => {
                let output = self
                    .wetland_output
                    .clone()
                    .unwrap_or_else(|| temp_name_with_prefix(source, "output_"));
                finish_results(gis, &output, &all_wetlands, Some(source), self.cleanup)?;
                Some(output)
            }
            None => None,
        };

        let buildings_out = match &self.buildings {
            Some(source) => {
                let output = self
                    .building_output
                    .clone()
                    .unwrap_or_else(|| temp_name_with_prefix(source, "output_"));
                finish_results(gis, &output, &all_buildings, Some(source), self.cleanup)?;
                Some(output)
            }
            None => None,
        };

        if self.cleanup {
            best_effort_delete(gis, &[TEMP_ZONE_RASTER, TEMP_CLIPPED_DEM]);
        }

        Ok(BatchOutputs {
            floods: floods_out,
            wetlands: wetlands_out,
            buildings: buildings_out,
            scenario_count: scenarios.len(),
        })
    }

    /// 单个情景：淹没 → 打标 → 影响评估
    fn analyze(
        &self,
        gis: &dyn GeoWorkspace,
        grids: &FloodGrids,
        scenario: &Scenario,
        num: usize,
    ) -> TgResult<(String, Option<String>, Option<String>)> {
        info!(num, "{}", scenario.title());

        // 情景间洪水位可能重复（如 MHHW+6 与 10yr+2 均为 10 ft），
        // 以序号消除数据集名冲突
        let floods_path = format!("{}{}_{num}", self.flood_output, scenario.suffix());
        let floods_name = flood_area(
            gis,
            grids,
            &self.id_field,
            scenario.elevation_ft,
            Some(&floods_path),
            self.cleanup,
        )?;
        add_scenario_columns(gis, &floods_name, scenario)?;

        let options = ImpactOptions {
            wetlands: self.wetlands.as_deref().map(LayerSource::from),
            wetlands_output: Some(temp_name_with_prefix(&floods_path, "_wetlands_")),
            buildings: self.buildings.as_deref().map(LayerSource::from),
            buildings_output: Some(temp_name_with_prefix(&floods_path, "_buildings_")),
            building_id_field: self.building_id_field.clone(),
            cleanup: self.cleanup,
        };
        let (_, wetlands, buildings) =
            assess_impact(gis, &floods_name, &self.id_field, &options)?;

        if let Some(name) = &wetlands {
            add_scenario_columns(gis, name, scenario)?;
        }

        Ok((floods_name, wetlands, buildings))
    }
}

/// 给数据集补上情景标注列
///
/// `flood_elev` 总是写入；`surge` / `slr` 只在标准情景下写入。
fn add_scenario_columns(
    gis: &dyn GeoWorkspace,
    name: &str,
    scenario: &Scenario,
) -> TgResult<()> {
    let mut table = gis.fetch_table(name)?;

    table.add_field("flood_elev", FieldType::Double, true)?;
    table.populate_field("flood_elev", FieldValue::Double(scenario.elevation_ft))?;

    if let Some(surge) = &scenario.surge {
        table.add_field("surge", FieldType::Text, true)?;
        table.populate_field("surge", FieldValue::Text(surge.clone()))?;
    }
    if let Some(slr) = scenario.slr_ft {
        table.add_field("slr", FieldType::Long, true)?;
        table.populate_field("slr", FieldValue::Long(slr))?;
    }

    let _overwrite = OverwriteGuard::new(gis.env(), true);
    gis.store_table(table)
}

/// 合并各情景输出，必要时连接回基线几何，再清理中间结果
fn finish_results(
    gis: &dyn GeoWorkspace,
    output_name: &str,
    results: &[String],
    source_name: Option<&str>,
    cleanup: bool,
) -> TgResult<()> {
    let tables: Vec<FeatureTable> = results
        .iter()
        .map(|name| gis.fetch_table(name))
        .collect::<TgResult<_>>()?;
    let refs: Vec<&FeatureTable> = tables.iter().collect();

    match source_name {
        Some(source) => {
            // 先合并到临时结果，再把属性连接回基线几何
            let tmp_name = temp_name(output_name);
            let merged = gis.merge(&refs, &tmp_name)?;
            gis.store_table(merged.clone())?;

            let baseline = gis.fetch_table(source)?;
            let joined = gis.spatial_join(&baseline, &merged, output_name)?;
            gis.store_table(joined)?;
            best_effort_delete(gis, &[tmp_name.as_str()]);
        }
        None => {
            let merged = gis.merge(&refs, output_name)?;
            gis.store_table(merged)?;
        }
    }
    info!(output = output_name, inputs = results.len(), "结果已合并");

    if cleanup {
        let names: Vec<&str> = results.iter().map(String::as_str).collect();
        best_effort_delete(gis, &names);
    }
    Ok(())
}

/// 逐个删除数据集，单个失败只告警不中断
fn best_effort_delete(gis: &dyn GeoWorkspace, names: &[&str]) {
    for &name in names {
        if let Err(err) = gis.delete(name) {
            warn!(name, %err, "中间结果删除失败");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tg_geo::{MultiPolygon, Point2D, Polygon};
    use tg_gis::{Feature, FieldDef, MemoryWorkspace};
    use tg_raster::{ElevationGrid, GridTemplate};

    fn build_workspace() -> MemoryWorkspace {
        let ws = MemoryWorkspace::new();

        let template = GridTemplate::new(Point2D::ZERO, 1.0, 4, 4).unwrap();
        let mut dem = Vec::with_capacity(16);
        for _row in 0..4 {
            for col in 0..4 {
                // 西低东高，2 ft ≈ 0.61 m 就能淹没西侧
                dem.push(if col < 2 { 0.3 } else { 30.0 });
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
                .with_attr("WETCODE", 3_i64),
        );
        ws.store_table(wetlands).unwrap();

        ws
    }

    fn batch() -> FloodBatch {
        FloodBatch {
            workspace: "scratch".to_string(),
            dem: "dem".to_string(),
            zones: "zones".to_string(),
            id_field: "GeoID".to_string(),
            elevation: Some(vec![2.0, 3.0]),
            flood_output: "floods".to_string(),
            wetlands: Some("wetlands".to_string()),
            wetland_output: Some("wet_out".to_string()),
            buildings: None,
            building_output: None,
            building_id_field: None,
            cleanup: true,
        }
    }

    #[test]
    fn test_custom_batch_merges_scenarios() {
        let ws = build_workspace();
        let outputs = batch().run(&ws).unwrap();
        assert_eq!(outputs.scenario_count, 2);
        assert_eq!(outputs.floods, "floods");

        let floods = ws.fetch_table("floods").unwrap();
        // 每个情景贡献一行（只有西侧潮闸被淹）
        assert_eq!(floods.len(), 2);
        let elevs: Vec<_> = floods
            .features
            .iter()
            .map(|f| f.attr("flood_elev").cloned().unwrap())
            .collect();
        assert!(elevs.contains(&FieldValue::Double(2.0)));
        assert!(elevs.contains(&FieldValue::Double(3.0)));
        // 自定义情景没有 surge / slr 列
        assert!(!floods.has_field("surge"));
        assert!(!floods.has_field("slr"));
    }

    #[test]
    fn test_wetland_output_joined_to_baseline() {
        let ws = build_workspace();
        let outputs = batch().run(&ws).unwrap();
        assert_eq!(outputs.wetlands.as_deref(), Some("wet_out"));

        let wet = ws.fetch_table("wet_out").unwrap();
        // 基线几何 × 两个情景 → 两行，带情景列和基线属性
        assert_eq!(wet.len(), 2);
        for f in &wet.features {
            assert_eq!(f.attr("WETCODE"), Some(&FieldValue::Long(3)));
            assert!(f.attr("flood_elev").is_some());
        }
    }

    #[test]
    fn test_cleanup_removes_per_scenario_outputs() {
        let ws = build_workspace();
        batch().run(&ws).unwrap();
        // 各情景的淹没输出与共享栅格已删除
        assert!(!ws.exists("floods2_0"));
        assert!(!ws.exists("floods3_1"));
        assert!(!ws.exists(TEMP_ZONE_RASTER));
        assert!(!ws.exists(TEMP_CLIPPED_DEM));
    }

    #[test]
    fn test_environment_restored_after_batch() {
        let ws = build_workspace();
        ws.env().set_workspace("base");
        assert!(!ws.env().overwrite());
        batch().run(&ws).unwrap();
        assert_eq!(ws.env().workspace(), "base");
        assert!(!ws.env().overwrite());
    }

    #[test]
    fn test_default_wetland_output_name() {
        let ws = build_workspace();
        let mut b = batch();
        b.wetland_output = None;
        let outputs = b.run(&ws).unwrap();
        assert_eq!(outputs.wetlands.as_deref(), Some("output_wetlands"));
        assert!(ws.exists("output_wetlands"));
    }
}
