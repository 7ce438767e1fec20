// apps/tg_cli/src/commands/flood.rs

//! 单水位淹没分析命令
//!
//! 对一个洪水位跑完 栅格化 → 掩膜 → 矢量化 → 融合，
//! 可选地评估湿地与建筑物影响，结果写回工作区目录。

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use tg_analysis::{assess_impact, flood_area, process_dem_and_zones, ImpactOptions};
use tg_gis::{ElevationSource, GeoWorkspace, LayerSource, MemoryWorkspace};
use tracing::info;

/// 单水位淹没分析参数
#[derive(Args)]
pub struct FloodArgs {
    /// 工作区目录（每个数据集一个 JSON 文件）
    #[arg(short, long)]
    pub workspace: PathBuf,

    /// DEM 数据集名
    #[arg(long, default_value = "dem")]
    pub dem: String,

    /// 影响区多边形数据集名
    #[arg(long, default_value = "zones")]
    pub zones: String,

    /// 潮闸编号字段
    #[arg(long, default_value = "GeoID")]
    pub id_field: String,

    /// 洪水位 [英尺]
    #[arg(short, long)]
    pub elevation: f64,

    /// 淹没结果输出名，省略时用带时间戳的默认名
    #[arg(short, long)]
    pub output: Option<String>,

    /// 湿地图层名（提供时评估湿地面积影响）
    #[arg(long)]
    pub wetlands: Option<String>,

    /// 建筑物图层名（提供时评估建筑物数量影响）
    #[arg(long)]
    pub buildings: Option<String>,

    /// 建筑物唯一编号字段
    #[arg(long)]
    pub building_id_field: Option<String>,

    /// 允许覆盖已有输出
    #[arg(long)]
    pub overwrite: bool,

    /// 保留中间结果
    #[arg(long)]
    pub keep_temps: bool,
}

/// 执行单水位淹没分析
pub fn execute(args: FloodArgs) -> Result<()> {
    let ws = MemoryWorkspace::load_dir(&args.workspace)
        .with_context(|| format!("加载工作区失败: {}", args.workspace.display()))?;
    ws.env().set_overwrite(args.overwrite);
    info!(datasets = ws.len(), "工作区已加载");

    let grids = process_dem_and_zones(
        &ws,
        &ElevationSource::from(args.dem.clone()),
        &LayerSource::from(args.zones.clone()),
        &args.id_field,
    )
    .context("准备分析栅格失败")?;

    let floods_name = flood_area(
        &ws,
        &grids,
        &args.id_field,
        args.elevation,
        args.output.as_deref(),
        !args.keep_temps,
    )
    .context("淹没分析失败")?;

    if args.wetlands.is_some() || args.buildings.is_some() {
        let options = ImpactOptions {
            wetlands: args.wetlands.as_deref().map(LayerSource::from),
            buildings: args.buildings.as_deref().map(LayerSource::from),
            building_id_field: args.building_id_field.clone(),
            cleanup: !args.keep_temps,
            ..Default::default()
        };
        let (_, wetlands, buildings) =
            assess_impact(&ws, &floods_name, &args.id_field, &options)
                .context("影响评估失败")?;
        if let Some(name) = wetlands {
            info!(output = %name, "被淹湿地已写入");
        }
        if let Some(name) = buildings {
            info!(output = %name, "被淹建筑物已写入");
        }
    }

    ws.save_dir(&args.workspace)
        .with_context(|| format!("保存工作区失败: {}", args.workspace.display()))?;
    info!(output = %floods_name, "淹没分析完成");
    Ok(())
}
