// apps/tg_cli/src/commands/info.rs

//! 工作区信息命令
//!
//! 列出工作区目录中的数据集及其类型和规模。

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use tg_gis::{Dataset, GeoWorkspace, MemoryWorkspace, Raster};

/// 工作区信息参数
#[derive(Args)]
pub struct InfoArgs {
    /// 工作区目录（每个数据集一个 JSON 文件）
    #[arg(short, long)]
    pub workspace: PathBuf,
}

/// 执行信息命令
pub fn execute(args: InfoArgs) -> Result<()> {
    let ws = MemoryWorkspace::load_dir(&args.workspace)
        .with_context(|| format!("加载工作区失败: {}", args.workspace.display()))?;

    println!("工作区: {}", args.workspace.display());
    println!("数据集: {}", ws.len());
    for name in ws.list() {
        let dataset = ws.fetch(&name)?;
        match dataset {
            Dataset::Raster(Raster::Elevation(grid)) => {
                let (rows, cols) = grid.shape();
                println!("  {name}  高程栅格 {rows}x{cols}, 像元 {} m", grid.template.cell_size);
            }
            Dataset::Raster(Raster::Zones(grid)) => {
                let (rows, cols) = grid.shape();
                println!(
                    "  {name}  分区栅格 {rows}x{cols}, {} 个分区",
                    grid.zone_ids().len()
                );
            }
            Dataset::Vector(table) => {
                println!(
                    "  {name}  矢量图层, {} 个要素, {} 个字段",
                    table.len(),
                    table.fields.len()
                );
            }
        }
    }
    Ok(())
}
