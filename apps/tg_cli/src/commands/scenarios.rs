// apps/tg_cli/src/commands/scenarios.rs

//! 整批情景分析命令
//!
//! 从 JSON 配置读入一份批处理描述，对工作区目录跑完全部
//! 风暴潮 × 海平面上升情景（或配置给出的自定义洪水位）。

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use tg_gis::MemoryWorkspace;
use tg_scenario::FloodBatch;
use tracing::info;

/// 整批情景分析参数
#[derive(Args)]
pub struct ScenariosArgs {
    /// 工作区目录（每个数据集一个 JSON 文件）
    #[arg(short, long)]
    pub workspace: PathBuf,

    /// 批处理配置文件（JSON）
    #[arg(short, long)]
    pub config: PathBuf,

    /// 覆盖配置中的自定义洪水位 [英尺]
    #[arg(short, long, num_args = 1..)]
    pub elevation: Option<Vec<f64>>,
}

/// 执行整批情景分析
pub fn execute(args: ScenariosArgs) -> Result<()> {
    let text = std::fs::read_to_string(&args.config)
        .with_context(|| format!("读取配置失败: {}", args.config.display()))?;
    let mut batch: FloodBatch =
        serde_json::from_str(&text).context("解析批处理配置失败")?;
    if args.elevation.is_some() {
        batch.elevation = args.elevation.clone();
    }

    let ws = MemoryWorkspace::load_dir(&args.workspace)
        .with_context(|| format!("加载工作区失败: {}", args.workspace.display()))?;
    info!(datasets = ws.len(), "工作区已加载");

    let outputs = batch.run(&ws).context("批处理执行失败")?;

    ws.save_dir(&args.workspace)
        .with_context(|| format!("保存工作区失败: {}", args.workspace.display()))?;

    info!(
        scenarios = outputs.scenario_count,
        floods = %outputs.floods,
        "批处理完成"
    );
    if let Some(name) = outputs.wetlands {
        info!(output = %name, "湿地影响已合并");
    }
    if let Some(name) = outputs.buildings {
        info!(output = %name, "建筑物影响已合并");
    }
    Ok(())
}
