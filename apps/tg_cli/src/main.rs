// apps/tg_cli/src/main.rs

//! TideGates 命令行界面
//!
//! 对目录式工作区（每个数据集一个 JSON 文件）执行潮闸淹没分析：
//! 单水位淹没、整批情景、工作区信息查看。

mod commands;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// TideGates 潮闸淹没分析命令行工具
#[derive(Parser)]
#[command(name = "tg_cli")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Tidegate flood inundation analysis", long_about = None)]
struct Cli {
    /// 日志级别 (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 单水位淹没分析
    Flood(commands::flood::FloodArgs),
    /// 整批风暴潮情景分析
    Scenarios(commands::scenarios::ScenariosArgs),
    /// 显示工作区信息
    Info(commands::info::InfoArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 初始化日志
    let level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // 执行命令
    match cli.command {
        Commands::Flood(args) => commands::flood::execute(args),
        Commands::Scenarios(args) => commands::scenarios::execute(args),
        Commands::Info(args) => commands::info::execute(args),
    }
}
