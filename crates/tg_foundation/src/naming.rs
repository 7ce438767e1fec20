// crates/tg_foundation/src/naming.rs

//! 中间文件命名约定
//!
//! 工作区内的中间结果统一使用 `_temp_<名称>` 前缀，
//! 批处理结束后按此前缀做尽力而为的清理。

use chrono::Local;

/// 中间结果默认前缀
pub const TEMP_PREFIX: &str = "_temp_";

/// 为最终输出名生成对应的中间文件名
///
/// 只对文件名部分加前缀，目录部分保持不变。
///
/// # 示例
///
/// ```
/// use tg_foundation::naming::temp_name;
///
/// assert_eq!(temp_name("flooded_wetlands"), "_temp_flooded_wetlands");
/// assert_eq!(temp_name("out/floods"), "out/_temp_floods");
/// ```
#[must_use]
pub fn temp_name(name: &str) -> String {
    temp_name_with_prefix(name, TEMP_PREFIX)
}

/// 使用自定义前缀生成中间文件名
#[must_use]
pub fn temp_name_with_prefix(name: &str, prefix: &str) -> String {
    match name.rfind('/') {
        Some(pos) => format!("{}{}{}", &name[..=pos], prefix, &name[pos + 1..]),
        None => format!("{prefix}{name}"),
    }
}

/// 未提供输出名时的洪水区默认名（带时间戳）
#[must_use]
pub fn datestamped_flood_name() -> String {
    let stamp = Local::now().format("%Y%m%d_%H%M");
    format!("{TEMP_PREFIX}FloodedZones_{stamp}")
}

/// 情景数据集名后缀：洪水位中的小数点替换为下划线
///
/// 9.6 ft 的情景输出名形如 `floods9_6`。
#[must_use]
pub fn scenario_suffix(elevation_feet: f64) -> String {
    format!("{elevation_feet}").replace('.', "_")
}
