// crates/tg_scenario/src/scenario.rs

//! 情景模型与枚举
//!
//! 两种互斥模式：标准模式枚举 风暴潮类别 × 海平面上升 的全组合；
//! 自定义模式按调用方给定的洪水位逐个生成情景。

use serde::{Deserialize, Serialize};
use tg_foundation::naming::scenario_suffix;
use tg_foundation::units::feet_to_meters;
use tg_foundation::{TgError, TgResult};

/// 标准风暴潮类别及其基准水位（英尺），按严重程度排列
pub const SURGES: [(&str, f64); 4] = [
    ("MHHW", 4.0),
    ("10yr", 8.0),
    ("50yr", 9.6),
    ("100yr", 10.5),
];

/// 海平面上升序列（英尺）
pub const SEALEVELRISE_FT: [i64; 7] = [0, 1, 2, 3, 4, 5, 6];

/// 查询风暴潮类别的基准水位
///
/// 未知类别返回 [`TgError::UnsupportedSurgeCategory`]，错误中带支持的类别表。
pub fn surge_offset(category: &str) -> TgResult<f64> {
    SURGES
        .iter()
        .find(|(name, _)| *name == category)
        .map(|(_, offset)| *offset)
        .ok_or_else(|| TgError::unsupported_surge(category, supported_surges()))
}

/// 支持的风暴潮类别名
#[must_use]
pub fn supported_surges() -> Vec<&'static str> {
    SURGES.iter().map(|(name, _)| *name).collect()
}

/// 单个洪水情景
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// 洪水位（英尺）
    pub elevation_ft: f64,
    /// 风暴潮类别，标准情景才有
    pub surge: Option<String>,
    /// 海平面上升（英尺），标准情景才有
    pub slr_ft: Option<i64>,
}

impl Scenario {
    /// 自定义洪水位情景
    #[must_use]
    pub fn custom(elevation_ft: f64) -> Self {
        Self {
            elevation_ft,
            surge: None,
            slr_ft: None,
        }
    }

    /// 标准情景：洪水位 = 风暴潮基准 + 海平面上升
    pub fn standard(surge: &str, slr_ft: i64) -> TgResult<Self> {
        let offset = surge_offset(surge)?;
        Ok(Self {
            elevation_ft: offset + slr_ft as f64,
            surge: Some(surge.to_string()),
            slr_ft: Some(slr_ft),
        })
    }

    /// 洪水位换算为米（与 DEM 同单位）
    #[must_use]
    pub fn elevation_m(&self) -> f64 {
        feet_to_meters(self.elevation_ft)
    }

    /// 数据集名后缀（洪水位的小数点替换为下划线）
    #[must_use]
    pub fn suffix(&self) -> String {
        scenario_suffix(self.elevation_ft)
    }

    /// 日志标题
    #[must_use]
    pub fn title(&self) -> String {
        match (&self.surge, self.slr_ft) {
            (Some(surge), Some(slr)) => format!(
                "Analyzing flood elevation: {} ft ({surge}, {slr})",
                self.elevation_ft
            ),
            _ => format!("Analyzing flood elevation: {} ft", self.elevation_ft),
        }
    }
}

/// 枚举待分析的情景
///
/// `custom` 为 Some 时按给定洪水位生成自定义情景（与标准模式互斥）；
/// 为 None 时生成全部标准情景（风暴潮类别 × 海平面上升的笛卡尔积）。
pub fn enumerate(custom: Option<&[f64]>) -> TgResult<Vec<Scenario>> {
    match custom {
        Some(elevations) => Ok(elevations.iter().map(|&ft| Scenario::custom(ft)).collect()),
        None => {
            let mut scenarios = Vec::with_capacity(SURGES.len() * SEALEVELRISE_FT.len());
            for (surge, _) in SURGES {
                for slr in SEALEVELRISE_FT {
                    scenarios.push(Scenario::standard(surge, slr)?);
                }
            }
            Ok(scenarios)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn test_surge_lookup() {
        assert_eq!(surge_offset("MHHW").unwrap(), 4.0);
        assert_eq!(surge_offset("50yr").unwrap(), 9.6);
        let err = surge_offset("500yr").unwrap_err();
        match err {
            TgError::UnsupportedSurgeCategory { category, supported } => {
                assert_eq!(category, "500yr");
                assert_eq!(supported, vec!["MHHW", "10yr", "50yr", "100yr"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_standard_enumeration_yields_28() {
        let scenarios = enumerate(None).unwrap();
        assert_eq!(scenarios.len(), 28);

        // (surge, slr) 组合唯一
        let pairs: BTreeSet<(String, i64)> = scenarios
            .iter()
            .map(|s| (s.surge.clone().unwrap(), s.slr_ft.unwrap()))
            .collect();
        assert_eq!(pairs.len(), 28);

        // 洪水位 = 基准 + 海平面上升
        for s in &scenarios {
            let offset = surge_offset(s.surge.as_deref().unwrap()).unwrap();
            assert!((s.elevation_ft - (offset + s.slr_ft.unwrap() as f64)).abs() < 1e-12);
        }
    }

    #[test]
    fn test_custom_enumeration() {
        let scenarios = enumerate(Some(&[5.0, 7.5])).unwrap();
        assert_eq!(scenarios.len(), 2);
        assert_eq!(scenarios[0].elevation_ft, 5.0);
        assert!(scenarios[0].surge.is_none());
        assert!(scenarios[0].slr_ft.is_none());
    }

    #[test]
    fn test_elevation_conversion() {
        let s = Scenario::custom(10.0);
        assert!((s.elevation_m() - 3.048).abs() < 1e-12);
    }

    #[test]
    fn test_suffix() {
        assert_eq!(Scenario::custom(9.6).suffix(), "9_6");
        assert_eq!(Scenario::standard("MHHW", 0).unwrap().suffix(), "4");
    }
}
