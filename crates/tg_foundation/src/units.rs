// crates/tg_foundation/src/units.rs

//! 单位换算
//!
//! 洪水位以英尺（ft MSL）输入，DEM 高程以米存储，
//! 比较前必须统一到米。

/// 英尺转米系数
pub const METERS_PER_FOOT: f64 = 0.3048;

/// 英尺转米
#[inline]
#[must_use]
pub fn feet_to_meters(feet: f64) -> f64 {
    feet * METERS_PER_FOOT
}

/// 米转英尺
#[inline]
#[must_use]
pub fn meters_to_feet(meters: f64) -> f64 {
    meters / METERS_PER_FOOT
}
