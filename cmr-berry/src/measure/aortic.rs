use super::ratio;
use crate::consts::label::{AO_ASCENDING, AO_DESCENDING};
use crate::consts::MIN_CENTRAL_PULSE_PRESSURE;
use crate::{CmrLabel, FrameCurve, NiftiHeaderAttr};
use std::f64::consts::PI;

/// 等面积圆的直径.
#[inline]
pub fn diameter(area: f64) -> f64 {
    2.0 * (area / PI).sqrt()
}

/// 过滤不可信的中心脉压. 缺失, 非有限或低于 [`MIN_CENTRAL_PULSE_PRESSURE`] 时返回 `None`.
#[inline]
pub fn plausible_pressure(pp: Option<f64>) -> Option<f64> {
    pp.filter(|p| p.is_finite() && *p >= MIN_CENTRAL_PULSE_PRESSURE)
}

/// 主动脉扩张性, 单位 10^-3 mmHg^-1.
///
/// 脉压不可信, 或 `min_area * pp` 过小时为 `NaN`.
pub fn distensibility(max_area: f64, min_area: f64, pp: Option<f64>) -> f64 {
    match plausible_pressure(pp) {
        Some(pp) => ratio(max_area - min_area, min_area * pp) * 1e3,
        None => f64::NAN,
    }
}

/// 单个主动脉节段在整个心动周期内的面积指标.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SegmentAreas {
    /// 最大面积 (mm^2).
    pub max_area: f64,
    /// 最小面积 (mm^2).
    pub min_area: f64,
    /// 最大直径 (mm).
    pub max_diameter: f64,
    /// 最小直径 (mm).
    pub min_diameter: f64,
    /// 扩张性 (10^-3 mmHg^-1).
    pub distensibility: f64,
}

impl SegmentAreas {
    /// 由面积曲线 (mm^2) 和中心脉压计算.
    pub fn from_curve(curve: &FrameCurve, pp: Option<f64>) -> Self {
        let max_area = curve.max().unwrap_or(f64::NAN);
        let min_area = curve.min().unwrap_or(f64::NAN);
        Self {
            max_area,
            min_area,
            max_diameter: diameter(max_area),
            min_diameter: diameter(min_area),
            distensibility: distensibility(max_area, min_area, pp),
        }
    }

    fn values(&self) -> [f64; 5] {
        [
            self.max_area,
            self.min_area,
            self.max_diameter,
            self.min_diameter,
            self.distensibility,
        ]
    }
}

/// 升主动脉与降主动脉的面积指标.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AorticAreas {
    /// 升主动脉.
    pub ascending: SegmentAreas,
    /// 降主动脉.
    pub descending: SegmentAreas,
}

impl AorticAreas {
    /// 输出列名.
    pub const COLUMNS: [&'static str; 10] = [
        "AAo max area (mm2)",
        "AAo min area (mm2)",
        "AAo max diameter (mm)",
        "AAo min diameter (mm)",
        "AAo distensibility (10-3 mmHg-1)",
        "DAo max area (mm2)",
        "DAo min area (mm2)",
        "DAo max diameter (mm)",
        "DAo min diameter (mm)",
        "DAo distensibility (10-3 mmHg-1)",
    ];

    /// 由 4D 主动脉标签计算. 单位面积取自 header.
    pub fn measure(label: &CmrLabel, pp: Option<f64>) -> Self {
        let unit = label.pixel_area();
        Self {
            ascending: SegmentAreas::from_curve(&label.curve(AO_ASCENDING, unit), pp),
            descending: SegmentAreas::from_curve(&label.curve(AO_DESCENDING, unit), pp),
        }
    }

    /// 按列顺序给出全部数值.
    pub fn values(&self) -> Vec<f64> {
        self.ascending
            .values()
            .into_iter()
            .chain(self.descending.values())
            .collect()
    }
}
