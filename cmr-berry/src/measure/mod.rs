//! 指标计算: 逐帧曲线的极值与派生临床比值.
//!
//! 所有比值在分母过小或结果非有限时都被视为未定义, 以 `NaN` 表示,
//! 写出时成为空单元格. 计算本身从不失败.

mod aortic;
mod thickness;
mod ventricular;

use crate::consts::DENOMINATOR_EPS;

pub use aortic::{diameter, distensibility, plausible_pressure, AorticAreas, SegmentAreas};
pub use thickness::{
    ExternalCommand, Precomputed, ThicknessError, ThicknessEvaluator, WallThickness,
};
pub use ventricular::{cardiac_output, ejection_fraction, VentricularVolumes};

/// 安全除法. 分母绝对值小于 [`DENOMINATOR_EPS`] 或结果非有限时返回 `NaN`.
#[inline]
pub fn ratio(num: f64, den: f64) -> f64 {
    if den.is_nan() || den.abs() < DENOMINATOR_EPS {
        return f64::NAN;
    }
    let r = num / den;
    if r.is_finite() {
        r
    } else {
        f64::NAN
    }
}

#[cfg(test)]
mod tests {
    use super::ratio;

    #[test]
    fn test_ratio() {
        assert_eq!(ratio(3.0, 2.0), 1.5);
        assert!(ratio(1.0, 0.0).is_nan());
        assert!(ratio(1.0, 1e-9).is_nan());
        assert!(ratio(1.0, f64::NAN).is_nan());
        assert!(ratio(f64::NAN, 1.0).is_nan());
    }
}
