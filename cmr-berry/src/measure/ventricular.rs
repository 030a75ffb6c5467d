use super::ratio;
use crate::consts::label::{SA_LV, SA_MYO, SA_RV};
use crate::consts::MYOCARDIUM_DENSITY;
use crate::{CmrLabel, FrameCurve, NiftiHeaderAttr};

/// 射血分数 (%).
#[inline]
pub fn ejection_fraction(edv: f64, esv: f64) -> f64 {
    ratio(edv - esv, edv) * 100.0
}

/// 心输出量 (L/min). 心率未知时为 `NaN`.
#[inline]
pub fn cardiac_output(sv: f64, heart_rate: Option<f64>) -> f64 {
    heart_rate.map_or(f64::NAN, |hr| sv * hr * 1e-3)
}

/// 左右心室容积指标. 舒张末期 (ED) 固定为第 0 帧,
/// 收缩末期 (ES) 为左心室血池容积最小的最早一帧, 右心室沿用同一帧.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct VentricularVolumes {
    /// 左心室舒张末期容积 (mL).
    pub lv_edv: f64,
    /// 左心室收缩末期容积 (mL).
    pub lv_esv: f64,
    /// 左心室每搏量 (mL).
    pub lv_sv: f64,
    /// 左心室射血分数 (%).
    pub lv_ef: f64,
    /// 左心室心输出量 (L/min).
    pub lv_co: f64,
    /// 左心室心肌质量 (g).
    pub lv_mass: f64,
    /// 右心室舒张末期容积 (mL).
    pub rv_edv: f64,
    /// 右心室收缩末期容积 (mL).
    pub rv_esv: f64,
    /// 右心室每搏量 (mL).
    pub rv_sv: f64,
    /// 右心室射血分数 (%).
    pub rv_ef: f64,
}

impl VentricularVolumes {
    /// 输出列名, 与 [`VentricularVolumes::values`] 一一对应.
    pub const COLUMNS: [&'static str; 10] = [
        "LVEDV (mL)",
        "LVESV (mL)",
        "LVSV (mL)",
        "LVEF (%)",
        "LVCO (L/min)",
        "LVM (g)",
        "RVEDV (mL)",
        "RVESV (mL)",
        "RVSV (mL)",
        "RVEF (%)",
    ];

    /// 由三条容积曲线 (mL) 计算. 曲线为空时相应指标为 `NaN`.
    pub fn from_curves(
        lv: &FrameCurve,
        myo: &FrameCurve,
        rv: &FrameCurve,
        heart_rate: Option<f64>,
    ) -> Self {
        const ED: usize = 0;
        let at = |c: &FrameCurve, t: Option<usize>| t.and_then(|t| c.get(t)).unwrap_or(f64::NAN);
        let es = lv.argmin();

        let lv_edv = at(lv, Some(ED));
        let lv_esv = at(lv, es);
        let lv_sv = lv_edv - lv_esv;
        let rv_edv = at(rv, Some(ED));
        let rv_esv = at(rv, es);

        Self {
            lv_edv,
            lv_esv,
            lv_sv,
            lv_ef: ejection_fraction(lv_edv, lv_esv),
            lv_co: cardiac_output(lv_sv, heart_rate),
            lv_mass: at(myo, Some(ED)) * MYOCARDIUM_DENSITY,
            rv_edv,
            rv_esv,
            rv_sv: rv_edv - rv_esv,
            rv_ef: ejection_fraction(rv_edv, rv_esv),
        }
    }

    /// 由 4D 短轴标签计算. 单位体积与心率取自 `geometry` 的 header,
    /// 通常是与标签配套的图像 (`sa.nii.gz`).
    pub fn measure(label: &CmrLabel, geometry: &impl NiftiHeaderAttr) -> Self {
        let unit = geometry.voxel_ml();
        Self::from_curves(
            &label.curve(SA_LV, unit),
            &label.curve(SA_MYO, unit),
            &label.curve(SA_RV, unit),
            geometry.heart_rate(),
        )
    }

    /// 按列顺序给出全部数值.
    pub fn values(&self) -> Vec<f64> {
        vec![
            self.lv_edv,
            self.lv_esv,
            self.lv_sv,
            self.lv_ef,
            self.lv_co,
            self.lv_mass,
            self.rv_edv,
            self.rv_esv,
            self.rv_sv,
            self.rv_ef,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{f64_eq, image_for, synthetic_sa, SA_PIX_DIM};
    use crate::CmrImage;

    #[test]
    fn test_ejection_fraction() {
        let ef = ejection_fraction(120.0, 40.0);
        assert!(f64_eq(ef, 200.0 / 3.0));
        assert!(ejection_fraction(0.0, 0.0).is_nan());
    }

    #[test]
    fn test_cardiac_output() {
        assert!(f64_eq(cardiac_output(80.0, Some(60.0)), 4.8));
        assert!(cardiac_output(80.0, None).is_nan());
    }

    #[test]
    fn test_from_curves() {
        let lv = FrameCurve::new(vec![100.0, 80.0, 60.0, 70.0, 90.0]);
        let myo = FrameCurve::new(vec![100.0; 5]);
        let rv = FrameCurve::new(vec![110.0, 90.0, 70.0, 50.0, 100.0]);
        let v = VentricularVolumes::from_curves(&lv, &myo, &rv, Some(75.0));

        assert_eq!(v.lv_edv, 100.0);
        assert_eq!(v.lv_esv, 60.0);
        assert_eq!(v.lv_sv, 40.0);
        assert!(f64_eq(v.lv_ef, 40.0));
        assert!(f64_eq(v.lv_co, 3.0));
        assert!(f64_eq(v.lv_mass, 105.0));
        // 右心室沿用左心室的 ES 帧, 而非自身的最小值.
        assert_eq!(v.rv_esv, 70.0);
        assert_eq!(v.rv_sv, 40.0);
    }

    #[test]
    fn test_zero_edv_is_undefined() {
        let zero = FrameCurve::new(vec![0.0, 0.0, 0.0]);
        let v = VentricularVolumes::from_curves(&zero, &zero, &zero, Some(60.0));
        assert_eq!(v.lv_sv, 0.0);
        assert!(v.lv_ef.is_nan());
        assert!(v.rv_ef.is_nan());
    }

    #[test]
    fn test_measure_synthetic() {
        let label = CmrLabel::fake(synthetic_sa(8), SA_PIX_DIM);
        let v = VentricularVolumes::measure(&label, &label);
        // 1.5 * 1.5 * 8.0 * 1e-3 = 0.018 mL / 体素.
        let unit = 0.018;
        assert!(f64_eq(v.lv_edv, 16.0 * 8.0 * unit));
        assert!(f64_eq(v.lv_esv, 4.0 * 8.0 * unit));
        assert!(f64_eq(v.lv_ef, 75.0));
        // 4 帧 * 0.25 s => 60 bpm.
        assert!(f64_eq(v.lv_co, v.lv_sv * 60.0 * 1e-3));
        assert!(f64_eq(v.lv_mass, 48.0 * 8.0 * unit * 1.05));
        assert!(f64_eq(v.rv_edv, v.rv_esv));
        assert!(f64_eq(v.rv_ef, 0.0));
        assert_eq!(v.values().len(), VentricularVolumes::COLUMNS.len());
    }

    #[test]
    fn test_measure_uses_given_geometry() {
        let data = synthetic_sa(8);
        let image = CmrImage::fake(image_for(&data), [2.0, 2.0, 10.0, 0.5]);
        let label = CmrLabel::fake(data, SA_PIX_DIM);
        let v = VentricularVolumes::measure(&label, &image);
        // 2.0 * 2.0 * 10.0 * 1e-3 = 0.04 mL / 体素; 4 帧 * 0.5 s => 30 bpm.
        assert!(f64_eq(v.lv_edv, 16.0 * 8.0 * 0.04));
        assert!(f64_eq(v.lv_co, v.lv_sv * 30.0 * 1e-3));
    }
}
