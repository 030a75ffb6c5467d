use super::components::{count_large, mask_of};
use super::{QualityGate, Rejection};
use crate::consts::label::{AO_ASCENDING, AO_DESCENDING};
use crate::{CmrImage, CmrLabel, NiftiHeaderAttr};

/// 主动脉堆栈质控. 对升主动脉和降主动脉分别检查所有帧:
///
/// 1. 该结构在每一帧都存在.
/// 2. 每一帧结构内的最大强度与第 0 帧结构内平均强度之比小于 `noise_ratio`.
/// 3. 每一帧体素数大于 `pixel_thres` 的连通域不超过一个.
/// 4. 相邻帧面积比 `A[t] / A[t - 1]` 严格位于 `(0.5, 2)` 内.
///   第 0 帧与最后一帧相邻 (心动周期首尾相接).
#[derive(Copy, Clone, Debug)]
pub struct AorticQc {
    /// 连通域计数时的体素数阈值.
    pub pixel_thres: usize,

    /// 噪声判定的强度比阈值.
    pub noise_ratio: f64,
}

impl Default for AorticQc {
    fn default() -> Self {
        Self {
            pixel_thres: 10,
            noise_ratio: 3.0,
        }
    }
}

/// 第 `t` 帧中标签为 `l` 的体素的强度.
fn intensities<'a>(
    image: &'a CmrImage,
    label: &'a CmrLabel,
    t: usize,
    l: u8,
) -> impl Iterator<Item = f64> + 'a {
    image
        .frame_at(t)
        .into_iter()
        .zip(label.frame_at(t))
        .filter(move |(_, p)| **p == l)
        .map(|(v, _)| *v as f64)
}

impl AorticQc {
    fn check_label(&self, label: &CmrLabel, image: &CmrImage, l: u8) -> Result<(), Rejection> {
        // 规则 1
        let areas = label.frame_counts(l);
        if areas.is_empty() {
            return Err(Rejection::LabelVanished { label: l, frame: 0 });
        }
        if let Some(frame) = areas.iter().position(|&a| a == 0) {
            return Err(Rejection::LabelVanished { label: l, frame });
        }

        // 规则 2
        let mean_ed = intensities(image, label, 0, l).sum::<f64>() / areas[0] as f64;
        for frame in 0..areas.len() {
            let max_t = intensities(image, label, frame, l).fold(f64::NEG_INFINITY, f64::max);
            if max_t / mean_ed >= self.noise_ratio {
                return Err(Rejection::NoisyFrame { label: l, frame });
            }
        }

        // 规则 3
        for (frame, view) in label.frame_iter().enumerate() {
            if count_large(mask_of(view, l).view(), self.pixel_thres) >= 2 {
                return Err(Rejection::Fragmented { label: l, frame });
            }
        }

        // 规则 4
        let n = areas.len();
        for frame in 0..n {
            let prev = areas[(frame + n - 1) % n];
            let ratio = areas[frame] as f64 / prev as f64;
            if ratio >= 2.0 || ratio <= 0.5 {
                return Err(Rejection::AbruptAreaChange { label: l, frame });
            }
        }
        Ok(())
    }
}

impl QualityGate for AorticQc {
    fn inspect(&self, label: &CmrLabel, image: Option<&CmrImage>) -> Result<(), Rejection> {
        let image = image
            .filter(|im| im.shape() == label.shape())
            .ok_or(Rejection::ImageUnavailable)?;
        for l in [AO_ASCENDING, AO_DESCENDING] {
            self.check_label(label, image, l)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::AorticQc;
    use crate::consts::label::{AO_ASCENDING, AO_DESCENDING};
    use crate::qc::{QualityGate, Rejection};
    use crate::test_utils::{image_for, synthetic_ao, AO_PIX_DIM};
    use crate::{CmrImage, CmrLabel};
    use ndarray::{s, Array4};

    fn pair(label: Array4<u8>) -> (CmrLabel, CmrImage) {
        let image = CmrImage::fake(image_for(&label), AO_PIX_DIM);
        (CmrLabel::fake(label, AO_PIX_DIM), image)
    }

    #[test]
    fn test_ao_qc_pass() {
        let (label, image) = pair(synthetic_ao());
        assert_eq!(AorticQc::default().inspect(&label, Some(&image)), Ok(()));
    }

    #[test]
    fn test_ao_qc_requires_image() {
        let (label, _) = pair(synthetic_ao());
        assert_eq!(
            AorticQc::default().inspect(&label, None),
            Err(Rejection::ImageUnavailable)
        );
    }

    #[test]
    fn test_ao_qc_vanished() {
        let mut data = synthetic_ao();
        data.slice_mut(s![.., .., .., 2])
            .mapv_inplace(|p| if p == AO_DESCENDING { 0 } else { p });
        let (label, image) = pair(data);
        assert_eq!(
            AorticQc::default().inspect(&label, Some(&image)),
            Err(Rejection::LabelVanished {
                label: AO_DESCENDING,
                frame: 2
            })
        );
    }

    #[test]
    fn test_ao_qc_noise() {
        let data = synthetic_ao();
        let mut intensity = image_for(&data);
        intensity[[3, 3, 0, 1]] = 400.0;
        let image = CmrImage::fake(intensity, AO_PIX_DIM);
        let label = CmrLabel::fake(data, AO_PIX_DIM);
        assert_eq!(
            AorticQc::default().inspect(&label, Some(&image)),
            Err(Rejection::NoisyFrame {
                label: AO_ASCENDING,
                frame: 1
            })
        );
    }

    #[test]
    fn test_ao_qc_fragmented() {
        let mut data = synthetic_ao();
        // 在远离升主动脉的位置加一个 4x4 的升主动脉碎块.
        data.slice_mut(s![12..16, 0..4, .., 3]).fill(AO_ASCENDING);
        let (label, image) = pair(data);
        assert_eq!(
            AorticQc::default().inspect(&label, Some(&image)),
            Err(Rejection::Fragmented {
                label: AO_ASCENDING,
                frame: 3
            })
        );
    }

    #[test]
    fn test_ao_qc_abrupt_change() {
        let mut data = synthetic_ao();
        // 第 1 帧升主动脉仅剩 2x6 = 12 像素, 12 / 30 <= 0.5.
        data.slice_mut(s![4.., .., .., 1])
            .mapv_inplace(|p| if p == AO_ASCENDING { 0 } else { p });
        let (label, image) = pair(data);
        assert_eq!(
            AorticQc::default().inspect(&label, Some(&image)),
            Err(Rejection::AbruptAreaChange {
                label: AO_ASCENDING,
                frame: 1
            })
        );
    }

    #[test]
    fn test_ao_qc_no_frames() {
        let (label, image) = pair(Array4::zeros((16, 16, 1, 0)));
        assert_eq!(
            AorticQc::default().inspect(&label, Some(&image)),
            Err(Rejection::LabelVanished {
                label: AO_ASCENDING,
                frame: 0
            })
        );
    }
}
