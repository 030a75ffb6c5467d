use super::components::{largest, mask_of, remove_small};
use super::{QualityGate, Rejection};
use crate::consts::label::{SA_LV, SA_MYO, SA_RV};
use crate::{CmrImage, CmrLabel, NiftiHeaderAttr};
use ndarray::{ArrayView3, Axis, Zip};

/// 短轴心室堆栈质控. 只检查舒张末期 (第 0 帧).
///
/// 规则依次为:
///
/// 1. 左心室血池, 心肌, 右心室血池各自至少有 `pixel_thres` 个体素.
/// 2. 同时含有足量左心室血池和心肌的层至少有 `slice_thres` 层, 且这些层连续.
/// 3. 中腔层 (左心室体素 z 坐标均值, 五成双取整) 上, 心外膜 (左心室 ∪ 心肌) 最大连通域与
///   右心室最大连通域都至少有 `pixel_thres` 个像素.
#[derive(Copy, Clone, Debug)]
pub struct ShortAxisQc {
    /// 单个结构的最少像素/体素数.
    pub pixel_thres: usize,

    /// 含左心室的最少层数.
    pub slice_thres: usize,
}

impl Default for ShortAxisQc {
    fn default() -> Self {
        Self {
            pixel_thres: 10,
            slice_thres: 6,
        }
    }
}

/// 四舍六入五成双.
#[inline]
fn round_half_even(x: f64) -> f64 {
    if (x - x.trunc()).abs() == 0.5 {
        2.0 * (x / 2.0).round()
    } else {
        x.round()
    }
}

#[inline]
fn count(view: ArrayView3<u8>, label: u8) -> usize {
    view.iter().filter(|&&p| p == label).count()
}

impl ShortAxisQc {
    /// 规则 1.
    fn check_presence(&self, ed: ArrayView3<u8>) -> Result<(), Rejection> {
        for label in [SA_LV, SA_MYO, SA_RV] {
            let voxels = count(ed, label);
            if voxels < self.pixel_thres {
                return Err(Rejection::LabelTooSmall { label, voxels });
            }
        }
        Ok(())
    }

    /// 规则 2.
    fn check_coverage(&self, ed: ArrayView3<u8>) -> Result<(), Rejection> {
        let z_pos: Vec<usize> = ed
            .axis_iter(Axis(2))
            .enumerate()
            .filter(|(_, s)| {
                let s = s.view().insert_axis(Axis(2));
                count(s, SA_LV) >= self.pixel_thres && count(s, SA_MYO) >= self.pixel_thres
            })
            .map(|(z, _)| z)
            .collect();

        if z_pos.len() < self.slice_thres {
            return Err(Rejection::TooFewSlices {
                found: z_pos.len(),
                required: self.slice_thres,
            });
        }
        // z_pos 升序.
        let (Some(&first), Some(&last)) = (z_pos.first(), z_pos.last()) else {
            return Err(Rejection::TooFewSlices {
                found: 0,
                required: self.slice_thres.max(1),
            });
        };
        let span = last - first + 1;
        if span != z_pos.len() {
            return Err(Rejection::MissingSlices);
        }
        Ok(())
    }

    /// 规则 3.
    fn check_mid_cavity(&self, ed: ArrayView3<u8>) -> Result<(), Rejection> {
        let (mut z_sum, mut n) = (0usize, 0usize);
        for ((_, _, z), _) in ed.indexed_iter().filter(|(_, p)| **p == SA_LV) {
            z_sum += z;
            n += 1;
        }
        if n == 0 {
            return Err(Rejection::MidCavity);
        }
        let z_len = ed.len_of(Axis(2));
        let cz = (round_half_even(z_sum as f64 / n as f64) as usize).min(z_len - 1);
        let slice = ed.index_axis(Axis(2), cz).insert_axis(Axis(2));

        let endo = largest(mask_of(slice, SA_LV).view());
        let myo = remove_small(mask_of(slice, SA_MYO).view(), self.pixel_thres);
        let mut epi = endo;
        Zip::from(&mut epi).and(&myo).for_each(|e, &m| *e |= m);
        let epi = largest(epi.view());
        let rv = largest(mask_of(slice, SA_RV).view());

        let area = |m: &ndarray::Array3<bool>| m.iter().filter(|&&b| b).count();
        if area(&epi) < self.pixel_thres || area(&rv) < self.pixel_thres {
            return Err(Rejection::MidCavity);
        }
        Ok(())
    }
}

impl QualityGate for ShortAxisQc {
    fn inspect(&self, label: &CmrLabel, _image: Option<&CmrImage>) -> Result<(), Rejection> {
        if label.frame_count() == 0 {
            return Err(Rejection::LabelTooSmall {
                label: SA_LV,
                voxels: 0,
            });
        }
        let ed = label.frame_at(0);
        self.check_presence(ed)?;
        self.check_coverage(ed)?;
        self.check_mid_cavity(ed)
    }
}
