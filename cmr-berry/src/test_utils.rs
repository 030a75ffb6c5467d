//! 测试用合成数据.

use crate::consts::file;
use crate::consts::label::{AO_ASCENDING, AO_DESCENDING, SA_LV, SA_MYO, SA_RV};
use crate::{CmrImage, CmrLabel};
use ndarray::Array4;
use std::fs;
use std::path::{Path, PathBuf};

/// 短轴合成数据的体素间距 `[dx, dy, dz, dt]`. 4 帧 * 0.25 s = 1 s, 即 60 bpm.
pub(crate) const SA_PIX_DIM: [f32; 4] = [1.5, 1.5, 8.0, 0.25];

/// 主动脉合成数据的体素间距.
pub(crate) const AO_PIX_DIM: [f32; 4] = [2.0, 2.0, 6.0, 0.1];

/// 构造一个能通过质控的短轴标签: 16x16 横截面, `z_len` 层, 4 帧.
///
/// 左心室血池在第 0/1/2/3 帧分别为 4x4, 3x3, 2x2, 3x3 的方块,
/// 心肌为 8x8 方环 (扣除 4x4 中心), 右心室为 3x8 的条带.
pub(crate) fn synthetic_sa(z_len: usize) -> Array4<u8> {
    let lv_side = [4usize, 3, 2, 3];
    let mut data = Array4::<u8>::zeros((16, 16, z_len, lv_side.len()));
    for (t, side) in lv_side.into_iter().enumerate() {
        for z in 0..z_len {
            for x in 3..11 {
                for y in 3..11 {
                    let inner = (5..9).contains(&x) && (5..9).contains(&y);
                    if !inner {
                        data[[x, y, z, t]] = SA_MYO;
                    }
                }
            }
            for x in 5..5 + side {
                for y in 5..5 + side {
                    data[[x, y, z, t]] = SA_LV;
                }
            }
            for x in 12..15 {
                for y in 3..11 {
                    data[[x, y, z, t]] = SA_RV;
                }
            }
        }
    }
    data
}

/// 构造一个能通过质控的主动脉标签: 16x16 单层, 4 帧.
///
/// 升主动脉面积 (像素) 依次为 30, 36, 42, 36; 降主动脉依次为 16, 16, 12, 16.
pub(crate) fn synthetic_ao() -> Array4<u8> {
    let aao_w = [5usize, 6, 7, 6];
    let dao_h = [4usize, 4, 3, 4];
    let mut data = Array4::<u8>::zeros((16, 16, 1, aao_w.len()));
    for t in 0..aao_w.len() {
        for x in 2..2 + aao_w[t] {
            for y in 2..8 {
                data[[x, y, 0, t]] = AO_ASCENDING;
            }
        }
        for x in 10..14 {
            for y in 10..10 + dao_h[t] {
                data[[x, y, 0, t]] = AO_DESCENDING;
            }
        }
    }
    data
}

/// 与标签配套的强度图像: 血管内 100, 其余 20.
pub(crate) fn image_for(label: &Array4<u8>) -> Array4<f32> {
    label.mapv(|p| if p == 0 { 20.0 } else { 100.0 })
}

/// 在 `root` 下创建受试者目录.
pub(crate) fn subject_dir(root: &Path, id: &str) -> PathBuf {
    let dir = root.join(id);
    fs::create_dir_all(&dir).unwrap();
    dir
}

/// 写出一个短轴受试者 (`sa.nii.gz` + `seg_sa.nii.gz`).
pub(crate) fn write_sa_subject(root: &Path, id: &str, label: Array4<u8>) {
    let dir = subject_dir(root, id);
    CmrImage::fake(image_for(&label), SA_PIX_DIM)
        .save(dir.join(file::SA_IMAGE))
        .unwrap();
    CmrLabel::fake(label, SA_PIX_DIM)
        .save(dir.join(file::SA_LABEL))
        .unwrap();
}

/// 写出一个主动脉受试者 (`ao.nii.gz` + `seg_ao.nii.gz`).
pub(crate) fn write_ao_subject(root: &Path, id: &str, label: Array4<u8>) {
    let dir = subject_dir(root, id);
    CmrImage::fake(image_for(&label), AO_PIX_DIM)
        .save(dir.join(file::AO_IMAGE))
        .unwrap();
    CmrLabel::fake(label, AO_PIX_DIM)
        .save(dir.join(file::AO_LABEL))
        .unwrap();
}

/// 浮点近似相等.
pub(crate) fn f64_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}
