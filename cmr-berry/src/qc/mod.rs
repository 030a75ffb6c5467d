//! 分割质控.
//!
//! 两套启发式规则 (短轴心室堆栈, 主动脉堆栈) 共享同一个布尔契约:
//! 不通过质控的受试者既不输出行, 也不计入已完成集合, 下次运行时会被重新尝试.

mod aorta;
mod components;
mod short_axis;

use crate::{CmrImage, CmrLabel};
use thiserror::Error;

pub use aorta::AorticQc;
pub use components::{components, count_large, largest, mask_of, remove_small};
pub use short_axis::ShortAxisQc;

/// 质控未通过的原因.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum Rejection {
    /// 某个标签的体素数低于阈值.
    #[error("label {label} has only {voxels} voxels")]
    LabelTooSmall {
        /// 标签值.
        label: u8,
        /// 实际体素数.
        voxels: usize,
    },

    /// 同时含有左心室血池和心肌的层数不足.
    #[error("only {found} slices contain the left ventricle, {required} required")]
    TooFewSlices {
        /// 实际层数.
        found: usize,
        /// 最少层数.
        required: usize,
    },

    /// 含左心室的层之间存在缺失层.
    #[error("left ventricle slices are not contiguous")]
    MissingSlices,

    /// 中腔层上心外膜或右心室过小.
    #[error("epicardium or right ventricle missing on the mid-cavity slice")]
    MidCavity,

    /// 某个标签在某帧消失.
    #[error("label {label} vanishes at frame {frame}")]
    LabelVanished {
        /// 标签值.
        label: u8,
        /// 帧序号.
        frame: usize,
    },

    /// 某帧标签区域内强度过高, 图像噪声较大.
    #[error("label {label} is noisy at frame {frame}")]
    NoisyFrame {
        /// 标签值.
        label: u8,
        /// 帧序号.
        frame: usize,
    },

    /// 某帧标签分裂为至少两个较大连通域.
    #[error("label {label} is fragmented at frame {frame}")]
    Fragmented {
        /// 标签值.
        label: u8,
        /// 帧序号.
        frame: usize,
    },

    /// 某帧相对前一帧面积突变.
    #[error("label {label} changes area abruptly at frame {frame}")]
    AbruptAreaChange {
        /// 标签值.
        label: u8,
        /// 帧序号.
        frame: usize,
    },

    /// 需要强度图像但未提供, 或其形状与标签不符.
    #[error("intensity image unavailable for this check")]
    ImageUnavailable,
}

impl Rejection {
    /// 原因的简短类别名, 用于汇总统计.
    pub fn kind(&self) -> &'static str {
        match self {
            Rejection::LabelTooSmall { .. } => "label too small",
            Rejection::TooFewSlices { .. } => "too few slices",
            Rejection::MissingSlices => "missing slices",
            Rejection::MidCavity => "mid-cavity",
            Rejection::LabelVanished { .. } => "label vanished",
            Rejection::NoisyFrame { .. } => "noisy frame",
            Rejection::Fragmented { .. } => "fragmented",
            Rejection::AbruptAreaChange { .. } => "abrupt area change",
            Rejection::ImageUnavailable => "image unavailable",
        }
    }
}

/// 质控判定. 纯函数, 对格式正确的输入从不 panic.
pub trait QualityGate {
    /// 检查分割标签 (以及可选的强度图像). 通过时返回 `Ok(())`,
    /// 否则返回第一个不满足的规则.
    fn inspect(&self, label: &CmrLabel, image: Option<&CmrImage>) -> Result<(), Rejection>;

    /// 是否通过质控.
    #[inline]
    fn passes(&self, label: &CmrLabel, image: Option<&CmrImage>) -> bool {
        self.inspect(label, image).is_ok()
    }
}
