#![warn(missing_docs)] // <= 合适时移除它.
// #![warn(clippy::missing_docs_in_private_items)]  // <= too strict.

//! 核心库. 从上游分割网络给出的心脏 MR 4D 标签 nifti 文件中批量提取临床指标
//! (心室容积, 射血分数, 心输出量, 心肌质量, 心肌壁厚, 主动脉扩张性).
//!
//! 该 crate 目前仅提供 `safe` 接口.
//!
//! # 注意
//!
//! 1. 该 crate 按照 UK Biobank 转换后的目录格式组织数据: 每个受试者一个目录,
//!   目录名形如 `{eid}_{num}`, 目录下存放 `sa.nii.gz`, `seg_sa.nii.gz` 等文件.
//! 2. DICOM 转换与分割网络推理不在本 crate 范围内, 本 crate 只消费其产物.
//! 3. 单个受试者的任何问题 (文件缺失, 质控不通过, 文件损坏) 都不会中断整个批处理,
//!   只有启动阶段的错误 (根目录不存在, 血压表不可读) 以及输出写入失败才是致命的.
//!
//! # 模块一览
//!
//! ### 体数据读取 ✅
//!
//! 读取 4D 图像/标签及其体素几何信息 (像素间距, 层间距, 帧数, 帧时长).
//!
//! 实现位于 `cmr-berry/src/data`.
//!
//! ### 分割质控 ✅
//!
//! 短轴 (左右心室) 与主动脉两套启发式规则, 共享同一个布尔契约.
//!
//! 实现位于 `cmr-berry/src/qc`.
//!
//! ### 指标计算 ✅
//!
//! 逐帧面积/容积曲线, 极值帧查找, 以及 EF / CO / 扩张性等派生比值.
//!
//! 实现位于 `cmr-berry/src/measure`.
//!
//! ### 断点续跑 ✅
//!
//! 扫描已写出的批次文件重建 "已完成集合", 并以固定批大小原子地写出新批次.
//!
//! 实现位于 `cmr-berry/src/checkpoint`.
//!
//! ### 流水线驱动 ✅
//!
//! 受试者枚举 -> 跳过已完成 -> 读取 -> 质控 -> 计算 -> 缓冲写出 -> 收尾.
//!
//! 实现位于 `cmr-berry/src/pipeline`.

/// 三维索引 `(x, y, z)`, 同时也可一定程度上用作非负整数向量.
pub type Idx3d = (usize, usize, usize);

/// 四维形状 `(x, y, z, t)`.
pub type Idx4d = (usize, usize, usize, usize);

type Area3d = Vec<Idx3d>;
type Areas3d = Vec<Area3d>;

/// 4D 心脏 MR nii 文件基础数据结构.
mod data;

pub use data::{CmrData4d, CmrImage, CmrLabel, FrameCurve, NiftiHeaderAttr, VolumeError};

pub mod checkpoint;
pub mod consts;
pub mod dataset;
pub mod measure;
pub mod pipeline;
pub mod prelude;
pub mod qc;

#[cfg(test)]
mod test_utils;
