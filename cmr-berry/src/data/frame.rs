//! 逐帧测量曲线.

use itertools::Itertools;

/// 某个标签在各帧上的面积或体积, 下标为帧序号 `0..T`.
///
/// 该结构仅在运行时推导, 不会被持久化.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameCurve {
    values: Vec<f64>,
}

impl FrameCurve {
    /// 直接由逐帧数值创建.
    #[inline]
    pub fn new(values: Vec<f64>) -> Self {
        Self { values }
    }

    /// 由逐帧体素计数和单位体素面积/体积 `unit` 创建.
    pub fn from_counts(counts: &[usize], unit: f64) -> Self {
        Self {
            values: counts.iter().map(|&c| c as f64 * unit).collect(),
        }
    }

    /// 帧数.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// 曲线是否为空 (不含任何帧)?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// 获取第 `t` 帧的数值. 越界时返回 `None`.
    #[inline]
    pub fn get(&self, t: usize) -> Option<f64> {
        self.values.get(t).copied()
    }

    /// 获取全部数值.
    #[inline]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// 最小值所在帧. 多个帧同为最小值时返回最早的那一帧; 曲线为空时返回 `None`.
    ///
    /// 搜索范围包括第 0 帧.
    #[inline]
    pub fn argmin(&self) -> Option<usize> {
        self.values.iter().position_min_by(|a, b| a.total_cmp(b))
    }

    /// 最小值. 曲线为空时返回 `None`.
    #[inline]
    pub fn min(&self) -> Option<f64> {
        self.argmin().map(|t| self.values[t])
    }

    /// 最大值. 曲线为空时返回 `None`.
    #[inline]
    pub fn max(&self) -> Option<f64> {
        self.values.iter().copied().max_by(|a, b| a.total_cmp(b))
    }
}
