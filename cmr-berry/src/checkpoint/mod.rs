//! 断点续跑: 已写出的批次文件本身就是检查点.
//!
//! 批次文件名为 `{prefix}.{index:04}`, 内容为一行表头加上至多 `BATCH_SIZE` 行结果,
//! 每行第一列为受试者标识. 所有批次文件第一列的并集即 "已完成集合".

mod store;
mod writer;

use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub use store::Checkpoint;
pub use writer::BatchWriter;

/// 检查点扫描或批次写出失败. 均为致命错误.
#[derive(Debug, Error)]
pub enum CheckpointError {
    /// 目录或文件无法访问.
    #[error("cannot access `{path}`: {source}")]
    Io {
        /// 出错路径.
        path: PathBuf,
        /// 底层错误.
        #[source]
        source: io::Error,
    },

    /// 批次文件无法读写.
    #[error("cannot read or write batch `{path}`: {source}")]
    Csv {
        /// 出错路径.
        path: PathBuf,
        /// 底层错误.
        #[source]
        source: csv::Error,
    },

    /// 目标批次文件已存在, 拒绝覆盖.
    #[error("batch `{0}` already exists")]
    Exists(PathBuf),

    /// 结果行的列数与表头不符.
    #[error("row of `{subject}` has {found} values, {expected} expected")]
    ColumnCount {
        /// 受试者标识.
        subject: String,
        /// 实际列数.
        found: usize,
        /// 期望列数.
        expected: usize,
    },
}

/// 第 `index` 个批次的文件名.
#[inline]
pub fn batch_file_name(prefix: &str, index: usize) -> String {
    format!("{prefix}.{index:04}")
}

/// 从文件名中解析批次序号. 文件名不形如 `{prefix}.{非负整数}` 时返回 `None`.
pub fn parse_batch_index(prefix: &str, file_name: &str) -> Option<usize> {
    let suffix = file_name.strip_prefix(prefix)?.strip_prefix('.')?;
    if suffix.is_empty() || !suffix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    suffix.parse().ok()
}

/// 单个受试者的最终结果. 数值为 `NaN` 或无穷时写作空单元格.
#[derive(Clone, Debug, PartialEq)]
pub struct MeasurementRow {
    /// 受试者标识, 即第一列.
    pub subject: String,

    /// 按列顺序排列的数值.
    pub values: Vec<f64>,
}

impl MeasurementRow {
    /// 创建结果行.
    #[inline]
    pub fn new(subject: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            subject: subject.into(),
            values,
        }
    }

    /// 转换为 csv 单元格.
    pub fn cells(&self) -> Vec<String> {
        std::iter::once(self.subject.clone())
            .chain(self.values.iter().map(|v| {
                if v.is_finite() {
                    v.to_string()
                } else {
                    String::new()
                }
            }))
            .collect()
    }
}
