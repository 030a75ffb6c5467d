//! 心肌壁厚. 计算本身由外部程序完成, 此处负责调用它并读回结果.

use crate::consts::AHA_SEGMENTS;
use serde::Deserialize;
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};
use thiserror::Error;

/// 壁厚计算或读取失败.
#[derive(Debug, Error)]
pub enum ThicknessError {
    /// 外部程序无法启动.
    #[error("cannot launch thickness evaluator `{program:?}`: {source}")]
    Spawn {
        /// 程序名.
        program: OsString,
        /// 底层错误.
        #[source]
        source: io::Error,
    },

    /// 外部程序以非零状态退出.
    #[error("thickness evaluator `{program:?}` exited with {status}")]
    Failed {
        /// 程序名.
        program: OsString,
        /// 退出状态.
        status: ExitStatus,
    },

    /// 结果文件不存在.
    #[error("thickness result `{0}` does not exist")]
    Missing(PathBuf),

    /// 结果文件无法解析.
    #[error("cannot parse thickness result `{path}`: {source}")]
    Csv {
        /// 结果文件路径.
        path: PathBuf,
        /// 底层错误.
        #[source]
        source: csv::Error,
    },

    /// 结果行数不是 16 + 1.
    #[error("thickness result `{path}` has {found} rows, {expected} expected")]
    RowCount {
        /// 结果文件路径.
        path: PathBuf,
        /// 实际行数.
        found: usize,
        /// 期望行数.
        expected: usize,
    },
}

/// 壁厚计算器. 给定 ED 帧短轴分割, 在 `{output_stem}.csv` 处写出结果.
pub trait ThicknessEvaluator {
    /// 计算 `seg_ed` 的壁厚.
    fn evaluate(&self, seg_ed: &Path, output_stem: &Path) -> Result<(), ThicknessError>;
}

/// 结果文件已由其他工具预先生成, 什么也不做.
#[derive(Copy, Clone, Debug, Default)]
pub struct Precomputed;

impl ThicknessEvaluator for Precomputed {
    #[inline]
    fn evaluate(&self, _seg_ed: &Path, _output_stem: &Path) -> Result<(), ThicknessError> {
        Ok(())
    }
}

/// 调用外部程序: `program args... <seg_ed> <output_stem>`.
#[derive(Clone, Debug)]
pub struct ExternalCommand {
    /// 程序名或路径.
    pub program: OsString,

    /// 位于分割路径之前的固定参数.
    pub args: Vec<OsString>,
}

impl ExternalCommand {
    /// 创建不带额外参数的调用.
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// 追加一个固定参数.
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }
}

impl ThicknessEvaluator for ExternalCommand {
    fn evaluate(&self, seg_ed: &Path, output_stem: &Path) -> Result<(), ThicknessError> {
        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(seg_ed)
            .arg(output_stem)
            .status()
            .map_err(|source| ThicknessError::Spawn {
                program: self.program.clone(),
                source,
            })?;
        if status.success() {
            Ok(())
        } else {
            Err(ThicknessError::Failed {
                program: self.program.clone(),
                status,
            })
        }
    }
}

#[derive(Debug, Deserialize)]
struct ThicknessRecord {
    #[serde(rename = "Thickness", deserialize_with = "csv::invalid_option")]
    thickness: Option<f64>,
}

/// 16 个 AHA 分段壁厚与全局平均壁厚 (mm).
#[derive(Clone, Debug, PartialEq)]
pub struct WallThickness {
    values: Vec<f64>,
}

impl WallThickness {
    /// 输出列名: `WT_AHA_1 (mm)` .. `WT_AHA_16 (mm)`, `WT_Global (mm)`.
    pub fn columns() -> Vec<String> {
        (1..=AHA_SEGMENTS)
            .map(|i| format!("WT_AHA_{i} (mm)"))
            .chain(std::iter::once("WT_Global (mm)".to_string()))
            .collect()
    }

    /// 读取 `{stem}.csv`: 第一列为索引, `Thickness` 列为壁厚, 共 17 行.
    /// 无法解析为数值的单元格记为 `NaN`.
    pub fn read(path: impl AsRef<Path>) -> Result<Self, ThicknessError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ThicknessError::Missing(path.to_owned()));
        }
        let csv_err = |source| ThicknessError::Csv {
            path: path.to_owned(),
            source,
        };

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(path)
            .map_err(csv_err)?;
        let mut values = Vec::with_capacity(AHA_SEGMENTS + 1);
        for record in reader.deserialize() {
            let record: ThicknessRecord = record.map_err(csv_err)?;
            values.push(record.thickness.unwrap_or(f64::NAN));
        }

        if values.len() != AHA_SEGMENTS + 1 {
            return Err(ThicknessError::RowCount {
                path: path.to_owned(),
                found: values.len(),
                expected: AHA_SEGMENTS + 1,
            });
        }
        Ok(Self { values })
    }

    /// 分段壁厚, 下标 0 对应 AHA 第 1 段.
    #[inline]
    pub fn segments(&self) -> &[f64] {
        &self.values[..AHA_SEGMENTS]
    }

    /// 全局平均壁厚.
    #[inline]
    pub fn global(&self) -> f64 {
        self.values[AHA_SEGMENTS]
    }

    /// 按列顺序给出全部数值.
    #[inline]
    pub fn values(&self) -> Vec<f64> {
        self.values.clone()
    }
}
