//! 流水线驱动.
//!
//! 三条流水线 (心室容积, 心肌壁厚, 主动脉面积) 共享同一个驱动:
//! 枚举受试者 -> 跳过已完成 -> 读取 -> 质控 -> 计算 -> 缓冲写出 -> 收尾.
//! 各流水线只需实现 [`Task`].

mod driver;
mod report;
mod task;

use crate::checkpoint::CheckpointError;
use crate::consts::BATCH_SIZE;
use crate::dataset::{self, PressureTableError, Subject};
use crate::measure::ThicknessError;
use crate::qc::Rejection;
use crate::VolumeError;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub use driver::{PipelineDriver, Stage};
pub use report::Report;
pub use task::{AorticAreaTask, VentricularVolumeTask, WallThicknessTask};

/// 单个受试者被跳过的原因. 跳过不是错误: 受试者不会出现在输出中,
/// 也不会被记为已完成, 下次运行时会被重新尝试.
#[derive(Debug, Error)]
pub enum Skip {
    /// 必需的输入文件不存在.
    #[error("missing input `{0}`")]
    MissingInput(PathBuf),

    /// 未通过质控.
    #[error("rejected by quality gate: {0}")]
    Rejected(#[from] Rejection),

    /// 输入文件存在但无法使用.
    #[error("unreadable input: {0}")]
    Unreadable(String),

    /// 目录名不是合法的受试者标识.
    #[error("invalid subject name `{0}`")]
    InvalidSubject(String),
}

impl Skip {
    /// 用于汇总统计的原因名. 质控原因会细分到具体规则.
    pub fn reason(&self) -> String {
        match self {
            Skip::MissingInput(_) => "missing input".to_string(),
            Skip::Rejected(r) => format!("quality gate ({})", r.kind()),
            Skip::Unreadable(_) => "unreadable".to_string(),
            Skip::InvalidSubject(_) => "invalid subject".to_string(),
        }
    }
}

impl From<VolumeError> for Skip {
    fn from(e: VolumeError) -> Self {
        match e {
            VolumeError::Missing(path) => Skip::MissingInput(path),
            e => Skip::Unreadable(e.to_string()),
        }
    }
}

impl From<ThicknessError> for Skip {
    fn from(e: ThicknessError) -> Self {
        match e {
            ThicknessError::Missing(path) => Skip::MissingInput(path),
            e => Skip::Unreadable(e.to_string()),
        }
    }
}

/// 一条流水线对单个受试者的计算.
pub trait Task {
    /// 流水线名, 用于日志与汇总.
    fn name(&self) -> &str;

    /// 除受试者列以外的输出列名.
    fn columns(&self) -> Vec<String>;

    /// 计算单个受试者. 返回值与 [`Task::columns`] 一一对应.
    ///
    /// 任何单个受试者的问题都应以 [`Skip`] 返回, 而不是 panic.
    fn evaluate(&self, subject: &Subject) -> Result<Vec<f64>, Skip>;
}

/// 致命错误. 只在启动阶段或输出写入失败时出现.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// 数据根目录不存在.
    #[error("data directory `{0}` does not exist")]
    DataDirMissing(PathBuf),

    /// 输出路径不含文件名, 无法作为批次前缀.
    #[error("invalid output path `{0}`")]
    InvalidOutput(PathBuf),

    /// 目录无法创建或枚举.
    #[error("cannot access `{path}`: {source}")]
    Io {
        /// 出错路径.
        path: PathBuf,
        /// 底层错误.
        #[source]
        source: io::Error,
    },

    /// 检查点扫描或批次写出失败.
    #[error(transparent)]
    Checkpoint(#[from] CheckpointError),

    /// 血压表不可用.
    #[error(transparent)]
    PressureTable(#[from] PressureTableError),
}

/// 单条流水线的运行配置.
#[derive(Clone, Debug)]
pub struct Config {
    /// 数据根目录, 其下每个子目录为一个受试者.
    pub data_dir: PathBuf,

    /// 输出目录. 不存在时自动创建.
    pub output_dir: PathBuf,

    /// 批次文件名前缀, 如 `table_ventricular_volume.csv`.
    pub prefix: String,

    /// 每个批次的行数.
    pub batch_size: usize,
}

impl Config {
    /// 以默认批大小创建配置.
    pub fn new(
        data_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        prefix: impl Into<String>,
    ) -> Self {
        Self {
            data_dir: data_dir.into(),
            output_dir: output_dir.into(),
            prefix: prefix.into(),
            batch_size: BATCH_SIZE,
        }
    }

    /// 由 `--output-csv` 形式的路径创建: 父目录为输出目录, 文件名为批次前缀.
    pub fn from_output_csv(
        data_dir: impl Into<PathBuf>,
        output_csv: &Path,
    ) -> Result<Self, PipelineError> {
        let (output_dir, prefix) = dataset::split_output_csv(output_csv)
            .ok_or_else(|| PipelineError::InvalidOutput(output_csv.to_owned()))?;
        Ok(Self::new(data_dir, output_dir, prefix))
    }

    /// 设置批大小.
    #[inline]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }
}
