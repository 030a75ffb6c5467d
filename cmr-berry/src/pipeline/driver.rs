use super::{Config, PipelineError, Report, Skip, Task};
use crate::checkpoint::{BatchWriter, Checkpoint, MeasurementRow};
use crate::dataset;
use std::fs;

/// 驱动所处阶段.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Stage {
    /// 检查输入输出目录.
    Init,
    /// 扫描已有批次.
    Scanning,
    /// 逐个处理受试者.
    PerSubject,
    /// 写出剩余缓冲.
    Draining,
    /// 完成.
    Done,
}

/// 单线程, 按受试者顺序执行的流水线驱动.
///
/// 受试者按目录名字典序处理, 因此对同一输入的重复完整运行会得到相同的批次内容.
/// 已写出的批次恰好一次; 进程被杀时缓冲区内的行丢失, 下次运行时重新计算.
#[derive(Debug)]
pub struct PipelineDriver<T> {
    config: Config,
    task: T,
    stage: Stage,
}

impl<T: Task> PipelineDriver<T> {
    /// 创建驱动.
    pub fn new(config: Config, task: T) -> Self {
        Self {
            config,
            task,
            stage: Stage::Init,
        }
    }

    /// 当前阶段.
    #[inline]
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// 运行配置.
    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    fn enter(&mut self, stage: Stage) {
        log::debug!("[{}] {:?} -> {:?}", self.task.name(), self.stage, stage);
        self.stage = stage;
    }

    /// 运行整条流水线.
    ///
    /// 只有启动阶段的问题 (数据目录不存在, 输出目录无法创建, 已有批次无法读取)
    /// 以及批次写出失败会返回错误; 单个受试者的问题只计入汇总.
    pub fn run(&mut self) -> Result<Report, PipelineError> {
        self.enter(Stage::Init);
        let Config {
            data_dir,
            output_dir,
            prefix,
            batch_size,
        } = self.config.clone();
        if !data_dir.is_dir() {
            return Err(PipelineError::DataDirMissing(data_dir));
        }
        fs::create_dir_all(&output_dir).map_err(|source| PipelineError::Io {
            path: output_dir.clone(),
            source,
        })?;
        let subjects = dataset::subjects(&data_dir).map_err(|source| PipelineError::Io {
            path: data_dir.clone(),
            source,
        })?;

        self.enter(Stage::Scanning);
        let checkpoint = Checkpoint::scan(&output_dir, &prefix)?;
        log::info!(
            "[{}] {} subjects found, {} already completed in {} batches",
            self.task.name(),
            subjects.len(),
            checkpoint.completed().len(),
            checkpoint.batches().len(),
        );

        let mut report = Report::new(self.task.name(), checkpoint.malformed_rows());
        let mut writer = BatchWriter::new(
            &output_dir,
            prefix,
            self.task.columns(),
            batch_size,
            checkpoint.next_batch(),
        );

        self.enter(Stage::PerSubject);
        for subject in subjects.iter() {
            if checkpoint.contains(subject.id()) {
                report.record_resumed();
                continue;
            }
            match self.task.evaluate(subject) {
                Ok(values) => {
                    writer.append(MeasurementRow::new(subject.id(), values))?;
                    writer.flush_if_full()?;
                    report.record_processed();
                    log::info!("[{}] processed {}", self.task.name(), subject.id());
                }
                Err(skip) => {
                    match &skip {
                        Skip::InvalidSubject(_) => log::warn!("[{}] {skip}", self.task.name()),
                        _ => log::debug!("[{}] skip {}: {skip}", self.task.name(), subject.id()),
                    }
                    report.record_skip(&skip);
                }
            }
        }

        self.enter(Stage::Draining);
        writer.flush_remainder()?;
        report.set_batches(writer.written().to_vec());

        self.enter(Stage::Done);
        Ok(report)
    }
}
