use super::EvaluatorArgs;
use cmr_berry::consts::file;
use cmr_berry::dataset::default_output_dir;
use cmr_berry::pipeline::{AorticAreaTask, VentricularVolumeTask};
use cmr_berry::prelude::{Config, Report, BATCH_SIZE};
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct All {
    /// 数据根目录, 其下每个子目录为一个受试者.
    #[arg(long = "data-dir", short = 'D')]
    data_dir: PathBuf,
    /// 输出目录. 缺省时由数据目录推导, 如 `ukbb.converted` -> `ukbb.output_csv`.
    #[arg(long = "output-dir", short = 'O')]
    output_dir: Option<PathBuf>,
    /// 血压表. 缺省时不运行主动脉流水线.
    #[arg(long = "pressure-csv", short = 'P')]
    pressure_csv: Option<PathBuf>,
    #[command(flatten)]
    evaluator: EvaluatorArgs,
    /// 每个批次的行数.
    #[arg(long = "batch-size", default_value_t = BATCH_SIZE)]
    batch_size: usize,
}

impl All {
    pub fn run(&self) -> anyhow::Result<Vec<Report>> {
        let output_dir = self
            .output_dir
            .clone()
            .unwrap_or_else(|| default_output_dir(&self.data_dir));
        // 血压表在写出任何结果之前读取.
        let aortic = self
            .pressure_csv
            .as_ref()
            .map(AorticAreaTask::open)
            .transpose()?;
        let config = |prefix: &str| {
            Config::new(&self.data_dir, &output_dir, prefix).with_batch_size(self.batch_size)
        };

        let mut reports = vec![
            super::run_task(config(file::TABLE_VENTRICULAR_VOLUME), VentricularVolumeTask::default())?,
            self.evaluator.run(config(file::TABLE_WALL_THICKNESS))?,
        ];
        if let Some(task) = aortic {
            reports.push(super::run_task(config(file::TABLE_AORTIC_AREA), task)?);
        } else {
            log::info!("no pressure table given, aortic pipeline skipped");
        }
        Ok(reports)
    }
}
