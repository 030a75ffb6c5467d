use cmr_berry::pipeline::VentricularVolumeTask;
use cmr_berry::prelude::{Config, Report, BATCH_SIZE};
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct Ventricular {
    /// 数据根目录, 其下每个子目录为一个受试者.
    #[arg(long = "data-dir", short = 'D')]
    data_dir: PathBuf,
    /// 输出表路径. 实际写出的批次为 `<output-csv>.0000`, `<output-csv>.0001`, ...
    #[arg(long = "output-csv", short = 'O')]
    output_csv: PathBuf,
    /// 每个批次的行数.
    #[arg(long = "batch-size", default_value_t = BATCH_SIZE)]
    batch_size: usize,
}

impl Ventricular {
    pub fn run(&self) -> anyhow::Result<Report> {
        let config = Config::from_output_csv(&self.data_dir, &self.output_csv)?
            .with_batch_size(self.batch_size);
        super::run_task(config, VentricularVolumeTask::default())
    }
}
