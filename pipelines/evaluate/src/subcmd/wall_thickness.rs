use super::EvaluatorArgs;
use cmr_berry::prelude::{Config, Report, BATCH_SIZE};
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct WallThickness {
    /// 数据根目录, 其下每个子目录为一个受试者.
    #[arg(long = "data-dir", short = 'D')]
    data_dir: PathBuf,
    /// 输出表路径.
    #[arg(long = "output-csv", short = 'O')]
    output_csv: PathBuf,
    #[command(flatten)]
    evaluator: EvaluatorArgs,
    /// 每个批次的行数.
    #[arg(long = "batch-size", default_value_t = BATCH_SIZE)]
    batch_size: usize,
}

impl WallThickness {
    pub fn run(&self) -> anyhow::Result<Report> {
        let config = Config::from_output_csv(&self.data_dir, &self.output_csv)?
            .with_batch_size(self.batch_size);
        self.evaluator.run(config)
    }
}
