//! 子命令.

mod aortic;
mod all;
mod ventricular;
mod wall_thickness;

use cmr_berry::measure::{ExternalCommand, Precomputed};
use cmr_berry::pipeline::WallThicknessTask;
use cmr_berry::prelude::{Config, PipelineDriver, Report, Task};

pub use aortic::Aortic;
pub use all::All;
pub use ventricular::Ventricular;
pub use wall_thickness::WallThickness;

/// 运行单条流水线.
fn run_task<T: Task>(config: Config, task: T) -> anyhow::Result<Report> {
    Ok(PipelineDriver::new(config, task).run()?)
}

/// 壁厚计算器参数. 未指定程序时假定结果文件已存在.
#[derive(clap::Args, Debug)]
pub struct EvaluatorArgs {
    /// 壁厚计算程序. 调用方式为 `<evaluator> [args...] <seg_sa_ED.nii.gz> <输出前缀>`.
    #[arg(long)]
    evaluator: Option<String>,

    /// 传给壁厚计算程序的固定参数, 可重复.
    #[arg(long = "evaluator-arg", requires = "evaluator", allow_hyphen_values = true)]
    evaluator_arg: Vec<String>,
}

impl EvaluatorArgs {
    fn run(&self, config: Config) -> anyhow::Result<Report> {
        match self.evaluator.as_deref() {
            Some(program) => {
                let cmd = self
                    .evaluator_arg
                    .iter()
                    .fold(ExternalCommand::new(program), |c, a| c.arg(a));
                run_task(config, WallThicknessTask::new(cmd))
            }
            None => run_task(config, WallThicknessTask::new(Precomputed)),
        }
    }
}
