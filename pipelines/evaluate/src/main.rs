//! 心脏 MR 指标批量提取命令行工具.
//!
//! 每个子命令对应一条流水线; 中断后重新运行同一命令即可从上次写出的批次处继续.

mod result;
mod subcmd;

use clap::{Parser, Subcommand};
use log::LevelFilter;
use simple_logger::SimpleLogger;

#[derive(Parser, Debug)]
#[command(name = "cmr-evaluate", version, about = "从心脏 MR 分割结果中批量提取临床指标")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 左右心室容积, 射血分数, 心输出量, 心肌质量.
    Ventricular(subcmd::Ventricular),
    /// 16 段 AHA 心肌壁厚.
    WallThickness(subcmd::WallThickness),
    /// 升/降主动脉面积, 直径与扩张性.
    Aortic(subcmd::Aortic),
    /// 依次运行全部流水线.
    All(subcmd::All),
}

fn main() -> anyhow::Result<()> {
    // `RUST_LOG` 可覆盖默认级别.
    SimpleLogger::new()
        .with_level(LevelFilter::Info)
        .env()
        .init()?;

    let reports = match Cli::parse().command {
        Command::Ventricular(c) => vec![c.run()?],
        Command::WallThickness(c) => vec![c.run()?],
        Command::Aortic(c) => vec![c.run()?],
        Command::All(c) => c.run()?,
    };
    result::summarize(&reports);
    Ok(())
}
