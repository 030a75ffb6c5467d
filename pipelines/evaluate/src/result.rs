//! 运行结果.

use cmr_berry::prelude::Report;

const SEP: &str = "--------------------------------------------------------";

/// 简单分隔线.
#[inline]
fn sep() {
    println!("{SEP}");
}

/// 打印每条流水线的汇总.
pub fn summarize(reports: &[Report]) {
    sep();
    for report in reports.iter() {
        println!("{report}");
        for batch in report.batches() {
            println!("    -> {}", batch.display());
        }
        sep();
    }
}
