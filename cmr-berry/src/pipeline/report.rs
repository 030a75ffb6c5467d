//! 运行汇总.

use super::Skip;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// 单条流水线一次运行的汇总.
#[derive(Clone, Debug, Default)]
pub struct Report {
    name: String,
    processed: usize,
    resumed: usize,
    skipped: BTreeMap<String, usize>,
    malformed_rows: usize,
    batches: Vec<PathBuf>,
}

impl Report {
    pub(super) fn new(name: &str, malformed_rows: usize) -> Self {
        Self {
            name: name.to_string(),
            malformed_rows,
            ..Default::default()
        }
    }

    pub(super) fn record_processed(&mut self) {
        self.processed += 1;
    }

    pub(super) fn record_resumed(&mut self) {
        self.resumed += 1;
    }

    pub(super) fn record_skip(&mut self, skip: &Skip) {
        *self.skipped.entry(skip.reason()).or_default() += 1;
    }

    pub(super) fn set_batches(&mut self, batches: Vec<PathBuf>) {
        self.batches = batches;
    }

    /// 流水线名.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 本次新处理并写出的受试者数.
    #[inline]
    pub fn processed(&self) -> usize {
        self.processed
    }

    /// 此前运行已完成, 本次直接跳过的受试者数.
    #[inline]
    pub fn resumed(&self) -> usize {
        self.resumed
    }

    /// 被跳过的受试者总数.
    pub fn skipped(&self) -> usize {
        self.skipped.values().sum()
    }

    /// 按原因统计的跳过数.
    #[inline]
    pub fn skip_reasons(&self) -> &BTreeMap<String, usize> {
        &self.skipped
    }

    /// 检查点扫描时跳过的畸形行数.
    #[inline]
    pub fn malformed_rows(&self) -> usize {
        self.malformed_rows
    }

    /// 本次写出的批次文件.
    #[inline]
    pub fn batches(&self) -> &[PathBuf] {
        &self.batches
    }

    fn describe_into<W: fmt::Write>(&self, w: &mut W) -> fmt::Result {
        const S4: &str = "    ";

        writeln!(w, "Pipeline `{}`:", self.name)?;
        writeln!(w, "{S4}Processed: {}", self.processed)?;
        writeln!(w, "{S4}Resumed: {}", self.resumed)?;
        writeln!(w, "{S4}Skipped: {}", self.skipped())?;
        for (reason, n) in self.skipped.iter() {
            writeln!(w, "{S4}{S4}{reason}: {n}")?;
        }
        if self.malformed_rows > 0 {
            writeln!(w, "{S4}Malformed checkpoint rows: {}", self.malformed_rows)?;
        }
        write!(w, "{S4}Batches written: {}", self.batches.len())
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.describe_into(f)
    }
}
