use super::{batch_file_name, parse_batch_index, CheckpointError};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// 由已写出批次重建的检查点状态. 每次运行开始时构建, 运行结束后丢弃.
#[derive(Clone, Debug, Default)]
pub struct Checkpoint {
    completed: HashSet<String>,
    batches: Vec<usize>,
    malformed_rows: usize,
}

impl Checkpoint {
    /// 扫描 `output_dir` 下所有 `{prefix}.{index}` 文件.
    ///
    /// 目录不存在时视为空检查点. 列数与表头不符或无法解析的行被跳过并计数;
    /// 已存在但无法打开的批次文件是致命错误, 否则其中的受试者会被重复输出.
    pub fn scan(output_dir: &Path, prefix: &str) -> Result<Self, CheckpointError> {
        let mut ans = Self::default();
        if !output_dir.is_dir() {
            return Ok(ans);
        }

        let io_err = |source| CheckpointError::Io {
            path: output_dir.to_owned(),
            source,
        };
        let batch_prefix = format!("{prefix}.");
        for entry in fs::read_dir(output_dir).map_err(io_err)? {
            let entry = entry.map_err(io_err)?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            if !name.starts_with(&batch_prefix) {
                continue;
            }
            match parse_batch_index(prefix, name) {
                Some(index) => {
                    ans.read_batch(&entry.path())?;
                    ans.batches.push(index);
                }
                None => log::warn!("ignoring `{name}`: not a batch of `{prefix}`"),
            }
        }
        ans.batches.sort_unstable();
        Ok(ans)
    }

    fn read_batch(&mut self, path: &Path) -> Result<(), CheckpointError> {
        let csv_err = |source| CheckpointError::Csv {
            path: path.to_owned(),
            source,
        };
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(path)
            .map_err(csv_err)?;
        let width = reader.byte_headers().map_err(csv_err)?.len();

        let mut malformed = 0;
        for record in reader.byte_records() {
            let record = match record {
                Ok(r) => r,
                Err(e) if e.is_io_error() => return Err(csv_err(e)),
                Err(_) => {
                    malformed += 1;
                    continue;
                }
            };
            let subject = record
                .get(0)
                .filter(|_| record.len() == width)
                .and_then(|f| std::str::from_utf8(f).ok())
                .map(str::trim)
                .filter(|s| !s.is_empty());
            match subject {
                Some(s) => {
                    self.completed.insert(s.to_string());
                }
                None => malformed += 1,
            }
        }

        if malformed > 0 {
            log::warn!("skipped {malformed} malformed rows in `{}`", path.display());
            self.malformed_rows += malformed;
        }
        Ok(())
    }

    /// 受试者是否已完成?
    #[inline]
    pub fn contains(&self, subject: &str) -> bool {
        self.completed.contains(subject)
    }

    /// 已完成集合.
    #[inline]
    pub fn completed(&self) -> &HashSet<String> {
        &self.completed
    }

    /// 已存在批次的序号, 升序.
    #[inline]
    pub fn batches(&self) -> &[usize] {
        &self.batches
    }

    /// 下一个可用的批次序号: 已有最大序号加一, 没有批次时为 0.
    #[inline]
    pub fn next_batch(&self) -> usize {
        self.batches.last().map_or(0, |&i| i + 1)
    }

    /// 扫描时跳过的畸形行数.
    #[inline]
    pub fn malformed_rows(&self) -> usize {
        self.malformed_rows
    }

    /// 已存在批次的文件名.
    pub fn batch_files(&self, prefix: &str) -> Vec<String> {
        self.batches
            .iter()
            .map(|&i| batch_file_name(prefix, i))
            .collect()
    }
}
