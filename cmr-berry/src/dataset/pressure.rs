use crate::measure::plausible_pressure;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// 中心脉压所在列的列名.
pub const PULSE_PRESSURE_COLUMN: &str = "Central pulse pressure during PWA";

/// 血压表无法使用. 属于启动阶段的致命错误.
#[derive(Debug, Error)]
pub enum PressureTableError {
    /// 文件无法读取或解析.
    #[error("cannot read pressure table `{path}`: {source}")]
    Csv {
        /// 文件路径.
        path: PathBuf,
        /// 底层错误.
        #[source]
        source: csv::Error,
    },

    /// 表头中没有中心脉压列.
    #[error("pressure table `{0}` has no central pulse pressure column")]
    MissingColumn(PathBuf),
}

/// 以 `eid` 为键的中心脉压表 (mmHg). 只读.
#[derive(Clone, Debug, Default)]
pub struct PressureTable {
    values: HashMap<u64, Option<f64>>,
}

impl PressureTable {
    /// 读取血压表. 第一列为 `eid`, 中心脉压列按列名定位.
    ///
    /// `eid` 无法解析的行被跳过; 数值无法解析的单元格记为缺失;
    /// 同一 `eid` 出现多次时保留第一次.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PressureTableError> {
        let path = path.as_ref();
        let csv_err = |source| PressureTableError::Csv {
            path: path.to_owned(),
            source,
        };

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(path)
            .map_err(csv_err)?;
        let column = reader
            .headers()
            .map_err(csv_err)?
            .iter()
            .position(|h| h.trim() == PULSE_PRESSURE_COLUMN)
            .ok_or_else(|| PressureTableError::MissingColumn(path.to_owned()))?;

        let mut values = HashMap::new();
        let mut skipped = 0usize;
        for record in reader.records() {
            let record = match record {
                Ok(r) => r,
                Err(e) if e.is_io_error() => return Err(csv_err(e)),
                Err(_) => {
                    skipped += 1;
                    continue;
                }
            };
            let Some(eid) = record.get(0).and_then(|s| s.trim().parse::<u64>().ok()) else {
                skipped += 1;
                continue;
            };
            let pp = record
                .get(column)
                .and_then(|s| s.trim().parse::<f64>().ok())
                .filter(|p| p.is_finite());
            values.entry(eid).or_insert(pp);
        }
        if skipped > 0 {
            log::warn!("skipped {skipped} rows without a valid eid in `{}`", path.display());
        }
        log::info!("loaded pulse pressure of {} subjects", values.len());
        Ok(Self { values })
    }

    /// 查询可信的中心脉压. 缺失或低于下限时返回 `None`.
    #[inline]
    pub fn lookup(&self, eid: u64) -> Option<f64> {
        plausible_pressure(self.values.get(&eid).copied().flatten())
    }

    /// 表中的 `eid` 个数.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// 表是否为空?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
