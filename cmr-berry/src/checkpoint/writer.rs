use super::{batch_file_name, CheckpointError, MeasurementRow};
use std::fs::{self, File};
use std::path::{Path, PathBuf};

/// 固定容量的批次写出器.
///
/// 缓冲区满时写出为一个新的批次文件, 批次序号严格递增且从不复用.
/// 写出先落到同目录下的隐藏临时文件, 再重命名为正式文件名,
/// 因此进程中途被杀不会留下半个批次. 只有写出成功后缓冲区才会被清空.
#[derive(Debug)]
pub struct BatchWriter {
    dir: PathBuf,
    prefix: String,
    header: Vec<String>,
    capacity: usize,
    next_index: usize,
    buffer: Vec<MeasurementRow>,
    written: Vec<PathBuf>,
}

impl BatchWriter {
    /// 在 `dir` 下以 `prefix` 为前缀写出批次. `columns` 为除受试者列以外的列名,
    /// 第一个批次序号为 `next_index`. `capacity` 为 0 时按 1 处理.
    pub fn new(
        dir: impl Into<PathBuf>,
        prefix: impl Into<String>,
        columns: Vec<String>,
        capacity: usize,
        next_index: usize,
    ) -> Self {
        // 首格留空.
        let header = std::iter::once(String::new()).chain(columns).collect();
        let capacity = capacity.max(1);
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
            header,
            capacity,
            next_index,
            buffer: Vec::with_capacity(capacity),
            written: Vec::new(),
        }
    }

    /// 追加一行. 列数与表头不符时拒绝.
    pub fn append(&mut self, row: MeasurementRow) -> Result<(), CheckpointError> {
        let expected = self.header.len() - 1;
        if row.values.len() != expected {
            return Err(CheckpointError::ColumnCount {
                subject: row.subject,
                found: row.values.len(),
                expected,
            });
        }
        self.buffer.push(row);
        Ok(())
    }

    /// 缓冲区已满时写出一个批次, 返回其路径.
    pub fn flush_if_full(&mut self) -> Result<Option<PathBuf>, CheckpointError> {
        if self.buffer.len() >= self.capacity {
            self.flush().map(Some)
        } else {
            Ok(None)
        }
    }

    /// 写出剩余的行. 缓冲区为空时什么也不做.
    pub fn flush_remainder(&mut self) -> Result<Option<PathBuf>, CheckpointError> {
        if self.buffer.is_empty() {
            Ok(None)
        } else {
            self.flush().map(Some)
        }
    }

    fn flush(&mut self) -> Result<PathBuf, CheckpointError> {
        let name = batch_file_name(&self.prefix, self.next_index);
        let target = self.dir.join(&name);
        if target.exists() {
            return Err(CheckpointError::Exists(target));
        }

        let tmp = self.dir.join(format!(".{name}.tmp"));
        if let Err(e) = self.write_rows(&tmp) {
            let _ = fs::remove_file(&tmp);
            return Err(e);
        }
        fs::rename(&tmp, &target).map_err(|source| CheckpointError::Io {
            path: target.clone(),
            source,
        })?;

        log::info!("wrote {} rows to `{}`", self.buffer.len(), target.display());
        self.buffer.clear();
        self.next_index += 1;
        self.written.push(target.clone());
        Ok(target)
    }

    /// 写出全部缓冲行并落盘 (`sync_all`), 之后才允许重命名.
    fn write_rows(&self, path: &Path) -> Result<(), CheckpointError> {
        let csv_err = |source| CheckpointError::Csv {
            path: path.to_owned(),
            source,
        };
        let io_err = |source| CheckpointError::Io {
            path: path.to_owned(),
            source,
        };
        let mut writer = csv::Writer::from_writer(File::create(path).map_err(io_err)?);
        writer.write_record(&self.header).map_err(csv_err)?;
        for row in self.buffer.iter() {
            writer.write_record(row.cells()).map_err(csv_err)?;
        }
        let file = writer.into_inner().map_err(|e| io_err(e.into_error()))?;
        file.sync_all().map_err(io_err)
    }

    /// 缓冲区中尚未写出的行数.
    #[inline]
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// 下一个批次序号.
    #[inline]
    pub fn next_index(&self) -> usize {
        self.next_index
    }

    /// 本次运行写出的所有批次.
    #[inline]
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkpoint::Checkpoint;

    const PREFIX: &str = "table.csv";

    fn columns() -> Vec<String> {
        vec!["a".to_string(), "b".to_string()]
    }

    fn row(i: usize) -> MeasurementRow {
        MeasurementRow::new(format!("{}_2", 1000 + i), vec![i as f64, 0.5])
    }

    fn line_count(path: &Path) -> usize {
        fs::read_to_string(path).unwrap().lines().count()
    }

    /// 按写出器的使用方式写入 `n` 行.
    fn write_all(dir: &Path, n: usize, capacity: usize) -> BatchWriter {
        let mut w = BatchWriter::new(dir, PREFIX, columns(), capacity, 0);
        for i in 0..n {
            w.append(row(i)).unwrap();
            w.flush_if_full().unwrap();
        }
        w.flush_remainder().unwrap();
        w
    }

    #[test]
    fn test_batch_count() {
        let dir = tempfile::tempdir().unwrap();
        let w = write_all(dir.path(), 1100, 500);

        assert_eq!(w.written().len(), 3);
        assert_eq!(w.next_index(), 3);
        let lines: Vec<_> = w.written().iter().map(|p| line_count(p)).collect();
        assert_eq!(lines, vec![501, 501, 101]);
        assert!(w.written()[2].ends_with("table.csv.0002"));

        let cp = Checkpoint::scan(dir.path(), PREFIX).unwrap();
        assert_eq!(cp.completed().len(), 1100);
        assert_eq!(cp.batches(), &[0, 1, 2]);
    }

    #[test]
    fn test_batch_count_exact_multiple() {
        let dir = tempfile::tempdir().unwrap();
        let w = write_all(dir.path(), 6, 3);

        assert_eq!(w.written().len(), 2);
        assert_eq!(line_count(&w.written()[1]), 4);
        assert_eq!(w.buffered(), 0);
    }

    #[test]
    fn test_header_and_cells() {
        let dir = tempfile::tempdir().unwrap();
        let mut w = BatchWriter::new(dir.path(), PREFIX, columns(), 10, 7);
        w.append(MeasurementRow::new("1000_2", vec![1.25, f64::NAN])).unwrap();
        let path = w.flush_remainder().unwrap().unwrap();

        assert!(path.ends_with("table.csv.0007"));
        let text = fs::read_to_string(path).unwrap();
        assert_eq!(text, ",a,b\n1000_2,1.25,\n");
        // 临时文件已被重命名.
        assert!(!dir.path().join(".table.csv.0007.tmp").exists());
    }

    #[test]
    fn test_refuse_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("table.csv.0000"), ",a,b\n").unwrap();

        let mut w = BatchWriter::new(dir.path(), PREFIX, columns(), 1, 0);
        w.append(row(0)).unwrap();
        assert!(matches!(w.flush_if_full(), Err(CheckpointError::Exists(_))));
        // 写出失败时保留缓冲区.
        assert_eq!(w.buffered(), 1);
        assert_eq!(fs::read_to_string(dir.path().join("table.csv.0000")).unwrap(), ",a,b\n");
    }

    #[test]
    fn test_failed_write_keeps_buffer() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("gone");
        let mut w = BatchWriter::new(&missing, PREFIX, columns(), 1, 0);
        w.append(row(0)).unwrap();
        assert!(matches!(w.flush_if_full(), Err(CheckpointError::Io { .. })));
        assert_eq!(w.buffered(), 1);
        assert_eq!(w.next_index(), 0);

        // 目录恢复后, 同一批次序号被正常写出且内容完整.
        fs::create_dir(&missing).unwrap();
        let path = w.flush_remainder().unwrap().unwrap();
        assert!(path.ends_with("table.csv.0000"));
        assert_eq!(fs::read_to_string(path).unwrap(), ",a,b\n1000_2,0,0.5\n");
        assert!(!missing.join(".table.csv.0000.tmp").exists());
    }

    #[test]
    fn test_column_count() {
        let dir = tempfile::tempdir().unwrap();
        let mut w = BatchWriter::new(dir.path(), PREFIX, columns(), 1, 0);
        assert!(matches!(
            w.append(MeasurementRow::new("x", vec![1.0])),
            Err(CheckpointError::ColumnCount { found: 1, expected: 2, .. })
        ));
        assert_eq!(w.flush_remainder().unwrap(), None);
    }
}
