//! 数据集约定: 受试者目录枚举, 血压表, 输出目录推导.
//!
//! 数据根目录下每个非隐藏子目录即一个受试者, 目录名 (形如 `{eid}_{num}`) 即受试者标识.

mod pressure;

use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub use pressure::{PressureTable, PressureTableError, PULSE_PRESSURE_COLUMN};

/// 单个受试者. 只读.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Subject {
    id: String,
    dir: PathBuf,
}

impl Subject {
    /// 由受试者目录创建. 目录名不是合法 UTF-8 时返回 `None`.
    pub fn from_dir(dir: impl Into<PathBuf>) -> Option<Self> {
        let dir = dir.into();
        let id = dir.file_name()?.to_str()?.to_string();
        Some(Self { id, dir })
    }

    /// 受试者标识.
    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// 受试者目录.
    #[inline]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// 受试者目录下名为 `name` 的文件.
    #[inline]
    pub fn file(&self, name: impl AsRef<Path>) -> PathBuf {
        self.dir.join(name)
    }

    /// 从 `{eid}_{num}` 形式的标识中解析 `eid`. 不符合该形式时返回 `None`.
    pub fn eid(&self) -> Option<u64> {
        let (eid, num) = self.id.split_once('_')?;
        let is_number = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
        if is_number(eid) && is_number(num) {
            eid.parse().ok()
        } else {
            None
        }
    }
}

/// 列出 `root` 下所有受试者, 按目录名字典序排列. 跳过隐藏目录与普通文件;
/// 指向目录的符号链接视为受试者目录.
pub fn subjects(root: &Path) -> io::Result<Vec<Subject>> {
    let mut ans = Vec::new();
    for entry in fs::read_dir(root)? {
        let entry = entry?;
        // 跟随符号链接.
        if !entry.path().is_dir() {
            continue;
        }
        let hidden = entry
            .file_name()
            .to_str()
            .map_or(true, |name| name.starts_with('.'));
        if hidden {
            continue;
        }
        ans.extend(Subject::from_dir(entry.path()));
    }
    ans.sort_unstable_by(|a, b| a.id.cmp(&b.id));
    Ok(ans)
}

/// 由数据目录推导默认输出目录.
///
/// 去掉末尾的 `/` 后, 若以 `.converted`, `-converted` 或 `_converted` 结尾则替换为
/// `.output_csv`, 否则直接追加 `.output_csv`.
pub fn default_output_dir(data_dir: &Path) -> PathBuf {
    const SUFFIXES: [&str; 3] = [".converted", "-converted", "_converted"];
    const OUTPUT: &str = ".output_csv";

    let text = data_dir.to_string_lossy();
    let text = text.trim_end_matches('/');
    let stem = SUFFIXES
        .iter()
        .find_map(|s| text.strip_suffix(*s))
        .unwrap_or(text);
    PathBuf::from(format!("{stem}{OUTPUT}"))
}

/// 将 `--output-csv` 路径拆为输出目录与批次前缀. 路径没有文件名时返回 `None`.
///
/// 只有文件名 (没有父目录) 时, 输出目录为当前目录.
pub fn split_output_csv(path: &Path) -> Option<(PathBuf, String)> {
    let prefix = path.file_name().and_then(OsStr::to_str)?.to_string();
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_owned(),
        _ => PathBuf::from("."),
    };
    Some((dir, prefix))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eid() {
        let s = |id: &str| Subject::from_dir(Path::new("/data").join(id)).unwrap();
        assert_eq!(s("1000215_2").eid(), Some(1000215));
        assert_eq!(s("1000215_2").id(), "1000215_2");
        assert_eq!(s("1000215").eid(), None);
        assert_eq!(s("abc_2").eid(), None);
        assert_eq!(s("1000215_").eid(), None);
        assert_eq!(s("1000215_2_3").eid(), None);
    }

    #[test]
    fn test_subjects_sorted_and_filtered() {
        let root = tempfile::tempdir().unwrap();
        for id in ["1002_2", "1000_2", ".cache", "1001_3"] {
            fs::create_dir(root.path().join(id)).unwrap();
        }
        fs::write(root.path().join("notes.txt"), "x").unwrap();

        let ids: Vec<_> = subjects(root.path())
            .unwrap()
            .into_iter()
            .map(|s| s.id().to_string())
            .collect();
        assert_eq!(ids, vec!["1000_2", "1001_3", "1002_2"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_subjects_follow_symlinks() {
        let real = tempfile::tempdir().unwrap();
        let root = tempfile::tempdir().unwrap();
        fs::create_dir(real.path().join("1000_2")).unwrap();
        std::os::unix::fs::symlink(real.path().join("1000_2"), root.path().join("1000_2")).unwrap();
        // 指向普通文件的链接不是受试者.
        fs::write(real.path().join("notes.txt"), "x").unwrap();
        std::os::unix::fs::symlink(real.path().join("notes.txt"), root.path().join("notes")).unwrap();

        let found = subjects(root.path()).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id(), "1000_2");
        assert_eq!(found[0].dir(), root.path().join("1000_2"));
    }

    #[test]
    fn test_subject_file() {
        let s = Subject::from_dir("/data/1000_2").unwrap();
        assert_eq!(s.file("sa.nii.gz"), PathBuf::from("/data/1000_2/sa.nii.gz"));
        assert_eq!(s.dir(), Path::new("/data/1000_2"));
    }

    #[test]
    fn test_default_output_dir() {
        let f = |p: &str| default_output_dir(Path::new(p));
        assert_eq!(f("/data/ukbb.converted/"), PathBuf::from("/data/ukbb.output_csv"));
        assert_eq!(f("/data/ukbb-converted"), PathBuf::from("/data/ukbb.output_csv"));
        assert_eq!(f("/data/ukbb_converted"), PathBuf::from("/data/ukbb.output_csv"));
        assert_eq!(f("/data/ukbb"), PathBuf::from("/data/ukbb.output_csv"));
    }

    #[test]
    fn test_split_output_csv() {
        assert_eq!(
            split_output_csv(Path::new("/out/table_aortic_area.csv")),
            Some((PathBuf::from("/out"), "table_aortic_area.csv".to_string()))
        );
        assert_eq!(
            split_output_csv(Path::new("t.csv")),
            Some((PathBuf::from("."), "t.csv".to_string()))
        );
        assert_eq!(split_output_csv(Path::new("/")), None);
    }
}
