//! 三条具体流水线.

use super::{Skip, Task};
use crate::consts::file;
use crate::dataset::{PressureTable, PressureTableError, Subject};
use crate::measure::{AorticAreas, ThicknessEvaluator, VentricularVolumes, WallThickness};
use crate::qc::{AorticQc, QualityGate, ShortAxisQc};
use crate::{CmrData4d, CmrLabel};
use std::path::Path;

fn owned_columns(columns: &[&str]) -> Vec<String> {
    columns.iter().map(|c| c.to_string()).collect()
}

/// 左右心室容积. 输入为 `sa.nii.gz` 与 `seg_sa.nii.gz`, 在 ED 帧上做短轴质控.
/// 体素几何与心率以图像 header 为准.
#[derive(Copy, Clone, Debug, Default)]
pub struct VentricularVolumeTask {
    /// 短轴质控.
    pub qc: ShortAxisQc,
}

impl Task for VentricularVolumeTask {
    fn name(&self) -> &str {
        "ventricular volume"
    }

    fn columns(&self) -> Vec<String> {
        owned_columns(&VentricularVolumes::COLUMNS)
    }

    fn evaluate(&self, subject: &Subject) -> Result<Vec<f64>, Skip> {
        let data = CmrData4d::open(subject.file(file::SA_IMAGE), subject.file(file::SA_LABEL))?;
        self.qc.inspect(&data.label, Some(&data.image))?;
        Ok(VentricularVolumes::measure(&data.label, &data.image).values())
    }
}

/// 心肌壁厚. 输入为 `seg_sa_ED.nii.gz`, 质控后交由 `E` 计算,
/// 再读回 `wall_thickness_ED.csv`.
#[derive(Clone, Debug, Default)]
pub struct WallThicknessTask<E> {
    /// 短轴质控.
    pub qc: ShortAxisQc,

    /// 壁厚计算器.
    pub evaluator: E,
}

impl<E: ThicknessEvaluator> WallThicknessTask<E> {
    /// 使用默认质控阈值.
    pub fn new(evaluator: E) -> Self {
        Self {
            qc: ShortAxisQc::default(),
            evaluator,
        }
    }
}

impl<E: ThicknessEvaluator> Task for WallThicknessTask<E> {
    fn name(&self) -> &str {
        "wall thickness"
    }

    fn columns(&self) -> Vec<String> {
        WallThickness::columns()
    }

    fn evaluate(&self, subject: &Subject) -> Result<Vec<f64>, Skip> {
        let seg = subject.file(file::SA_LABEL_ED);
        let label = CmrLabel::open(&seg)?;
        self.qc.inspect(&label, None)?;

        let stem = subject.file(file::WALL_THICKNESS_STEM);
        self.evaluator.evaluate(&seg, &stem)?;
        let result = subject.file(format!("{}.csv", file::WALL_THICKNESS_STEM));
        Ok(WallThickness::read(result)?.values())
    }
}

/// 主动脉面积与扩张性. 输入为 `ao.nii.gz` 与 `seg_ao.nii.gz`,
/// 中心脉压按受试者 `eid` 从血压表中查询.
#[derive(Clone, Debug)]
pub struct AorticAreaTask {
    /// 主动脉质控.
    pub qc: AorticQc,

    pressure: PressureTable,
}

impl AorticAreaTask {
    /// 以已加载的血压表创建.
    pub fn new(pressure: PressureTable) -> Self {
        Self {
            qc: AorticQc::default(),
            pressure,
        }
    }

    /// 读取血压表并创建. 血压表不可用是致命错误.
    pub fn open(pressure_csv: impl AsRef<Path>) -> Result<Self, PressureTableError> {
        PressureTable::open(pressure_csv).map(Self::new)
    }
}

impl Task for AorticAreaTask {
    fn name(&self) -> &str {
        "aortic area"
    }

    fn columns(&self) -> Vec<String> {
        owned_columns(&AorticAreas::COLUMNS)
    }

    fn evaluate(&self, subject: &Subject) -> Result<Vec<f64>, Skip> {
        let eid = subject
            .eid()
            .ok_or_else(|| Skip::InvalidSubject(subject.id().to_string()))?;
        let data = CmrData4d::open(subject.file(file::AO_IMAGE), subject.file(file::AO_LABEL))?;
        self.qc.inspect(&data.label, Some(&data.image))?;
        Ok(AorticAreas::measure(&data.label, self.pressure.lookup(eid)).values())
    }
}
