//! 🍒欢迎光临🫐
//!
//! 涵盖了本 crate 一系列常用的功能.

pub use crate::{Idx3d, Idx4d};

pub use crate::data::{CmrData4d, CmrImage, CmrLabel, FrameCurve, NiftiHeaderAttr};

pub use crate::consts::label::{
    AO_ASCENDING, AO_DESCENDING, BACKGROUND, SA_LV, SA_MYO, SA_RV,
};
pub use crate::consts::BATCH_SIZE;

pub use crate::checkpoint::{BatchWriter, Checkpoint, MeasurementRow};
pub use crate::dataset::{PressureTable, Subject};
pub use crate::pipeline::{Config, PipelineDriver, Report, Skip, Task};
pub use crate::qc::{AorticQc, QualityGate, Rejection, ShortAxisQc};
