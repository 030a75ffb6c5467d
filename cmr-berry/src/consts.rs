//! 通用常量.

/// 标签值. 每条流水线的解剖结构都对应固定的标签常量.
pub mod label {
    /// 背景的体素值.
    pub const BACKGROUND: u8 = 0;

    /// 短轴序列中, 左心室血池的体素值.
    pub const SA_LV: u8 = 1;

    /// 短轴序列中, 左心室心肌的体素值.
    pub const SA_MYO: u8 = 2;

    /// 短轴序列中, 右心室血池的体素值.
    pub const SA_RV: u8 = 3;

    /// 主动脉序列中, 升主动脉的体素值.
    pub const AO_ASCENDING: u8 = 1;

    /// 主动脉序列中, 降主动脉的体素值.
    pub const AO_DESCENDING: u8 = 2;
}

/// 受试者目录下的文件名.
pub mod file {
    /// 短轴 4D 图像.
    pub const SA_IMAGE: &str = "sa.nii.gz";

    /// 短轴 4D 分割.
    pub const SA_LABEL: &str = "seg_sa.nii.gz";

    /// 舒张末期 (ED) 短轴 3D 分割.
    pub const SA_LABEL_ED: &str = "seg_sa_ED.nii.gz";

    /// 主动脉 4D 图像.
    pub const AO_IMAGE: &str = "ao.nii.gz";

    /// 主动脉 4D 分割.
    pub const AO_LABEL: &str = "seg_ao.nii.gz";

    /// 壁厚计算结果文件名 (不含扩展名). 结果文件为 `{stem}.csv`.
    pub const WALL_THICKNESS_STEM: &str = "wall_thickness_ED";

    /// 心室容积输出表 (批次前缀).
    pub const TABLE_VENTRICULAR_VOLUME: &str = "table_ventricular_volume.csv";

    /// 心肌壁厚输出表 (批次前缀).
    pub const TABLE_WALL_THICKNESS: &str = "table_wall_thickness.csv";

    /// 主动脉面积输出表 (批次前缀).
    pub const TABLE_AORTIC_AREA: &str = "table_aortic_area.csv";
}

/// 每个输出批次文件最多容纳的行数.
pub const BATCH_SIZE: usize = 500;

/// 心肌组织密度, 单位 g/mL.
pub const MYOCARDIUM_DENSITY: f64 = 1.05;

/// 中心脉压下限, 单位 mmHg. 低于该值的测量被视为不可信.
pub const MIN_CENTRAL_PULSE_PRESSURE: f64 = 10.0;

/// AHA 16 分段.
pub const AHA_SEGMENTS: usize = 16;

/// 比值分母的最小绝对值. 低于该值时比值视为未定义.
pub const DENOMINATOR_EPS: f64 = 1e-6;
