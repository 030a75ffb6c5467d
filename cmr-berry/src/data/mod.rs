use std::ops::Index;
use std::path::{Path, PathBuf};

use ndarray::{Array4, ArrayD, ArrayView3, ArrayView4, Axis, Ix4};
use nifti::writer::WriterOptions;
use nifti::{IntoNdArray, NiftiHeader, NiftiObject, ReaderOptions};
use thiserror::Error;

use crate::consts::DENOMINATOR_EPS;
use crate::Idx4d;

mod frame;

pub use frame::FrameCurve;

/// `NiftiHeader` 是栈上大对象, 移动该对象的开销很可观.
/// 因此我们将其分配到堆上.
type BoxedHeader = Box<NiftiHeader>;

/// 体数据读取/写入错误.
#[derive(Debug, Error)]
pub enum VolumeError {
    /// 文件不存在. 调用方应跳过该受试者, 而不是中止批处理.
    #[error("volume file `{0}` does not exist")]
    Missing(PathBuf),

    /// nifti 文件无法解析或写入.
    #[error("cannot access nifti file `{path}`: {source}")]
    Nifti {
        /// 出错文件路径.
        path: PathBuf,
        /// 底层错误.
        #[source]
        source: nifti::NiftiError,
    },

    /// 维度数不是 3 或 4.
    #[error("unsupported dimensionality {0}, expected a 3D or 4D volume")]
    Dimensionality(usize),

    /// 同一受试者的图像与标签空间形状不一致.
    #[error("image shape {image:?} does not match label shape {label:?}")]
    ShapeMismatch {
        /// 图像形状.
        image: Idx4d,
        /// 标签形状.
        label: Idx4d,
    },
}

/// 将 3D/4D 动态数组统一为 `(x, y, z, t)` 四维数组. 3D 数组补 `t = 1`.
fn into_4d<T>(data: ArrayD<T>) -> Result<Array4<T>, VolumeError> {
    let ndim = data.ndim();
    let data = match ndim {
        3 => data.insert_axis(Axis(3)),
        4 => data,
        n => return Err(VolumeError::Dimensionality(n)),
    };
    data.into_dimensionality::<Ix4>()
        .map_err(|_| VolumeError::Dimensionality(ndim))
}

/// 确认 `path` 处存在文件.
#[inline]
fn ensure_exists(path: &Path) -> Result<(), VolumeError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(VolumeError::Missing(path.to_owned()))
    }
}

#[inline]
fn shape_of<T>(data: &Array4<T>) -> Idx4d {
    data.dim()
}

/// 4D 心脏 MR nii 文件 header 的共用属性和部分通用操作.
///
/// 所有物理量以 nifti header 中的 `pixdim` 为准: `pixdim[1..=3]`
/// 为体素间距 (毫米), `pixdim[4]` 为单帧时长 (秒).
pub trait NiftiHeaderAttr {
    /// 获取 header 部分.
    fn header(&self) -> &NiftiHeader;

    /// 获取数据形状 `(x, y, z, t)`.
    fn shape(&self) -> Idx4d;

    /// 获取单帧空间形状 `(x, y, z)`.
    #[inline]
    fn spatial_shape(&self) -> (usize, usize, usize) {
        let (x, y, z, _) = self.shape();
        (x, y, z)
    }

    /// 获取帧数. 3D 数据恒为 1.
    #[inline]
    fn frame_count(&self) -> usize {
        self.shape().3
    }

    /// 获取单个体素分辨率 `[dx, dy, dz]`, 以毫米为单位.
    #[inline]
    fn pix_dim(&self) -> [f64; 3] {
        let [_, x, y, z, ..] = self.header().pixdim;
        [x as f64, y as f64, z as f64]
    }

    /// x 方向体素分辨率, 以毫米为单位.
    #[inline]
    fn dx(&self) -> f64 {
        self.header().pixdim[1] as f64
    }

    /// y 方向体素分辨率, 以毫米为单位.
    #[inline]
    fn dy(&self) -> f64 {
        self.header().pixdim[2] as f64
    }

    /// 层间距 (z 方向体素分辨率), 以毫米为单位.
    #[inline]
    fn dz(&self) -> f64 {
        self.header().pixdim[3] as f64
    }

    /// 单帧时长, 以秒为单位.
    #[inline]
    fn frame_duration(&self) -> f64 {
        self.header().pixdim[4] as f64
    }

    /// 一个心动周期的时长 (帧数 × 单帧时长), 以秒为单位.
    #[inline]
    fn cycle_duration(&self) -> f64 {
        self.frame_count() as f64 * self.frame_duration()
    }

    /// 心率 (次/分钟), 即 `60 / (帧数 × 单帧时长)`.
    ///
    /// 周期时长非正 (例如 3D 数据没有时间轴信息) 时返回 `None`.
    #[inline]
    fn heart_rate(&self) -> Option<f64> {
        let cycle = self.cycle_duration();
        (cycle > DENOMINATOR_EPS).then(|| 60.0 / cycle)
    }

    /// 单个像素在横截面上的面积, 以平方毫米为单位.
    #[inline]
    fn pixel_area(&self) -> f64 {
        self.dx() * self.dy()
    }

    /// 单个体素的体积, 以毫升为单位.
    #[inline]
    fn voxel_ml(&self) -> f64 {
        self.pix_dim().iter().product::<f64>() * 1e-3
    }
}

/// 由原始数组和 `[dx, dy, dz, dt]` 构造 header.
fn fake_header(pix_dim: [f32; 4]) -> BoxedHeader {
    let mut header = Box::<NiftiHeader>::default();
    header.pixdim[1..=4].copy_from_slice(&pix_dim);
    header
}

/// 为两种体数据生成相同的读取/写入/构造方法.
macro_rules! impl_volume_io {
    ($volume: ty, $elem: ty) => {
        impl $volume {
            /// 打开 nii (或 nii.gz) 格式的体数据. 3D 文件会被补成 `t = 1` 的 4D 数据.
            ///
            /// 文件不存在时返回 [`VolumeError::Missing`].
            pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, VolumeError> {
                let path = path.as_ref();
                ensure_exists(path)?;
                let nifti_err = |source| VolumeError::Nifti {
                    path: path.to_owned(),
                    source,
                };

                let obj = ReaderOptions::new().read_file(path).map_err(nifti_err)?;
                let header = Box::new(obj.header().clone());
                // [x, y, z(, t)]. 内存布局由 nifti 决定, 这里不作要求.
                let data = obj
                    .into_volume()
                    .into_ndarray::<$elem>()
                    .map_err(nifti_err)?;
                let data = into_4d(data)?;

                Ok(Self { header, data })
            }

            /// 根据裸数据和体素间距直接创建实体.
            ///
            /// `data` 按照 \[x, y, z, t\] 格式组织, `pix_dim` 为 \[dx, dy, dz, dt\].
            ///
            /// # 注意
            ///
            /// header 的其余字段均为默认值, 因此你应仅将其用于实验或测试目的.
            pub fn fake(data: Array4<$elem>, pix_dim: [f32; 4]) -> Self {
                Self {
                    header: fake_header(pix_dim),
                    data,
                }
            }

            /// 以 nifti 格式写出到 `path`. 扩展名为 `.gz` 时自动压缩.
            pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), VolumeError> {
                let path = path.as_ref();
                WriterOptions::new(path)
                    .reference_header(&self.header)
                    .write_nifti(&self.data)
                    .map_err(|source| VolumeError::Nifti {
                        path: path.to_owned(),
                        source,
                    })
            }

            /// 获取第 `t` 帧的 3D 视图 `(x, y, z)`.
            ///
            /// 当 `t` 越界时 panic.
            #[inline]
            pub fn frame_at(&self, t: usize) -> ArrayView3<'_, $elem> {
                self.data.index_axis(Axis(3), t)
            }

            /// 获取能按升序迭代所有帧的迭代器.
            #[inline]
            pub fn frame_iter(&self) -> impl ExactSizeIterator<Item = ArrayView3<'_, $elem>> {
                self.data.axis_iter(Axis(3))
            }

            /// 获得数据的一份不可变 shallow copy.
            #[inline]
            pub fn data(&self) -> ArrayView4<'_, $elem> {
                self.data.view()
            }
        }

        impl NiftiHeaderAttr for $volume {
            #[inline]
            fn header(&self) -> &NiftiHeader {
                &self.header
            }

            #[inline]
            fn shape(&self) -> Idx4d {
                shape_of(&self.data)
            }
        }

        impl Index<Idx4d> for $volume {
            type Output = $elem;

            #[inline]
            fn index(&self, (x, y, z, t): Idx4d) -> &Self::Output {
                &self.data[[x, y, z, t]]
            }
        }
    };
}

/// nii 格式 4D 心脏 MR 图像, 包括 header 和强度值. 强度以 `f32` 保存.
#[derive(Debug, Clone)]
pub struct CmrImage {
    header: BoxedHeader,
    data: Array4<f32>,
}

/// nii 格式 4D 心脏 MR 分割标签, 包括 header 和标签值. 标签值以 `u8` 保存.
#[derive(Debug, Clone)]
pub struct CmrLabel {
    header: BoxedHeader,
    data: Array4<u8>,
}

impl_volume_io!(CmrImage, f32);
impl_volume_io!(CmrLabel, u8);

/// 统计单帧中值为 `label` 的体素个数.
#[inline]
fn count_in(frame: ArrayView3<u8>, label: u8) -> usize {
    frame.iter().filter(|&&p| p == label).count()
}

cfg_if::cfg_if! {
    if #[cfg(feature = "rayon")] {
        use rayon::iter::{IntoParallelIterator, ParallelIterator};

        /// 借助 `rayon`, 并行地逐帧统计. 结果按帧序排列.
        fn count_per_frame(data: ArrayView4<u8>, label: u8) -> Vec<usize> {
            data.axis_iter(Axis(3))
                .into_par_iter()
                .map(|frame| count_in(frame, label))
                .collect()
        }
    } else {
        /// 逐帧统计. 结果按帧序排列.
        fn count_per_frame(data: ArrayView4<u8>, label: u8) -> Vec<usize> {
            data.axis_iter(Axis(3))
                .map(|frame| count_in(frame, label))
                .collect()
        }
    }
}

impl CmrLabel {
    /// 获取整个 4D 标签中值为 `label` 的体素个数.
    #[inline]
    pub fn count(&self, label: u8) -> usize {
        self.data.iter().filter(|p| **p == label).count()
    }

    /// 获取每一帧中值为 `label` 的体素个数, 下标即帧序号.
    #[inline]
    pub fn frame_counts(&self, label: u8) -> Vec<usize> {
        count_per_frame(self.data(), label)
    }

    /// 以 `unit` (单个体素对应的面积或体积) 为倍率, 计算 `label` 的逐帧曲线.
    #[inline]
    pub fn curve(&self, label: u8, unit: f64) -> FrameCurve {
        FrameCurve::from_counts(&self.frame_counts(label), unit)
    }

    /// 标签中是否存在值为 `label` 的体素.
    #[inline]
    pub fn contains(&self, label: u8) -> bool {
        self.data.iter().any(|p| *p == label)
    }
}

/// nii 格式的 4D 心脏 MR 图像与对应的分割标签.
///
/// 该结构完全透明, 仅包含两个公开的 `image` 和 `label` 子结构.
#[derive(Debug, Clone)]
pub struct CmrData4d {
    /// 4D 图像.
    pub image: CmrImage,

    /// 4D 分割标签.
    pub label: CmrLabel,
}

impl CmrData4d {
    /// 分别打开 nii 格式的图像和对应标签.
    ///
    /// 任一文件不存在时返回 [`VolumeError::Missing`]; 两者空间形状不一致时返回
    /// [`VolumeError::ShapeMismatch`]. 两个文件都先检查存在性, 再读取.
    pub fn open(
        image_path: impl AsRef<Path>,
        label_path: impl AsRef<Path>,
    ) -> Result<Self, VolumeError> {
        let (image_path, label_path) = (image_path.as_ref(), label_path.as_ref());
        ensure_exists(image_path)?;
        ensure_exists(label_path)?;

        let image = CmrImage::open(image_path)?;
        let label = CmrLabel::open(label_path)?;
        if image.spatial_shape() != label.spatial_shape() {
            return Err(VolumeError::ShapeMismatch {
                image: image.shape(),
                label: label.shape(),
            });
        }
        Ok(Self { image, label })
    }
}

#[cfg(test)]
mod tests {
    use super::{CmrData4d, CmrImage, CmrLabel, NiftiHeaderAttr, VolumeError};
    use ndarray::Array4;

    fn f64_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_geometry_from_pixdim() {
        let label = CmrLabel::fake(Array4::zeros((4, 4, 2, 50)), [1.8, 1.8, 10.0, 0.02]);
        assert_eq!(label.frame_count(), 50);
        assert!(f64_eq(label.pixel_area(), 1.8 * 1.8));
        assert!(f64_eq(label.voxel_ml(), 1.8 * 1.8 * 10.0 * 1e-3));
        // 50 帧 * 20 ms = 1 s -> 60 bpm
        assert!(f64_eq(label.heart_rate().unwrap(), 60.0));
    }

    #[test]
    fn test_heart_rate_undefined_without_duration() {
        let label = CmrLabel::fake(Array4::zeros((4, 4, 2, 1)), [1.0, 1.0, 1.0, 0.0]);
        assert_eq!(label.heart_rate(), None);
    }

    #[test]
    fn test_frame_counts() {
        let mut data = Array4::<u8>::zeros((3, 3, 2, 3));
        data[[0, 0, 0, 0]] = 1;
        data[[1, 1, 1, 0]] = 1;
        data[[2, 2, 0, 2]] = 1;
        data[[2, 1, 0, 2]] = 2;
        let label = CmrLabel::fake(data, [1.0; 4]);
        assert_eq!(label.frame_counts(1), vec![2, 0, 1]);
        assert_eq!(label.frame_counts(2), vec![0, 0, 1]);
        assert_eq!(label.count(1), 3);
        assert!(!label.contains(3));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seg_sa.nii.gz");
        assert!(matches!(CmrLabel::open(&path), Err(VolumeError::Missing(p)) if p == path));
        let image = dir.path().join("sa.nii.gz");
        assert!(matches!(
            CmrData4d::open(&image, &path),
            Err(VolumeError::Missing(_))
        ));
    }

    #[test]
    fn test_save_and_open() {
        let dir = tempfile::tempdir().unwrap();
        let mut data = Array4::<u8>::zeros((5, 4, 3, 2));
        data[[4, 3, 2, 1]] = 3;
        data[[0, 1, 2, 0]] = 1;
        let label = CmrLabel::fake(data, [1.25, 1.25, 8.0, 0.03]);
        let path = dir.path().join("seg_sa.nii.gz");
        label.save(&path).unwrap();

        let back = CmrLabel::open(&path).unwrap();
        assert_eq!(back.shape(), (5, 4, 3, 2));
        assert_eq!(back[(4, 3, 2, 1)], 3);
        assert_eq!(back[(0, 1, 2, 0)], 1);
        assert!(f64_eq(back.dx(), 1.25));
        assert!(f64_eq(back.dz(), 8.0));
        assert!(f64_eq(back.frame_duration(), 0.03));
    }

    #[test]
    fn test_open_pair_shape_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let image = CmrImage::fake(Array4::zeros((4, 4, 2, 2)), [1.0; 4]);
        let label = CmrLabel::fake(Array4::zeros((4, 5, 2, 2)), [1.0; 4]);
        let (ip, lp) = (dir.path().join("ao.nii.gz"), dir.path().join("seg_ao.nii.gz"));
        image.save(&ip).unwrap();
        label.save(&lp).unwrap();
        assert!(matches!(
            CmrData4d::open(&ip, &lp),
            Err(VolumeError::ShapeMismatch { .. })
        ));
    }
}
