use ndarray::{Array2, Array3, Array4, ArrayD, ArrayView3, Axis, Ix3, Ix4};
use serde::{Deserialize, Serialize};

use crate::error::{ChromaDriftError, Result};

/// Element type of the samples stored on disk.
///
/// Volumes keep their samples as `f64` in memory; the tag records which
/// type they must be cast back to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PixelType {
    U8,
    U16,
    U32,
    I8,
    I16,
    I32,
    F32,
    F64,
}

impl PixelType {
    /// Representable range for integer types, `None` for floats.
    pub fn integer_range(self) -> Option<(f64, f64)> {
        match self {
            Self::U8 => Some((u8::MIN as f64, u8::MAX as f64)),
            Self::U16 => Some((u16::MIN as f64, u16::MAX as f64)),
            Self::U32 => Some((u32::MIN as f64, u32::MAX as f64)),
            Self::I8 => Some((i8::MIN as f64, i8::MAX as f64)),
            Self::I16 => Some((i16::MIN as f64, i16::MAX as f64)),
            Self::I32 => Some((i32::MIN as f64, i32::MAX as f64)),
            Self::F32 | Self::F64 => None,
        }
    }

    /// Cast an interpolated sample to this type.
    ///
    /// Integer types round half to even and saturate at the type bounds;
    /// NaN becomes 0. `F32` rounds through single precision.
    pub fn cast(self, value: f64) -> f64 {
        match self.integer_range() {
            Some((lo, hi)) => {
                if value.is_nan() {
                    0.0
                } else {
                    value.round_ties_even().clamp(lo, hi)
                }
            }
            None => match self {
                Self::F32 => value as f32 as f64,
                _ => value,
            },
        }
    }
}

impl std::fmt::Display for PixelType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::U8 => "uint8",
            Self::U16 => "uint16",
            Self::U32 => "uint32",
            Self::I8 => "int8",
            Self::I16 => "int16",
            Self::I32 => "int32",
            Self::F32 => "float32",
            Self::F64 => "float64",
        };
        write!(f, "{}", name)
    }
}

/// A single-channel volume, shape = (depth, rows, cols).
#[derive(Clone, Debug, PartialEq)]
pub struct Volume {
    pub data: Array3<f64>,
    pub dtype: PixelType,
}

impl Volume {
    pub fn new(data: Array3<f64>, dtype: PixelType) -> Self {
        Self { data, dtype }
    }

    /// Promote a 2D plane to a single-slice volume.
    pub fn from_plane(plane: Array2<f64>, dtype: PixelType) -> Self {
        Self::new(plane.insert_axis(Axis(0)), dtype)
    }

    /// Accept a 2D plane or a 3D volume; any other rank is a shape error.
    pub fn from_dyn(array: ArrayD<f64>, dtype: PixelType) -> Result<Self> {
        let array = match array.ndim() {
            2 => array.insert_axis(Axis(0)),
            3 => array,
            _ => {
                return Err(ChromaDriftError::Shape(format!(
                    "expected a 2D plane or a 3D (Z, Y, X) volume, got shape {:?}",
                    array.shape()
                )))
            }
        };
        let data = array
            .into_dimensionality::<Ix3>()
            .map_err(|e| ChromaDriftError::Shape(e.to_string()))?;
        Ok(Self::new(data, dtype))
    }

    pub fn depth(&self) -> usize {
        self.data.dim().0
    }

    pub fn rows(&self) -> usize {
        self.data.dim().1
    }

    pub fn cols(&self) -> usize {
        self.data.dim().2
    }

    /// True for volumes holding a single depth slice (a promoted 2D plane).
    pub fn is_planar(&self) -> bool {
        self.depth() == 1
    }
}

/// Channels stacked along the first axis, shape = (channel, depth, rows, cols).
#[derive(Clone, Debug, PartialEq)]
pub struct MultichannelVolume {
    pub data: Array4<f64>,
    pub dtype: PixelType,
}

impl MultichannelVolume {
    pub fn new(data: Array4<f64>, dtype: PixelType) -> Self {
        Self { data, dtype }
    }

    /// Require a rank-4 (C, Z, Y, X) array.
    pub fn from_dyn(array: ArrayD<f64>, dtype: PixelType) -> Result<Self> {
        if array.ndim() != 4 {
            return Err(ChromaDriftError::Shape(format!(
                "expected shape (C, Z, Y, X), got shape {:?}",
                array.shape()
            )));
        }
        let data = array
            .into_dimensionality::<Ix4>()
            .map_err(|e| ChromaDriftError::Shape(e.to_string()))?;
        Ok(Self::new(data, dtype))
    }

    /// Stack same-shaped, same-typed volumes into one multichannel volume.
    pub fn stack(volumes: &[Volume]) -> Result<Self> {
        let first = volumes.first().ok_or(ChromaDriftError::EmptySequence)?;
        let shape = first.data.dim();
        if let Some(odd) = volumes.iter().find(|v| v.data.dim() != shape) {
            return Err(ChromaDriftError::Shape(format!(
                "channel shapes differ: {:?} vs {:?}",
                shape,
                odd.data.dim()
            )));
        }
        if let Some(odd) = volumes.iter().find(|v| v.dtype != first.dtype) {
            return Err(ChromaDriftError::Shape(format!(
                "channel pixel types differ: {} vs {}",
                first.dtype, odd.dtype
            )));
        }

        let views: Vec<ArrayView3<f64>> = volumes.iter().map(|v| v.data.view()).collect();
        let data = ndarray::stack(Axis(0), &views)
            .map_err(|e| ChromaDriftError::Shape(e.to_string()))?;
        Ok(Self::new(data, first.dtype))
    }

    pub fn channel_count(&self) -> usize {
        self.data.dim().0
    }

    /// Copy one channel out as a standalone volume.
    pub fn channel(&self, index: usize) -> Volume {
        Volume::new(self.data.index_axis(Axis(0), index).to_owned(), self.dtype)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cast_rounds_half_to_even() {
        assert_eq!(PixelType::U8.cast(2.5), 2.0);
        assert_eq!(PixelType::U8.cast(3.5), 4.0);
        assert_eq!(PixelType::I16.cast(-1.5), -2.0);
    }

    #[test]
    fn test_cast_saturates() {
        assert_eq!(PixelType::U8.cast(300.7), 255.0);
        assert_eq!(PixelType::U16.cast(-4.0), 0.0);
        assert_eq!(PixelType::I8.cast(-200.0), -128.0);
        assert_eq!(PixelType::U16.cast(f64::NAN), 0.0);
    }

    #[test]
    fn test_cast_float_passthrough() {
        assert_eq!(PixelType::F64.cast(0.123456789), 0.123456789);
        assert_eq!(PixelType::F32.cast(0.1), 0.1f32 as f64);
    }
}
