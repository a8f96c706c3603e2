use crate::volume::Volume;

/// A parametric spatial transform optimized during registration.
///
/// Maps points of the fixed grid, in `(z, y, x)` voxel units, onto the
/// moving grid. Translation is the default model; richer models implement
/// the same trait and plug into
/// [`PairwiseRegistrationEngine::register_with`](super::PairwiseRegistrationEngine::register_with).
pub trait SpatialTransform: Clone + Send + Sync {
    fn parameters(&self) -> Vec<f64>;

    /// Panics if `params` does not match [`parameters`](Self::parameters) in length.
    fn set_parameters(&mut self, params: &[f64]);

    fn map_point(&self, z: f64, y: f64, x: f64) -> (f64, f64, f64);

    fn parameter_count(&self) -> usize {
        self.parameters().len()
    }
}

/// Pure translation. Parameters are `[dx, dy]` for planar volumes and
/// `[dx, dy, dz]` otherwise.
#[derive(Clone, Debug, PartialEq)]
pub struct TranslationTransform {
    offset: Vec<f64>,
}

impl TranslationTransform {
    /// Zero translation in `dims` (2 or 3) dimensions.
    pub fn new(dims: usize) -> Self {
        assert!(dims == 2 || dims == 3, "translation must be 2D or 3D");
        Self {
            offset: vec![0.0; dims],
        }
    }

    /// Zero translation matching the dimensionality of `volume`.
    pub fn for_volume(volume: &Volume) -> Self {
        Self::new(if volume.is_planar() { 2 } else { 3 })
    }

    pub fn from_offset(offset: &[f64]) -> Self {
        let mut t = Self::new(offset.len());
        t.set_parameters(offset);
        t
    }

    pub fn dx(&self) -> f64 {
        self.offset[0]
    }

    pub fn dy(&self) -> f64 {
        self.offset[1]
    }

    pub fn dz(&self) -> f64 {
        self.offset.get(2).copied().unwrap_or(0.0)
    }

    /// Euclidean length of the offset, in voxels.
    pub fn magnitude(&self) -> f64 {
        self.offset.iter().map(|v| v * v).sum::<f64>().sqrt()
    }
}

impl SpatialTransform for TranslationTransform {
    fn parameters(&self) -> Vec<f64> {
        self.offset.clone()
    }

    fn set_parameters(&mut self, params: &[f64]) {
        assert_eq!(params.len(), self.offset.len());
        self.offset.copy_from_slice(params);
    }

    fn map_point(&self, z: f64, y: f64, x: f64) -> (f64, f64, f64) {
        (z + self.dz(), y + self.dy(), x + self.dx())
    }

    fn parameter_count(&self) -> usize {
        self.offset.len()
    }
}
