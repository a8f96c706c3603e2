pub mod affine_warp;
pub mod interpolate;
pub mod multichannel;

pub use affine_warp::{warp_plane, warp_volume};
pub use interpolate::{bilinear_sample, trilinear_sample};
pub use multichannel::{align_channels, align_channels_dyn};
