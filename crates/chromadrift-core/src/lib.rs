pub mod channel_map;
pub mod consts;
pub mod error;
pub mod io;
pub mod pipeline;
pub mod register;
pub mod transform;
pub mod volume;
pub mod warp;
