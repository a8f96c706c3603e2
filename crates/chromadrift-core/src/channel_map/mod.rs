pub mod entry;
pub mod loader;

pub use entry::{read_channel_map, ChannelMapEntry, REQUIRED_COLUMNS};
pub use loader::{ChannelGroup, ChannelMapLoader};
