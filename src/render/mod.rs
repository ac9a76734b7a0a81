//! Frame rendering split by screen region.

pub mod context;
pub mod layout;
pub mod overlays;
