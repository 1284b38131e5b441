//! Dataset intake and result export.

pub mod dataset;
pub mod export;
