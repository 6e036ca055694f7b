pub mod active;
pub mod analysis;
pub mod consts;
pub mod diagnostics;
pub mod error;
pub mod intensity;
pub mod io;
pub mod preprocess;
pub mod report;
pub mod segment;
pub mod stack;
pub mod stats;
