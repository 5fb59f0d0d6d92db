//! CLI command handlers, one file per command plus the shared segment pipeline.

mod file;
mod get;
mod hls;
mod list;
mod pipeline;

pub use file::run_file;
pub use get::run_get;
pub use hls::run_hls;
pub use list::run_list;
