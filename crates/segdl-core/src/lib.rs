//! Segmented downloader engine: resumable fetches, bounded parallel segment
//! download and ordered assembly through an external muxer.

pub mod assemble;
pub mod config;
pub mod direct;
pub mod fetcher;
pub mod logging;
pub mod naming;
pub mod orchestrator;
pub mod probe;
pub mod progress;
pub mod retry;
pub mod segment;
pub mod source;
pub mod storage;
