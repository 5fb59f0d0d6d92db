//! Integration tests: segmented download against a local HTTP server,
//! covering retries, resume, range fallback, fail-fast and assembly.

mod common;

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use common::segment_server::SegmentServer;
use segdl_core::assemble::{Assembler, Muxer};
use segdl_core::fetcher::{Fetcher, TransferOptions};
use segdl_core::orchestrator::{JobError, Orchestrator};
use segdl_core::retry::{FetchError, RetryPolicy};
use segdl_core::segment::SegmentSpec;
use tempfile::tempdir;

fn body(index: u8, len: usize) -> Vec<u8> {
    (0u8..=250).cycle().skip(index as usize).take(len).collect()
}

fn fast_policy(max_attempts: u32) -> RetryPolicy {
    RetryPolicy {
        max_attempts,
        backoff_base: 0.0,
        max_delay: Duration::ZERO,
    }
}

fn orchestrator(max_attempts: u32, workers: usize) -> Orchestrator {
    let fetcher = Fetcher::new(fast_policy(max_attempts), TransferOptions::default());
    Orchestrator::new(fetcher, "ts", workers).unwrap()
}

fn specs(server: &SegmentServer, count: u64) -> Vec<SegmentSpec> {
    (1..=count)
        .map(|i| SegmentSpec::new(i, &server.url(&format!("/seg{}.ts", i))).unwrap())
        .collect()
}

/// Concatenates the inputs byte for byte, standing in for ffmpeg.
struct ConcatMuxer;

impl Muxer for ConcatMuxer {
    fn mux(&self, ordered_paths: &[PathBuf], _manifest: &Path, output: &Path) -> io::Result<Option<i32>> {
        let mut joined = Vec::new();
        for path in ordered_paths {
            joined.extend(std::fs::read(path)?);
        }
        std::fs::write(output, joined)?;
        Ok(Some(0))
    }
}

#[test]
fn flaky_segment_is_retried_and_output_is_index_ordered() {
    let mut builder = SegmentServer::builder();
    for i in 1..=5u8 {
        let path = format!("/seg{}.ts", i);
        builder = if i == 3 {
            builder.flaky_route(&path, body(i, 4096), 2)
        } else {
            builder.route(&path, body(i, 4096))
        };
    }
    let server = builder.start();
    let dir = tempdir().unwrap();

    let paths = orchestrator(5, 2).run(&specs(&server, 5), dir.path()).unwrap();

    let names: Vec<_> = paths
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, ["segment_1.ts", "segment_2.ts", "segment_3.ts", "segment_4.ts", "segment_5.ts"]);
    for (i, path) in (1..=5u8).zip(&paths) {
        assert_eq!(std::fs::read(path).unwrap(), body(i, 4096));
    }
    assert_eq!(server.gets("/seg3.ts"), 3);
    for i in [1, 2, 4, 5] {
        assert_eq!(server.gets(&format!("/seg{}.ts", i)), 1, "segment {} fetched once", i);
    }
}

#[test]
fn partial_file_is_resumed_with_range_request() {
    let full = body(1, 10_000);
    let server = SegmentServer::builder().route("/seg1.ts", full.clone()).start();
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("segment_1.ts.part"), &full[..3000]).unwrap();

    let paths = orchestrator(3, 1).run(&specs(&server, 1), dir.path()).unwrap();

    assert_eq!(std::fs::read(&paths[0]).unwrap(), full);
    assert_eq!(server.range_starts("/seg1.ts"), [3000]);
    assert!(!dir.path().join("segment_1.ts.part").exists());
}

#[test]
fn server_ignoring_range_restarts_from_zero() {
    let full = body(1, 10_000);
    let server = SegmentServer::builder()
        .route("/seg1.ts", full.clone())
        .ignore_ranges()
        .start();
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("segment_1.ts.part"), vec![0xAA; 2500]).unwrap();

    let paths = orchestrator(3, 1).run(&specs(&server, 1), dir.path()).unwrap();

    assert_eq!(std::fs::read(&paths[0]).unwrap(), full);
    assert_eq!(server.gets("/seg1.ts"), 1);
}

#[test]
fn exhausted_segment_fails_job_and_keeps_files() {
    let server = SegmentServer::builder()
        .route("/seg1.ts", body(1, 2048))
        .flaky_route("/seg2.ts", body(2, 2048), 100)
        .route("/seg3.ts", body(3, 2048))
        .start();
    let dir = tempdir().unwrap();

    let err = orchestrator(3, 1).run(&specs(&server, 3), dir.path()).unwrap_err();

    assert_eq!(err.failed_index(), Some(2));
    match err {
        JobError::Segment { index, source } => {
            assert_eq!(index, 2);
            assert!(matches!(source, FetchError::ExhaustedRetries { attempts: 3, .. }));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(server.gets("/seg2.ts"), 3);
    // One worker: the failure drains the queue before segment 3 starts.
    assert_eq!(server.gets("/seg3.ts"), 0);
    assert!(dir.path().join("segment_1.ts").is_file());
    assert!(dir.path().join("segment_2.ts.part").is_file());
    assert!(!dir.path().join("segment_2.ts").exists());
}

#[test]
fn rerun_after_failure_only_fetches_missing_segments() {
    let server = SegmentServer::builder()
        .route("/seg1.ts", body(1, 2048))
        .flaky_route("/seg2.ts", body(2, 2048), 2)
        .start();
    let dir = tempdir().unwrap();

    assert!(orchestrator(2, 1).run(&specs(&server, 2), dir.path()).is_err());
    let paths = orchestrator(2, 1).run(&specs(&server, 2), dir.path()).unwrap();

    assert_eq!(paths.len(), 2);
    assert_eq!(server.gets("/seg1.ts"), 1);
    assert_eq!(server.gets("/seg2.ts"), 3);
    assert_eq!(std::fs::read(&paths[1]).unwrap(), body(2, 2048));
}

#[test]
fn worker_count_does_not_change_output() {
    let mut builder = SegmentServer::builder();
    for i in 1..=8u8 {
        builder = builder.route(&format!("/seg{}.ts", i), body(i, 1000 + i as usize * 37));
    }
    let server = builder.start();
    let assembler = Assembler::new(Box::new(ConcatMuxer));

    let mut outputs = Vec::new();
    for workers in [1, 3, 8] {
        let dir = tempdir().unwrap();
        let paths = orchestrator(2, workers).run(&specs(&server, 8), dir.path()).unwrap();
        let out = assembler.assemble(&paths, &dir.path().join("show.mp4")).unwrap();
        assert_eq!(out, dir.path().join("show.mp4"));
        // Segments and manifest are removed after a successful merge.
        assert!(!paths[0].exists());
        assert!(!dir.path().join("show_concat.txt").exists());
        outputs.push(std::fs::read(out).unwrap());
    }
    let expected: Vec<u8> = (1..=8u8).flat_map(|i| body(i, 1000 + i as usize * 37)).collect();
    for output in &outputs {
        assert_eq!(output, &expected);
    }
}

#[test]
fn partial_response_from_byte_zero_replaces_part_file() {
    let full = body(1, 10_000);
    let server = SegmentServer::builder()
        .route("/seg1.ts", full.clone())
        .ranges_from_zero()
        .start();
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("segment_1.ts.part"), &full[..3000]).unwrap();

    let paths = orchestrator(3, 1).run(&specs(&server, 1), dir.path()).unwrap();

    let saved = std::fs::read(&paths[0]).unwrap();
    assert_eq!(saved.len(), full.len(), "never larger than the server total");
    assert_eq!(saved, full);
    assert_eq!(server.range_starts("/seg1.ts"), [3000]);
}

#[test]
fn complete_part_file_is_finalized_on_416() {
    let full = body(1, 10_000);
    let server = SegmentServer::builder().route("/seg1.ts", full.clone()).start();
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("segment_1.ts.part"), &full).unwrap();

    let paths = orchestrator(3, 1).run(&specs(&server, 1), dir.path()).unwrap();

    assert_eq!(std::fs::read(&paths[0]).unwrap(), full);
    assert_eq!(server.range_starts("/seg1.ts"), [10_000]);
}

#[test]
fn completion_order_does_not_leak_into_output_order() {
    // Segment 1 is the last to finish.
    let server = SegmentServer::builder()
        .slow_route("/seg1.ts", body(1, 1024), Duration::from_millis(400), 0)
        .route("/seg2.ts", body(2, 1024))
        .route("/seg3.ts", body(3, 1024))
        .route("/seg4.ts", body(4, 1024))
        .start();
    let dir = tempdir().unwrap();

    let paths = orchestrator(2, 4).run(&specs(&server, 4), dir.path()).unwrap();

    for (i, path) in (1..=4u8).zip(&paths) {
        assert_eq!(std::fs::read(path).unwrap(), body(i, 1024));
    }
}

#[test]
fn failure_with_many_workers_cancels_in_flight_and_queued_segments() {
    // Three workers pick up segments 1-3. Segment 1 fails for good after two
    // slow attempts; segment 2 fails its first attempt after the abort and
    // must not retry; segment 3 is still finishing its only attempt.
    let server = SegmentServer::builder()
        .slow_route("/seg1.ts", body(1, 512), Duration::from_millis(150), 100)
        .slow_route("/seg2.ts", body(2, 512), Duration::from_millis(700), 1)
        .slow_route("/seg3.ts", body(3, 512), Duration::from_millis(700), 0)
        .route("/seg4.ts", body(4, 512))
        .route("/seg5.ts", body(5, 512))
        .route("/seg6.ts", body(6, 512))
        .start();
    let dir = tempdir().unwrap();

    let err = orchestrator(2, 3).run(&specs(&server, 6), dir.path()).unwrap_err();

    assert_eq!(err.failed_index(), Some(1));
    assert_eq!(server.gets("/seg1.ts"), 2);
    assert_eq!(server.gets("/seg2.ts"), 1, "cancelled before its retry");
    assert!(dir.path().join("segment_2.ts.part").is_file());
    assert!(dir.path().join("segment_3.ts").is_file(), "in-flight attempt completes");
    for i in 4..=6 {
        assert_eq!(server.gets(&format!("/seg{}.ts", i)), 0, "segment {} never requested", i);
    }
}
