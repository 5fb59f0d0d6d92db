use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssembleError {
    #[error("no segments to assemble")]
    NoSegments,
    /// Muxer ran and failed. Segments and manifest were kept.
    #[error("muxer exited with {}", describe_exit(.code))]
    Mux { code: Option<i32> },
    #[error("could not start muxer")]
    Spawn(#[source] std::io::Error),
    #[error("filesystem error")]
    Filesystem(#[source] std::io::Error),
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("status {}", c),
        None => "no status (terminated by signal)".to_string(),
    }
}
