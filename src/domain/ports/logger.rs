use std::fmt;
use std::sync::{Arc, Mutex};

/// Port for the request pipeline's diagnostic lines.
///
/// The request executor reports each backoff and each retryable failure
/// through this trait. It is injected per client, so a library user who
/// never configures one gets [`NoopLogger`] and no output at all.
///
/// # Examples
///
/// ```
/// use cloudflare_api::domain::ports::{RecordingLogger, RequestLogger};
///
/// let logger = RecordingLogger::default();
/// logger.log(format_args!("retry {} of {}", 1, 3));
/// assert_eq!(logger.lines(), vec!["retry 1 of 3".to_string()]);
/// ```
pub trait RequestLogger: Send + Sync {
    /// Emit one preformatted line
    fn log(&self, args: fmt::Arguments<'_>);
}

/// Discards everything. The client default.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLogger;

impl RequestLogger for NoopLogger {
    fn log(&self, _args: fmt::Arguments<'_>) {}
}

/// Keeps every line in memory; useful for assertions and diagnostics dumps.
#[derive(Debug, Clone, Default)]
pub struct RecordingLogger {
    lines: Arc<Mutex<Vec<String>>>,
}

impl RecordingLogger {
    /// Snapshot of the recorded lines
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .map(|lines| lines.clone())
            .unwrap_or_default()
    }

    /// Number of recorded lines starting with `prefix`
    pub fn count_prefixed(&self, prefix: &str) -> usize {
        self.lines().iter().filter(|l| l.starts_with(prefix)).count()
    }
}

impl RequestLogger for RecordingLogger {
    fn log(&self, args: fmt::Arguments<'_>) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(args.to_string());
        }
    }
}

impl<L: RequestLogger + ?Sized> RequestLogger for Arc<L> {
    fn log(&self, args: fmt::Arguments<'_>) {
        (**self).log(args);
    }
}
