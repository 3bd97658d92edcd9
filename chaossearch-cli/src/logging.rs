//! Logger setup
//!
//! Logs go to stderr, or to a file when `--log-file` is given. The returned
//! [`LogGuard`] owns the file handle and flushes it when dropped, so it must
//! live until the command finishes.

use std::env;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

use colored::Colorize;
use env_logger::fmt::Formatter as LogFormatter;
use env_logger::{Builder as LogBuilder, Target};
use log::{Level as LogLevel, LevelFilter as LogLevelFilter, Record as LogRecord};

/// Log file shared between the logger and the guard
#[derive(Clone)]
struct SharedFile(Arc<Mutex<BufWriter<File>>>);

impl SharedFile {
    fn create(path: &Path) -> io::Result<Self> {
        Ok(Self(Arc::new(Mutex::new(BufWriter::new(File::create(path)?)))))
    }
}

impl Write for SharedFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .map_err(|_| io::Error::other("log file lock poisoned"))?
            .write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0
            .lock()
            .map_err(|_| io::Error::other("log file lock poisoned"))?
            .flush()
    }
}

/// Flushes pending log output on drop
pub struct LogGuard {
    file: Option<SharedFile>,
}

impl Drop for LogGuard {
    fn drop(&mut self) {
        log::logger().flush();
        if let Some(file) = &mut self.file {
            let _ = file.flush();
        }
    }
}

fn level_prefix(level: LogLevel, colored: bool) -> String {
    let prefix = match level {
        LogLevel::Error => "E",
        LogLevel::Warn => "W",
        LogLevel::Info => "I",
        LogLevel::Debug => "D",
        LogLevel::Trace => "T",
    };
    if !colored {
        return prefix.to_string();
    }
    match level {
        LogLevel::Error => prefix.red().bold().to_string(),
        LogLevel::Warn => prefix.yellow().bold().to_string(),
        LogLevel::Info => prefix.green().to_string(),
        LogLevel::Debug | LogLevel::Trace => prefix.normal().to_string(),
    }
}

fn builder(verbose: bool, colored: bool) -> LogBuilder {
    let format = move |formatter: &mut LogFormatter, record: &LogRecord<'_>| {
        writeln!(
            formatter,
            "{} [{}] {}",
            level_prefix(record.level(), colored),
            record.target(),
            record.args()
        )
    };

    let mut builder = LogBuilder::new();
    builder.format(format).filter(
        None,
        if verbose {
            LogLevelFilter::Debug
        } else {
            LogLevelFilter::Warn
        },
    );
    if let Ok(filters) = env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    builder
}

/// Install the global logger
pub fn init(verbose: bool, log_file: Option<&Path>) -> io::Result<LogGuard> {
    let file = log_file.map(SharedFile::create).transpose()?;

    let mut builder = builder(verbose, file.is_none());
    if let Some(file) = &file {
        builder.target(Target::Pipe(Box::new(file.clone())));
    }
    builder.try_init().map_err(io::Error::other)?;

    Ok(LogGuard { file })
}
