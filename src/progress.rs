//! # Progress Tracking Module
//!
//! Progress bar opzionale con `indicatif`, disegnata su stderr.
//!
//! ## Visual feedback:
//! ```text
//! ⠋ [00:02:15] [========================================] 150/150 (100%) [OK] logo.png: 31.4% saved
//! ```
//!
//! Quando disabilitata la barra è nascosta e tutte le chiamate sono no-op.
//!
//! I log di `tracing` condividono stderr con la barra: `log_writer()` scrive
//! ogni evento con la barra sospesa, così le righe non si mescolano.

use indicatif::{ProgressBar, ProgressFinish, ProgressStyle};
use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;
use tracing_subscriber::fmt::MakeWriter;

/// Manages progress reporting for a batch run
#[derive(Clone)]
pub struct ProgressManager {
    bar: ProgressBar,
}

impl ProgressManager {
    /// Create a progress bar. Nothing is drawn until `start()`.
    pub fn new() -> Self {
        // cleared if dropped before `finish()`, e.g. when setup fails
        let bar = ProgressBar::new(0).with_finish(ProgressFinish::AndClear);

        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
        {
            bar.set_style(style.progress_chars("=>-"));
        }

        Self { bar }
    }

    /// A manager that draws nothing
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    /// Set the file count once enumeration is over and begin drawing
    pub fn start(&self, total_files: u64) {
        self.bar.set_length(total_files);
        if !self.bar.is_hidden() {
            self.bar.enable_steady_tick(Duration::from_millis(100));
        }
    }

    /// Update progress with a message
    pub fn update(&self, message: &str) {
        self.bar.inc(1);
        self.bar.set_message(message.to_string());
    }

    /// Advance for a file that reached a terminal state
    pub fn file_done(&self, path: &Path, reduction: Option<f64>) {
        let name = path.file_name().unwrap_or_default().to_string_lossy();
        match reduction {
            Some(percent) => self.update(&format!("[OK] {}: {:.1}% saved", name, percent)),
            None => self.update(&format!("[ERROR] {}: error", name)),
        }
    }

    /// Finish with a final message
    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }

    /// Stderr writer for `tracing_subscriber` that keeps log lines off the bar
    pub fn log_writer(&self) -> ProgressLogWriter {
        ProgressLogWriter {
            bar: self.bar.clone(),
        }
    }
}

impl Default for ProgressManager {
    fn default() -> Self {
        Self::new()
    }
}

/// `MakeWriter` handing out one buffered writer per log event
#[derive(Clone)]
pub struct ProgressLogWriter {
    bar: ProgressBar,
}

impl<'a> MakeWriter<'a> for ProgressLogWriter {
    type Writer = SuspendedStderr;

    fn make_writer(&'a self) -> Self::Writer {
        SuspendedStderr {
            bar: self.bar.clone(),
            buffer: Vec::new(),
        }
    }
}

/// Buffers one event and writes it to stderr with the bar cleared
pub struct SuspendedStderr {
    bar: ProgressBar,
    buffer: Vec<u8>,
}

impl SuspendedStderr {
    fn write_out(&mut self) -> io::Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        let buffer = std::mem::take(&mut self.buffer);
        self.bar.suspend(|| io::stderr().write_all(&buffer))
    }
}

impl Write for SuspendedStderr {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.write_out()
    }
}

impl Drop for SuspendedStderr {
    fn drop(&mut self) {
        let _ = self.write_out();
    }
}
