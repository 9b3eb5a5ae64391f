// Copyright 2024 FastLabs Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! A logger writing to size- and time-rotated files.
//!
//! # Example
//!
//! ```no_run
//! use fastlog::Logger;
//! use fastlog::RotatingLogger;
//!
//! let log = RotatingLogger::builder("logs/server", "server")
//!     .file_size(64 * 1024 * 1024)
//!     .max_index(10)
//!     .rotation_hour(0)
//!     .build()
//!     .unwrap();
//!
//! log.info(&[&"listening on ", &"0.0.0.0:8080"]);
//! ```
//!
//! The first file is `logs/server-{YYYY_MM_DD}`. Once it grows past `file_size`, the next size
//! check moves to `logs/server-{YYYY_MM_DD}.1`, then `.2`, up to `max_index - 1`.

use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::Sender;
use crossbeam_channel::bounded;
use crossbeam_channel::never;
use crossbeam_channel::unbounded;

use crate::CallSite;
use crate::Error;
use crate::FieldSet;
use crate::Level;
use crate::LevelPrefixes;
use crate::LineWriter;
use crate::Logger;
use crate::clock::Clock;
use crate::rotating::controller::Command;
use crate::rotating::controller::Controller;
use crate::rotating::controller::PeriodTimer;
use crate::rotating::controller::Rotator;
use crate::rotating::file::ActiveFile;
use crate::rotating::signal::SignalGuard;
use crate::rotating::signal::forward_termination_signals;
use crate::trap::DefaultTrap;
use crate::trap::Trap;

mod controller;
mod file;
mod naming;
mod schedule;
mod signal;

const DEFAULT_FILE_SIZE: u64 = 64 * 1024 * 1024;
const DEFAULT_MAX_INDEX: usize = 10;
const DEFAULT_CHECK_INTERVAL: Duration = Duration::from_secs(5);

/// A builder to configure and create a [`RotatingLogger`].
#[derive(Debug)]
pub struct RotatingLoggerBuilder {
    // required
    path: PathBuf,
    module: String,

    // has default
    file_size: u64,
    max_index: usize,
    rotation_hour: Option<u8>,
    check_interval: Duration,
    handle_signals: bool,
    #[cfg(feature = "colored")]
    colors: Option<crate::color::LevelColor>,
    clock: Clock,
    trap: Box<dyn Trap>,
}

impl RotatingLoggerBuilder {
    /// Create a builder for a logger writing next to `path` and tagging lines with `module`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, module: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            module: module.into(),
            file_size: DEFAULT_FILE_SIZE,
            max_index: DEFAULT_MAX_INDEX,
            rotation_hour: None,
            check_interval: DEFAULT_CHECK_INTERVAL,
            handle_signals: true,
            #[cfg(feature = "colored")]
            colors: None,
            clock: Clock::DefaultClock,
            trap: Box::new(DefaultTrap::default()),
        }
    }

    /// Set the size in bytes at which the active file is rotated.
    ///
    /// Default to 64 MiB. Must be greater than zero.
    #[must_use]
    pub fn file_size(mut self, n: u64) -> Self {
        self.file_size = n;
        self
    }

    /// Set the number of files per period: the bare period file plus indices `1..n`.
    ///
    /// Default to 10. Must be greater than zero.
    #[must_use]
    pub fn max_index(mut self, n: usize) -> Self {
        self.max_index = n;
        self
    }

    /// Rotate every day when the local clock reaches `hour` (0-23).
    #[must_use]
    pub fn rotation_hour(mut self, hour: u8) -> Self {
        self.rotation_hour = Some(hour);
        self
    }

    /// Set how often the active file size is checked.
    ///
    /// Default to 5 seconds.
    #[must_use]
    pub fn check_interval(mut self, interval: Duration) -> Self {
        self.check_interval = interval;
        self
    }

    /// Whether termination signals close the log file and stop rotation.
    ///
    /// Default to `true`. Observing a signal replaces its default action for the whole process.
    #[must_use]
    pub fn handle_signals(mut self, yes: bool) -> Self {
        self.handle_signals = yes;
        self
    }

    /// Color level tags with `colors`. Files are written without color by default.
    #[cfg(feature = "colored")]
    #[must_use]
    pub fn level_color(mut self, colors: crate::color::LevelColor) -> Self {
        self.colors = Some(colors);
        self
    }

    /// Set the trap for errors raised on the rotation thread.
    ///
    /// Default to [`DefaultTrap`].
    #[must_use]
    pub fn trap(mut self, trap: impl Into<Box<dyn Trap>>) -> Self {
        self.trap = trap.into();
        self
    }

    /// Build the [`RotatingLogger`] and start its rotation thread.
    ///
    /// # Errors
    ///
    /// Return an error if either:
    ///
    /// * `file_size` or `max_index` is zero, the path is empty, or the rotation hour is above 23;
    /// * the log directory or the initial file cannot be created;
    /// * the rotation thread or signal handlers cannot be set up.
    pub fn build(self) -> Result<RotatingLogger, Error> {
        let Self {
            path,
            module,
            file_size,
            max_index,
            rotation_hour,
            check_interval,
            handle_signals,
            #[cfg(feature = "colored")]
            colors,
            clock,
            trap,
        } = self;

        if file_size == 0 {
            return Err(Error::new("file_size must be greater than zero"));
        }
        if max_index == 0 {
            return Err(Error::new("max_index must be greater than zero"));
        }
        if path.as_os_str().is_empty() {
            return Err(Error::new("log file path must not be empty"));
        }
        if let Some(hour) = rotation_hour.filter(|hour| *hour > 23) {
            return Err(Error::new("rotation hour must be within 0..=23").with_context("hour", hour));
        }
        if check_interval.is_zero() {
            return Err(Error::new("check interval must be greater than zero"));
        }

        let (names, active) = ActiveFile::open_initial(&path, &clock.now())?;

        #[cfg(feature = "colored")]
        let prefixes = match colors {
            Some(colors) => LevelPrefixes::colored(&module, &colors),
            None => LevelPrefixes::plain(&module),
        };
        #[cfg(not(feature = "colored"))]
        let prefixes = LevelPrefixes::plain(&module);

        let writer = Arc::new(LineWriter::with_clock(active, prefixes, clock.clone()));

        let (signal_guard, signals) = if handle_signals {
            let (sender, receiver) = bounded(1);
            (Some(forward_termination_signals(sender)?), receiver)
        } else {
            (None, never())
        };

        let (commands, command_receiver) = unbounded();
        let controller = Controller {
            rotator: Rotator {
                writer: writer.clone(),
                names,
                file_size,
                max_index,
                clock,
                trap,
            },
            check_interval,
            period_timer: match rotation_hour {
                Some(hour) => PeriodTimer::Daily(hour),
                None => PeriodTimer::Disabled,
            },
            commands: command_receiver,
            signals,
            signal_guard: signal_guard.clone(),
        };
        let handle = match controller.make_thread("fastlog-rotation".to_string()) {
            Ok(handle) => handle,
            Err(err) => {
                if let Some(guard) = signal_guard {
                    guard.close();
                }
                return Err(Error::new("failed to spawn rotation thread").with_source(err));
            }
        };

        Ok(RotatingLogger {
            writer,
            commands,
            controller: Mutex::new(Some(handle)),
            signal_guard,
        })
    }
}

/// A logger writing to a set of rotated files.
///
/// Lines are written synchronously by the calling thread. A background thread checks the size of
/// the active file, rotates at the configured hour, and closes the file on a termination signal
/// or on [`RotatingLogger::shutdown`]. Once closed, every write returns an error.
#[derive(Debug)]
pub struct RotatingLogger {
    writer: Arc<LineWriter<ActiveFile>>,
    commands: Sender<Command>,
    controller: Mutex<Option<JoinHandle<()>>>,
    signal_guard: Option<SignalGuard>,
}

impl RotatingLogger {
    /// Create a new [`RotatingLoggerBuilder`].
    #[must_use]
    pub fn builder(path: impl Into<PathBuf>, module: impl Into<String>) -> RotatingLoggerBuilder {
        RotatingLoggerBuilder::new(path, module)
    }

    /// Create a logger with the given thresholds and an optional daily rotation hour.
    pub fn new(
        path: impl Into<PathBuf>,
        module: impl Into<String>,
        file_size: u64,
        max_index: usize,
        rotation_hour: Option<u8>,
    ) -> Result<RotatingLogger, Error> {
        let mut builder = RotatingLoggerBuilder::new(path, module)
            .file_size(file_size)
            .max_index(max_index);
        if let Some(hour) = rotation_hour {
            builder = builder.rotation_hour(hour);
        }
        builder.build()
    }

    /// The path of the file lines are currently written to.
    pub fn current_path(&self) -> PathBuf {
        self.writer.with_sink(|active| active.path().to_path_buf())
    }

    /// Whether the log file has been closed by a signal or a shutdown.
    pub fn is_closed(&self) -> bool {
        self.writer.with_sink(|active| active.is_closed())
    }

    /// Replace the file handle lines are written to, returning the previous one.
    ///
    /// The rotation position is kept: size checks still look at [`RotatingLogger::current_path`].
    /// Closing the returned handle is up to the caller.
    pub fn set_output(&self, file: File) -> Option<File> {
        self.writer.with_sink(|active| active.replace_file(file))
    }

    /// Rotate now, without waiting for a size check or the rotation hour.
    ///
    /// # Errors
    ///
    /// Return an error if the next file cannot be created or the logger has been shut down.
    pub fn rotate(&self) -> Result<(), Error> {
        let (reply, outcome) = bounded(1);
        self.commands
            .send(Command::Rotate(reply))
            .map_err(|_| Error::new("rotation thread has stopped"))?;
        outcome
            .recv()
            .map_err(|_| Error::new("rotation thread has stopped"))?
    }

    /// Close the log file and stop the rotation thread. Later writes return an error.
    ///
    /// Calling this more than once is harmless.
    pub fn shutdown(&self) {
        let _ = self.commands.send(Command::Shutdown);
        let handle = self
            .controller
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(handle) = handle {
            let _ = handle.join();
        }
        if let Some(guard) = &self.signal_guard {
            guard.close();
        }
        // also covers a rotation thread that died early
        let _ = self.writer.with_sink(|active| active.close());
    }
}

impl Logger for RotatingLogger {
    fn output(
        &self,
        caller: CallSite<'_>,
        message: &str,
        level: Level,
        field_set: FieldSet,
    ) -> Result<(), Error> {
        self.writer.output(caller, message, level, field_set)
    }

    fn flush(&self) -> Result<(), Error> {
        self.writer.flush()
    }
}

impl Drop for RotatingLogger {
    fn drop(&mut self) {
        self.shutdown();
    }
}
