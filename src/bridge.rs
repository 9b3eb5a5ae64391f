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

//! Bridge from the `log` crate facade.
//!
//! ```no_run
//! use fastlog::RotatingLogger;
//! use fastlog::bridge;
//!
//! let log = RotatingLogger::builder("logs/server", "server").build().unwrap();
//! bridge::setup_log_crate(log);
//!
//! log::info!("forwarded to the rotating file");
//! ```

use crate::CallSite;
use crate::Level;
use crate::Logger;
use crate::filter::EnvFilter;

/// Forwards records of the `log` crate to a [`Logger`].
///
/// `log` levels map to `error`, `warning`, `info` and `debug`; trace records are written at
/// debug level. Error records are written only: nothing is raised.
#[derive(Debug)]
pub struct LogBridge<L> {
    logger: L,
    filter: EnvFilter,
}

impl<L: Logger> LogBridge<L> {
    /// Forward records accepted by `filter` to `logger`.
    pub fn new(logger: L, filter: EnvFilter) -> Self {
        Self { logger, filter }
    }
}

fn level_of(level: log::Level) -> Level {
    match level {
        log::Level::Error => Level::Error,
        log::Level::Warn => Level::Warning,
        log::Level::Info => Level::Info,
        log::Level::Debug | log::Level::Trace => Level::Debug,
    }
}

impl<L: Logger + Send + Sync> log::Log for LogBridge<L> {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        self.filter.enabled(metadata)
    }

    fn log(&self, record: &log::Record) {
        if !self.filter.matches(record) {
            return;
        }

        let level = level_of(record.level());
        let caller = match (record.file(), record.line()) {
            (Some(file), Some(line)) => CallSite::Explicit { file, line },
            _ => CallSite::Unknown,
        };
        let message = match record.args().as_str() {
            Some(message) => message.to_string(),
            None => record.args().to_string(),
        };
        let _ = self
            .logger
            .output(caller, &message, level, level.field_set());
    }

    fn flush(&self) {
        let _ = self.logger.flush();
    }
}

/// Set up the log crate global logger, forwarding to `logger` with a filter read from `RUST_LOG`
/// (everything when unset).
///
/// # Errors
///
/// Return an error if the log crate global logger has already been set.
pub fn try_setup_log_crate<L>(logger: L, filter: EnvFilter) -> Result<(), log::SetLoggerError>
where
    L: Logger + Send + Sync + 'static,
{
    let max_level = filter.max_level();
    log::set_boxed_logger(Box::new(LogBridge::new(logger, filter)))?;
    log::set_max_level(max_level);
    Ok(())
}

/// Set up the log crate global logger, forwarding to `logger`.
///
/// The filter is read from `RUST_LOG`; everything is forwarded when it is unset.
///
/// # Panics
///
/// Panic if the log crate global logger has already been set.
pub fn setup_log_crate<L>(logger: L)
where
    L: Logger + Send + Sync + 'static,
{
    try_setup_log_crate(logger, EnvFilter::from_default_env_or("trace")).expect(
        "fastlog::bridge::setup_log_crate must be called before the log crate global logger initialized",
    )
}
