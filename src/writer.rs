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

//! The line writer shared by the console and rotating loggers.

use std::fmt;
use std::io::Write;
use std::mem;
use std::panic::Location;
use std::sync::Mutex;
use std::sync::MutexGuard;

use crate::Error;
use crate::Level;
use crate::LevelPrefixes;
use crate::Logger;
use crate::clock::Clock;
use crate::header::FieldSet;
use crate::header::UNKNOWN_CALLER;
use crate::header::format_header;

/// Where a log call came from.
#[derive(Debug, Clone, Copy)]
pub enum CallSite<'a> {
    /// A location captured with `#[track_caller]`.
    Caller(&'static Location<'static>),
    /// A location supplied by another logging facade.
    Explicit {
        /// Source file of the call.
        file: &'a str,
        /// Line of the call.
        line: u32,
    },
    /// No location available.
    Unknown,
}

impl CallSite<'_> {
    /// The location of the caller of the function calling this, following `#[track_caller]`
    /// frames.
    #[track_caller]
    pub fn caller() -> CallSite<'static> {
        CallSite::Caller(Location::caller())
    }

    fn resolve(&self) -> Option<(&str, u32)> {
        match self {
            CallSite::Caller(location) => Some((location.file(), location.line())),
            CallSite::Explicit { file, line } => Some((*file, *line)),
            CallSite::Unknown => None,
        }
    }
}

/// Formats lines into a reusable buffer and writes each one to a sink under a lock.
///
/// The lock also covers the sink itself, so swapping the sink never splits a line.
pub struct LineWriter<S> {
    prefixes: LevelPrefixes,
    clock: Clock,
    shared: Mutex<Shared<S>>,
}

struct Shared<S> {
    sink: S,
    buf: Vec<u8>,
}

impl<S> fmt::Debug for LineWriter<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LineWriter")
            .field("prefixes", &self.prefixes)
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}

impl<S: Write> LineWriter<S> {
    /// Create a writer over `sink` using `prefixes` for the level tags.
    pub fn new(sink: S, prefixes: LevelPrefixes) -> Self {
        Self::with_clock(sink, prefixes, Clock::DefaultClock)
    }

    pub(crate) fn with_clock(sink: S, prefixes: LevelPrefixes, clock: Clock) -> Self {
        Self {
            prefixes,
            clock,
            shared: Mutex::new(Shared {
                sink,
                buf: Vec::with_capacity(256),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Shared<S>> {
        // a poisoned buffer is cleared before its next use
        self.shared.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Write one line: header, `message` and a trailing newline unless `message` has one.
    ///
    /// The timestamp is taken before waiting for the lock, and the caller location is resolved
    /// without holding it. Errors from the sink are returned as is; nothing is retried.
    pub fn output(
        &self,
        caller: CallSite<'_>,
        message: &str,
        level: Level,
        field_set: FieldSet,
    ) -> Result<(), Error> {
        let now = self.clock.now();
        let fields = field_set.fields();
        let caller = if fields.needs_caller() {
            Some(caller.resolve().unwrap_or(UNKNOWN_CALLER))
        } else {
            None
        };

        let mut shared = self.lock();
        let Shared { sink, buf } = &mut *shared;
        buf.clear();
        format_header(buf, self.prefixes.get(level), &now, caller, fields)?;
        buf.extend_from_slice(message.as_bytes());
        if !message.ends_with('\n') {
            buf.push(b'\n');
        }
        sink.write_all(buf.as_slice())
            .map_err(|err| Error::new("failed to write log line").with_source(err))
    }

    /// Replace the sink, returning the previous one.
    ///
    /// Closing the returned sink is up to the caller.
    pub fn set_output(&self, sink: S) -> S {
        mem::replace(&mut self.lock().sink, sink)
    }

    /// Run `f` on the sink while holding the write lock.
    pub(crate) fn with_sink<R>(&self, f: impl FnOnce(&mut S) -> R) -> R {
        f(&mut self.lock().sink)
    }

    /// Flush the sink.
    pub fn flush(&self) -> Result<(), Error> {
        self.lock().sink.flush().map_err(Error::from_io_error)
    }

    /// Consume the writer, returning the sink.
    pub fn into_sink(self) -> S {
        self.shared
            .into_inner()
            .unwrap_or_else(|e| e.into_inner())
            .sink
    }
}

impl<S: Write> Logger for LineWriter<S> {
    fn output(
        &self,
        caller: CallSite<'_>,
        message: &str,
        level: Level,
        field_set: FieldSet,
    ) -> Result<(), Error> {
        LineWriter::output(self, caller, message, level, field_set)
    }

    fn flush(&self) -> Result<(), Error> {
        LineWriter::flush(self)
    }
}
