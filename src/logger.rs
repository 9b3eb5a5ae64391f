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

//! The level API.
//!
//! Every level comes in three flavors, all funneling into [`Logger::output`]:
//!
//! * `info(&[..])` concatenates its arguments;
//! * `infof(format_args!(..))` renders a template;
//! * `infoln(&[..])` joins its arguments with spaces and appends a newline.
//!
//! ```
//! use fastlog::ConsoleLogger;
//! use fastlog::Logger;
//!
//! let log = ConsoleLogger::new("billing");
//! log.info(&[&"charged ", &42, &" cents"]);
//! log.noticef(format_args!("retrying in {}s", 5));
//! log.warningln(&[&"slow response:", &"1200ms"]);
//! ```

use std::fmt;
use std::fmt::Write;
use std::process;
use std::sync::Arc;

use crate::CallSite;
use crate::Error;
use crate::FieldSet;
use crate::Level;

macro_rules! level_methods {
    ($level:expr, $name:literal, $concat:ident, $format:ident, $line:ident) => {
        #[doc = concat!("Log the concatenation of `args` at ", $name, " level.")]
        #[track_caller]
        fn $concat(&self, args: &[&dyn fmt::Display]) {
            let _ = self.log($level, &concat(args));
        }

        #[doc = concat!("Log a formatted message at ", $name, " level.")]
        #[track_caller]
        fn $format(&self, args: fmt::Arguments<'_>) {
            let _ = self.log($level, &fmt::format(args));
        }

        #[doc = concat!("Log `args` separated by spaces, with a trailing newline, at ", $name, " level.")]
        #[track_caller]
        fn $line(&self, args: &[&dyn fmt::Display]) {
            let _ = self.log($level, &concat_line(args));
        }
    };
}

/// A leveled line logger.
///
/// Implementors provide [`Logger::output`]; the level methods are built on top of it. The
/// concatenating forms write their arguments back to back: `info(&[&1, &2])` logs `12`. Level
/// methods capture the location of their caller, and discard write errors: call
/// [`Logger::log`] or [`Logger::output`] to observe them.
pub trait Logger {
    /// Write one line at `level`, with the header sections enabled by `field_set`.
    fn output(
        &self,
        caller: CallSite<'_>,
        message: &str,
        level: Level,
        field_set: FieldSet,
    ) -> Result<(), Error>;

    /// Flush the underlying sink.
    fn flush(&self) -> Result<(), Error> {
        Ok(())
    }

    /// Write `message` at `level` with the level's field set, located at the caller.
    #[track_caller]
    fn log(&self, level: Level, message: &str) -> Result<(), Error> {
        self.output(CallSite::caller(), message, level, level.field_set())
    }

    level_methods!(Level::Info, "info", info, infof, infoln);
    level_methods!(Level::Notice, "notice", notice, noticef, noticeln);
    level_methods!(Level::Warning, "warning", warning, warningf, warningln);
    level_methods!(Level::Debug, "debug", debug, debugf, debugln);

    /// Log the concatenation of `args` at fatal level, then exit the process with code 1.
    #[track_caller]
    fn fatal(&self, args: &[&dyn fmt::Display]) -> ! {
        let _ = self.log(Level::Fatal, &concat(args));
        process::exit(1)
    }

    /// Log a formatted message at fatal level, then exit the process with code 1.
    #[track_caller]
    fn fatalf(&self, args: fmt::Arguments<'_>) -> ! {
        let _ = self.log(Level::Fatal, &fmt::format(args));
        process::exit(1)
    }

    /// Log `args` separated by spaces at fatal level, then exit the process with code 1.
    #[track_caller]
    fn fatalln(&self, args: &[&dyn fmt::Display]) -> ! {
        let _ = self.log(Level::Fatal, &concat_line(args));
        process::exit(1)
    }

    /// Log the concatenation of `args` at error level and return it as an [`Error`].
    ///
    /// The error is returned whether or not the line could be written; a write failure is
    /// attached as its source.
    #[track_caller]
    #[must_use = "the returned error carries the logged failure"]
    fn error(&self, args: &[&dyn fmt::Display]) -> Error {
        let message = concat(args);
        raise(self.log(Level::Error, &message), message)
    }

    /// Log a formatted message at error level and return it as an [`Error`].
    #[track_caller]
    #[must_use = "the returned error carries the logged failure"]
    fn errorf(&self, args: fmt::Arguments<'_>) -> Error {
        let message = fmt::format(args);
        raise(self.log(Level::Error, &message), message)
    }

    /// Log `args` separated by spaces at error level and return them as an [`Error`].
    #[track_caller]
    #[must_use = "the returned error carries the logged failure"]
    fn errorln(&self, args: &[&dyn fmt::Display]) -> Error {
        let message = concat_line(args);
        raise(self.log(Level::Error, &message), message)
    }
}

impl<L: Logger + ?Sized> Logger for Arc<L> {
    fn output(
        &self,
        caller: CallSite<'_>,
        message: &str,
        level: Level,
        field_set: FieldSet,
    ) -> Result<(), Error> {
        (**self).output(caller, message, level, field_set)
    }

    fn flush(&self) -> Result<(), Error> {
        (**self).flush()
    }
}

fn concat(args: &[&dyn fmt::Display]) -> String {
    let mut message = String::new();
    for arg in args {
        let _ = write!(message, "{arg}");
    }
    message
}

fn concat_line(args: &[&dyn fmt::Display]) -> String {
    let mut message = String::new();
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            message.push(' ');
        }
        let _ = write!(message, "{arg}");
    }
    message.push('\n');
    message
}

fn raise(written: Result<(), Error>, message: String) -> Error {
    let err = Error::new(message);
    match written {
        Ok(()) => err,
        Err(source) => err.with_source(source),
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use jiff::Zoned;

    use super::*;
    use crate::LevelPrefixes;
    use crate::LineWriter;
    use crate::clock::Clock;
    use crate::clock::ManualClock;

    fn writer() -> LineWriter<Vec<u8>> {
        let now = Zoned::from_str("2024-08-10T17:12:52+08[+08]").unwrap();
        LineWriter::with_clock(
            Vec::new(),
            LevelPrefixes::plain("api"),
            Clock::ManualClock(ManualClock::new(now)),
        )
    }

    fn lines(writer: LineWriter<Vec<u8>>) -> Vec<String> {
        String::from_utf8(writer.into_sink())
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_three_flavors() {
        let log = writer();
        log.info(&[&"a", &1, &"b"]);
        log.infof(format_args!("{}-{}", "x", 2));
        log.infoln(&[&"a", &1, &"b"]);
        log.notice(&[&"n"]);
        log.warningln(&[]);

        assert_eq!(
            lines(log),
            vec![
                "[api] [info] 2024/08/10 17:12:52 a1b",
                "[api] [info] 2024/08/10 17:12:52 x-2",
                "[api] [info] 2024/08/10 17:12:52 a 1 b",
                "[api] [notice] 2024/08/10 17:12:52 n",
                "[api] [warning] 2024/08/10 17:12:52 ",
            ]
        );
    }

    #[test]
    fn test_debug_carries_caller_location() {
        let log = writer();
        let line = line!() + 1;
        log.debugf(format_args!("cache miss for {}", "user:7"));
        assert_eq!(
            lines(log),
            vec![format!(
                "[api] [debug] 2024/08/10 17:12:52 {}:{line}: cache miss for user:7",
                file!()
            )]
        );
    }

    #[test]
    fn test_error_returns_logged_message() {
        let log = writer();
        let err = log.errorf(format_args!("upstream returned {}", 503));
        assert_eq!(err.message(), "upstream returned 503");
        assert_eq!(err.sources().len(), 0);

        let err = log.errorln(&[&"timeout", &"after", &"30s"]);
        assert_eq!(err.message(), "timeout after 30s\n");

        assert_eq!(
            lines(log),
            vec![
                "[api] [error] 2024/08/10 17:12:52 upstream returned 503",
                "[api] [error] 2024/08/10 17:12:52 timeout after 30s",
            ]
        );
    }

    #[test]
    fn test_concat_line() {
        assert_eq!(concat_line(&[]), "\n");
        assert_eq!(concat_line(&[&"only"]), "only\n");
        assert_eq!(concat(&[&"x", &' ', &3.5]), "x 3.5");
        // no separator is inserted, whatever the argument types
        assert_eq!(concat(&[&1, &2]), "12");
    }
}
