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

use std::io;
use std::io::Write;

use crate::CallSite;
use crate::Error;
use crate::FieldSet;
use crate::Level;
use crate::LevelPrefixes;
use crate::LineWriter;
use crate::Logger;

/// A logger that writes lines to a stream, standard error by default.
///
/// Level tags are colored unless the `colored` feature is off or [`ConsoleLogger::no_color`] is
/// used.
///
/// # Examples
///
/// ```
/// use fastlog::ConsoleLogger;
/// use fastlog::Logger;
///
/// let log = ConsoleLogger::new("worker").no_color();
/// log.notice(&[&"started"]);
/// ```
#[derive(Debug)]
pub struct ConsoleLogger {
    module: String,
    writer: LineWriter<Box<dyn Write + Send>>,
}

impl ConsoleLogger {
    /// Create a logger writing to standard error, tagging lines with `module`.
    pub fn new(module: impl Into<String>) -> Self {
        let module = module.into();
        let prefixes = default_prefixes(&module);
        Self {
            writer: LineWriter::new(Box::new(io::stderr()), prefixes),
            module,
        }
    }

    /// Write level tags without color.
    pub fn no_color(self) -> Self {
        let prefixes = LevelPrefixes::plain(&self.module);
        self.with_prefixes(prefixes)
    }

    /// Color level tags with `colors`.
    #[cfg(feature = "colored")]
    pub fn with_level_color(self, colors: crate::color::LevelColor) -> Self {
        let prefixes = LevelPrefixes::colored(&self.module, &colors);
        self.with_prefixes(prefixes)
    }

    /// Write to `output` instead of the current stream.
    pub fn with_output(self, output: impl Write + Send + 'static) -> Self {
        self.writer.set_output(Box::new(output));
        self
    }

    /// Replace the stream lines are written to, returning the previous one.
    pub fn set_output(&self, output: impl Write + Send + 'static) -> Box<dyn Write + Send> {
        self.writer.set_output(Box::new(output))
    }

    fn with_prefixes(self, prefixes: LevelPrefixes) -> Self {
        let ConsoleLogger { module, writer } = self;
        Self {
            writer: LineWriter::new(writer.into_sink(), prefixes),
            module,
        }
    }
}

#[cfg(feature = "colored")]
fn default_prefixes(module: &str) -> LevelPrefixes {
    LevelPrefixes::colored(module, &crate::color::LevelColor::default())
}

#[cfg(not(feature = "colored"))]
fn default_prefixes(module: &str) -> LevelPrefixes {
    LevelPrefixes::plain(module)
}

impl Logger for ConsoleLogger {
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
