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

//! Log levels and the prefixes rendered for them.

use std::fmt;

use crate::header::FieldSet;

/// The severity of a log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    /// Routine information.
    Info,
    /// Normal but significant conditions.
    Notice,
    /// Something unexpected that the program recovered from.
    Warning,
    /// An unrecoverable condition; the process exits after logging.
    Fatal,
    /// A failure reported back to the caller after logging.
    Error,
    /// Developer diagnostics, with the full caller location.
    Debug,
}

impl Level {
    /// All levels, in prefix table order.
    pub const ALL: [Level; 6] = [
        Level::Info,
        Level::Notice,
        Level::Warning,
        Level::Fatal,
        Level::Error,
        Level::Debug,
    ];

    /// The lowercase name used inside the level tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Info => "info",
            Level::Notice => "notice",
            Level::Warning => "warning",
            Level::Fatal => "fatal",
            Level::Error => "error",
            Level::Debug => "debug",
        }
    }

    /// The field set the level API uses for this level.
    pub fn field_set(&self) -> FieldSet {
        match self {
            Level::Debug => FieldSet::Debug,
            _ => FieldSet::Std,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Prefixes written at the beginning of each line, one per level.
///
/// A prefix reads `[{module}] [{level}] `, with the level tag optionally colored.
#[derive(Debug, Clone)]
pub struct LevelPrefixes {
    info: String,
    notice: String,
    warning: String,
    fatal: String,
    error: String,
    debug: String,
}

impl LevelPrefixes {
    /// Prefixes without any color escape sequences.
    pub fn plain(module: &str) -> Self {
        Self::render(module, |level| format!("[{level}] "))
    }

    /// Prefixes whose level tags are bold and colored with `colors`.
    #[cfg(feature = "colored")]
    pub fn colored(module: &str, colors: &crate::color::LevelColor) -> Self {
        Self::render(module, |level| colors.colorize_level_tag(level).to_string())
    }

    fn render(module: &str, tag: impl Fn(Level) -> String) -> Self {
        let prefix = |level| format!("[{module}] {}", tag(level));
        Self {
            info: prefix(Level::Info),
            notice: prefix(Level::Notice),
            warning: prefix(Level::Warning),
            fatal: prefix(Level::Fatal),
            error: prefix(Level::Error),
            debug: prefix(Level::Debug),
        }
    }

    /// The rendered prefix for `level`.
    pub fn get(&self, level: Level) -> &str {
        match level {
            Level::Info => &self.info,
            Level::Notice => &self.notice,
            Level::Warning => &self.warning,
            Level::Fatal => &self.fatal,
            Level::Error => &self.error,
            Level::Debug => &self.debug,
        }
    }
}
