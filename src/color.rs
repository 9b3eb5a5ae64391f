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

//! Color utilities.

pub use colored::Color;
use colored::ColoredString;
use colored::Colorize;

use crate::Level;

/// Colors for the level tags.
#[derive(Debug, Clone)]
pub struct LevelColor {
    /// Color for info level tags.
    pub info: Color,
    /// Color for notice level tags.
    pub notice: Color,
    /// Color for warning level tags.
    pub warning: Color,
    /// Color for fatal level tags.
    pub fatal: Color,
    /// Color for error level tags.
    pub error: Color,
    /// Color for debug level tags.
    pub debug: Color,
}

impl Default for LevelColor {
    fn default() -> Self {
        Self {
            info: Color::Green,
            notice: Color::Blue,
            warning: Color::Red,
            fatal: Color::Magenta,
            error: Color::Magenta,
            debug: Color::Cyan,
        }
    }
}

impl LevelColor {
    /// Colorize the level tag, trailing space included, in bold.
    pub fn colorize_level_tag(&self, level: Level) -> ColoredString {
        let color = match level {
            Level::Info => self.info,
            Level::Notice => self.notice,
            Level::Warning => self.warning,
            Level::Fatal => self.fatal,
            Level::Error => self.error,
            Level::Debug => self.debug,
        };
        let tag = format!("[{level}] ");
        tag.as_str().color(color).bold()
    }
}
