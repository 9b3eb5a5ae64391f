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

//! Naming of rotated log files.
//!
//! Files of one period share a bare name, `{base}-{period}`, and rotated siblings append an index
//! starting at 1: `{base}-{period}.{index}`. Index 0 always means the bare file.

use std::path::PathBuf;

use jiff::Zoned;

const PERIOD_FORMAT: &str = "%Y_%m_%d";

/// The period key for the day `now` falls in, e.g. `2024_08_10`.
pub(crate) fn period_key(now: &Zoned) -> String {
    now.strftime(PERIOD_FORMAT).to_string()
}

/// The base name configured by an existing log file: everything before its first `-`.
pub(crate) fn base_name(filename: &str) -> &str {
    filename
        .split_once('-')
        .map_or(filename, |(base, _)| base)
}

/// The rotation index of `filename` if it is a rotated file of `base` in `period`.
pub(crate) fn rotation_index(filename: &str, base: &str, period: &str) -> Option<usize> {
    let rest = filename.strip_prefix(base)?.strip_prefix('-')?;
    let index = rest.strip_prefix(period)?.strip_prefix('.')?;
    index.parse().ok()
}

/// Builds paths of the log files for one logger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FileNames {
    dir: PathBuf,
    base: String,
}

impl FileNames {
    pub(crate) fn new(dir: impl Into<PathBuf>, base: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            base: base.into(),
        }
    }

    #[cfg(test)]
    pub(crate) fn base(&self) -> &str {
        &self.base
    }

    /// `{dir}/{base}-{period}`
    pub(crate) fn period_file(&self, period: &str) -> PathBuf {
        self.dir.join(format!("{}-{period}", self.base))
    }

    /// `{dir}/{base}-{period}.{index}`
    pub(crate) fn indexed_file(&self, period: &str, index: usize) -> PathBuf {
        self.dir.join(format!("{}-{period}.{index}", self.base))
    }
}
