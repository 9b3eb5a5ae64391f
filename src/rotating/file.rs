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

use std::fs;
use std::fs::File;
use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use jiff::Zoned;

use crate::Error;
use crate::rotating::naming::FileNames;
use crate::rotating::naming::base_name;
use crate::rotating::naming::period_key;
use crate::rotating::naming::rotation_index;

/// The file a rotating logger currently writes to, and where it sits in the rotation.
///
/// `file` is `None` once the logger has been shut down; writes then fail.
#[derive(Debug)]
pub(crate) struct ActiveFile {
    file: Option<File>,
    path: PathBuf,
    period: String,
    index: usize,
}

impl ActiveFile {
    pub(crate) fn new(file: File, path: PathBuf, period: String, index: usize) -> Self {
        Self {
            file: Some(file),
            path,
            period,
            index,
        }
    }

    /// Open the file a new logger starts with.
    ///
    /// An existing `path` is reopened for append and names the base of future files. Otherwise
    /// the period file for `now` next to `path` is used, created along with its directory if
    /// needed.
    pub(crate) fn open_initial(path: &Path, now: &Zoned) -> Result<(FileNames, ActiveFile), Error> {
        let path = std::path::absolute(path).map_err(|err| {
            Error::new("failed to resolve log file path")
                .with_context("path", path.display())
                .with_source(err)
        })?;
        let (dir, filename) = match (path.parent(), path.file_name().and_then(|n| n.to_str())) {
            (Some(dir), Some(filename)) => (dir.to_path_buf(), filename.to_string()),
            _ => {
                return Err(Error::new("log file path must end with a UTF-8 file name")
                    .with_context("path", path.display()));
            }
        };
        let period = period_key(now);

        if path.exists() {
            let base = base_name(&filename);
            if base.is_empty() {
                return Err(Error::new("log file name must not start with '-'")
                    .with_context("path", path.display()));
            }
            let index = rotation_index(&filename, base, &period).unwrap_or(0);
            let names = FileNames::new(dir, base);
            let file = open_append(&path, false)?;
            return Ok((names, ActiveFile::new(file, path, period, index)));
        }

        fs::create_dir_all(&dir).map_err(|err| {
            Error::new("failed to create log directory")
                .with_context("dir", dir.display())
                .with_source(err)
        })?;
        let names = FileNames::new(dir, filename);
        let path = names.period_file(&period);
        let file = open_append(&path, true)?;
        Ok((names, ActiveFile::new(file, path, period, 0)))
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn period(&self) -> &str {
        &self.period
    }

    pub(crate) fn index(&self) -> usize {
        self.index
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.file.is_none()
    }

    /// Swap in `next`, returning the handle it supersedes.
    pub(crate) fn replace(&mut self, next: ActiveFile) -> Option<File> {
        let ActiveFile {
            file,
            path,
            period,
            index,
        } = next;
        self.path = path;
        self.period = period;
        self.index = index;
        std::mem::replace(&mut self.file, file)
    }

    /// Swap the handle only, keeping the rotation position.
    pub(crate) fn replace_file(&mut self, file: File) -> Option<File> {
        self.file.replace(file)
    }

    /// Flush and close the handle. Later writes fail.
    pub(crate) fn close(&mut self) -> io::Result<()> {
        match self.file.take() {
            Some(mut file) => file.flush(),
            None => Ok(()),
        }
    }
}

impl Write for ActiveFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.file.as_mut() {
            Some(file) => file.write(buf),
            None => Err(closed()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.file.as_mut() {
            Some(file) => file.flush(),
            None => Err(closed()),
        }
    }
}

fn closed() -> io::Error {
    io::Error::new(io::ErrorKind::BrokenPipe, "log file has been closed")
}

pub(crate) fn open_append(path: &Path, create: bool) -> Result<File, Error> {
    OpenOptions::new()
        .append(true)
        .create(create)
        .open(path)
        .map_err(|err| {
            Error::new("failed to open log file")
                .with_context("path", path.display())
                .with_source(err)
        })
}

/// Create `path`, or return `None` if it already exists.
pub(crate) fn create_new(path: &Path) -> Result<Option<File>, Error> {
    match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => Ok(Some(file)),
        Err(err) if err.kind() == io::ErrorKind::AlreadyExists => Ok(None),
        Err(err) => Err(Error::new("failed to create log file")
            .with_context("path", path.display())
            .with_source(err)),
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use tempfile::TempDir;

    use super::*;

    fn now() -> Zoned {
        Zoned::from_str("2024-08-10T17:12:52+08[+08]").unwrap()
    }

    #[test]
    fn test_open_initial_creates_directory_and_period_file() {
        let temp_dir = TempDir::new().expect("failed to create a temporary directory");
        let path = temp_dir.path().join("nested/logs/server");

        let (names, active) = ActiveFile::open_initial(&path, &now()).unwrap();
        assert_eq!(names.base(), "server");
        assert_eq!(
            names.indexed_file("2024_08_10", 4),
            temp_dir.path().join("nested/logs/server-2024_08_10.4")
        );
        assert_eq!(active.path(), temp_dir.path().join("nested/logs/server-2024_08_10"));
        assert_eq!(active.period(), "2024_08_10");
        assert_eq!(active.index(), 0);
        assert!(active.path().exists());
    }

    #[test]
    fn test_open_initial_reuses_todays_file() {
        let temp_dir = TempDir::new().expect("failed to create a temporary directory");
        let existing = temp_dir.path().join("server-2024_08_10");
        fs::write(&existing, "kept\n").unwrap();

        let (_, mut active) =
            ActiveFile::open_initial(&temp_dir.path().join("server"), &now()).unwrap();
        active.write_all(b"appended\n").unwrap();
        active.close().unwrap();
        assert_eq!(fs::read_to_string(existing).unwrap(), "kept\nappended\n");
    }

    #[test]
    fn test_open_initial_existing_path_names_base() {
        let temp_dir = TempDir::new().expect("failed to create a temporary directory");
        let existing = temp_dir.path().join("server-2024_08_10.4");
        fs::write(&existing, "kept\n").unwrap();

        let (names, mut active) = ActiveFile::open_initial(&existing, &now()).unwrap();
        assert_eq!(names.base(), "server");
        assert_eq!(active.index(), 4);
        assert_eq!(active.path(), existing);

        active.write_all(b"appended\n").unwrap();
        active.close().unwrap();
        assert_eq!(fs::read_to_string(&existing).unwrap(), "kept\nappended\n");
    }

    #[test]
    fn test_open_initial_existing_path_from_another_day() {
        let temp_dir = TempDir::new().expect("failed to create a temporary directory");
        let existing = temp_dir.path().join("server-2024_08_09.4");
        fs::write(&existing, "").unwrap();

        let (names, active) = ActiveFile::open_initial(&existing, &now()).unwrap();
        assert_eq!(names.base(), "server");
        assert_eq!(active.index(), 0);
        assert_eq!(active.period(), "2024_08_10");
    }

    #[test]
    fn test_closed_file_rejects_writes() {
        let temp_dir = TempDir::new().expect("failed to create a temporary directory");
        let (_, mut active) =
            ActiveFile::open_initial(&temp_dir.path().join("server"), &now()).unwrap();
        active.close().unwrap();
        assert!(active.is_closed());
        let err = active.write(b"late\n").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
        active.close().unwrap();
    }

    #[test]
    fn test_create_new_reports_taken_name() {
        let temp_dir = TempDir::new().expect("failed to create a temporary directory");
        let path = temp_dir.path().join("server-2024_08_10.1");

        let mut file = create_new(&path).unwrap().unwrap();
        file.write_all(b"first\n").unwrap();
        assert!(create_new(&path).unwrap().is_none());
        assert_eq!(fs::read_to_string(&path).unwrap(), "first\n");

        let err = create_new(&temp_dir.path().join("missing/server")).unwrap_err();
        assert_eq!(err.message(), "failed to create log file");
    }
}
