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

//! The background task that rotates log files.

use std::fs;
use std::io;
use std::io::Write;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;
use std::time::Instant;

use crossbeam_channel::Receiver;
use crossbeam_channel::Sender;
use crossbeam_channel::after;
use crossbeam_channel::never;
use crossbeam_channel::select;
use crossbeam_channel::tick;

use crate::Error;
use crate::LineWriter;
use crate::Logger;
use crate::clock::Clock;
use crate::rotating::file::ActiveFile;
use crate::rotating::file::create_new;
use crate::rotating::file::open_append;
use crate::rotating::naming::FileNames;
use crate::rotating::naming::period_key;
use crate::rotating::schedule::next_rotation;
use crate::rotating::schedule::wait_until;
use crate::rotating::signal::SignalGuard;
use crate::rotating::signal::signal_name;
use crate::trap::Trap;

/// Requests sent to the controller by its logger.
#[derive(Debug)]
pub(crate) enum Command {
    /// Rotate now and report the outcome.
    Rotate(Sender<Result<(), Error>>),
    /// Close the file and stop.
    Shutdown,
}

#[derive(Debug)]
enum Event {
    SizeCheck,
    Period,
    Signal(i32),
    SignalsClosed,
    Command(Command),
}

/// Picks and opens the next file of a rotation, and swaps it into the writer.
#[derive(Debug)]
pub(crate) struct Rotator {
    pub(crate) writer: Arc<LineWriter<ActiveFile>>,
    pub(crate) names: FileNames,
    pub(crate) file_size: u64,
    pub(crate) max_index: usize,
    pub(crate) clock: Clock,
    pub(crate) trap: Box<dyn Trap>,
}

impl Rotator {
    /// Whether the active file has reached the size threshold.
    fn should_rotate_on_size(&self) -> Result<bool, Error> {
        let path = self.writer.with_sink(|active| active.path().to_path_buf());
        let metadata = fs::metadata(&path).map_err(|err| {
            Error::new("failed to read log file size")
                .with_context("path", path.display())
                .with_source(err)
        })?;
        Ok(metadata.len() >= self.file_size)
    }

    /// Move to the lowest free index at or above the cursor in the current period, or back to the
    /// bare period file when every index is taken.
    pub(crate) fn rotate(&self) -> Result<(), Error> {
        let period = period_key(&self.clock.now());
        let cursor = self.writer.with_sink(|active| {
            if active.period() == period {
                active.index()
            } else {
                0
            }
        });

        let next = self.open_next(period, cursor)?;
        let flushed = self.writer.with_sink(|active| match active.replace(next) {
            Some(mut superseded) => superseded.flush(),
            None => Ok(()),
        });
        if let Err(err) = flushed {
            self.trap
                .trap(&Error::new("failed to flush superseded log file").with_source(err));
        }
        Ok(())
    }

    fn open_next(&self, period: String, cursor: usize) -> Result<ActiveFile, Error> {
        for index in cursor.max(1)..self.max_index {
            let path = self.names.indexed_file(&period, index);
            // another process may take the index first
            if let Some(file) = create_new(&path)? {
                return Ok(ActiveFile::new(file, path, period, index));
            }
        }

        let path = self.names.period_file(&period);
        let file = open_append(&path, true)?;
        Ok(ActiveFile::new(file, path, period, 0))
    }

    fn close(&self) {
        if let Err(err) = self.writer.with_sink(|active| active.close()) {
            self.trap
                .trap(&Error::new("failed to flush log file on close").with_source(err));
        }
    }

    fn current_path(&self) -> PathBuf {
        self.writer.with_sink(|active| active.path().to_path_buf())
    }
}

/// When the controller rotates regardless of the file size.
#[derive(Debug)]
pub(crate) enum PeriodTimer {
    Disabled,
    /// Every day when the local clock reaches this hour.
    Daily(u8),
    /// Fires on every instant sent to it.
    #[cfg(test)]
    Manual(Receiver<Instant>),
}

impl PeriodTimer {
    /// A receiver firing at the next rotation time.
    fn arm(&self, rotator: &Rotator) -> Receiver<Instant> {
        match self {
            PeriodTimer::Disabled => never(),
            PeriodTimer::Daily(hour) => {
                let now = rotator.clock.now();
                match next_rotation(&now, *hour) {
                    Ok(next) => after(wait_until(&now, &next)),
                    Err(err) => {
                        rotator.trap.trap(&err);
                        never()
                    }
                }
            }
            #[cfg(test)]
            PeriodTimer::Manual(fired) => fired.clone(),
        }
    }
}

/// The select loop driving a [`Rotator`].
#[derive(Debug)]
pub(crate) struct Controller {
    pub(crate) rotator: Rotator,
    pub(crate) check_interval: Duration,
    pub(crate) period_timer: PeriodTimer,
    pub(crate) commands: Receiver<Command>,
    pub(crate) signals: Receiver<i32>,
    pub(crate) signal_guard: Option<SignalGuard>,
}

impl Controller {
    pub(crate) fn make_thread(self, name: String) -> io::Result<JoinHandle<()>> {
        std::thread::Builder::new()
            .name(name)
            .spawn(move || self.run())
    }

    fn run(self) {
        let Controller {
            rotator,
            check_interval,
            period_timer,
            commands,
            mut signals,
            signal_guard,
        } = self;

        let size_check = tick(check_interval);
        let mut period = period_timer.arm(&rotator);

        loop {
            let event = select! {
                recv(size_check) -> _ => Event::SizeCheck,
                recv(period) -> _ => Event::Period,
                recv(signals) -> signal => match signal {
                    Ok(signal) => Event::Signal(signal),
                    Err(_) => Event::SignalsClosed,
                },
                recv(commands) -> command => match command {
                    Ok(command) => Event::Command(command),
                    // the logger is gone
                    Err(_) => Event::Command(Command::Shutdown),
                },
            };

            match event {
                Event::SizeCheck => match rotator.should_rotate_on_size() {
                    Ok(true) => rotate_or_exit(&rotator),
                    Ok(false) => {}
                    Err(err) => rotator.trap.trap(&err),
                },
                Event::Period => {
                    period = period_timer.arm(&rotator);
                    rotate_or_exit(&rotator);
                }
                Event::Signal(signal) => {
                    let name = signal_name(signal);
                    rotator.writer.infoln(&[&"Received signal:", &name]);
                    rotator.close();
                    break;
                }
                Event::SignalsClosed => signals = never(),
                Event::Command(Command::Rotate(reply)) => {
                    let _ = reply.send(rotator.rotate());
                }
                Event::Command(Command::Shutdown) => {
                    rotator.close();
                    break;
                }
            }
        }

        if let Some(guard) = signal_guard {
            guard.close();
        }
    }
}

/// A logger that cannot rotate cannot bound its file size, so failing here ends the process.
fn rotate_or_exit(rotator: &Rotator) {
    if let Err(err) = rotator.rotate() {
        let err = err.with_context("active", rotator.current_path().display());
        rotator.trap.trap(&err);
        process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use crossbeam_channel::RecvTimeoutError;
    use crossbeam_channel::unbounded;
    use jiff::Zoned;
    use tempfile::TempDir;

    use super::*;
    use crate::CallSite;
    use crate::FieldSet;
    use crate::Level;
    use crate::LevelPrefixes;
    use crate::clock::ManualClock;
    use crate::trap::DefaultTrap;

    fn rotator(temp_dir: &TempDir, max_index: usize, now: &str) -> Rotator {
        let now = Zoned::from_str(now).unwrap();
        let clock = Clock::ManualClock(ManualClock::new(now.clone()));
        let (names, active) =
            ActiveFile::open_initial(&temp_dir.path().join("app"), &now).unwrap();
        let writer = LineWriter::with_clock(active, LevelPrefixes::plain("t"), clock.clone());
        Rotator {
            writer: Arc::new(writer),
            names,
            file_size: 64,
            max_index,
            clock,
            trap: Box::new(DefaultTrap::default()),
        }
    }

    fn write(rotator: &Rotator, message: &str) {
        rotator
            .writer
            .output(CallSite::Unknown, message, Level::Info, FieldSet::Utc)
            .unwrap();
    }

    fn read(temp_dir: &TempDir, name: &str) -> String {
        fs::read_to_string(temp_dir.path().join(name)).unwrap()
    }

    #[test]
    fn test_rotate_walks_indices_then_falls_back_to_period_file() {
        let temp_dir = TempDir::new().expect("failed to create a temporary directory");
        let rotator = rotator(&temp_dir, 3, "2024-08-10T10:00:00+00[UTC]");

        write(&rotator, "bare");
        rotator.rotate().unwrap();
        write(&rotator, "first");
        rotator.rotate().unwrap();
        write(&rotator, "second");
        rotator.rotate().unwrap();
        write(&rotator, "bare again");

        assert_eq!(read(&temp_dir, "app-2024_08_10"), "[t] [info] bare\n[t] [info] bare again\n");
        assert_eq!(read(&temp_dir, "app-2024_08_10.1"), "[t] [info] first\n");
        assert_eq!(read(&temp_dir, "app-2024_08_10.2"), "[t] [info] second\n");
        assert!(!temp_dir.path().join("app-2024_08_10.3").exists());
        assert_eq!(rotator.writer.with_sink(|active| active.index()), 0);
    }

    #[test]
    fn test_rotate_skips_existing_indices() {
        let temp_dir = TempDir::new().expect("failed to create a temporary directory");
        fs::write(temp_dir.path().join("app-2024_08_10.1"), "taken\n").unwrap();
        fs::write(temp_dir.path().join("app-2024_08_10.2"), "taken\n").unwrap();
        let rotator = rotator(&temp_dir, 10, "2024-08-10T10:00:00+00[UTC]");

        rotator.rotate().unwrap();
        write(&rotator, "third");

        assert_eq!(rotator.writer.with_sink(|active| active.index()), 3);
        assert_eq!(read(&temp_dir, "app-2024_08_10.1"), "taken\n");
        assert_eq!(read(&temp_dir, "app-2024_08_10.2"), "taken\n");
        assert_eq!(read(&temp_dir, "app-2024_08_10.3"), "[t] [info] third\n");
    }

    #[test]
    fn test_rotate_into_new_period_restarts_at_first_index() {
        let temp_dir = TempDir::new().expect("failed to create a temporary directory");
        let mut rotator = rotator(&temp_dir, 10, "2024-08-10T23:59:00+00[UTC]");

        rotator.rotate().unwrap();
        rotator.rotate().unwrap();
        assert_eq!(rotator.writer.with_sink(|active| active.index()), 2);

        rotator
            .clock
            .set_now(Zoned::from_str("2024-08-11T00:00:01+00[UTC]").unwrap());
        rotator.rotate().unwrap();
        write(&rotator, "next day");

        let (period, index) = rotator
            .writer
            .with_sink(|active| (active.period().to_string(), active.index()));
        assert_eq!(period, "2024_08_11");
        assert_eq!(index, 1);
        assert_eq!(read(&temp_dir, "app-2024_08_11.1"), "[t] [info] next day\n");
    }

    #[test]
    fn test_single_index_always_uses_period_file() {
        let temp_dir = TempDir::new().expect("failed to create a temporary directory");
        let rotator = rotator(&temp_dir, 1, "2024-08-10T10:00:00+00[UTC]");

        write(&rotator, "one");
        rotator.rotate().unwrap();
        write(&rotator, "two");

        assert_eq!(read(&temp_dir, "app-2024_08_10"), "[t] [info] one\n[t] [info] two\n");
        assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_size_threshold() {
        let temp_dir = TempDir::new().expect("failed to create a temporary directory");
        let rotator = rotator(&temp_dir, 10, "2024-08-10T10:00:00+00[UTC]");

        // each line is 32 bytes
        write(&rotator, "0123456789abcdefghij");
        assert!(!rotator.should_rotate_on_size().unwrap());
        write(&rotator, "0123456789abcdefghij");
        assert!(rotator.should_rotate_on_size().unwrap());

        rotator.rotate().unwrap();
        assert!(!rotator.should_rotate_on_size().unwrap());
        assert_eq!(fs::metadata(temp_dir.path().join("app-2024_08_10")).unwrap().len(), 64);
    }

    #[test]
    fn test_close_rejects_later_writes() {
        let temp_dir = TempDir::new().expect("failed to create a temporary directory");
        let rotator = rotator(&temp_dir, 10, "2024-08-10T10:00:00+00[UTC]");

        rotator.close();
        let result = rotator
            .writer
            .output(CallSite::Unknown, "late", Level::Info, FieldSet::Std);
        assert!(result.is_err());
        assert!(rotator.writer.with_sink(|active| active.is_closed()));
    }

    #[test]
    fn test_rotators_sharing_a_directory_never_reuse_an_index() {
        let temp_dir = TempDir::new().expect("failed to create a temporary directory");
        let first = rotator(&temp_dir, 10, "2024-08-10T10:00:00+00[UTC]");
        let second = rotator(&temp_dir, 10, "2024-08-10T10:00:00+00[UTC]");

        first.rotate().unwrap();
        second.rotate().unwrap();
        write(&first, "from first");
        write(&second, "from second");

        assert_eq!(first.writer.with_sink(|active| active.index()), 1);
        assert_eq!(second.writer.with_sink(|active| active.index()), 2);
        assert_eq!(read(&temp_dir, "app-2024_08_10.1"), "[t] [info] from first\n");
        assert_eq!(read(&temp_dir, "app-2024_08_10.2"), "[t] [info] from second\n");
    }

    fn wait_for_index(writer: &LineWriter<ActiveFile>, index: usize) -> bool {
        let deadline = Instant::now() + Duration::from_secs(10);
        while Instant::now() < deadline {
            if writer.with_sink(|active| active.index()) == index {
                return true;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        false
    }

    #[test]
    fn test_period_timer_rotates_and_rearms() {
        let temp_dir = TempDir::new().expect("failed to create a temporary directory");
        let rotator = rotator(&temp_dir, 10, "2024-08-10T10:00:00+00[UTC]");
        let writer = rotator.writer.clone();
        let (fire, fired) = unbounded();
        let (commands, command_receiver) = unbounded();

        let controller = Controller {
            rotator,
            check_interval: Duration::from_secs(3600),
            period_timer: PeriodTimer::Manual(fired),
            commands: command_receiver,
            signals: never(),
            signal_guard: None,
        };
        let handle = controller.make_thread("test-rotation".to_string()).unwrap();

        fire.send(Instant::now()).unwrap();
        assert!(wait_for_index(&writer, 1));
        assert_eq!(
            writer.with_sink(|active| active.path().to_path_buf()),
            temp_dir.path().join("app-2024_08_10.1")
        );

        fire.send(Instant::now()).unwrap();
        assert!(wait_for_index(&writer, 2));
        assert_eq!(
            writer.with_sink(|active| active.path().to_path_buf()),
            temp_dir.path().join("app-2024_08_10.2")
        );

        commands.send(Command::Shutdown).unwrap();
        handle.join().unwrap();
        assert!(writer.with_sink(|active| active.is_closed()));
    }

    #[test]
    fn test_daily_timer_fires_at_rotation_hour() {
        let temp_dir = TempDir::new().expect("failed to create a temporary directory");
        let rotator = rotator(&temp_dir, 10, "2024-08-10T09:59:59.9+00[UTC]");

        let fired = PeriodTimer::Daily(10).arm(&rotator);
        assert!(fired.recv_timeout(Duration::from_secs(5)).is_ok());

        let disabled = PeriodTimer::Disabled.arm(&rotator);
        assert_eq!(
            disabled.recv_timeout(Duration::from_millis(20)),
            Err(RecvTimeoutError::Timeout)
        );
    }
}
