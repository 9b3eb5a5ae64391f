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

//! Fastlog writes leveled, timestamped lines to the console or to a set of rotated files.
//!
//! # Overview
//!
//! Every line is `[{module}] [{level}] ` followed by a header selected by a [`FieldSet`] (date,
//! time, microseconds, caller location) and the message. Lines are written synchronously, one
//! `write` per line, so lines from concurrent threads never interleave.
//!
//! [`RotatingLogger`] writes to `{dir}/{base}-{YYYY_MM_DD}` and moves to
//! `{dir}/{base}-{YYYY_MM_DD}.{N}` when the file grows past a size threshold or when a daily
//! rotation hour is reached. A background thread watches both and closes the file on a
//! termination signal.
//!
//! # Examples
//!
//! Log to stderr:
//!
//! ```
//! use fastlog::ConsoleLogger;
//! use fastlog::Logger;
//!
//! let log = ConsoleLogger::new("app");
//! log.infof(format_args!("started with {} workers", 4));
//! log.debugln(&[&"cache", &"warm"]);
//! ```
//!
//! Log to rotated files, also receiving records from the `log` crate:
//!
//! ```no_run
//! use fastlog::RotatingLogger;
//!
//! let log = RotatingLogger::builder("logs/app", "app")
//!     .file_size(16 * 1024 * 1024)
//!     .rotation_hour(0)
//!     .build()
//!     .unwrap();
//! fastlog::bridge::setup_log_crate(log);
//!
//! log::info!("This is an info message.");
//! ```

#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod bridge;
#[cfg(feature = "colored")]
pub mod color;
pub mod filter;
pub mod header;
pub mod rotating;
pub mod trap;

mod clock;
mod console;
mod error;
mod level;
mod logger;
mod writer;

pub use console::ConsoleLogger;
pub use error::Error;
pub use header::FieldSet;
pub use header::Fields;
pub use level::Level;
pub use level::LevelPrefixes;
pub use logger::Logger;
pub use rotating::RotatingLogger;
pub use rotating::RotatingLoggerBuilder;
pub use trap::DefaultTrap;
pub use trap::Trap;
pub use writer::CallSite;
pub use writer::LineWriter;
