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

//! Filtering of records coming through the `log` crate bridge.

use std::borrow::Cow;

pub use env_filter::Builder as EnvFilterBuilder;

const DEFAULT_FILTER_ENV: &str = "RUST_LOG";

/// Decides which `log` records reach a fastlog logger, using `RUST_LOG`-style directives such as
/// `warn,payments=debug`.
///
/// The directive syntax is the one of `env_logger`.
#[derive(Debug)]
pub struct EnvFilter(env_filter::Filter);

impl EnvFilter {
    /// Read directives from `RUST_LOG`. Only errors pass when it is unset.
    ///
    /// ```
    /// use fastlog::filter::EnvFilter;
    /// let filter = EnvFilter::from_default_env();
    /// ```
    pub fn from_default_env() -> Self {
        EnvFilter::from_env(DEFAULT_FILTER_ENV)
    }

    /// Read directives from `RUST_LOG`, or use `default` when it is unset.
    ///
    /// ```
    /// use fastlog::filter::EnvFilter;
    /// let filter = EnvFilter::from_default_env_or("info");
    /// ```
    pub fn from_default_env_or<'a, V>(default: V) -> Self
    where
        V: Into<Cow<'a, str>>,
    {
        EnvFilter::from_env_or(DEFAULT_FILTER_ENV, default)
    }

    /// Read directives from the variable `name`.
    pub fn from_env<'a, E>(name: E) -> Self
    where
        E: Into<Cow<'a, str>>,
    {
        let name: Cow<'a, str> = name.into();
        let directives = std::env::var(&*name).ok();
        EnvFilter::parse(directives.as_deref())
    }

    /// Read directives from the variable `name`, or use `default` when it is unset.
    pub fn from_env_or<'a, 'b, E, V>(name: E, default: V) -> Self
    where
        E: Into<Cow<'a, str>>,
        V: Into<Cow<'b, str>>,
    {
        let name: Cow<'a, str> = name.into();
        let default: Cow<'b, str> = default.into();
        let directives = std::env::var(&*name).ok();
        EnvFilter::parse(Some(directives.as_deref().unwrap_or(&default)))
    }

    fn parse(directives: Option<&str>) -> Self {
        let mut builder = EnvFilterBuilder::new();
        if let Some(directives) = directives {
            builder.parse(directives);
        }
        EnvFilter::new(builder)
    }

    /// Build from directives assembled by hand.
    pub fn new(mut builder: EnvFilterBuilder) -> Self {
        EnvFilter(builder.build())
    }

    /// The most verbose level this filter can let through.
    pub fn max_level(&self) -> log::LevelFilter {
        self.0.filter()
    }

    pub(crate) fn enabled(&self, metadata: &log::Metadata) -> bool {
        self.0.enabled(metadata)
    }

    pub(crate) fn matches(&self, record: &log::Record) -> bool {
        self.0.matches(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata(target: &str, level: log::Level) -> log::Metadata<'_> {
        log::Metadata::builder().target(target).level(level).build()
    }

    #[test]
    fn test_directives() {
        let mut builder = EnvFilterBuilder::new();
        builder.parse("warn,payments=debug");
        let filter = EnvFilter::new(builder);

        assert!(filter.enabled(&metadata("payments::ledger", log::Level::Debug)));
        assert!(!filter.enabled(&metadata("payments", log::Level::Trace)));
        assert!(filter.enabled(&metadata("http", log::Level::Warn)));
        assert!(!filter.enabled(&metadata("http", log::Level::Info)));
        assert_eq!(filter.max_level(), log::LevelFilter::Debug);
    }

    #[test]
    fn test_default_when_variable_is_unset() {
        let filter = EnvFilter::from_env_or("FASTLOG_TEST_FILTER_NEVER_SET", "info");
        assert!(filter.enabled(&metadata("http", log::Level::Info)));
        assert!(!filter.enabled(&metadata("http", log::Level::Debug)));

        let filter = EnvFilter::from_env("FASTLOG_TEST_FILTER_NEVER_SET");
        assert!(filter.enabled(&metadata("http", log::Level::Error)));
        assert!(!filter.enabled(&metadata("http", log::Level::Warn)));
    }
}
