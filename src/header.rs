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

//! Line header formatting.
//!
//! A header is the level prefix followed by the sections enabled in a [`Fields`] mask:
//!
//! ```text
//! [billing] [info] 2024/08/10 17:12:52.003412 main.rs:42: message
//! ^ prefix         ^ date     ^ time  ^ micros ^ file:line
//! ```
//!
//! Disabled sections are skipped entirely, separators included.

use std::io::Write;
use std::ops::BitOr;

use jiff::Zoned;
use jiff::tz::TimeZone;

use crate::Error;

/// The location substituted when the caller cannot be resolved.
pub const UNKNOWN_CALLER: (&str, u32) = ("???", 0);

/// A bitmask of enabled header fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Fields(u8);

impl Fields {
    /// The date in the local time zone: `2009/01/23`.
    pub const DATE: Fields = Fields(1 << 0);
    /// The time in the local time zone: `01:23:23`.
    pub const TIME: Fields = Fields(1 << 1);
    /// Microsecond resolution: `01:23:23.123123`. Implies [`Fields::TIME`].
    pub const MICROSECONDS: Fields = Fields(1 << 2);
    /// Full file name and line number: `/a/b/c/d.rs:23`.
    pub const LONG_FILE: Fields = Fields(1 << 3);
    /// Final file name element and line number: `d.rs:23`. Overrides [`Fields::LONG_FILE`].
    pub const SHORT_FILE: Fields = Fields(1 << 4);
    /// Render date and time in UTC rather than the local time zone.
    pub const UTC: Fields = Fields(1 << 5);
    /// Date and time.
    pub const STD: Fields = Fields(Self::DATE.0 | Self::TIME.0);
    /// Date, time and the full caller location.
    pub const DEBUG: Fields = Fields(Self::DATE.0 | Self::TIME.0 | Self::LONG_FILE.0);

    const TIMESTAMP: Fields = Fields(Self::DATE.0 | Self::TIME.0 | Self::MICROSECONDS.0);
    const CLOCK: Fields = Fields(Self::TIME.0 | Self::MICROSECONDS.0);
    const FILE: Fields = Fields(Self::LONG_FILE.0 | Self::SHORT_FILE.0);

    /// No fields; only the prefix is written.
    pub const fn empty() -> Fields {
        Fields(0)
    }

    /// The raw bits of this mask.
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Build a mask from raw bits, dropping unknown ones.
    pub const fn from_bits_truncate(bits: u8) -> Fields {
        Fields(bits & 0b11_1111)
    }

    /// Whether every field in `other` is enabled.
    pub const fn contains(self, other: Fields) -> bool {
        self.0 & other.0 == other.0
    }

    /// Whether any field in `other` is enabled.
    pub const fn intersects(self, other: Fields) -> bool {
        self.0 & other.0 != 0
    }

    /// Whether rendering these fields requires the caller location.
    pub const fn needs_caller(self) -> bool {
        self.intersects(Self::FILE)
    }
}

impl BitOr for Fields {
    type Output = Fields;

    fn bitor(self, rhs: Fields) -> Fields {
        Fields(self.0 | rhs.0)
    }
}

/// A named bundle of header fields, chosen per call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldSet {
    /// Only the date.
    Date,
    /// Only the time.
    Time,
    /// Time with microseconds.
    Microseconds,
    /// Only the full caller location.
    LongFile,
    /// Only the caller file name and line.
    ShortFile,
    /// The UTC flag alone, which renders no timestamp.
    Utc,
    /// Date and time; used by every level but debug.
    Std,
    /// Date, time and full caller location; used by debug.
    Debug,
    /// Any other combination.
    Custom(Fields),
}

impl FieldSet {
    /// The mask of fields enabled by this set.
    pub const fn fields(self) -> Fields {
        match self {
            FieldSet::Date => Fields::DATE,
            FieldSet::Time => Fields::TIME,
            FieldSet::Microseconds => Fields::MICROSECONDS,
            FieldSet::LongFile => Fields::LONG_FILE,
            FieldSet::ShortFile => Fields::SHORT_FILE,
            FieldSet::Utc => Fields::UTC,
            FieldSet::Std => Fields::STD,
            FieldSet::Debug => Fields::DEBUG,
            FieldSet::Custom(fields) => fields,
        }
    }
}

/// Append the header for one line to `buf`.
///
/// `caller` is only consulted when `fields` enables a file section; a missing location is rendered
/// as [`UNKNOWN_CALLER`].
pub fn format_header(
    buf: &mut Vec<u8>,
    prefix: &str,
    now: &Zoned,
    caller: Option<(&str, u32)>,
    fields: Fields,
) -> Result<(), Error> {
    buf.extend_from_slice(prefix.as_bytes());

    if fields.intersects(Fields::TIMESTAMP) {
        let utc;
        let now = if fields.contains(Fields::UTC) {
            utc = now.with_time_zone(TimeZone::UTC);
            &utc
        } else {
            now
        };

        if fields.contains(Fields::DATE) {
            write!(buf, "{:04}/{:02}/{:02} ", now.year(), now.month(), now.day())
                .map_err(Error::from_io_error)?;
        }
        if fields.intersects(Fields::CLOCK) {
            write!(
                buf,
                "{:02}:{:02}:{:02}",
                now.hour(),
                now.minute(),
                now.second()
            )
            .map_err(Error::from_io_error)?;
            if fields.contains(Fields::MICROSECONDS) {
                write!(buf, ".{:06}", now.subsec_nanosecond() / 1_000)
                    .map_err(Error::from_io_error)?;
            }
            buf.push(b' ');
        }
    }

    if fields.needs_caller() {
        let (file, line) = caller.unwrap_or(UNKNOWN_CALLER);
        let file = if fields.contains(Fields::SHORT_FILE) {
            short_file(file)
        } else {
            file
        };
        buf.extend_from_slice(file.as_bytes());
        write!(buf, ":{line}: ").map_err(Error::from_io_error)?;
    }

    Ok(())
}

/// The final element of `file`. A separator in leading position is kept.
fn short_file(file: &str) -> &str {
    match file.rfind(['/', '\\']) {
        Some(i) if i > 0 => &file[i + 1..],
        _ => file,
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    const PREFIX: &str = "[test] [info] ";
    const CALLER: (&str, u32) = ("/src/app/handler.rs", 42);

    fn now() -> Zoned {
        Zoned::from_str("2024-08-10T17:12:52.003412+08[+08]").unwrap()
    }

    fn header(fields: Fields, caller: Option<(&str, u32)>) -> String {
        let mut buf = Vec::new();
        format_header(&mut buf, PREFIX, &now(), caller, fields).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_presets() {
        assert_eq!(header(Fields::STD, None), "[test] [info] 2024/08/10 17:12:52 ");
        assert_eq!(
            header(Fields::DEBUG, Some(CALLER)),
            "[test] [info] 2024/08/10 17:12:52 /src/app/handler.rs:42: "
        );
        assert_eq!(header(Fields::empty(), Some(CALLER)), PREFIX);
        assert_eq!(header(FieldSet::Utc.fields(), None), PREFIX);
    }

    #[test]
    fn test_microseconds_imply_time() {
        assert_eq!(
            header(Fields::MICROSECONDS, None),
            "[test] [info] 17:12:52.003412 "
        );
        assert_eq!(
            header(Fields::DATE | Fields::UTC | Fields::MICROSECONDS, None),
            "[test] [info] 2024/08/10 09:12:52.003412 "
        );
    }

    #[test]
    fn test_utc_crosses_date_boundary() {
        let now = Zoned::from_str("2024-08-10T03:00:00+08[+08]").unwrap();
        let mut buf = Vec::new();
        format_header(&mut buf, "", &now, None, Fields::STD | Fields::UTC).unwrap();
        assert_eq!(buf, b"2024/08/09 19:00:00 ");
    }

    #[test]
    fn test_short_file_overrides_long_file() {
        assert_eq!(
            header(Fields::SHORT_FILE | Fields::LONG_FILE, Some(CALLER)),
            "[test] [info] handler.rs:42: "
        );
        assert_eq!(
            header(Fields::LONG_FILE, Some(CALLER)),
            "[test] [info] /src/app/handler.rs:42: "
        );
        assert_eq!(
            header(Fields::SHORT_FILE, None),
            "[test] [info] ???:0: "
        );
    }

    #[test]
    fn test_short_file() {
        assert_eq!(short_file("src/main.rs"), "main.rs");
        assert_eq!(short_file("main.rs"), "main.rs");
        assert_eq!(short_file("/main.rs"), "/main.rs");
        assert_eq!(short_file("src\\bin\\tool.rs"), "tool.rs");
    }

    #[test]
    fn test_every_mask_renders_only_enabled_sections() {
        for bits in 0..(1u8 << 6) {
            let fields = Fields::from_bits_truncate(bits);
            let utc = fields.contains(Fields::UTC);

            let mut expected = PREFIX.to_string();
            if fields.contains(Fields::DATE) {
                expected.push_str("2024/08/10 ");
            }
            if fields.intersects(Fields::TIME | Fields::MICROSECONDS) {
                expected.push_str(if utc { "09:12:52" } else { "17:12:52" });
                if fields.contains(Fields::MICROSECONDS) {
                    expected.push_str(".003412");
                }
                expected.push(' ');
            }
            if fields.contains(Fields::SHORT_FILE) {
                expected.push_str("handler.rs:42: ");
            } else if fields.contains(Fields::LONG_FILE) {
                expected.push_str("/src/app/handler.rs:42: ");
            }

            let actual = header(fields, Some(CALLER));
            assert_eq!(actual, expected, "fields: {fields:?}");
            assert!(!actual.contains("  "), "doubled separator for {fields:?}");
        }
    }
}
