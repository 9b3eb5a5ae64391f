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

use std::time::Duration;

use jiff::Zoned;
use jiff::civil::Date;

use crate::Error;

/// The next time the wall clock reads `hour:00:00` strictly after `now`, in `now`'s time zone.
pub(crate) fn next_rotation(now: &Zoned, hour: u8) -> Result<Zoned, Error> {
    let at = |date: Date| {
        date.at(hour as i8, 0, 0, 0)
            .to_zoned(now.time_zone().clone())
            .map_err(|err| {
                Error::new("failed to compute next rotation time")
                    .with_context("hour", hour)
                    .with_source(err)
            })
    };

    let today = at(now.date())?;
    if today > *now {
        return Ok(today);
    }

    let tomorrow = now.date().tomorrow().map_err(|err| {
        Error::new("failed to compute next rotation date").with_source(err)
    })?;
    at(tomorrow)
}

/// How long to wait from `now` until `next`; zero if `next` already passed.
pub(crate) fn wait_until(now: &Zoned, next: &Zoned) -> Duration {
    Duration::try_from(next.duration_since(now)).unwrap_or(Duration::ZERO)
}
