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

use fastlog::ConsoleLogger;
use fastlog::Logger;
use fastlog::color::Color;
use fastlog::color::LevelColor;

fn main() {
    let log = ConsoleLogger::new("console").with_level_color(LevelColor {
        info: Color::BrightGreen,
        ..LevelColor::default()
    });
    log.info(&[&"Hello info!"]);
    log.notice(&[&"Hello notice!"]);
    log.warning(&[&"Hello warning!"]);
    log.debug(&[&"Hello debug!"]);
    let _ = log.error(&[&"Hello error!"]);

    fastlog::bridge::setup_log_crate(ConsoleLogger::new("bridge").no_color());
    log::info!("Hello from the log crate!");
    log::trace!("Hello trace!");
}
