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

use fastlog::Logger;
use fastlog::RotatingLogger;

fn main() {
    let log = RotatingLogger::builder("logs/example", "example")
        .file_size(4 * 1024)
        .max_index(5)
        .rotation_hour(0)
        .check_interval(Duration::from_millis(200))
        .build()
        .unwrap();

    for i in 0..200 {
        log.infof(format_args!("request {i} served"));
        if i % 50 == 0 {
            log.debugln(&[&"checkpoint", &i, &"at", &log.current_path().display()]);
        }
        std::thread::sleep(Duration::from_millis(5));
    }

    let err = log.error(&[&"upstream unavailable: ", &"10.0.0.7:443"]);
    eprintln!("returned to the caller: {err}");

    log.shutdown();
}
