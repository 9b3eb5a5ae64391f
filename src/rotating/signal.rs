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

//! Delivery of process termination signals to the rotation controller.

use std::fmt;

use crossbeam_channel::Sender;

use crate::Error;

/// Signals that close the log file and stop the rotation controller.
#[cfg(unix)]
pub(crate) const TERMINATION_SIGNALS: [i32; 5] = [
    signal_hook::consts::SIGINT,
    signal_hook::consts::SIGHUP,
    signal_hook::consts::SIGQUIT,
    signal_hook::consts::SIGTERM,
    signal_hook::consts::SIGABRT,
];

/// Stops signal forwarding when closed.
#[derive(Clone)]
pub(crate) struct SignalGuard {
    #[cfg(unix)]
    handle: signal_hook::iterator::Handle,
}

impl fmt::Debug for SignalGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignalGuard").finish_non_exhaustive()
    }
}

impl SignalGuard {
    pub(crate) fn close(&self) {
        #[cfg(unix)]
        self.handle.close();
    }
}

/// Forward termination signals received by the process to `sender` from a dedicated thread.
///
/// The thread exits once the guard is closed or the receiving side is gone.
#[cfg(unix)]
pub(crate) fn forward_termination_signals(sender: Sender<i32>) -> Result<SignalGuard, Error> {
    use signal_hook::iterator::Signals;

    let mut signals = Signals::new(TERMINATION_SIGNALS)
        .map_err(|err| Error::new("failed to register signal handlers").with_source(err))?;
    let handle = signals.handle();

    std::thread::Builder::new()
        .name("fastlog-signals".to_string())
        .spawn(move || {
            for signal in signals.forever() {
                if sender.send(signal).is_err() {
                    break;
                }
            }
        })
        .map_err(|err| Error::new("failed to spawn signal thread").with_source(err))?;

    Ok(SignalGuard { handle })
}

/// Signals are not observed on this platform; the sender is dropped right away.
#[cfg(not(unix))]
pub(crate) fn forward_termination_signals(sender: Sender<i32>) -> Result<SignalGuard, Error> {
    drop(sender);
    Ok(SignalGuard {})
}

/// A readable name for `signal`, such as `SIGTERM`.
pub(crate) fn signal_name(signal: i32) -> String {
    #[cfg(unix)]
    if let Some(name) = signal_hook::low_level::signal_name(signal) {
        return name.to_string();
    }
    format!("signal {signal}")
}
