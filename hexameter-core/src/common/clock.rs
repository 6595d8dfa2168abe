/*
 * Copyright (c) 2024. Govcraft
 *
 * Licensed under either of
 *   * Apache License, Version 2.0 (the "License");
 *     you may not use this file except in compliance with the License.
 *     You may obtain a copy of the License at http://www.apache.org/licenses/LICENSE-2.0
 *   * MIT license: http://opensource.org/licenses/MIT
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the applicable License for the specific language governing permissions and
 * limitations under that License.
 */

use std::sync::atomic::{AtomicU64, Ordering};

/// A monotonically increasing logical clock.
///
/// Space handlers use it to ignore stale or repeated time signals: [`Clock::update`]
/// only advances on a strictly larger value and reports whether it did.
#[derive(Debug, Default)]
pub struct Clock {
    time: AtomicU64,
}

impl Clock {
    /// Creates a clock at time zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances to `new_time` if it is later than the current time.
    pub fn update(&self, new_time: u64) -> bool {
        self.time.fetch_max(new_time, Ordering::AcqRel) < new_time
    }

    /// The current time.
    pub fn time(&self) -> u64 {
        self.time.load(Ordering::Acquire)
    }
}
