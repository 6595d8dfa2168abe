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

use crate::traits::ProcessorRef;

/// A factory for the space handler of one context.
///
/// `install` is called once per context, so any state the returned processor captures
/// (a clock, a cache) is private to that context.
///
/// Plain closures work as spaces:
///
/// ```ignore
/// let space = || -> ProcessorRef { Arc::new(MyHandler::default()) };
/// ```
pub trait Space: Send + Sync {
    /// Creates a fresh processor for a new context.
    fn install(&self) -> ProcessorRef;
}

impl<F> Space for F
where
    F: Fn() -> ProcessorRef + Send + Sync,
{
    fn install(&self) -> ProcessorRef {
        self()
    }
}
