// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Time-related platform hooks.

/// A blocking millisecond delay, provided by the platform.
///
/// Only used during `init`/`deinit` for the post-reset settle time; the
/// transfer paths never wait.
pub trait Delay {
    fn delay_ms(&self, ms: u32);
}
