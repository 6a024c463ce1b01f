// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Standard error enum for invoking operations

/// Errors returned by the driver.
///
/// Errors carry no success cases; successful operations return their
/// payload through `Result::Ok` instead.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(usize)]
pub enum ErrorCode {
    /// Generic failure condition
    FAIL = 0,
    /// Underlying system is busy; retry
    BUSY = 1,
    /// The component is powered down
    OFF = 2,
    /// An invalid parameter was passed
    INVAL = 3,
    /// Parameter passed was too large
    SIZE = 4,
}

impl From<ErrorCode> for usize {
    fn from(err: ErrorCode) -> usize {
        err as usize
    }
}
