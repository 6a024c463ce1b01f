// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared helper types used across the driver.

pub mod cells;
pub mod static_ref;

pub use self::static_ref::StaticRef;
