// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hardware interface layer: the traits connecting this driver to its
//! platform and to the bus abstraction above it.

pub mod spi;
pub mod time;
