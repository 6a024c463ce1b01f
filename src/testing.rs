// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Host-side test support: RAM-backed register images.
//!
//! Unit tests run on the host, so register blocks are backed by leaked,
//! zeroed heap allocations instead of device memory. Tests play the
//! hardware's part by writing status and FIFO registers directly before
//! invoking the interrupt handler.

use core::mem::MaybeUninit;

use std::boxed::Box;

use crate::utilities::StaticRef;

/// A zeroed, leaked register image. Register blocks contain only
/// `InMemoryRegister`-style cells over integers, for which all-zeroes is a
/// valid state.
pub(crate) fn leak_zeroed<T>() -> &'static T {
    let image = Box::leak(Box::new(MaybeUninit::<T>::zeroed()));
    unsafe { image.assume_init_ref() }
}

/// Wrap a leaked register image the way the PCI layer wraps a mapped BAR.
pub(crate) fn static_ref<T>(image: &'static T) -> StaticRef<T> {
    unsafe { StaticRef::new(image as *const T) }
}
