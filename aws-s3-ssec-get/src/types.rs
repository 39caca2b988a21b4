/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

/// The target part size for ranged `GetObject` requests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PartSize {
    /// Use the default part size of 5 MiB.
    #[default]
    Auto,

    /// Target part size explicitly given, in bytes.
    ///
    /// The last part of an object is usually shorter.
    Target(u64),
}

/// How many ranged requests a single download may have in flight.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ConcurrencySetting {
    /// Use the default of 5 concurrent requests.
    #[default]
    Auto,

    /// Explicitly configured concurrency setting.
    Explicit(usize),
}
