/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::ops::RangeInclusive;

/// Format an inclusive byte range as a `Range` header value, e.g. `bytes=0-499`.
pub(crate) fn range_bytes(range: &RangeInclusive<u64>) -> String {
    format!("bytes={}-{}", range.start(), range.end())
}

/// Total object size from a `Content-Range` header value.
///
/// Accepts `bytes 0-499/700` as well as the bare `0-499/700`. Returns `None` when the size is
/// unknown (`*`) or the value is malformed.
pub(crate) fn total_size_from_content_range(value: &str) -> Option<u64> {
    let (_, total) = value.trim().rsplit_once('/')?;
    total.trim().parse().ok()
}
