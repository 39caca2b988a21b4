/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

/// Response type for a single object download.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[non_exhaustive]
pub struct DownloadOutput {
    /// Number of bytes written to the sink
    pub bytes_written: u64,

    /// Entity tag of the downloaded object
    pub e_tag: Option<String>,

    /// Key checksum echoed back by S3 for the customer provided key
    pub sse_customer_key_md5: Option<String>,
}

impl DownloadOutput {
    /// Create a new output reporting `bytes_written` bytes.
    pub fn new(bytes_written: u64) -> Self {
        Self {
            bytes_written,
            ..Default::default()
        }
    }

    /// Number of bytes written to the sink
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Entity tag of the downloaded object
    pub fn e_tag(&self) -> Option<&str> {
        self.e_tag.as_deref()
    }

    /// Key checksum echoed back by S3
    pub fn sse_customer_key_md5(&self) -> Option<&str> {
        self.sse_customer_key_md5.as_deref()
    }
}
