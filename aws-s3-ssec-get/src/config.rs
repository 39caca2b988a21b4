/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use crate::types::{ConcurrencySetting, PartSize};

/// Load [`Config`] from the shared AWS configuration
pub mod loader;

/// Configuration for a [`Client`](crate::client::Client)
#[derive(Debug, Clone)]
pub struct Config {
    target_part_size: PartSize,
    concurrency: ConcurrencySetting,
    client: aws_sdk_s3::client::Client,
}

impl Config {
    /// Create a new `Config` builder
    pub fn builder() -> Builder {
        Builder::default()
    }

    /// Returns the target size of each ranged `GetObject` request.
    pub fn part_size(&self) -> &PartSize {
        &self.target_part_size
    }

    /// Returns the concurrency setting to use for a single download.
    pub fn concurrency(&self) -> &ConcurrencySetting {
        &self.concurrency
    }

    /// The Amazon S3 client instance that will be used to send requests to S3.
    pub fn client(&self) -> &aws_sdk_s3::Client {
        &self.client
    }
}

/// Fluent style builder for [Config]
#[derive(Debug, Clone, Default)]
pub struct Builder {
    target_part_size: PartSize,
    concurrency: ConcurrencySetting,
    client: Option<aws_sdk_s3::Client>,
}

impl Builder {
    /// Size of the byte range fetched by each `GetObject` request.
    ///
    /// Objects no larger than this are fetched with a single request.
    pub fn part_size(mut self, part_size: PartSize) -> Self {
        self.target_part_size = part_size;
        self
    }

    /// Set the number of ranged requests a download may have in flight at once.
    pub fn concurrency(mut self, concurrency: ConcurrencySetting) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Set an explicit S3 client to use.
    pub fn client(mut self, client: aws_sdk_s3::Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Consumes the builder and constructs a [`Config`](crate::config::Config)
    ///
    /// Returns an error if no S3 client was set, or if the part size or concurrency is zero.
    pub fn build(self) -> Result<Config, crate::error::Error> {
        if self.target_part_size == PartSize::Target(0) {
            return Err(crate::error::invalid_input("part size must be greater than zero"));
        }
        if self.concurrency == ConcurrencySetting::Explicit(0) {
            return Err(crate::error::invalid_input("concurrency must be greater than zero"));
        }
        let client = self
            .client
            .ok_or_else(|| crate::error::invalid_input("an S3 client must be set"))?;
        Ok(Config {
            target_part_size: self.target_part_size,
            concurrency: self.concurrency,
            client,
        })
    }
}
