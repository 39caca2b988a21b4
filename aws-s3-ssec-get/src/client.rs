/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::sync::Arc;

use async_trait::async_trait;

use crate::error;
use crate::io::WriteAt;
use crate::operation::download::{Download, DownloadInput, DownloadOutput, Downloader};
use crate::types::{ConcurrencySetting, PartSize};
use crate::{Config, DEFAULT_CONCURRENCY, MEBIBYTE};

/// SSE-C download client for Amazon Simple Storage Service.
#[derive(Debug, Clone)]
pub struct Client {
    pub(crate) handle: Arc<Handle>,
}

/// Whatever is needed to carry out operations
#[derive(Debug)]
pub(crate) struct Handle {
    pub(crate) config: crate::Config,
}

impl Handle {
    /// Get the concrete number of ranged requests allowed in flight for one download
    pub(crate) fn num_workers(&self) -> usize {
        match self.config.concurrency() {
            ConcurrencySetting::Explicit(concurrency) => *concurrency,
            ConcurrencySetting::Auto => DEFAULT_CONCURRENCY,
        }
    }

    /// Get the concrete target part size to use for downloads
    pub(crate) fn download_part_size_bytes(&self) -> u64 {
        match self.config.part_size() {
            PartSize::Auto => 5 * MEBIBYTE,
            PartSize::Target(explicit) => *explicit,
        }
    }
}

impl Client {
    /// Creates a new client from a config.
    pub fn new(config: Config) -> Client {
        let handle = Arc::new(Handle { config });

        Client { handle }
    }

    /// Returns the client's configuration
    pub fn config(&self) -> &Config {
        &self.handle.config
    }
}

#[async_trait]
impl Downloader for Client {
    async fn download(
        &self,
        sink: &dyn WriteAt,
        input: DownloadInput,
    ) -> Result<DownloadOutput, error::Error> {
        Download::orchestrate(self.handle.clone(), sink, input).await
    }
}
