/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

/* Automatically managed default lints */
#![cfg_attr(docsrs, feature(doc_auto_cfg))]
/* End of automatically managed default lints */

//! Download a single SSE-C encrypted object from Amazon S3.
//!
//! The object is fetched with a customer provided AES-256 key and written either to a file or,
//! through a temp file, to standard output.
//!
//! # Examples
//!
//! ```no_run
//! # async fn example() -> Result<(), aws_s3_ssec_get::error::Error> {
//! use aws_s3_ssec_get::io::{OutputSink, OutputTarget};
//! use aws_s3_ssec_get::key::KeySource;
//! use aws_s3_ssec_get::operation::download::{DownloadInput, Downloader};
//!
//! let config = aws_s3_ssec_get::from_env().load().await?;
//! let client = aws_s3_ssec_get::Client::new(config);
//!
//! let key = KeySource::new(None, Some("/etc/keys/object.key".into()))
//!     .resolve()
//!     .await?;
//! let input = DownloadInput::builder()
//!     .bucket("my-bucket")
//!     .key("my-object")
//!     .encryption_key(key)
//!     .build()?;
//!
//! let sink = OutputSink::open(&OutputTarget::Stdout).await?;
//! client.download(&sink, input).await?;
//! sink.close().await?;
//! # Ok(())
//! # }
//! ```

#![warn(
    missing_debug_implementations,
    missing_docs,
    rustdoc::missing_crate_level_docs,
    unreachable_pub,
    rust_2018_idioms
)]

pub(crate) const MEBIBYTE: u64 = 1024 * 1024;

pub(crate) const DEFAULT_CONCURRENCY: usize = 5;

/// Error types emitted by `aws-s3-ssec-get`
pub mod error;

/// Common types used by `aws-s3-ssec-get`
pub mod types;

/// Customer provided encryption keys
pub mod key;

/// Types and helpers for I/O
pub mod io;

pub(crate) mod http;

/// S3 client
pub mod client;

/// Client configuration
pub mod config;

/// Download operations
pub mod operation;

/// Command line arguments and the download flow
pub mod cli;

pub use self::client::Client;
use self::config::loader::ConfigLoader;
pub use self::config::Config;

/// Create a config loader
pub fn from_env() -> ConfigLoader {
    ConfigLoader::default()
}
