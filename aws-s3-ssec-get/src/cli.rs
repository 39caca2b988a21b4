/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::path::PathBuf;

use crate::config::loader::ConfigLoader;
use crate::error;
use crate::io::{OutputSink, OutputTarget};
use crate::key::KeySource;
use crate::operation::download::{DownloadInput, DownloadOutput, Downloader};
use crate::types::{ConcurrencySetting, PartSize};
use crate::Client;

/// Command line arguments
#[derive(Debug, Clone, Default, clap::Parser)]
#[command(name = "aws-s3-ssec-get")]
#[command(
    about = "Downloads an SSE-C encrypted object from S3 and writes it to stdout or a file."
)]
pub struct Args {
    /// AWS item path (object key)
    #[arg(long)]
    pub path: Option<String>,

    /// AWS bucket name
    #[arg(long)]
    pub bucket: Option<String>,

    /// Base64 encoded encryption key string
    #[arg(long)]
    pub key: Option<String>,

    /// File with binary encryption key
    #[arg(long)]
    pub key_file: Option<PathBuf>,

    /// Output file (default stdout)
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// AWS region, overrides the environment and shared config
    #[arg(long)]
    pub region: Option<String>,

    /// Named profile from the shared AWS config files
    #[arg(long)]
    pub profile: Option<String>,

    /// Size in bytes of each ranged request (default 5 MiB)
    #[arg(long)]
    pub part_size: Option<u64>,

    /// Number of ranged requests in flight at once (default 5)
    #[arg(long)]
    pub concurrency: Option<usize>,
}

/// Validated arguments
#[derive(Debug, Clone)]
pub struct Settings {
    /// Object key
    pub path: String,
    /// Bucket name
    pub bucket: String,
    /// Where the encryption key comes from
    pub key_source: KeySource,
    /// Where the object's bytes go
    pub output: OutputTarget,
    /// Region override
    pub region: Option<String>,
    /// Profile override
    pub profile: Option<String>,
    /// Target size of each ranged request
    pub part_size: PartSize,
    /// Ranged requests in flight at once
    pub concurrency: ConcurrencySetting,
}

fn required(value: Option<String>, name: &'static str) -> Result<String, error::Error> {
    match value {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(error::invalid_input(format!("{name} arg is required"))),
    }
}

impl TryFrom<Args> for Settings {
    type Error = error::Error;

    fn try_from(args: Args) -> Result<Self, Self::Error> {
        let path = required(args.path, "path")?;
        let bucket = required(args.bucket, "bucket")?;

        Ok(Settings {
            path,
            bucket,
            key_source: KeySource::new(args.key, args.key_file),
            output: OutputTarget::from(args.output),
            region: args.region.filter(|r| !r.is_empty()),
            profile: args.profile.filter(|p| !p.is_empty()),
            part_size: args.part_size.map_or(PartSize::Auto, PartSize::Target),
            concurrency: args
                .concurrency
                .map_or(ConcurrencySetting::Auto, ConcurrencySetting::Explicit),
        })
    }
}

impl Settings {
    /// AWS config loader honoring the region, profile and transfer overrides
    pub fn config_loader(&self) -> ConfigLoader {
        let mut loader = ConfigLoader::default()
            .part_size(self.part_size.clone())
            .concurrency(self.concurrency.clone());
        if let Some(region) = &self.region {
            loader = loader.region(region);
        }
        if let Some(profile) = &self.profile {
            loader = loader.profile(profile);
        }
        loader
    }
}

/// Validate `args`, set up the AWS client and download the object.
pub async fn execute(args: Args) -> Result<DownloadOutput, error::Error> {
    let settings = Settings::try_from(args)?;
    let config = settings.config_loader().load().await?;
    let client = Client::new(config);
    run(&settings, &client).await
}

/// Resolve the key, open the output sink and drive `downloader` into it.
///
/// The sink is closed after a successful download. On failure it is dropped instead, which
/// releases the file handle and removes the stdout temp file without emitting partial output.
pub async fn run<D>(settings: &Settings, downloader: &D) -> Result<DownloadOutput, error::Error>
where
    D: Downloader + ?Sized,
{
    let encryption_key = settings.key_source.resolve().await?;
    if encryption_key.is_empty() {
        return Err(error::invalid_input("one of --key or --key-file is required"));
    }

    let input = DownloadInput::builder()
        .bucket(settings.bucket.as_str())
        .key(settings.path.as_str())
        .encryption_key(encryption_key)
        .build()?;

    let sink = OutputSink::open(&settings.output).await?;

    match downloader.download(&sink, input).await {
        Ok(output) => {
            sink.close().await?;
            Ok(output)
        }
        Err(err) => {
            drop(sink);
            Err(err)
        }
    }
}
