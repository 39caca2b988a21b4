/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */
use aws_s3_ssec_get::cli::{self, Args};
use aws_sdk_s3::error::DisplayErrorContext;
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // stdout carries object data, keep diagnostics on stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = cli::execute(args).await {
        tracing::error!("{}", DisplayErrorContext(&err));
        std::process::exit(1);
    }
}
