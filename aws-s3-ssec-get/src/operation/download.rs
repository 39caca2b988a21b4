/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

mod input;

/// Request type for downloading a single object from Amazon S3
pub use self::input::{DownloadInput, DownloadInputBuilder, SSE_CUSTOMER_ALGORITHM};

mod output;

/// Response type for downloading a single object from Amazon S3
pub use self::output::DownloadOutput;

mod discovery;
mod service;

use std::sync::Arc;

use async_trait::async_trait;
use aws_sdk_s3::operation::get_object::builders::GetObjectFluentBuilder;
use aws_smithy_types::byte_stream::ByteStream;
use futures_util::{stream, StreamExt, TryStreamExt};
use tracing::Instrument;

use self::discovery::discover_obj;
use self::service::{distribute_work, download_chunk};
use crate::client::Handle;
use crate::error::{self, ErrorKind};
use crate::io::WriteAt;

/// Fetches an object and writes its bytes into a [`WriteAt`] sink.
///
/// Implementations are free to write chunks concurrently and in any order. Retries, ranged
/// requests and credentials are the implementation's concern.
#[async_trait]
pub trait Downloader: Send + Sync {
    /// Download the object described by `input` into `sink`.
    async fn download(
        &self,
        sink: &dyn WriteAt,
        input: DownloadInput,
    ) -> Result<DownloadOutput, error::Error>;
}

/// Operation struct for single object download
#[derive(Clone, Default, Debug)]
pub(crate) struct Download;

impl Download {
    /// Execute a single `Download` transfer operation
    ///
    /// The first part is fetched with a ranged `GetObject` that also discovers the object size.
    /// The rest of the object is split into part sized ranges which are fetched concurrently,
    /// up to the configured concurrency, and written into `sink` at their offsets as they
    /// complete.
    #[tracing::instrument(skip_all, level = "debug", name = "download-object", fields(bucket = input.bucket(), key = input.key()))]
    pub(crate) async fn orchestrate(
        handle: Arc<Handle>,
        sink: &dyn WriteAt,
        input: DownloadInput,
    ) -> Result<DownloadOutput, error::Error> {
        let handle = handle.as_ref();
        let input = &input;

        let discovery = discover_obj(handle, input).await?;
        let mut bytes_written = 0u64;
        if let Some(initial_chunk) = discovery.initial_chunk {
            bytes_written += write_body(initial_chunk, sink, 0, input).await?;
        }

        if let Some(remaining) = discovery.remaining {
            let requests = distribute_work(remaining, handle.download_part_size_bytes(), 1);
            tracing::debug!(
                "fetching {} remaining chunks with {} workers",
                requests.len(),
                handle.num_workers()
            );

            let e_tag = discovery.e_tag.as_deref();
            let mut chunks = stream::iter(requests)
                .map(move |request| {
                    let span = tracing::debug_span!("download-chunk", seq = request.seq);
                    download_chunk(handle, input, e_tag, sink, request).instrument(span)
                })
                .buffer_unordered(handle.num_workers());

            while let Some(written) = chunks.try_next().await? {
                bytes_written += written;
            }
        }

        if bytes_written != discovery.object_size {
            return Err(error::Error::new(
                ErrorKind::DownloadFailed,
                format!(
                    "expected {} bytes, received {bytes_written}",
                    discovery.object_size
                ),
            )
            .with_context(input.s3_uri()));
        }

        let echoed_md5 = discovery.sse_customer_key_md5.as_deref();
        if !key_md5_matches(input.sse_customer_key_md5(), echoed_md5) {
            tracing::warn!(
                expected = input.sse_customer_key_md5(),
                received = echoed_md5,
                "S3 echoed a different SSE-C key MD5"
            );
        }

        tracing::debug!("downloaded {bytes_written} bytes");

        Ok(DownloadOutput {
            bytes_written,
            e_tag: discovery.e_tag,
            sse_customer_key_md5: discovery.sse_customer_key_md5,
        })
    }
}

/// `GetObject` request for `input` carrying the SSE-C parameters
fn get_object_request(handle: &Handle, input: &DownloadInput) -> GetObjectFluentBuilder {
    handle
        .config
        .client()
        .get_object()
        .bucket(input.bucket())
        .key(input.key())
        .sse_customer_algorithm(input.sse_customer_algorithm())
        .sse_customer_key(input.encryption_key().to_base64())
        .sse_customer_key_md5(input.sse_customer_key_md5())
}

/// Stream `body` into `sink` starting at `offset`, returning the number of bytes written
async fn write_body(
    mut body: ByteStream,
    sink: &dyn WriteAt,
    offset: u64,
    input: &DownloadInput,
) -> Result<u64, error::Error> {
    let mut written = 0u64;
    while let Some(buf) = body
        .try_next()
        .await
        .map_err(|err| error::Error::from(err).with_context(input.s3_uri()))?
    {
        sink.write_at(&buf, offset + written).await?;
        written += buf.len() as u64;
    }
    Ok(written)
}

/// Compare the key MD5 S3 echoed back against the one that was sent.
fn key_md5_matches(expected: &str, echoed: Option<&str>) -> bool {
    echoed.map_or(true, |echoed| echoed == expected)
}

#[cfg(test)]
pub(crate) mod test_util {
    use std::sync::Arc;

    use aws_smithy_mocks_experimental::{mock_client, Rule, RuleMode};
    use aws_smithy_runtime_api::client::http::{
        http_client_fn, HttpConnector, HttpConnectorFuture, SharedHttpConnector,
    };
    use aws_smithy_runtime_api::client::orchestrator::{HttpRequest, HttpResponse};
    use aws_smithy_runtime_api::http::StatusCode;
    use aws_smithy_types::body::SdkBody;

    use super::DownloadInput;
    use crate::client::Handle;
    use crate::key::EncryptionKey;
    use crate::types::{ConcurrencySetting, PartSize};

    /// Answers every request with an empty 200 so mock rules never reach the network
    #[derive(Debug)]
    struct StubConnector;

    impl HttpConnector for StubConnector {
        fn call(&self, _request: HttpRequest) -> HttpConnectorFuture {
            HttpConnectorFuture::ready(Ok(HttpResponse::new(
                StatusCode::try_from(200).unwrap(),
                SdkBody::empty(),
            )))
        }
    }

    /// S3 style XML error response with the given status and error code
    pub(crate) fn error_response(status: u16, code: &str) -> HttpResponse {
        let body = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?><Error><Code>{code}</Code><Message>mocked</Message></Error>"#
        );
        HttpResponse::new(StatusCode::try_from(status).unwrap(), SdkBody::from(body))
    }

    pub(crate) fn test_input() -> DownloadInput {
        DownloadInput::builder()
            .bucket("test-bucket")
            .key("test-key")
            .encryption_key(EncryptionKey::new(vec![0u8; 32]))
            .build()
            .unwrap()
    }

    pub(crate) fn test_handle(rules: &[&Rule], part_size: u64, concurrency: usize) -> Arc<Handle> {
        let client = mock_client!(aws_sdk_s3, RuleMode::MatchAny, rules, |conf| conf
            .http_client(http_client_fn(|_, _| SharedHttpConnector::new(StubConnector))));
        let config = crate::Config::builder()
            .client(client)
            .part_size(PartSize::Target(part_size))
            .concurrency(ConcurrencySetting::Explicit(concurrency))
            .build()
            .unwrap();
        crate::Client::new(config).handle
    }
}
