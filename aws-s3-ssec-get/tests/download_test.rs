/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::iter;

use aws_s3_ssec_get::error::ErrorKind;
use aws_s3_ssec_get::io::{FileSink, StdoutSink};
use aws_s3_ssec_get::key::EncryptionKey;
use aws_s3_ssec_get::operation::download::{DownloadInput, Downloader};
use aws_s3_ssec_get::types::{ConcurrencySetting, PartSize};
use aws_sdk_s3::operation::get_object::GetObjectOutput;
use aws_sdk_s3::primitives::ByteStream;
use aws_smithy_mocks_experimental::{mock, mock_client, Rule, RuleMode};
use aws_smithy_runtime_api::client::http::{
    http_client_fn, HttpConnector, HttpConnectorFuture, SharedHttpConnector,
};
use aws_smithy_runtime_api::client::orchestrator::{HttpRequest, HttpResponse};
use aws_smithy_runtime_api::http::StatusCode;
use aws_smithy_types::body::SdkBody;
use bytes::Bytes;

const PART_SIZE: usize = 64 * 1024;

fn rand_data(size: usize) -> Bytes {
    iter::repeat_with(fastrand::alphanumeric)
        .take(size)
        .map(|x| x as u8)
        .collect::<Vec<_>>()
        .into()
}

fn test_key() -> EncryptionKey {
    EncryptionKey::new((0u8..32).collect())
}

fn test_input(key: EncryptionKey) -> DownloadInput {
    DownloadInput::builder()
        .bucket("test-bucket")
        .key("test-key")
        .encryption_key(key)
        .build()
        .unwrap()
}

/// Answers every request with an empty 200, the mock rules supply the real responses
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

fn test_client(rules: &[&Rule], concurrency: usize) -> aws_s3_ssec_get::Client {
    let s3_client = mock_client!(aws_sdk_s3, RuleMode::MatchAny, rules, |conf| conf
        .http_client(http_client_fn(|_, _| SharedHttpConnector::new(StubConnector))));
    let config = aws_s3_ssec_get::Config::builder()
        .client(s3_client)
        .part_size(PartSize::Target(PART_SIZE as u64))
        .concurrency(ConcurrencySetting::Explicit(concurrency))
        .build()
        .unwrap();
    aws_s3_ssec_get::Client::new(config)
}

/// S3 XML error response as returned by the service
fn s3_error_http_resp(status: u16, code: &str, message: &str) -> HttpResponse {
    let body = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<Error><Code>{code}</Code><Message>{message}</Message><RequestId>4442587FB7D0A2F9</RequestId></Error>"#
    );
    HttpResponse::new(StatusCode::try_from(status).unwrap(), SdkBody::from(body))
}

fn has_sse_c(r: &aws_sdk_s3::operation::get_object::GetObjectInput, key: &EncryptionKey) -> bool {
    r.bucket() == Some("test-bucket")
        && r.key() == Some("test-key")
        && r.sse_customer_algorithm() == Some("AES256")
        && r.sse_customer_key() == Some(key.to_base64().as_str())
        && r.sse_customer_key_md5() == Some(key.md5())
}

/// One `GetObject` rule per part of `data`, each only matching its own `Range` and the SSE-C
/// parameters for `key`
///
/// The first request always asks for a whole part, S3 answers with what exists.
fn ranged_get_object_rules(key: &EncryptionKey, data: &Bytes, echoed_md5: &str) -> Vec<Rule> {
    let total = data.len();
    (0..total)
        .step_by(PART_SIZE)
        .map(|start| {
            let end = (start + PART_SIZE).min(total) - 1;
            let range = match start {
                0 => format!("bytes=0-{}", PART_SIZE - 1),
                _ => format!("bytes={start}-{end}"),
            };
            let key = key.clone();
            let part = data.slice(start..=end);
            let echoed_md5 = echoed_md5.to_owned();
            mock!(aws_sdk_s3::Client::get_object)
                .match_requests(move |r| r.range() == Some(range.as_str()) && has_sse_c(r, &key))
                .then_output(move || {
                    GetObjectOutput::builder()
                        .body(ByteStream::from(part.clone()))
                        .content_length(part.len() as i64)
                        .content_range(format!("bytes {start}-{end}/{total}"))
                        .e_tag("my-etag")
                        .sse_customer_algorithm("AES256")
                        .sse_customer_key_md5(echoed_md5.clone())
                        .build()
                })
        })
        .collect()
}

/// Every part is fetched once with its own range and lands at its offset in the file
#[tokio::test]
async fn test_download_to_file() {
    let data = rand_data(5 * PART_SIZE + 1234);
    let key = test_key();
    let rules = ranged_get_object_rules(&key, &data, key.md5());
    let client = test_client(&rules.iter().collect::<Vec<_>>(), 4);

    let dest = tempfile::tempdir().unwrap();
    let path = dest.path().join("object.bin");
    let sink = FileSink::create(&path).await.unwrap();

    let output = client.download(&sink, test_input(key)).await.unwrap();
    sink.close().await.unwrap();

    assert_eq!(6, rules.len());
    for rule in &rules {
        assert_eq!(1, rule.num_calls());
    }
    assert_eq!(data.len() as u64, output.bytes_written());
    assert_eq!(Some("my-etag"), output.e_tag());
    assert_eq!(data.as_ref(), std::fs::read(&path).unwrap().as_slice());
}

/// Stdout sink receives exactly the object bytes and cleans up its temp file
#[tokio::test]
async fn test_download_to_stdout_sink() {
    let data = rand_data(3 * PART_SIZE);
    let key = test_key();
    let rules = ranged_get_object_rules(&key, &data, key.md5());
    let client = test_client(&rules.iter().collect::<Vec<_>>(), 2);

    let sink = StdoutSink::create().unwrap();
    let temp_path = sink.path().to_path_buf();

    client.download(&sink, test_input(key)).await.unwrap();

    let mut out: Vec<u8> = Vec::new();
    sink.close_into(&mut out).await.unwrap();
    assert_eq!(data.as_ref(), out.as_slice());
    assert!(!temp_path.exists());
}

/// An object smaller than one part takes a single request
#[tokio::test]
async fn test_small_object_single_request() {
    let data = Bytes::from_static(b"every adolescent dog goes bonkers early");
    let key = test_key();
    let rules = ranged_get_object_rules(&key, &data, key.md5());
    let client = test_client(&rules.iter().collect::<Vec<_>>(), 4);

    let sink = StdoutSink::create().unwrap();
    let output = client.download(&sink, test_input(key)).await.unwrap();
    assert_eq!(1, rules[0].num_calls());
    assert_eq!(data.len() as u64, output.bytes_written());

    let mut out: Vec<u8> = Vec::new();
    sink.close_into(&mut out).await.unwrap();
    assert_eq!(data.as_ref(), out.as_slice());
}

/// S3 answers the first ranged request for an empty object with InvalidRange
#[tokio::test]
async fn test_empty_object() {
    let key = test_key();
    let ranged = mock!(aws_sdk_s3::Client::get_object)
        .match_requests(|r| r.range().is_some())
        .then_http_response(|| {
            s3_error_http_resp(416, "InvalidRange", "The requested range is not satisfiable")
        });
    let expected_key = key.clone();
    let whole = mock!(aws_sdk_s3::Client::get_object)
        .match_requests(move |r| r.range().is_none() && has_sse_c(r, &expected_key))
        .then_output(|| {
            GetObjectOutput::builder()
                .content_length(0)
                .e_tag("my-etag")
                .build()
        });
    let client = test_client(&[&ranged, &whole], 4);

    let sink = StdoutSink::create().unwrap();
    let output = client.download(&sink, test_input(key)).await.unwrap();
    assert_eq!(0, output.bytes_written());
    assert_eq!(1, ranged.num_calls());
    assert_eq!(1, whole.num_calls());

    let mut out: Vec<u8> = Vec::new();
    sink.close_into(&mut out).await.unwrap();
    assert!(out.is_empty());
}

/// Missing objects map to `ErrorKind::NotFound`
#[tokio::test]
async fn test_no_such_key() {
    let rule = mock!(aws_sdk_s3::Client::get_object).then_http_response(|| {
        s3_error_http_resp(404, "NoSuchKey", "The specified key does not exist.")
    });
    let client = test_client(&[&rule], 4);

    let sink = StdoutSink::create().unwrap();
    let err = client
        .download(&sink, test_input(test_key()))
        .await
        .unwrap_err();

    assert_eq!(&ErrorKind::NotFound, err.kind());
    assert!(err.to_string().contains("s3://test-bucket/test-key"));
}

/// S3 rejecting the customer key is a download failure
#[tokio::test]
async fn test_key_rejected() {
    let rule = mock!(aws_sdk_s3::Client::get_object).then_http_response(|| {
        s3_error_http_resp(
            400,
            "InvalidArgument",
            "The calculated MD5 hash of the key did not match the hash that was provided.",
        )
    });
    let client = test_client(&[&rule], 4);

    let dest = tempfile::tempdir().unwrap();
    let path = dest.path().join("object.bin");
    let sink = FileSink::create(&path).await.unwrap();

    let err = client
        .download(&sink, test_input(test_key()))
        .await
        .unwrap_err();
    assert_eq!(&ErrorKind::DownloadFailed, err.kind());
}

/// A failed later part fails the whole download
#[tokio::test]
async fn test_failed_part() {
    let data = rand_data(2 * PART_SIZE);
    let key = test_key();
    let rules = ranged_get_object_rules(&key, &data, key.md5());
    let failing = mock!(aws_sdk_s3::Client::get_object)
        .match_requests(|r| r.range() == Some("bytes=65536-131071"))
        .then_http_response(|| s3_error_http_resp(403, "AccessDenied", "Access Denied"));
    let client = test_client(&[&rules[0], &failing], 2);

    let sink = StdoutSink::create().unwrap();
    let err = client
        .download(&sink, test_input(key))
        .await
        .unwrap_err();
    assert_eq!(&ErrorKind::DownloadFailed, err.kind());
    assert_eq!(1, failing.num_calls());
}

/// A different echoed key MD5 is surfaced but does not fail the download
#[tokio::test]
async fn test_echoed_key_md5_mismatch() {
    let data = rand_data(PART_SIZE + 10);
    let key = test_key();
    let rules = ranged_get_object_rules(&key, &data, "1B2M2Y8AsgTpgAmY7PhCfg==");
    let client = test_client(&rules.iter().collect::<Vec<_>>(), 2);

    let sink = StdoutSink::create().unwrap();
    let output = client.download(&sink, test_input(key)).await.unwrap();
    assert_eq!(Some("1B2M2Y8AsgTpgAmY7PhCfg=="), output.sse_customer_key_md5());
    assert_eq!(data.len() as u64, output.bytes_written());
}
