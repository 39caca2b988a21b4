/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::ops::RangeInclusive;

use aws_sdk_s3::error::ProvideErrorMetadata;
use aws_sdk_s3::operation::get_object::GetObjectOutput;
use aws_smithy_types::byte_stream::ByteStream;
use tracing::Instrument;

use super::{get_object_request, DownloadInput};
use crate::client::Handle;
use crate::error::{self, ErrorKind};
use crate::http::header;

/// Discovered object metadata along with the first chunk of data
#[derive(Debug)]
pub(super) struct ObjectDiscovery {
    /// range of data remaining to be fetched
    pub(super) remaining: Option<RangeInclusive<u64>>,

    /// total size of the object in bytes
    pub(super) object_size: u64,

    pub(super) e_tag: Option<String>,
    pub(super) sse_customer_key_md5: Option<String>,

    /// the first chunk of data, starting at offset 0
    pub(super) initial_chunk: Option<ByteStream>,
}

/// Discover the size of an object by fetching its first part.
///
/// Returns object metadata, the remaining range of data to be fetched, and the first chunk
/// of data.
pub(super) async fn discover_obj(
    handle: &Handle,
    input: &DownloadInput,
) -> Result<ObjectDiscovery, error::Error> {
    let first_part = 0..=handle.download_part_size_bytes() - 1;
    let resp = get_object_request(handle, input)
        .range(header::range_bytes(&first_part))
        .send()
        .instrument(tracing::debug_span!("send-ranged-get-for-discovery"))
        .await;

    let discovery = match resp {
        Ok(resp) => first_chunk_response_handler(resp),
        Err(err) if err.as_service_error().and_then(|e| e.code()) == Some("InvalidRange") => {
            // S3 rejects every byte range of an empty object
            let resp = get_object_request(handle, input)
                .send()
                .instrument(tracing::debug_span!("send-get-for-empty-object"))
                .await
                .map_err(|err| error::Error::from(err).with_context(input.s3_uri()))?;
            first_chunk_response_handler(resp)
        }
        Err(err) => Err(error::Error::from(err).with_context(input.s3_uri())),
    }?;

    tracing::trace!(
        "discovered object, size: {}; remaining: {:?}",
        discovery.object_size,
        discovery.remaining
    );

    Ok(discovery)
}

fn first_chunk_response_handler(resp: GetObjectOutput) -> Result<ObjectDiscovery, error::Error> {
    let chunk_len = resp
        .content_length()
        .and_then(|len| u64::try_from(len).ok())
        .ok_or_else(|| {
            error::Error::new(ErrorKind::DownloadFailed, "response is missing Content-Length")
        })?;

    // without a Content-Range the response carries the whole object
    let object_size = match resp.content_range() {
        Some(content_range) => header::total_size_from_content_range(content_range)
            .ok_or_else(|| {
                error::Error::new(
                    ErrorKind::DownloadFailed,
                    format!("unable to parse Content-Range `{content_range}`"),
                )
            })?,
        None => chunk_len,
    };

    let remaining = match object_size > chunk_len {
        true => Some(chunk_len..=object_size - 1),
        false => None,
    };

    let e_tag = resp.e_tag().map(str::to_owned);
    let sse_customer_key_md5 = resp.sse_customer_key_md5().map(str::to_owned);
    let initial_chunk = match chunk_len == 0 {
        true => None,
        false => Some(resp.body),
    };

    Ok(ObjectDiscovery {
        remaining,
        object_size,
        e_tag,
        sse_customer_key_md5,
        initial_chunk,
    })
}
