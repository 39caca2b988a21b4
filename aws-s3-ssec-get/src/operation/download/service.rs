/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::cmp;
use std::ops::RangeInclusive;

use super::{get_object_request, write_body, DownloadInput};
use crate::client::Handle;
use crate::error::{self, ErrorKind};
use crate::http::header;
use crate::io::WriteAt;

/// Request to download one part of an object
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct DownloadChunkRequest {
    pub(super) seq: u64,
    pub(super) range: RangeInclusive<u64>,
}

impl DownloadChunkRequest {
    fn size(&self) -> u64 {
        self.range.end() - self.range.start() + 1
    }
}

/// Split the `remaining` content range into part sized chunk requests
///
/// # Arguments
///
/// * remaining - the remaining content range that needs to be downloaded
/// * part_size - the target size of each chunk, the last one may be shorter
/// * start_seq - the starting sequence number to use for chunks
pub(super) fn distribute_work(
    remaining: RangeInclusive<u64>,
    part_size: u64,
    start_seq: u64,
) -> Vec<DownloadChunkRequest> {
    let end = *remaining.end();
    let mut pos = *remaining.start();
    let mut seq = start_seq;
    let mut requests = Vec::new();

    while pos <= end {
        let end_inclusive = cmp::min(pos + part_size - 1, end);
        requests.push(DownloadChunkRequest {
            seq,
            range: pos..=end_inclusive,
        });
        seq += 1;
        pos = end_inclusive + 1;
    }

    requests
}

/// Fetch a single chunk and write it into `sink` at its range offset.
///
/// Every chunk is pinned to `e_tag` so a concurrent overwrite of the object fails the download
/// instead of mixing two versions. Returns the number of bytes written.
pub(super) async fn download_chunk(
    handle: &Handle,
    input: &DownloadInput,
    e_tag: Option<&str>,
    sink: &dyn WriteAt,
    request: DownloadChunkRequest,
) -> Result<u64, error::Error> {
    let resp = get_object_request(handle, input)
        .range(header::range_bytes(&request.range))
        .set_if_match(e_tag.map(str::to_owned))
        .send()
        .await
        .map_err(|err| error::Error::from(err).with_context(input.s3_uri()))?;

    let written = write_body(resp.body, sink, *request.range.start(), input).await?;
    if written != request.size() {
        return Err(error::Error::new(
            ErrorKind::DownloadFailed,
            format!(
                "expected {} bytes for range {:?}, received {written}",
                request.size(),
                request.range
            ),
        ));
    }

    tracing::trace!("wrote chunk seq: {}; size: {written}", request.seq);
    Ok(written)
}
