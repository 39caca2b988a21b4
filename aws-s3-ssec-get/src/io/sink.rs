/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::fmt;
use std::io::SeekFrom;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tempfile::TempPath;
use tokio::fs;
use tokio::io::{AsyncSeekExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;

use crate::error::{self, ErrorKind};

/// Prefix used for the temp file backing [`StdoutSink`]
pub(crate) const TEMP_FILE_PREFIX: &str = "aws-s3-ssec-get";

/// A destination that accepts writes at arbitrary byte offsets.
///
/// Writes may arrive out of order and from several tasks at once. Overlapping writes are
/// applied in the order they acquire the sink, last write wins.
#[async_trait]
pub trait WriteAt: Send + Sync + fmt::Debug {
    /// Write all of `buf` starting at `offset`.
    async fn write_at(&self, buf: &[u8], offset: u64) -> std::io::Result<()>;
}

async fn write_file_at(file: &Mutex<fs::File>, buf: &[u8], offset: u64) -> std::io::Result<()> {
    let mut file = file.lock().await;
    file.seek(SeekFrom::Start(offset)).await?;
    file.write_all(buf).await
}

/// Where downloaded bytes should end up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    /// The process' standard output (buffered through a temp file)
    Stdout,
    /// A file created (or truncated) at the given path
    File(PathBuf),
}

impl From<Option<PathBuf>> for OutputTarget {
    fn from(value: Option<PathBuf>) -> Self {
        match value {
            Some(path) if !path.as_os_str().is_empty() => OutputTarget::File(path),
            _ => OutputTarget::Stdout,
        }
    }
}

/// Sink backed directly by a newly created file.
#[derive(Debug)]
pub struct FileSink {
    file: Mutex<fs::File>,
}

impl FileSink {
    /// Create the file at `path`. The parent directory must already exist.
    pub async fn create(path: impl AsRef<Path>) -> Result<Self, error::Error> {
        let path = path.as_ref();
        let file = fs::File::create(path).await.map_err(|err| {
            error::from_kind(ErrorKind::IOError)(err)
                .with_context(format!("unable to open output {}", path.display()))
        })?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }

    /// Flush all pending writes and release the file handle.
    pub async fn close(self) -> Result<(), error::Error> {
        let mut file = self.file.into_inner();
        file.flush().await?;
        file.sync_all().await?;
        Ok(())
    }
}

#[async_trait]
impl WriteAt for FileSink {
    async fn write_at(&self, buf: &[u8], offset: u64) -> std::io::Result<()> {
        write_file_at(&self.file, buf, offset).await
    }
}

/// Sink that buffers into a temp file and copies it to standard output on close.
///
/// Standard output can only be written sequentially, so the temp file absorbs out of order
/// writes. The temp file is removed on [`close`](StdoutSink::close) or, failing that, when the
/// sink is dropped.
#[derive(Debug)]
pub struct StdoutSink {
    file: Mutex<fs::File>,
    path: TempPath,
}

impl StdoutSink {
    /// Create a new sink backed by a fresh temp file.
    pub fn create() -> Result<Self, error::Error> {
        let temp = tempfile::Builder::new()
            .prefix(TEMP_FILE_PREFIX)
            .tempfile()
            .map_err(|err| {
                error::from_kind(ErrorKind::IOError)(err)
                    .with_context("unable to create temp file for stdout")
            })?;
        let (file, path) = temp.into_parts();
        tracing::trace!(path = %path.display(), "buffering output in temp file");
        Ok(Self {
            file: Mutex::new(fs::File::from_std(file)),
            path,
        })
    }

    /// Location of the backing temp file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Copy everything written so far to standard output, then release the temp file.
    pub async fn close(self) -> Result<(), error::Error> {
        let mut stdout = tokio::io::stdout();
        self.close_into(&mut stdout).await
    }

    /// Copy everything written so far to `out`, then release the temp file.
    ///
    /// The file handle is released and the temp file deleted even if copying fails.
    pub async fn close_into<W>(self, out: &mut W) -> Result<(), error::Error>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        let Self { file, path } = self;
        let mut file = file.into_inner();

        let copied = async {
            file.flush().await?;
            file.seek(SeekFrom::Start(0)).await?;
            let n = tokio::io::copy(&mut file, out).await?;
            out.flush().await?;
            Ok::<_, std::io::Error>(n)
        }
        .await;

        drop(file);
        let removed = path.close();

        let n = copied.map_err(|err| {
            error::from_kind(ErrorKind::IOError)(err).with_context("unable to write output")
        })?;
        removed.map_err(|err| {
            error::from_kind(ErrorKind::IOError)(err).with_context("unable to remove temp file")
        })?;
        tracing::trace!("copied {n} bytes to output");
        Ok(())
    }
}

#[async_trait]
impl WriteAt for StdoutSink {
    async fn write_at(&self, buf: &[u8], offset: u64) -> std::io::Result<()> {
        write_file_at(&self.file, buf, offset).await
    }
}

/// The sink selected by an [`OutputTarget`].
#[derive(Debug)]
pub enum OutputSink {
    /// See [`FileSink`]
    File(FileSink),
    /// See [`StdoutSink`]
    Stdout(StdoutSink),
}

impl OutputSink {
    /// Open the sink for the given target.
    pub async fn open(target: &OutputTarget) -> Result<Self, error::Error> {
        let sink = match target {
            OutputTarget::File(path) => OutputSink::File(FileSink::create(path).await?),
            OutputTarget::Stdout => OutputSink::Stdout(StdoutSink::create()?),
        };
        Ok(sink)
    }

    /// Terminal step: flush to the final destination and release all resources.
    pub async fn close(self) -> Result<(), error::Error> {
        match self {
            OutputSink::File(sink) => sink.close().await,
            OutputSink::Stdout(sink) => sink.close().await,
        }
    }
}

#[async_trait]
impl WriteAt for OutputSink {
    async fn write_at(&self, buf: &[u8], offset: u64) -> std::io::Result<()> {
        match self {
            OutputSink::File(sink) => sink.write_at(buf, offset).await,
            OutputSink::Stdout(sink) => sink.write_at(buf, offset).await,
        }
    }
}
