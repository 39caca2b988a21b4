/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use aws_smithy_types::error::operation::BuildError;

use crate::key::EncryptionKey;

/// The SSE-C algorithm identifier sent with every request
pub const SSE_CUSTOMER_ALGORITHM: &str = "AES256";

/// Input type for downloading a single SSE-C encrypted object
#[non_exhaustive]
#[derive(Clone, Debug)]
pub struct DownloadInput {
    /// The bucket name containing the object.
    pub bucket: String,

    /// Key of the object to get.
    pub key: String,

    /// Customer provided key used by S3 to decrypt the object.
    pub encryption_key: EncryptionKey,
}

impl DownloadInput {
    /// Creates a new builder-style object to manufacture [`DownloadInput`](crate::operation::download::DownloadInput).
    pub fn builder() -> DownloadInputBuilder {
        DownloadInputBuilder::default()
    }

    /// The bucket name containing the object.
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Key of the object to get.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Always [`SSE_CUSTOMER_ALGORITHM`].
    pub fn sse_customer_algorithm(&self) -> &str {
        SSE_CUSTOMER_ALGORITHM
    }

    /// The encryption key
    pub fn encryption_key(&self) -> &EncryptionKey {
        &self.encryption_key
    }

    /// Base64 encoded MD5 digest of the encryption key.
    pub fn sse_customer_key_md5(&self) -> &str {
        self.encryption_key.md5()
    }

    /// `s3://bucket/key` form of the object, used as error context
    pub(crate) fn s3_uri(&self) -> String {
        format!("s3://{}/{}", self.bucket, self.key)
    }
}

/// A builder for [`DownloadInput`](crate::operation::download::DownloadInput).
#[non_exhaustive]
#[derive(Clone, Debug, Default)]
pub struct DownloadInputBuilder {
    pub(crate) bucket: Option<String>,
    pub(crate) key: Option<String>,
    pub(crate) encryption_key: Option<EncryptionKey>,
}

impl DownloadInputBuilder {
    /// The bucket name containing the object.
    ///
    /// This field is required.
    pub fn bucket(mut self, input: impl Into<String>) -> Self {
        self.bucket = Some(input.into());
        self
    }

    /// Key of the object to get.
    ///
    /// This field is required.
    pub fn key(mut self, input: impl Into<String>) -> Self {
        self.key = Some(input.into());
        self
    }

    /// Customer provided key used by S3 to decrypt the object.
    ///
    /// This field is required.
    pub fn encryption_key(mut self, input: EncryptionKey) -> Self {
        self.encryption_key = Some(input);
        self
    }

    /// Consumes the builder and constructs a [`DownloadInput`](crate::operation::download::DownloadInput).
    pub fn build(self) -> Result<DownloadInput, BuildError> {
        let bucket = match self.bucket {
            Some(bucket) if !bucket.is_empty() => bucket,
            _ => return Err(BuildError::missing_field("bucket", "A bucket is required")),
        };

        let key = match self.key {
            Some(key) if !key.is_empty() => key,
            _ => return Err(BuildError::missing_field("key", "An object key is required")),
        };

        let encryption_key = self.encryption_key.ok_or_else(|| {
            BuildError::missing_field("encryption_key", "An encryption key is required")
        })?;

        Ok(DownloadInput {
            bucket,
            key,
            encryption_key,
        })
    }
}
