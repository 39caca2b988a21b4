/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::fmt;
use std::path::PathBuf;

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, STANDARD};
use base64::Engine;

use crate::error::{self, ErrorKind};

/// Size in bytes of an AES-256 key
pub const AES256_KEY_LEN: usize = 32;

/// Standard padded base64 that tolerates non-zero trailing bits in the last symbol
const KEY_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_allow_trailing_bits(true),
);

/// Where the customer provided encryption key comes from.
///
/// When both are set the inline key wins and the file is never read.
#[derive(Debug, Clone, Default)]
pub struct KeySource {
    inline: Option<String>,
    file: Option<PathBuf>,
}

impl KeySource {
    /// Create a key source from an optional base64 encoded key and an optional key file path.
    pub fn new(inline: Option<String>, file: Option<PathBuf>) -> Self {
        Self {
            inline: inline.filter(|k| !k.is_empty()),
            file: file.filter(|p| !p.as_os_str().is_empty()),
        }
    }

    /// Produce the raw key bytes.
    ///
    /// Returns an empty key (and no error) when neither source is set.
    pub async fn resolve(&self) -> Result<EncryptionKey, error::Error> {
        if let Some(inline) = &self.inline {
            // line wrapped keys are accepted
            let inline: String = inline
                .chars()
                .filter(|c| !matches!(c, '\r' | '\n'))
                .collect();
            let bytes = KEY_ENGINE.decode(inline).map_err(|err| {
                error::Error::from(err).with_context("unable to decode encryption key")
            })?;
            tracing::debug!("resolved encryption key from inline base64 value");
            return Ok(EncryptionKey::new(bytes));
        }

        if let Some(path) = &self.file {
            let bytes = tokio::fs::read(path).await.map_err(|err| {
                error::from_kind(ErrorKind::IOError)(err).with_context(format!(
                    "unable to read encryption key file {}",
                    path.display()
                ))
            })?;
            tracing::debug!(path = %path.display(), "resolved encryption key from file");
            return Ok(EncryptionKey::new(bytes));
        }

        Ok(EncryptionKey::new(Vec::new()))
    }
}

/// A customer provided (SSE-C) encryption key and its checksum.
#[derive(Clone, PartialEq, Eq)]
pub struct EncryptionKey {
    bytes: Vec<u8>,
    md5: String,
}

impl EncryptionKey {
    /// Wrap raw key bytes, computing the checksum S3 uses to verify them.
    pub fn new(bytes: Vec<u8>) -> Self {
        if !bytes.is_empty() && bytes.len() != AES256_KEY_LEN {
            tracing::warn!(
                "encryption key is {} bytes, AES-256 expects {}",
                bytes.len(),
                AES256_KEY_LEN
            );
        }
        let md5 = key_md5(&bytes);
        Self { bytes, md5 }
    }

    /// The raw key bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns true if no key material was supplied.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Base64 encoded MD5 digest of the key
    pub fn md5(&self) -> &str {
        &self.md5
    }

    /// The key as S3 expects it on the wire (standard base64).
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }
}

impl fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptionKey")
            .field("bytes", &"** redacted **")
            .field("len", &self.bytes.len())
            .field("md5", &self.md5)
            .finish()
    }
}

/// Compute the base64 encoded MD5 digest of `key`.
pub fn key_md5(key: &[u8]) -> String {
    let digest = md5::compute(key);
    STANDARD.encode(digest.0)
}
