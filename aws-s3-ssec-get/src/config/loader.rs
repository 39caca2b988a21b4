/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use aws_config::{BehaviorVersion, Region};
use aws_types::SdkConfig;

use crate::error::{self, ErrorKind};
use crate::types::{ConcurrencySetting, PartSize};
use crate::Config;

/// Load [`Config`] from the environment and shared config files (`~/.aws/config`,
/// `~/.aws/credentials`).
#[derive(Default, Debug, Clone)]
pub struct ConfigLoader {
    region: Option<String>,
    profile: Option<String>,
    part_size: PartSize,
    concurrency: ConcurrencySetting,
}

impl ConfigLoader {
    /// Override the region resolved from the environment.
    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Use the named profile from the shared config files.
    pub fn profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }

    /// Target size of each ranged `GetObject` request.
    pub fn part_size(mut self, part_size: PartSize) -> Self {
        self.part_size = part_size;
        self
    }

    /// Number of ranged requests a download may have in flight.
    pub fn concurrency(mut self, concurrency: ConcurrencySetting) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Resolve the shared [`SdkConfig`].
    ///
    /// Credentials are resolved lazily by the SDK; only a missing region is detected here.
    pub async fn load_sdk_config(&self) -> Result<SdkConfig, error::Error> {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = &self.region {
            loader = loader.region(Region::new(region.clone()));
        }
        if let Some(profile) = &self.profile {
            loader = loader.profile_name(profile);
        }

        let sdk_config = loader.load().await;
        check_session(&sdk_config)?;
        tracing::debug!(region = ?sdk_config.region(), "loaded AWS config");
        Ok(sdk_config)
    }

    /// Load the default configuration
    ///
    /// If fields have been overridden during builder construction, the override values will be
    /// used. Otherwise, the default values for each field will be provided.
    pub async fn load(self) -> Result<Config, error::Error> {
        let sdk_config = self.load_sdk_config().await?;
        let s3_client = aws_sdk_s3::Client::new(&sdk_config);
        Config::builder()
            .client(s3_client)
            .part_size(self.part_size)
            .concurrency(self.concurrency)
            .build()
    }
}

fn check_session(sdk_config: &SdkConfig) -> Result<(), error::Error> {
    if sdk_config.region().is_none() {
        return Err(error::from_kind(ErrorKind::SessionError)(
            "no AWS region configured, set AWS_REGION, a profile region or --region",
        ));
    }
    if sdk_config.credentials_provider().is_none() {
        return Err(error::from_kind(ErrorKind::SessionError)(
            "no AWS credentials provider configured",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{check_session, ConfigLoader};
    use crate::error::ErrorKind;
    use crate::types::{ConcurrencySetting, PartSize};
    use aws_config::Region;
    use aws_types::SdkConfig;

    #[tokio::test]
    async fn test_overrides_are_applied() {
        let config = ConfigLoader::default()
            .region("eu-central-1")
            .part_size(PartSize::Target(1024))
            .concurrency(ConcurrencySetting::Explicit(2))
            .load()
            .await
            .unwrap();

        let region = config.client().config().region().map(ToString::to_string);
        assert_eq!(Some("eu-central-1".to_owned()), region);
        assert_eq!(&PartSize::Target(1024), config.part_size());
        assert_eq!(&ConcurrencySetting::Explicit(2), config.concurrency());
    }

    #[tokio::test]
    async fn test_zero_part_size_is_rejected() {
        let err = ConfigLoader::default()
            .region("eu-central-1")
            .part_size(PartSize::Target(0))
            .load()
            .await
            .unwrap_err();
        assert_eq!(&ErrorKind::InputInvalid, err.kind());
    }

    #[test]
    fn test_missing_region_is_session_error() {
        let sdk_config = SdkConfig::builder().build();
        let err = check_session(&sdk_config).unwrap_err();
        assert_eq!(&ErrorKind::SessionError, err.kind());
    }

    #[test]
    fn test_missing_credentials_is_session_error() {
        let sdk_config = SdkConfig::builder()
            .region(Region::from_static("us-west-2"))
            .build();
        let err = check_session(&sdk_config).unwrap_err();
        assert_eq!(&ErrorKind::SessionError, err.kind());
    }
}
