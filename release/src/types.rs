use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Release payload as returned by `GET /releases/latest`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GithubRelease {
    #[serde(default)]
    pub tag_name: String,
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub assets: Vec<GithubAsset>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GithubAsset {
    pub name: String,
    pub browser_download_url: String,
}

/// The parts of a release the updater acts on. Built per request and dropped afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseInfo {
    /// Version tag with any leading `v` removed, e.g. `2.3.0`.
    pub version: String,
    /// Calendar day the release was published, when the registry reports a parseable one.
    pub published_on: Option<NaiveDate>,
    pub changelog: String,
    /// Download URL of the deployment descriptor asset, if the release ships one.
    pub descriptor_url: Option<String>,
}

impl ReleaseInfo {
    pub fn from_release(release: GithubRelease, descriptor_asset: &str) -> Self {
        let descriptor_url = release
            .assets
            .iter()
            .find(|asset| asset.name == descriptor_asset)
            .map(|asset| asset.browser_download_url.clone());

        Self {
            version: strip_version_prefix(&release.tag_name).to_string(),
            published_on: release.published_at.as_deref().and_then(publish_date),
            changelog: release.body.unwrap_or_default(),
            descriptor_url,
        }
    }

    /// `<image>:<version>` reference for this release.
    pub fn image_reference(&self, image: &str) -> String {
        format!("{}:{}", image, self.version)
    }
}

pub fn strip_version_prefix(tag: &str) -> &str {
    tag.trim_start_matches('v')
}

/// Date part of an RFC 3339 timestamp, i.e. everything before the `T` separator.
pub fn publish_date(published_at: &str) -> Option<NaiveDate> {
    let day = published_at.split('T').next()?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}
