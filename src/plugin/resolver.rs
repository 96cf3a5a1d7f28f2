//! Plugin download URL and cache file name resolution

use crate::pipeline::{PluginFamily, PluginSource, SyntaxError};
use url::Url;

/// Release download URL for `family` at `version`
#[must_use]
pub fn release_url(family: PluginFamily, version: &str) -> String {
    family.url_template().replace("{version}", version)
}

/// Resolves the URL the plugin jar is downloaded from
///
/// An explicit [`PluginSource::Url`] is used verbatim. Otherwise `family`
/// selects the release template; an unknown family fails with
/// [`SyntaxError::UnsupportedPluginType`]. Parse failures propagate as
/// [`SyntaxError::InvalidUrl`].
pub fn download_url(
    extension: &str,
    family: Option<PluginFamily>,
    version: &str,
    source: &PluginSource,
) -> Result<Url, SyntaxError> {
    let raw = match source {
        PluginSource::Url(url) => url.clone(),
        PluginSource::Release | PluginSource::LocalPath(_) => {
            let family = family.ok_or_else(|| SyntaxError::UnsupportedPluginType {
                extension: extension.to_string(),
            })?;
            release_url(family, version)
        }
    };

    Ok(Url::parse(&raw)?)
}

/// Final path segment of `url`, used as the cache file name
///
/// A URL without a usable last segment (`https://host/`) falls back to
/// `<host>.jar`.
#[must_use]
pub fn artifact_file_name(url: &Url) -> String {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|name| !name.is_empty())
        .map_or_else(
            || format!("{}.jar", url.host_str().unwrap_or("plugin")),
            ToString::to_string,
        )
}
