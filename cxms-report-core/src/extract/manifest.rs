//! `CLAUDE.md` manifest extractor.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use super::read_artifact;

static VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\**Version:\**\s*(\d+\.?\d*)").unwrap());

static DEPLOYMENT_LEVEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\**Deployment Level:\**\s*(\w+)").unwrap());

/// Labeled fields read from the manifest
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManifestFragment {
    /// CxMS version the project follows (e.g. `1.4`)
    pub cxms_version: Option<String>,
    /// Deployment level (e.g. `Standard`)
    pub deployment_level: Option<String>,
}

pub fn extract(path: Option<&Path>) -> ManifestFragment {
    read_artifact(path)
        .map(|text| from_text(&text))
        .unwrap_or_default()
}

pub fn from_text(text: &str) -> ManifestFragment {
    ManifestFragment {
        cxms_version: first_capture(&VERSION_RE, text),
        deployment_level: first_capture(&DEPLOYMENT_LEVEL_RE, text),
    }
}

fn first_capture(re: &Regex, text: &str) -> Option<String> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bold_labels() {
        let text = "# Shop\n\n**Version:** 1.4\n**Deployment Level:** Standard\n";
        let fragment = from_text(text);
        assert_eq!(fragment.cxms_version.as_deref(), Some("1.4"));
        assert_eq!(fragment.deployment_level.as_deref(), Some("Standard"));
    }

    #[test]
    fn test_plain_labels_and_first_match_wins() {
        let text = "Version: 2\nVersion: 3.1\nDeployment Level: Lite now";
        let fragment = from_text(text);
        assert_eq!(fragment.cxms_version.as_deref(), Some("2"));
        assert_eq!(fragment.deployment_level.as_deref(), Some("Lite"));
    }

    #[test]
    fn test_absent_fields() {
        assert_eq!(from_text("nothing here"), ManifestFragment::default());
        assert_eq!(extract(None), ManifestFragment::default());
    }
}
