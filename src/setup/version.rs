//! Config version tracking.
//!
//! The config file carries a `config_version = "X.Y.Z"` first line. On
//! startup it is compared against the binary's version to decide whether the
//! config has to be regenerated: a missing file, a file without the version
//! line, or a version behind the binary all request setup.

use anyhow::anyhow;
use regex::Regex;
use std::cmp::Ordering;
use std::fmt;
use std::path::Path;

const CURRENT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// A `major.minor.patch` version, ordered field by field.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd)]
struct SemanticVersion {
    major: u32,
    minor: u32,
    patch: u32,
}

impl SemanticVersion {
    fn parse(version_str: &str) -> anyhow::Result<Self> {
        let mut fields = version_str.trim().split('.').map(|part| {
            part.parse::<u32>()
                .map_err(|_| anyhow!("Non-numeric version field '{part}' in '{version_str}'"))
        });

        let mut next = |name: &str| -> anyhow::Result<u32> {
            fields
                .next()
                .ok_or_else(|| anyhow!("Version '{version_str}' is missing its {name} field"))?
        };

        let parsed = SemanticVersion {
            major: next("major")?,
            minor: next("minor")?,
            patch: next("patch")?,
        };

        if fields.next().is_some() {
            return Err(anyhow!(
                "Version '{version_str}' has more than three fields"
            ));
        }

        Ok(parsed)
    }
}

impl fmt::Display for SemanticVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Extracts the version from the config file's first line.
///
/// Only the first line is considered, and only when it is an actual
/// `config_version = "..."` assignment (comments don't count). `None` means
/// the file predates version tracking.
///
/// # Errors
/// Returns an error if the file can't be read or is empty.
fn read_config_version_from_file(config_path: &Path) -> anyhow::Result<Option<String>> {
    let content = std::fs::read_to_string(config_path)?;
    let first_line = content
        .lines()
        .next()
        .ok_or_else(|| anyhow!("Config file {} is empty", config_path.display()))?;

    let regex = Regex::new(r#"^\s*config_version\s*=\s*"([^"]+)""#)?;
    Ok(regex
        .captures(first_line)
        .map(|caps| caps[1].to_string()))
}

/// Decides whether the config at `config_path` needs to be (re)written.
///
/// Returns a human-readable description of the state being migrated from,
/// or `None` when the config is current. Setup is requested when:
/// - the file doesn't exist (first run)
/// - the file has no `config_version` line (predates version tracking)
/// - the recorded version is behind the binary's
///
/// A config version *ahead* of the binary only logs a warning; a downgraded
/// binary shouldn't clobber a newer config.
pub fn check_setup_needed(config_path: &Path) -> anyhow::Result<Option<String>> {
    if !config_path.exists() {
        return Ok(Some("none (first run)".to_string()));
    }

    let Some(config_version) = read_config_version_from_file(config_path)? else {
        return Ok(Some("unversioned config".to_string()));
    };

    let config_parsed = SemanticVersion::parse(&config_version)?;
    let current_parsed = SemanticVersion::parse(CURRENT_VERSION)?;

    match config_parsed.cmp(&current_parsed) {
        Ordering::Less => Ok(Some(config_version)),
        Ordering::Equal => Ok(None),
        Ordering::Greater => {
            tracing::warn!(
                "Config version {} is ahead of app version {}",
                config_version,
                CURRENT_VERSION
            );
            Ok(None)
        }
    }
}

/// Stamps the binary's version onto the first line of the config file.
///
/// Any existing `config_version` line is dropped first; the rest of the file
/// is kept as-is.
pub fn update_config_version(config_path: &Path) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(config_path)?;

    let kept: Vec<&str> = content
        .lines()
        .filter(|line| !line.trim_start().starts_with("config_version"))
        .collect();

    let version_line = format!(r#"config_version = "{}""#, CURRENT_VERSION);
    let new_content = if kept.is_empty() {
        version_line
    } else {
        format!("{}\n{}", version_line, kept.join("\n"))
    };

    std::fs::write(config_path, new_content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_config(name: &str, content: &str) -> PathBuf {
        let path =
            std::env::temp_dir().join(format!("ovmp_version_{}_{name}", std::process::id()));
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_semantic_version_parse_and_order() {
        let v = SemanticVersion::parse("0.1.0").unwrap();
        assert_eq!((v.major, v.minor, v.patch), (0, 1, 0));

        let older = SemanticVersion::parse("0.0.9").unwrap();
        assert!(older < v);
        assert!(v < SemanticVersion::parse("1.0.0").unwrap());
    }

    #[test]
    fn test_malformed_versions_are_rejected() {
        assert!(SemanticVersion::parse("0.1").is_err());
        assert!(SemanticVersion::parse("0.1.0.0").is_err());
        assert!(SemanticVersion::parse("a.b.c").is_err());
    }

    #[test]
    fn test_missing_config_requests_setup() {
        let path = std::env::temp_dir().join(format!(
            "ovmp_version_missing_{}/ovmp.toml",
            std::process::id()
        ));
        let result = check_setup_needed(&path).unwrap();
        assert_eq!(result.as_deref(), Some("none (first run)"));
    }

    #[test]
    fn test_current_config_needs_no_setup() {
        let path = temp_config(
            "current.toml",
            &format!("config_version = \"{}\"\n[player]\n", env!("CARGO_PKG_VERSION")),
        );
        assert!(check_setup_needed(&path).unwrap().is_none());
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_stale_config_reports_its_version() {
        let path = temp_config("stale.toml", "config_version = \"0.0.1\"\n[player]\n");
        assert_eq!(check_setup_needed(&path).unwrap().as_deref(), Some("0.0.1"));
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_unversioned_config_requests_setup() {
        let path = temp_config("legacy.toml", "[player]\ndevice = \"default\"\n");
        assert_eq!(
            check_setup_needed(&path).unwrap().as_deref(),
            Some("unversioned config")
        );
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_update_replaces_version_line() {
        let path = temp_config(
            "update.toml",
            "config_version = \"0.0.1\"\n[player]\ndevice = \"default\"\n",
        );
        update_config_version(&path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with(&format!(
            "config_version = \"{}\"",
            env!("CARGO_PKG_VERSION")
        )));
        assert!(content.contains("device = \"default\""));
        std::fs::remove_file(&path).unwrap();
    }
}
