//! Version information for forkjoin.

/// Forkjoin version from Cargo.toml
pub const FORKJOIN_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Version information reported by the front door.
#[derive(Debug, Clone, serde::Serialize)]
pub struct VersionInfo {
    /// Forkjoin library version.
    pub forkjoin: &'static str,
    /// Deployed application version id (if known).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_version: Option<String>,
}

impl Default for VersionInfo {
    fn default() -> Self {
        Self {
            forkjoin: FORKJOIN_VERSION,
            app_version: None,
        }
    }
}

impl VersionInfo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the deployed application version id.
    pub fn with_app_version(mut self, version: String) -> Self {
        self.app_version = Some(version);
        self
    }

    pub(crate) fn user_agent() -> String {
        format!("forkjoin/{}", FORKJOIN_VERSION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_info_has_forkjoin_version() {
        let info = VersionInfo::new();
        assert_eq!(info.forkjoin, FORKJOIN_VERSION);
        assert!(info.app_version.is_none());
    }

    #[test]
    fn user_agent_carries_version() {
        assert_eq!(
            VersionInfo::user_agent(),
            format!("forkjoin/{}", FORKJOIN_VERSION)
        );
    }

    #[test]
    fn version_info_serializes_minimal() {
        let info = VersionInfo {
            forkjoin: "0.1.0",
            app_version: None,
        };
        insta::assert_json_snapshot!(info, @r#"
        {
          "forkjoin": "0.1.0"
        }
        "#);
    }

    #[test]
    fn version_info_serializes_full() {
        let info = VersionInfo {
            forkjoin: "0.1.0",
            app_version: Some("3.4182".to_string()),
        };
        insta::assert_json_snapshot!(info, @r#"
        {
          "forkjoin": "0.1.0",
          "app_version": "3.4182"
        }
        "#);
    }
}
