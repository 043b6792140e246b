//! Health status types for the front door.

use serde::{Deserialize, Serialize};

/// Health status of a front-door instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Health {
    /// No request served yet; the next one is redirected
    #[default]
    Warming,
    /// Serving fork/join traffic
    Ready,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_default_is_warming() {
        assert_eq!(Health::default(), Health::Warming);
    }

    #[test]
    fn health_serializes_screaming_snake_case() {
        insta::assert_json_snapshot!([Health::Warming, Health::Ready], @r#"
        [
          "WARMING",
          "READY"
        ]
        "#);
    }

    #[test]
    fn health_deserializes_screaming_snake_case() {
        assert_eq!(
            serde_json::from_str::<Health>("\"READY\"").unwrap(),
            Health::Ready
        );
    }
}
