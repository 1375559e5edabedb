//! Tests for configuration parsing, defaults and validation

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::assembler::UnresolvedPolicy;
    use crate::errors::NomenError;
    use crate::resolver::ResolutionMode;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = ConfigLoader::from_str("").unwrap();
        assert_eq!(config.dictionary.path, PathBuf::from("goldbook_terms.json"));
        assert_eq!(config.output.path, PathBuf::from("extracted_terms.csv"));
        assert_eq!(config.markers.open, "@");
        assert_eq!(config.markers.close, "@");
        assert_eq!(config.resolution.mode, ResolutionMode::Local);
        assert_eq!(config.resolution.unresolved, UnresolvedPolicy::Placeholder);
        assert_eq!(config.fetch.timeout_secs, 30);
        assert_eq!(config.fetch.concurrency, 1);
        assert!(!config.fetch.metadata_only);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_full_document() {
        let yaml = r#"
dictionary:
  path: data/goldbook_terms_2023_.json
requests:
  terms:
    - backbone
    - "α-decay"
output:
  path: out/terms.csv
markers:
  open: "{{"
  close: "}}"
resolution:
  mode: auto
  external_url_template: "https://example.org/terms/{id}"
  external_anchor: null
  unresolved: skip
fetch:
  timeout_secs: 5
  concurrency: 4
  metadata_only: true
logging:
  level: debug
  file: nomen.log
"#;
        let config = ConfigLoader::from_str(yaml).unwrap();
        assert_eq!(config.requests.terms, vec!["backbone", "α-decay"]);
        assert_eq!(config.markers.open, "{{");
        assert_eq!(config.resolution.mode, ResolutionMode::Auto);
        assert_eq!(config.resolution.external_anchor, None);
        assert_eq!(config.resolution.unresolved, UnresolvedPolicy::Skip);
        assert_eq!(config.resolution.placeholder, "[unresolved reference: {id}]");
        assert_eq!(config.fetch.timeout_secs, 5);
        assert_eq!(config.fetch.concurrency, 4);
        assert!(config.fetch.metadata_only);
        assert_eq!(config.logging.file, Some(PathBuf::from("nomen.log")));
    }

    #[test]
    fn test_validation_failures() {
        let cases = [
            "markers:\n  open: \"\"\n",
            "fetch:\n  concurrency: 0\n",
            "fetch:\n  timeout_secs: 0\n",
            "resolution:\n  mode: external\n  external_url_template: https://example.org/\n",
        ];
        for yaml in cases {
            let err = ConfigLoader::from_str(yaml).unwrap_err();
            assert!(matches!(err, NomenError::ConfigError(_)), "accepted: {}", yaml);
        }
    }

    #[test]
    fn test_template_only_checked_when_needed() {
        let yaml = "resolution:\n  mode: local\n  external_url_template: https://example.org/\n";
        assert!(ConfigLoader::from_str(yaml).is_ok());
    }

    #[test]
    fn test_invalid_yaml() {
        let err = ConfigLoader::from_str("resolution: [unclosed").unwrap_err();
        assert!(err.to_string().contains("Failed to parse YAML config"));
    }

    #[tokio::test]
    async fn test_relative_paths_follow_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nomen.yaml");
        std::fs::write(
            &path,
            "dictionary:\n  path: terms.json\noutput:\n  path: /tmp/out.csv\n",
        )
        .unwrap();

        let config = ConfigLoader::from_file(&path).await.unwrap();
        assert_eq!(config.dictionary.path, dir.path().join("terms.json"));
        assert_eq!(config.output.path, PathBuf::from("/tmp/out.csv"));
    }

    #[tokio::test]
    async fn test_missing_file_is_a_config_error() {
        let err = load_config("does-not-exist.yaml").await.unwrap_err();
        assert!(matches!(err, NomenError::ConfigError(_)));
    }

    #[tokio::test]
    async fn test_load_from_temp_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "fetch:\n  user_agent: custom-agent/2.0").unwrap();

        let config = load_config(file.path()).await.unwrap();
        assert_eq!(config.fetch.user_agent, "custom-agent/2.0");
    }
}
