// Intent scripts - a recorded sequence of intents replayed against a fresh store

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::pipeline::{
    InstallationAction, Intent, ReconciliationStep, SalesAction, ServiceStep, DEFAULT_TAG,
};

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Failed to read script {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid TOML script: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid JSON script: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported script format for {0} (expected .toml or .json)")]
    UnsupportedFormat(PathBuf),
}

/// Ordered list of intents, e.g.
///
/// ```toml
/// [[intents]]
/// kind = "create-lead"
///
/// [[intents]]
/// kind = "tag-lead"
/// tag = "quoted"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentScript {
    #[serde(default)]
    pub intents: Vec<Intent>,
}

impl IntentScript {
    pub fn new(intents: Vec<Intent>) -> Self {
        Self { intents }
    }

    /// Load a script, choosing the format by file extension
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ScriptError> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        let parse: fn(&str) -> Result<Self, ScriptError> = match extension.as_deref() {
            Some("toml") => Self::from_toml_str,
            Some("json") => Self::from_json_str,
            _ => return Err(ScriptError::UnsupportedFormat(path.to_path_buf())),
        };

        let content = std::fs::read_to_string(path).map_err(|source| ScriptError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        parse(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ScriptError> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_json_str(content: &str) -> Result<Self, ScriptError> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Lead capture through closed reconciliation, including one measurement rework loop
    pub fn happy_path() -> Self {
        Self::new(vec![
            Intent::CreateLead,
            Intent::AssignLead,
            Intent::StartFollowing,
            Intent::tag(DEFAULT_TAG),
            Intent::ConvertLead,
            Intent::PublishQuote,
            Intent::RequestMeasurement,
            Intent::measurement(ServiceStep::Assign),
            Intent::measurement(ServiceStep::Accept),
            Intent::measurement(ServiceStep::CompleteSite),
            Intent::measurement(ServiceStep::Reject),
            Intent::measurement(ServiceStep::Accept),
            Intent::measurement(ServiceStep::CompleteSite),
            Intent::measurement(ServiceStep::Confirm),
            Intent::NewQuoteVersion,
            Intent::ConfirmQuote,
            Intent::sales(SalesAction::Confirm),
            Intent::sales(SalesAction::Procure),
            Intent::sales(SalesAction::Ship),
            Intent::CreateInstallation,
            Intent::installation(InstallationAction::Assign),
            Intent::installation(InstallationAction::Accept),
            Intent::installation(InstallationAction::CompleteSite),
            Intent::installation(InstallationAction::UploadPhotos),
            Intent::installation(InstallationAction::Confirm),
            Intent::CreateReconciliation,
            Intent::reconciliation(ReconciliationStep::Start),
            Intent::reconciliation(ReconciliationStep::Complete),
        ])
    }

    pub fn len(&self) -> usize {
        self.intents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intents.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Intent> {
        self.intents.iter()
    }
}

impl<'a> IntoIterator for &'a IntentScript {
    type Item = &'a Intent;
    type IntoIter = std::slice::Iter<'a, Intent>;

    fn into_iter(self) -> Self::IntoIter {
        self.intents.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parses_toml_with_payloads() {
        let script = IntentScript::from_toml_str(
            r#"
            [[intents]]
            kind = "create-lead"

            [[intents]]
            kind = "tag-lead"
            tag = "vip"

            [[intents]]
            kind = "measurement-action"
            action = "complete-site"
            "#,
        )
        .unwrap();

        assert_eq!(
            script.intents,
            vec![
                Intent::CreateLead,
                Intent::tag("vip"),
                Intent::measurement(ServiceStep::CompleteSite),
            ]
        );
    }

    #[test]
    fn test_parses_json() {
        let script = IntentScript::from_json_str(
            r#"{"intents":[{"kind":"sales-action","action":"ship"},{"kind":"reset"}]}"#,
        )
        .unwrap();
        assert_eq!(script.intents, vec![Intent::sales(SalesAction::Ship), Intent::Reset]);
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let err = IntentScript::from_json_str(r#"{"intents":[{"kind":"teleport"}]}"#).unwrap_err();
        assert!(matches!(err, ScriptError::Json(_)));
    }

    #[test]
    fn test_load_picks_format_by_extension() {
        let dir = TempDir::new().unwrap();
        let toml_path = dir.path().join("script.toml");
        std::fs::write(&toml_path, IntentScript::happy_path().to_toml_string().unwrap()).unwrap();
        assert_eq!(IntentScript::load(&toml_path).unwrap(), IntentScript::happy_path());

        let yaml_path = dir.path().join("script.yaml");
        std::fs::write(&yaml_path, "intents: []").unwrap();
        assert!(matches!(
            IntentScript::load(&yaml_path),
            Err(ScriptError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = IntentScript::load("/nonexistent/script.json").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/script.json"));
    }
}
