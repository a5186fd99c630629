//! Records parsed from `gcloud ... --format=json` output.
use serde::{Deserialize, Deserializer};

use crate::errors::CsqlpError;

/// One entry of `gcloud projects list`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProjectRecord {
    #[serde(rename = "name")]
    pub display_name: String,
    #[serde(rename = "projectId")]
    pub project_id: String,
    #[serde(rename = "projectNumber", deserialize_with = "string_or_number")]
    pub project_number: String,
}

/// One entry of `gcloud sql instances list`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InstanceRecord {
    #[serde(rename = "name")]
    pub display_name: String,
    #[serde(rename = "connectionName")]
    pub connection_name: String,
}

fn string_or_number<'de, D>(d: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(d)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}

fn parse_array<T: for<'de> Deserialize<'de>>(raw: &str) -> Result<Vec<T>, CsqlpError> {
    // gcloud prints nothing at all (not `[]`) for some empty listings.
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str::<Vec<T>>(raw).map_err(|e| CsqlpError::Parse(e.to_string()))
}

/// Parse a projects listing; order is kept as emitted.
pub fn parse_projects(raw: &str) -> Result<Vec<ProjectRecord>, CsqlpError> {
    parse_array(raw)
}

/// Parse an instances listing; order is kept as emitted.
pub fn parse_instances(raw: &str) -> Result<Vec<InstanceRecord>, CsqlpError> {
    parse_array(raw)
}
