//! Typed tool arguments, decoded once at the dispatch boundary.
//!
//! Decoding order: resolve the tool, parse the payload, check required fields,
//! validate against the tool's JSON Schema, then deserialize into [`ToolArgs`].
//! Handlers only ever see fully decoded arguments.

use std::fmt;

use jsonschema::{Validator, validator_for};
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value, json};
use thiserror::Error;

use super::catalog::ToolSpec;

/// Argument decoding failure. Rendered verbatim into the tool result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolArgsError {
    #[error("Tool '{0}' not implemented yet.")]
    UnknownTool(String),
    #[error("Error: malformed arguments for {tool}: {reason}")]
    Malformed { tool: String, reason: String },
    #[error("Error: {field} required")]
    MissingField { tool: String, field: String },
    #[error("Error: invalid arguments for {tool}: {reason}")]
    Invalid { tool: String, reason: String },
}

/// A pull request reference: number or URL. Models send either form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrRef(pub String);

impl PrRef {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PrRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for PrRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u64),
            Text(String),
        }
        Ok(match Raw::deserialize(deserializer)? {
            Raw::Number(n) => PrRef(n.to_string()),
            Raw::Text(s) => PrRef(s.trim().to_string()),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BranchArgs {
    pub branch_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreatePrArgs {
    pub title: String,
    pub body: String,
    /// Falls back to the configured base branch.
    #[serde(default)]
    pub base: Option<String>,
    #[serde(default = "default_draft")]
    pub draft: bool,
}

fn default_draft() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PrStatusArgs {
    pub pr_number_or_url: PrRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CiStatusArgs {
    pub pr_number_or_url: PrRef,
    #[serde(default)]
    pub watch: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ShellArgs {
    pub cmd: String,
}

/// One variant per catalog tool.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "tool", content = "args", rename_all = "snake_case")]
pub enum ToolArgs {
    GitCreateBranchAndPush(BranchArgs),
    GithubCreatePr(CreatePrArgs),
    GithubCheckPrStatus(PrStatusArgs),
    GithubCheckCiStatus(CiStatusArgs),
    RunSafeShell(ShellArgs),
}

struct CompiledTool {
    spec: ToolSpec,
    validator: Validator,
}

/// Catalog plus compiled argument validators.
pub struct ArgDecoder {
    tools: Vec<CompiledTool>,
}

impl ArgDecoder {
    pub fn new(catalog: Vec<ToolSpec>) -> anyhow::Result<Self> {
        let mut tools = Vec::with_capacity(catalog.len());
        for spec in catalog {
            let validator = validator_for(&spec.parameters)
                .map_err(|err| anyhow::anyhow!("invalid schema for {}: {}", spec.name, err))?;
            tools.push(CompiledTool { spec, validator });
        }
        Ok(Self { tools })
    }

    pub fn specs(&self) -> impl Iterator<Item = &ToolSpec> {
        self.tools.iter().map(|t| &t.spec)
    }

    pub fn decode(&self, name: &str, raw: Option<&str>) -> Result<ToolArgs, ToolArgsError> {
        let tool = self
            .tools
            .iter()
            .find(|t| t.spec.name == name)
            .ok_or_else(|| ToolArgsError::UnknownTool(name.to_string()))?;

        let payload = parse_payload(name, raw)?;
        check_required(name, &tool.spec, &payload)?;

        let instance = Value::Object(payload);
        if !tool.validator.is_valid(&instance) {
            let reason = tool
                .validator
                .iter_errors(&instance)
                .map(|err| err.to_string())
                .collect::<Vec<_>>()
                .join("; ");
            return Err(ToolArgsError::Invalid {
                tool: name.to_string(),
                reason,
            });
        }

        serde_json::from_value(json!({ "tool": name, "args": instance })).map_err(|err| {
            ToolArgsError::Invalid {
                tool: name.to_string(),
                reason: err.to_string(),
            }
        })
    }
}

/// Absent or blank payloads decode as an empty object.
fn parse_payload(tool: &str, raw: Option<&str>) -> Result<Map<String, Value>, ToolArgsError> {
    let raw = match raw.map(str::trim) {
        None | Some("") => return Ok(Map::new()),
        Some(raw) => raw,
    };
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(Value::Null) => Ok(Map::new()),
        Ok(other) => Err(ToolArgsError::Malformed {
            tool: tool.to_string(),
            reason: format!("expected a JSON object, got {}", json_kind(&other)),
        }),
        Err(err) => Err(ToolArgsError::Malformed {
            tool: tool.to_string(),
            reason: err.to_string(),
        }),
    }
}

fn check_required(
    tool: &str,
    spec: &ToolSpec,
    payload: &Map<String, Value>,
) -> Result<(), ToolArgsError> {
    for field in spec.required() {
        let missing = match payload.get(field) {
            None | Some(Value::Null) => true,
            Some(Value::String(s)) => s.trim().is_empty(),
            Some(_) => false,
        };
        if missing {
            return Err(ToolArgsError::MissingField {
                tool: tool.to_string(),
                field: field.to_string(),
            });
        }
    }
    Ok(())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::catalog::tool_catalog;

    fn decoder() -> ArgDecoder {
        ArgDecoder::new(tool_catalog()).expect("catalog schemas compile")
    }

    #[test]
    fn unknown_tool_is_reported_by_name() {
        let err = decoder().decode("write_file", Some("{}")).unwrap_err();
        assert_eq!(err.to_string(), "Tool 'write_file' not implemented yet.");
    }

    #[test]
    fn empty_branch_name_is_missing() {
        let err = decoder()
            .decode("git_create_branch_and_push", Some(r#"{"branch_name": "  "}"#))
            .unwrap_err();
        assert_eq!(err.to_string(), "Error: branch_name required");
    }

    #[test]
    fn absent_payload_decodes_as_empty_object() {
        let err = decoder().decode("run_safe_shell", None).unwrap_err();
        assert!(matches!(err, ToolArgsError::MissingField { ref field, .. } if field == "cmd"));
    }

    #[test]
    fn malformed_json_is_rejected_before_dispatch() {
        let err = decoder()
            .decode("run_safe_shell", Some("{cmd: ls"))
            .unwrap_err();
        assert!(matches!(err, ToolArgsError::Malformed { .. }));
        let err = decoder().decode("run_safe_shell", Some("[1,2]")).unwrap_err();
        assert!(err.to_string().contains("expected a JSON object, got an array"));
    }

    #[test]
    fn schema_type_mismatch_is_invalid() {
        let err = decoder()
            .decode(
                "github_create_pr",
                Some(r#"{"title": "t", "body": "b", "draft": "yes"}"#),
            )
            .unwrap_err();
        assert!(matches!(err, ToolArgsError::Invalid { .. }));
    }

    #[test]
    fn create_pr_applies_defaults() {
        let args = decoder()
            .decode("github_create_pr", Some(r#"{"title": "feat: x", "body": "why"}"#))
            .expect("decode");
        assert_eq!(
            args,
            ToolArgs::GithubCreatePr(CreatePrArgs {
                title: "feat: x".to_string(),
                body: "why".to_string(),
                base: None,
                draft: true,
            })
        );
    }

    #[test]
    fn pr_reference_accepts_numbers() {
        let args = decoder()
            .decode("github_check_ci_status", Some(r#"{"pr_number_or_url": 42, "watch": true}"#))
            .expect("decode");
        assert_eq!(
            args,
            ToolArgs::GithubCheckCiStatus(CiStatusArgs {
                pr_number_or_url: PrRef("42".to_string()),
                watch: true,
            })
        );
    }
}
