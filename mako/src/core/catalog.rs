//! Static tool catalog: names, descriptions, and parameter schemas.
//!
//! The schemas are advisory metadata for the model and also the validation
//! source for argument decoding at the dispatch boundary.

use serde_json::{Value, json};

pub const GIT_CREATE_BRANCH_AND_PUSH: &str = "git_create_branch_and_push";
pub const GITHUB_CREATE_PR: &str = "github_create_pr";
pub const GITHUB_CHECK_PR_STATUS: &str = "github_check_pr_status";
pub const GITHUB_CHECK_CI_STATUS: &str = "github_check_ci_status";
pub const RUN_SAFE_SHELL: &str = "run_safe_shell";

/// One callable tool as advertised to the model.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    /// JSON Schema object describing the argument payload.
    pub parameters: Value,
}

impl ToolSpec {
    /// Field names listed under the schema's `required` array.
    pub fn required(&self) -> Vec<&str> {
        self.parameters
            .get("required")
            .and_then(Value::as_array)
            .map(|fields| fields.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    /// OpenAI `tools[]` entry.
    pub fn to_wire(&self) -> Value {
        json!({
            "type": "function",
            "function": {
                "name": self.name,
                "description": self.description,
                "parameters": self.parameters,
            }
        })
    }
}

/// Build the full catalog in the order it is presented to the model.
pub fn tool_catalog() -> Vec<ToolSpec> {
    vec![
        ToolSpec {
            name: GIT_CREATE_BRANCH_AND_PUSH,
            description: "Create a new git branch and push it to origin. Use semantic names like feat/add-login.",
            parameters: json!({
                "type": "object",
                "properties": {
                    "branch_name": {"type": "string", "description": "Branch name"}
                },
                "required": ["branch_name"]
            }),
        },
        ToolSpec {
            name: GITHUB_CREATE_PR,
            description: "Create a GitHub Pull Request. Draft by default. Automerge only if the operator enabled it.",
            parameters: json!({
                "type": "object",
                "properties": {
                    "title": {"type": "string"},
                    "body": {"type": "string"},
                    "base": {
                        "type": "string",
                        "description": "Target branch. Omit to use the configured base branch."
                    },
                    "draft": {"type": "boolean", "default": true}
                },
                "required": ["title", "body"]
            }),
        },
        ToolSpec {
            name: GITHUB_CHECK_PR_STATUS,
            description: "Get current status of a PR (merged, open, mergeable, etc.).",
            parameters: json!({
                "type": "object",
                "properties": {
                    "pr_number_or_url": {"type": ["string", "integer"]}
                },
                "required": ["pr_number_or_url"]
            }),
        },
        ToolSpec {
            name: GITHUB_CHECK_CI_STATUS,
            description: "Check CI status of a PR. Use watch=true to poll until complete.",
            parameters: json!({
                "type": "object",
                "properties": {
                    "pr_number_or_url": {"type": ["string", "integer"]},
                    "watch": {"type": "boolean", "default": false}
                },
                "required": ["pr_number_or_url"]
            }),
        },
        ToolSpec {
            name: RUN_SAFE_SHELL,
            description: "Run a safe, read-only shell command to inspect files or repo state. \
                Only allowed: ls, grep, rg, find, cat, head, tail, wc, git status/diff/log/branch/remote. \
                No write, delete, install, or dangerous commands permitted.",
            parameters: json!({
                "type": "object",
                "properties": {
                    "cmd": {
                        "type": "string",
                        "description": "The command to run (e.g. 'ls -la src/', 'grep -r TODO .')"
                    }
                },
                "required": ["cmd"]
            }),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn catalog_names_are_unique() {
        let catalog = tool_catalog();
        let names: HashSet<_> = catalog.iter().map(|t| t.name).collect();
        assert_eq!(names.len(), catalog.len());
    }

    #[test]
    fn required_fields_come_from_schema() {
        let catalog = tool_catalog();
        let pr = catalog
            .iter()
            .find(|t| t.name == GITHUB_CREATE_PR)
            .expect("create pr");
        assert_eq!(pr.required(), vec!["title", "body"]);
    }

    #[test]
    fn base_has_no_hardcoded_default() {
        let catalog = tool_catalog();
        let pr = catalog
            .iter()
            .find(|t| t.name == GITHUB_CREATE_PR)
            .expect("create pr");
        let base = &pr.parameters["properties"]["base"];
        assert_eq!(base["type"], "string");
        assert!(base.get("default").is_none());
    }

    #[test]
    fn wire_format_wraps_function() {
        let spec = &tool_catalog()[0];
        let wire = spec.to_wire();
        assert_eq!(wire["type"], "function");
        assert_eq!(wire["function"]["name"], GIT_CREATE_BRANCH_AND_PUSH);
        assert_eq!(wire["function"]["parameters"]["type"], "object");
    }
}
