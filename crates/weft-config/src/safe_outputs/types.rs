//! Typed safe-outputs configuration.
//!
//! ```yaml
//! safe-outputs:
//!   create-issue:
//!     title-prefix: "[bot] "
//!     labels: [automation]
//!   add-comment:
//!     max: 3
//!   staged: true
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Options every safe-output type accepts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SafeOutputBase {
    /// Maximum number of items of this type per run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_repo: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed_repos: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CreateIssueConfig {
    #[serde(flatten)]
    pub base: SafeOutputBase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assignees: Vec<String>,
    /// Close the issue automatically after this many days.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CreateDiscussionConfig {
    #[serde(flatten)]
    pub base: SafeOutputBase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AddCommentConfig {
    #[serde(flatten)]
    pub base: SafeOutputBase,
    /// `triggering`, `*`, or an explicit number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discussion: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hide_older_comments: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CreatePullRequestConfig {
    #[serde(flatten)]
    pub base: SafeOutputBase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reviewers: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub draft: Option<bool>,
    /// `warn`, `error` or `ignore`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub if_no_changes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_branch: Option<String>,
}

/// Shared by `add-labels` and `remove-labels`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct LabelsConfig {
    #[serde(flatten)]
    pub base: SafeOutputBase,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

/// Shared by the `update-*` types.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct UpdateEntityConfig {
    #[serde(flatten)]
    pub base: SafeOutputBase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<bool>,
}

/// Shared by the `close-*` types.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CloseEntityConfig {
    #[serde(flatten)]
    pub base: SafeOutputBase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required_labels: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_title_prefix: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ThreatDetectionConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    /// Extra instructions appended to the detection prompt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<Value>,
}

/// Types without dedicated options beyond the shared base.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenericSafeOutputConfig {
    #[serde(flatten)]
    pub base: SafeOutputBase,
    #[serde(flatten)]
    pub options: Map<String, Value>,
}

/// Status message templates posted by safe-output jobs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SafeOutputMessages {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer_install: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub staged_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub staged_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_started: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_success: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_failure: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detection_failure: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub append_only_comments: bool,
}

impl SafeOutputMessages {
    /// Fill each unset template from `other`; `append-only-comments` is OR-ed.
    pub fn fill_from(&mut self, other: &SafeOutputMessages) {
        fill(&mut self.footer, &other.footer);
        fill(&mut self.footer_install, &other.footer_install);
        fill(&mut self.staged_title, &other.staged_title);
        fill(&mut self.staged_description, &other.staged_description);
        fill(&mut self.run_started, &other.run_started);
        fill(&mut self.run_success, &other.run_success);
        fill(&mut self.run_failure, &other.run_failure);
        fill(&mut self.detection_failure, &other.detection_failure);
        self.append_only_comments |= other.append_only_comments;
    }
}

fn fill(slot: &mut Option<String>, candidate: &Option<String>) {
    let empty = slot.as_deref().is_none_or(str::is_empty);
    if empty && candidate.as_deref().is_some_and(|s| !s.is_empty()) {
        slot.clone_from(candidate);
    }
}

macro_rules! safe_outputs_config {
    ($($(#[$doc:meta])* $field:ident: $ty:ty => $key:literal,)*) => {
        /// The `safe-outputs:` section.
        #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
        pub struct SafeOutputsConfig {
            $(
                $(#[$doc])*
                #[serde(rename = $key, default, skip_serializing_if = "Option::is_none")]
                pub $field: Option<$ty>,
            )*

            /// Domains allowed in URLs that safe outputs write.
            #[serde(rename = "allowed-domains", default, skip_serializing_if = "Vec::is_empty")]
            pub allowed_domains: Vec<String>,
            #[serde(default, skip_serializing_if = "std::ops::Not::not")]
            pub staged: bool,
            #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
            pub env: BTreeMap<String, String>,
            #[serde(rename = "github-token", default, skip_serializing_if = "Option::is_none")]
            pub github_token: Option<String>,
            /// Maximum patch size in KB.
            #[serde(rename = "max-patch-size", default, skip_serializing_if = "Option::is_none")]
            pub maximum_patch_size: Option<u32>,
            #[serde(rename = "runs-on", default, skip_serializing_if = "Option::is_none")]
            pub runs_on: Option<String>,
            #[serde(default, skip_serializing_if = "Option::is_none")]
            pub messages: Option<SafeOutputMessages>,
            /// Custom safe-output jobs. Merged by the job builder, not here.
            #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
            pub jobs: BTreeMap<String, Value>,
        }

        /// Type keys with a typed field on [`SafeOutputsConfig`].
        pub const TYPE_FIELD_KEYS: &[&str] = &[$($key),*];

        impl SafeOutputsConfig {
            /// Type keys that are set on this config, in declaration order.
            pub fn populated_type_keys(&self) -> Vec<&'static str> {
                let mut keys = Vec::new();
                $(
                    if self.$field.is_some() {
                        keys.push($key);
                    }
                )*
                keys
            }

            /// Move each type config from `other` into any slot still unset here.
            pub(crate) fn fill_type_fields_from(&mut self, other: &mut SafeOutputsConfig) {
                $(
                    if self.$field.is_none() {
                        self.$field = other.$field.take();
                    }
                )*
            }
        }
    };
}

safe_outputs_config! {
    create_issues: CreateIssueConfig => "create-issue",
    create_discussions: CreateDiscussionConfig => "create-discussion",
    update_discussions: UpdateEntityConfig => "update-discussion",
    close_discussions: CloseEntityConfig => "close-discussion",
    add_comments: AddCommentConfig => "add-comment",
    create_pull_requests: CreatePullRequestConfig => "create-pull-request",
    create_pull_request_review_comments: GenericSafeOutputConfig => "create-pull-request-review-comment",
    submit_pull_request_review: GenericSafeOutputConfig => "submit-pull-request-review",
    create_code_scanning_alerts: GenericSafeOutputConfig => "create-code-scanning-alert",
    add_labels: LabelsConfig => "add-labels",
    remove_labels: LabelsConfig => "remove-labels",
    add_reviewer: GenericSafeOutputConfig => "add-reviewer",
    assign_milestone: GenericSafeOutputConfig => "assign-milestone",
    assign_to_agent: GenericSafeOutputConfig => "assign-to-agent",
    assign_to_user: GenericSafeOutputConfig => "assign-to-user",
    update_issues: UpdateEntityConfig => "update-issue",
    update_pull_requests: UpdateEntityConfig => "update-pull-request",
    close_issues: CloseEntityConfig => "close-issue",
    close_pull_requests: CloseEntityConfig => "close-pull-request",
    mark_pull_request_ready: GenericSafeOutputConfig => "mark-pull-request-as-ready-for-review",
    push_to_pull_request_branch: GenericSafeOutputConfig => "push-to-pull-request-branch",
    upload_assets: GenericSafeOutputConfig => "upload-asset",
    update_release: GenericSafeOutputConfig => "update-release",
    create_agent_sessions: GenericSafeOutputConfig => "create-agent-session",
    create_projects: GenericSafeOutputConfig => "create-project",
    update_projects: GenericSafeOutputConfig => "update-project",
    create_project_status_updates: GenericSafeOutputConfig => "create-project-status-update",
    link_sub_issue: GenericSafeOutputConfig => "link-sub-issue",
    hide_comment: GenericSafeOutputConfig => "hide-comment",
    dispatch_workflow: GenericSafeOutputConfig => "dispatch-workflow",
    missing_tool: GenericSafeOutputConfig => "missing-tool",
    missing_data: GenericSafeOutputConfig => "missing-data",
    noop: GenericSafeOutputConfig => "noop",
    /// Runs after the agent, before any other safe output is applied.
    threat_detection: ThreatDetectionConfig => "threat-detection",
}

impl SafeOutputsConfig {
    /// Decode a `safe-outputs:` value.
    ///
    /// A type key set to null or `true` (`create-issue:`) enables the type
    /// with default options; `false` leaves it disabled.
    pub fn from_value(value: &Value) -> serde_json::Result<Self> {
        let Value::Object(map) = value else {
            return serde_json::from_value(value.clone());
        };
        let mut normalized = Map::with_capacity(map.len());
        for (key, entry) in map {
            if TYPE_FIELD_KEYS.contains(&key.as_str()) {
                match entry {
                    Value::Null | Value::Bool(true) => {
                        normalized.insert(key.clone(), Value::Object(Map::new()));
                    }
                    Value::Bool(false) => {}
                    other => {
                        normalized.insert(key.clone(), other.clone());
                    }
                }
            } else {
                normalized.insert(key.clone(), entry.clone());
            }
        }
        serde_json::from_value(Value::Object(normalized))
    }

    /// Fill meta fields that are still empty here from `other`.
    pub(crate) fn fill_meta_from(&mut self, other: &SafeOutputsConfig) {
        if self.allowed_domains.is_empty() {
            self.allowed_domains.clone_from(&other.allowed_domains);
        }
        self.staged |= other.staged;
        if self.env.is_empty() {
            self.env.clone_from(&other.env);
        }
        fill(&mut self.github_token, &other.github_token);
        if self.maximum_patch_size.is_none_or(|size| size == 0) {
            self.maximum_patch_size = other.maximum_patch_size;
        }
        fill(&mut self.runs_on, &other.runs_on);
        if let Some(incoming) = &other.messages {
            self.messages
                .get_or_insert_with(SafeOutputMessages::default)
                .fill_from(incoming);
        }
    }
}
