//! Host ↔ sandbox command protocol.
//!
//! Alongside the one-way console stream, the host can ask the executing
//! document to run assertion snippets or evaluate a completion rule. Both
//! directions are tagged so each side can filter reliably; the evaluation
//! itself happens inside the document and is outside this crate.

use serde::{Deserialize, Serialize};

/// Source tag on host → sandbox commands.
pub const HOST_SOURCE: &str = "playground-host";

/// Source tag on sandbox → host replies.
pub const RUNNER_SOURCE: &str = "sandbox-runner";

/// One assertion snippet to run inside the document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TestSpec {
    pub id: String,
    pub description: String,
    pub code: String,
}

/// How an exercise decides it is complete.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum CompletionRule {
    /// A selector must match, optionally with the given text content.
    Dom {
        selector: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        text_includes: Option<String>,
    },
    /// A predicate snippet must evaluate truthy.
    Predicate { code: String },
}

/// Command payloads the host sends.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum HostCommand {
    RunTests { tests: Vec<TestSpec> },
    CheckComplete { rule: CompletionRule },
}

/// A tagged host → sandbox message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HostMessage {
    pub source: String,
    #[serde(flatten)]
    pub command: HostCommand,
}

impl HostMessage {
    pub fn new(command: HostCommand) -> Self {
        HostMessage {
            source: HOST_SOURCE.to_string(),
            command,
        }
    }
}

/// Outcome of one assertion snippet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TestResult {
    pub id: String,
    pub description: String,
    pub passed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Reply payloads the sandbox sends.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum SandboxReply {
    TestResults {
        results: Vec<TestResult>,
    },
    CompleteResult {
        passed: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    RunnerError {
        error: String,
    },
}

/// A tagged sandbox → host message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunnerMessage {
    pub source: String,
    #[serde(flatten)]
    pub reply: SandboxReply,
}

impl RunnerMessage {
    pub fn new(reply: SandboxReply) -> Self {
        RunnerMessage {
            source: RUNNER_SOURCE.to_string(),
            reply,
        }
    }

    pub fn is_from_runner(&self) -> bool {
        self.source == RUNNER_SOURCE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_wire_shape() {
        let message = HostMessage::new(HostCommand::RunTests {
            tests: vec![TestSpec {
                id: "t1".to_string(),
                description: "renders the list".to_string(),
                code: "return ctx.$('#product-list') != null".to_string(),
            }],
        });

        let raw = serde_json::to_string(&message).unwrap();
        assert!(raw.contains("\"source\":\"playground-host\""));
        assert!(raw.contains("\"type\":\"run-tests\""));

        let back: HostMessage = serde_json::from_str(&raw).unwrap();
        assert_eq!(back, message);
    }

    #[test]
    fn completion_rule_kinds() {
        let dom: CompletionRule = serde_json::from_str(
            r##"{"kind":"dom","selector":"#done","text_includes":"Saved"}"##,
        )
        .unwrap();
        assert!(matches!(dom, CompletionRule::Dom { .. }));

        let predicate: CompletionRule =
            serde_json::from_str(r#"{"kind":"predicate","code":"return true"}"#).unwrap();
        assert!(matches!(predicate, CompletionRule::Predicate { .. }));
    }

    #[test]
    fn reply_wire_shape() {
        let message = RunnerMessage::new(SandboxReply::CompleteResult {
            passed: true,
            message: Some("Looks good!".to_string()),
        });

        let raw = serde_json::to_string(&message).unwrap();
        assert!(raw.contains("\"source\":\"sandbox-runner\""));
        assert!(raw.contains("\"type\":\"complete-result\""));
        assert!(message.is_from_runner());

        let back: RunnerMessage = serde_json::from_str(&raw).unwrap();
        assert_eq!(back, message);
    }
}
