use crate::error::NotifyError;
use std::path::PathBuf;

const SANITIZED_WORKFLOW: &str = "Link to action run.yaml";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendMode {
    Webhook,
    Token,
}

impl SendMode {
    /// An unset mode means webhook delivery.
    pub fn parse(value: &str) -> Result<Self, NotifyError> {
        match value.to_ascii_uppercase().as_str() {
            "" | "WEBHOOK" => Ok(Self::Webhook),
            "TOKEN" => Ok(Self::Token),
            _ => Err(NotifyError::UnsupportedMode(value.to_string())),
        }
    }
}

/// Metadata about the pipeline run that triggered the notification.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineContext {
    pub action: String,
    pub actor: String,
    pub run_url: String,
    pub workflow: String,
    pub sha: String,
    pub git_ref: String,
    pub event_name: String,
    pub repository: String,
    pub server_url: String,
}

/// Everything the message builder reads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageInputs {
    pub text: String,
    pub title: String,
    pub username: String,
    pub icon_url: String,
    pub icon_emoji: String,
    pub channel: String,
    pub thread_ts: String,
    pub link_names: String,
    pub color: String,
    pub on_success: String,
    pub on_failure: String,
    pub on_cancel: String,
    pub minimal: String,
    pub site_name: String,
    pub site_title: String,
    pub host_name: String,
    pub host_title: String,
    /// `Some("")` suppresses the footer entirely.
    pub footer: Option<String>,
    pub pipeline: PipelineContext,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub mode: SendMode,
    pub webhook: String,
    pub token: String,
    pub custom_payload: String,
    pub file_upload: Option<PathBuf>,
    pub message: MessageInputs,
}

impl Config {
    pub fn from_env() -> Result<Self, NotifyError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds a config from any variable source. Values are trimmed and unset
    /// variables read as empty strings.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, NotifyError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| -> String {
            lookup(name)
                .map(|v| v.trim().to_string())
                .unwrap_or_default()
        };

        let mode = SendMode::parse(&var("MSG_MODE"))?;

        let pipeline = PipelineContext {
            action: var("GITHUB_ACTION"),
            actor: var("GITHUB_ACTOR"),
            run_url: var("GITHUB_RUN"),
            workflow: sanitize_workflow(var("GITHUB_WORKFLOW")),
            sha: var("GITHUB_SHA"),
            git_ref: var("GITHUB_REF"),
            event_name: var("GITHUB_EVENT_NAME"),
            repository: var("GITHUB_REPOSITORY"),
            server_url: var("GITHUB_SERVER_URL"),
        };

        let message = MessageInputs {
            text: var("SLACK_MESSAGE"),
            title: var("SLACK_TITLE"),
            username: var("SLACK_USERNAME"),
            icon_url: var("SLACK_ICON"),
            icon_emoji: var("SLACK_ICON_EMOJI"),
            channel: var("SLACK_CHANNEL"),
            thread_ts: var("SLACK_THREAD_TS"),
            link_names: var("SLACK_LINK_NAMES"),
            color: var("SLACK_COLOR"),
            on_success: var("SLACK_MESSAGE_ON_SUCCESS"),
            on_failure: var("SLACK_MESSAGE_ON_FAILURE"),
            on_cancel: var("SLACK_MESSAGE_ON_CANCEL"),
            minimal: var("MSG_MINIMAL"),
            site_name: var("SITE_NAME"),
            site_title: var("SITE_TITLE"),
            host_name: var("HOST_NAME"),
            host_title: var("HOST_TITLE"),
            footer: lookup("SLACK_FOOTER").map(|v| v.trim().to_string()),
            pipeline,
        };

        let file_upload = Some(var("SLACK_FILE_UPLOAD"))
            .filter(|p| !p.is_empty())
            .map(PathBuf::from);

        Ok(Config {
            mode,
            webhook: var("SLACK_WEBHOOK"),
            token: var("SLACK_TOKEN"),
            custom_payload: var("SLACK_CUSTOM_PAYLOAD"),
            file_upload,
            message,
        })
    }
}

// Some runners report the workflow file path instead of its name.
fn sanitize_workflow(workflow: String) -> String {
    if workflow.starts_with(".github") {
        SANITIZED_WORKFLOW.to_string()
    } else {
        workflow
    }
}
