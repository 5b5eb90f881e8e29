use crate::config::{MessageInputs, PipelineContext};
use crate::error::{MissingInput, NotifyError};
use serde::{Deserialize, Serialize};

const DEFAULT_COLOR: &str = "good";
const EMPTY_TEXT: &str = "EOM";
const ATTRIBUTION: &str =
    "<https://github.com/rtCamp/github-actions-library|Powered By rtCamp's GitHub Actions Library>";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Message {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub text: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub username: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub icon_url: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub icon_emoji: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub channel: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub link_names: String,
    pub unfurl_links: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub thread_ts: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Attachment {
    pub fallback: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub pretext: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub color: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub author_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub author_link: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub author_icon: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub footer: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<Field>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Field {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub value: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub short: bool,
}

impl Field {
    fn new(title: &str, value: &str, short: bool) -> Self {
        Self {
            title: title.to_string(),
            value: value.to_string(),
            short,
        }
    }
}

/// Job status reported through the color input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Success,
    Cancelled,
    Failure,
    /// A raw color such as `#ff00ff`, or nothing at all.
    Other(String),
}

impl Status {
    pub fn parse(keyword: &str) -> Self {
        match keyword.to_lowercase().as_str() {
            "success" => Status::Success,
            "cancelled" => Status::Cancelled,
            "failure" => Status::Failure,
            _ => Status::Other(keyword.to_string()),
        }
    }

    pub fn color(&self) -> &str {
        match self {
            Status::Success => "good",
            Status::Cancelled => "#808080",
            Status::Failure => "danger",
            Status::Other(raw) if raw.is_empty() => DEFAULT_COLOR,
            Status::Other(raw) => raw.as_str(),
        }
    }

    fn override_text<'a>(&self, inputs: &'a MessageInputs) -> Option<&'a str> {
        let text = match self {
            Status::Success => &inputs.on_success,
            Status::Cancelled => &inputs.on_cancel,
            Status::Failure => &inputs.on_failure,
            Status::Other(_) => return None,
        };
        Some(text.as_str()).filter(|t| !t.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextField {
    Ref,
    Event,
    ActionsUrl,
    Commit,
}

impl ContextField {
    const ALL: [ContextField; 4] = [
        ContextField::Ref,
        ContextField::Event,
        ContextField::ActionsUrl,
        ContextField::Commit,
    ];

    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_lowercase().as_str() {
            "ref" => Some(ContextField::Ref),
            "event" => Some(ContextField::Event),
            "actions url" => Some(ContextField::ActionsUrl),
            "commit" => Some(ContextField::Commit),
            _ => None,
        }
    }

    fn field(self, pipeline: &PipelineContext) -> Field {
        let commit_url = format!(
            "{}/{}/commit/{}",
            pipeline.server_url, pipeline.repository, pipeline.sha
        );

        match self {
            ContextField::Ref => Field::new("Ref", &pipeline.git_ref, true),
            ContextField::Event => Field::new("Event", &pipeline.event_name, true),
            ContextField::ActionsUrl => Field::new(
                "Actions URL",
                &format!("<{}/checks|{}>", commit_url, pipeline.workflow),
                true,
            ),
            ContextField::Commit => Field::new(
                "Commit",
                &format!("<{}|{}>", commit_url, short_sha(&pipeline.sha)),
                true,
            ),
        }
    }
}

/// How many context fields accompany the main text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Minimal {
    Full,
    TitleOnly,
    /// Requested fields, in request order. Unrecognized tokens are dropped.
    Select(Vec<ContextField>),
}

impl Minimal {
    pub fn parse(directive: &str) -> Self {
        match directive {
            "" => Minimal::Full,
            "true" => Minimal::TitleOnly,
            list => Minimal::Select(
                list.split(',')
                    .filter_map(ContextField::from_token)
                    .collect(),
            ),
        }
    }
}

fn short_sha(sha: &str) -> &str {
    sha.char_indices()
        .nth(6)
        .map_or(sha, |(idx, _)| &sha[..idx])
}

/// Orders the fields of the attachment.
///
/// In select mode each requested field is inserted at the front, so the result
/// lists them in reverse request order followed by the main field. Host and site
/// fields, when a host name is given, always come first.
pub fn assemble_fields(inputs: &MessageInputs, text: &str) -> Vec<Field> {
    let main = Field::new(&inputs.title, text, false);
    let pipeline = &inputs.pipeline;

    let mut fields = match Minimal::parse(&inputs.minimal) {
        Minimal::TitleOnly => vec![main],
        Minimal::Select(requested) => {
            let mut fields = vec![main];
            for context in requested {
                fields.insert(0, context.field(pipeline));
            }
            fields
        }
        Minimal::Full => {
            let mut fields: Vec<Field> = ContextField::ALL
                .iter()
                .map(|context| context.field(pipeline))
                .collect();
            fields.push(main);
            fields
        }
    };

    if inputs.host_name.is_empty() {
        return fields;
    }

    let mut with_host = vec![
        Field::new(&inputs.site_title, &inputs.site_name, true),
        Field::new(&inputs.host_title, &inputs.host_name, true),
    ];
    with_host.append(&mut fields);
    with_host
}

pub fn fallback_text(inputs: &MessageInputs) -> String {
    if !inputs.text.is_empty() {
        return inputs.text.clone();
    }

    let p = &inputs.pipeline;
    [
        ("GITHUB_ACTION", &p.action),
        ("GITHUB_ACTOR", &p.actor),
        ("GITHUB_EVENT_NAME", &p.event_name),
        ("GITHUB_REF", &p.git_ref),
        ("GITHUB_REPOSITORY", &p.repository),
        ("GITHUB_WORKFLOW", &p.workflow),
    ]
    .iter()
    .map(|(key, value)| format!("{key}={value}"))
    .collect::<Vec<_>>()
    .join(" \n ")
}

pub fn footer(inputs: &MessageInputs) -> String {
    if let Some(footer) = &inputs.footer {
        return footer.clone();
    }

    if inputs.pipeline.run_url.is_empty() {
        ATTRIBUTION.to_string()
    } else {
        format!(
            "{} | <{}|Triggered on this workflow run>",
            ATTRIBUTION, inputs.pipeline.run_url
        )
    }
}

/// The status override when one is configured, else the message text.
pub fn resolve_text<'a>(status: &Status, inputs: &'a MessageInputs) -> &'a str {
    let text = status.override_text(inputs).unwrap_or(inputs.text.as_str());
    if text.is_empty() {
        EMPTY_TEXT
    } else {
        text
    }
}

pub fn build(inputs: &MessageInputs) -> Result<Message, NotifyError> {
    if inputs.text.is_empty() {
        return Err(NotifyError::MissingInput(MissingInput::Message));
    }

    let status = Status::parse(&inputs.color);
    let text = resolve_text(&status, inputs);

    let pipeline = &inputs.pipeline;
    let author_link = format!("{}/{}", pipeline.server_url, pipeline.actor);

    Ok(Message {
        username: inputs.username.clone(),
        icon_url: inputs.icon_url.clone(),
        icon_emoji: inputs.icon_emoji.clone(),
        channel: inputs.channel.clone(),
        link_names: inputs.link_names.clone(),
        thread_ts: inputs.thread_ts.clone(),
        attachments: vec![Attachment {
            fallback: fallback_text(inputs),
            color: status.color().to_string(),
            author_name: pipeline.actor.clone(),
            author_icon: format!("{author_link}.png?size=32"),
            author_link,
            footer: footer(inputs),
            fields: assemble_fields(inputs, text),
            ..Attachment::default()
        }],
        ..Message::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs() -> MessageInputs {
        MessageInputs {
            text: "Deployed".to_string(),
            title: "Deploy".to_string(),
            pipeline: PipelineContext {
                action: "notify".to_string(),
                actor: "octocat".to_string(),
                run_url: "https://github.com/acme/app/actions/runs/42".to_string(),
                workflow: "CI".to_string(),
                sha: "0123456789abcdef".to_string(),
                git_ref: "refs/heads/main".to_string(),
                event_name: "push".to_string(),
                repository: "acme/app".to_string(),
                server_url: "https://github.com".to_string(),
            },
            ..MessageInputs::default()
        }
    }

    fn titles(fields: &[Field]) -> Vec<&str> {
        fields.iter().map(|f| f.title.as_str()).collect()
    }

    #[test]
    fn test_unset_status_is_good() {
        let message = build(&inputs()).unwrap();
        assert_eq!(message.attachments[0].color, "good");
    }

    #[test]
    fn test_raw_color_passes_through() {
        let mut inputs = inputs();
        inputs.color = "#ff00ff".to_string();
        assert_eq!(build(&inputs).unwrap().attachments[0].color, "#ff00ff");
    }

    #[test]
    fn test_status_overrides_text_and_color() {
        let cases = [
            ("SUCCESS", "good", "it worked"),
            ("Failure", "danger", "it broke"),
            ("cancelled", "#808080", "it stopped"),
        ];

        for (keyword, color, text) in cases {
            let mut inputs = inputs();
            inputs.color = keyword.to_string();
            inputs.on_success = "it worked".to_string();
            inputs.on_failure = "it broke".to_string();
            inputs.on_cancel = "it stopped".to_string();

            let message = build(&inputs).unwrap();
            let attachment = &message.attachments[0];
            assert_eq!(attachment.color, color, "color for {keyword}");
            assert_eq!(attachment.fields.last().unwrap().value, text);
        }
    }

    #[test]
    fn test_empty_override_keeps_message() {
        let mut inputs = inputs();
        inputs.color = "failure".to_string();
        let message = build(&inputs).unwrap();
        assert_eq!(message.attachments[0].fields.last().unwrap().value, "Deployed");
    }

    #[test]
    fn test_empty_resolved_text_becomes_eom() {
        let mut inputs = inputs();
        inputs.text.clear();
        assert_eq!(resolve_text(&Status::parse(""), &inputs), "EOM");
        assert_eq!(resolve_text(&Status::Success, &inputs), "EOM");

        inputs.on_success = "shipped".to_string();
        assert_eq!(resolve_text(&Status::Success, &inputs), "shipped");
    }

    #[test]
    fn test_missing_message_is_an_error() {
        let mut inputs = inputs();
        inputs.text.clear();
        assert!(matches!(
            build(&inputs),
            Err(NotifyError::MissingInput(MissingInput::Message))
        ));
    }

    #[test]
    fn test_default_field_order() {
        let fields = assemble_fields(&inputs(), "Deployed");
        assert_eq!(
            titles(&fields),
            ["Ref", "Event", "Actions URL", "Commit", "Deploy"]
        );
        assert!(fields[..4].iter().all(|f| f.short));
        assert!(!fields[4].short);
        assert_eq!(
            fields[2].value,
            "<https://github.com/acme/app/commit/0123456789abcdef/checks|CI>"
        );
        assert_eq!(
            fields[3].value,
            "<https://github.com/acme/app/commit/0123456789abcdef|012345>"
        );
    }

    #[test]
    fn test_minimal_true_keeps_only_main_field() {
        let mut inputs = inputs();
        inputs.minimal = "true".to_string();
        let fields = assemble_fields(&inputs, "Deployed");
        assert_eq!(fields, vec![Field::new("Deploy", "Deployed", false)]);
    }

    #[test]
    fn test_minimal_selection_is_reversed() {
        let mut inputs = inputs();
        inputs.minimal = "event,ref".to_string();
        let fields = assemble_fields(&inputs, "Deployed");
        assert_eq!(titles(&fields), ["Ref", "Event", "Deploy"]);

        inputs.minimal = "Commit, nonsense, ACTIONS URL".to_string();
        let fields = assemble_fields(&inputs, "Deployed");
        assert_eq!(titles(&fields), ["Actions URL", "Commit", "Deploy"]);
    }

    #[test]
    fn test_host_fields_come_first() {
        for minimal in ["", "true", "event,ref"] {
            let mut inputs = inputs();
            inputs.minimal = minimal.to_string();
            inputs.host_name = "example.com".to_string();
            inputs.host_title = "Host".to_string();
            inputs.site_name = "site".to_string();
            inputs.site_title = "Site".to_string();

            let fields = assemble_fields(&inputs, "Deployed");
            assert_eq!(fields[0], Field::new("Site", "site", true));
            assert_eq!(fields[1], Field::new("Host", "example.com", true));
        }
    }

    #[test]
    fn test_short_sha_handles_short_input() {
        assert_eq!(short_sha("abc"), "abc");
        assert_eq!(short_sha("abcdef"), "abcdef");
        assert_eq!(short_sha("abcdefgh"), "abcdef");
    }

    #[test]
    fn test_fallback_dumps_pipeline_when_text_is_empty() {
        let mut inputs = inputs();
        assert_eq!(fallback_text(&inputs), "Deployed");

        inputs.text.clear();
        assert_eq!(
            fallback_text(&inputs),
            "GITHUB_ACTION=notify \n GITHUB_ACTOR=octocat \n GITHUB_EVENT_NAME=push \n \
             GITHUB_REF=refs/heads/main \n GITHUB_REPOSITORY=acme/app \n GITHUB_WORKFLOW=CI"
        );
    }

    #[test]
    fn test_footer_links_run_when_available() {
        let mut inputs = inputs();
        let expected = format!(
            "{ATTRIBUTION} | <{}|Triggered on this workflow run>",
            "https://github.com/acme/app/actions/runs/42"
        );
        assert_eq!(footer(&inputs), expected);

        inputs.pipeline.run_url.clear();
        assert_eq!(footer(&inputs), ATTRIBUTION);

        inputs.footer = Some("custom".to_string());
        assert_eq!(footer(&inputs), "custom");
    }

    #[test]
    fn test_author_block_points_at_actor() {
        let message = build(&inputs()).unwrap();
        let attachment = &message.attachments[0];
        assert_eq!(attachment.author_name, "octocat");
        assert_eq!(attachment.author_link, "https://github.com/octocat");
        assert_eq!(
            attachment.author_icon,
            "https://github.com/octocat.png?size=32"
        );
    }

    #[test]
    fn test_serialization_omits_empty_fields() {
        let mut inputs = inputs();
        inputs.minimal = "true".to_string();
        inputs.footer = Some(String::new());
        inputs.channel = "#builds".to_string();
        let message = build(&inputs).unwrap();

        let json = serde_json::to_value(&message).unwrap();
        let object = json.as_object().unwrap();
        assert!(!object.contains_key("text"));
        assert!(!object.contains_key("username"));
        assert!(!object.contains_key("thread_ts"));
        assert_eq!(object["unfurl_links"], false);
        assert_eq!(object["channel"], "#builds");

        let attachment = json["attachments"][0].as_object().unwrap();
        assert!(!attachment.contains_key("footer"));
        assert!(!attachment.contains_key("pretext"));
        assert!(!json["attachments"][0]["fields"][0]
            .as_object()
            .unwrap()
            .contains_key("short"));

        let parsed: Message = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, message);
    }
}
