use crate::error::SendError;
use reqwest::blocking::multipart::{Form, Part};
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use std::path::Path;
use tracing::{debug, info, warn};

pub const POST_MESSAGE_URL: &str = "https://slack.com/api/chat.postMessage";
pub const FILES_UPLOAD_URL: &str = "https://slack.com/api/files.upload";

/// Where a payload goes and how it authenticates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    Webhook { url: String },
    Token { token: String, channel: String },
}

impl Destination {
    pub fn url(&self) -> &str {
        match self {
            Destination::Webhook { url } => url.as_str(),
            Destination::Token { .. } => POST_MESSAGE_URL,
        }
    }

    pub fn bearer(&self) -> Option<&str> {
        match self {
            Destination::Webhook { .. } => None,
            Destination::Token { token, .. } => Some(token.as_str()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    /// Code and reason phrase, e.g. `404 Not Found`.
    pub status_line: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload<'a> {
    pub path: &'a Path,
    pub initial_comment: &'a str,
    pub channels: &'a str,
    pub thread_ts: Option<&'a str>,
}

/// The HTTP client used for delivery.
pub trait Transport {
    fn post_json(
        &self,
        url: &str,
        bearer: Option<&str>,
        body: Vec<u8>,
    ) -> Result<Response, SendError>;

    fn post_upload(&self, url: &str, bearer: &str, upload: &Upload) -> Result<Response, SendError>;
}

pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new() -> reqwest::Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client })
    }
}

// Only the Web API reply is inspected, so an unreadable body is not a failure.
fn into_response(response: reqwest::blocking::Response) -> Response {
    let status = response.status();
    Response {
        status: status.as_u16(),
        status_line: status.to_string(),
        body: response.text().unwrap_or_default(),
    }
}

impl Transport for HttpTransport {
    fn post_json(
        &self,
        url: &str,
        bearer: Option<&str>,
        body: Vec<u8>,
    ) -> Result<Response, SendError> {
        let mut request = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(body);

        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }

        Ok(into_response(request.send()?))
    }

    fn post_upload(&self, url: &str, bearer: &str, upload: &Upload) -> Result<Response, SendError> {
        let file = Part::file(upload.path)
            .map_err(|source| SendError::UploadFile {
                path: upload.path.to_path_buf(),
                source,
            })?
            .file_name(upload.path.display().to_string());

        let mut form = Form::new()
            .part("file", file)
            .text("initial_comment", upload.initial_comment.to_string())
            .text("channels", upload.channels.to_string());

        if let Some(thread_ts) = upload.thread_ts {
            form = form.text("thread_ts", thread_ts.to_string());
        }

        let response = self
            .client
            .post(url)
            .bearer_auth(bearer)
            .multipart(form)
            .send()?;

        Ok(into_response(response))
    }
}

/// Anything at or above 299 is a failed delivery.
pub fn check_status(response: &Response) -> Result<(), SendError> {
    if response.status >= 299 {
        return Err(SendError::Delivery {
            status: response.status_line.clone(),
        });
    }
    Ok(())
}

// The Web API answers 200 even when it rejects a call.
fn warn_on_api_error(method: &str, response: &Response) {
    let Ok(body) = serde_json::from_str::<Value>(&response.body) else {
        return;
    };

    if body.get("ok").and_then(Value::as_bool) == Some(false) {
        let error = body.get("error").and_then(Value::as_str).unwrap_or("unknown");
        warn!(method, error, "Slack API reported an error");
    }
}

pub fn send(
    transport: &impl Transport,
    destination: &Destination,
    body: Vec<u8>,
) -> Result<(), SendError> {
    debug!(bytes = body.len(), "sending payload");

    let response = transport.post_json(destination.url(), destination.bearer(), body)?;
    check_status(&response)?;

    if let Destination::Token { .. } = destination {
        warn_on_api_error("chat.postMessage", &response);
    }

    info!(status = %response.status_line, "message delivered");
    Ok(())
}

pub fn upload_file(
    transport: &impl Transport,
    token: &str,
    path: &Path,
    channel: &str,
    thread_ts: &str,
) -> Result<(), SendError> {
    let upload = Upload {
        path,
        initial_comment: "",
        channels: channel,
        thread_ts: Some(thread_ts).filter(|ts| !ts.is_empty()),
    };

    info!(path = %path.display(), "uploading file");

    let response = transport.post_upload(FILES_UPLOAD_URL, token, &upload)?;
    check_status(&response)?;
    warn_on_api_error("files.upload", &response);

    info!(status = %response.status_line, "file uploaded");
    Ok(())
}
