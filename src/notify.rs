use crate::config::{Config, SendMode};
use crate::error::{MissingInput, NotifyError, PayloadKind, SendError};
use crate::message;
use crate::slack::{self, Destination, Transport};
use tracing::{info, warn};

/// Works out where the payload goes, failing before any request is made when a
/// required input is absent.
pub fn resolve_destination(config: &Config) -> Result<Destination, NotifyError> {
    match config.mode {
        SendMode::Token => {
            let channel = &config.message.channel;
            if channel.is_empty() {
                return Err(NotifyError::MissingInput(MissingInput::Channel));
            }
            Ok(Destination::Token {
                token: config.token.clone(),
                channel: channel.clone(),
            })
        }
        SendMode::Webhook => {
            if config.webhook.is_empty() {
                return Err(NotifyError::MissingInput(MissingInput::Endpoint));
            }
            Ok(Destination::Webhook {
                url: config.webhook.clone(),
            })
        }
    }
}

fn payload(config: &Config) -> Result<(PayloadKind, Vec<u8>), NotifyError> {
    if !config.custom_payload.is_empty() {
        return Ok((PayloadKind::Raw, config.custom_payload.clone().into_bytes()));
    }

    let message = message::build(&config.message)?;
    let body = serde_json::to_vec(&message).map_err(|e| NotifyError::Send {
        payload: PayloadKind::Structured,
        source: SendError::from(e),
    })?;

    Ok((PayloadKind::Structured, body))
}

fn deliver(
    config: &Config,
    transport: &impl Transport,
    destination: &Destination,
    body: Vec<u8>,
) -> Result<(), SendError> {
    slack::send(transport, destination, body)?;

    let Some(path) = &config.file_upload else {
        return Ok(());
    };

    match destination {
        Destination::Token { token, channel } => {
            slack::upload_file(transport, token, path, channel, &config.message.thread_ts)
        }
        Destination::Webhook { .. } => {
            warn!(path = %path.display(), "file uploads need token mode, skipping");
            Ok(())
        }
    }
}

/// Sends one notification for the current pipeline run.
///
/// A custom payload is sent as-is and the message builder is skipped. A failed
/// file upload fails the run even though the message itself was delivered.
pub fn notify(config: &Config, transport: &impl Transport) -> Result<(), NotifyError> {
    let destination = resolve_destination(config)?;
    let (kind, body) = payload(config)?;

    info!(mode = ?config.mode, payload = ?kind, "dispatching notification");

    deliver(config, transport, &destination, body).map_err(|source| NotifyError::Send {
        payload: kind,
        source,
    })
}
