//! Agent reply decoding
//!
//! The agent answers with an envelope `{ "reply": "<string>" }` whose
//! `reply` string is itself a JSON document `{ "data": [...] }`. Decoding
//! is two fallible steps; the first failure wins.


use serde::Deserialize;
use thiserror::Error;

/// Separator used to rejoin fragments before re-splitting
const FRAGMENT_JOIN: &str = ", ";

/// Decode failure at either layer of the reply
#[derive(Debug, Error)]
pub enum MalformedReplyError {
    #[error("invalid reply envelope: {0}")]
    Envelope(#[source] serde_json::Error),
    #[error("invalid reply document: {0}")]
    Reply(#[source] serde_json::Error),
}

/// Outer transport envelope
#[derive(Debug, Deserialize)]
struct Envelope {
    reply: String,
}

/// Inner document carried in `reply`
#[derive(Debug, Deserialize)]
struct ReplyDocument {
    data: Vec<String>,
}

/// Decode a raw response body into an ordered list of showtimes.
///
/// Never returns a partial list: any decode failure aborts the parse.
pub fn parse(raw: &str) -> Result<Vec<String>, MalformedReplyError> {
    let envelope = decode_envelope(raw)?;
    let document = decode_document(&envelope.reply)?;
    Ok(normalize_showtimes(&document.data))
}

fn decode_envelope(raw: &str) -> Result<Envelope, MalformedReplyError> {
    serde_json::from_str(raw).map_err(MalformedReplyError::Envelope)
}

fn decode_document(reply: &str) -> Result<ReplyDocument, MalformedReplyError> {
    serde_json::from_str(reply).map_err(MalformedReplyError::Reply)
}

/// Flatten fragments into trimmed, non-empty showtime strings.
///
/// Fragments may carry embedded commas and stray whitespace; joining and
/// re-splitting on `,` yields one item per comma separated piece.
pub fn normalize_showtimes(fragments: &[String]) -> Vec<String> {
    fragments
        .join(FRAGMENT_JOIN)
        .split(',')
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .map(str::to_owned)
        .collect()
}
