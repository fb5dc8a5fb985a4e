//! Image extraction from upstream responses
//!
//! The response envelope has changed shape between model revisions, so it
//! is read as loose JSON. Shapes are tried in order:
//!
//! 1. the first candidate's first part with inline data (`inlineData` or `inline_data`)
//! 2. the first candidate's first part with a `fileData` URI that is directly renderable
//! 3. a flat top-level `media` field (object or array) with inline data
//!
//! New upstream shapes belong here and nowhere else.

use serde_json::Value;

/// MIME type assumed when an inline part omits one
const DEFAULT_MIME_TYPE: &str = "image/png";

/// Find a renderable image URL in an upstream response body
pub fn extract_image(body: &Value) -> Option<String> {
    first_candidate_parts(body)
        .and_then(|parts| parts.iter().find_map(inline_part).or_else(|| parts.iter().find_map(file_part)))
        .or_else(|| media_field(body))
}

/// Reason given by the upstream for refusing the prompt, if any
pub fn block_reason(body: &Value) -> Option<&str> {
    let feedback = body.get("promptFeedback").or_else(|| body.get("prompt_feedback"))?;

    feedback
        .get("blockReason")
        .or_else(|| feedback.get("block_reason"))?
        .as_str()
        .filter(|reason| !reason.is_empty())
}

/// Summary of the first candidate's parts for logging, without payloads
pub fn describe_parts(body: &Value) -> Vec<String> {
    first_candidate_parts(body)
        .map(|parts| {
            parts
                .iter()
                .map(|part| {
                    part.as_object()
                        .map(|fields| fields.keys().cloned().collect::<Vec<_>>().join(","))
                        .unwrap_or_default()
                })
                .collect()
        })
        .unwrap_or_default()
}

fn first_candidate_parts(body: &Value) -> Option<&Vec<Value>> {
    body.get("candidates")?
        .as_array()?
        .first()?
        .get("content")?
        .get("parts")?
        .as_array()
}

fn inline_part(part: &Value) -> Option<String> {
    part.get("inlineData")
        .or_else(|| part.get("inline_data"))
        .and_then(inline_payload)
}

/// Build a data URL from an object holding `data` and a MIME type
fn inline_payload(inline: &Value) -> Option<String> {
    let data = inline.get("data")?.as_str().filter(|data| !data.is_empty())?;
    let mime_type = inline
        .get("mimeType")
        .or_else(|| inline.get("mime_type"))
        .and_then(Value::as_str)
        .filter(|mime| !mime.is_empty())
        .unwrap_or(DEFAULT_MIME_TYPE);

    Some(format!("data:{mime_type};base64,{data}"))
}

fn file_part(part: &Value) -> Option<String> {
    let file = part.get("fileData").or_else(|| part.get("file_data"))?;
    let uri = file.get("fileUri").or_else(|| file.get("file_uri"))?.as_str()?;

    let renderable = uri.starts_with("data:") || uri.starts_with("https://") || uri.starts_with("http://");
    renderable.then(|| uri.to_string())
}

fn media_field(body: &Value) -> Option<String> {
    let media_item = |item: &Value| inline_part(item).or_else(|| inline_payload(item));

    match body.get("media")? {
        Value::Array(items) => items.iter().find_map(media_item),
        item => media_item(item),
    }
}
