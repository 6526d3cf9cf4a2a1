//! Locating a generated image inside an image provider's JSON response.
//!
//! Providers and model revisions return images in incompatible shapes. Each
//! shape is handled by one probe; probes run in a fixed order and the first
//! hit wins. A response no probe recognizes simply has no image.

use regex::Regex;
use serde_json::Value;
use tracing::debug;

const DEFAULT_MIME: &str = "image/png";

/// Minimum length for a bare string to be taken as a base64 image body.
const MIN_BARE_BASE64_LEN: usize = 100;

/// Nesting limit for the last-resort structural search.
const MAX_DEEP_SEARCH_DEPTH: usize = 10;

const DATA_URI_PATTERN: &str = r"data:image/[a-zA-Z0-9.+-]+;base64,[A-Za-z0-9+/=]+";
const HTTP_URL_PATTERN: &str = r#"https?://[^\s)\]}>"']+"#;

/// Sub-fields holding the image of a content part, in priority order.
const IMAGE_PART_FIELDS: &[&str] = &[
    "/image_url/url",
    "/image_url",
    "/image/url",
    "/image/b64_json",
    "/image/data",
    "/image",
    "/url",
    "/b64_json",
    "/data",
    "/inline_data/data",
];

type Probe = fn(&Value) -> Option<String>;

const PROBES: &[(&str, Probe)] = &[
    ("encoded_string_scan", scan_encoded_strings),
    ("content_parts", inspect_content_parts),
    ("content_text", inspect_content_text),
    ("message_image_url", message_image_url),
    ("data_array", data_array),
    ("images_array", images_array),
    ("candidates", candidate_parts),
    ("deep_search", deep_search),
];

/// Returns the first image found in `response` as a `data:` URI or an
/// HTTP(S) URL.
pub fn locate_image(response: &Value) -> Option<String> {
    PROBES.iter().find_map(|(name, probe)| {
        let image = probe(response)?;
        debug!(probe = %name, "located image in provider response");
        Some(image)
    })
}

fn data_uri(mime_type: &str, body: &str) -> String {
    format!("data:{mime_type};base64,{body}")
}

fn is_base64_alphabet(value: &str) -> bool {
    !value.is_empty()
        && value
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'+' | b'/' | b'='))
}

fn is_bare_base64(value: &str) -> bool {
    value.len() > MIN_BARE_BASE64_LEN && is_base64_alphabet(value)
}

/// Normalizes an explicit image field: URLs and data URIs pass through,
/// base64 bodies are wrapped as PNG.
fn normalize_reference(value: &str) -> Option<String> {
    let value = value.trim();
    if value.starts_with("data:") || value.starts_with("http://") || value.starts_with("https://")
    {
        Some(value.to_string())
    } else if is_base64_alphabet(value) {
        Some(data_uri(DEFAULT_MIME, value))
    } else {
        None
    }
}

fn field<'a>(value: &'a Value, names: &[&str]) -> Option<&'a Value> {
    names.iter().find_map(|name| value.get(*name))
}

fn str_field<'a>(value: &'a Value, names: &[&str]) -> Option<&'a str> {
    names
        .iter()
        .find_map(|name| value.get(*name).and_then(Value::as_str))
}

/// `{inline_data: {data, mime_type}}`, in snake or camel case.
fn inline_data_uri(part: &Value) -> Option<String> {
    let inline = field(part, &["inline_data", "inlineData"])?;
    let data = inline.get("data")?.as_str()?;
    if data.starts_with("data:") {
        return Some(data.to_string());
    }
    let mime_type = str_field(inline, &["mime_type", "mimeType"]).unwrap_or(DEFAULT_MIME);
    Some(data_uri(mime_type, data))
}

/// `{data, mime_type}` with both fields present.
fn mime_tagged_data(value: &Value) -> Option<String> {
    let data = value.get("data")?.as_str()?;
    let mime_type = str_field(value, &["mime_type", "mimeType"])?;
    Some(data_uri(mime_type, data))
}

fn assistant_message(response: &Value) -> Option<&Value> {
    response
        .pointer("/choices/0/message")
        .or_else(|| response.get("message"))
}

fn scan_encoded_strings(value: &Value) -> Option<String> {
    match value {
        Value::String(text) if text.starts_with("data:image/") => Some(text.clone()),
        Value::String(text) if is_bare_base64(text) => Some(data_uri(DEFAULT_MIME, text)),
        Value::Array(items) => items.iter().find_map(scan_encoded_strings),
        Value::Object(map) => map.values().find_map(scan_encoded_strings),
        _ => None,
    }
}

fn has_image_indicator(part: &Value) -> bool {
    let typed = matches!(
        part.get("type").and_then(Value::as_str),
        Some("image" | "image_url")
    );
    typed
        || ["image_url", "image", "inline_data"]
            .iter()
            .any(|key| part.get(*key).is_some())
}

fn image_part_reference(part: &Value) -> Option<String> {
    IMAGE_PART_FIELDS.iter().find_map(|pointer| {
        part.pointer(pointer)
            .and_then(Value::as_str)
            .and_then(normalize_reference)
    })
}

fn inspect_content_parts(response: &Value) -> Option<String> {
    let parts = assistant_message(response)?.get("content")?.as_array()?;
    parts.iter().find_map(inline_data_uri).or_else(|| {
        parts
            .iter()
            .filter(|part| has_image_indicator(part))
            .find_map(image_part_reference)
    })
}

fn inspect_content_text(response: &Value) -> Option<String> {
    let content = assistant_message(response)?.get("content")?.as_str()?;
    let data_uri = Regex::new(DATA_URI_PATTERN).ok()?;
    if let Some(found) = data_uri.find(content) {
        return Some(found.as_str().to_string());
    }
    let url = Regex::new(HTTP_URL_PATTERN).ok()?;
    url.find(content).map(|found| found.as_str().to_string())
}

fn message_image_url(response: &Value) -> Option<String> {
    let image_url = assistant_message(response)?.get("image_url")?;
    let reference = match image_url {
        Value::String(url) => url.as_str(),
        other => other.get("url")?.as_str()?,
    };
    normalize_reference(reference)
}

fn data_array(response: &Value) -> Option<String> {
    response
        .get("data")?
        .as_array()?
        .iter()
        .find_map(|entry| {
            str_field(entry, &["url", "b64_json"]).and_then(normalize_reference)
        })
}

fn images_array(response: &Value) -> Option<String> {
    let images = response
        .get("images")
        .or_else(|| assistant_message(response)?.get("images"))?
        .as_array()?;
    images.iter().find_map(|entry| {
        str_field(entry, &["url", "b64_json"])
            .and_then(normalize_reference)
            .or_else(|| mime_tagged_data(entry))
            .or_else(|| {
                entry
                    .pointer("/image_url/url")
                    .and_then(Value::as_str)
                    .and_then(normalize_reference)
            })
    })
}

fn candidate_parts(response: &Value) -> Option<String> {
    let parts = response.pointer("/candidates/0/content/parts")?.as_array()?;
    parts.iter().find_map(inline_data_uri)
}

fn deep_search(response: &Value) -> Option<String> {
    search_depth(response, 0)
}

fn search_depth(value: &Value, depth: usize) -> Option<String> {
    if depth > MAX_DEEP_SEARCH_DEPTH {
        return None;
    }
    match value {
        Value::Object(map) => mime_tagged_data(value)
            .or_else(|| {
                value
                    .get("inline_data")
                    .filter(|inline| inline.get("data").is_some_and(Value::is_string))
                    .and_then(|_| inline_data_uri(value))
            })
            .or_else(|| map.values().find_map(|child| search_depth(child, depth + 1))),
        Value::Array(items) => items
            .iter()
            .find_map(|child| search_depth(child, depth + 1)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn long_base64(seed: char) -> String {
        std::iter::repeat(seed).take(120).collect()
    }

    #[test]
    fn openai_data_array_b64_json() {
        let response = json!({ "data": [ { "b64_json": "QUJD" } ] });
        assert_eq!(
            locate_image(&response).as_deref(),
            Some("data:image/png;base64,QUJD")
        );
    }

    #[test]
    fn openai_data_array_url() {
        let response = json!({ "data": [ { "revised_prompt": "x" }, { "url": "https://cdn.example.com/a.png" } ] });
        assert_eq!(
            locate_image(&response).as_deref(),
            Some("https://cdn.example.com/a.png")
        );
    }

    #[test]
    fn bare_base64_beats_candidates() {
        let top = long_base64('A');
        let response = json!({
            "blob": top,
            "candidates": [ { "content": { "parts": [ { "inline_data": { "data": "Zm9v", "mime_type": "image/jpeg" } } ] } } ]
        });
        assert_eq!(locate_image(&response), Some(format!("data:image/png;base64,{top}")));
    }

    #[test]
    fn candidates_inline_data_keeps_mime_type() {
        let response = json!({
            "candidates": [ { "content": { "parts": [
                { "text": "here you go" },
                { "inline_data": { "data": "Zm9v", "mime_type": "image/jpeg" } }
            ] } } ]
        });
        assert_eq!(locate_image(&response).as_deref(), Some("data:image/jpeg;base64,Zm9v"));
    }

    #[test]
    fn existing_data_uri_is_returned_verbatim() {
        let response = json!({ "choices": [ { "message": { "content": [ { "type": "text", "text": "ok" }, { "url": "data:image/webp;base64,AAAA" } ] } } ] });
        assert_eq!(locate_image(&response).as_deref(), Some("data:image/webp;base64,AAAA"));
    }

    #[test]
    fn content_part_inline_data_defaults_to_png() {
        let response = json!({ "choices": [ { "message": { "content": [
            { "type": "text", "text": "done" },
            { "inline_data": { "data": "Zm9v" } }
        ] } } ] });
        assert_eq!(locate_image(&response).as_deref(), Some("data:image/png;base64,Zm9v"));
    }

    #[test]
    fn content_part_image_url_object() {
        let response = json!({ "choices": [ { "message": { "content": [
            { "type": "image_url", "image_url": { "url": "https://img.example.com/cat.png" } }
        ] } } ] });
        assert_eq!(locate_image(&response).as_deref(), Some("https://img.example.com/cat.png"));
    }

    #[test]
    fn text_content_prefers_embedded_data_uri_over_url() {
        let response = json!({ "choices": [ { "message": {
            "content": "See https://example.com/page or data:image/png;base64,iVBORw0KGgo= for the image"
        } } ] });
        assert_eq!(
            locate_image(&response).as_deref(),
            Some("data:image/png;base64,iVBORw0KGgo=")
        );
    }

    #[test]
    fn text_content_url() {
        let response = json!({ "choices": [ { "message": {
            "content": "Your image: https://cdn.example.com/out/1.png)"
        } } ] });
        assert_eq!(locate_image(&response).as_deref(), Some("https://cdn.example.com/out/1.png"));
    }

    #[test]
    fn message_image_url_field() {
        let response = json!({ "choices": [ { "message": { "content": null, "image_url": { "url": "https://x.example/i.png" } } } ] });
        assert_eq!(locate_image(&response).as_deref(), Some("https://x.example/i.png"));
    }

    #[test]
    fn openrouter_message_images() {
        let response = json!({ "choices": [ { "message": {
            "content": null,
            "images": [ { "type": "image_url", "image_url": { "url": "https://or.example/gen.png" } } ]
        } } ] });
        assert_eq!(locate_image(&response).as_deref(), Some("https://or.example/gen.png"));
    }

    #[test]
    fn images_array_with_mime_tagged_data() {
        let response = json!({ "images": [ { "data": "Zm9v", "mime_type": "image/gif" } ] });
        assert_eq!(locate_image(&response).as_deref(), Some("data:image/gif;base64,Zm9v"));
    }

    #[test]
    fn deep_search_finds_nested_payload() {
        let response = json!({ "result": { "output": [ { "artifact": { "data": "Zm9v", "mime_type": "image/png" } } ] } });
        assert_eq!(locate_image(&response).as_deref(), Some("data:image/png;base64,Zm9v"));
    }

    #[test]
    fn deep_search_is_depth_bounded() {
        let mut nested = json!({ "data": "Zm9v", "mime_type": "image/png" });
        for _ in 0..12 {
            nested = json!({ "wrap": nested });
        }
        assert_eq!(locate_image(&nested), None);
    }

    #[test]
    fn unrecognized_response_has_no_image() {
        let response = json!({
            "id": "gen-1",
            "choices": [ { "message": { "role": "assistant", "content": null } } ],
            "usage": { "total_tokens": 12 }
        });
        assert_eq!(locate_image(&response), None);
        assert_eq!(locate_image(&Value::Null), None);
        assert_eq!(locate_image(&json!("short text")), None);
    }
}
