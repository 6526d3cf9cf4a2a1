//! Extraction of the subject to render from an image request.

/// Request prefixes, checked in order. The first one found anywhere in the
/// message wins, so longer phrasings come before their suffixes.
pub const PROMPT_PREFIXES: &[&str] = &[
    "create an image of",
    "create a image of",
    "create a picture of",
    "create an illustration of",
    "generate an image of",
    "generate a image of",
    "generate image of",
    "generate a picture of",
    "make an image of",
    "make a picture of",
    "draw an image of",
    "draw a picture of",
    "draw image of",
    "paint a picture of",
    "design an image of",
    "image of",
    "picture of",
];

/// Returns the image subject for a message classified as an image request.
///
/// The result keeps the original casing and is never empty: when nothing
/// usable follows a matched prefix the whole message is returned.
pub fn extract_image_prompt(message: &str) -> String {
    // ASCII lowercasing keeps byte offsets aligned with `message`.
    let lowered = message.to_ascii_lowercase();

    let extracted = PROMPT_PREFIXES
        .iter()
        .find_map(|prefix| lowered.find(prefix).map(|start| start + prefix.len()))
        .or_else(|| {
            if lowered.contains("image") {
                lowered.find("of").map(|start| start + "of".len())
            } else {
                None
            }
        })
        .map(|end| message[end..].trim());

    match extracted {
        Some(prompt) if !prompt.is_empty() => prompt.to_string(),
        _ => message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_leading_request_phrase() {
        assert_eq!(
            extract_image_prompt("Create an image of a red fox at sunset"),
            "a red fox at sunset"
        );
    }

    #[test]
    fn prefix_may_appear_mid_sentence() {
        assert_eq!(
            extract_image_prompt("Hey, please Draw A Picture Of My Cat Luna "),
            "My Cat Luna"
        );
    }

    #[test]
    fn earlier_list_entries_take_priority() {
        // both "generate an image of" and "image of" occur; the longer entry is listed first
        assert_eq!(
            extract_image_prompt("generate an image of an image of a cat"),
            "an image of a cat"
        );
    }

    #[test]
    fn falls_back_to_text_after_first_of() {
        assert_eq!(
            extract_image_prompt("an image made out of Clouds"),
            "Clouds"
        );
    }

    #[test]
    fn unrecognized_text_is_returned_unchanged() {
        assert_eq!(extract_image_prompt("paint something"), "paint something");
    }

    #[test]
    fn empty_extraction_uses_full_message() {
        assert_eq!(
            extract_image_prompt("create an image of   "),
            "create an image of   "
        );
    }
}
