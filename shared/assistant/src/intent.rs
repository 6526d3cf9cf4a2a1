//! Detection of image-generation requests in chat messages.

/// Phrases that mark a message as an image-generation request.
pub const IMAGE_TRIGGERS: &[&str] = &[
    "create an image",
    "create a image",
    "create a picture",
    "create an illustration",
    "generate an image",
    "generate a image",
    "generate image",
    "generate a picture",
    "make an image",
    "make a picture",
    "draw an image",
    "draw a picture",
    "draw image",
    "paint a picture",
    "design an image",
];

/// Returns `true` when the message asks for an image.
///
/// A message matches when its normalized text starts with, or contains, any
/// of [`IMAGE_TRIGGERS`]. Mentions inside unrelated sentences also match
/// ("create an image editor tool" is an image request).
pub fn is_image_request(message: &str) -> bool {
    let normalized = message.trim().to_lowercase();
    IMAGE_TRIGGERS
        .iter()
        .any(|trigger| normalized.starts_with(trigger) || normalized.contains(trigger))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_leading_trigger() {
        assert!(is_image_request("Create an image of a red fox at sunset"));
        assert!(is_image_request("   GENERATE A PICTURE of mountains  "));
    }

    #[test]
    fn detects_trigger_anywhere() {
        assert!(is_image_request("hey, could you draw a picture of my dog?"));
    }

    #[test]
    fn tangential_mentions_still_match() {
        assert!(is_image_request("can you create an image editor tool"));
    }

    #[test]
    fn plain_chat_is_not_an_image_request() {
        assert!(!is_image_request("hello"));
        assert!(!is_image_request("write me a caption for my beach photo"));
        assert!(!is_image_request("paint something"));
        assert!(!is_image_request(""));
    }

    #[test]
    fn matches_exactly_when_some_trigger_is_contained() {
        let samples = [
            "make an image",
            "I want you to make a picture",
            "image please",
            "draw",
            "generate image now",
            "picture this",
        ];
        for sample in samples {
            let lowered = sample.to_lowercase();
            let expected = IMAGE_TRIGGERS.iter().any(|t| lowered.contains(t));
            assert_eq!(is_image_request(sample), expected, "sample: {sample}");
        }
    }
}
