use mockup_config::PlaceholderConfig;

/// Longest text rendered onto a placeholder image
const MAX_PLACEHOLDER_TEXT: usize = 80;

/// Builds placeholder image URLs that carry a failure reason
#[derive(Debug, Clone)]
pub struct Placeholder {
    base_url: String,
    width: u32,
    height: u32,
    background: String,
    foreground: String,
}

impl Placeholder {
    pub fn from_config(config: &PlaceholderConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            width: config.width,
            height: config.height,
            background: config.background.clone(),
            foreground: config.foreground.clone(),
        }
    }

    /// Placeholder URL rendering `text` on the image
    pub fn url(&self, text: &str) -> String {
        let text: String = url::form_urlencoded::byte_serialize(truncate_chars(text, MAX_PLACEHOLDER_TEXT).as_bytes()).collect();

        format!(
            "{}/{}x{}/{}/{}?text={text}",
            self.base_url, self.width, self.height, self.background, self.foreground
        )
    }
}

impl Default for Placeholder {
    fn default() -> Self {
        Self::from_config(&PlaceholderConfig::default())
    }
}

/// Cut `text` to at most `max` characters without splitting one
pub(crate) fn truncate_chars(text: &str, max: usize) -> &str {
    text.char_indices().nth(max).map_or(text, |(end, _)| &text[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_service_url() {
        let placeholder = Placeholder::default();
        assert_eq!(
            placeholder.url("API Error: 429"),
            "https://placehold.co/800x600/FF5555/FFFFFF?text=API+Error%3A+429"
        );
    }

    #[test]
    fn configured_service_url() {
        let placeholder = Placeholder::from_config(&PlaceholderConfig {
            base_url: "https://img.example/".to_string(),
            width: 400,
            height: 300,
            background: "000".to_string(),
            foreground: "fff".to_string(),
        });
        assert_eq!(placeholder.url("x"), "https://img.example/400x300/000/fff?text=x");
    }

    #[test]
    fn long_text_is_cut() {
        let url = Placeholder::default().url(&"a".repeat(500));
        let text = url.split_once("?text=").unwrap().1;
        assert_eq!(text.len(), MAX_PLACEHOLDER_TEXT);
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("short", 50), "short");
        assert_eq!(truncate_chars("", 3), "");
    }
}
