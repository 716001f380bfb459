use crate::core::types::Digest;
use ammonia::clean_text;

const STYLE: &str = "body{font-family:sans-serif;max-width:48rem;margin:2rem auto;padding:0 1rem}\
.error{color:#a40000}li{margin-bottom:.5rem}";

/// What the page shows below the form.
#[derive(Debug, Default)]
pub struct PageView<'a> {
    pub topic: Option<&'a str>,
    pub summary: &'a [String],
    pub urls_found: &'a [String],
    pub error: Option<&'a str>,
}

impl<'a> From<&'a Digest> for PageView<'a> {
    fn from(digest: &'a Digest) -> Self {
        Self {
            topic: Some(&digest.topic),
            summary: &digest.entry.summary,
            urls_found: &digest.entry.urls_found,
            error: digest.entry.error.as_deref(),
        }
    }
}

impl<'a> PageView<'a> {
    pub fn error(topic: Option<&'a str>, message: &'a str) -> Self {
        Self {
            topic,
            error: Some(message),
            ..Default::default()
        }
    }
}

/// Full HTML document: the topic form followed by the result, if any.
/// Every piece of user or page derived text is escaped.
pub fn render_page(view: &PageView<'_>) -> String {
    let mut html = String::with_capacity(2048);
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str("<title>Topic Digest</title>\n<style>");
    html.push_str(STYLE);
    html.push_str("</style>\n</head>\n<body>\n<h1>Topic Digest</h1>\n");

    let value = view.topic.map(clean_text).unwrap_or_default();
    html.push_str(&format!(
        "<form method=\"post\" action=\"/\">\n<input type=\"text\" name=\"topic\" value=\"{}\" placeholder=\"Enter a topic\" required>\n<button type=\"submit\">Summarize</button>\n</form>\n",
        value
    ));

    if let Some(error) = view.error {
        html.push_str(&format!("<p class=\"error\">{}</p>\n", clean_text(error)));
    }

    if !view.summary.is_empty() {
        if let Some(topic) = view.topic {
            html.push_str(&format!("<h2>Summary for &quot;{}&quot;</h2>\n", clean_text(topic)));
        }
        html.push_str("<ul class=\"summary\">\n");
        for sentence in view.summary {
            html.push_str(&format!("<li>{}</li>\n", clean_text(sentence)));
        }
        html.push_str("</ul>\n");
    }

    if !view.urls_found.is_empty() {
        html.push_str("<h3>Sources</h3>\n<ul class=\"sources\">\n");
        for url in view.urls_found {
            let url = clean_text(url);
            html.push_str(&format!("<li><a href=\"{url}\" rel=\"noopener\">{url}</a></li>\n"));
        }
        html.push_str("</ul>\n");
    }

    html.push_str("</body>\n</html>\n");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::CacheEntry;

    #[test]
    fn empty_view_is_just_the_form() {
        let html = render_page(&PageView::default());
        assert!(html.contains("name=\"topic\""));
        assert!(!html.contains("class=\"error\""));
        assert!(!html.contains("class=\"summary\""));
    }

    #[test]
    fn digest_renders_sentences_sources_and_error() {
        let digest = Digest {
            topic: "rust".to_string(),
            entry: CacheEntry {
                summary: vec!["Rust is fast.".to_string(), "Rust is safe.".to_string()],
                error: Some("partial".to_string()),
                urls_found: vec!["https://www.rust-lang.org/".to_string()],
            },
            cached: false,
        };
        let html = render_page(&PageView::from(&digest));
        // clean_text encodes spaces and slashes as numeric entities.
        assert!(html.contains(&format!("<li>{}</li>", clean_text("Rust is fast."))));
        assert!(html.contains(&format!("<li>{}</li>", clean_text("Rust is safe."))));
        assert!(html.contains("rust-lang.org"));
        assert!(html.contains("<p class=\"error\">partial</p>"));
    }

    #[test]
    fn user_text_is_escaped() {
        let html = render_page(&PageView::error(Some("<script>alert(1)</script>"), "Please enter a topic."));
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }
}
