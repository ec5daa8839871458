use harvest_core::error::AppError;
use harvest_core::models::{SelectedElement, normalize_tag};
use harvest_core::traits::ElementSelector;
use scraper::{ElementRef, Html};

/// Element selector backed by `scraper` (html5ever).
///
/// Matches by element name only, never by CSS selector, so input such as
/// `div > p` or `*` simply finds nothing.
#[derive(Debug, Clone, Default)]
pub struct ScraperSelector;

impl ScraperSelector {
    pub fn new() -> Self {
        Self
    }
}

impl ElementSelector for ScraperSelector {
    fn select(&self, markup: &str, tag: &str) -> Result<Vec<SelectedElement>, AppError> {
        let tag = normalize_tag(tag);
        if !is_plain_tag_name(&tag) {
            tracing::debug!(%tag, "Not a plain tag name, nothing to match");
            return Ok(Vec::new());
        }

        let document = Html::parse_document(markup);
        let matches = document
            .root_element()
            .descendants()
            .filter_map(ElementRef::wrap)
            .filter(|el| el.value().name() == tag)
            .map(|el| SelectedElement {
                html: el.html(),
                text: stripped_text(el),
            })
            .collect();

        Ok(matches)
    }
}

fn is_plain_tag_name(tag: &str) -> bool {
    !tag.is_empty()
        && tag.starts_with(|c: char| c.is_ascii_alphabetic())
        && tag.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

/// Every text node trimmed, empty ones dropped, joined with no separator.
fn stripped_text(el: ElementRef<'_>) -> String {
    el.text().map(str::trim).filter(|t| !t.is_empty()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
          <p>a</p>
          <div><p> b </p></div>
          <p>  c<span> d </span></p>
          <table><tr><th>A</th></tr><tr><td>1</td></tr></table>
          <TABLE><tr><td>2</td></tr></TABLE>
        </body></html>"#;

    #[test]
    fn test_matches_in_document_order() {
        let found = ScraperSelector::new().select(PAGE, "p").unwrap();
        let texts: Vec<_> = found.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, ["a", "b", "cd"]);
    }

    #[test]
    fn test_tag_is_case_insensitive() {
        let found = ScraperSelector::new().select(PAGE, "TABLE").unwrap();
        assert_eq!(found.len(), 2);
        assert!(found[0].html.starts_with("<table>"));
        assert!(found[0].html.contains("<th>A</th>"));
    }

    #[test]
    fn test_no_matches_is_empty() {
        let found = ScraperSelector::new().select(PAGE, "article").unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn test_css_syntax_matches_nothing() {
        let selector = ScraperSelector::new();
        assert!(selector.select(PAGE, "div > p").unwrap().is_empty());
        assert!(selector.select(PAGE, "*").unwrap().is_empty());
        assert!(selector.select(PAGE, "").unwrap().is_empty());
    }

    #[test]
    fn test_nested_tables_are_all_matched() {
        let page = "<table><tr><td><table><tr><td>in</td></tr></table></td></tr></table>";
        let found = ScraperSelector::new().select(page, "table").unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(found[1].text, "in");
    }
}
