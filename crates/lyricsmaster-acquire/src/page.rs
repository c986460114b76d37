use ego_tree::NodeRef;
use scraper::{ElementRef, Html, Node, Selector};
use std::ops::Deref;

/// A downloaded page: the raw body and its parsed HTML tree.
///
/// The raw body stays available for sites whose endpoints answer with JSON.
pub struct Page {
    raw: String,
    html: Html,
}

impl Page {
    pub fn parse(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let html = Html::parse_document(&raw);
        Self { raw, html }
    }

    /// Parse a markup snippet such as a stored album entry.
    pub fn fragment(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let html = Html::parse_fragment(&raw);
        Self { raw, html }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn html(&self) -> &Html {
        &self.html
    }

    /// Whether any element matches `css`.
    pub fn has(&self, css: &str) -> bool {
        self.first(css).is_some()
    }

    pub fn first(&self, css: &str) -> Option<ElementRef<'_>> {
        self.html.select(&selector(css)).next()
    }

    pub fn all(&self, css: &str) -> Vec<ElementRef<'_>> {
        self.html.select(&selector(css)).collect()
    }

    /// Every text node of the document, in document order.
    pub fn strings(&self) -> impl Iterator<Item = &str> {
        self.html.root_element().text()
    }
}

/// Compile a selector literal owned by an adapter.
pub fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("valid selector")
}

/// Text content of an element, with `<br>` turned into line breaks and
/// script/ad markup dropped.
pub fn collect_text(element: ElementRef) -> String {
    let mut text = String::new();
    collect_into(*element, &mut text);
    text
}

fn collect_into(node: NodeRef<'_, Node>, text: &mut String) {
    for child in node.children() {
        match child.value() {
            Node::Text(t) => text.push_str(t.deref()),
            Node::Element(elem) => match elem.name() {
                "br" => text.push('\n'),
                "script" | "style" | "ins" => {}
                _ => collect_into(child, text),
            },
            _ => {}
        }
    }
}

/// Visible text of an element, whitespace-trimmed.
pub fn element_text(element: ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Lyrics block text: `<br>`-aware, trailing spaces dropped per line,
/// surrounding blank lines removed. `None` when nothing is left.
pub fn lyrics_text(element: ElementRef) -> Option<String> {
    let text = collect_text(element);
    let text = text
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n");
    let text = text.trim_matches('\n').trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

/// First following sibling element with the given tag name.
pub fn next_sibling_named<'a>(element: ElementRef<'a>, name: &str) -> Option<ElementRef<'a>> {
    element
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .find(|sibling| sibling.value().name() == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_text_handles_br_and_scripts() {
        let page = Page::parse(
            r#"<div class="lyrics">Remember back in the days<br>
            <i>when I was young</i><script>var ad = 1;</script><br/>Don't ask me why</div>"#,
        );
        let div = page.first("div.lyrics").unwrap();
        let text = collect_text(div);
        assert!(text.contains("Remember back in the days\n"));
        assert!(text.contains("when I was young\nDon't ask me why"));
        assert!(!text.contains("var ad"));
    }

    #[test]
    fn test_lyrics_text_trims_and_rejects_empty() {
        let page = Page::parse(
            "<div id='a'>\n  line one   <br>line two  \n</div><div id='b'> <br> </div>",
        );
        assert_eq!(lyrics_text(page.first("#a").unwrap()).as_deref(), Some("line one\nline two"));
        assert_eq!(lyrics_text(page.first("#b").unwrap()), None);
    }

    #[test]
    fn test_page_queries() {
        let page = Page::parse("<ul class='song_title'><li>a</li><li>b</li></ul>");
        assert!(page.has("ul.song_title"));
        assert!(!page.has("div.lyrics"));
        assert_eq!(page.all("li").len(), 2);
        assert!(page.raw().contains("song_title"));
        assert_eq!(page.strings().collect::<String>(), "ab");
    }

    #[test]
    fn test_next_sibling_named() {
        let page = Page::parse("<div><h3 id='x'>Album</h3><p>note</p><ul><li>song</li></ul></div>");
        let heading = page.first("#x").unwrap();
        let list = next_sibling_named(heading, "ul").unwrap();
        assert_eq!(element_text(list), "song");
        assert!(next_sibling_named(heading, "ol").is_none());
    }
}
