//! Flattened, document-ordered views over a parsed HTML tree.
//!
//! The extractor never queries the DOM with selectors. It walks these flat
//! views instead, which keeps every heuristic first-match in document order.

use std::borrow::Cow;

use scraper::{ElementRef, Html, Node};

/// An element paired with the text the label filters look at.
#[derive(Debug, Clone)]
pub struct Candidate<'a> {
    pub element: ElementRef<'a>,
    /// All descendant text, like `textContent`.
    pub text: String,
    /// Only the element's own child text nodes.
    pub direct_text: String,
}

/// Every element in the document, root first, in document order.
pub fn flatten(doc: &Html) -> impl Iterator<Item = Candidate<'_>> {
    doc.root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .map(|element| Candidate {
            element,
            text: text_content(element),
            direct_text: direct_text(element),
        })
}

/// Concatenated text of all descendant text nodes.
pub fn text_content(element: ElementRef<'_>) -> String {
    element.text().collect()
}

/// Concatenated text of the element's immediate text children.
pub fn direct_text(element: ElementRef<'_>) -> String {
    element
        .children()
        .filter_map(|child| match child.value() {
            Node::Text(t) => Some(&**t),
            _ => None,
        })
        .collect()
}

/// The element itself or its nearest ancestor whose tag is in `tags`.
pub fn closest<'a>(element: ElementRef<'a>, tags: &[&str]) -> Option<ElementRef<'a>> {
    std::iter::once(element)
        .chain(element.ancestors().filter_map(ElementRef::wrap))
        .find(|e| tags.contains(&e.value().name()))
}

/// Following element siblings, nearest first.
pub fn next_element_siblings<'a>(
    element: ElementRef<'a>,
) -> impl Iterator<Item = ElementRef<'a>> + 'a {
    element.next_siblings().filter_map(ElementRef::wrap)
}

/// The `<body>` element, falling back to the document root.
pub fn body(doc: &Html) -> ElementRef<'_> {
    let root = doc.root_element();
    root.children()
        .filter_map(ElementRef::wrap)
        .find(|e| e.value().name() == "body")
        .unwrap_or(root)
}

/// A node visited by [`walk`].
#[derive(Debug, Clone)]
pub enum DomNode<'a> {
    Element(ElementRef<'a>),
    Text {
        text: &'a str,
        parent: Option<ElementRef<'a>>,
    },
}

impl<'a> DomNode<'a> {
    /// Text content of the node.
    pub fn text(&self) -> Cow<'a, str> {
        match self {
            DomNode::Element(e) => Cow::Owned(text_content(*e)),
            DomNode::Text { text, .. } => Cow::Borrowed(*text),
        }
    }

    /// The node itself if it is an element, else its parent element.
    pub fn enclosing_element(&self) -> Option<ElementRef<'a>> {
        match self {
            DomNode::Element(e) => Some(*e),
            DomNode::Text { parent, .. } => *parent,
        }
    }
}

/// Element and text nodes below `root` in document order, `root` excluded.
pub fn walk<'a>(root: ElementRef<'a>) -> impl Iterator<Item = DomNode<'a>> + 'a {
    root.descendants().skip(1).filter_map(|node| match node.value() {
        Node::Element(_) => ElementRef::wrap(node).map(DomNode::Element),
        Node::Text(t) => Some(DomNode::Text {
            text: &**t,
            parent: node.parent().and_then(ElementRef::wrap),
        }),
        _ => None,
    })
}

/// First `max` characters of the trimmed text, for log lines.
pub fn preview(text: &str, max: usize) -> String {
    text.trim().chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(doc: &Html) -> Vec<String> {
        flatten(doc)
            .map(|c| c.element.value().name().to_string())
            .collect()
    }

    #[test]
    fn test_flatten_is_document_order() {
        let doc = Html::parse_document("<div><p>a</p><span>b</span></div><em>c</em>");
        assert_eq!(
            names(&doc),
            vec!["html", "head", "body", "div", "p", "span", "em"]
        );
    }

    #[test]
    fn test_direct_text_excludes_children() {
        let doc = Html::parse_document("<div id=x>outer <b>inner</b> tail</div>");
        let div = flatten(&doc)
            .find(|c| c.element.value().name() == "div")
            .unwrap();
        assert_eq!(div.text, "outer inner tail");
        assert_eq!(div.direct_text, "outer  tail");
    }

    #[test]
    fn test_closest_includes_self() {
        let doc = Html::parse_document("<section><span><i>y</i></span></section>");
        let i = flatten(&doc)
            .find(|c| c.element.value().name() == "i")
            .unwrap()
            .element;
        let found = closest(i, &["section"]).unwrap();
        assert_eq!(found.value().name(), "section");

        let section = found;
        assert_eq!(
            closest(section, &["section"]).unwrap().value().name(),
            "section"
        );
        assert!(closest(i, &["table"]).is_none());
    }

    #[test]
    fn test_walk_yields_text_and_elements() {
        let doc = Html::parse_document("<p>one</p>two");
        let kinds: Vec<String> = walk(body(&doc))
            .map(|n| match n {
                DomNode::Element(e) => format!("<{}>", e.value().name()),
                DomNode::Text { text, .. } => text.to_string(),
            })
            .collect();
        assert_eq!(kinds, vec!["<p>", "one", "two"]);
    }

    #[test]
    fn test_text_node_encloses_in_parent() {
        let doc = Html::parse_document("<span>hello</span>");
        let node = walk(body(&doc)).nth(1).unwrap();
        assert_eq!(node.text(), "hello");
        assert_eq!(node.enclosing_element().unwrap().value().name(), "span");
    }

    #[test]
    fn test_next_element_siblings_skip_text() {
        let doc = Html::parse_document("<a>1</a> gap <b>2</b><c>3</c>");
        let a = flatten(&doc)
            .find(|c| c.element.value().name() == "a")
            .unwrap()
            .element;
        let sibs: Vec<&str> = next_element_siblings(a).map(|e| e.value().name()).collect();
        assert_eq!(sibs, vec!["b", "c"]);
    }

    #[test]
    fn test_preview_is_char_safe() {
        assert_eq!(preview("  £££££  ", 3), "£££");
    }
}
