//! Walker over Lexical-style rich-text documents.
//!
//! A document is `{"root": {"children": [...]}}` where every node is a JSON
//! object with a `type`. Text leaves carry a `text` string, containers carry
//! a `children` array. Everything else on a node is preserved verbatim.
//!
//! Extraction and reinsertion share one depth-first, pre-order traversal, so
//! the N-th extracted fragment is always the N-th rewritten leaf for an
//! unchanged tree shape.

use serde_json::Value;
use tracing::debug;

use crate::address::{self, Address};
use crate::config::EngineConfig;

const ROOT: &str = "root";
const CHILDREN: &str = "children";
const TEXT: &str = "text";

/// One translatable text leaf, addressed from the document root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RichTextFragment {
    pub address: Address,
    pub text: String,
}

/// Result of writing translations back into one document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReinsertOutcome {
    /// Leaves the traversal found
    pub expected: usize,
    /// Translations handed in
    pub provided: usize,
    /// Leaves actually rewritten
    pub applied: usize,
}

impl ReinsertOutcome {
    pub fn is_mismatch(&self) -> bool {
        self.expected != self.provided
    }
}

enum NodeView<'a> {
    Text { text: &'a str },
    Container { kind: Option<&'a str>, children: &'a [Value] },
    Other,
}

#[derive(Debug, Clone)]
pub struct RichTextWalker {
    text_node_type: String,
    protected_kinds: Vec<String>,
}

impl RichTextWalker {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            text_node_type: config.text_node_type.clone(),
            protected_kinds: config.protected_node_kinds.clone(),
        }
    }

    /// Whether `value` is shaped like a rich-text document
    pub fn is_document(value: &Value) -> bool {
        value
            .get(ROOT)
            .and_then(|root| root.get(CHILDREN))
            .is_some_and(Value::is_array)
    }

    fn view<'a>(&self, node: &'a Value) -> NodeView<'a> {
        let kind = node.get("type").and_then(Value::as_str);

        if kind == Some(self.text_node_type.as_str()) {
            if let Some(text) = node.get(TEXT).and_then(Value::as_str) {
                return NodeView::Text { text };
            }
        }

        match node.get(CHILDREN).and_then(Value::as_array) {
            Some(children) => NodeView::Container { kind, children },
            None => NodeView::Other,
        }
    }

    fn is_protected(&self, kind: Option<&str>) -> bool {
        kind.is_some_and(|k| self.protected_kinds.iter().any(|p| p == k))
    }

    /// Every non-blank text leaf outside a protected container, in document order
    pub fn extract(&self, document: &Value) -> Vec<RichTextFragment> {
        let mut fragments = Vec::new();
        if let Some(root) = document.get(ROOT).filter(|_| Self::is_document(document)) {
            self.visit(root, &Address::root().child(ROOT), None, &mut fragments);
        }
        fragments
    }

    fn visit(
        &self,
        node: &Value,
        address: &Address,
        parent_kind: Option<&str>,
        fragments: &mut Vec<RichTextFragment>,
    ) {
        match self.view(node) {
            NodeView::Text { text } => {
                if text.trim().is_empty() {
                    return;
                }
                if self.is_protected(parent_kind) {
                    debug!("Skipping protected text at {}", address);
                    return;
                }
                fragments.push(RichTextFragment {
                    address: address.clone(),
                    text: text.to_string(),
                });
            }
            NodeView::Container { kind, children } => {
                let base = address.child(CHILDREN);
                for (i, child) in children.iter().enumerate() {
                    self.visit(child, &base.child(i), kind, fragments);
                }
            }
            NodeView::Other => {}
        }
    }

    /// Rewrite leaf texts in extraction order with `translations`.
    ///
    /// Leaves past the end of `translations` keep their original text and
    /// surplus translations are ignored; both show up in the outcome.
    pub fn reinsert(&self, document: &mut Value, translations: &[String]) -> ReinsertOutcome {
        let fragments = self.extract(document);
        let mut outcome = ReinsertOutcome {
            expected: fragments.len(),
            provided: translations.len(),
            applied: 0,
        };

        for (fragment, translation) in fragments.iter().zip(translations) {
            let text_address = fragment.address.child(TEXT);
            match address::write(document, &text_address, Value::String(translation.clone())) {
                Ok(()) => outcome.applied += 1,
                Err(e) => debug!("Skipping rich-text leaf: {}", e),
            }
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn walker() -> RichTextWalker {
        RichTextWalker::new(&EngineConfig::default())
    }

    fn text(t: &str) -> Value {
        json!({"type": "text", "text": t, "format": 0, "detail": 0, "mode": "normal", "style": "", "version": 1})
    }

    fn paragraph(children: Vec<Value>) -> Value {
        json!({"type": "paragraph", "children": children, "direction": "ltr", "format": "", "indent": 0, "version": 1})
    }

    fn document(children: Vec<Value>) -> Value {
        json!({"root": {"type": "root", "children": children, "direction": "ltr", "format": "", "indent": 0, "version": 1}})
    }

    fn addresses(fragments: &[RichTextFragment]) -> Vec<String> {
        fragments.iter().map(|f| f.address.to_string()).collect()
    }

    #[test]
    fn test_extract_skips_blank_leaves_in_order() {
        let doc = document(vec![paragraph(vec![text("Hi"), text("")]), text("There")]);
        let fragments = walker().extract(&doc);

        assert_eq!(
            addresses(&fragments),
            vec!["root.children.0.children.0", "root.children.1"]
        );
        assert_eq!(fragments[0].text, "Hi");
        assert_eq!(fragments[1].text, "There");
    }

    #[test]
    fn test_whitespace_only_leaf_is_skipped() {
        let doc = document(vec![paragraph(vec![text("  \n\t"), text("Kept")])]);
        let fragments = walker().extract(&doc);
        assert_eq!(addresses(&fragments), vec!["root.children.0.children.1"]);
    }

    #[test]
    fn test_autolink_text_is_protected() {
        let autolink = json!({
            "type": "autolink",
            "fields": {"url": "https://example.com", "linkType": "custom"},
            "children": [text("https://example.com")]
        });
        let link = json!({
            "type": "link",
            "fields": {"url": "https://example.com"},
            "children": [text("our site")]
        });
        let doc = document(vec![paragraph(vec![text("Visit "), autolink, link])]);

        let fragments = walker().extract(&doc);
        let texts: Vec<&str> = fragments.iter().map(|f| f.text.as_str()).collect();
        assert_eq!(texts, vec!["Visit ", "our site"]);
    }

    #[test]
    fn test_not_a_document_yields_nothing() {
        assert!(walker().extract(&json!("plain string")).is_empty());
        assert!(walker().extract(&json!({"root": {"type": "root"}})).is_empty());
        assert!(!RichTextWalker::is_document(&json!({"children": []})));
    }

    #[test]
    fn test_reinsert_preserves_structure_and_attributes() {
        let bold = json!({"type": "text", "text": "world", "format": 1, "detail": 0, "mode": "normal", "style": "", "version": 1});
        let list = json!({
            "type": "list", "listType": "bullet", "tag": "ul",
            "children": [{"type": "listitem", "value": 1, "children": [text("item")]}]
        });
        let original = document(vec![paragraph(vec![text("Hello "), bold]), list]);

        let mut translated = original.clone();
        let outcome = walker().reinsert(
            &mut translated,
            &["Bonjour ".to_string(), "monde".to_string(), "élément".to_string()],
        );

        assert_eq!(outcome, ReinsertOutcome { expected: 3, provided: 3, applied: 3 });
        assert!(!outcome.is_mismatch());

        let mut expected = original.clone();
        expected["root"]["children"][0]["children"][0]["text"] = json!("Bonjour ");
        expected["root"]["children"][0]["children"][1]["text"] = json!("monde");
        expected["root"]["children"][1]["children"][0]["children"][0]["text"] = json!("élément");
        assert_eq!(translated, expected);
    }

    #[test]
    fn test_reinsert_never_touches_protected_text() {
        let autolink = json!({"type": "autolink", "children": [text("https://example.com")]});
        let original = document(vec![paragraph(vec![autolink, text("see above")])]);

        let mut translated = original.clone();
        let outcome = walker().reinsert(&mut translated, &["voir ci-dessus".to_string()]);

        assert_eq!(outcome.applied, 1);
        assert_eq!(
            translated["root"]["children"][0]["children"][0]["children"][0]["text"],
            "https://example.com"
        );
        assert_eq!(translated["root"]["children"][0]["children"][1]["text"], "voir ci-dessus");
    }

    #[test]
    fn test_reinsert_short_translation_list_keeps_tail() {
        let original = document(vec![paragraph(vec![text("one"), text("two")])]);

        let mut translated = original.clone();
        let outcome = walker().reinsert(&mut translated, &["uno".to_string()]);

        assert_eq!(outcome, ReinsertOutcome { expected: 2, provided: 1, applied: 1 });
        assert!(outcome.is_mismatch());
        assert_eq!(translated["root"]["children"][0]["children"][0]["text"], "uno");
        assert_eq!(translated["root"]["children"][0]["children"][1]["text"], "two");
    }

    #[test]
    fn test_reinsert_with_original_texts_is_identity() {
        let original = document(vec![
            paragraph(vec![text("a"), json!({"type": "linebreak", "version": 1}), text("b")]),
            json!({"type": "heading", "tag": "h2", "children": [text("c")]}),
        ]);
        let texts: Vec<String> = walker().extract(&original).into_iter().map(|f| f.text).collect();

        let mut round_trip = original.clone();
        walker().reinsert(&mut round_trip, &texts);
        assert_eq!(round_trip, original);
    }

    #[test]
    fn test_custom_protected_kinds() {
        let config = EngineConfig {
            protected_node_kinds: vec!["code".to_string()],
            ..EngineConfig::default()
        };
        let doc = document(vec![
            json!({"type": "code", "children": [text("let x = 1;")]}),
            paragraph(vec![text("prose")]),
        ]);

        let fragments = RichTextWalker::new(&config).extract(&doc);
        assert_eq!(addresses(&fragments), vec!["root.children.1.children.0"]);
    }
}
