use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::address::Address;
use crate::config::EngineConfig;
use crate::richtext::RichTextWalker;
use crate::schema::{find_variant, FieldSchemaNode, LeafKind};

/// What kind of value a fragment was read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FragmentKind {
    Text,
    Textarea,
    RichTextFragment,
}

/// One piece of text to translate, and where it goes back
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslatableField {
    /// Address of the field inside the document
    pub address: Address,
    pub kind: FragmentKind,
    /// Address of the text leaf inside the rich-text value, for rich-text fragments
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_rich_text_address: Option<Address>,
    pub text: String,
}

/// Texts of `fields` in order, as sent to the provider
pub fn texts(fields: &[TranslatableField]) -> Vec<String> {
    fields.iter().map(|f| f.text.clone()).collect()
}

/// Walks a field schema together with a document and collects translatable text
#[derive(Debug, Clone)]
pub struct Extractor {
    discriminator_key: String,
    walker: RichTextWalker,
}

impl Extractor {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            discriminator_key: config.discriminator_key.clone(),
            walker: RichTextWalker::new(config),
        }
    }

    /// Collect fragments in schema declaration order, array items by ascending index.
    ///
    /// The result is a pure function of `(fields, document)`; translations are
    /// matched back to it by position.
    pub fn extract(&self, fields: &[FieldSchemaNode], document: &Value) -> Vec<TranslatableField> {
        let mut out = Vec::new();
        self.extract_into(fields, document, &Address::root(), &mut out);
        debug!("Extracted {} translatable fragment(s)", out.len());
        out
    }

    fn extract_into(
        &self,
        fields: &[FieldSchemaNode],
        data: &Value,
        base: &Address,
        out: &mut Vec<TranslatableField>,
    ) {
        for field in fields {
            match field {
                FieldSchemaNode::LayoutWrapper { fields } => {
                    self.extract_into(fields, data, base, out);
                }
                FieldSchemaNode::Group { name, fields } => {
                    if let Some(group) = data.get(name).filter(|v| v.is_object()) {
                        self.extract_into(fields, group, &base.child(name.as_str()), out);
                    }
                }
                FieldSchemaNode::ArrayOf { name, fields } => {
                    let Some(items) = data.get(name).and_then(Value::as_array) else {
                        continue;
                    };
                    let array_base = base.child(name.as_str());
                    for (i, item) in items.iter().enumerate().filter(|(_, item)| item.is_object()) {
                        self.extract_into(fields, item, &array_base.child(i), out);
                    }
                }
                FieldSchemaNode::TaggedBlockUnion { name, variants } => {
                    let Some(items) = data.get(name).and_then(Value::as_array) else {
                        continue;
                    };
                    let array_base = base.child(name.as_str());
                    for (i, item) in items.iter().enumerate() {
                        let Some(slug) = item.get(&self.discriminator_key).and_then(Value::as_str)
                        else {
                            debug!("Block {}.{} has no {}", array_base, i, self.discriminator_key);
                            continue;
                        };
                        match find_variant(variants, slug) {
                            Some(variant) => {
                                self.extract_into(&variant.fields, item, &array_base.child(i), out);
                            }
                            None => warn!("Skipping block {}.{}: unknown block type '{}'", array_base, i, slug),
                        }
                    }
                }
                FieldSchemaNode::Leaf { name, kind, translatable: true } => {
                    if let Some(value) = data.get(name) {
                        self.extract_leaf(*kind, value, base.child(name.as_str()), out);
                    }
                }
                FieldSchemaNode::Leaf { translatable: false, .. } | FieldSchemaNode::Opaque => {}
            }
        }
    }

    fn extract_leaf(
        &self,
        kind: LeafKind,
        value: &Value,
        address: Address,
        out: &mut Vec<TranslatableField>,
    ) {
        let fragment_kind = match kind {
            LeafKind::Text => FragmentKind::Text,
            LeafKind::Textarea => FragmentKind::Textarea,
            LeafKind::RichText => {
                for fragment in self.walker.extract(value) {
                    out.push(TranslatableField {
                        address: address.clone(),
                        kind: FragmentKind::RichTextFragment,
                        local_rich_text_address: Some(fragment.address),
                        text: fragment.text,
                    });
                }
                return;
            }
        };

        match value.as_str() {
            Some(text) if !text.trim().is_empty() => out.push(TranslatableField {
                address,
                kind: fragment_kind,
                local_rich_text_address: None,
                text: text.to_string(),
            }),
            _ => {}
        }
    }
}
