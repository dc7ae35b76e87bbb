use serde::Deserialize;
use std::path::Path;

use crate::error::{Result, RelocaleError};

/// Kind of a scalar text field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeafKind {
    Text,
    Textarea,
    RichText,
}

/// One position of a collection's field schema
#[derive(Debug, Clone, PartialEq)]
pub enum FieldSchemaNode {
    /// Text-bearing field; only these ever yield fragments
    Leaf {
        name: String,
        kind: LeafKind,
        translatable: bool,
    },
    /// Named object holding nested fields
    Group {
        name: String,
        fields: Vec<FieldSchemaNode>,
    },
    /// Named array whose every item follows `fields`
    ArrayOf {
        name: String,
        fields: Vec<FieldSchemaNode>,
    },
    /// Named array of blocks, each item selecting a variant by discriminator
    TaggedBlockUnion {
        name: String,
        variants: Vec<BlockVariant>,
    },
    /// Row, collapsible or tab container; adds nothing to the address
    LayoutWrapper { fields: Vec<FieldSchemaNode> },
    /// Anything that cannot carry translatable text
    Opaque,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BlockVariant {
    pub slug: String,
    pub fields: Vec<FieldSchemaNode>,
}

/// Field schema of one collection
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CollectionSchema {
    pub slug: String,
    pub fields: Vec<FieldSchemaNode>,
}

impl FieldSchemaNode {
    pub fn text(name: &str, translatable: bool) -> Self {
        Self::Leaf { name: name.to_string(), kind: LeafKind::Text, translatable }
    }

    pub fn textarea(name: &str, translatable: bool) -> Self {
        Self::Leaf { name: name.to_string(), kind: LeafKind::Textarea, translatable }
    }

    pub fn rich_text(name: &str, translatable: bool) -> Self {
        Self::Leaf { name: name.to_string(), kind: LeafKind::RichText, translatable }
    }

    pub fn group(name: &str, fields: Vec<FieldSchemaNode>) -> Self {
        Self::Group { name: name.to_string(), fields }
    }

    pub fn array(name: &str, fields: Vec<FieldSchemaNode>) -> Self {
        Self::ArrayOf { name: name.to_string(), fields }
    }

    pub fn blocks(name: &str, variants: Vec<BlockVariant>) -> Self {
        Self::TaggedBlockUnion { name: name.to_string(), variants }
    }

    pub fn layout(fields: Vec<FieldSchemaNode>) -> Self {
        Self::LayoutWrapper { fields }
    }
}

impl BlockVariant {
    pub fn new(slug: &str, fields: Vec<FieldSchemaNode>) -> Self {
        Self { slug: slug.to_string(), fields }
    }
}

/// Look up the variant selected by `slug`
pub fn find_variant<'a>(variants: &'a [BlockVariant], slug: &str) -> Option<&'a BlockVariant> {
    variants.iter().find(|v| v.slug == slug)
}

impl CollectionSchema {
    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content)
            .map_err(|e| RelocaleError::Schema(format!("Failed to parse collection schema: {}", e)))
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }
}

// Host field configuration as it appears in a collection config export
#[derive(Debug, Deserialize)]
struct RawField {
    name: Option<String>,
    #[serde(rename = "type")]
    field_type: String,
    #[serde(default)]
    localized: bool,
    #[serde(default)]
    fields: Vec<FieldSchemaNode>,
    #[serde(default)]
    blocks: Vec<RawBlock>,
    #[serde(default)]
    tabs: Vec<RawTab>,
}

#[derive(Debug, Deserialize)]
struct RawBlock {
    slug: String,
    #[serde(default)]
    fields: Vec<FieldSchemaNode>,
}

#[derive(Debug, Deserialize)]
struct RawTab {
    name: Option<String>,
    #[serde(default)]
    fields: Vec<FieldSchemaNode>,
}

impl<'de> Deserialize<'de> for FieldSchemaNode {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = RawField::deserialize(deserializer)?;
        FieldSchemaNode::try_from(raw).map_err(serde::de::Error::custom)
    }
}

impl TryFrom<RawField> for FieldSchemaNode {
    type Error = String;

    fn try_from(raw: RawField) -> std::result::Result<Self, Self::Error> {
        let RawField { name, field_type, localized, fields, blocks, tabs } = raw;

        let node = match (field_type.as_str(), name) {
            ("text", Some(name)) => Self::Leaf { name, kind: LeafKind::Text, translatable: localized },
            ("textarea", Some(name)) => {
                Self::Leaf { name, kind: LeafKind::Textarea, translatable: localized }
            }
            ("richText", Some(name)) => {
                Self::Leaf { name, kind: LeafKind::RichText, translatable: localized }
            }
            ("group", Some(name)) => Self::Group { name, fields },
            ("array", Some(name)) => Self::ArrayOf { name, fields },
            ("blocks", Some(name)) => Self::TaggedBlockUnion {
                name,
                variants: blocks
                    .into_iter()
                    .map(|b| BlockVariant { slug: b.slug, fields: b.fields })
                    .collect(),
            },
            ("array" | "blocks", None) => {
                return Err(format!("'{}' field is missing a name", field_type));
            }
            ("tabs", _) => Self::LayoutWrapper {
                fields: tabs
                    .into_iter()
                    .map(|tab| match tab.name {
                        Some(name) => Self::Group { name, fields: tab.fields },
                        None => Self::LayoutWrapper { fields: tab.fields },
                    })
                    .collect(),
            },
            (_, None) if !fields.is_empty() => Self::LayoutWrapper { fields },
            _ => Self::Opaque,
        };

        Ok(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> FieldSchemaNode {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_text_leaves() {
        assert_eq!(
            parse(json!({"name": "title", "type": "text", "localized": true})),
            FieldSchemaNode::text("title", true)
        );
        assert_eq!(
            parse(json!({"name": "excerpt", "type": "textarea"})),
            FieldSchemaNode::textarea("excerpt", false)
        );
        assert_eq!(
            parse(json!({"name": "content", "type": "richText", "localized": true})),
            FieldSchemaNode::rich_text("content", true)
        );
    }

    #[test]
    fn test_non_text_fields_are_opaque() {
        assert_eq!(parse(json!({"name": "views", "type": "number", "localized": true})), FieldSchemaNode::Opaque);
        assert_eq!(parse(json!({"type": "ui"})), FieldSchemaNode::Opaque);
    }

    #[test]
    fn test_row_and_collapsible_are_layout() {
        let row = parse(json!({
            "type": "row",
            "fields": [{"name": "title", "type": "text", "localized": true}]
        }));
        assert_eq!(row, FieldSchemaNode::layout(vec![FieldSchemaNode::text("title", true)]));

        let collapsible = parse(json!({
            "type": "collapsible",
            "label": "More",
            "fields": [{"name": "note", "type": "text"}]
        }));
        assert!(matches!(collapsible, FieldSchemaNode::LayoutWrapper { .. }));
    }

    #[test]
    fn test_named_tabs_become_groups() {
        let tabs = parse(json!({
            "type": "tabs",
            "tabs": [
                {"label": "Content", "fields": [{"name": "title", "type": "text", "localized": true}]},
                {"name": "seo", "fields": [{"name": "description", "type": "textarea", "localized": true}]}
            ]
        }));

        assert_eq!(
            tabs,
            FieldSchemaNode::layout(vec![
                FieldSchemaNode::layout(vec![FieldSchemaNode::text("title", true)]),
                FieldSchemaNode::group("seo", vec![FieldSchemaNode::textarea("description", true)]),
            ])
        );
    }

    #[test]
    fn test_blocks_keep_declaration_order() {
        let blocks = parse(json!({
            "name": "layout",
            "type": "blocks",
            "blocks": [
                {"slug": "hero", "fields": [{"name": "heading", "type": "text", "localized": true}]},
                {"slug": "quote", "fields": [{"name": "body", "type": "textarea", "localized": true}]}
            ]
        }));

        let FieldSchemaNode::TaggedBlockUnion { name, variants } = blocks else {
            panic!("expected blocks");
        };
        assert_eq!(name, "layout");
        assert_eq!(variants.iter().map(|v| v.slug.as_str()).collect::<Vec<_>>(), vec!["hero", "quote"]);
        assert!(find_variant(&variants, "quote").is_some());
        assert!(find_variant(&variants, "gallery").is_none());
    }

    #[test]
    fn test_unnamed_array_is_rejected() {
        let result: std::result::Result<FieldSchemaNode, _> =
            serde_json::from_value(json!({"type": "array", "fields": []}));
        assert!(result.is_err());
    }

    #[test]
    fn test_collection_schema_from_json() {
        let schema = CollectionSchema::from_json(
            r#"{
                "slug": "posts",
                "fields": [
                    {"name": "title", "type": "text", "localized": true, "required": true},
                    {"name": "excerpt", "type": "textarea", "localized": true},
                    {"name": "content", "type": "richText", "localized": true}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(schema.slug, "posts");
        assert_eq!(schema.fields.len(), 3);
    }
}
