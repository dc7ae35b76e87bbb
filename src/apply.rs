use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::address::{self, Address};
use crate::config::EngineConfig;
use crate::extract::{FragmentKind, TranslatableField};
use crate::richtext::RichTextWalker;

/// Bookkeeping for one reinsertion pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyReport {
    /// Fragments that were sent for translation
    pub fields: usize,
    /// Translations that came back
    pub translations: usize,
    /// Positions rewritten in the copy
    pub applied: usize,
    /// Positions left with their original text
    pub skipped: usize,
}

impl ApplyReport {
    /// The provider answered with a different number of items than asked for
    pub fn is_count_mismatch(&self) -> bool {
        self.fields != self.translations
    }
}

/// A translated copy of a document
#[derive(Debug, Clone)]
pub struct Applied {
    pub document: Value,
    pub report: ApplyReport,
}

/// Writes translations back into a deep copy of the source document
#[derive(Debug, Clone)]
pub struct Reinserter {
    walker: RichTextWalker,
    managed_keys: Vec<String>,
}

impl Reinserter {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            walker: RichTextWalker::new(config),
            managed_keys: config.managed_keys.clone(),
        }
    }

    /// Replace the i-th fragment of `original` with `translations[i]`.
    ///
    /// `original` is never modified. Fragments without a translation, or whose
    /// address no longer resolves, keep their source text and are counted as
    /// skipped.
    pub fn apply(
        &self,
        original: &Value,
        fields: &[TranslatableField],
        translations: &[String],
    ) -> Applied {
        let mut document = original.clone();
        let mut report = ApplyReport {
            fields: fields.len(),
            translations: translations.len(),
            ..ApplyReport::default()
        };

        let mut i = 0;
        while i < fields.len() {
            let field = &fields[i];
            match field.kind {
                FragmentKind::Text | FragmentKind::Textarea => {
                    match translations.get(i) {
                        Some(translation) => {
                            match address::write(&mut document, &field.address, Value::String(translation.clone())) {
                                Ok(()) => report.applied += 1,
                                Err(e) => {
                                    debug!("Skipping {}: {}", field.address, e);
                                    report.skipped += 1;
                                }
                            }
                        }
                        None => report.skipped += 1,
                    }
                    i += 1;
                }
                FragmentKind::RichTextFragment => {
                    let end = rich_text_run_end(fields, i);
                    let available = translations.get(i..end.min(translations.len())).unwrap_or(&[]);
                    let applied = self.apply_rich_text(&mut document, &fields[i..end], available);
                    report.applied += applied;
                    report.skipped += (end - i) - applied;
                    i = end;
                }
            }
        }

        if report.is_count_mismatch() {
            warn!(
                "Expected {} translations, got {}; {} fragment(s) keep their original text",
                report.fields, report.translations, report.skipped
            );
        }

        Applied { document, report }
    }

    /// Rewrite one rich-text value from its consecutive fragments
    fn apply_rich_text(
        &self,
        document: &mut Value,
        group: &[TranslatableField],
        translations: &[String],
    ) -> usize {
        let field_address = &group[0].address;
        let subtree = match address::read_mut(document, field_address) {
            Ok(subtree) => subtree,
            Err(e) => {
                debug!("Skipping rich text {}: {}", field_address, e);
                return 0;
            }
        };

        let current: Vec<Address> = self.walker.extract(subtree).into_iter().map(|f| f.address).collect();
        let recorded: Vec<Option<&Address>> = group.iter().map(|f| f.local_rich_text_address.as_ref()).collect();

        if current.iter().map(Some).eq(recorded.iter().copied()) {
            return self.walker.reinsert(subtree, translations).applied;
        }

        // Tree shape differs from the one the fragments were taken from
        warn!("Rich text at {} changed since extraction; writing by recorded address", field_address);
        let mut applied = 0;
        for (field, translation) in group.iter().zip(translations) {
            let Some(local) = &field.local_rich_text_address else {
                continue;
            };
            let text_address = local.child("text");
            if address::read(subtree, &text_address).is_ok_and(Value::is_string)
                && address::write(subtree, &text_address, Value::String(translation.clone())).is_ok()
            {
                applied += 1;
            }
        }
        applied
    }

    /// Remove host-managed identity and audit attributes at every level.
    ///
    /// Rich-text documents are left whole; their nodes carry identifiers the
    /// editor relies on.
    pub fn strip_managed_fields(&self, value: &mut Value) {
        strip_keys(value, &self.managed_keys);
    }
}

fn strip_keys(value: &mut Value, keys: &[String]) {
    if RichTextWalker::is_document(value) {
        return;
    }
    match value {
        Value::Object(map) => {
            map.retain(|key, _| !keys.contains(key));
            for child in map.values_mut() {
                strip_keys(child, keys);
            }
        }
        Value::Array(items) => {
            for item in items {
                strip_keys(item, keys);
            }
        }
        _ => {}
    }
}

/// End (exclusive) of the run of rich-text fragments sharing `fields[start]`'s address
fn rich_text_run_end(fields: &[TranslatableField], start: usize) -> usize {
    let address = &fields[start].address;
    fields[start..]
        .iter()
        .position(|f| f.kind != FragmentKind::RichTextFragment || &f.address != address)
        .map_or(fields.len(), |offset| start + offset)
}
