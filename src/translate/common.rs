use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{Result, RelocaleError};

/// Build the batch prompt sent to LLM providers.
///
/// The model is asked for a bare JSON array aligned with `texts`.
pub fn build_translation_prompt(texts: &[String], source_locale: &str, target_locale: &str) -> String {
    let texts_json = serde_json::to_string(texts).unwrap_or_else(|_| "[]".to_string());
    let source_name = language_code_to_name(source_locale);
    let target_name = language_code_to_name(target_locale);

    format!(
        "You are a professional translator. Translate the following texts from {} ({}) to {} ({}).\n\
         \n\
         IMPORTANT RULES:\n\
         1. Maintain the exact same formatting, including HTML tags, markdown, and special characters\n\
         2. Do not translate proper nouns, brand names, or code/technical terms unless they have standard translations\n\
         3. Preserve any placeholder variables like {{{{name}}}} or {{0}}\n\
         4. Preserve leading and trailing whitespace of each text\n\
         5. Return ONLY a valid JSON array with the translations in the same order\n\
         6. Each translation should correspond to the input at the same index\n\
         \n\
         Input texts (JSON array):\n\
         {}\n\
         \n\
         Return ONLY the JSON array of translations, nothing else. Example format:\n\
         [\"translated text 1\", \"translated text 2\"]",
        source_name, source_locale, target_name, target_locale, texts_json
    )
}

/// Parse a model reply into the list of translations.
///
/// Accepts the array wrapped in a markdown code fence. A length different
/// from `expected_count` is only logged; callers map positionally.
pub fn parse_translation_response(response: &str, expected_count: usize) -> Result<Vec<String>> {
    let json_str = strip_code_fence(response.trim());

    let parsed: Value = serde_json::from_str(json_str).map_err(|e| {
        debug!("Unparsable translation response: {}", response);
        RelocaleError::Provider(format!("Failed to parse translation response: {}", e))
    })?;

    let Value::Array(items) = parsed else {
        return Err(RelocaleError::Provider("Translation response is not an array".to_string()));
    };

    let translations = items
        .into_iter()
        .enumerate()
        .map(|(i, item)| match item {
            Value::String(s) => Ok(s),
            other => Err(RelocaleError::Provider(format!(
                "Translation {} is not a string: {}",
                i, other
            ))),
        })
        .collect::<Result<Vec<String>>>()?;

    if translations.len() != expected_count {
        warn!("Expected {} translations, got {}", expected_count, translations.len());
    }

    Ok(translations)
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.trim()
}

/// Strip region and script subtags: `en-US` → `en`
pub fn normalize_locale(locale: &str) -> String {
    locale
        .split(['-', '_'])
        .next()
        .unwrap_or(locale)
        .to_lowercase()
}

/// Locale codes may only contain ASCII alphanumerics, `-` and `_`
pub fn validate_locale(locale: &str) -> Result<()> {
    if locale.is_empty() {
        return Err(RelocaleError::Validation("Locale code is empty".to_string()));
    }

    if !locale
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(RelocaleError::Validation(format!(
            "Invalid characters in locale code: {}",
            locale
        )));
    }

    Ok(())
}

/// Human readable language name for prompts, falling back to the code itself
pub fn language_code_to_name(code: &str) -> String {
    let name = match normalize_locale(code).as_str() {
        "ja" => "Japanese",
        "ko" => "Korean",
        "zh" => "Chinese",
        "fr" => "French",
        "de" => "German",
        "es" => "Spanish",
        "ru" => "Russian",
        "it" => "Italian",
        "pt" => "Portuguese",
        "pl" => "Polish",
        "nl" => "Dutch",
        "tr" => "Turkish",
        "ar" => "Arabic",
        "hi" => "Hindi",
        "th" => "Thai",
        "vi" => "Vietnamese",
        "sv" => "Swedish",
        "da" => "Danish",
        "no" | "nb" => "Norwegian",
        "fi" => "Finnish",
        "he" => "Hebrew",
        "hu" => "Hungarian",
        "cs" => "Czech",
        "sk" => "Slovak",
        "bg" => "Bulgarian",
        "hr" => "Croatian",
        "sl" => "Slovenian",
        "et" => "Estonian",
        "lv" => "Latvian",
        "lt" => "Lithuanian",
        "el" => "Greek",
        "ro" => "Romanian",
        "uk" => "Ukrainian",
        "ca" => "Catalan",
        "id" => "Indonesian",
        "ms" => "Malay",
        "bn" => "Bengali",
        "ta" => "Tamil",
        "en" => "English",
        _ => return code.to_string(),
    };
    name.to_string()
}
