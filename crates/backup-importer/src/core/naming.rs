//! Identifier naming rules: stems, snake_case, and pluralization.
//!
//! An importer's identifier (its registered name, e.g. `CustomerImporter`)
//! determines both its target model and its default source table.

/// Strip one trailing `Importer` suffix from an identifier.
///
/// `CustomerImporter` -> `Customer`; identifiers without the suffix pass
/// through unchanged. The bare identifier `Importer` yields an empty stem,
/// which model resolution rejects.
pub fn entity_stem(identifier: &str) -> &str {
    identifier.strip_suffix("Importer").unwrap_or(identifier)
}

/// Convert a CamelCase identifier to snake_case.
pub fn snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c.is_ascii_uppercase() {
            let boundary = match i.checked_sub(1).map(|j| chars[j]) {
                None => false,
                Some('_') => false,
                Some(prev) if prev.is_ascii_lowercase() || prev.is_ascii_digit() => true,
                // Acronym boundary: HTTPServer -> http_server
                Some(prev) if prev.is_ascii_uppercase() => chars
                    .get(i + 1)
                    .map(|n| n.is_ascii_lowercase())
                    .unwrap_or(false),
                Some(_) => false,
            };
            if boundary {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }

    out
}

/// Pluralize a snake_case word using English grammar rules.
pub fn pluralize(word: &str) -> String {
    if word.is_empty() {
        return String::new();
    }

    // Words ending in 's', 'sh', 'ch', 'x', 'z' -> add 'es'
    if word.ends_with('z') {
        return format!("{}zes", word);
    }
    if word.ends_with('s') || word.ends_with("sh") || word.ends_with("ch") || word.ends_with('x') {
        return format!("{}es", word);
    }

    // Words ending in consonant + 'y' -> change 'y' to 'ies'
    if word.ends_with('y') {
        if let Some(second_last) = word.chars().rev().nth(1) {
            if !"aeiou".contains(second_last) {
                return format!("{}ies", &word[..word.len() - 1]);
            }
        }
        return format!("{}s", word);
    }

    // Words ending in 'f' or 'fe' -> change to 'ves'
    if word.ends_with("fe") {
        return format!("{}ves", &word[..word.len() - 2]);
    }
    if word.ends_with('f') {
        return format!("{}ves", &word[..word.len() - 1]);
    }

    // Words ending in consonant + 'o' -> add 'es'
    if word.ends_with('o') {
        if let Some(second_last) = word.chars().rev().nth(1) {
            if !"aeiou".contains(second_last) {
                return format!("{}es", word);
            }
        }
        return format!("{}s", word);
    }

    format!("{}s", word)
}

/// Default source table for an importer: the pluralized snake_case stem.
///
/// `CustomerImporter` -> `customers`, `OrderLineImporter` -> `order_lines`.
pub fn source_table_for(identifier: &str) -> String {
    pluralize(&snake_case(entity_stem(identifier)))
}
