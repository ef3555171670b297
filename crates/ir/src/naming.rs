//! Naming utilities
//!
//! Deterministic name transforms shared by the blueprint builder, the
//! relationship extractor and the diff engine: case conversion, English
//! pluralization/singularization and derived table/column names.

use heck::{ToLowerCamelCase, ToSnakeCase, ToUpperCamelCase};

// ============================================================================
// Case Conversion
// ============================================================================

/// Convert to snake_case (e.g. "BlogPost" → "blog_post")
pub fn snake_case(s: &str) -> String {
    s.to_snake_case()
}

/// Convert to PascalCase (e.g. "blog_post" → "BlogPost")
pub fn pascal_case(s: &str) -> String {
    s.to_upper_camel_case()
}

/// Convert to camelCase (e.g. "blog_post" → "blogPost")
pub fn camel_case(s: &str) -> String {
    s.to_lower_camel_case()
}

// ============================================================================
// Inflection
// ============================================================================

const IRREGULAR: &[(&str, &str)] = &[
    ("person", "people"),
    ("child", "children"),
    ("man", "men"),
    ("woman", "women"),
    ("foot", "feet"),
    ("tooth", "teeth"),
    ("goose", "geese"),
    ("mouse", "mice"),
];

const UNCOUNTABLE: &[&str] = &["data", "equipment", "information", "media", "news", "series"];

/// Split "blog_post" into ("blog_", "post") so only the last word inflects.
fn split_last_word(s: &str) -> (&str, &str) {
    match s.rfind('_') {
        Some(pos) => s.split_at(pos + 1),
        None => ("", s),
    }
}

fn is_vowel(c: char) -> bool {
    matches!(c, 'a' | 'e' | 'i' | 'o' | 'u')
}

/// Simple English pluralization
///
/// - "post" → "posts"
/// - "category" → "categories"
/// - "branch" → "branches"
/// - "blog_post" → "blog_posts"
pub fn pluralize(word: &str) -> String {
    if word.is_empty() {
        return String::new();
    }

    let (head, last) = split_last_word(word);
    if UNCOUNTABLE.contains(&last) {
        return word.to_string();
    }
    if let Some((_, plural)) = IRREGULAR.iter().find(|(single, _)| *single == last) {
        return format!("{}{}", head, plural);
    }

    if last.ends_with('s')
        || last.ends_with('x')
        || last.ends_with('z')
        || last.ends_with("ch")
        || last.ends_with("sh")
    {
        return format!("{}es", word);
    }

    // consonant + y
    if let Some(stem) = last.strip_suffix('y') {
        if stem.chars().last().is_some_and(|c| !is_vowel(c)) {
            return format!("{}{}ies", head, stem);
        }
    }

    format!("{}s", word)
}

/// Simple English singularization, the inverse of [`pluralize`]
///
/// - "posts" → "post"
/// - "categories" → "category"
/// - "branches" → "branch" (never "branche")
/// - "matches" → "match"
pub fn singularize(word: &str) -> String {
    let (head, last) = split_last_word(word);
    if last.is_empty() || UNCOUNTABLE.contains(&last) {
        return word.to_string();
    }
    if let Some((single, _)) = IRREGULAR.iter().find(|(_, plural)| *plural == last) {
        return format!("{}{}", head, single);
    }

    if let Some(stem) = last.strip_suffix("ies") {
        if !stem.is_empty() {
            return format!("{}{}y", head, stem);
        }
    }

    for suffix in ["ches", "shes", "sses", "xes", "zzes"] {
        if last.ends_with(suffix) {
            return format!("{}{}", head, &last[..last.len() - 2]);
        }
    }

    if last.ends_with("ss") || last.ends_with("us") || last.ends_with("is") {
        return word.to_string();
    }

    match last.strip_suffix('s') {
        Some(stem) if !stem.is_empty() => format!("{}{}", head, stem),
        _ => word.to_string(),
    }
}

// ============================================================================
// Derived Names
// ============================================================================

/// Entity name → default table name (e.g. "BlogPost" → "blog_posts")
pub fn table_name(entity_name: &str) -> String {
    pluralize(&snake_case(entity_name))
}

/// Property or entity name → FK column name (e.g. "author" → "author_id")
pub fn foreign_key_column(name: &str) -> String {
    format!("{}_id", snake_case(name))
}

/// Join table name for two tables: both singularized, sorted, joined by `_`
///
/// ("branches", "users") → "branch_user"; ("tags", "posts") → "post_tag"
pub fn pivot_table_name(first_table: &str, second_table: &str) -> String {
    let mut parts = [singularize(first_table), singularize(second_table)];
    parts.sort();
    parts.join("_")
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_conversion() {
        assert_eq!(snake_case("BlogPost"), "blog_post");
        assert_eq!(snake_case("createdAt"), "created_at");
        assert_eq!(pascal_case("blog_post"), "BlogPost");
        assert_eq!(camel_case("blog_post"), "blogPost");
    }

    #[test]
    fn test_pluralize() {
        assert_eq!(pluralize("post"), "posts");
        assert_eq!(pluralize("category"), "categories");
        assert_eq!(pluralize("day"), "days");
        assert_eq!(pluralize("branch"), "branches");
        assert_eq!(pluralize("box"), "boxes");
        assert_eq!(pluralize("address"), "addresses");
        assert_eq!(pluralize("person"), "people");
        assert_eq!(pluralize("blog_post"), "blog_posts");
        assert_eq!(pluralize("sales_person"), "sales_people");
        assert_eq!(pluralize("media"), "media");
        assert_eq!(pluralize(""), "");
    }

    #[test]
    fn test_singularize() {
        assert_eq!(singularize("posts"), "post");
        assert_eq!(singularize("categories"), "category");
        assert_eq!(singularize("branches"), "branch");
        assert_eq!(singularize("matches"), "match");
        assert_eq!(singularize("dishes"), "dish");
        assert_eq!(singularize("boxes"), "box");
        assert_eq!(singularize("addresses"), "address");
        assert_eq!(singularize("status"), "status");
        assert_eq!(singularize("people"), "person");
        assert_eq!(singularize("blog_posts"), "blog_post");
        assert_eq!(singularize("user"), "user");
    }

    #[test]
    fn test_table_name() {
        assert_eq!(table_name("User"), "users");
        assert_eq!(table_name("BlogPost"), "blog_posts");
        assert_eq!(table_name("Category"), "categories");
    }

    #[test]
    fn test_foreign_key_column() {
        assert_eq!(foreign_key_column("author"), "author_id");
        assert_eq!(foreign_key_column("parentCategory"), "parent_category_id");
    }

    #[test]
    fn test_pivot_table_name() {
        assert_eq!(pivot_table_name("branches", "users"), "branch_user");
        assert_eq!(pivot_table_name("users", "branches"), "branch_user");
        assert_eq!(pivot_table_name("posts", "tags"), "post_tag");
        assert_eq!(pivot_table_name("watches", "users"), "user_watch");
    }
}
