//! Just enough English inflection to compute association-table names.

/// Pluralize a table-name token.
pub(crate) fn to_plural(word: &str) -> String {
    if word.is_empty() {
        return String::new();
    }
    if let Some(stem) = word.strip_suffix('y')
        && !stem.is_empty()
        && !ends_with_vowel(stem)
    {
        return format!("{stem}ies");
    }
    if word.ends_with('s')
        || word.ends_with('x')
        || word.ends_with('z')
        || word.ends_with("ch")
        || word.ends_with("sh")
    {
        return format!("{word}es");
    }
    format!("{word}s")
}

/// Singularize a table-name token.
pub(crate) fn to_singular(word: &str) -> String {
    if let Some(stem) = word.strip_suffix("ies") {
        return format!("{stem}y");
    }
    for suffix in ["ses", "xes", "zes", "ches", "shes"] {
        if let Some(stem) = word.strip_suffix(suffix) {
            return format!("{stem}{}", &suffix[..suffix.len() - 2]);
        }
    }
    if word.ends_with('s') && !word.ends_with("ss") {
        return word[..word.len() - 1].to_string();
    }
    word.to_string()
}

fn ends_with_vowel(word: &str) -> bool {
    matches!(
        word.chars().last(),
        Some('a' | 'e' | 'i' | 'o' | 'u')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plurals() {
        assert_eq!(to_plural("tag"), "tags");
        assert_eq!(to_plural("category"), "categories");
        assert_eq!(to_plural("box"), "boxes");
        assert_eq!(to_plural("day"), "days");
    }

    #[test]
    fn singulars() {
        assert_eq!(to_singular("posts"), "post");
        assert_eq!(to_singular("categories"), "category");
        assert_eq!(to_singular("boxes"), "box");
        assert_eq!(to_singular("status"), "statu"); // naive, convention only
    }

    #[test]
    fn round_trip_on_simple_words() {
        for w in ["page", "tag", "user", "story"] {
            assert_eq!(to_singular(&to_plural(w)), w);
        }
    }
}
