use serde::{ Serialize, Deserialize };

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: String,
    pub title: String,
    pub image: Option<String>,
    pub instructions: Vec<String>,
    pub source_url: String,
}

pub const COMMON_INGREDIENTS: [&str; 20] = [
    "tomato", "onion", "garlic", "chicken", "beef", "egg", "bread", "cheese", "milk", "butter",
    "flour", "sugar", "rice", "pasta", "potato", "carrot", "spinach", "mushroom", "pepper", "oil",
];

/// Lowercases and collapses every run of characters outside `[a-z0-9]` into a single dash.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_dash = false;
    for ch in input.to_lowercase().chars() {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch);
        } else {
            pending_dash = true;
        }
    }
    slug
}

pub fn suggest_ingredients(prefix: &str) -> Vec<&'static str> {
    let prefix = prefix.trim().to_lowercase();
    COMMON_INGREDIENTS.iter()
        .copied()
        .filter(|item| item.starts_with(&prefix))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_collapses_and_trims() {
        assert_eq!(slugify("Creamy Garlic Pasta!"), "creamy-garlic-pasta");
        assert_eq!(slugify("  --Mom's  Best   Chili-- "), "mom-s-best-chili");
        assert_eq!(slugify("Crème brûlée 2"), "cr-me-br-l-e-2");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn suggestions_filter_by_prefix() {
        assert_eq!(suggest_ingredients("po"), vec!["potato"]);
        assert_eq!(suggest_ingredients(" B"), vec!["beef", "bread", "butter"]);
        assert_eq!(suggest_ingredients("").len(), COMMON_INGREDIENTS.len());
    }
}
