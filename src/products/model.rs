//! Product model as served by the backend and cached verbatim.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub title: String,
    pub price: f64,
    pub image: String,
    pub description: String,
    #[serde(default)]
    pub sizes: Vec<String>,
    #[serde(default)]
    pub images: Vec<String>,
    pub category: String,
    pub in_stock: bool,
    pub featured: bool,
}

impl Product {
    /// Case-insensitive substring match over title, description and category.
    ///
    /// `needle` must already be lowercase.
    pub fn matches_query(&self, needle: &str) -> bool {
        [&self.title, &self.description, &self.category]
            .iter()
            .any(|field| field.to_lowercase().contains(needle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dress() -> Product {
        Product {
            id: 1,
            title: "Red Dress".into(),
            price: 49.9,
            image: "dress.jpg".into(),
            description: "Summer cotton".into(),
            sizes: vec!["S".into(), "M".into()],
            images: vec![],
            category: "Dresses".into(),
            in_stock: true,
            featured: false,
        }
    }

    #[test]
    fn test_matches_any_text_field() {
        let p = dress();
        assert!(p.matches_query("red"));
        assert!(p.matches_query("cotton"));
        assert!(p.matches_query("dresses"));
        assert!(!p.matches_query("shirt"));
    }

    #[test]
    fn test_missing_lists_default_to_empty() {
        let json = r#"{"id":7,"title":"Cap","price":9.5,"image":"cap.jpg",
            "description":"","category":"hats","in_stock":false,"featured":true}"#;
        let p: Product = serde_json::from_str(json).unwrap();

        assert!(p.sizes.is_empty());
        assert!(p.images.is_empty());
        assert!(p.featured);
    }
}
