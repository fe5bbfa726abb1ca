//! The greeting catalog: the fixed set of texts a user can place.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{CardError, CardResult};

/// A selectable greeting template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Greeting {
    /// Catalog id.
    pub id: u32,
    /// Text placed on the card.
    pub text: String,
}

impl Greeting {
    fn new(id: u32, text: &str) -> Self {
        Self {
            id,
            text: text.to_string(),
        }
    }
}

/// An ordered, id-unique list of greetings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct GreetingCatalog {
    greetings: Vec<Greeting>,
}

impl GreetingCatalog {
    /// Build a catalog, rejecting duplicate ids and blank texts.
    ///
    /// # Errors
    ///
    /// Returns [`CardError::Catalog`] if an id repeats or a text is blank.
    pub fn new(greetings: Vec<Greeting>) -> CardResult<Self> {
        let mut seen = HashSet::with_capacity(greetings.len());
        for greeting in &greetings {
            if !seen.insert(greeting.id) {
                return Err(CardError::Catalog(format!(
                    "duplicate greeting id {}",
                    greeting.id
                )));
            }
            if greeting.text.trim().is_empty() {
                return Err(CardError::Catalog(format!(
                    "greeting {} has no text",
                    greeting.id
                )));
            }
        }
        Ok(Self { greetings })
    }

    /// Load a catalog from a JSON array of `{"id": .., "text": ..}` objects.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or the catalog is invalid.
    pub fn from_json(json: &str) -> CardResult<Self> {
        let greetings: Vec<Greeting> = serde_json::from_str(json)?;
        Self::new(greetings)
    }

    /// Look up a greeting by id.
    #[must_use]
    pub fn get(&self, id: u32) -> Option<&Greeting> {
        self.greetings.iter().find(|g| g.id == id)
    }

    /// Iterate in display order.
    pub fn iter(&self) -> impl Iterator<Item = &Greeting> {
        self.greetings.iter()
    }

    /// Number of greetings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.greetings.len()
    }

    /// Whether the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.greetings.is_empty()
    }
}

impl Default for GreetingCatalog {
    /// The Year of the Horse 2026 greetings.
    fn default() -> Self {
        Self {
            greetings: vec![
                Greeting::new(1, "2026 龍馬精神 🔥"),
                Greeting::new(2, "馬上有錢，好運全開"),
                Greeting::new(3, "新年快樂！Happy 2026"),
                Greeting::new(4, "福馬到來，萬事 OK"),
                Greeting::new(5, "前程似錦，一馬當先"),
                Greeting::new(6, "財源滾滾，紅包拿來"),
                Greeting::new(7, "吉星高照，歲歲平安"),
                Greeting::new(8, "金馬迎春，大吉大利"),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_catalog_has_eight_unique_greetings() {
        let catalog = GreetingCatalog::default();
        assert_eq!(catalog.len(), 8);
        assert_eq!(
            catalog.get(3).map(|g| g.text.as_str()),
            Some("新年快樂！Happy 2026")
        );
        assert!(GreetingCatalog::new(catalog.iter().cloned().collect()).is_ok());
    }

    #[test]
    fn from_json_loads_custom_catalog() {
        let catalog =
            GreetingCatalog::from_json(r#"[{"id":10,"text":"Happy Birthday"}]"#).expect("parse");
        assert_eq!(catalog.len(), 1);
        assert!(catalog.get(10).is_some());
        assert!(catalog.get(1).is_none());
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let result = GreetingCatalog::from_json(r#"[{"id":1,"text":"a"},{"id":1,"text":"b"}]"#);
        assert!(matches!(result, Err(CardError::Catalog(_))));
    }

    #[test]
    fn blank_text_is_rejected() {
        let result = GreetingCatalog::from_json(r#"[{"id":1,"text":"  "}]"#);
        assert!(matches!(result, Err(CardError::Catalog(_))));
    }

    #[test]
    fn malformed_json_is_a_serialization_error() {
        let result = GreetingCatalog::from_json("{ nope");
        assert!(matches!(result, Err(CardError::Serialization(_))));
    }
}
