use chrono::Utc;
use guestmail_common::{NewProperty, Property, PropertyId, ValidationResult};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Brand tab on the property dashboard.
///
/// A property belongs to the brand when its name starts with one of
/// `prefixes` and with none of `exclude_prefixes`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandFilter {
    pub label: String,
    pub prefixes: Vec<String>,
    #[serde(default)]
    pub exclude_prefixes: Vec<String>,
}

impl BrandFilter {
    pub fn matches(&self, property: &Property) -> bool {
        let name = property.name.as_str();
        self.prefixes.iter().any(|p| name.starts_with(p.as_str()))
            && !self
                .exclude_prefixes
                .iter()
                .any(|p| name.starts_with(p.as_str()))
    }
}

/// Brand tabs used when the config names none
pub fn default_brands() -> Vec<BrandFilter> {
    vec![
        BrandFilter {
            label: "A by Adina".to_string(),
            prefixes: vec!["A by Adina".to_string()],
            exclude_prefixes: vec![],
        },
        BrandFilter {
            label: "Adina".to_string(),
            prefixes: vec!["Adina".to_string()],
            exclude_prefixes: vec!["A by Adina".to_string()],
        },
        BrandFilter {
            label: "Collection by TFE".to_string(),
            prefixes: vec!["The EVE".to_string()],
            exclude_prefixes: vec![],
        },
    ]
}

/// Properties in creation order
#[derive(Debug, Default)]
pub struct PropertyCatalog {
    properties: Vec<Property>,
}

impl PropertyCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn list(&self) -> &[Property] {
        &self.properties
    }

    pub fn find_by_id(&self, id: &PropertyId) -> Option<&Property> {
        self.properties.iter().find(|p| &p.id == id)
    }

    /// Validate and insert a new property under a freshly minted id
    pub fn add(&mut self, data: NewProperty) -> ValidationResult<Property> {
        data.validate()?;

        let property = data.into_property(self.mint_id());
        info!(property_id = %property.id, name = %property.name, "Property added");
        self.properties.push(property.clone());
        Ok(property)
    }

    /// Brand tab first, then a case-insensitive search over name and location.
    /// An empty query keeps everything the brand allows.
    pub fn filter(&self, brand: Option<&BrandFilter>, query: &str) -> Vec<&Property> {
        let query = query.trim().to_lowercase();

        self.properties
            .iter()
            .filter(|p| brand.map_or(true, |b| b.matches(p)))
            .filter(|p| {
                query.is_empty()
                    || p.name.to_lowercase().contains(&query)
                    || p.location.to_lowercase().contains(&query)
            })
            .collect()
    }

    fn mint_id(&self) -> PropertyId {
        let base = format!("property-{}", Utc::now().timestamp_millis());
        let mut candidate = PropertyId(base.clone());
        let mut n = 1;
        while self.find_by_id(&candidate).is_some() {
            n += 1;
            candidate = PropertyId(format!("{}-{}", base, n));
        }
        candidate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use guestmail_common::ValidationError;

    fn new_property(name: &str, location: &str) -> NewProperty {
        NewProperty {
            name: name.to_string(),
            location: location.to_string(),
            image_url: "https://example.com/lobby.jpg".to_string(),
        }
    }

    fn catalog() -> PropertyCatalog {
        let mut catalog = PropertyCatalog::new();
        for (name, location) in [
            ("A by Adina, Sydney", "Sydney, Australia"),
            ("Adina Brisbane", "Brisbane, Australia"),
            ("The EVE Hotel", "Sydney, Australia"),
            ("A by Adina, Vienna", "Vienna, Austria"),
        ] {
            catalog.add(new_property(name, location)).unwrap();
        }
        catalog
    }

    #[test]
    fn test_ids_are_unique_within_one_millisecond() {
        let catalog = catalog();
        let mut ids: Vec<_> = catalog.list().iter().map(|p| p.id.clone()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 4);
    }

    #[test]
    fn test_add_rejects_missing_image() {
        let mut catalog = PropertyCatalog::new();
        let mut data = new_property("Adina Flinders", "Melbourne, Australia");
        data.image_url = String::new();

        assert_eq!(catalog.add(data), Err(ValidationError::EmptyField("Image")));
        assert!(catalog.list().is_empty());
    }

    #[test]
    fn test_brand_filters() {
        let catalog = catalog();
        let brands = default_brands();

        let names = |brand: &BrandFilter| -> Vec<String> {
            catalog
                .filter(Some(brand), "")
                .into_iter()
                .map(|p| p.name.clone())
                .collect()
        };

        assert_eq!(names(&brands[0]), vec!["A by Adina, Sydney", "A by Adina, Vienna"]);
        assert_eq!(names(&brands[1]), vec!["Adina Brisbane"]);
        assert_eq!(names(&brands[2]), vec!["The EVE Hotel"]);
    }

    #[test]
    fn test_search_matches_name_or_location() {
        let catalog = catalog();
        assert_eq!(catalog.filter(None, "sydney").len(), 2);
        assert_eq!(catalog.filter(None, "AUSTRIA").len(), 1);
        assert_eq!(catalog.filter(Some(&default_brands()[0]), "sydney").len(), 1);
        assert_eq!(catalog.filter(None, "  ").len(), 4);
    }
}
