use guestmail_common::Property;
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::OnceLock;

fn token_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\{\{([A-Za-z_][A-Za-z0-9_]*)\}\}").expect("token pattern is valid")
    })
}

/// Values for `{{token}}` placeholders
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenContext {
    values: HashMap<String, String>,
}

impl TokenContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// `hotelName`, `propertyName` and `propertyLocation` for one property
    pub fn for_property(property: &Property) -> Self {
        Self::new()
            .with("hotelName", &property.name)
            .with("propertyName", &property.name)
            .with("propertyLocation", &property.location)
    }

    pub fn with(mut self, token: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(token.into(), value.into());
        self
    }

    /// Replace every known token; unknown ones stay as written.
    pub fn substitute(&self, source: &str) -> String {
        if self.values.is_empty() {
            return source.to_string();
        }

        token_pattern()
            .replace_all(source, |caps: &Captures| match self.values.get(&caps[1]) {
                Some(value) => value.clone(),
                None => caps[0].to_string(),
            })
            .into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use guestmail_common::PropertyId;

    fn property() -> Property {
        Property {
            id: PropertyId::from("hotel-1"),
            name: "A by Adina, Sydney".to_string(),
            location: "Sydney, Australia".to_string(),
            image_url: String::new(),
        }
    }

    #[test]
    fn test_substitutes_property_tokens() {
        let tokens = TokenContext::for_property(&property());
        assert_eq!(
            tokens.substitute("Welcome to {{hotelName}} in {{propertyLocation}}"),
            "Welcome to A by Adina, Sydney in Sydney, Australia"
        );
    }

    #[test]
    fn test_unknown_tokens_untouched() {
        let tokens = TokenContext::for_property(&property());
        assert_eq!(
            tokens.substitute("Hi {{guestName}}, {{ hotelName }} {{hotelName}}"),
            "Hi {{guestName}}, {{ hotelName }} A by Adina, Sydney"
        );
    }

    #[test]
    fn test_value_containing_dollar_is_literal() {
        let tokens = TokenContext::new().with("price", "$1 and $2");
        assert_eq!(tokens.substitute("{{price}}"), "$1 and $2");
    }
}
