use derive_more::Display;

/// Identity of the library or module emitting metrics, and the provider's registry key.
#[derive(Clone, Debug, Default, Display, Hash, PartialEq, Eq)]
#[display("{name}")]
pub struct InstrumentationScope {
    name: String,
    version: Option<String>,
    schema_url: Option<String>,
}

impl InstrumentationScope {
    pub fn new<S: Into<String>>(name: S, version: Option<&str>, schema_url: Option<&str>) -> Self {
        Self {
            name: name.into(),
            version: version.map(str::to_string),
            schema_url: schema_url.map(str::to_string),
        }
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }
    pub fn schema_url(&self) -> Option<&str> {
        self.schema_url.as_deref()
    }
}

#[cfg(test)]
mod test {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_structural_equality() {
        let a = InstrumentationScope::new("http", Some("1.0"), None);
        let b = InstrumentationScope::new("http".to_string(), Some("1.0"), None);
        assert_eq!(a, b);
        assert_ne!(a, InstrumentationScope::new("http", Some("1.1"), None));
        assert_ne!(
            a,
            InstrumentationScope::new("http", Some("1.0"), Some("https://schemas/1.0"))
        );
        let set: HashSet<_> = [a.clone(), b].into_iter().collect();
        assert_eq!(set.len(), 1);
        assert_eq!(a.to_string(), "http");
    }
}
