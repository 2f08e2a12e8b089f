use std::fmt;

/// A human-chosen name bound to a [`Key`](crate::Key).
///
/// Tags are the only mutable part of the data model: the key a tag names
/// moves as new values arrive. Any UTF-8 string is a legal name; there are
/// no structural constraints beyond being serializable.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag(String);

impl Tag {
    /// Create a tag from any string-like value.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The tag name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the tag, returning the owned name.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Tag {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<String> for Tag {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl AsRef<str> for Tag {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn construction_and_display() {
        let tag = Tag::new("main");
        assert_eq!(tag.as_str(), "main");
        assert_eq!(format!("{tag}"), "main");
    }

    #[test]
    fn conversions() {
        let a: Tag = "release/1.0".into();
        let b = Tag::from("release/1.0".to_string());
        assert_eq!(a, b);
        assert_eq!(a.into_string(), "release/1.0");
    }

    #[test]
    fn ordering_is_lexicographic() {
        assert!(Tag::new("alpha") < Tag::new("beta"));
    }
}
