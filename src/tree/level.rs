use std::fmt;

/// Levels of the category tree
///
/// The tree has a fixed shape: the home page lists categories, each category
/// page lists sub-categories, each sub-category page lists products.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    /// The site home page (tree root)
    Home,

    /// A top-level category
    Category,

    /// A sub-category under one category
    SubCategory,

    /// A product link; never fetched
    Product,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::Category => "category",
            Self::SubCategory => "sub-category",
            Self::Product => "product",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Level::Home.to_string(), "home");
        assert_eq!(Level::SubCategory.to_string(), "sub-category");
    }
}
