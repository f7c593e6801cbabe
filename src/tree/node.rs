use crate::tree::Level;
use serde::Serialize;
use std::fmt;

/// A top-level category found on the home page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryNode {
    pub name: String,
    /// Absolute URL, or empty when the element had no usable href
    pub url: String,
}

/// A sub-category found on one category's page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubCategoryNode {
    pub name: String,
    pub url: String,
}

/// A product link found on a sub-category page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductLeaf {
    pub name: String,
    /// Best-effort; empty when the element had no href
    pub url: String,
}

/// One node of the category tree, tagged by level
///
/// Sub-category nodes carry their parent category's name so that a record
/// can be built without looking back up the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeNode {
    Home { url: String },
    Category(CategoryNode),
    SubCategory {
        category: String,
        node: SubCategoryNode,
    },
    Product(ProductLeaf),
}

impl TreeNode {
    pub fn home(url: impl Into<String>) -> Self {
        Self::Home { url: url.into() }
    }

    pub fn level(&self) -> Level {
        match self {
            Self::Home { .. } => Level::Home,
            Self::Category(_) => Level::Category,
            Self::SubCategory { .. } => Level::SubCategory,
            Self::Product(_) => Level::Product,
        }
    }

    /// Display name; the home page has none
    pub fn name(&self) -> &str {
        match self {
            Self::Home { .. } => "",
            Self::Category(node) => &node.name,
            Self::SubCategory { node, .. } => &node.name,
            Self::Product(leaf) => &leaf.name,
        }
    }

    pub fn url(&self) -> &str {
        match self {
            Self::Home { url } => url,
            Self::Category(node) => &node.url,
            Self::SubCategory { node, .. } => &node.url,
            Self::Product(leaf) => &leaf.url,
        }
    }

    /// Builds a node one level below this one from an extracted link
    ///
    /// Returns None for product leaves, which have no children.
    pub fn child(&self, name: String, url: String) -> Option<TreeNode> {
        match self {
            Self::Home { .. } => Some(Self::Category(CategoryNode { name, url })),
            Self::Category(parent) => Some(Self::SubCategory {
                category: parent.name.clone(),
                node: SubCategoryNode { name, url },
            }),
            Self::SubCategory { .. } => Some(Self::Product(ProductLeaf { name, url })),
            Self::Product(_) => None,
        }
    }
}

impl fmt::Display for TreeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Home { url } => write!(f, "home {}", url),
            Self::SubCategory { category, node } => {
                write!(f, "sub-category '{}' of '{}' ({})", node.name, category, node.url)
            }
            other => write!(f, "{} '{}' ({})", other.level(), other.name(), other.url()),
        }
    }
}
