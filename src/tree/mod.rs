//! Tree module: the shape of a crawl
//!
//! # Components
//!
//! - `Level`: the four fixed levels (home, category, sub-category, product)
//! - `TreeNode`: a node of any level, as walked by the crawler
//! - `CrawlRecord`: the flattened output row, one per sub-category

mod level;
mod node;
mod record;

// Re-export main types
pub use level::Level;
pub use node::{CategoryNode, ProductLeaf, SubCategoryNode, TreeNode};
pub use record::{CrawlRecord, CSV_HEADERS, PRODUCT_SEPARATOR};
