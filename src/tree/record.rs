use crate::tree::{ProductLeaf, SubCategoryNode};
use serde::Serialize;

/// Column headers of the tabular output, in order
pub const CSV_HEADERS: [&str; 4] = ["Category", "Sub-category", "Link", "Products"];

/// Separator between product names in the Products column
pub const PRODUCT_SEPARATOR: &str = ", ";

/// One output row: a visited sub-category and the products listed on it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrawlRecord {
    pub category: String,
    pub subcategory: String,
    pub link: String,
    /// Product names in page order; `[label]` when the page listed none
    pub products: Vec<String>,
}

impl CrawlRecord {
    /// Builds the record for one fetched sub-category page
    ///
    /// An empty product list is replaced by `empty_label` so that "crawled,
    /// nothing found" stays distinguishable from "not crawled".
    pub fn from_leaves(
        category: &str,
        subcategory: &SubCategoryNode,
        leaves: Vec<ProductLeaf>,
        empty_label: &str,
    ) -> Self {
        let mut products: Vec<String> = leaves.into_iter().map(|leaf| leaf.name).collect();
        if products.is_empty() {
            products.push(empty_label.to_string());
        }

        Self {
            category: category.to_string(),
            subcategory: subcategory.name.clone(),
            link: subcategory.url.clone(),
            products,
        }
    }

    /// The Products cell: names joined by `", "`
    pub fn products_cell(&self) -> String {
        self.products.join(PRODUCT_SEPARATOR)
    }

    pub fn to_csv_record(&self) -> [String; 4] {
        [
            self.category.clone(),
            self.subcategory.clone(),
            self.link.clone(),
            self.products_cell(),
        ]
    }
}
