//! Tree walker - main crawl orchestration logic
//!
//! The walker visits the category tree depth-first, left to right:
//!
//! 1. Load the home page and extract the categories
//! 2. For each category (a *branch*), walk its subtree with one explicit
//!    stack of `TreeNode`s; the node's `Level` picks the selector
//! 3. Each fetched sub-category page becomes one `CrawlRecord`
//! 4. Hand the branch's records to the sink before the next branch is
//!    delivered
//!
//! A node whose page cannot be fetched is logged, recorded as a
//! `NodeFailure`, and skipped with its subtree. Its siblings are unaffected.
//! Only sink errors end a crawl early.

use crate::crawler::context::ContextFactory;
use crate::crawler::fetcher::{FetchSettings, PageFetcher};
use crate::crawler::parser::{extract, LevelSelectors};
use crate::crawler::scheduler::Pacer;
use crate::output::{CrawlStatistics, RecordSink};
use crate::tree::{CategoryNode, CrawlRecord, Level, SubCategoryNode, TreeNode};
use crate::{CrawlError, FetchError, FetchResult};
use chrono::Utc;
use futures::stream::{self, StreamExt};
use serde::Serialize;

/// Walk behavior that is not about navigation
#[derive(Debug, Clone)]
pub struct WalkOptions {
    /// Products value for a sub-category page that lists no products
    pub empty_label: String,

    /// List sub-categories without fetching their pages
    pub dry_run: bool,

    /// Category branches walked at once
    pub concurrency: usize,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self {
            empty_label: "no product found".to_string(),
            dry_run: false,
            concurrency: 1,
        }
    }
}

/// A node whose page could not be fetched; its subtree was skipped
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeFailure {
    pub level: String,
    pub name: String,
    pub url: String,
    pub error: String,
}

impl NodeFailure {
    fn new(node: &TreeNode, error: &FetchError) -> Self {
        Self {
            level: node.level().to_string(),
            name: node.name().to_string(),
            url: node.url().to_string(),
            error: error.to_string(),
        }
    }
}

/// What one category branch contributed
#[derive(Debug, Clone, Serialize)]
pub struct BranchReport {
    pub category: CategoryNode,

    /// False when the category page itself could not be fetched
    pub fetched: bool,

    /// Sub-categories listed on the category page, in page order
    pub subcategories: Vec<SubCategoryNode>,

    /// Records produced by this branch
    pub records: usize,
}

/// Outcome of a whole crawl
#[derive(Debug, Clone, Serialize)]
pub struct CrawlReport {
    pub base_url: String,
    pub statistics: CrawlStatistics,
    pub branches: Vec<BranchReport>,
    pub failures: Vec<NodeFailure>,
}

/// Everything a branch produced, before it is merged into the report
struct Branch {
    report: BranchReport,
    records: Vec<CrawlRecord>,
    failures: Vec<NodeFailure>,
    subcategories_failed: u64,
    subcategories_skipped: u64,
    navigations: u64,
}

impl Branch {
    fn new(root: &TreeNode) -> Self {
        Self {
            report: BranchReport {
                category: CategoryNode {
                    name: root.name().to_string(),
                    url: root.url().to_string(),
                },
                fetched: false,
                subcategories: Vec::new(),
                records: 0,
            },
            records: Vec::new(),
            failures: Vec::new(),
            subcategories_failed: 0,
            subcategories_skipped: 0,
            navigations: 0,
        }
    }

    fn fail(&mut self, node: &TreeNode, error: &FetchError) {
        if node.level() == Level::SubCategory {
            self.subcategories_failed += 1;
        }
        self.failures.push(NodeFailure::new(node, error));
    }
}

/// Walks the category tree through browsing contexts from a factory
pub struct TreeWalker<F> {
    factory: F,
    selectors: LevelSelectors,
    settings: FetchSettings,
    pacer: Pacer,
    options: WalkOptions,
}

impl<F: ContextFactory> TreeWalker<F> {
    pub fn new(
        factory: F,
        selectors: LevelSelectors,
        settings: FetchSettings,
        pacer: Pacer,
        options: WalkOptions,
    ) -> Self {
        Self {
            factory,
            selectors,
            settings,
            pacer,
            options,
        }
    }

    fn open_fetcher(&self) -> FetchResult<PageFetcher<F::Context>> {
        let context = self.factory.open()?;
        Ok(PageFetcher::new(context, self.settings, self.pacer.clone()))
    }

    /// Runs a full crawl from `base_url`, streaming records into `sink`
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlReport)` - The walk finished; some branches may have failed
    /// * `Err(CrawlError)` - No context could be opened, or the sink failed
    pub async fn run<S: RecordSink>(
        &self,
        base_url: &str,
        sink: &mut S,
    ) -> Result<CrawlReport, CrawlError> {
        let mut report = CrawlReport {
            base_url: base_url.to_string(),
            statistics: CrawlStatistics::new(Utc::now()),
            branches: Vec::new(),
            failures: Vec::new(),
        };

        let mut fetcher = self.open_fetcher()?;
        let home = TreeNode::home(base_url);

        let categories = match self.expand(&mut fetcher, &home).await {
            Ok(children) => children,
            Err(e) => {
                tracing::error!("Failed to load home page {}: {}", base_url, e);
                report.failures.push(NodeFailure::new(&home, &e));
                Vec::new()
            }
        };
        report.statistics.categories_found = categories.len() as u64;
        report.statistics.navigations = fetcher.navigations();
        tracing::info!("Found {} categories on {}", categories.len(), base_url);

        if self.options.concurrency <= 1 {
            for (index, category) in categories.into_iter().enumerate() {
                tracing::info!("{}. {}", index + 1, category);
                let branch = self.walk_branch(&mut fetcher, category).await;
                self.absorb(branch, sink, &mut report)?;
            }
        } else {
            tracing::info!(
                "Walking up to {} category branches concurrently",
                self.options.concurrency
            );
            let mut branches = stream::iter(categories.into_iter().enumerate())
                .map(|(index, category)| {
                    tracing::info!("{}. {}", index + 1, category);
                    self.walk_isolated(category)
                })
                .buffered(self.options.concurrency);

            while let Some(branch) = branches.next().await {
                self.absorb(branch, sink, &mut report)?;
            }
        }

        report.statistics.finish(Utc::now());
        tracing::info!(
            "Crawl finished: {} records from {} categories, {} failures",
            report.statistics.records,
            report.statistics.categories_found,
            report.failures.len()
        );

        Ok(report)
    }

    /// Walks one branch in a context of its own
    async fn walk_isolated(&self, category: TreeNode) -> Branch {
        match self.open_fetcher() {
            Ok(mut fetcher) => self.walk_branch(&mut fetcher, category).await,
            Err(e) => {
                tracing::warn!("Skipping {}: {}", category, e);
                let mut branch = Branch::new(&category);
                branch.fail(&category, &e);
                branch
            }
        }
    }

    /// Depth-first walk of the subtree rooted at `root`
    async fn walk_branch(
        &self,
        fetcher: &mut PageFetcher<F::Context>,
        root: TreeNode,
    ) -> Branch {
        let navigations_before = fetcher.navigations();
        let mut branch = Branch::new(&root);
        let mut stack = vec![root];

        while let Some(node) = stack.pop() {
            if self.options.dry_run && node.level() == Level::SubCategory {
                tracing::info!("   would fetch {}", node);
                branch.subcategories_skipped += 1;
                continue;
            }

            let children = match self.expand(fetcher, &node).await {
                Ok(children) => children,
                Err(e) => {
                    tracing::warn!("Skipping {}: {}", node, e);
                    branch.fail(&node, &e);
                    continue;
                }
            };

            match node {
                TreeNode::SubCategory { category, node } => {
                    let leaves = children
                        .into_iter()
                        .filter_map(|child| match child {
                            TreeNode::Product(leaf) => Some(leaf),
                            _ => None,
                        })
                        .collect::<Vec<_>>();
                    for (k, leaf) in leaves.iter().enumerate() {
                        tracing::debug!("      product {}: {}", k + 1, leaf.name);
                    }
                    let record =
                        CrawlRecord::from_leaves(&category, &node, leaves, &self.options.empty_label);
                    branch.records.push(record);
                }
                parent => {
                    if let TreeNode::Category(_) = parent {
                        branch.report.fetched = true;
                        tracing::info!("   {} sub-categories found", children.len());
                        for (j, child) in children.iter().enumerate() {
                            tracing::info!("   {}. {} -> {}", j + 1, child.name(), child.url());
                            if let TreeNode::SubCategory { node, .. } = child {
                                branch.report.subcategories.push(node.clone());
                            }
                        }
                    }
                    stack.extend(children.into_iter().rev());
                }
            }
        }

        branch.navigations = fetcher.navigations() - navigations_before;
        branch.report.records = branch.records.len();
        branch
    }

    /// Fetches a node's page and extracts its children
    async fn expand(
        &self,
        fetcher: &mut PageFetcher<F::Context>,
        node: &TreeNode,
    ) -> FetchResult<Vec<TreeNode>> {
        let Some(selector) = self.selectors.for_children_of(node.level()) else {
            return Ok(Vec::new());
        };

        let document = match node.level() {
            Level::Home => fetcher.open(node.url(), selector).await?,
            _ => fetcher.navigate(node.url(), selector).await?,
        };

        let children: Vec<_> = extract(&document, selector)
            .into_iter()
            .filter_map(|item| node.child(item.text, item.href))
            .collect();

        tracing::trace!("{} children under {}", children.len(), node);
        Ok(children)
    }

    /// Merges a finished branch into the report and flushes its records
    fn absorb<S: RecordSink>(
        &self,
        branch: Branch,
        sink: &mut S,
        report: &mut CrawlReport,
    ) -> Result<(), CrawlError> {
        sink.append(&branch.records)?;

        let stats = &mut report.statistics;
        if branch.report.fetched {
            stats.subcategories_found += branch.report.subcategories.len() as u64;
        } else {
            stats.categories_failed += 1;
        }
        stats.subcategories_failed += branch.subcategories_failed;
        stats.subcategories_skipped += branch.subcategories_skipped;
        stats.records += branch.records.len() as u64;
        stats.navigations += branch.navigations;
        for record in &branch.records {
            if record.products.len() == 1 && record.products[0] == self.options.empty_label {
                stats.empty_subcategories += 1;
            } else {
                stats.products += record.products.len() as u64;
            }
        }

        report.failures.extend(branch.failures);
        report.branches.push(branch.report);
        Ok(())
    }
}
