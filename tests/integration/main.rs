//! Integration tests for Catalog-Crawler

mod crawl_tests;
