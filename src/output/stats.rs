//! Dataset statistics reporting

use crate::crawler::CrawlSummary;
use crate::storage::{PriceStore, RunRecord};
use crate::Result;

/// Aggregate view of the persisted dataset
#[derive(Debug, Clone)]
pub struct DatasetStatistics {
    pub total_records: u64,
    pub categories: Vec<(String, u64)>,
    pub visited_categories: u64,
    pub latest_run: Option<RunRecord>,
}

/// Loads dataset statistics from the store
pub fn load_statistics(store: &dyn PriceStore) -> Result<DatasetStatistics> {
    Ok(DatasetStatistics {
        total_records: store.count_records()?,
        categories: store.category_breakdown()?,
        visited_categories: store.load_visited()?.len() as u64,
        latest_run: store.get_latest_run()?,
    })
}

/// Prints dataset statistics to stdout
pub fn print_statistics(stats: &DatasetStatistics) {
    println!("\n=== Dataset Statistics ===\n");
    println!("Total records:      {}", stats.total_records);
    println!("Visited categories: {}", stats.visited_categories);

    if let Some(run) = &stats.latest_run {
        println!("\nLatest run:");
        println!("  ID:         {}", run.id);
        println!("  Started:    {}", run.started_at);
        if let Some(finished) = &run.finished_at {
            println!("  Finished:   {}", finished);
        }
        println!("  Status:     {}", run.status.to_db_string());
        println!(
            "  Outcome:    {} visited, {} failed, {} records",
            run.categories_visited, run.categories_failed, run.records_written
        );
    }

    if !stats.categories.is_empty() {
        println!("\nRecords per category:");
        for (category, count) in &stats.categories {
            println!("  {:<40} {}", category, count);
        }
    }

    println!();
}

/// Prints a crawl run summary to stdout
pub fn print_run_summary(summary: &CrawlSummary) {
    println!("\n=== Crawl Summary ===\n");
    println!("Run ID:             {}", summary.run_id);
    println!("Categories visited: {}", summary.visited.len());
    println!("Records written:    {}", summary.records_written);

    if summary.interrupted {
        println!("\nRun was stopped early; remaining categories are left pending.");
    }

    if !summary.failed.is_empty() {
        println!("\nFailed categories (will be re-attempted next run):");
        for name in &summary.failed {
            println!("  {}", name);
        }
    }

    println!();
}
