use crate::services::{RunSummary, ShowReport};

/// Prints the end-of-run summary to stdout, as a table or as JSON.
///
/// # Errors
/// Returns an error if the summary cannot be serialized to JSON.
pub fn print_summary(summary: &RunSummary, format: &str) -> anyhow::Result<()> {
    if format == "json" {
        println!("{}", serde_json::to_string_pretty(summary)?);
        return Ok(());
    }

    println!();
    println!("{:-<70}", "");
    for report in &summary.reports {
        print_show(report);
    }

    for failure in &summary.failures {
        println!("✗ {} - {} error: {}", failure.show, failure.kind, failure.error);
    }

    let totals = summary.totals();
    println!("{:-<70}", "");
    println!(
        "Shows: {} checked, {} failed",
        summary.reports.len(),
        summary.failures.len()
    );
    println!(
        "Items: {} total | {} held | {} needed | {} unparsable",
        totals.items, totals.already_held, totals.needed, totals.unparsable
    );

    if totals.foreign_show > 0 {
        println!();
        println!(
            "Note: {} item(s) named a show differently from its folder.",
            totals.foreign_show
        );
        println!("Show names are matched exactly (case and spacing), so these count as needed.");
    }

    Ok(())
}

fn print_show(report: &ShowReport) {
    println!(
        "{}: {} local episode(s) in {} season(s), {} needed",
        report.show, report.scan.episodes, report.scan.seasons, report.stats.needed
    );

    for result in report.needed() {
        if let Some(id) = result.outcome.identity() {
            if result.item.link.is_empty() {
                println!("  Needs {id}");
            } else {
                println!("  Needs {id}  <{}>", result.item.link);
            }
        }
    }
}
