use crate::config::JobFile;
use crate::error::CliError;
use model::summary::CopySummary;

/// Prints the end-of-run report. Failed records come last, one JSON key
/// per line, so they can be grepped out and fed to a repair script.
pub fn print_summary(summary: &CopySummary) -> Result<(), CliError> {
    println!();
    println!("Copy finished in {:.2?}", summary.elapsed);
    println!("  {:<20} {}", "Records read:", summary.records_read);
    println!("  {:<20} {}", "Records written:", summary.records_written);
    println!("  {:<20} {}", "Pages scanned:", summary.pages_scanned);
    println!("  {:<20} {}", "Batches submitted:", summary.batches_submitted);
    println!("  {:<20} {}", "Failed records:", summary.failed.len());

    if !summary.is_complete() {
        println!();
        println!("The following records were never confirmed written:");
        for failure in &summary.failed {
            let key = serde_json::to_string(&failure.key)?;
            println!(
                "  {key}  ({} after {} attempts)",
                failure.error, failure.attempts
            );
        }
    }

    Ok(())
}

/// Prints the configuration a `run` with this job file would use, with
/// every default filled in.
pub fn print_effective_config(job: &JobFile) {
    let settings = &job.copy;

    println!("Job file is valid.");
    println!();
    println!(
        "  source: table '{}' via profile '{}' in {}{}",
        job.source.table,
        job.source.profile,
        job.source.region,
        role_suffix(&job.source.role_arn)
    );
    println!(
        "  target: table '{}' via profile '{}' in {}{}",
        job.target.table,
        job.target.profile,
        job.target.region,
        role_suffix(&job.target.role_arn)
    );
    println!();
    println!("  {:<20} {}", "page_size:", settings.page_size);
    println!(
        "  {:<20} {} (effective: {})",
        "max_batch_size:",
        settings.max_batch_size,
        settings.effective_batch_size()
    );
    println!("  {:<20} {}", "max_attempts:", settings.max_attempts);
    println!("  {:<20} {} ms", "base_delay:", settings.base_delay_ms);
    println!("  {:<20} {} ms", "max_delay:", settings.max_delay_ms);
}

fn role_suffix(role_arn: &Option<String>) -> String {
    match role_arn {
        Some(arn) => format!(", assuming {arn}"),
        None => String::new(),
    }
}
