//! Terminal rendering

use colored::{ColoredString, Colorize};
use mediafetch_core::domain::{Job, JobStatus};
use tabled::settings::Style;
use tabled::{Table, Tabled};

#[derive(Tabled)]
struct JobRow {
    id: String,
    status: String,
    progress: String,
    url: String,
    error: String,
}

impl From<&Job> for JobRow {
    fn from(job: &Job) -> Self {
        Self {
            id: job.id.clone(),
            status: job.status.to_string(),
            progress: format!("{}%", job.progress),
            url: job.url.clone(),
            error: job.error.clone().unwrap_or_default(),
        }
    }
}

pub fn jobs_table(jobs: &[Job]) -> String {
    let mut table = Table::new(jobs.iter().map(JobRow::from));
    table.with(Style::rounded());
    table.to_string()
}

pub fn status_label(status: JobStatus) -> ColoredString {
    let text = status.to_string().to_uppercase();
    match status {
        JobStatus::Starting => text.yellow(),
        JobStatus::Downloading => text.cyan(),
        JobStatus::Completed => text.green(),
        JobStatus::Failed => text.red(),
    }
}

pub fn print_job(job: &Job) {
    println!("  {} {}", "ID:".bold(), job.id);
    println!("  {} {}", "URL:".bold(), job.url);
    println!("  {} {}", "Status:".bold(), status_label(job.status));
    println!("  {} {}%", "Progress:".bold(), job.progress);
    if let Some(error) = &job.error {
        println!("  {} {}", "Error:".bold(), error.red());
    }
}

/// Print a titled section of jobs, or a placeholder when empty
pub fn print_section(title: &str, jobs: &[Job]) {
    println!("{}", title.cyan().bold());
    if jobs.is_empty() {
        println!("  {}", "(none)".dimmed());
    } else {
        println!("{}", jobs_table(jobs));
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_shows_error_and_progress() {
        let mut job = Job::new("job-1", 0, "https://x/1");
        job.fail("ERROR: unavailable", 10).unwrap();

        let table = jobs_table(&[job]);

        assert!(table.contains("job-1"));
        assert!(table.contains("failed"));
        assert!(table.contains("0%"));
        assert!(table.contains("ERROR: unavailable"));
    }
}
