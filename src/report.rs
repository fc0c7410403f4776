/*!
 * Reporting functionality for tsmanifest
 *
 * Renders the verbose end-of-build summary with the tabled library.
 */

use tabled::{
    settings::{object::Columns, Alignment, Modify, Padding, Style},
    Table, Tabled,
};

use crate::types::BuildSummary;

/// Format of the report output
pub enum ReportFormat {
    /// Console table output
    ConsoleTable,
}

/// Report generator for build results
pub struct Reporter {
    format: ReportFormat,
}

impl Reporter {
    /// Create a new reporter
    pub fn new(format: ReportFormat) -> Self {
        Self { format }
    }

    /// Generate a report string for a finished build
    pub fn generate_report(&self, summary: &BuildSummary) -> String {
        match self.format {
            ReportFormat::ConsoleTable => self.generate_console_report(summary),
        }
    }

    /// Print the report to stdout
    pub fn print_report(&self, summary: &BuildSummary) {
        println!("\n{}", self.generate_report(summary));
    }

    fn create_summary_table(&self, summary: &BuildSummary) -> String {
        #[derive(Tabled)]
        struct SummaryRow {
            #[tabled(rename = "Metric")]
            key: &'static str,

            #[tabled(rename = "Value")]
            value: String,
        }

        let rows = vec![
            SummaryRow {
                key: "📁 Files Included",
                value: summary.included.to_string(),
            },
            SummaryRow {
                key: "🚫 Files Excluded",
                value: summary.excluded.to_string(),
            },
            SummaryRow {
                key: "🗂️ Regions",
                value: summary.regions.to_string(),
            },
            SummaryRow {
                key: "📍 Output File",
                value: summary.output_file.clone(),
            },
            SummaryRow {
                key: "⏱️ Build Time",
                value: format!("{:.4?}", summary.duration),
            },
        ];

        let mut table = Table::new(rows);
        table
            .with(Style::rounded())
            .with(Padding::new(1, 1, 0, 0))
            .with(Modify::new(Columns::new(..)).with(Alignment::left()));

        table.to_string()
    }

    fn generate_console_report(&self, summary: &BuildSummary) -> String {
        format!(
            "✅  MANIFEST GENERATED\n{}",
            self.create_summary_table(summary)
        )
    }
}
