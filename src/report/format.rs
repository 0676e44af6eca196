//! Formatted terminal output for `climate run`.
//!
//! We keep formatting code in one place so:
//! - the pipeline stays free of presentation concerns
//! - output changes are localized (and covered by the exact-string tests below)

use crate::app::pipeline::RunConfig;
use crate::domain::{AlignedTable, KeyStats};
use crate::normalize::Normalized;
use crate::pipeline::PipelineRun;
use crate::pipeline::error::Stage;

/// Row issues listed individually per dataset; the rest are only counted.
pub const MAX_LISTED_ISSUES: usize = 5;

/// Format the run summary: sources, key statistics, per-source diagnostics.
pub fn format_run_summary(run: &PipelineRun, config: &RunConfig) -> String {
    let mut out = String::new();

    out.push_str("=== climate - CO2 emissions vs temperature anomaly ===\n");
    out.push_str(&format!("Emissions  : {}\n", config.emissions));
    out.push_str(&format!(
        "Temperature: {}{}\n",
        config.temperature,
        if config.temperature_header { " (header skipped)" } else { "" }
    ));

    out.push('\n');
    out.push_str(&format_key_stats(&run.aligned.key_stats()));

    out.push_str("\nSources:\n");
    out.push_str(&format_source(Stage::Emissions, &run.emissions));
    out.push_str(&format_source(Stage::Temperature, &run.temperature));

    out.push_str(&format!(
        "\nAlignment: matched={} | emissions only={} | temperature only={}\n",
        run.alignment.matched, run.alignment.emissions_only, run.alignment.temperature_only
    ));

    out
}

/// The three headline numbers.
pub fn format_key_stats(stats: &KeyStats) -> String {
    let year = |y: Option<i32>| y.map_or_else(|| "-".to_string(), |y| y.to_string());
    let mut out = String::new();
    out.push_str("Key statistics:\n");
    out.push_str(&format!("- Start year : {}\n", year(stats.start_year)));
    out.push_str(&format!("- End year   : {}\n", year(stats.end_year)));
    out.push_str(&format!("- Data points: {}\n", stats.data_points));
    out
}

fn format_source(stage: Stage, normalized: &Normalized) -> String {
    let mut out = String::new();

    let columns: Vec<String> = normalized
        .columns
        .iter()
        .map(|c| format!("{}={} (#{})", c.field, c.column.name, c.column.index))
        .collect();
    out.push_str(&format!(
        "  {:<12} rows={} used={} years={} | {}\n",
        stage.display_name(),
        normalized.rows_read,
        normalized.rows_used,
        normalized.series.len(),
        columns.join(" ")
    ));

    if normalized.issues.is_empty() {
        return out;
    }

    let counts: Vec<String> = normalized
        .issue_counts()
        .into_iter()
        .map(|(label, n)| format!("{label}={n}"))
        .collect();
    out.push_str(&format!("    skipped: {}\n", counts.join(", ")));
    for issue in normalized.issues.iter().take(MAX_LISTED_ISSUES) {
        // 1-based, counting data rows only.
        out.push_str(&format!("    row {}: {}\n", issue.row + 1, issue.kind));
    }
    if normalized.issues.len() > MAX_LISTED_ISSUES {
        out.push_str(&format!(
            "    ... and {} more\n",
            normalized.issues.len() - MAX_LISTED_ISSUES
        ));
    }

    out
}

/// Format the aligned table with the exported column names.
pub fn format_aligned_table(table: &AlignedTable) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:>6} {:>22} {:>20}\n",
        "Year", "Global CO2 Emissions", "Temperature_Anomaly"
    ));
    out.push_str(&format!("{:-<6} {:-<22} {:-<20}\n", "", "", ""));

    if table.is_empty() {
        out.push_str("(no years present in both datasets)\n");
        return out;
    }

    for r in table.records() {
        out.push_str(&format!("{:>6} {:>22.3} {:>20.3}\n", r.year, r.emissions, r.anomaly));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::align::align_with_stats;
    use crate::domain::YearlySeries;
    use crate::io::source::SourceSpec;
    use crate::normalize::{EmissionsSchema, ResolvedField, RowIssue, RowIssueKind};
    use crate::schema::ColumnRef;

    fn sample_run(issues: Vec<RowIssue>) -> PipelineRun {
        let emissions_series: YearlySeries = [(1999, 5.0), (2000, 30.0), (2001, 15.0)].into_iter().collect();
        let temperature_series: YearlySeries = [(2000, 0.75), (2001, 1.1)].into_iter().collect();
        let (aligned, alignment) = align_with_stats(&emissions_series, &temperature_series);
        PipelineRun {
            aligned,
            emissions: Normalized {
                series: emissions_series,
                columns: vec![
                    ResolvedField {
                        field: "year",
                        column: ColumnRef {
                            index: 0,
                            name: "Year".into(),
                        },
                    },
                    ResolvedField {
                        field: "emissions",
                        column: ColumnRef {
                            index: 2,
                            name: "CO2_EMISSIONS".into(),
                        },
                    },
                ],
                rows_read: 4,
                rows_used: 4,
                issues: Vec::new(),
            },
            temperature: Normalized {
                series: temperature_series,
                rows_read: 3 + issues.len(),
                rows_used: 3,
                issues,
                ..Normalized::default()
            },
            alignment,
        }
    }

    fn sample_config() -> RunConfig {
        RunConfig {
            emissions: SourceSpec::parse("co2.csv"),
            temperature: SourceSpec::parse("https://example.org/t.csv"),
            temperature_header: false,
            schema: EmissionsSchema::default(),
        }
    }

    #[test]
    fn summary_has_key_stats_and_sources() {
        let text = format_run_summary(&sample_run(Vec::new()), &sample_config());
        assert!(text.contains("Temperature: https://example.org/t.csv\n"));
        assert!(text.contains("- Start year : 2000\n"));
        assert!(text.contains("- End year   : 2001\n"));
        assert!(text.contains("- Data points: 2\n"));
        assert!(text.contains("  emissions    rows=4 used=4 years=3 | year=Year (#0) emissions=CO2_EMISSIONS (#2)\n"));
        assert!(text.contains("Alignment: matched=2 | emissions only=1 | temperature only=0\n"));
        assert!(!text.contains("skipped"));
    }

    #[test]
    fn issues_are_listed_then_counted() {
        let issues: Vec<RowIssue> = (0..7)
            .map(|row| RowIssue::new(row, RowIssueKind::InvalidDate(format!("bad{row}"))))
            .collect();
        let text = format_run_summary(&sample_run(issues), &sample_config());
        assert!(text.contains("    skipped: invalid date=7\n"));
        assert!(text.contains("    row 1: invalid date 'bad0'\n"));
        assert!(text.contains("    row 5: invalid date 'bad4'\n"));
        assert!(!text.contains("bad5"));
        assert!(text.contains("    ... and 2 more\n"));
    }

    #[test]
    fn empty_key_stats_use_dashes() {
        let text = format_key_stats(&AlignedTable::default().key_stats());
        assert_eq!(
            text,
            "Key statistics:\n- Start year : -\n- End year   : -\n- Data points: 0\n"
        );
    }

    #[test]
    fn aligned_table_layout() {
        let text = format_aligned_table(&sample_run(Vec::new()).aligned);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "  Year   Global CO2 Emissions  Temperature_Anomaly");
        assert_eq!(lines[2], "  2000                 30.000                0.750");
        assert_eq!(lines[3], "  2001                 15.000                1.100");
        assert_eq!(lines.len(), 4);
    }
}
