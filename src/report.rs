use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table};
use event_processor::{CvarSummary, EventStudy};
use rust_decimal::Decimal;

fn new_table(header: Vec<String>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn number_cell(value: Option<Decimal>) -> Cell {
    let text = match value {
        Some(v) => format!("{v:.4}"),
        None => "-".to_string(),
    };
    Cell::new(text).set_alignment(CellAlignment::Right)
}

/// Worst CVaR, events as rows and portfolios as columns, closed by the average row.
pub fn cvar_summary_table(summary: &CvarSummary) -> Table {
    let mut header = vec!["Event".to_string()];
    header.extend(summary.portfolios.iter().cloned());
    let mut table = new_table(header);

    for row in &summary.rows {
        let mut cells = vec![Cell::new(row.event)];
        cells.extend(row.values.iter().map(|v| number_cell(*v)));
        table.add_row(cells);
    }

    let mut average = vec![Cell::new("Average")];
    average.extend(summary.average.iter().map(|v| number_cell(*v)));
    table.add_row(average);
    table
}

/// Violations, sample size and failure rate of every computed cell.
pub fn backtest_table(study: &EventStudy) -> Table {
    let mut table = new_table(
        ["Event", "Portfolio", "Violations", "Sample", "Failure rate"]
            .map(String::from)
            .to_vec(),
    );
    for row in study.violation_records() {
        table.add_row(vec![
            Cell::new(row.event),
            Cell::new(row.portfolio),
            Cell::new(row.record.violations).set_alignment(CellAlignment::Right),
            Cell::new(row.record.sample_size).set_alignment(CellAlignment::Right),
            Cell::new(row.record.format_failure_rate()).set_alignment(CellAlignment::Right),
        ]);
    }
    table
}

/// The cells that could not be computed, or `None` when every cell succeeded.
pub fn failures_table(study: &EventStudy) -> Option<Table> {
    if study.failures.is_empty() {
        return None;
    }
    let mut table = new_table(["Event", "Portfolio", "Reason"].map(String::from).to_vec());
    for failure in &study.failures {
        table.add_row(vec![
            Cell::new(failure.event),
            Cell::new(&failure.portfolio),
            Cell::new(&failure.error),
        ]);
    }
    Some(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use event_processor::SummaryRow;
    use rust_decimal_macros::dec;

    #[test]
    fn summary_renders_four_decimals_and_the_average_row() {
        let summary = CvarSummary {
            portfolios: vec!["P_Peru".to_string(), "P_Grupal".to_string()],
            rows: vec![SummaryRow {
                event: NaiveDate::from_ymd_opt(2020, 3, 9).unwrap(),
                values: vec![Some(dec!(-0.123456)), None],
            }],
            average: vec![Some(dec!(-0.123456)), None],
        };

        let rendered = cvar_summary_table(&summary).to_string();
        assert!(rendered.contains("P_Grupal"));
        assert!(rendered.contains("2020-03-09"));
        assert!(rendered.contains("-0.1235"));
        assert!(rendered.contains("Average"));
        assert!(!rendered.contains("-0.123456"));
    }
}
