use anyhow::Context;
use event_processor::{CvarSummary, EventStudy};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

fn cell(value: Option<impl ToString>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// `event,<portfolio>...` with one row per event and a closing `average` row.
pub fn write_cvar_summary<W: Write>(writer: W, summary: &CvarSummary) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);

    let mut header = vec!["event".to_string()];
    header.extend(summary.portfolios.iter().cloned());
    wtr.write_record(&header)?;

    for row in &summary.rows {
        let mut record = vec![row.event.to_string()];
        record.extend(row.values.iter().map(|v| cell(*v)));
        wtr.write_record(&record)?;
    }

    let mut average = vec!["average".to_string()];
    average.extend(summary.average.iter().map(|v| cell(*v)));
    wtr.write_record(&average)?;

    wtr.flush()?;
    Ok(())
}

/// Long format: one row per (event, portfolio, date) in the analysis window, with the
/// realized return, VaR, CVaR and whether the day breached VaR.
pub fn write_risk_series<W: Write>(writer: W, study: &EventStudy) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["event", "portfolio", "date", "realized", "var", "cvar", "violation"])?;

    for artifacts in &study.cells {
        for (date, realized) in artifacts.realized.iter() {
            let var = artifacts.var.get(date);
            let violation = var.map(|v| realized < v);
            wtr.write_record([
                artifacts.event.to_string(),
                artifacts.portfolio.clone(),
                date.to_string(),
                realized.to_string(),
                cell(var),
                cell(artifacts.cvar.get(date)),
                cell(violation),
            ])?;
        }
    }

    wtr.flush()?;
    Ok(())
}

/// One row per computed cell with its violation record.
pub fn write_backtest<W: Write>(writer: W, study: &EventStudy) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record([
        "event",
        "portfolio",
        "violations",
        "sample_size",
        "failure_rate",
        "failure_rate_pct",
    ])?;

    for row in study.violation_records() {
        wtr.write_record([
            row.event.to_string(),
            row.portfolio.to_string(),
            row.record.violations.to_string(),
            row.record.sample_size.to_string(),
            cell(row.record.failure_rate),
            cell(row.record.failure_rate_pct()),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

#[derive(Serialize)]
struct StudyExport<'a> {
    run_id: Uuid,
    summary: CvarSummary,
    study: &'a EventStudy,
}

/// The whole study, cells and failures included, as pretty-printed JSON.
pub fn write_study_json<W: Write>(writer: W, study: &EventStudy, run_id: Uuid) -> anyhow::Result<()> {
    let export = StudyExport {
        run_id,
        summary: study.cvar_summary(),
        study,
    };
    serde_json::to_writer_pretty(writer, &export)?;
    Ok(())
}

fn create(dir: &Path, name: &str) -> anyhow::Result<(PathBuf, BufWriter<File>)> {
    let path = dir.join(name);
    let file = File::create(&path).with_context(|| format!("failed to create {}", path.display()))?;
    Ok((path, BufWriter::new(file)))
}

/// Writes every export into `dir`, creating it if needed, and returns the written paths.
pub fn write_all(study: &EventStudy, dir: &Path, run_id: Uuid) -> anyhow::Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;

    let (summary_path, summary) = create(dir, "cvar_summary.csv")?;
    write_cvar_summary(summary, &study.cvar_summary())?;

    let (series_path, series) = create(dir, "risk_series.csv")?;
    write_risk_series(series, study)?;

    let (backtest_path, backtest) = create(dir, "backtest.csv")?;
    write_backtest(backtest, study)?;

    let (json_path, mut json) = create(dir, "study.json")?;
    write_study_json(&mut json, study, run_id)?;
    json.flush()?;

    Ok(vec![summary_path, series_path, backtest_path, json_path])
}

#[cfg(test)]
mod tests {
    use super::*;
    use analytics::MarketSnapshot;
    use chrono::{Datelike, Days, NaiveDate};
    use core_types::{Instrument, Portfolio, PriceTable, WindowSpec};
    use event_processor::EventWindowProcessor;
    use pretty_assertions::assert_eq;
    use risk::RollingWindow;
    use rust_decimal_macros::dec;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    /// A one-instrument study over a short window, plus a portfolio that always fails.
    fn study() -> EventStudy {
        let fcx = Instrument::new("FCX").unwrap();
        let mut observations = Vec::new();
        let mut day = date(1, 1);
        let mut price = dec!(40);
        while day <= date(4, 30) {
            observations.push((day, fcx.clone(), price));
            price += if day.ordinal() % 3 == 0 { dec!(-1.2) } else { dec!(0.5) };
            day = day.checked_add_days(Days::new(1)).unwrap();
        }
        let snapshot =
            MarketSnapshot::new(PriceTable::from_observations(observations).unwrap()).unwrap();

        EventWindowProcessor::new(
            vec![date(3, 1)],
            vec![
                Portfolio::new("P_FCX", vec![fcx]).unwrap(),
                Portfolio::new("P_HL", vec![Instrument::new("HL").unwrap()]).unwrap(),
            ],
            RollingWindow::new(5, dec!(0.1)).unwrap(),
            WindowSpec {
                analysis_months: 1,
                margin_days: 10,
            },
        )
        .without_progress()
        .run(&snapshot)
        .unwrap()
    }

    fn render(write: impl FnOnce(&mut Vec<u8>) -> anyhow::Result<()>) -> String {
        let mut buffer = Vec::new();
        write(&mut buffer).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn summary_has_an_average_row_and_blank_failed_cells() {
        let study = study();
        let text = render(|w| write_cvar_summary(w, &study.cvar_summary()));
        let lines: Vec<_> = text.lines().collect();

        assert_eq!(lines[0], "event,P_FCX,P_HL");
        assert!(lines[1].starts_with("2024-03-01,-"));
        assert!(lines[1].ends_with(','));
        assert!(lines[2].starts_with("average,-"));
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn risk_series_covers_every_day_of_the_window() {
        let study = study();
        let cell = study.cell(date(3, 1), "P_FCX").unwrap();
        let text = render(|w| write_risk_series(w, &study));

        // Header plus one line per realized day.
        assert_eq!(text.lines().count(), cell.realized.len() + 1);
        let violations = text.lines().filter(|l| l.ends_with(",true")).count();
        assert_eq!(violations, cell.backtest.violations);
    }

    #[test]
    fn backtest_lists_only_computed_cells() {
        let study = study();
        let text = render(|w| write_backtest(w, &study));
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].starts_with("2024-03-01,P_FCX,"));
    }

    #[test]
    fn write_all_creates_every_file() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        let written = write_all(&study(), &out, Uuid::new_v4()).unwrap();

        assert_eq!(written.len(), 4);
        for path in &written {
            assert!(path.exists(), "{}", path.display());
        }
        let json: serde_json::Value =
            serde_json::from_reader(File::open(out.join("study.json")).unwrap()).unwrap();
        assert_eq!(json["study"]["failures"][0]["portfolio"], "P_HL");
        assert_eq!(json["summary"]["portfolios"][0], "P_FCX");
    }
}
