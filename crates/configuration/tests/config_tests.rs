use chrono::NaiveDate;
use configuration::{ConfigError, DataSource, load_config_from_str};
use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;

const MINIMAL: &str = r#"
event_dates = ["2020-03-09", "2022-12-01"]

[data]
start = "2019-12-01"
end = "2024-12-01"

[[portfolios]]
name = "P_Peru"
instruments = ["BVN", "SCCO"]

[[portfolios]]
name = "P_Norteamerica"
instruments = ["FCX", "HL", "HBM", "FM.TO"]
"#;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn omitted_sections_fall_back_to_the_standard_study() {
    let config = load_config_from_str(MINIMAL).unwrap();

    assert_eq!(config.risk.window, 21);
    assert_eq!(config.risk.tail_probability, dec!(0.05));
    assert_eq!(config.windows.analysis_months, 2);
    assert_eq!(config.windows.margin_days, 32);
    assert_eq!(config.data.source, DataSource::Csv);
    assert_eq!(config.logging.level, "info");
    assert_eq!(config.event_dates, vec![date(2020, 3, 9), date(2022, 12, 1)]);
}

#[test]
fn portfolios_keep_file_order_and_ticker_case() {
    let config = load_config_from_str(MINIMAL).unwrap();
    let portfolios = config.build_portfolios().unwrap();

    let names: Vec<_> = portfolios.iter().map(|p| p.name()).collect();
    assert_eq!(names, vec!["P_Peru", "P_Norteamerica"]);

    let tickers: Vec<_> = portfolios[1].instruments().iter().map(|i| i.as_str()).collect();
    assert_eq!(tickers, vec!["FCX", "HL", "HBM", "FM.TO"]);

    assert_eq!(config.all_instruments().unwrap().len(), 6);
}

#[test]
fn explicit_risk_and_window_sections_are_read() {
    let toml = format!(
        "{MINIMAL}\n[risk]\nwindow = 30\ntail_probability = \"0.10\"\n\n[windows]\nanalysis_months = 1\nmargin_days = 45\n"
    );
    let config = load_config_from_str(&toml).unwrap();
    assert_eq!(config.risk.window, 30);
    assert_eq!(config.risk.tail_probability, dec!(0.10));
    assert_eq!(config.windows.spec().margin_days, 45);
}

#[test]
fn tail_probability_outside_unit_interval_is_rejected() {
    let toml = format!("{MINIMAL}\n[risk]\ntail_probability = \"1.5\"\n");
    let err = load_config_from_str(&toml).unwrap_err();
    assert!(matches!(err, ConfigError::ValidationError(_)), "{err}");
}

#[test]
fn duplicate_tickers_in_a_portfolio_are_rejected() {
    let toml = r#"
event_dates = ["2020-03-09"]

[data]
start = "2019-12-01"
end = "2024-12-01"

[[portfolios]]
name = "P_Peru"
instruments = ["BVN", "BVN"]
"#;
    let err = load_config_from_str(toml).unwrap_err();
    assert!(matches!(err, ConfigError::Definition(_)), "{err}");
}

#[test]
fn duplicate_portfolio_names_are_rejected() {
    let toml = format!("{MINIMAL}\n[[portfolios]]\nname = \"P_Peru\"\ninstruments = [\"FCX\"]\n");
    let err = load_config_from_str(&toml).unwrap_err();
    assert!(matches!(err, ConfigError::ValidationError(_)), "{err}");
}

#[test]
fn repeated_event_dates_are_rejected() {
    let toml = MINIMAL.replace("\"2022-12-01\"]", "\"2020-03-09\"]");
    let err = load_config_from_str(&toml).unwrap_err();
    assert!(matches!(err, ConfigError::ValidationError(_)), "{err}");
}

#[test]
fn reversed_data_range_is_rejected() {
    let toml = MINIMAL.replace("start = \"2019-12-01\"", "start = \"2025-01-01\"");
    let err = load_config_from_str(&toml).unwrap_err();
    assert!(matches!(err, ConfigError::ValidationError(_)), "{err}");
}

#[test]
fn missing_event_dates_is_a_load_error() {
    let toml = MINIMAL.replace("event_dates = [\"2020-03-09\", \"2022-12-01\"]", "");
    assert!(matches!(
        load_config_from_str(&toml),
        Err(ConfigError::LoadError(_))
    ));
}
