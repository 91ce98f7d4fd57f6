use crate::error::CoreError;
use chrono::{Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// Sizing of the analysis window and of the lookback margin in front of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowSpec {
    /// Calendar months on each side of the event date.
    pub analysis_months: u32,
    /// Calendar days before the window start that feed the first rolling estimate.
    /// 32 days leave at least 21 trading observations in front of the window.
    pub margin_days: u32,
}

impl Default for WindowSpec {
    fn default() -> Self {
        Self {
            analysis_months: 2,
            margin_days: 32,
        }
    }
}

/// The dates that frame the study of one event.
///
/// Always satisfies `margin_start <= window_start <= anchor <= window_end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventWindow {
    pub anchor: NaiveDate,
    pub window_start: NaiveDate,
    pub window_end: NaiveDate,
    pub margin_start: NaiveDate,
}

impl EventWindow {
    /// Frames `anchor` with `spec`.
    ///
    /// Month arithmetic clamps to the last day of a shorter month, so
    /// 2024-04-30 minus two months is 2024-02-29.
    pub fn around(anchor: NaiveDate, spec: &WindowSpec) -> Result<Self, CoreError> {
        let months = Months::new(spec.analysis_months);
        let window_start = anchor.checked_sub_months(months).ok_or_else(|| {
            CoreError::DateOutOfRange(format!("{anchor} - {} months", spec.analysis_months))
        })?;
        let window_end = anchor.checked_add_months(months).ok_or_else(|| {
            CoreError::DateOutOfRange(format!("{anchor} + {} months", spec.analysis_months))
        })?;
        let margin_start = window_start
            .checked_sub_days(Days::new(u64::from(spec.margin_days)))
            .ok_or_else(|| {
                CoreError::DateOutOfRange(format!("{window_start} - {} days", spec.margin_days))
            })?;

        Ok(Self {
            anchor,
            window_start,
            window_end,
            margin_start,
        })
    }

    /// True when `date` lies in the analysis window `[window_start, window_end]`.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.window_start <= date && date <= self.window_end
    }
}
