use chrono::{Datelike, Days, NaiveDate};
use derive_more::Display;

/// An inclusive range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[display("{start} ~ {end}")]
pub struct DateWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateWindow {
    #[must_use]
    pub const fn start(&self) -> NaiveDate {
        self.start
    }

    #[must_use]
    pub const fn end(&self) -> NaiveDate {
        self.end
    }

    /// Replaces `{start}` and `{end}` in `template` with the dates of the window.
    #[must_use]
    pub fn formatted(&self, template: &str) -> String {
        template
            .replace("{start}", &self.start.to_string())
            .replace("{end}", &self.end.to_string())
    }
}

/// Returns the Monday and Sunday of the week before the one `reference`
/// falls in.
#[must_use]
pub fn previous_week_range(reference: NaiveDate) -> DateWindow {
    // Monday = 0
    let offset = u64::from(reference.weekday().num_days_from_monday());
    let week_start = reference - Days::new(offset);

    DateWindow {
        start: week_start - Days::new(7),
        end: week_start - Days::new(1),
    }
}
