use chrono::{DateTime, FixedOffset, Local, NaiveDate};

/// Source of "now" for staleness checks and news dates.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<FixedOffset>;

    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Reads the local wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

/// Always reports the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    instant: DateTime<FixedOffset>,
}

impl FixedClock {
    pub fn new(instant: DateTime<FixedOffset>) -> Self {
        Self { instant }
    }

    pub fn from_rfc3339(value: &str) -> crate::Result<Self> {
        DateTime::parse_from_rfc3339(value)
            .map(Self::new)
            .map_err(|e| crate::Error::Invalid(format!("Invalid timestamp '{}': {}", value, e)))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.instant
    }
}

/// Whether `instant` falls on the same calendar day as the clock, in the clock's offset.
pub fn same_day<Tz: chrono::TimeZone>(clock: &dyn Clock, instant: &DateTime<Tz>) -> bool {
    let now = clock.now();
    instant.with_timezone(now.offset()).date_naive() == now.date_naive()
}
