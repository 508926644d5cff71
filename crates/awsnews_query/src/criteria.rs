use awsnews_core::{Error, PostTypeFilter, Result};
use chrono::{Days, NaiveDate};

/// Which publish dates a query keeps. Bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateWindow {
    /// No date filtering at all
    #[default]
    Any,
    /// From `today - n days` through today
    DaysBack(u32),
    /// Explicit bounds; a missing side is unbounded
    Between {
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    },
}

impl DateWindow {
    /// Builds a window from raw tool arguments.
    ///
    /// `days_back` cannot be combined with explicit bounds. Blank date strings count as absent.
    pub fn from_args(
        from_date: Option<&str>,
        to_date: Option<&str>,
        days_back: Option<i64>,
    ) -> Result<Self> {
        let from_date = from_date.map(str::trim).filter(|s| !s.is_empty());
        let to_date = to_date.map(str::trim).filter(|s| !s.is_empty());

        match (from_date, to_date, days_back) {
            (None, None, None) => Ok(DateWindow::Any),
            (None, None, Some(days)) => Ok(DateWindow::DaysBack(parse_days_back(days)?)),
            (_, _, Some(_)) => Err(Error::InvalidArgument(
                "Cannot combine days_back with from_date/to_date".to_string(),
            )),
            (from, to, None) => {
                let window = DateWindow::Between {
                    from: from.map(|s| parse_date("from_date", s)).transpose()?,
                    to: to.map(|s| parse_date("to_date", s)).transpose()?,
                };
                window.validate()?;
                Ok(window)
            }
        }
    }

    /// Effective `(from, to)` bounds relative to `today`.
    pub fn resolve(&self, today: NaiveDate) -> (Option<NaiveDate>, Option<NaiveDate>) {
        match *self {
            DateWindow::Any => (None, None),
            DateWindow::DaysBack(days) => {
                let from = today
                    .checked_sub_days(Days::new(u64::from(days)))
                    .unwrap_or(NaiveDate::MIN);
                (Some(from), Some(today))
            }
            DateWindow::Between { from, to } => (from, to),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if let DateWindow::Between {
            from: Some(from),
            to: Some(to),
        } = self
        {
            if from > to {
                return Err(Error::InvalidArgument(format!(
                    "from_date {} is after to_date {}",
                    from, to
                )));
            }
        }
        Ok(())
    }
}

/// Everything one tool call filters on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterCriteria {
    pub post_type: PostTypeFilter,
    pub window: DateWindow,
    /// Case-sensitive exact category name
    pub category: Option<String>,
    pub popular_only: bool,
    /// Case-insensitive substring matched against title, url and slug
    pub text: Option<String>,
    pub limit: usize,
}

impl FilterCriteria {
    pub fn new(limit: usize) -> Self {
        Self {
            post_type: PostTypeFilter::Both,
            window: DateWindow::Any,
            category: None,
            popular_only: false,
            text: None,
            limit,
        }
    }

    pub fn with_post_type(mut self, post_type: PostTypeFilter) -> Self {
        self.post_type = post_type;
        self
    }

    pub fn with_window(mut self, window: DateWindow) -> Self {
        self.window = window;
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn popular_only(mut self) -> Self {
        self.popular_only = true;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.limit == 0 {
            return Err(Error::InvalidArgument("limit must be at least 1".to_string()));
        }
        self.window.validate()
    }
}

pub fn parse_date(field: &str, raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| {
        Error::InvalidArgument(format!("{} must be a YYYY-MM-DD date (got {:?})", field, raw))
    })
}

pub fn parse_limit(limit: i64) -> Result<usize> {
    if limit < 1 {
        return Err(Error::InvalidArgument(format!(
            "limit must be at least 1 (got {})",
            limit
        )));
    }
    usize::try_from(limit)
        .map_err(|_| Error::InvalidArgument(format!("limit is too large (got {})", limit)))
}

pub fn parse_days_back(days_back: i64) -> Result<u32> {
    if days_back < 0 {
        return Err(Error::InvalidArgument(format!(
            "days_back cannot be negative (got {})",
            days_back
        )));
    }
    u32::try_from(days_back)
        .map_err(|_| Error::InvalidArgument(format!("days_back is too large (got {})", days_back)))
}
