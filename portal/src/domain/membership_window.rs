//! Membership start and end date arithmetic.
//!
//! End dates use calendar-aware month addition: a start on the 31st that
//! lands in a shorter month is clamped to that month's last day rather than
//! spilling into the next month.

use chrono::{DateTime, Months, NaiveDate, TimeZone};
use serde::Serialize;

/// Errors raised while computing a membership window.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MembershipWindowError {
    /// Plans always cover at least one month.
    #[error("membership duration must be at least one month")]
    ZeroDuration,
    /// The end date falls outside the supported calendar range.
    #[error("membership ending {months} months after {start} is out of range")]
    OutOfRange {
        /// Start date of the window.
        start: NaiveDate,
        /// Requested duration.
        months: u32,
    },
}

/// Start and end dates of a membership.
///
/// Both dates serialise as ISO calendar dates (`YYYY-MM-DD`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipWindow {
    start_date: NaiveDate,
    end_date: NaiveDate,
}

impl MembershipWindow {
    /// Build a window beginning on `start_date` and lasting `months`.
    ///
    /// # Errors
    ///
    /// Returns [`MembershipWindowError::ZeroDuration`] for a zero duration and
    /// [`MembershipWindowError::OutOfRange`] when the end date overflows.
    ///
    /// # Examples
    /// ```
    /// use chrono::NaiveDate;
    /// use portal::domain::MembershipWindow;
    ///
    /// let start = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
    /// let window = MembershipWindow::starting(start, 1).unwrap();
    /// assert_eq!(window.end_date(), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
    /// ```
    pub fn starting(start_date: NaiveDate, months: u32) -> Result<Self, MembershipWindowError> {
        if months == 0 {
            return Err(MembershipWindowError::ZeroDuration);
        }
        let end_date = start_date
            .checked_add_months(Months::new(months))
            .ok_or(MembershipWindowError::OutOfRange {
                start: start_date,
                months,
            })?;
        Ok(Self {
            start_date,
            end_date,
        })
    }

    /// First day of the membership.
    pub const fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    /// Day the membership ends.
    pub const fn end_date(&self) -> NaiveDate {
        self.end_date
    }
}

/// Compute the window for a plan starting on the calendar day of `reference`.
///
/// The reference instant is truncated to its calendar day in its own time
/// zone, so a local "now" yields the local date.
///
/// # Errors
///
/// See [`MembershipWindow::starting`].
pub fn compute_window<Tz: TimeZone>(
    reference: &DateTime<Tz>,
    duration_months: u32,
) -> Result<MembershipWindow, MembershipWindowError> {
    MembershipWindow::starting(reference.date_naive(), duration_months)
}
