//! In-progress membership registration record.
//!
//! The draft is plain mutable client state. Every setter that affects the
//! membership dates recomputes the end date so it always equals the start
//! date plus the selected plan's duration.

use std::fmt;

use chrono::NaiveDate;
use mockable::Clock;
use serde::{Deserialize, Serialize};

use super::membership_window::{MembershipWindow, MembershipWindowError};
use super::photo::Photo;
use super::plan::{Plan, PlanCatalog, PlanId};

/// How the member intends to pay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Pay at the front desk.
    Cash,
    /// Pay through the online gateway.
    #[default]
    Online,
}

impl PaymentMethod {
    /// Wire value sent in the `paymentMethod` form field.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::Online => "online",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The not-yet-submitted registration held in client state.
///
/// ## Invariants
/// - `window.end_date()` equals the start date plus the duration of
///   `plan_id`; [`RegistrationDraft::select_plan`] and
///   [`RegistrationDraft::set_start_date`] maintain this.
/// - Text fields hold raw user input; [`crate::domain::validate_draft`]
///   decides whether they are acceptable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationDraft {
    /// Member's full name.
    pub name: String,
    /// Contact email.
    pub email: String,
    /// Ten-digit phone number.
    pub phone: String,
    /// Date of birth, unset until the member picks one.
    pub date_of_birth: Option<NaiveDate>,
    /// Optional profile photo.
    pub photo: Option<Photo>,
    /// Chosen payment method.
    pub payment_method: PaymentMethod,
    plan_id: PlanId,
    window: MembershipWindow,
}

impl RegistrationDraft {
    /// Fresh draft starting today on the 1-month plan with online payment.
    ///
    /// # Errors
    ///
    /// Returns [`MembershipWindowError`] only if the clock reports a date at
    /// the edge of the supported calendar.
    pub fn new(clock: &dyn Clock) -> Result<Self, MembershipWindowError> {
        Self::starting_on(clock.local().date_naive())
    }

    /// Fresh draft with defaults and an explicit start date.
    ///
    /// # Errors
    ///
    /// See [`MembershipWindow::starting`].
    pub fn starting_on(start_date: NaiveDate) -> Result<Self, MembershipWindowError> {
        let plan_id = PlanId::OneMonth;
        let window =
            MembershipWindow::starting(start_date, PlanCatalog::lookup(plan_id).duration_months())?;
        Ok(Self {
            name: String::new(),
            email: String::new(),
            phone: String::new(),
            date_of_birth: None,
            photo: None,
            payment_method: PaymentMethod::default(),
            plan_id,
            window,
        })
    }

    /// Currently selected plan identifier.
    pub const fn plan_id(&self) -> PlanId {
        self.plan_id
    }

    /// Currently selected plan.
    pub fn plan(&self) -> Plan {
        PlanCatalog::lookup(self.plan_id)
    }

    /// Price of the selected plan in whole rupees.
    pub fn price_rupees(&self) -> u32 {
        self.plan().price_rupees()
    }

    /// Membership start and end dates.
    pub const fn window(&self) -> MembershipWindow {
        self.window
    }

    /// Switch plans and recompute the end date.
    ///
    /// # Errors
    ///
    /// Leaves the draft untouched and returns the window error on overflow.
    pub fn select_plan(&mut self, plan_id: PlanId) -> Result<(), MembershipWindowError> {
        let months = PlanCatalog::lookup(plan_id).duration_months();
        self.window = MembershipWindow::starting(self.window.start_date(), months)?;
        self.plan_id = plan_id;
        Ok(())
    }

    /// Move the start date and recompute the end date.
    ///
    /// # Errors
    ///
    /// Leaves the draft untouched and returns the window error on overflow.
    pub fn set_start_date(&mut self, start_date: NaiveDate) -> Result<(), MembershipWindowError> {
        self.window = MembershipWindow::starting(start_date, self.plan().duration_months())?;
        Ok(())
    }
}
