//! Membership plans and the fixed pricing table.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identifier of a purchasable membership tier.
///
/// The wire form is the hyphenated label used by the registration endpoint,
/// e.g. `"3-month"` or `"yearly"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PlanId {
    /// One month of access.
    #[serde(rename = "1-month")]
    OneMonth,
    /// Two months of access.
    #[serde(rename = "2-month")]
    TwoMonth,
    /// Three months of access.
    #[serde(rename = "3-month")]
    ThreeMonth,
    /// Six months of access.
    #[serde(rename = "6-month")]
    SixMonth,
    /// Twelve months of access.
    #[serde(rename = "yearly")]
    Yearly,
}

impl PlanId {
    /// Wire label sent in the `plan` form field.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OneMonth => "1-month",
            Self::TwoMonth => "2-month",
            Self::ThreeMonth => "3-month",
            Self::SixMonth => "6-month",
            Self::Yearly => "yearly",
        }
    }
}

impl fmt::Display for PlanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Lookup failure for a plan label outside the catalogue.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("membership plan '{label}' not found")]
pub struct PlanNotFound {
    /// The label that failed to resolve.
    pub label: String,
}

impl FromStr for PlanId {
    type Err = PlanNotFound;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PlanCatalog::ALL
            .iter()
            .map(|plan| plan.id)
            .find(|id| id.as_str() == s.trim())
            .ok_or_else(|| PlanNotFound {
                label: s.to_owned(),
            })
    }
}

/// A membership tier with a fixed price and duration.
///
/// ## Invariants
/// - `duration_months` is greater than zero.
/// - Instances only exist inside [`PlanCatalog`]; callers never build them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    id: PlanId,
    display_name: &'static str,
    price_rupees: u32,
    duration_months: u32,
}

impl Plan {
    /// Plan identifier.
    pub const fn id(&self) -> PlanId {
        self.id
    }

    /// Human-readable plan name.
    pub const fn display_name(&self) -> &'static str {
        self.display_name
    }

    /// Price in whole Indian rupees.
    pub const fn price_rupees(&self) -> u32 {
        self.price_rupees
    }

    /// Number of calendar months the plan covers.
    pub const fn duration_months(&self) -> u32 {
        self.duration_months
    }
}

/// Read-only catalogue of every plan on sale.
///
/// # Examples
/// ```
/// use portal::domain::{PlanCatalog, PlanId};
///
/// let plan = PlanCatalog::lookup(PlanId::ThreeMonth);
/// assert_eq!(plan.duration_months(), 3);
/// assert_eq!(PlanCatalog::all().len(), 5);
/// ```
pub struct PlanCatalog;

impl PlanCatalog {
    const ALL: [Plan; 5] = [
        Plan {
            id: PlanId::OneMonth,
            display_name: "1 Month",
            price_rupees: 1000,
            duration_months: 1,
        },
        Plan {
            id: PlanId::TwoMonth,
            display_name: "2 Months",
            price_rupees: 1800,
            duration_months: 2,
        },
        Plan {
            id: PlanId::ThreeMonth,
            display_name: "3 Months",
            price_rupees: 2500,
            duration_months: 3,
        },
        Plan {
            id: PlanId::SixMonth,
            display_name: "6 Months",
            price_rupees: 4500,
            duration_months: 6,
        },
        Plan {
            id: PlanId::Yearly,
            display_name: "Yearly",
            price_rupees: 8000,
            duration_months: 12,
        },
    ];

    /// Every plan in ascending duration order.
    pub fn all() -> &'static [Plan] {
        &Self::ALL
    }

    /// Resolve a plan by identifier. Total over [`PlanId`].
    pub fn lookup(id: PlanId) -> Plan {
        match id {
            PlanId::OneMonth => Self::ALL[0],
            PlanId::TwoMonth => Self::ALL[1],
            PlanId::ThreeMonth => Self::ALL[2],
            PlanId::SixMonth => Self::ALL[3],
            PlanId::Yearly => Self::ALL[4],
        }
    }

    /// Resolve a plan from its wire label.
    ///
    /// # Errors
    ///
    /// Returns [`PlanNotFound`] when the label names no plan.
    pub fn lookup_label(label: &str) -> Result<Plan, PlanNotFound> {
        label.parse::<PlanId>().map(Self::lookup)
    }
}
