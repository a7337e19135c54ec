//! Subscription plans and feature gating

use chrono::{DateTime, Months, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Error, Result};

/// A purchasable subscription plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionPlan {
    /// Plan key, e.g. `3_months`
    #[serde(default)]
    pub key: String,
    pub duration: String,
    /// Price per month
    pub monthly_price: f64,
    /// Number of months the plan covers
    pub interval_count: u32,
    pub currency: String,
}

impl SubscriptionPlan {
    pub fn total_price(&self) -> f64 {
        self.monthly_price * self.interval_count as f64
    }
}

/// A user's subscription state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserSubscription {
    #[serde(default)]
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_till: Option<DateTime<Utc>>,
}

impl UserSubscription {
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.active && self.active_till.is_some_and(|till| till >= now)
    }

    /// Gate for subscriber-only features
    pub fn require_active(&self, now: DateTime<Utc>) -> Result<()> {
        if self.is_active(now) {
            Ok(())
        } else {
            Err(Error::SubscriptionRequired)
        }
    }

    /// Activate (or renew) for the plan's duration.
    ///
    /// Time left on a running subscription is kept: the new period starts at
    /// the later of `now` and the current expiry.
    pub fn extend(&mut self, plan: &SubscriptionPlan, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
        let from = match self.active_till {
            Some(till) if self.active && till > now => till,
            _ => now,
        };
        let till = from
            .checked_add_months(Months::new(plan.interval_count))
            .ok_or_else(|| Error::InvalidData("Subscription end date out of range".into()))?;

        self.active = true;
        self.active_till = Some(till);
        info!("Subscription {} active until {}", plan.key, till.format("%Y-%m-%d"));
        Ok(till)
    }
}
