//! Spending limits for autonomous agents.
//!
//! An [`AgentRuntime`] decides whether an agent may pay `price` to a given
//! domain, based on a total budget and an allow-list of domains. The
//! wildcard domain `*` allows every domain.

use std::sync::{Mutex, MutexGuard, PoisonError};

use rust_decimal::Decimal;

use crate::error::BudgetError;

/// Wildcard entry in [`AgentConfig::allowed_domains`].
pub const ANY_DOMAIN: &str = "*";

/// Budget and allow-list for one agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentConfig {
    /// Maximum total spend. `None` means unlimited.
    pub budget_limit: Option<Decimal>,
    /// Domains the agent may pay. Contains `*` by default.
    pub allowed_domains: Vec<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            budget_limit: None,
            allowed_domains: vec![ANY_DOMAIN.to_owned()],
        }
    }
}

impl AgentConfig {
    /// Sets the total budget.
    #[must_use]
    pub fn with_budget(mut self, limit: Decimal) -> Self {
        self.budget_limit = Some(limit);
        self
    }

    /// Replaces the allow-list.
    #[must_use]
    pub fn with_allowed_domains<I, S>(mut self, domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_domains = domains.into_iter().map(Into::into).collect();
        self
    }

    fn allows(&self, domain: &str) -> bool {
        self.allowed_domains
            .iter()
            .any(|allowed| allowed == ANY_DOMAIN || allowed.eq_ignore_ascii_case(domain))
    }
}

/// Tracks what an agent has spent against its [`AgentConfig`].
#[derive(Debug, Default)]
pub struct AgentRuntime {
    config: AgentConfig,
    spent: Mutex<Decimal>,
}

impl AgentRuntime {
    /// Creates a runtime with nothing spent.
    #[must_use]
    pub fn new(config: AgentConfig) -> Self {
        Self {
            config,
            spent: Mutex::new(Decimal::ZERO),
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Returns `true` if paying `price` to `domain` fits the budget and allow-list.
    #[must_use]
    pub fn can_execute(&self, price: Decimal, domain: &str) -> bool {
        let spent = self.lock_spent();
        self.check(*spent, price, domain).is_ok()
    }

    /// Adds `amount` to the spent total without any checks.
    pub fn record_spend(&self, amount: Decimal) {
        let mut spent = self.lock_spent();
        *spent = spent.saturating_add(amount);
    }

    /// Checks and records a spend as one step.
    ///
    /// # Errors
    ///
    /// Returns [`BudgetError`] if the price is negative, the domain is not
    /// allowed, or the budget would be exceeded. Nothing is recorded then.
    pub fn try_spend(&self, price: Decimal, domain: &str) -> Result<(), BudgetError> {
        let mut spent = self.lock_spent();
        self.check(*spent, price, domain)?;
        *spent = spent.saturating_add(price);
        #[cfg(feature = "telemetry")]
        tracing::debug!(%price, %domain, spent = %*spent, "agent spend recorded");
        Ok(())
    }

    /// Total spent so far.
    #[must_use]
    pub fn spent(&self) -> Decimal {
        *self.lock_spent()
    }

    /// Budget left, or `None` when the budget is unlimited.
    ///
    /// Goes negative if [`Self::record_spend`] pushed past the limit, and
    /// saturates at the bounds of [`Decimal`].
    #[must_use]
    pub fn remaining(&self) -> Option<Decimal> {
        let spent = *self.lock_spent();
        self.config.budget_limit.map(|limit| limit.saturating_sub(spent))
    }

    fn check(&self, spent: Decimal, price: Decimal, domain: &str) -> Result<(), BudgetError> {
        if price.is_sign_negative() && !price.is_zero() {
            return Err(BudgetError::NegativePrice(price));
        }
        if let Some(limit) = self.config.budget_limit {
            if spent.saturating_add(price) > limit {
                return Err(BudgetError::Exceeded {
                    price,
                    remaining: limit.saturating_sub(spent),
                });
            }
        }
        if !self.config.allows(domain) {
            return Err(BudgetError::DomainNotAllowed(domain.to_owned()));
        }
        Ok(())
    }

    fn lock_spent(&self) -> MutexGuard<'_, Decimal> {
        self.spent.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
