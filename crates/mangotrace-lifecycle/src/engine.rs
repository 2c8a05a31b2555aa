//! Lifecycle engine: drives the batch state machine.
//!
//! ```text
//! START --Order--> ORDERED --Ship--> SHIPPED --Issue--> ISSUED
//!   \                 \                  \
//!    `---------------- `------------------`---> ERROR (any rejected action)
//! ```
//!
//! Each [`Action`] carries its rule as data; [`transition`] is the single
//! place that checks and applies a rule. A rejected action does not leave
//! the record untouched: its status is set to ERROR and written back in
//! the same transaction, so the failed attempt stays visible on the
//! ledger. No action accepts ERROR, and there is no recovery action.

use std::fmt;

use mango_core::{AssetRecord, AssetStatus, Party};
use mangotrace_ledger::LedgerStore;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{TraceError, TraceResult};
use crate::repository::Repository;

/// A custody handoff requested by a supply-chain party.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Exporter orders a batch from the farmer.
    Order,
    /// Farmer ships the batch to the exporter's office.
    Ship,
    /// Exporter issues the batch to the destination country.
    Issue,
}

/// What an action requires and what it produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionRule {
    pub requires: AssetStatus,
    pub produces: AssetStatus,
    pub custody_from: Party,
    pub custody_to: Party,
}

impl Action {
    pub const ALL: [Action; 3] = [Action::Order, Action::Ship, Action::Issue];

    pub fn rule(self) -> TransitionRule {
        match self {
            Action::Order => TransitionRule {
                requires: AssetStatus::Start,
                produces: AssetStatus::Ordered,
                custody_from: Party::Exporter,
                custody_to: Party::Farmer,
            },
            Action::Ship => TransitionRule {
                requires: AssetStatus::Ordered,
                produces: AssetStatus::Shipped,
                custody_from: Party::Farmer,
                custody_to: Party::Exporter,
            },
            Action::Issue => TransitionRule {
                requires: AssetStatus::Shipped,
                produces: AssetStatus::Issued,
                custody_from: Party::Exporter,
                custody_to: Party::Country1,
            },
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Action::Order => "Order",
            Action::Ship => "Ship",
            Action::Issue => "Issue",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Action::ALL.into_iter().find(|action| action.name() == name)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Apply `action` to `record` in place.
///
/// On a status mismatch the record's status becomes ERROR (all other
/// fields untouched) and `InvalidTransition` is returned.
pub fn transition(
    record: &mut AssetRecord,
    action: Action,
    comment: &str,
    location: &str,
) -> TraceResult<()> {
    let rule = action.rule();
    if record.status != rule.requires {
        let actual = record.status;
        record.status = AssetStatus::Error;
        return Err(TraceError::InvalidTransition {
            batch_id: record.batch_id.clone(),
            action,
            expected: rule.requires,
            actual,
        });
    }

    record.status = rule.produces;
    record.location = location.to_string();
    record.custody_from = rule.custody_from.as_str().to_string();
    record.custody_to = rule.custody_to.as_str().to_string();
    record.comment = comment.to_string();
    Ok(())
}

/// Applies [`Action`]s to stored batches.
pub struct LifecycleEngine<'a, L: LedgerStore> {
    repo: Repository<'a, L>,
}

impl<'a, L: LedgerStore> LifecycleEngine<'a, L> {
    pub fn new(repo: Repository<'a, L>) -> Self {
        Self { repo }
    }

    /// Validate and apply `action` to a stored batch, returning the updated record.
    ///
    /// A rejected action still commits: the batch is left in ERROR.
    pub fn apply_transition(
        &self,
        batch_id: &str,
        action: Action,
        comment: &str,
        location: &str,
    ) -> TraceResult<AssetRecord> {
        let outcome = self.repo.update(batch_id, |record| {
            transition(record, action, comment, location).map(|()| record.clone())
        })?;

        match &outcome {
            Ok(record) => info!(
                batch_id = %batch_id,
                action = %action,
                status = %record.status,
                from = %record.custody_from,
                to = %record.custody_to,
                terminal = record.status.is_terminal(),
                "transition applied"
            ),
            Err(e) => warn!(
                batch_id = %batch_id,
                action = %action,
                error = %e,
                "transition rejected, batch marked ERROR"
            ),
        }
        outcome
    }
}
