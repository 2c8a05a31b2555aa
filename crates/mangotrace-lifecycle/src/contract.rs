//! Named entry points, invoked with positional string arguments.
//!
//! [`Invocation::parse`] turns a function name and its arguments into a
//! typed request; [`MangoContract::invoke`] runs it against the ledger.
//! Order, Ship and Issue share one variant keyed by [`Action`].

use mango_core::config::TraceConfig;
use mango_core::{AssetRecord, BatchId, QueryResult};
use mangotrace_ledger::LedgerStore;
use serde::Serialize;
use tracing::info;

use crate::engine::{Action, LifecycleEngine};
use crate::error::{TraceError, TraceResult};
use crate::query::QueryService;
use crate::repository::Repository;

/// A parsed entry-point call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    InitLedger,
    AddMango {
        batch_id: BatchId,
        variety: String,
        location: String,
        fertilizer: String,
        freshness: String,
    },
    QueryMango {
        batch_id: BatchId,
    },
    QueryAllMango,
    ChangeMangoFreshLevel {
        batch_id: BatchId,
        level: String,
    },
    InitMango {
        batch_id: BatchId,
        variety: String,
        origin: String,
    },
    Transition {
        action: Action,
        batch_id: BatchId,
        comment: String,
        location: String,
    },
    Query {
        batch_id: BatchId,
    },
}

impl Invocation {
    pub fn parse(function: &str, args: &[String]) -> TraceResult<Self> {
        if let Some(action) = Action::from_name(function) {
            let [batch_id, comment, location] = expect_args::<3>(function, args)?;
            return Ok(Invocation::Transition {
                action,
                batch_id,
                comment,
                location,
            });
        }

        let invocation = match function {
            "InitLedger" => {
                let [] = expect_args::<0>(function, args)?;
                Invocation::InitLedger
            }
            "AddMango" => {
                let [batch_id, variety, location, fertilizer, freshness] =
                    expect_args::<5>(function, args)?;
                Invocation::AddMango {
                    batch_id,
                    variety,
                    location,
                    fertilizer,
                    freshness,
                }
            }
            "QueryMango" => {
                let [batch_id] = expect_args::<1>(function, args)?;
                Invocation::QueryMango { batch_id }
            }
            "QueryAllMango" => {
                let [] = expect_args::<0>(function, args)?;
                Invocation::QueryAllMango
            }
            "ChangeMangoFreshLevel" => {
                let [batch_id, level] = expect_args::<2>(function, args)?;
                Invocation::ChangeMangoFreshLevel { batch_id, level }
            }
            "initMango" => {
                let [batch_id, variety, origin] = expect_args::<3>(function, args)?;
                Invocation::InitMango {
                    batch_id,
                    variety,
                    origin,
                }
            }
            "Query" => {
                let [batch_id] = expect_args::<1>(function, args)?;
                Invocation::Query { batch_id }
            }
            other => return Err(TraceError::UnknownFunction(other.to_string())),
        };
        Ok(invocation)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Invocation::InitLedger => "InitLedger",
            Invocation::AddMango { .. } => "AddMango",
            Invocation::QueryMango { .. } => "QueryMango",
            Invocation::QueryAllMango => "QueryAllMango",
            Invocation::ChangeMangoFreshLevel { .. } => "ChangeMangoFreshLevel",
            Invocation::InitMango { .. } => "initMango",
            Invocation::Transition { action, .. } => action.name(),
            Invocation::Query { .. } => "Query",
        }
    }
}

fn expect_args<const N: usize>(function: &str, args: &[String]) -> TraceResult<[String; N]> {
    <[String; N]>::try_from(args.to_vec()).map_err(|got| {
        TraceError::InvalidArgument(format!(
            "{function} expects {N} arguments, got {}",
            got.len()
        ))
    })
}

/// Payload returned to the invoking platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Response {
    Empty,
    Record(AssetRecord),
    Records(Vec<QueryResult>),
}

impl Response {
    /// JSON bytes of the payload; empty for [`Response::Empty`].
    pub fn to_bytes(&self) -> TraceResult<Vec<u8>> {
        if *self == Response::Empty {
            return Ok(Vec::new());
        }
        serde_json::to_vec(self).map_err(|e| TraceError::Serialization {
            key: "response".to_string(),
            reason: e.to_string(),
        })
    }
}

/// The mango traceability contract, bound to one ledger.
pub struct MangoContract<L: LedgerStore> {
    ledger: L,
    default_freshness: String,
    page_size: usize,
}

impl<L: LedgerStore> MangoContract<L> {
    pub fn new(ledger: L, config: &TraceConfig) -> Self {
        Self {
            ledger,
            default_freshness: config.defaults.freshness.clone(),
            page_size: config.ledger.scan_page_size.max(1),
        }
    }

    fn repository(&self) -> Repository<'_, L> {
        Repository::new(&self.ledger).with_page_size(self.page_size)
    }

    fn engine(&self) -> LifecycleEngine<'_, L> {
        LifecycleEngine::new(self.repository())
    }

    fn queries(&self) -> QueryService<'_, L> {
        QueryService::new(self.repository())
    }

    /// Seed the ledger with the ten sample batches `MANGO0`..`MANGO9`.
    pub fn init_ledger(&self) -> TraceResult<()> {
        let seeds = seed_records();
        self.repository().create_all(&seeds)?;
        info!(count = seeds.len(), "ledger seeded");
        Ok(())
    }

    pub fn add_mango(
        &self,
        batch_id: &str,
        variety: &str,
        location: &str,
        fertilizer: &str,
        freshness: &str,
    ) -> TraceResult<()> {
        let record = AssetRecord::new(batch_id, variety, location, Some(fertilizer), freshness);
        self.repository().create(&record)?;
        info!(batch_id = %batch_id, variety = %variety, "batch added");
        Ok(())
    }

    pub fn init_mango(&self, batch_id: &str, variety: &str, origin: &str) -> TraceResult<()> {
        let record = AssetRecord::new(batch_id, variety, origin, None, &self.default_freshness);
        self.repository().create(&record)?;
        info!(batch_id = %batch_id, variety = %variety, "batch initialised");
        Ok(())
    }

    pub fn query_mango(&self, batch_id: &str) -> TraceResult<AssetRecord> {
        self.queries().query_one(batch_id)
    }

    pub fn query(&self, batch_id: &str) -> TraceResult<AssetRecord> {
        self.queries().query_one(batch_id)
    }

    pub fn query_all_mango(&self) -> TraceResult<Vec<QueryResult>> {
        self.queries().query_all()
    }

    pub fn change_mango_fresh_level(
        &self,
        batch_id: &str,
        level: &str,
    ) -> TraceResult<AssetRecord> {
        self.queries().update_freshness(batch_id, level)
    }

    pub fn order(&self, batch_id: &str, comment: &str, location: &str) -> TraceResult<AssetRecord> {
        self.engine().apply_transition(batch_id, Action::Order, comment, location)
    }

    pub fn ship(&self, batch_id: &str, comment: &str, location: &str) -> TraceResult<AssetRecord> {
        self.engine().apply_transition(batch_id, Action::Ship, comment, location)
    }

    pub fn issue(&self, batch_id: &str, comment: &str, location: &str) -> TraceResult<AssetRecord> {
        self.engine().apply_transition(batch_id, Action::Issue, comment, location)
    }

    pub fn invoke(&self, invocation: Invocation) -> TraceResult<Response> {
        let response = match invocation {
            Invocation::InitLedger => {
                self.init_ledger()?;
                Response::Empty
            }
            Invocation::AddMango {
                batch_id,
                variety,
                location,
                fertilizer,
                freshness,
            } => {
                self.add_mango(&batch_id, &variety, &location, &fertilizer, &freshness)?;
                Response::Empty
            }
            Invocation::QueryMango { batch_id } => Response::Record(self.query_mango(&batch_id)?),
            Invocation::QueryAllMango => Response::Records(self.query_all_mango()?),
            Invocation::ChangeMangoFreshLevel { batch_id, level } => {
                self.change_mango_fresh_level(&batch_id, &level)?;
                Response::Empty
            }
            Invocation::InitMango {
                batch_id,
                variety,
                origin,
            } => {
                self.init_mango(&batch_id, &variety, &origin)?;
                Response::Empty
            }
            Invocation::Transition {
                action,
                batch_id,
                comment,
                location,
            } => Response::Record(
                self.engine().apply_transition(&batch_id, action, &comment, &location)?,
            ),
            Invocation::Query { batch_id } => Response::Record(self.query(&batch_id)?),
        };
        Ok(response)
    }
}

fn seed_records() -> Vec<AssetRecord> {
    (0..10)
        .map(|i| {
            let variety = if i == 0 {
                "Alphonso".to_string()
            } else {
                format!("Variety{i}")
            };
            AssetRecord::new(
                &format!("MANGO{i}"),
                &variety,
                &format!("Location{}", (i + 1) % 10),
                Some(&format!("Fertilize{i}")),
                &format!("Level{i}"),
            )
        })
        .collect()
}
