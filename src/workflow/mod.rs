//! Guarded ledger workflows.
//!
//! Every operation runs the same way: the role gate, then reads on one ledger
//! context, then the ordered guards, then a single invoke on a context
//! acquired right before it (see [`Workflow::commit`]).

use serde::de::DeserializeOwned;
use serde::Serialize;
use utoipa::ToSchema;

use crate::data::user::UserDirectory;
use crate::data::Certificate;
use crate::error::WorkflowError;
use crate::gate::{self, Caller};
use crate::ledger::{Context, Ledger, Receipt};
use crate::role::Role;

pub mod certificate;
pub mod class;
pub mod course;
pub mod enrollment;
pub mod me;
pub mod people;
pub mod score;
pub mod subject;

/// Runs once a certificate has been committed.
///
/// Nothing in the workflows marks `Score::certificated`; deployments that
/// want it set install a hook here.
#[rocket::async_trait]
pub trait CertificationHook: Send + Sync {
    async fn certificate_issued(
        &self,
        ledger: &dyn Ledger,
        certificate: &Certificate,
    ) -> Result<(), WorkflowError>;
}

/// Outcome of a committed transaction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Committed {
    /// Identifier generated for a created entity.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub transaction_id: Option<String>,
}

impl Committed {
    fn new(receipt: Receipt) -> Committed {
        Committed {
            id: None,
            transaction_id: receipt.transaction_id,
        }
    }

    fn created(id: String, receipt: Receipt) -> Committed {
        Committed {
            id: Some(id),
            ..Committed::new(receipt)
        }
    }
}

pub struct Workflow<'a> {
    ledger: &'a dyn Ledger,
    directory: &'a dyn UserDirectory,
    caller: &'a Caller,
    hook: Option<&'a dyn CertificationHook>,
}

impl<'a> Workflow<'a> {
    pub fn new(
        ledger: &'a dyn Ledger,
        directory: &'a dyn UserDirectory,
        caller: &'a Caller,
    ) -> Workflow<'a> {
        Workflow {
            ledger,
            directory,
            caller,
            hook: None,
        }
    }

    pub fn with_hook(mut self, hook: Option<&'a dyn CertificationHook>) -> Self {
        self.hook = hook;
        self
    }

    pub fn caller(&self) -> &Caller {
        self.caller
    }

    fn authorize(&self, required: &[Role]) -> Result<(), WorkflowError> {
        let decision = gate::authorize(self.caller.role, required);
        if decision == gate::Decision::Deny {
            tracing::info!(
                "denied {} ({}) for roles {:?}",
                self.caller.username,
                self.caller.role,
                required
            );
        }
        decision.into_result()
    }

    async fn connect(&self) -> Result<Context, WorkflowError> {
        Ok(self.ledger.connect(&self.caller.identity()).await?)
    }

    /// Decoded snapshot, `None` when the chaincode returned nothing.
    async fn fetch<T: DeserializeOwned>(
        &self,
        ctx: &Context,
        func: &str,
        args: &[&str],
    ) -> Result<Option<T>, WorkflowError> {
        fetch(self.ledger, ctx, func, args).await
    }

    async fn fetch_list<T: DeserializeOwned>(
        &self,
        ctx: &Context,
        func: &str,
        args: &[&str],
    ) -> Result<Vec<T>, WorkflowError> {
        Ok(self.ledger.query(ctx, func, args).await?.decode_list()?)
    }

    async fn fetch_existing<T: DeserializeOwned>(
        &self,
        ctx: &Context,
        func: &str,
        args: &[&str],
        missing: &str,
    ) -> Result<T, WorkflowError> {
        self.fetch(ctx, func, args)
            .await?
            .ok_or_else(|| WorkflowError::not_found(missing))
    }

    /// Invoke on a freshly acquired context so the transaction is built
    /// against the channel state the guards just read.
    async fn commit(&self, func: &str, args: &[&str]) -> Result<Receipt, WorkflowError> {
        let ctx = self.connect().await?;
        let receipt = self.ledger.invoke(ctx, func, args).await?;
        tracing::info!(
            "{} committed {} ({:?})",
            self.caller.username,
            func,
            receipt.transaction_id
        );
        Ok(receipt)
    }
}

async fn fetch<T: DeserializeOwned>(
    ledger: &dyn Ledger,
    ctx: &Context,
    func: &str,
    args: &[&str],
) -> Result<Option<T>, WorkflowError> {
    let snapshot = ledger.query(ctx, func, args).await?;
    if snapshot.is_null() {
        return Ok(None);
    }
    Ok(Some(snapshot.decode()?))
}
