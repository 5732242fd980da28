//! Ordered guard pipelines.
//!
//! A pipeline runs its checks in declaration order against one snapshot and
//! stops at the first rejection, so rejection messages stay deterministic.

use crate::error::WorkflowError;

#[derive(Debug)]
pub enum Verdict {
    Allow,
    Reject(WorkflowError),
}

impl Verdict {
    pub fn is_allow(&self) -> bool {
        matches!(self, Verdict::Allow)
    }

    pub fn into_result(self) -> Result<(), WorkflowError> {
        match self {
            Verdict::Allow => Ok(()),
            Verdict::Reject(reason) => {
                tracing::info!("guard rejected: {}", reason);
                Err(reason)
            }
        }
    }
}

pub struct Guards<'s, S: ?Sized> {
    subject: &'s S,
    rejected: Option<WorkflowError>,
}

impl<'s, S: ?Sized> Guards<'s, S> {
    pub fn on(subject: &'s S) -> Self {
        Guards {
            subject,
            rejected: None,
        }
    }

    /// Reject with `reason` unless `check` holds.
    pub fn require<C, R>(mut self, check: C, reason: R) -> Self
    where
        C: FnOnce(&S) -> bool,
        R: FnOnce(&S) -> WorkflowError,
    {
        if self.rejected.is_none() && !check(self.subject) {
            self.rejected = Some(reason(self.subject));
        }
        self
    }

    /// Reject with `reason` if `check` holds.
    pub fn forbid<C, R>(self, check: C, reason: R) -> Self
    where
        C: FnOnce(&S) -> bool,
        R: FnOnce(&S) -> WorkflowError,
    {
        self.require(|s| !check(s), reason)
    }

    pub fn verdict(self) -> Verdict {
        match self.rejected {
            None => Verdict::Allow,
            Some(reason) => Verdict::Reject(reason),
        }
    }

    pub fn pass(self) -> Result<(), WorkflowError> {
        self.verdict().into_result()
    }
}
