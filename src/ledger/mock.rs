use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use serde_json::Value;

use super::{Context, Identity, Ledger, LedgerError, Receipt, Snapshot};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallKind {
    Connect,
    Query,
    Invoke,
}

#[derive(Debug, Clone)]
pub struct Call {
    pub kind: CallKind,
    pub identity: Identity,
    pub func: String,
    pub args: Vec<String>,
    pub generation: u64,
}

/// In-memory ledger returning canned snapshots.
///
/// Every invoke must use a context acquired after the last query made
/// through this ledger; a stale context panics the test.
#[derive(Debug, Default)]
pub struct ScriptedLedger {
    by_args: Mutex<HashMap<(String, Vec<String>), Value>>,
    by_func: Mutex<HashMap<String, Value>>,
    failing: Mutex<Vec<String>>,
    refuse_connect: Mutex<bool>,
    calls: Mutex<Vec<Call>>,
    generation: AtomicU64,
}

impl ScriptedLedger {
    pub fn new() -> ScriptedLedger {
        ScriptedLedger::default()
    }

    /// Answer `func` with `value` whatever the arguments.
    pub fn on(self, func: &str, value: Value) -> Self {
        self.by_func
            .lock()
            .unwrap()
            .insert(func.to_string(), value);
        self
    }

    /// Answer `func(args)` with `value`; takes precedence over [`Self::on`].
    pub fn on_args(self, func: &str, args: &[&str], value: Value) -> Self {
        self.by_args.lock().unwrap().insert(
            (
                func.to_string(),
                args.iter().map(|a| a.to_string()).collect(),
            ),
            value,
        );
        self
    }

    /// Make queries and invokes of `func` fail.
    pub fn failing(self, func: &str) -> Self {
        self.failing.lock().unwrap().push(func.to_string());
        self
    }

    pub fn refusing_connections(self) -> Self {
        *self.refuse_connect.lock().unwrap() = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn queries(&self) -> Vec<String> {
        self.calls_of(CallKind::Query)
    }

    pub fn invocations(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| c.kind == CallKind::Invoke)
            .collect()
    }

    pub fn invoked(&self, func: &str) -> Option<Vec<String>> {
        self.invocations()
            .into_iter()
            .find(|c| c.func == func)
            .map(|c| c.args)
    }

    pub fn connections(&self) -> Vec<Identity> {
        self.calls()
            .into_iter()
            .filter(|c| c.kind == CallKind::Connect)
            .map(|c| c.identity)
            .collect()
    }

    fn calls_of(&self, kind: CallKind) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.kind == kind)
            .map(|c| c.func)
            .collect()
    }

    fn record(&self, kind: CallKind, ctx_identity: &Identity, func: &str, args: &[&str], generation: u64) {
        self.calls.lock().unwrap().push(Call {
            kind,
            identity: ctx_identity.clone(),
            func: func.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
            generation,
        });
    }

    fn fails(&self, func: &str) -> bool {
        self.failing.lock().unwrap().iter().any(|f| f == func)
    }

    fn answer(&self, func: &str, args: &[&str]) -> Value {
        let key = (
            func.to_string(),
            args.iter().map(|a| a.to_string()).collect::<Vec<_>>(),
        );
        if let Some(value) = self.by_args.lock().unwrap().get(&key) {
            return value.clone();
        }
        self.by_func
            .lock()
            .unwrap()
            .get(func)
            .cloned()
            .unwrap_or(Value::Null)
    }
}

#[rocket::async_trait]
impl Ledger for ScriptedLedger {
    async fn connect(&self, identity: &Identity) -> Result<Context, LedgerError> {
        if *self.refuse_connect.lock().unwrap() {
            return Err(LedgerError::Connect {
                identity: identity.to_string(),
                reason: "wallet unavailable".to_string(),
            });
        }

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.record(CallKind::Connect, identity, "", &[], generation);
        Ok(Context {
            identity: identity.clone(),
            session: format!("session-{}", generation),
            generation,
        })
    }

    async fn query(
        &self,
        ctx: &Context,
        func: &str,
        args: &[&str],
    ) -> Result<Snapshot, LedgerError> {
        self.record(CallKind::Query, &ctx.identity, func, args, ctx.generation);
        if self.fails(func) {
            return Err(LedgerError::Query {
                func: func.to_string(),
                reason: "peer said no".to_string(),
            });
        }
        Ok(Snapshot::new(func, self.answer(func, args)))
    }

    async fn invoke(
        &self,
        ctx: Context,
        func: &str,
        args: &[&str],
    ) -> Result<Receipt, LedgerError> {
        let last_query = self
            .calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.kind == CallKind::Query)
            .map(|c| c.generation)
            .max()
            .unwrap_or(0);
        assert!(
            last_query == 0 || ctx.generation > last_query,
            "invoke '{}' used context #{} acquired before query context #{}",
            func,
            ctx.generation,
            last_query
        );

        self.record(CallKind::Invoke, &ctx.identity, func, args, ctx.generation);
        if self.fails(func) {
            return Err(LedgerError::Invoke {
                func: func.to_string(),
                reason: "endorsement failure: chaincode said no".to_string(),
            });
        }
        Ok(Receipt {
            transaction_id: Some(format!("tx-{}", ctx.generation)),
            payload: Value::Null,
        })
    }
}
