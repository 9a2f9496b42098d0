//! Capability map and the gate that shows or hides UI fragments from it.
//!
//! A capability is a boolean keyed by `(module, action)`, e.g.
//! `(patients, create)`. The gate is binary presence/absence and fails
//! closed: anything not explicitly `true` (missing module, missing action,
//! `false`, or an unset target) keeps the fragment unmounted.

use crate::session::SessionService;
use std::collections::HashMap;
use tokio::task::JoinHandle;

pub type Capabilities = HashMap<String, HashMap<String, bool>>;

/// Fail-closed capability check.
#[must_use]
pub fn allowed(capabilities: &Capabilities, module: &str, action: &str) -> bool {
    capabilities
        .get(module)
        .and_then(|actions| actions.get(action))
        .copied()
        .unwrap_or(false)
}

/// Transition reported by one gate evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateChange {
    Mounted,
    Unmounted,
    Unchanged,
}

/// Conditional-rendering control for one `(module, action)` pair.
#[derive(Debug, Default)]
pub struct CapabilityGate {
    module: Option<String>,
    action: Option<String>,
    rendered: bool,
}

impl CapabilityGate {
    #[must_use]
    pub fn new(module: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            module: Some(module.into()),
            action: Some(action.into()),
            rendered: false,
        }
    }

    /// Change the pair under evaluation; the next `evaluate` reflects it.
    pub fn set_target(&mut self, module: Option<String>, action: Option<String>) {
        self.module = module;
        self.action = action;
    }

    /// Re-evaluate against a capability map and report the transition.
    pub fn evaluate(&mut self, capabilities: &Capabilities) -> GateChange {
        let visible = match (&self.module, &self.action) {
            (Some(module), Some(action)) => allowed(capabilities, module, action),
            _ => false,
        };

        match (visible, self.rendered) {
            (true, false) => {
                self.rendered = true;
                GateChange::Mounted
            }
            (false, true) => {
                self.rendered = false;
                GateChange::Unmounted
            }
            _ => GateChange::Unchanged,
        }
    }

    #[must_use]
    pub fn is_rendered(&self) -> bool {
        self.rendered
    }
}

/// Keeps a gate subscribed to the session's capability stream, invoking the
/// callback on every mount/unmount transition. Dropping the binding ends the
/// subscription, so a torn-down fragment cannot leak evaluation callbacks.
pub struct GateBinding {
    task: JoinHandle<()>,
}

impl GateBinding {
    pub fn bind<F>(session: &SessionService, mut gate: CapabilityGate, mut on_change: F) -> Self
    where
        F: FnMut(GateChange) + Send + 'static,
    {
        let mut changes = session.capability_changes();

        let task = tokio::spawn(async move {
            let current = changes.borrow_and_update().clone();
            let change = gate.evaluate(&current);
            if change != GateChange::Unchanged {
                on_change(change);
            }

            while changes.changed().await.is_ok() {
                let current = changes.borrow_and_update().clone();
                let change = gate.evaluate(&current);
                if change != GateChange::Unchanged {
                    on_change(change);
                }
            }
        });

        Self { task }
    }
}

impl Drop for GateBinding {
    fn drop(&mut self) {
        self.task.abort();
    }
}
