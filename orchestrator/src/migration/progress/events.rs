//! Migration progress events and event handling

use futures::stream::{Stream, StreamExt};
use tracing::{debug, error, info};

use crate::migration::types::{MigrationState, OperationKind, TxStatus};
use crate::services::errors::MigrationError;

/// Events that can occur during migration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationEvent {
    PlanComputed {
        operations: usize,
    },
    OperationStarted {
        kind: OperationKind,
    },
    StatusChanged {
        kind: OperationKind,
        status: TxStatus,
    },
    OperationCompleted {
        kind: OperationKind,
        tx_hash: Option<String>,
    },
    Completed {
        operations: usize,
    },
    Failed {
        kind: OperationKind,
        status: TxStatus,
    },
}

/// Event handler for migration events
pub trait MigrationEventHandler {
    fn handle_event(&self, event: &MigrationEvent);
}

/// Composite event handler that forwards events to multiple handlers
#[derive(Default)]
pub struct CompositeEventHandler {
    handlers: Vec<Box<dyn MigrationEventHandler>>,
}

impl CompositeEventHandler {
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    pub fn add_handler<H: MigrationEventHandler + 'static>(&mut self, handler: H) {
        self.handlers.push(Box::new(handler));
    }
}

impl MigrationEventHandler for CompositeEventHandler {
    fn handle_event(&self, event: &MigrationEvent) {
        for handler in &self.handlers {
            handler.handle_event(event);
        }
    }
}

/// Simple logging event handler
pub struct LoggingEventHandler;

impl MigrationEventHandler for LoggingEventHandler {
    fn handle_event(&self, event: &MigrationEvent) {
        match event {
            MigrationEvent::PlanComputed { operations } => {
                info!("[Event] Plan computed: {} operation(s)", operations);
            }
            MigrationEvent::OperationStarted { kind } => {
                info!("[Event] Operation started: {}", kind);
            }
            MigrationEvent::StatusChanged { kind, status } => {
                debug!("[Event] {} status: {:?}", kind, status);
            }
            MigrationEvent::OperationCompleted { kind, tx_hash } => {
                info!(
                    "[Event] Operation completed: {} (tx: {})",
                    kind,
                    tx_hash.as_deref().unwrap_or("unknown")
                );
            }
            MigrationEvent::Completed { operations } => {
                info!(
                    "[Event] Migration completed successfully ({} operation(s))",
                    operations
                );
            }
            MigrationEvent::Failed { kind, status } => {
                error!("[Event] Migration failed at {} with {:?}", kind, status);
            }
        }
    }
}

/// Translate one state transition into the events it implies.
pub fn transition_events(
    previous: Option<&MigrationState>,
    next: &MigrationState,
) -> Vec<MigrationEvent> {
    let mut events = Vec::new();

    // A previously running operation that reached Success has completed as
    // soon as the state moves past it.
    let finished_current = |events: &mut Vec<MigrationEvent>| {
        if let Some(MigrationState::InProgress { current, .. }) = previous {
            if current.succeeded() {
                events.push(MigrationEvent::OperationCompleted {
                    kind: current.operation.kind(),
                    tx_hash: current.tx_hash.clone(),
                });
            }
        }
    };

    match next {
        MigrationState::Initializing => {}

        MigrationState::Ready { pending } => {
            events.push(MigrationEvent::PlanComputed {
                operations: pending.len(),
            });
        }

        MigrationState::InProgress { current, .. } => match previous {
            Some(MigrationState::InProgress { current: prior, .. })
                if prior.operation == current.operation =>
            {
                if prior.tx_status != current.tx_status {
                    events.push(MigrationEvent::StatusChanged {
                        kind: current.operation.kind(),
                        status: current.tx_status,
                    });
                }
            }
            _ => {
                finished_current(&mut events);
                events.push(MigrationEvent::OperationStarted {
                    kind: current.operation.kind(),
                });
            }
        },

        MigrationState::Done { done } => {
            finished_current(&mut events);
            events.push(MigrationEvent::Completed {
                operations: done.len(),
            });
        }

        MigrationState::Fiasco { current, .. } => {
            events.push(MigrationEvent::Failed {
                kind: current.operation.kind(),
                status: current.tx_status,
            });
        }
    }

    events
}

/// Tap a state stream, forwarding each transition's events to `handler`
/// while re-emitting the states untouched.
pub fn observe_states<St, H>(states: St, handler: H) -> impl Stream<Item = St::Item>
where
    St: Stream<Item = Result<MigrationState, MigrationError>>,
    H: MigrationEventHandler,
{
    let mut previous: Option<MigrationState> = None;
    states.map(move |item| {
        if let Ok(state) = &item {
            for event in transition_events(previous.as_ref(), state) {
                handler.handle_event(&event);
            }
            previous = Some(state.clone());
        }
        item
    })
}
