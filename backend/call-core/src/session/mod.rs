//! Call session state machine.
//!
//! - [`registry`]: calls, the conference group and the active call
//! - [`coordinator`]: applies backend events and user intents
//! - [`runtime`]: the task that owns the coordinator
//! - [`presentation`]: updates published for the UI
//! - [`timer`]: call duration display

pub mod coordinator;
pub mod intent;
pub mod presentation;
pub mod registry;
pub mod runtime;
pub mod timer;

pub use coordinator::{SessionCoordinator, SessionSnapshot};
pub use intent::Intent;
pub use presentation::{PresentationHub, Screen, UiUpdate, UpdateKind, UpdateSubscription};
pub use registry::CallRegistry;
pub use runtime::{SessionHandle, SessionRuntime};
pub use timer::{CallTimer, format_duration};
