//! Client library behind the bingo back-office console.
//!
//! Every section of the console is built the same way: a [`Gateway`] call
//! feeds a [`ListState`], which owns the collection, its filtered view and
//! the toast shown to the operator. The [`LiveChannel`] pushes dashboard
//! snapshots and invalidations next to that request/response flow.

pub use export::{Column, ExportError, ExportFormat};
pub use gateway::{ErrorKind, Gateway, GatewayConfig, GatewayError};
pub use list_state::{FetchOutcome, ListState, Record, Toast, ToastLevel, ToastSlot};
pub use live::{ConnectionState, LiveChannel, LiveConfig, LiveError, LiveEvent};
pub use session::{Session, SessionError, SessionStore};
pub use validation::{FieldErrors, FormMode};

pub mod export;
pub mod gateway;
pub mod list_state;
pub mod live;
mod records;
pub mod session;
pub mod validation;
pub mod views;
