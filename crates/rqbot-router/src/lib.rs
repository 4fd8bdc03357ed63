//! Message routing and conversation state.
//!
//! `MessageRouter` receives every inbound event once and decides between
//! media import, pending-selection resolution, a parsed command and the
//! registered handler chain.

pub mod cooldown;
pub mod dispatch;
pub mod error;
pub mod inbox;
pub mod intent;
pub mod media;
pub mod pending;
pub mod replies;
pub mod router;

pub use dispatch::CommandDispatcher;
pub use error::{MediaError, RouterError};
pub use inbox::Inbox;
pub use intent::{Addressing, Command, Intent, PlayTarget};
pub use media::{FsMediaStore, MediaImport, MediaStore};
pub use pending::{PendingSelection, PendingSelectionStore, Resolution, SelectionInput};
pub use router::{MessageRouter, Outcome};
