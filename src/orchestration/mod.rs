pub mod session;
pub mod settlement;

pub use session::{CheckoutProgress, CheckoutState, SessionRegistry, UserSession};
pub use settlement::{Settlement, SettlementError, SettlementOrchestrator};
