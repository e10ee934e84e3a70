pub mod bus;
pub mod commitment;
pub mod config;
pub mod dealer;
pub mod error;
pub mod group;
pub mod hash;
pub mod nizk;
pub mod player;
pub mod randutil;
pub mod session;
pub mod shamir;
pub mod types;

pub use config::SessionConfig;
pub use error::{ProtocolError, ShareError};
pub use session::{Operand, Session, SessionReport};
