pub mod amount;
pub mod config;
pub mod csv;
pub mod engine;
pub mod model;
pub mod operator;
pub mod session;

pub use amount::Amount;
pub use config::MachineConfig;
pub use engine::Engine;
pub use model::{Command, Denomination, Item, Outcome};
