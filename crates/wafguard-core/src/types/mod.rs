mod address;
mod event;
mod ipset;
mod ledger;
mod usage;

pub use address::*;
pub use event::*;
pub use ipset::*;
pub use ledger::*;
pub use usage::*;
