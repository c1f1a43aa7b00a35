mod ledger;
mod oldest;
mod schedule;

pub use self::ledger::{Outcome, ledger_list, ledger_update};
pub use self::oldest::oldest;
pub use self::schedule::schedule;
