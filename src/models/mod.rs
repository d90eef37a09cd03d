pub mod close_price;
pub mod snapshot;

pub use close_price::{close_key, ClosePrice};
pub use snapshot::LastSnapshot;
