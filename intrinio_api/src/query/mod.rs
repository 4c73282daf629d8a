mod common;
pub use self::common::{Paging, Query};

mod price;
pub use self::price::{Frequency, PriceQuery};
