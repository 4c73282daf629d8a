mod endpoint;
pub use self::endpoint::Endpoint;

mod page;
pub use self::page::{Page, Record};
