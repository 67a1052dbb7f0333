pub mod browser;
pub mod http;
pub mod parse;
pub mod traits;
pub mod types;

pub use browser::BrowserGroupScraper;
pub use http::HttpGroupScraper;
pub use traits::GroupSource;
pub use types::{Credentials, Group, GroupPage, GroupParams};
