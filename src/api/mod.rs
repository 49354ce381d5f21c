pub mod http_source;
#[cfg(test)]
pub mod mock_source;
pub mod types;

pub use http_source::HttpProductSource;
pub use types::{PAGE_SIZE, PageQuery, Product, ProductPage, ProductSource};
