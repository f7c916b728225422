//! Graph query values and result sets

pub mod result;
pub mod value;

pub use result::QueryResult;
pub use value::{GraphValue, PropertyMap};
