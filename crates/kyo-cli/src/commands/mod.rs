pub mod load;
pub mod replay;
pub mod schema;
