pub mod constants;
pub mod btree;
