pub mod db;
pub mod errors;
pub mod helpers;
pub mod persist;
pub mod query_params;
pub mod storage;
pub mod validation;
