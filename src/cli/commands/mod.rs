pub mod assign;
pub mod migrate;
pub mod role;
pub mod token;
