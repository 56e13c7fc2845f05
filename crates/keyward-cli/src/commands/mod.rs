pub mod authz;
pub mod tokens;
