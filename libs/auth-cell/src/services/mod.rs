pub mod authorizer;
pub mod login;
