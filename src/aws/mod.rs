pub mod cache;
pub mod credentials;
pub mod session;
pub mod sts;

pub use credentials::Credentials;
