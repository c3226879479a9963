// core.rs splits responsibilities into submodules for easier maintenance.
pub mod chain;
pub mod hashing;
pub mod validation;

pub use chain::*;
pub use hashing::*;
pub use validation::*;
