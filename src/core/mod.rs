pub mod controller;
pub mod poller;
pub mod profiles;

// Re-export the modules here for easy import elsewhere.
pub use controller::*;
pub use poller::*;
pub use profiles::*;
