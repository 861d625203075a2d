//! Flat-file implementations of the core repository traits.

pub mod attempt;
pub mod expiry;

pub use attempt::FileLoginAttemptRepository;
pub use expiry::FileAccountExpiryRepository;
