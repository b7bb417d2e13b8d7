//! Email delivery adapters.

pub mod http;
pub mod log;
pub mod mock;

pub use self::http::HttpEmailSender;
pub use self::log::LogEmailSender;
pub use self::mock::MockEmailSender;
