pub mod error_handling;
pub mod logging;
pub mod request_id;

pub use error_handling::*;
pub use logging::*;
pub use request_id::*;
