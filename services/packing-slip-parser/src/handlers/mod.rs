pub mod health;
pub mod status;
pub mod test_ai;
pub mod upload;

pub use health::*;
pub use status::*;
pub use test_ai::*;
pub use upload::*;
