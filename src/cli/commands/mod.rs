mod command_result;
pub mod flatten;
pub mod forward;
pub mod helper;
pub mod init;
pub mod resolve;
pub mod validate;

pub use command_result::*;
