pub mod extension;

pub use extension::{StdoutReporter, handle_extension_command};
