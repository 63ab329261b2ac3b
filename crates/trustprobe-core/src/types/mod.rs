mod cert;
mod display;
mod endpoint;
mod submission;

pub use cert::*;
pub use display::*;
pub use endpoint::*;
pub use submission::*;
