mod assignment;
mod feedback;
mod file_ref;
mod material;
mod stats;
mod user;
mod validators;

pub use assignment::*;
pub use feedback::*;
pub use file_ref::*;
pub use material::*;
pub use stats::*;
pub use user::*;
pub use validators::*;
