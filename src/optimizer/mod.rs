pub mod continuous;
pub mod cost;
pub mod discrete;
pub mod hours;
pub mod types;

pub use continuous::*;
pub use cost::*;
pub use discrete::*;
pub use hours::*;
pub use types::*;
