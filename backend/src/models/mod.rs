pub mod building;
pub mod macros;
pub mod prediction;
pub mod report;
pub mod results;

pub use building::*;
pub use prediction::*;
pub use report::*;
pub use results::*;
