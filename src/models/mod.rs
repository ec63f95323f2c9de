pub mod environment;
pub mod population;
pub mod product;
pub mod schedule;

pub use environment::*;
pub use population::*;
pub use product::*;
pub use schedule::*;
