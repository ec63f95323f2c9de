pub mod calculations;
pub mod outcome;
pub mod population;
pub mod scheduler;
pub mod simulation;

pub use simulation::{RunSummary, Simulation, SimulationRun};
