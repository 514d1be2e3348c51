mod fact_finder;

pub use fact_finder::{FactFinder, ProjectFacts};
