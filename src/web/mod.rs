pub mod fetch;
pub mod frontier;
pub mod page;
