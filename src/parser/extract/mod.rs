pub mod company;
pub mod product;
