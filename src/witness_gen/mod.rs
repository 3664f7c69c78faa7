pub mod header;
pub mod limbs;
pub mod padding;
pub mod signature;
pub mod vector;
