pub mod lyzr;
pub mod mock;
