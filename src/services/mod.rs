pub mod pack;
pub mod sync;
