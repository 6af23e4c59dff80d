pub mod consumption;
pub mod flex;
pub mod readings;

#[allow(unused_imports)]
pub use consumption::*;
#[allow(unused_imports)]
pub use readings::*;
