pub mod gpio;
pub mod system;

pub use system::init_system;
