pub mod home;
pub mod plants;
pub mod utils;
