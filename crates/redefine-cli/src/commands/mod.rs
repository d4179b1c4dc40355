pub mod debug;
pub mod run;
