pub mod logging;
pub mod profile;
pub mod report;
