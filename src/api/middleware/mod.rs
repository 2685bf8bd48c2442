mod logging;

pub use logging::request_logger;
