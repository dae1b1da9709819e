/// Individual syslog variant parsers

pub mod rfc5424;

// Re-export parser implementations
pub use rfc5424::Rfc5424Parser;
