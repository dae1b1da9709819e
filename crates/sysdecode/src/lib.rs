//! Syslog message decoding.
//!
//! Raw lines go through a `<N>` priority-prefix split and an ordered
//! chain of variant parsers producing structured entries; RFC 5424 is
//! the shipped variant, with a plain text fallback for everything else.
//!
//! # Architecture
//!
//! - `traits.rs`: The variant parser seam
//! - `decoder.rs`: Ordered variant dispatch with plain text fallback
//! - `scanner.rs`: Read cursor over one message with a diagnostic sink
//! - `formats/`: Individual syslog variant parsers
//! - `model.rs`: Decoded entry, header, and error types
//! - `pri.rs`: `<N>` priority prefix handling

pub mod traits;
pub mod decoder;
pub mod scanner;
pub mod formats;
pub mod model;
pub mod pri;
pub mod facility;
pub mod severity;
mod bom;
mod serde_utils;

// Re-export commonly used types
pub use bom::strip_bom;
pub use decoder::MessageDecoder;
pub use facility::Facility;
pub use formats::Rfc5424Parser;
pub use model::{Header, NameValuePair, ParseError, ParsedMessage, PayloadType, StructuredData};
pub use pri::Pri;
pub use scanner::{ScanError, Scanner};
pub use severity::Severity;
pub use traits::VariantParser;

// Constants
pub const MAX_LINE_SIZE: usize = 1_048_576; // 1MB

/// The NIL value (`-`) marking an absent field on the wire.
pub const NIL: &str = "-";
