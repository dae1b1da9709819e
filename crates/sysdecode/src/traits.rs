pub use crate::model::{ParsedMessage, PayloadType};
pub use crate::scanner::Scanner;

pub trait VariantParser: Send + Sync {
    /// try to decode the message under the scanner into the entry
    ///
    /// `false` means "not this variant, or malformed beyond recovery";
    /// syntax diagnostics go to the scanner's sink, and the entry may be
    /// partially filled by an attempt that got past variant detection.
    fn try_parse(&self, scanner: &mut Scanner<'_>, entry: &mut ParsedMessage) -> bool;

    fn payload_type(&self) -> PayloadType;
}
