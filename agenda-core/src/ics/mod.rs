//! ICS export of the whole schedule collection (RFC 5545).

mod generate;

pub use generate::generate_ics;
