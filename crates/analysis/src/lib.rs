//! Rule-based and statistical analyzers that turn raw campaign metrics into
//! candidate insights. All analyzers are pure functions: no I/O, no shared
//! mutable state, and no failure on validated input.

pub mod anomaly;
pub mod keyword;
pub mod stats;
pub mod threshold;

pub use anomaly::detect;
pub use keyword::analyze_keywords;
pub use threshold::analyze;
