/// Interval table checks: depth consistency and coded-field lookups.
///
/// Both passes are pure functions over a snapshot and produce a
/// severity-tagged [`issue::ValidationResult`]; findings are output, not
/// errors.

pub mod dictionary;
pub mod interval;
pub mod issue;
