/// Data layer: table model, file readers, and row filtering.
///
/// Architecture:
/// ```text
///  .las / .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → LogTable
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ LogTable  │  named columns + optional row index
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  depth mask + curve projection
///   └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;
