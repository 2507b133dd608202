/// Depth-indexed range cache.
///
/// ```text
///   Dataset::data_range(range, curves)
///        │
///        ▼
///   ┌────────────┐  hit   ┌──────────────┐
///   │ RangeCache  │──────▶│ copy of table │
///   └────────────┘        └──────────────┘
///        │ miss
///        ▼
///   ┌─────────────┐
///   │ range_loader │  full re-read → depth mask → projection
///   └─────────────┘
/// ```

pub mod dataset;
pub mod depth_index;
pub mod range_loader;
pub mod stats;
pub mod store;
