/// Data layer: series model, loading, the labeled store and derived views.
///
/// Architecture:
/// ```text
///  .xye / .xy / .gr / .csv / .mpt / .json / .parquet
///        │
///        ▼
///   ┌──────────┐    ┌──────────┐
///   │  loader   │◄───│ provider  │  path → SeriesKind
///   └──────────┘    └──────────┘
///        │
///        ▼
///   ┌─────────────┐
///   │ SeriesStore  │  tag → SeriesGroup
///   └─────────────┘
///        │
///        ▼
///   ┌───────────────────────┐
///   │ partition / transform  │  cycles, 2θ ↔ Q
///   └───────────────────────┘
/// ```

pub mod loader;
pub mod model;
pub mod partition;
pub mod provider;
pub mod store;
pub mod transform;
