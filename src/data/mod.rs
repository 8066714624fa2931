/// Data layer: dataset discovery, table loading, burst lookup, figures and
/// population statistics.
///
/// Architecture:
/// ```text
///   results/<YYMM_version>/
///        │
///        ▼
///   ┌──────────┐
///   │ dataset   │  folder name → display label
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  afterglow / flares / pulses → Table (memoized)
///   └──────────┘
///        │
///        ├──────────────┬────────────────┐
///        ▼              ▼                ▼
///   ┌──────────┐  ┌──────────┐    ┌────────────┐
///   │  lookup   │  │  images   │    │ population  │
///   └──────────┘  └──────────┘    └────────────┘
///   rows by GRB    figure paths    numeric columns,
///   name           + decoding      scatter points
/// ```

pub mod dataset;
pub mod images;
pub mod loader;
pub mod lookup;
pub mod model;
pub mod population;
