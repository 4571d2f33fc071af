/// Data layer: core types, loading, normalisation, reshaping and queries.
///
/// Architecture:
/// ```text
///  world_population.csv / world_gdp_data.csv / ...
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  decode + parse file → RawTable
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ normalize  │  canonical country names, aggregate-region exclusion
///   └───────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ reshape   │  wide year columns → IndicatorRecord (long form)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  query    │  series / snapshot / top-N / population trend
///   └──────────┘
/// ```

pub mod datasets;
pub mod loader;
pub mod model;
pub mod normalize;
pub mod query;
pub mod reshape;
