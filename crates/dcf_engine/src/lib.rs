//! # dcf_engine: Per-Scenario DCF Pipeline and Batch Runner
//!
//! Turns a property and market scenarios into investment metrics.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                dcf_engine                    │
//! ├──────────────────────────────────────────────┤
//! │  assumptions/ - scenario → property rates    │
//! │  initial/     - acquisition, loan sizing     │
//! │  cash_flow/   - yearly projection, waterfall │
//! │  metrics/     - NPV, IRR, recommendation     │
//! │  pipeline/    - the five stages per scenario │
//! │  batch/       - rayon fan-out, cancellation  │
//! │  aggregate/   - distribution statistics      │
//! └──────────────────────────────────────────────┘
//!          ↓
//! ┌──────────────────────────────────────────────┐
//! │   dcf_scenarios (market draws, regimes)      │
//! │   dcf_core (records, errors, solvers)        │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! Every stage is a pure function of its inputs. Policy constants live in
//! [`policy`] with documented defaults.
//!
//! ## Example
//!
//! ```rust
//! use dcf_core::types::PropertyDescription;
//! use dcf_engine::run_batch_analysis;
//! use dcf_scenarios::CorrelationConfig;
//!
//! let property = PropertyDescription::new(3_500_000.0, "DEFAULT")
//!     .with_residential(24, 1_250.0)
//!     .with_commercial(3, 2_500.0)
//!     .with_renovation(400_000.0, 0.0);
//!
//! let batch = run_batch_analysis(&property, 200, &CorrelationConfig::standard()).unwrap();
//! let aggregate = batch.aggregate.unwrap();
//! assert_eq!(aggregate.scenario_count, batch.summary.succeeded);
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod aggregate;
pub mod assumptions;
pub mod batch;
pub mod cash_flow;
pub mod initial;
pub mod irr;
pub mod metrics;
pub mod pipeline;
pub mod policy;

pub use aggregate::AggregateMetrics;
pub use batch::{
    run_batch_analysis, BatchAnalysis, BatchConfig, BatchRunner, BatchSummary, CancellationToken,
    ProgressCallback, ScenarioFailure, ScenarioOutcome,
};
pub use pipeline::{run_single_analysis, AnalysisPipeline, PipelineStage, ScenarioAnalysis, StageError};
pub use policy::AnalysisConfig;
