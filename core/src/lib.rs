// harvest_flow/src/lib.rs

//! Small async workflow engine used by the Harvest storefront.
//!
//! A pipeline is an ordered list of named steps. Each step can carry
//! `before`, `on` and `after` handlers that operate on shared
//! [`ContextData`], plus compensators that undo the step's side effects when
//! a later step fails. Handlers return [`PipelineControl::Continue`] or
//! [`PipelineControl::Stop`]; an `Err` aborts the run and unwinds.
//!
//! ```ignore
//! let mut p = Pipeline::<OrderCtx, AppError>::new(&[
//!   ("reserve_stock", false, None),
//!   ("persist_order", false, None),
//! ]);
//! p.on_root("reserve_stock", |ctx| Box::pin(async move { /* ... */ Ok::<_, AppError>(PipelineControl::Continue) }));
//! p.compensate_root("reserve_stock", |ctx| Box::pin(async move { /* release */ Ok::<_, AppError>(()) }));
//! registry.register_pipeline(p);
//! registry.run(ContextData::new(order_ctx)).await?;
//! ```

pub mod core;
pub mod error;
pub mod pipeline;
pub mod registry;

pub use crate::core::context_data::ContextData;
pub use crate::core::control::{PipelineControl, PipelineResult};
pub use crate::core::handler::{Compensator, Handler, HandlerFuture};
pub use crate::core::step::{SkipCondition, StepDef};

pub use crate::pipeline::definition::Pipeline;

pub use crate::error::{FlowError, FlowResult};

pub use crate::registry::FlowRegistry;
