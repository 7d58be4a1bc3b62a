// harvest_flow/src/core/handler.rs

//! The boxed handler type stored by pipelines.

use crate::core::context_data::ContextData;
use crate::core::control::PipelineControl;
use std::future::Future;
use std::pin::Pin;

pub type HandlerFuture<Out> = Pin<Box<dyn Future<Output = Out> + Send>>;

/// A step handler: receives a clone of the run's `ContextData<TData>` and
/// resolves to a control signal or the pipeline's error type.
///
/// Lock guards taken inside a handler must be released before any `.await`.
pub type Handler<TData, Err> =
  Box<dyn Fn(ContextData<TData>) -> HandlerFuture<Result<PipelineControl, Err>> + Send + Sync>;

/// An undo handler registered with `Pipeline::compensate_root`.
///
/// It runs when the pipeline fails after its step began, and must tolerate
/// partial progress of that step (it reads what was actually done from the context).
pub type Compensator<TData, Err> = Box<dyn Fn(ContextData<TData>) -> HandlerFuture<Result<(), Err>> + Send + Sync>;
