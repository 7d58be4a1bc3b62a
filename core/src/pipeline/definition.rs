// harvest_flow/src/pipeline/definition.rs

//! The `Pipeline<TData, Err>` struct and its structural editing methods.

use crate::core::handler::{Compensator, Handler};
use crate::core::step::{SkipCondition, StepDef};
use crate::error::FlowError;
use std::collections::HashMap;

/// An ordered list of named steps plus the handlers attached to them.
///
/// `Err` is what the handlers return and what `run` returns. It must absorb
/// `FlowError` so configuration problems (e.g. a required step without
/// handlers) surface through the same type.
pub struct Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  pub(crate) steps: Vec<StepDef<TData>>,
  pub(crate) before: HashMap<String, Vec<Handler<TData, Err>>>,
  pub(crate) on: HashMap<String, Vec<Handler<TData, Err>>>,
  pub(crate) after: HashMap<String, Vec<Handler<TData, Err>>>,
  pub(crate) compensators: HashMap<String, Vec<Compensator<TData, Err>>>,
}

impl<TData, Err> Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  /// Builds a pipeline from `(name, optional, skip_if)` tuples.
  pub fn new(step_defs: &[(&str, bool, Option<SkipCondition<TData>>)]) -> Self {
    let mut pipeline = Self {
      steps: Vec::with_capacity(step_defs.len()),
      before: HashMap::new(),
      on: HashMap::new(),
      after: HashMap::new(),
      compensators: HashMap::new(),
    };
    for (name, optional, skip_if) in step_defs {
      pipeline.ensure_step_not_exists(name);
      pipeline.steps.push(StepDef::new(*name, *optional, skip_if.clone()));
    }
    pipeline
  }

  pub fn step_names(&self) -> Vec<&str> {
    self.steps.iter().map(|s| s.name.as_str()).collect()
  }

  pub fn has_step(&self, step_name: &str) -> bool {
    self.steps.iter().any(|s| s.name == step_name)
  }

  /// Index of `step_name`. Panics on unknown names: a misspelt step is a
  /// programming error caught at registration time, not a runtime condition.
  pub(crate) fn position_of(&self, step_name: &str) -> usize {
    match self.steps.iter().position(|s| s.name == step_name) {
      Some(idx) => idx,
      None => panic!("Pipeline setup error: step '{}' is not defined.", step_name),
    }
  }

  pub(crate) fn ensure_step_exists(&self, step_name: &str) {
    self.position_of(step_name);
  }

  fn ensure_step_not_exists(&self, step_name: &str) {
    if self.has_step(step_name) {
      panic!("Pipeline setup error: step '{}' is defined twice.", step_name);
    }
  }

  pub fn insert_before_step<S: Into<String>>(
    &mut self,
    existing_step_name: &str,
    new_step_name: S,
    optional: bool,
    skip_if: Option<SkipCondition<TData>>,
  ) {
    let idx = self.position_of(existing_step_name);
    let name: String = new_step_name.into();
    self.ensure_step_not_exists(&name);
    self.steps.insert(idx, StepDef::new(name, optional, skip_if));
  }

  pub fn insert_after_step<S: Into<String>>(
    &mut self,
    existing_step_name: &str,
    new_step_name: S,
    optional: bool,
    skip_if: Option<SkipCondition<TData>>,
  ) {
    let idx = self.position_of(existing_step_name);
    let name: String = new_step_name.into();
    self.ensure_step_not_exists(&name);
    self.steps.insert(idx + 1, StepDef::new(name, optional, skip_if));
  }

  /// Removes a step and everything attached to it. Unknown names are a no-op.
  pub fn remove_step(&mut self, step_name: &str) {
    if let Some(idx) = self.steps.iter().position(|s| s.name == step_name) {
      self.steps.remove(idx);
      self.before.remove(step_name);
      self.on.remove(step_name);
      self.after.remove(step_name);
      self.compensators.remove(step_name);
    }
  }

  pub fn set_optional(&mut self, step_name: &str, optional: bool) {
    let idx = self.position_of(step_name);
    self.steps[idx].optional = optional;
  }

  pub fn set_skip_condition(&mut self, step_name: &str, skip_if: Option<SkipCondition<TData>>) {
    let idx = self.position_of(step_name);
    self.steps[idx].skip_if = skip_if;
  }
}
