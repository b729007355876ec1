// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::Instrument;

use crate::backends::local::LocalDispatcher;
use crate::backends::remote::RemoteDispatcher;
use crate::chains::{ChainDefinition, ChainStore, Step, TriggerKey};
use crate::errors::{ChainStoreError, DispatchError};
use crate::observability::messages::engine::{
    ChainRunCompleted, ChainRunStarted, DetachedRunScheduled, NoChainForTrigger, StepPassedThrough,
    StepStarted,
};
use crate::observability::messages::StructuredLog;

/// Defaults applied to remote steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunnerOptions {
    /// Used when a step does not set `await_reply` itself.
    pub await_reply: bool,
    pub reply_timeout: Duration,
}

impl Default for RunnerOptions {
    fn default() -> Self {
        Self {
            await_reply: false,
            reply_timeout: Duration::from_millis(5000),
        }
    }
}

/// Executes chains against a payload.
///
/// Steps run strictly in order, each receiving the previous step's output. A step that
/// fails for any reason is logged and treated as a no-op, so a run always produces a
/// value. The caller's payload is never modified.
///
/// Cloning is cheap; clones share the store and dispatchers.
#[derive(Clone)]
pub struct ChainRunner {
    chains: Arc<ChainStore>,
    local: Arc<LocalDispatcher>,
    remote: Arc<RemoteDispatcher>,
    options: RunnerOptions,
}

impl ChainRunner {
    pub fn new(
        chains: Arc<ChainStore>,
        local: Arc<LocalDispatcher>,
        remote: Arc<RemoteDispatcher>,
        options: RunnerOptions,
    ) -> Self {
        Self {
            chains,
            local,
            remote,
            options,
        }
    }

    pub fn chains(&self) -> &Arc<ChainStore> {
        &self.chains
    }

    /// Runs the first chain bound to `trigger`. Without one, returns a copy of `payload`.
    pub async fn run(&self, trigger: &str, payload: &Value) -> Value {
        match self.chains.find_by_trigger(trigger) {
            Some((chain_id, chain)) => self.execute(&chain_id, &chain, trigger, payload.clone()).await,
            None => {
                NoChainForTrigger { trigger }.log();
                payload.clone()
            }
        }
    }

    /// Runs a chain by id regardless of its trigger.
    pub async fn run_chain(&self, chain_id: &str, payload: &Value) -> Result<Value, ChainStoreError> {
        let chain = self
            .chains
            .get(chain_id)
            .ok_or_else(|| ChainStoreError::NotFound {
                chain_id: chain_id.to_string(),
            })?;
        let trigger = TriggerKey::manual(chain_id);
        Ok(self.execute(chain_id, &chain, &trigger, payload.clone()).await)
    }

    /// Runs on a separate task and hands the result to `on_complete`.
    ///
    /// Must be called inside a Tokio runtime. There is no ordering between detached runs,
    /// and no bound on how many may be in flight.
    pub fn run_detached<F>(&self, trigger: impl Into<String>, payload: Value, on_complete: F) -> JoinHandle<()>
    where
        F: FnOnce(Value) + Send + 'static,
    {
        let runner = self.clone();
        let trigger = trigger.into();
        DetachedRunScheduled { trigger: &trigger }.log();

        tokio::spawn(async move {
            let result = runner.run(&trigger, &payload).await;
            on_complete(result);
        })
    }

    async fn execute(&self, chain_id: &str, chain: &ChainDefinition, trigger: &str, payload: Value) -> Value {
        let started = ChainRunStarted {
            chain_id,
            trigger,
            step_count: chain.steps.len(),
        };
        started.log();
        let span = started.span("run");

        async move {
            let began = Instant::now();
            let mut data = payload;
            let mut failed_steps = 0;

            for (index, step) in chain.steps.iter().enumerate() {
                let step_number = index + 1;
                StepStarted {
                    chain_id,
                    step_number,
                    plugin_ref: &step.plugin_ref,
                    remote: step.is_remote(),
                }
                .log();

                match self.dispatch_step(step, data.clone()).await {
                    Ok(output) => data = output,
                    Err(error) => {
                        StepPassedThrough {
                            chain_id,
                            step_number,
                            plugin_ref: &step.plugin_ref,
                            error: &error,
                        }
                        .log();
                        failed_steps += 1;
                    }
                }
            }

            ChainRunCompleted {
                chain_id,
                trigger,
                failed_steps,
                duration: began.elapsed(),
            }
            .log();
            data
        }
        .instrument(span)
        .await
    }

    async fn dispatch_step(&self, step: &Step, data: Value) -> Result<Value, DispatchError> {
        if step.is_remote() {
            let await_reply = step.await_reply.unwrap_or(self.options.await_reply);
            self.remote
                .try_dispatch(
                    &step.plugin_ref,
                    data,
                    &step.config,
                    await_reply,
                    self.options.reply_timeout,
                )
                .await
        } else {
            self.local.try_dispatch(&step.plugin_ref, data, &step.config).await
        }
    }
}
