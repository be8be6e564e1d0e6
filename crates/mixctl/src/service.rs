//! The mixer service: owns the context and control indices behind one lock.
//!
//! Every "pick context, invoke, parse or restore" sequence runs with the
//! state lock held, so an equalizer round trip can never interleave with a
//! device change or a standard write. Persistence runs after the lock is
//! released and is best-effort.

use std::path::PathBuf;
use std::sync::Arc;

use mixconf::{MixerToolConfig, PersistMode};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::command::{CommandBuilder, MixerCommand};
use crate::context::{MixerContext, Scope};
use crate::devices::enumerate_cards;
use crate::error::MixerError;
use crate::index::{ControlIndex, ControlTables};
use crate::invoke::{CommandOutput, CommandRunner};
use crate::parse::parse_report;
use crate::types::{CardMap, Control};

/// True when running with effective uid 0.
pub fn is_elevated() -> bool {
    // SAFETY: geteuid has no preconditions and cannot fail
    unsafe { libc::geteuid() == 0 }
}

pub fn should_persist(mode: PersistMode, elevated: bool) -> bool {
    match mode {
        PersistMode::Auto => elevated,
        PersistMode::Always => true,
        PersistMode::Never => false,
    }
}

#[derive(Debug, Default)]
struct MixerState {
    context: MixerContext,
    tables: ControlTables,
}

pub struct MixerService {
    runner: Arc<dyn CommandRunner>,
    builder: CommandBuilder,
    registry: PathBuf,
    persist: bool,
    state: Mutex<MixerState>,
}

impl MixerService {
    pub fn new(config: &MixerToolConfig, runner: Arc<dyn CommandRunner>) -> Self {
        let persist = should_persist(config.persist, is_elevated());
        Self {
            runner,
            builder: CommandBuilder::new(config),
            registry: config.card_registry.clone(),
            persist,
            state: Mutex::new(MixerState::default()),
        }
    }

    /// Override whether writes are followed by `alsactl store`.
    pub fn with_persistence(mut self, persist: bool) -> Self {
        self.persist = persist;
        self
    }

    pub fn persists(&self) -> bool {
        self.persist
    }

    /// Hardware cards plus the software audio server, if it answers.
    pub async fn cards(&self) -> Result<CardMap, MixerError> {
        enumerate_cards(self.runner.as_ref(), &self.builder, &self.registry).await
    }

    /// Selected device id, `None` for the system default.
    pub async fn selected_card(&self) -> Option<u32> {
        self.state.lock().await.context.device().id()
    }

    /// Select a device. The id is not checked against the card list.
    pub async fn select_card(&self, id: u32) {
        let mut state = self.state.lock().await;
        state.context.select_device(id);
        info!(device = ?state.context.device(), "selected mixer device");
    }

    pub async fn clear_card(&self) {
        self.state.lock().await.context.clear_device();
        info!("mixer device reset to system default");
    }

    /// Controls of the selected device. Re-indexes the standard scope.
    pub async fn controls(&self) -> Vec<Control> {
        let mut state = self.state.lock().await;
        let MixerState { context, tables } = &mut *state;
        self.read_scope(context, tables).await
    }

    /// Equalizer bands of the selected device. Re-indexes the equalizer scope.
    pub async fn equalizer(&self) -> Vec<Control> {
        let mut state = self.state.lock().await;
        let MixerState { context, tables } = &mut *state;
        let mut scoped = context.scoped();
        scoped.enter_equalizer();
        self.read_scope(&scoped, tables).await
    }

    /// Turn a switch control on (`status == 1`) or off (`status == 0`).
    ///
    /// Id 0 is rejected along with negative ids.
    pub async fn set_switch(&self, id: i64, status: i64) -> Result<(), MixerError> {
        if id <= 0 {
            return Err(MixerError::invalid(format!(
                "switch control id must be positive, got {}",
                id
            )));
        }
        let on = match status {
            0 => false,
            1 => true,
            other => {
                return Err(MixerError::invalid(format!(
                    "switch status must be 0 or 1, got {}",
                    other
                )))
            }
        };
        let id = control_id(id)?;
        self.write(Scope::Standard, id, |builder, ctx, selector| {
            Ok(builder.set_switch(ctx, selector, on))
        })
        .await
    }

    /// Pick entry `item` of an enumerated control.
    pub async fn set_source(&self, id: i64, item: i64) -> Result<(), MixerError> {
        let id = control_id(id)?;
        let item = usize::try_from(item)
            .map_err(|_| MixerError::invalid(format!("item must not be negative, got {}", item)))?;
        self.write(Scope::Standard, id, |builder, ctx, selector| {
            Ok(builder.set_item(ctx, selector, item))
        })
        .await
    }

    /// Set per-channel percentages of a standard control.
    pub async fn set_volume(&self, id: i64, levels: &[String]) -> Result<(), MixerError> {
        let id = control_id(id)?;
        self.write(Scope::Standard, id, |builder, ctx, selector| {
            builder.set_levels(ctx, selector, levels)
        })
        .await
    }

    /// Set per-channel percentages of an equalizer band.
    ///
    /// Addresses the equalizer plugin without a card flag; the context is
    /// restored afterwards whether or not the write succeeds.
    pub async fn set_equalizer(&self, id: i64, levels: &[String]) -> Result<(), MixerError> {
        let id = control_id(id)?;
        self.write(Scope::Equalizer, id, |builder, ctx, selector| {
            builder.set_levels(ctx, selector, levels)
        })
        .await
    }

    async fn write<F>(&self, scope: Scope, id: usize, build: F) -> Result<(), MixerError>
    where
        F: FnOnce(&CommandBuilder, &MixerContext, &str) -> Result<MixerCommand, MixerError> + Send,
    {
        {
            let mut state = self.state.lock().await;
            let MixerState { context, tables } = &mut *state;
            let mut scoped = context.scoped();
            if scope == Scope::Equalizer {
                scoped.clear_device();
                scoped.enter_equalizer();
            }

            let ctx: &MixerContext = &scoped;
            let selector = tables.resolve(ctx, scope, id)?;
            let command = build(&self.builder, ctx, selector)?;
            self.execute(&command).await?;
        }

        self.persist_state().await;
        Ok(())
    }

    /// Query `context`, replace its scope's index and return the controls.
    ///
    /// Any invocation failure yields an empty list and an empty index.
    async fn read_scope(&self, context: &MixerContext, tables: &mut ControlTables) -> Vec<Control> {
        let scope = context.scope();
        let command = self.builder.query(context);

        match self.execute(&command).await {
            Ok(output) => {
                let (controls, index) = parse_report(&output.stdout_text()).into_parts();
                debug!(%scope, controls = controls.len(), "indexed mixer controls");
                tables.replace(scope, index);
                controls
            }
            Err(error) => {
                warn!(%scope, %error, "failed to read mixer controls");
                tables.replace(scope, ControlIndex::default());
                Vec::new()
            }
        }
    }

    async fn persist_state(&self) {
        if !self.persist {
            return;
        }
        let command = self.builder.store();
        match self.execute(&command).await {
            Ok(_) => debug!(%command, "mixer state stored"),
            Err(error) => warn!(%error, "failed to store mixer state"),
        }
    }

    async fn execute(&self, command: &MixerCommand) -> Result<CommandOutput, MixerError> {
        let output = self.runner.run(command).await?;
        if output.success() {
            Ok(output)
        } else {
            Err(MixerError::CommandFailed {
                command: command.to_string(),
                code: output.code,
                stderr: output.stderr_text(),
            })
        }
    }
}

fn control_id(id: i64) -> Result<usize, MixerError> {
    usize::try_from(id)
        .map_err(|_| MixerError::invalid(format!("control id must not be negative, got {}", id)))
}
