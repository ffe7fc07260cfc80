//! Command dispatch: maps parsed arguments onto service calls and prints outcomes.

use std::fs;
use std::io;

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use tracing::{debug, instrument, warn};

use crate::application::outcome::{BulkOutcome, ItemOutcome};
use crate::application::{OutputMode, Render, RequestContext};
use crate::cli::args::{AliasCommands, Cli, Commands, ConfigCommands, MailCommands, TargetArgs};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_dir, global_config_path, Settings};
use crate::domain::target::normalize_domain;
use crate::domain::{AliasState, Target};
use crate::exitcode;
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::{CancelToken, InfraError};

/// Rendered command output plus bulk failure counts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub text: String,
    /// Members that failed in a bulk run
    pub failed: usize,
    /// Members attempted in a bulk run
    pub total: usize,
}

impl CommandOutput {
    fn rendered(outcome: &impl Render, mode: OutputMode) -> CliResult<Self> {
        Ok(Self {
            text: outcome.render(mode)?,
            ..Self::default()
        })
    }

    fn with_counts(mut self, failed: usize, total: usize) -> Self {
        self.failed = failed;
        self.total = total;
        self
    }
}

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Commands::Completion { shell } => {
            cmd_completion(*shell);
            Ok(())
        }
        Commands::Config { command } => execute_config(cli, command),
        Commands::Alias { .. } | Commands::Mail { .. } => {
            let settings = Settings::load(cli.config.as_deref())?;
            let ctx = request_context(cli, &settings);
            if let Err(e) = ctrlc::set_handler(interrupt_handler(ctx.cancel.clone())) {
                output::warning(&format!("failed to set Ctrl-C handler: {e}"));
            }
            let container = ServiceContainer::new(settings)?;

            let out = dispatch(&container, &ctx, &cli.command)?;
            if !out.text.is_empty() {
                output::info(&out.text);
            }
            // per-item failures are part of the report, not a command error
            if out.failed > 0 {
                warn!("{} of {} items failed", out.failed, out.total);
            }
            Ok(())
        }
    }
}

/// Build the per-invocation context from flags and settings.
pub fn request_context(cli: &Cli, settings: &Settings) -> RequestContext {
    let mode = if cli.json {
        OutputMode::Json
    } else {
        settings.output
    };
    let cancel = settings
        .timeout()
        .map(CancelToken::with_timeout)
        .unwrap_or_default();
    RequestContext::new(cli.dry_run, mode).with_cancel(cancel)
}

/// Ctrl-C handler for a running command.
///
/// The first interrupt cancels `cancel`: the request in flight finishes, every
/// later item fails as cancelled and the report is still printed. A second
/// interrupt exits immediately.
pub fn interrupt_handler(cancel: CancelToken) -> impl Fn() + Send + 'static {
    move || {
        if cancel.is_cancelled() {
            std::process::exit(exitcode::INTERRUPTED);
        }
        cancel.cancel();
        output::warning("Interrupted. Remaining items will be reported as cancelled.");
    }
}

/// Run an alias or mail command against the container's services.
pub fn dispatch(
    container: &ServiceContainer,
    ctx: &RequestContext,
    command: &Commands,
) -> CliResult<CommandOutput> {
    match command {
        Commands::Alias { command } => dispatch_alias(container, ctx, command),
        Commands::Mail { command } => dispatch_mail(container, ctx, command),
        Commands::Config { .. } | Commands::Completion { .. } => Err(CliError::InvalidArgs(
            "not a service command".to_string(),
        )),
    }
}

#[instrument(skip(container, ctx))]
fn dispatch_alias(
    container: &ServiceContainer,
    ctx: &RequestContext,
    command: &AliasCommands,
) -> CliResult<CommandOutput> {
    let service = container.alias_service();
    match command {
        AliasCommands::List { domain, state } => {
            let ctx = match domain {
                Some(d) => ctx.clone().with_group_key(normalize_domain(d)?),
                None => ctx.clone(),
            };
            let state = state.map(AliasState::from);
            let listing = service.list(&ctx, state.as_ref())?;
            CommandOutput::rendered(&listing, ctx.output)
        }
        AliasCommands::Show { domain } => {
            let ctx = ctx.clone().with_group_key(normalize_domain(domain)?);
            CommandOutput::rendered(&service.show(&ctx)?, ctx.output)
        }
        AliasCommands::GetOrCreate {
            domain,
            description,
        } => {
            let ctx = ctx.clone().with_group_key(normalize_domain(domain)?);
            CommandOutput::rendered(&service.get_or_create(&ctx, description)?, ctx.output)
        }
        AliasCommands::Enable(target) => set_state(container, ctx, target, AliasState::Enabled),
        AliasCommands::Disable(target) => set_state(container, ctx, target, AliasState::Disabled),
        AliasCommands::Delete(target) => set_state(container, ctx, target, AliasState::Deleted),
        AliasCommands::Describe { id, description } => {
            let id = crate::domain::target::validate_id(id)?;
            CommandOutput::rendered(&service.describe(ctx, &id, description)?, ctx.output)
        }
    }
}

fn set_state(
    container: &ServiceContainer,
    ctx: &RequestContext,
    args: &TargetArgs,
    state: AliasState,
) -> CliResult<CommandOutput> {
    let service = container.alias_service();
    let target = Target::resolve(args.id.as_deref(), args.domain.as_deref())?;
    debug!("set_state: {:?} -> {}", target, state);

    match target {
        Target::Single(id) => {
            CommandOutput::rendered(&service.apply_single(ctx, &id, &state)?, ctx.output)
        }
        Target::Group(domain) => {
            let ctx = ctx.clone().with_group_key(domain);
            let outcome = service.apply_bulk(&ctx, &state)?;
            let out = CommandOutput::rendered(&outcome, ctx.output)?;
            Ok(match &outcome {
                BulkOutcome::Applied(report) => {
                    out.with_counts(report.failed, report.succeeded + report.failed)
                }
                BulkOutcome::Preview(_) => out,
            })
        }
    }
}

#[instrument(skip(container, ctx))]
fn dispatch_mail(
    container: &ServiceContainer,
    ctx: &RequestContext,
    command: &MailCommands,
) -> CliResult<CommandOutput> {
    let service = container.item_service();
    let outcome = match command {
        MailCommands::Delete { ids } => service.delete(ctx, ids)?,
        MailCommands::Move { to, ids } => service.move_to(ctx, ids, to)?,
        MailCommands::MarkRead { ids } => service.mark_read(ctx, ids, true)?,
        MailCommands::MarkUnread { ids } => service.mark_read(ctx, ids, false)?,
    };

    let out = CommandOutput::rendered(&outcome, ctx.output)?;
    Ok(match &outcome {
        ItemOutcome::Applied(report) => {
            let failed = report.result.failed_count();
            out.with_counts(failed, report.result.succeeded_count() + failed)
        }
        ItemOutcome::Preview(_) => out,
    })
}

// ============================================================
// Config commands
// ============================================================

fn execute_config(cli: &Cli, cmd: &ConfigCommands) -> CliResult<()> {
    match cmd {
        ConfigCommands::Show => {
            let settings = Settings::load(cli.config.as_deref())?;
            output::info(&settings.to_toml()?);
            Ok(())
        }
        ConfigCommands::Path => {
            match global_config_path() {
                Some(path) => {
                    let status = if path.exists() { "" } else { " (not found)" };
                    output::action("global", &format!("{}{}", path.display(), status));
                }
                None => output::warning("cannot determine config directory"),
            }
            if let Some(path) = &cli.config {
                let status = if path.exists() { "" } else { " (not found)" };
                output::action("explicit", &format!("{}{}", path.display(), status));
            }
            Ok(())
        }
        ConfigCommands::Init { force } => config_init(*force),
    }
}

fn config_init(force: bool) -> CliResult<()> {
    let (dir, path) = match (global_config_dir(), global_config_path()) {
        (Some(dir), Some(path)) => (dir, path),
        _ => {
            return Err(CliError::InvalidArgs(
                "cannot determine config directory".to_string(),
            ))
        }
    };

    if path.exists() && !force {
        return Err(CliError::InvalidArgs(format!(
            "config already exists: {} (use --force to overwrite)",
            path.display()
        )));
    }

    fs::create_dir_all(&dir)
        .map_err(|e| InfraError::io(format!("create {}", dir.display()), e))?;
    fs::write(&path, Settings::template())
        .map_err(|e| InfraError::io(format!("write {}", path.display()), e))?;
    output::action("Created", &path.display());
    Ok(())
}

fn cmd_completion(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_first_interrupt_when_handled_then_shared_token_cancelled() {
        // Arrange
        let cancel = CancelToken::new();
        let handler = interrupt_handler(cancel.clone());

        // Act
        handler();

        // Assert
        assert!(cancel.is_cancelled());
    }
}
