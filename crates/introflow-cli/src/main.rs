//! `introflow` command-line tool
//!
//! Runs template resolution, submission validation and form previews against
//! a registry fixture file.

mod fixture;

use anyhow::{anyhow, Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use introflow_core::{
    EngineConfig, SubmissionError, SubmissionGate, SubmissionValidator, TemplateResolver,
};
use introflow_model::UserIdentity;
use introflow_registry::{CachedRegistry, FormConfigurationStore, InMemoryRegistry, TemplateStore};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Exit code for a ticket that fails validation
const EXIT_INVALID: u8 = 2;

type Registry = CachedRegistry<InMemoryRegistry>;

fn registry_arg() -> Arg {
    Arg::new("registry")
        .long("registry")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("Registry fixture (.yaml, .yml or .json)")
}

fn ticket_args(command: Command) -> Command {
    command
        .arg(registry_arg())
        .arg(
            Arg::new("ticket")
                .long("ticket")
                .required(true)
                .value_parser(value_parser!(PathBuf))
                .help("Ticket JSON document"),
        )
        .arg(
            Arg::new("employee-id")
                .long("employee-id")
                .help("Acting user's employee ID"),
        )
        .arg(Arg::new("email").long("email").help("Acting user's email"))
}

fn cli() -> Command {
    Command::new("introflow")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Template resolution and submission validation for product introduction tickets")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Engine configuration (TOML)"),
        )
        .arg(
            Arg::new("log-format")
                .long("log-format")
                .global(true)
                .default_value("text")
                .value_parser(["text", "json"])
                .help("Log output format"),
        )
        .subcommand(ticket_args(
            Command::new("validate").about("Check a ticket against its governing template"),
        ))
        .subcommand(ticket_args(
            Command::new("resolve").about("Show which template governs a ticket and why"),
        ))
        .subcommand(ticket_args(
            Command::new("submit").about("Validate a draft and move it to submitted"),
        ))
        .subcommand(
            Command::new("preview")
                .about("Render a template's form with authored defaults")
                .arg(registry_arg())
                .arg(
                    Arg::new("template")
                        .long("template")
                        .required(true)
                        .help("Template name"),
                )
                .arg(
                    Arg::new("all")
                        .long("all")
                        .action(ArgAction::SetTrue)
                        .help("Show every authored-visible field, ignoring conditions"),
                ),
        )
}

fn init_logging(format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn load_config(matches: &ArgMatches) -> Result<EngineConfig> {
    match matches.get_one::<PathBuf>("config") {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("failed to load configuration {}", path.display())),
        None => Ok(EngineConfig::default()),
    }
}

fn identity(args: &ArgMatches) -> UserIdentity {
    UserIdentity {
        employee_id: args.get_one::<String>("employee-id").cloned(),
        email: args.get_one::<String>("email").cloned(),
    }
}

fn required_path<'a>(args: &'a ArgMatches, name: &str) -> Result<&'a Path> {
    args.get_one::<PathBuf>(name)
        .map(PathBuf::as_path)
        .ok_or_else(|| anyhow!("--{name} is required"))
}

fn open_registry(args: &ArgMatches, config: &EngineConfig) -> Result<Arc<Registry>> {
    let inner = fixture::load_registry(required_path(args, "registry")?)?;
    Ok(Arc::new(CachedRegistry::with_config(inner, config.cache)))
}

fn print_json(value: &impl serde::Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn validate(args: &ArgMatches, config: EngineConfig) -> Result<ExitCode> {
    let registry = open_registry(args, &config)?;
    let ticket = fixture::load_ticket(required_path(args, "ticket")?)?;
    let validator = SubmissionValidator::from_registry(registry, config.validator);

    let outcome = validator.validate(&ticket, &identity(args)).await;
    print_json(&outcome)?;

    Ok(if outcome.is_valid {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_INVALID)
    })
}

async fn resolve(args: &ArgMatches, config: &EngineConfig) -> Result<ExitCode> {
    let registry = open_registry(args, config)?;
    let ticket = fixture::load_ticket(required_path(args, "ticket")?)?;

    let resolution = TemplateResolver::new(registry)
        .explain(&ticket, &identity(args))
        .await;
    let resolved = resolution.resolved.as_ref();

    print_json(&json!({
        "template": resolved.map(|r| r.template.name.as_str()),
        "source": resolved.map(|r| r.source),
        "steps": resolution.steps,
    }))?;
    Ok(ExitCode::SUCCESS)
}

async fn submit(args: &ArgMatches, config: EngineConfig) -> Result<ExitCode> {
    let registry = open_registry(args, &config)?;
    let mut ticket = fixture::load_ticket(required_path(args, "ticket")?)?;
    let gate = SubmissionGate::new(SubmissionValidator::from_registry(registry, config.validator));

    match gate.submit(&mut ticket, &identity(args)).await {
        Ok(receipt) => {
            print_json(&json!({ "receipt": receipt, "ticket": ticket }))?;
            Ok(ExitCode::SUCCESS)
        }
        Err(SubmissionError::Incomplete { missing }) => {
            print_json(&json!({ "rejected": true, "missingFields": missing }))?;
            Ok(ExitCode::from(EXIT_INVALID))
        }
        Err(e) => Err(e.into()),
    }
}

async fn preview(args: &ArgMatches, config: &EngineConfig) -> Result<ExitCode> {
    let registry = open_registry(args, config)?;
    let name = args
        .get_one::<String>("template")
        .ok_or_else(|| anyhow!("--template is required"))?;

    let template = registry
        .template_by_name(name)
        .await?
        .ok_or_else(|| anyhow!("no template named '{name}'"))?;
    let form = registry
        .form(&template.form_configuration_ref)
        .await?
        .ok_or_else(|| {
            anyhow!(
                "template '{}' references missing form configuration '{}'",
                template.name,
                template.form_configuration_ref
            )
        })?;

    let plan = if args.get_flag("all") {
        introflow_visibility::catalog(&form)
    } else {
        introflow_visibility::preview(&form)
    };
    print_json(&plan)?;
    Ok(ExitCode::SUCCESS)
}

async fn run(matches: ArgMatches) -> Result<ExitCode> {
    let config = load_config(&matches)?;

    match matches.subcommand() {
        Some(("validate", args)) => validate(args, config).await,
        Some(("resolve", args)) => resolve(args, &config).await,
        Some(("submit", args)) => submit(args, config).await,
        Some(("preview", args)) => preview(args, &config).await,
        _ => Err(anyhow!("unknown command")),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let matches = cli().get_matches();
    let format = matches
        .get_one::<String>("log-format")
        .map_or("text", String::as_str);
    init_logging(format);

    match run(matches).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        cli().debug_assert();
    }

    #[test]
    fn parses_validate_with_identity() {
        let matches = cli()
            .try_get_matches_from([
                "introflow",
                "--log-format",
                "json",
                "validate",
                "--registry",
                "r.yaml",
                "--ticket",
                "t.json",
                "--email",
                "a@example.com",
            ])
            .unwrap();

        assert_eq!(matches.get_one::<String>("log-format").unwrap(), "json");
        let (name, args) = matches.subcommand().unwrap();
        assert_eq!(name, "validate");
        assert_eq!(identity(args), UserIdentity::email("a@example.com"));
    }

    #[test]
    fn preview_requires_template() {
        let result = cli().try_get_matches_from(["introflow", "preview", "--registry", "r.yaml"]);
        assert!(result.is_err());
    }

    #[test]
    fn missing_config_is_default() {
        let matches = cli()
            .try_get_matches_from([
                "introflow",
                "preview",
                "--registry",
                "r.yaml",
                "--template",
                "X",
            ])
            .unwrap();
        assert_eq!(load_config(&matches).unwrap(), EngineConfig::default());
    }
}
