//! mcpm - MCP server profile manager
//!
//! Usage:
//!   mcpm server create github --env GITHUB_TOKEN=... -- npx -y @modelcontextprotocol/server-github
//!   mcpm profile create dev
//!   mcpm profile add dev github
//!   mcpm apply dev --target .mcp.json

mod interactive;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use console::style;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mcpm_core::commands::{
    ApplyCommand, ApplyMode, ApplyOptions, SnapshotCommand, SnapshotOptions,
};
use mcpm_core::context::AppContext;
use mcpm_core::env::{EnvMap, load_env_file, parse_env_pairs};
use mcpm_core::listing::RecordFailure;
use mcpm_core::mcp_config::McpConfigDocument;
use mcpm_core::profile::Profile;
use mcpm_core::template::{ServerTemplate, TemplateSpec};

use crate::interactive::TerminalConfirmer;

#[derive(Parser)]
#[command(name = "mcpm")]
#[command(about = "MCP server template & profile manager", long_about = None)]
struct Cli {
    /// Base directory for templates and profiles (default: $MCPM_HOME or the user config dir)
    #[arg(long, global = true, value_name = "DIR")]
    config_dir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage server templates
    Server(ServerArgs),

    /// Manage profiles
    Profile(ProfileArgs),

    /// Write a profile's servers into the target MCP config file
    Apply(ApplyArgs),

    /// Print the MCP config `apply` would write, without writing it
    Preview(ApplyArgs),
}

#[derive(Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// Machine-readable JSON
    Json,
}

#[derive(Args)]
struct ServerArgs {
    #[command(subcommand)]
    command: ServerSubcommand,
}

#[derive(Subcommand)]
enum ServerSubcommand {
    /// Create a server template (asks before overwriting an existing one)
    #[command(alias = "save")]
    Create(Box<TemplateFields>),

    /// Update fields of an existing template
    Update(Box<TemplateFields>),

    /// Show a template
    Show {
        name: String,
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// List templates
    #[command(alias = "ls")]
    List {
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Copy a template
    #[command(alias = "cp")]
    Copy {
        source: String,
        dest: String,
        /// Overwrite the destination if it exists
        #[arg(long, short)]
        force: bool,
    },

    /// Rename a template and repoint profiles at the new name
    #[command(alias = "mv")]
    Rename {
        old: String,
        new: String,
        /// Overwrite the destination if it exists
        #[arg(long, short)]
        force: bool,
    },

    /// Delete a template
    #[command(alias = "rm")]
    Delete {
        name: String,
        /// Skip prompts and strip references from profiles
        #[arg(long, short)]
        force: bool,
    },

    /// Delete all templates
    Reset {
        #[arg(long, short)]
        force: bool,
    },

    /// Save servers from an existing MCP config file as templates
    Import {
        /// MCP config file to read (default: settings target)
        #[arg(long, value_name = "PATH")]
        from: Option<PathBuf>,
        /// Only import these servers
        #[arg(long = "only", value_name = "NAME")]
        only: Vec<String>,
        /// Overwrite existing templates without asking
        #[arg(long, short)]
        force: bool,
    },
}

#[derive(Args)]
struct TemplateFields {
    /// Template name
    name: String,
    /// Command to run (alternative to passing it after --)
    #[arg(long, conflicts_with = "command_line")]
    command: Option<String>,
    /// Command argument (repeatable)
    #[arg(long = "arg", value_name = "ARG", allow_hyphen_values = true)]
    args: Vec<String>,
    /// Clear all arguments
    #[arg(long, conflicts_with = "args")]
    clear_args: bool,
    /// Environment variable (KEY=VALUE; KEY= removes it on update)
    #[arg(long, value_name = "KEY=VALUE")]
    env: Vec<String>,
    /// Read environment variables from a .env file
    #[arg(long, value_name = "PATH")]
    env_from: Option<PathBuf>,
    /// Clear all environment variables
    #[arg(long, conflicts_with_all = ["env", "env_from"])]
    clear_env: bool,
    /// Description
    #[arg(long, short)]
    description: Option<String>,
    /// Startup timeout passed through to the MCP client
    #[arg(long)]
    timeout: Option<u64>,
    /// envFile passed through to the MCP client
    #[arg(long, value_name = "PATH")]
    env_file: Option<String>,
    /// Transport type passed through to the MCP client
    #[arg(long)]
    transport: Option<String>,
    /// Overwrite without asking
    #[arg(long, short)]
    force: bool,
    /// Command and arguments (after --)
    #[arg(last = true)]
    command_line: Vec<String>,
}

#[derive(Args)]
struct ProfileArgs {
    #[command(subcommand)]
    command: ProfileSubcommand,
}

#[derive(Subcommand)]
enum ProfileSubcommand {
    /// Create an empty profile
    Create {
        name: String,
        #[arg(long, short, default_value = "")]
        description: String,
    },

    /// Show a profile
    Show {
        name: String,
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// List profiles
    #[command(alias = "ls")]
    List {
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Delete a profile
    #[command(alias = "rm")]
    Delete {
        name: String,
        #[arg(long, short)]
        force: bool,
    },

    /// Rename a profile
    #[command(alias = "mv")]
    Rename {
        old: String,
        new: String,
        #[arg(long, short)]
        force: bool,
    },

    /// Change a profile's description
    Describe { name: String, description: String },

    /// Add a server (template reference) to a profile
    Add {
        profile: String,
        template: String,
        /// Instance name (default: template name)
        #[arg(long = "as", value_name = "INSTANCE", default_value = "")]
        instance: String,
        /// Environment override (KEY=VALUE)
        #[arg(long, value_name = "KEY=VALUE")]
        env: Vec<String>,
    },

    /// Remove a server from a profile
    Remove { profile: String, instance: String },

    /// Merge profiles into a new one; the first profile to define an instance wins
    Merge {
        dest: String,
        #[arg(required = true)]
        sources: Vec<String>,
        /// Replace the destination if it exists
        #[arg(long, short)]
        force: bool,
    },

    /// Capture an MCP config file as templates and a profile
    Snapshot {
        name: String,
        /// MCP config file to read (default: settings target)
        #[arg(long, value_name = "PATH")]
        from: Option<PathBuf>,
        #[arg(long = "only", value_name = "NAME")]
        only: Vec<String>,
        #[arg(long, short, default_value = "")]
        description: String,
        #[arg(long, short)]
        force: bool,
    },

    /// Delete all profiles
    Reset {
        #[arg(long, short)]
        force: bool,
    },
}

#[derive(Args)]
struct ApplyArgs {
    /// Profile to apply
    profile: String,
    /// Target MCP config file (default: settings target)
    #[arg(long, short, value_name = "PATH")]
    target: Option<PathBuf>,
    /// Keep servers already in the target (profile entries win)
    #[arg(long)]
    merge: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "mcpm=debug,debug"
    } else {
        "mcpm=info,warn"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let ctx = AppContext::with_defaults(cli.config_dir)?;
    tracing::debug!(base_dir = %ctx.base_dir().display(), "using config directory");

    match cli.command {
        Commands::Server(args) => run_server(&ctx, args.command)?,
        Commands::Profile(args) => run_profile(&ctx, args.command)?,
        Commands::Apply(args) => run_apply(&ctx, args)?,
        Commands::Preview(args) => run_preview(&ctx, args)?,
    }
    Ok(())
}

fn run_server(ctx: &AppContext, command: ServerSubcommand) -> Result<()> {
    let templates = ctx.templates();
    let confirmer = TerminalConfirmer::new();

    match command {
        ServerSubcommand::Create(fields) => {
            let spec = template_spec(&fields)?;
            let outcome = templates.save_manual(&spec, fields.force, &confirmer)?;
            let verb = if outcome.is_created() { "Created" } else { "Updated" };
            println!("✓ {verb} server template '{}'", outcome.template().name);
        }
        ServerSubcommand::Update(fields) => {
            let spec = template_spec(&fields)?;
            let template = templates.update(&spec)?;
            println!("✓ Updated server template '{}'", template.name);
        }
        ServerSubcommand::Show { name, format } => {
            let template = templates.load(&name)?;
            match format {
                OutputFormat::Table => print_template(&template),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&template)?),
            }
        }
        ServerSubcommand::List { format } => {
            let listing = templates.list()?;
            match format {
                OutputFormat::Table => print_template_table(&listing.entries),
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&listing.entries)?)
                }
            }
            print_failures(&listing.failures);
        }
        ServerSubcommand::Copy {
            source,
            dest,
            force,
        } => {
            templates.copy(&source, &dest, force)?;
            println!("✓ Copied server template '{source}' to '{dest}'");
        }
        ServerSubcommand::Rename { old, new, force } => {
            let report = templates.rename(&old, &new, force, &ctx.profiles())?;
            println!("✓ Renamed server template '{old}' to '{new}'");
            if !report.updated_profiles.is_empty() {
                println!(
                    "  Updated references in: {}",
                    report.updated_profiles.join(", ")
                );
            }
        }
        ServerSubcommand::Delete { name, force } => {
            let report = templates.delete(&name, force, &ctx.profiles(), &confirmer)?;
            println!("✓ Deleted server template '{}'", report.name);
            if !report.referenced_by.is_empty() {
                if report.cleaned_profiles.is_empty() {
                    println!(
                        "  {} Still referenced by: {}",
                        style("⚠").yellow(),
                        report.referenced_by.join(", ")
                    );
                } else {
                    println!(
                        "  Removed references from: {}",
                        report.cleaned_profiles.join(", ")
                    );
                }
            }
        }
        ServerSubcommand::Reset { force } => {
            let deleted = templates.reset(force, &confirmer)?;
            if deleted.is_empty() {
                println!("No server templates to delete.");
            } else {
                println!("✓ Deleted {} server template(s)", deleted.len());
            }
        }
        ServerSubcommand::Import { from, only, force } => {
            let source = ctx.target_path(from.as_deref());
            let document = McpConfigDocument::load_existing(&source, ctx.servers_key())?;
            let report = templates.import_from_document(&document, &only, force, &confirmer)?;
            println!(
                "✓ Imported {}/{} server(s) from {}",
                report.saved.len(),
                report.total,
                source.display()
            );
            print_failures(&report.failures);
        }
    }
    Ok(())
}

fn run_profile(ctx: &AppContext, command: ProfileSubcommand) -> Result<()> {
    let profiles = ctx.profiles();
    let confirmer = TerminalConfirmer::new();

    match command {
        ProfileSubcommand::Create { name, description } => {
            profiles.create(&name, &description)?;
            println!("✓ Created profile '{name}'");
        }
        ProfileSubcommand::Show { name, format } => {
            let profile = profiles.load(&name)?;
            match format {
                OutputFormat::Table => print_profile(ctx, &profile),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&profile)?),
            }
        }
        ProfileSubcommand::List { format } => {
            let listing = profiles.list()?;
            match format {
                OutputFormat::Table => print_profile_table(&listing.entries),
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&listing.entries)?)
                }
            }
            print_failures(&listing.failures);
        }
        ProfileSubcommand::Delete { name, force } => {
            profiles.delete(&name, force, &confirmer)?;
            println!("✓ Deleted profile '{name}'");
        }
        ProfileSubcommand::Rename { old, new, force } => {
            profiles.rename(&old, &new, force)?;
            println!("✓ Renamed profile '{old}' to '{new}'");
        }
        ProfileSubcommand::Describe { name, description } => {
            profiles.set_description(&name, &description)?;
            println!("✓ Updated description of profile '{name}'");
        }
        ProfileSubcommand::Add {
            profile,
            template,
            instance,
            env,
        } => {
            let overrides = parse_env_pairs(&env)?;
            let updated = profiles.add_server(&profile, &template, &instance, overrides)?;
            let added = updated.servers.last().map(|s| s.name.as_str()).unwrap_or("");
            println!("✓ Added '{added}' ({template}) to profile '{profile}'");
            if !ctx.templates().exists(&template) {
                println!(
                    "  {} Template '{template}' does not exist yet",
                    style("⚠").yellow()
                );
            }
        }
        ProfileSubcommand::Remove { profile, instance } => {
            profiles.remove_server(&profile, &instance)?;
            println!("✓ Removed '{instance}' from profile '{profile}'");
        }
        ProfileSubcommand::Merge {
            dest,
            sources,
            force,
        } => {
            let merged = profiles.merge(&dest, &sources, force)?;
            println!(
                "✓ Merged {} into '{dest}' ({} server(s))",
                sources.join(", "),
                merged.servers.len()
            );
        }
        ProfileSubcommand::Snapshot {
            name,
            from,
            only,
            description,
            force,
        } => {
            let mut options = SnapshotOptions::new(&name)
                .with_description(description)
                .with_only(only)
                .with_force(force);
            if let Some(from) = from {
                options = options.with_source(from);
            }
            let report = SnapshotCommand::new(ctx.clone()).execute(&options, &confirmer)?;
            println!(
                "✓ Created profile '{}' with {}/{} server(s) from {}",
                report.profile.name,
                report.import.saved.len(),
                report.import.total,
                report.source.display()
            );
            print_failures(&report.import.failures);
        }
        ProfileSubcommand::Reset { force } => {
            let deleted = profiles.reset(force, &confirmer)?;
            if deleted.is_empty() {
                println!("No profiles to delete.");
            } else {
                println!("✓ Deleted {} profile(s)", deleted.len());
            }
        }
    }
    Ok(())
}

fn apply_options(args: ApplyArgs) -> ApplyOptions {
    let mut options = ApplyOptions::new(args.profile);
    if let Some(target) = args.target {
        options = options.with_target(target);
    }
    if args.merge {
        options = options.with_mode(ApplyMode::Merge);
    }
    options
}

fn run_apply(ctx: &AppContext, args: ApplyArgs) -> Result<()> {
    let options = apply_options(args);
    let report = ApplyCommand::new(ctx.clone()).execute(&options)?;

    println!(
        "✓ Applied profile '{}' to {} ({} server(s))",
        report.profile,
        report.target.display(),
        report.servers.len()
    );
    for name in &report.replaced {
        println!("  Replaced existing server '{name}'");
    }
    Ok(())
}

fn run_preview(ctx: &AppContext, args: ApplyArgs) -> Result<()> {
    let options = apply_options(args);
    let document = ApplyCommand::new(ctx.clone()).preview(&options)?;
    println!("{}", serde_json::to_string_pretty(&document)?);
    Ok(())
}

fn template_spec(fields: &TemplateFields) -> Result<TemplateSpec> {
    let (command, mut args) = match fields.command_line.split_first() {
        Some((command, rest)) => (command.clone(), rest.to_vec()),
        None => (fields.command.clone().unwrap_or_default(), Vec::new()),
    };
    args.extend(fields.args.iter().cloned());

    let mut spec = TemplateSpec::new(&fields.name, command);
    if fields.clear_args {
        spec = spec.with_args([""]);
    } else if !args.is_empty() {
        spec = spec.with_args(args);
    }

    if fields.clear_env {
        spec = spec.with_env(EnvMap::new());
    } else {
        let mut env = match &fields.env_from {
            Some(path) => load_env_file(path)?,
            None => EnvMap::new(),
        };
        env.extend(parse_env_pairs(&fields.env)?);
        if !env.is_empty() {
            spec = spec.with_env(env);
        }
    }

    if let Some(description) = &fields.description {
        spec = spec.with_description(description);
    }
    if let Some(timeout) = fields.timeout {
        spec = spec.with_timeout(timeout);
    }
    if let Some(env_file) = &fields.env_file {
        spec = spec.with_env_file(env_file);
    }
    if let Some(transport) = &fields.transport {
        spec = spec.with_transport_type(transport);
    }
    Ok(spec)
}

fn print_template(template: &ServerTemplate) {
    let config = &template.config;
    println!("{}", style(&template.name).bold());
    if let Some(description) = &template.description {
        println!("  {description}");
    }
    println!("  Command:   {} {}", config.command, config.args.join(" "));
    for (key, value) in &config.env {
        println!("  Env:       {key}={value}");
    }
    if let Some(timeout) = config.timeout {
        println!("  Timeout:   {timeout}");
    }
    if let Some(env_file) = &config.env_file {
        println!("  Env file:  {env_file}");
    }
    if let Some(transport) = &config.transport_type {
        println!("  Transport: {transport}");
    }
    println!("  Created:   {}", template.created_at.format("%Y-%m-%d %H:%M:%S"));
}

fn print_template_table(templates: &[ServerTemplate]) {
    if templates.is_empty() {
        println!("No server templates.");
        println!("Create one with: mcpm server create <name> -- <command> [args...]");
        return;
    }

    println!("{:<24} {:<30} Description", "Name", "Command");
    println!("{}", "-".repeat(80));
    for template in templates {
        println!(
            "{:<24} {:<30} {}",
            template.name,
            template.config.command,
            template.description.as_deref().unwrap_or("")
        );
    }
}

fn print_profile(ctx: &AppContext, profile: &Profile) {
    let templates = ctx.templates();
    println!("{}", style(&profile.name).bold());
    if !profile.description.is_empty() {
        println!("  {}", profile.description);
    }
    println!("  Updated: {}", profile.updated_at.format("%Y-%m-%d %H:%M:%S"));
    if profile.servers.is_empty() {
        println!("  (no servers)");
        return;
    }
    for server in &profile.servers {
        let marker = if templates.exists(&server.template) {
            style("•").green()
        } else {
            style("✗").red()
        };
        print!("  {marker} {} -> {}", server.name, server.template);
        if let Some(env) = &server.overrides.env {
            let keys: Vec<_> = env.keys().map(String::as_str).collect();
            print!("  (env overrides: {})", keys.join(", "));
        }
        println!();
    }
}

fn print_profile_table(profiles: &[Profile]) {
    if profiles.is_empty() {
        println!("No profiles.");
        println!("Create one with: mcpm profile create <name>");
        return;
    }

    println!("{:<24} {:<8} Description", "Name", "Servers");
    println!("{}", "-".repeat(70));
    for profile in profiles {
        println!(
            "{:<24} {:<8} {}",
            profile.name,
            profile.servers.len(),
            profile.description
        );
    }
}

fn print_failures(failures: &[RecordFailure]) {
    for failure in failures {
        eprintln!("  {} {}: {}", style("⚠").yellow(), failure.name, failure.error);
    }
}
