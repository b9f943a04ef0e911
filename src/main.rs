//! Filmeto Crew - crew member and soul resolution
//!
//! Entry point for the `filmeto-crew` binary.

use clap::Parser;
use tracing::{debug, info};

use filmeto_crew::cli::{Cli, Commands, ConfigSubcommand};
use filmeto_crew::config::{self, CrewConfig, ImportanceMode};
use filmeto_crew::crew::{CrewService, ImportanceOrder, ProjectCrewMember, TitleCatalog};
use filmeto_crew::error::{Error, Result};
use filmeto_crew::logging;
use filmeto_crew::soul::{SoulProfile, SoulService};
use filmeto_crew::version;

fn main() {
    // Parse CLI arguments first (before logging, so we know verbosity)
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprint!("{}", e.format_for_terminal());
        std::process::exit(e.exit_code());
    }
}

fn run(cli: Cli) -> Result<()> {
    // Commands that don't need the crew service
    match &cli.command {
        Commands::Version => {
            version::print_version();
            return Ok(());
        }
        Commands::Config { subcommand } => {
            logging::init_simple(tracing::Level::WARN)?;
            return handle_config_command(subcommand.clone(), cli.config.as_deref());
        }
        _ => {}
    }

    let config = CrewConfig::load(cli.config.as_deref())?;

    // The guards must be kept alive for the lifetime of the program
    let _log_guards = logging::init_logging(&config.logging, cli.verbose, cli.quiet)?;

    let build = version::build_info();
    debug!(version = %build.full_version(), "Starting filmeto-crew");
    info!(
        templates = %config.crew.system_dir,
        language = %config.crew.language,
        importance = %config.crew.importance,
        "Configuration loaded"
    );

    match cli.command {
        Commands::Init { project } => {
            let service = CrewService::from_config(&config);
            let written = service.initialize(&project)?;
            if written.is_empty() {
                println!("Crew already initialized: {}", project.display());
            }
            for path in written {
                println!("created {}", path.display());
            }
        }
        Commands::List { project, dynamic, json } => {
            let service = CrewService::from_config(&config);
            let members = if dynamic {
                service.list_sorted_with(&project, &service.titles().importance_order(true))?
            } else {
                service.list_display_order(&project)?
            };
            print_members(&service, &members, json)?;
        }
        Commands::Show { project, name, json } => {
            let service = CrewService::from_config(&config);
            let member = service
                .get_crew_member(&project, &name)?
                .ok_or_else(|| Error::MemberNotFound {
                    name: name.clone(),
                    project: project.display().to_string(),
                })?;
            print_member(&service, &member, json)?;
        }
        Commands::Titles { language, dynamic } => {
            let language = language.unwrap_or_else(|| config.crew.language.clone());
            let catalog = TitleCatalog::new(config.crew_system_dir(), language);
            let dynamic = dynamic || config.crew.importance == ImportanceMode::Dynamic;
            print_titles(&catalog, &catalog.importance_order(dynamic));
        }
        Commands::Souls { skill, name } => {
            let souls = SoulService::load(config.soul_system_dir(), config.soul_user_dir());
            if let Some(name) = name {
                let soul = souls
                    .get_soul_by_name(&name)
                    .ok_or(Error::SoulNotFound { name })?;
                print_soul(soul);
                return Ok(());
            }
            let listed: Vec<&SoulProfile> = match skill.as_deref() {
                Some(skill) => souls.search_souls_by_skill(skill),
                None => souls.iter().collect(),
            };
            print_souls(&listed);
        }
        Commands::Version | Commands::Config { .. } => {
            // Already handled above
            unreachable!();
        }
    }

    Ok(())
}

fn print_members(service: &CrewService, members: &[ProjectCrewMember], json: bool) -> Result<()> {
    if json {
        let summaries: Vec<_> = members.iter().map(ProjectCrewMember::summary).collect();
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }

    if members.is_empty() {
        println!("No crew members.");
        return Ok(());
    }

    let language = service.titles().language();
    println!("{:<24} {:<20} {:<24} {}", "NAME", "TITLE", "SOUL", "MODEL");
    for member in members {
        println!(
            "{:<24} {:<20} {:<24} {}",
            member.name,
            service.titles().display_name(&member.role_id(), language),
            member.soul.as_deref().unwrap_or("-"),
            member.model,
        );
    }
    Ok(())
}

fn print_member(service: &CrewService, member: &ProjectCrewMember, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&member.summary())?);
        return Ok(());
    }

    let titles = service.titles();
    println!("{} {}", member.icon, member.name);
    println!("  Title:       {}", titles.display_name(&member.role_id(), titles.language()));
    println!("  Soul:        {}", member.soul.as_deref().unwrap_or("-"));
    println!("  Description: {}", member.description);
    println!("  Skills:      {}", member.skills.join(", "));
    println!("  Model:       {} (temperature {}, max steps {})", member.model, member.temperature, member.max_steps);
    println!("  Color:       {}", member.color);
    println!("  File:        {}", member.config_path.display());
    if !member.prompt.is_empty() {
        println!();
        println!("{}", member.prompt);
    }
    Ok(())
}

fn print_titles(catalog: &TitleCatalog, order: &ImportanceOrder) {
    for id in order.ids() {
        println!(
            "{:>2}  {:<20} {}",
            order.rank(&id),
            id,
            catalog.display_name(&id, catalog.language())
        );
    }
}

fn print_souls(souls: &[&SoulProfile]) {
    if souls.is_empty() {
        println!("No souls found.");
        return;
    }
    for soul in souls {
        if soul.skills.is_empty() {
            println!("{}", soul.name);
        } else {
            println!("{}  [{}]", soul.name, soul.skills.join(", "));
        }
    }
}

fn print_soul(soul: &SoulProfile) {
    println!("{}", soul.name);
    println!("  Crew title: {}", soul.crew_title().as_deref().unwrap_or("-"));
    println!("  Skills:     {}", soul.skills.join(", "));
    if let Some(path) = &soul.description_file {
        println!("  File:       {}", path.display());
    }
    if !soul.knowledge.is_empty() {
        println!();
        println!("{}", soul.knowledge);
    }
}

/// Handle config subcommands
fn handle_config_command(subcommand: ConfigSubcommand, config_path: Option<&str>) -> Result<()> {
    match subcommand {
        ConfigSubcommand::Show => {
            let cfg = CrewConfig::load(config_path)?;
            println!("{}", toml::to_string_pretty(&cfg)?);
        }
        ConfigSubcommand::Init { path, force } => {
            let written = config::init_config(path.as_deref(), force)?;
            println!("Configuration file created: {}", written.display());
        }
        ConfigSubcommand::Validate => {
            CrewConfig::load(config_path)?;
            println!("Configuration is valid.");
        }
    }

    Ok(())
}
