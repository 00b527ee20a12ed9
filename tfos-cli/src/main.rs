use std::path::PathBuf;

use clap::{Parser, Subcommand};
use colored::Colorize;

use tfos_config::context::CLIENT_CONFIG_FILE_VAR;
use tfos_config::{
    AuthOptions, ClientOpts, CloudEntry, CloudsFile, ConfigContext, Interface, RegionEntry,
    load_clouds_yaml, resolve_cloud,
};
use tfos_provider::{KeystoneAuthenticator, SERVICE_NAMES, Service, new_service_client};

#[derive(Parser)]
#[command(name = "tfos")]
#[command(about = "Resolve OpenStack cloud configuration and service clients", long_about = None)]
struct Cli {
    /// Use this clouds.yaml instead of searching for one
    #[arg(long, global = true)]
    config_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List clouds defined in clouds.yaml
    Clouds,
    /// Show resolved auth options for a cloud
    Auth {
        /// Cloud name (defaults to OS_CLOUD or the only cloud defined)
        #[arg(long)]
        cloud: Option<String>,

        /// Prefix for override environment variables
        #[arg(long)]
        env_prefix: Option<String>,
    },
    /// List supported services and API versions
    Services,
    /// Authenticate and resolve the endpoint of a service
    Client {
        /// Service name (e.g., compute, network, volume)
        service: String,

        /// Cloud name (defaults to OS_CLOUD or the only cloud defined)
        #[arg(long)]
        cloud: Option<String>,

        /// Prefix for override environment variables
        #[arg(long)]
        env_prefix: Option<String>,

        /// Region, overriding the cloud entry and OS_REGION_NAME
        #[arg(long)]
        region: Option<String>,

        /// Endpoint interface: public, internal or admin
        #[arg(long, value_parser = parse_interface)]
        interface: Option<Interface>,
    },
}

fn parse_interface(value: &str) -> Result<Interface, String> {
    value.parse().map_err(|e: tfos_config::ConfigError| e.to_string())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let mut ctx = ConfigContext::from_process();
    if let Some(ref path) = cli.config_file {
        ctx = ctx.with_var(CLIENT_CONFIG_FILE_VAR, path.to_string_lossy());
    }

    let result = match cli.command {
        Commands::Clouds => run_clouds(&ctx),
        Commands::Auth { cloud, env_prefix } => {
            run_auth(&ctx, &client_opts(cloud, env_prefix))
        }
        Commands::Services => run_services(),
        Commands::Client {
            service,
            cloud,
            env_prefix,
            region,
            interface,
        } => {
            let mut opts = client_opts(cloud, env_prefix);
            opts.region_name = region;
            opts.interface = interface;
            run_client(&ctx, &opts, &service).await
        }
    };

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn client_opts(cloud: Option<String>, env_prefix: Option<String>) -> ClientOpts {
    ClientOpts {
        cloud,
        env_prefix,
        ..Default::default()
    }
}

fn run_clouds(ctx: &ConfigContext) -> Result<(), String> {
    let source = load_clouds_yaml(ctx).map_err(|e| e.to_string())?;
    let file = CloudsFile::from_slice(&source.contents).map_err(|e| e.to_string())?;

    println!("{} {}", "Loaded".cyan(), source.path.display());
    println!();

    if file.clouds.is_empty() {
        println!("{}", "No clouds defined.".yellow());
        return Ok(());
    }

    let default = file.default_name(&ClientOpts::new(), ctx);
    for (name, entry) in &file.clouds {
        let marker = if default.as_deref() == Some(name.as_str()) {
            "*".green().bold().to_string()
        } else {
            " ".to_string()
        };
        println!("{} {}", marker, name.bold());
        print_cloud_details(entry);
    }

    Ok(())
}

fn print_cloud_details(entry: &CloudEntry) {
    let or_default = |v: &Option<String>, default: &str| {
        v.clone().unwrap_or_else(|| format!("{} (default)", default))
    };

    println!(
        "    region:   {}",
        entry.region_name.as_deref().unwrap_or("-")
    );
    if !entry.regions.is_empty() {
        let regions: Vec<&str> = entry.regions.iter().map(RegionEntry::name).collect();
        println!("    regions:  {}", regions.join(", "));
    }
    println!(
        "    identity: {}",
        or_default(&entry.identity_api_version, "3")
    );
    println!("    volume:   {}", or_default(&entry.volume_api_version, "2"));
}

fn run_auth(ctx: &ConfigContext, opts: &ClientOpts) -> Result<(), String> {
    let cloud = resolve_cloud(opts, ctx).map_err(|e| e.to_string())?;
    let options = cloud.auth_options(opts, ctx).map_err(|e| e.to_string())?;

    if let Some(ref name) = cloud.name {
        println!("{} {}", "Cloud:".cyan(), name.bold());
    }
    if let Some(ref path) = cloud.source {
        println!("{} {}", "From:".cyan(), path.display());
    }
    println!();
    print_auth_options(&options);

    Ok(())
}

fn print_auth_options(options: &AuthOptions) {
    let show = |v: &Option<String>| v.clone().unwrap_or_else(|| "-".to_string());

    println!("  auth_url:    {}", options.endpoint());
    println!("  username:    {}", options.username());
    println!("  password:    {}", "********".dimmed());
    println!("  tenant_id:   {}", show(&options.tenant_id));
    println!("  tenant_name: {}", show(&options.tenant_name));
    println!("  domain_id:   {}", show(&options.domain_id));
    println!("  domain_name: {}", show(&options.domain_name));
}

fn run_services() -> Result<(), String> {
    let defaults = CloudEntry::default();

    for name in SERVICE_NAMES {
        let service = Service::resolve(name, &defaults).map_err(|e| e.to_string())?;
        println!(
            "  {:<14} {} (supported: {})",
            name.bold(),
            service.version().green(),
            service.supported_versions().join(", ")
        );
    }

    Ok(())
}

async fn run_client(ctx: &ConfigContext, opts: &ClientOpts, service: &str) -> Result<(), String> {
    let authenticator = KeystoneAuthenticator::new().map_err(|e| e.to_string())?;

    println!("{}", "Authenticating...".cyan());
    let client = new_service_client(service, opts, ctx, &authenticator)
        .await
        .map_err(|e| e.to_string())?;

    println!(
        "{}",
        format!("✓ {} client ready.", client.service).green().bold()
    );
    println!("  endpoint:      {}", client.endpoint);
    println!("  resource base: {}", client.resource_base);
    println!(
        "  region:        {}",
        client.region.as_deref().unwrap_or("-")
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_client_arguments() {
        let cli = Cli::parse_from([
            "tfos",
            "--config-file",
            "/tmp/clouds.yaml",
            "client",
            "volume",
            "--cloud",
            "devstack",
            "--interface",
            "internal",
        ]);

        assert_eq!(cli.config_file, Some(PathBuf::from("/tmp/clouds.yaml")));
        match cli.command {
            Commands::Client {
                service,
                cloud,
                interface,
                ..
            } => {
                assert_eq!(service, "volume");
                assert_eq!(cloud.as_deref(), Some("devstack"));
                assert_eq!(interface, Some(Interface::Internal));
            }
            _ => panic!("Expected client command"),
        }
    }

    #[test]
    fn test_invalid_interface_rejected() {
        let result = Cli::try_parse_from(["tfos", "client", "compute", "--interface", "private"]);
        assert!(result.is_err());
    }
}
