//! mesh-gateway - fetch and run the Mesh AI Gateway
//!
//! Usage:
//!   mesh-gateway [--transport-version <latest|vX.Y.Z>] [ARGS...]
//!
//! Every argument other than `--transport-version` is passed to the gateway.

use clap::Parser;
use mesh_gateway_launcher::{LauncherConfig, SystemPaths, launch, output, report};

#[derive(Parser)]
#[command(name = "mesh-gateway")]
#[command(about = "Download, cache and run the Mesh AI Gateway binary")]
#[command(disable_help_flag = true, disable_version_flag = true)]
struct Cli {
    /// Arguments for the gateway, plus an optional --transport-version
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

fn main() {
    let cli = Cli::parse();

    let config = LauncherConfig::from_env();
    output::set_verbose(config.verbose);

    let code = match launch(&config, &SystemPaths, cli.args) {
        Ok(code) => code,
        Err(err) => {
            report(&err);
            err.exit_code()
        }
    };
    std::process::exit(code);
}
