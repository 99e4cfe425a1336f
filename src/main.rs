#![doc = include_str!("../README.md")]

/*
 * IGS-FETCH is part of the nav-solutions framework.
 * Authors: Guillaume W. Bres <guillaume.bressaix@gmail.com> et al,
 * (cf. https://github.com/nav-solutions/igs-fetch/graphs/contributors)
 * This framework is shipped under Mozilla Public V2 license.
 *
 * Documentation: https://github.com/nav-solutions/igs-fetch
 */

use env_logger::{Builder, Target};

use log::{LevelFilter, error, warn};

mod archive;
mod cli;
mod decompress;
mod error;
mod fetch;
mod header;
mod settings;
mod workflow;

use crate::{cli::Cli, fetch::HttpFetcher, workflow::Workflow};

#[tokio::main(flavor = "current_thread")]
pub async fn main() {
    let mut builder = Builder::new();

    builder
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .target(Target::Stdout)
        .format_timestamp_secs()
        .format_module_path(false)
        .init();

    // cli
    let cli = Cli::new();
    let settings = cli.settings();

    let fetcher = match HttpFetcher::new(settings.request_timeout()) {
        Ok(fetcher) => fetcher,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        },
    };

    let workflow = Workflow::new(settings, fetcher);

    match workflow.run().await {
        Ok(summary) => {
            if !summary.base.is_ready() || !summary.navigation.is_ready() {
                warn!("some files could not be retrieved automatically");
            }
            println!("\n{}", summary);
        },
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        },
    }
}
