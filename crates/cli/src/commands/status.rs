// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Status command handler

use anyhow::Result;
use clap::Args;
use mq_adapters::ObjectStore;
use mq_core::{JobIdentity, JobLayout};
use mq_engine::{Backend, JobControl, JobStatus, Profile};

use crate::backend;
use crate::exit_error::ExitError;
use crate::output::{format_status, format_status_json, OutputFormat};

#[derive(Args)]
pub struct StatusArgs {
    /// Job name given at submission
    #[arg(short = 'n', long = "jobname")]
    pub jobname: String,

    /// Department given at submission
    #[arg(short = 'd', long)]
    pub department: String,

    #[arg(short = 'o', long, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,
}

pub async fn handle(args: StatusArgs, profile: Profile) -> Result<()> {
    let identity = JobIdentity::new(&args.department, &args.jobname)
        .map_err(|e| ExitError::failure(e.to_string()))?;
    let layout = JobLayout::new(&identity, profile.config_name.clone());

    let status = match profile.backend {
        Backend::Aws => {
            let cli = backend::aws_cli(&profile);
            read(backend::aws_store(&cli, &profile), layout).await?
        }
        Backend::Local => read(backend::local_store(&profile), layout).await?,
    };

    match args.output {
        OutputFormat::Text => print!("{}", format_status(&status)),
        OutputFormat::Json => println!("{}", format_status_json(&status)?),
    }
    Ok(())
}

async fn read<S: ObjectStore>(store: S, layout: JobLayout) -> Result<JobStatus, ExitError> {
    JobControl::new(store, layout).status().await.map_err(|e| ExitError::failure(e.to_string()))
}
