// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Submit command handler

use anyhow::Result;
use clap::Args;
use mq_adapters::{ObjectStore, Presigner, Provisioner};
use mq_engine::{Backend, Profile, SubmissionOrchestrator, SubmissionReceipt, SubmitRequest};
use std::path::PathBuf;

use crate::backend;
use crate::exit_error::ExitError;
use crate::output::format_receipt;

#[derive(Args)]
pub struct SubmitArgs {
    /// MaxQuant parameter file; data and FASTA files must sit beside it
    #[arg(short = 'm', long = "mqconfig", value_name = "FILE")]
    pub mqconfig: PathBuf,

    /// Job name, unique within the department
    #[arg(short = 'n', long = "jobname")]
    pub jobname: String,

    /// Department or lab that owns the job
    #[arg(short = 'd', long)]
    pub department: String,

    /// Address notified with the results link
    #[arg(short = 'e', long)]
    pub email: String,

    /// Print the worker's remote desktop login after submission
    #[arg(short = 'c', long)]
    pub connect: bool,

    /// Allow the extra-large worker class for jobs past the largest tier
    #[arg(short = 'x', long)]
    pub expedite: bool,
}

impl SubmitArgs {
    fn request(&self) -> SubmitRequest {
        SubmitRequest::new(&self.mqconfig)
            .job_name(&self.jobname)
            .department(&self.department)
            .contact(&self.email)
            .expedite(self.expedite)
    }
}

pub async fn handle(args: SubmitArgs, profile: Profile) -> Result<()> {
    if !args.mqconfig.is_file() {
        return Err(ExitError::failure(format!(
            "MaxQuant configuration file not found: {}",
            args.mqconfig.display()
        ))
        .into());
    }

    let request = args.request();
    let remote_job_dir = profile.remote_job_dir.clone();
    let receipt = match profile.backend {
        Backend::Aws => {
            let cli = backend::aws_cli(&profile);
            let store = backend::aws_store(&cli, &profile);
            let provisioner = backend::aws_provisioner(&cli, &profile);
            let presigner = backend::aws_presigner(&cli, &profile).await?;
            run(store, provisioner, presigner, profile, &request).await?
        }
        Backend::Local => {
            let store = backend::local_store(&profile);
            let provisioner = backend::local_provisioner(&profile);
            let presigner = backend::local_presigner(&profile);
            run(store, provisioner, presigner, profile, &request).await?
        }
    };

    print!("{}", format_receipt(&receipt, args.connect, &remote_job_dir));
    Ok(())
}

async fn run<S: ObjectStore, P: Provisioner, R: Presigner>(
    store: S,
    provisioner: P,
    presigner: R,
    profile: Profile,
    request: &SubmitRequest,
) -> Result<SubmissionReceipt, ExitError> {
    let orchestrator = SubmissionOrchestrator::new(store, provisioner, presigner, profile)?;
    Ok(orchestrator.submit(request).await?)
}
