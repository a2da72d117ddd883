use crate::output::{print_json, print_table, step_rows};
use crate::settings::Settings;
use anyhow::Context;
use dispatch_core::Workflow;

pub fn run(settings: &Settings, json: bool) -> anyhow::Result<()> {
    let client = super::client(settings)?;
    let clock = settings.config.clock()?;
    let mut rng = rand::thread_rng();

    let report = Workflow::new(
        &client,
        settings.config.workflow_options(&settings.user),
        clock.as_ref(),
        &mut rng,
    )
    .run()
    .context("dispatch run aborted")?;

    if json {
        print_json(&report)?;
    } else {
        print_table(&["#", "STEP", "RESULT"], step_rows(&report));
    }
    Ok(())
}
