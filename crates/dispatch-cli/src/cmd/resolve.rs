use crate::output::{print_json, print_table, resource_rows};
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
    .resolve()
    .context("resource resolution failed")?;

    if json {
        #[derive(serde::Serialize)]
        struct ResolveOutput<'a> {
            site: &'a Option<dispatch_core::ResourceRecord>,
            area: &'a Option<dispatch_core::ResourceRecord>,
            line: &'a Option<dispatch_core::ResourceRecord>,
            machine: &'a Option<dispatch_core::ResourceRecord>,
            dispatch_type: &'a Option<dispatch_core::ResourceRecord>,
        }

        print_json(&ResolveOutput {
            site: &report.site,
            area: &report.area,
            line: &report.line,
            machine: &report.machine,
            dispatch_type: &report.dispatch_type,
        })?;
    } else {
        print_table(&["RESOURCE", "ID", "CODE", "DESCRIPTION"], resource_rows(&report));
    }
    Ok(())
}
