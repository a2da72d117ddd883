//! The twelve-step dispatch run.
//!
//! Steps execute strictly in order. Each one receives the [`RunReport`]
//! built so far and returns it extended with whatever it resolved or
//! created; [`Workflow::run_steps`] folds over the list and stops at the
//! first failure. Nothing is retried or rolled back: a failure after a
//! clock-in leaves the user clocked in.

use rand::{Rng, RngCore};
use serde::Serialize;
use tracing::info;

use crate::client::ApiClient;
use crate::error::{DispatchError, Result};
use crate::resolver::Resolver;
use crate::resource::{DispatchHandle, ResourceRecord};
use crate::session::Endpoint;
use crate::time::{Clock, Precision, TimeWindow};

pub const DISPATCH_DESCRIPTION: &str = "l2lsdk test dispatch";
pub const HISTORICAL_DISPATCH_DESCRIPTION: &str = "l2lsdk test dispatch (already closed)";
pub const PITCH_DETAILS_PATH: &str = "pitchdetails/record_details/";

/// Steps 1–5 only read; everything after writes.
pub const RESOLVE_STEP_COUNT: usize = 5;

// ---------------------------------------------------------------------------
// WorkflowOptions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowOptions {
    /// Username clocked in and out on the resolved line.
    pub user: String,
    pub product_code: String,
    /// Absolute value written by `set_cycle_count`.
    pub cycle_count: u32,
    /// Relative value applied by `increment_cycle_count`.
    pub cycle_increment: u32,
}

impl WorkflowOptions {
    pub fn new(user: impl Into<String>) -> Self {
        WorkflowOptions {
            user: user.into(),
            product_code: crate::config::DEFAULT_PRODUCT_CODE.to_string(),
            cycle_count: crate::config::DEFAULT_CYCLE_COUNT,
            cycle_increment: crate::config::DEFAULT_CYCLE_INCREMENT,
        }
    }
}

// ---------------------------------------------------------------------------
// PitchSample
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PitchSample {
    pub actual: u32,
    pub scrap: u32,
    pub operator_count: u32,
}

impl PitchSample {
    /// actual 10–99, scrap 5–19, operators 0–9.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        PitchSample {
            actual: rng.gen_range(10..=99),
            scrap: rng.gen_range(5..=19),
            operator_count: rng.gen_range(0..=9),
        }
    }
}

// ---------------------------------------------------------------------------
// RunReport
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub step: &'static str,
    pub detail: String,
}

/// Everything a run has resolved or created so far. Fields are only ever
/// filled in, never changed, as the run moves forward.
#[derive(Debug, Default, Serialize)]
pub struct RunReport {
    pub site: Option<ResourceRecord>,
    pub area: Option<ResourceRecord>,
    pub line: Option<ResourceRecord>,
    pub machine: Option<ResourceRecord>,
    pub dispatch_type: Option<ResourceRecord>,
    pub labor_window: Option<TimeWindow>,
    pub closed_dispatch_id: Option<i64>,
    pub historical_dispatch: Option<TimeWindow>,
    pub pitch: Option<PitchSample>,
    pub daily_summary: Option<serde_json::Value>,
    pub steps: Vec<StepReport>,
}

fn require<'r, T>(field: &'r Option<T>, what: &'static str) -> Result<&'r T> {
    field.as_ref().ok_or(DispatchError::MissingContext(what))
}

// ---------------------------------------------------------------------------
// Step
// ---------------------------------------------------------------------------

type StepFn = fn(&mut Workflow<'_>, RunReport) -> Result<(RunReport, String)>;

pub struct Step {
    pub name: &'static str,
    run: StepFn,
}

pub static STEPS: [Step; 12] = [
    Step { name: "resolve_site", run: resolve_site },
    Step { name: "resolve_area", run: resolve_area },
    Step { name: "resolve_line", run: resolve_line },
    Step { name: "resolve_machine", run: resolve_machine },
    Step { name: "resolve_dispatch_type", run: resolve_dispatch_type },
    Step { name: "clock_in_out", run: clock_in_out },
    Step { name: "backdated_clock_in", run: backdated_clock_in },
    Step { name: "cycle_counts", run: cycle_counts },
    Step { name: "open_close_dispatch", run: open_close_dispatch },
    Step { name: "add_historical_dispatch", run: add_historical_dispatch },
    Step { name: "record_pitch_details", run: record_pitch_details },
    Step { name: "daily_summary", run: daily_summary },
];

// ---------------------------------------------------------------------------
// Workflow
// ---------------------------------------------------------------------------

pub struct Workflow<'a> {
    client: &'a ApiClient,
    options: WorkflowOptions,
    clock: &'a dyn Clock,
    rng: &'a mut dyn RngCore,
}

impl<'a> Workflow<'a> {
    pub fn new(
        client: &'a ApiClient,
        options: WorkflowOptions,
        clock: &'a dyn Clock,
        rng: &'a mut dyn RngCore,
    ) -> Self {
        Workflow {
            client,
            options,
            clock,
            rng,
        }
    }

    /// All twelve steps.
    pub fn run(&mut self) -> Result<RunReport> {
        self.run_steps(&STEPS)
    }

    /// Discovery only: site, area, line, machine and dispatch type.
    pub fn resolve(&mut self) -> Result<RunReport> {
        self.run_steps(&STEPS[..RESOLVE_STEP_COUNT])
    }

    /// Fold `steps` over an empty report. The first failing step ends the
    /// run and is named in the returned `DispatchError::Step`.
    pub fn run_steps(&mut self, steps: &[Step]) -> Result<RunReport> {
        steps.iter().try_fold(RunReport::default(), |report, step| {
            let (mut report, detail) =
                (step.run)(&mut *self, report).map_err(|e| DispatchError::Step {
                    step: step.name,
                    source: Box::new(e),
                })?;
            info!(step = step.name, "{detail}");
            report.steps.push(StepReport {
                step: step.name,
                detail,
            });
            Ok(report)
        })
    }

    fn resolver(&self) -> Resolver<'a> {
        Resolver::new(self.client)
    }

    fn close_dispatch(&self, handle: DispatchHandle) -> Result<i64> {
        self.client.post_any(handle.close_endpoint(), &[])?;
        Ok(handle.id)
    }
}

// ---------------------------------------------------------------------------
// Steps
// ---------------------------------------------------------------------------

fn resolve_site(wf: &mut Workflow<'_>, mut r: RunReport) -> Result<(RunReport, String)> {
    let site = wf.resolver().site()?;
    let detail = format!("Using site: {}", site.description);
    r.site = Some(site);
    Ok((r, detail))
}

fn resolve_area(wf: &mut Workflow<'_>, mut r: RunReport) -> Result<(RunReport, String)> {
    let area = wf.resolver().area()?;
    let detail = format!("Using area: {}", area.code);
    r.area = Some(area);
    Ok((r, detail))
}

fn resolve_line(wf: &mut Workflow<'_>, mut r: RunReport) -> Result<(RunReport, String)> {
    let line = wf.resolver().line(require(&r.area, "area")?)?;
    let detail = format!("Using line: {}", line.code);
    r.line = Some(line);
    Ok((r, detail))
}

fn resolve_machine(wf: &mut Workflow<'_>, mut r: RunReport) -> Result<(RunReport, String)> {
    let machine = wf.resolver().machine(require(&r.line, "line")?)?;
    let detail = format!("Using machine: {}", machine.code);
    r.machine = Some(machine);
    Ok((r, detail))
}

fn resolve_dispatch_type(wf: &mut Workflow<'_>, mut r: RunReport) -> Result<(RunReport, String)> {
    let dispatch_type = wf.resolver().dispatch_type()?;
    let detail = format!("Using dispatch type: {}", dispatch_type.code);
    r.dispatch_type = Some(dispatch_type);
    Ok((r, detail))
}

fn clock_in_out(wf: &mut Workflow<'_>, r: RunReport) -> Result<(RunReport, String)> {
    let line = require(&r.line, "line")?;
    let user = &wf.options.user;
    let pairs = [("linecode", line.code.as_str())];

    wf.client
        .post_any(Endpoint::with_segment("users/clock_in/", user), &pairs)?;
    wf.client
        .post_any(Endpoint::with_segment("users/clock_out/", user), &pairs)?;

    let detail = format!("User {user} clocked in and out on line {}", line.code);
    Ok((r, detail))
}

fn backdated_clock_in(wf: &mut Workflow<'_>, mut r: RunReport) -> Result<(RunReport, String)> {
    let window = TimeWindow::backdated_shift(wf.clock.now());
    let (start, end) = window.format(Precision::Minute);
    let line = require(&r.line, "line")?;
    let user = &wf.options.user;

    wf.client.post_any(
        Endpoint::with_segment("users/clock_in/", user),
        &[
            ("start", start.as_str()),
            ("end", end.as_str()),
            ("linecode", line.code.as_str()),
        ],
    )?;

    r.labor_window = Some(window);
    Ok((r, format!("Created backdated clock in {start} to {end}")))
}

fn cycle_counts(wf: &mut Workflow<'_>, r: RunReport) -> Result<(RunReport, String)> {
    let (start, end) = require(&r.labor_window, "labor window")?.format(Precision::Minute);
    let machine = require(&r.machine, "machine")?;
    let count = wf.options.cycle_count.to_string();
    let increment = wf.options.cycle_increment.to_string();

    wf.client.post_any(
        "machines/set_cycle_count/",
        &[
            ("start", start.as_str()),
            ("end", end.as_str()),
            ("code", machine.code.as_str()),
            ("cyclecount", count.as_str()),
        ],
    )?;

    // High-frequency feed: skip_lastupdated leaves the machine's
    // last-updated bookkeeping untouched.
    wf.client.post_any(
        "machines/increment_cycle_count/",
        &[
            ("start", start.as_str()),
            ("end", end.as_str()),
            ("code", machine.code.as_str()),
            ("skip_lastupdated", "1"),
            ("cyclecount", increment.as_str()),
        ],
    )?;

    let detail = format!(
        "Set machine {} cycle count to {count}, then incremented by {increment}",
        machine.code
    );
    Ok((r, detail))
}

fn open_close_dispatch(wf: &mut Workflow<'_>, mut r: RunReport) -> Result<(RunReport, String)> {
    let (start, end) = require(&r.labor_window, "labor window")?.format(Precision::Minute);
    let dispatch_type = require(&r.dispatch_type, "dispatch type")?.id.to_string();
    let machine = require(&r.machine, "machine")?.id.to_string();

    let handle: DispatchHandle = wf.client.post_object(
        "dispatches/open/",
        &[
            ("start", start.as_str()),
            ("end", end.as_str()),
            ("dispatchtype", dispatch_type.as_str()),
            ("description", DISPATCH_DESCRIPTION),
            ("machine", machine.as_str()),
        ],
    )?;
    info!(dispatch = handle.id, "opened dispatch");

    let id = wf.close_dispatch(handle)?;
    r.closed_dispatch_id = Some(id);
    Ok((r, format!("Opened and closed dispatch {id}")))
}

fn add_historical_dispatch(wf: &mut Workflow<'_>, mut r: RunReport) -> Result<(RunReport, String)> {
    let window = TimeWindow::historical_dispatch(wf.clock.now());
    let (reported, completed) = window.format(Precision::Minute);
    let dispatch_type = require(&r.dispatch_type, "dispatch type")?;
    let machine = require(&r.machine, "machine")?;

    wf.client.post_any(
        "dispatches/add/",
        &[
            ("dispatchtypecode", dispatch_type.code.as_str()),
            ("description", HISTORICAL_DISPATCH_DESCRIPTION),
            ("machinecode", machine.code.as_str()),
            ("reported", reported.as_str()),
            ("completed", completed.as_str()),
        ],
    )?;

    r.historical_dispatch = Some(window);
    Ok((r, format!("Created backdated dispatch {reported} to {completed}")))
}

fn record_pitch_details(wf: &mut Workflow<'_>, mut r: RunReport) -> Result<(RunReport, String)> {
    let sample = PitchSample::random(&mut *wf.rng);
    let line = require(&r.line, "line")?;
    let actual = sample.actual.to_string();
    let scrap = sample.scrap.to_string();
    let operators = sample.operator_count.to_string();

    // start = end = "now": a point sample, not a ranged pitch.
    wf.client.post_any(
        PITCH_DETAILS_PATH,
        &[
            ("linecode", line.code.as_str()),
            ("productcode", wf.options.product_code.as_str()),
            ("actual", actual.as_str()),
            ("scrap", scrap.as_str()),
            ("operator_count", operators.as_str()),
            ("start", "now"),
            ("end", "now"),
        ],
    )?;

    r.pitch = Some(sample);
    let detail = format!("Recorded pitch details: actual {actual}, scrap {scrap}, operators {operators}");
    Ok((r, detail))
}

fn daily_summary(wf: &mut Workflow<'_>, mut r: RunReport) -> Result<(RunReport, String)> {
    let (start, end) = TimeWindow::daily_summary(wf.clock.now()).format(Precision::Second);
    let line = require(&r.line, "line")?;

    let summary = wf.client.get_any(
        PITCH_DETAILS_PATH,
        &[
            ("start", start.as_str()),
            ("end", end.as_str()),
            ("linecode", line.code.as_str()),
            ("productcode", wf.options.product_code.as_str()),
            ("show_products", "true"),
        ],
    )?;

    let detail = format!("Retrieved daily summary for line {}", line.code);
    r.daily_summary = Some(summary);
    Ok((r, detail))
}
