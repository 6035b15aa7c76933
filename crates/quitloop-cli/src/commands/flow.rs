use std::time::Duration;

use clap::Subcommand;
use quitloop_core::flow::{presets, step_table};
use quitloop_core::{Config, Event, EventLog, FlowController, Step};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::MissedTickBehavior;

use super::open_log;

#[derive(Subcommand)]
pub enum FlowAction {
    /// Walk through the urge flow
    Run {
        /// Milliseconds per countdown second (defaults to flow.tick_ms)
        #[arg(long)]
        tick_ms: Option<u64>,
        /// Intensity to record during the label step
        #[arg(long, allow_hyphen_values = true)]
        intensity: Option<i32>,
        /// Run unattended with this action
        #[arg(long)]
        action: Option<String>,
        /// Print events as JSON lines
        #[arg(long)]
        json: bool,
    },
    /// Print the step table as JSON
    Steps,
}

pub fn run(action: FlowAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        FlowAction::Steps => {
            println!("{}", serde_json::to_string_pretty(&step_table())?);
        }
        FlowAction::Run {
            tick_ms,
            intensity,
            action,
            json,
        } => {
            let config = Config::load_or_default();
            let flow = FlowController::new(open_log(&config)?);
            let period = Duration::from_millis(tick_ms.unwrap_or(config.flow.tick_ms).max(1));
            let autopilot = action.map(|action| Autopilot { intensity, action });

            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            runtime.block_on(drive(flow, period, autopilot, Output { json }))?;
        }
    }
    Ok(())
}

/// Scripted answers for an unattended run.
struct Autopilot {
    intensity: Option<i32>,
    action: String,
}

impl Autopilot {
    fn act<L: EventLog>(&self, flow: &mut FlowController<L>) -> Vec<Event> {
        let events = match flow.step() {
            Step::Idle => vec![flow.start()],
            Step::Label => vec![self.intensity.and_then(|i| flow.set_intensity(i))],
            Step::Choose => vec![flow.set_action(self.action.clone()), flow.advance()],
            Step::Intention => vec![flow.confirm_intention()],
            Step::Followup => vec![flow.finish()],
            _ => Vec::new(),
        };
        events.into_iter().flatten().collect()
    }
}

async fn drive<L: EventLog>(
    mut flow: FlowController<L>,
    period: Duration,
    autopilot: Option<Autopilot>,
    out: Output,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = autopilot.is_none();

    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut generation = flow.countdown_generation();
    let mut shown: Option<Step> = None;
    tracing::debug!(?period, unattended = autopilot.is_some(), "flow driver started");

    loop {
        // Render each newly entered step; the autopilot may move on at once.
        while shown != Some(flow.step()) {
            shown = Some(flow.step());
            out.enter(&flow);
            if let Some(pilot) = &autopilot {
                for event in pilot.act(&mut flow) {
                    out.event(&event);
                }
            }
        }

        if flow.step().is_terminal() || flow.is_detached() {
            break;
        }
        if flow.countdown_generation() != generation {
            generation = flow.countdown_generation();
            ticker.reset();
        }
        if !flow.countdown_active() && !stdin_open {
            out.notice("No more input; leaving the flow.");
            break;
        }

        tokio::select! {
            _ = ticker.tick(), if flow.countdown_active() => {
                match flow.tick() {
                    Some(event) => out.event(&event),
                    None => out.remaining(flow.remaining_secs()),
                }
            }
            line = lines.next_line(), if stdin_open => {
                match line? {
                    Some(line) => handle_input(&mut flow, line.trim(), &out),
                    None => stdin_open = false,
                }
            }
            _ = tokio::signal::ctrl_c() => {
                out.notice("Interrupted.");
                break;
            }
        }
    }

    if !flow.step().is_terminal() {
        if let Some(event) = flow.teardown() {
            out.event(&event);
        }
    }
    Ok(())
}

fn handle_input<L: EventLog>(flow: &mut FlowController<L>, input: &str, out: &Output) {
    if matches!(input, "q" | "quit") {
        if let Some(event) = flow.teardown() {
            out.event(&event);
        }
        return;
    }

    let skip = matches!(input, "s" | "skip");
    let event = match flow.step() {
        Step::Idle if input.is_empty() || input == "start" => flow.start(),
        Step::Notice | Step::Breathe | Step::Timer if skip => flow.advance(),
        Step::Label if skip || input.is_empty() => flow.advance(),
        Step::Label => match input.parse::<i32>() {
            Ok(n) => flow.set_intensity(n),
            Err(_) => None,
        },
        Step::Choose if input.is_empty() => flow.advance(),
        Step::Choose => match input.parse::<usize>() {
            Ok(n) => presets::action_by_number(n).and_then(|a| flow.set_action(a)),
            Err(_) => flow.set_action(input),
        },
        Step::Intention if matches!(input, "" | "y" | "yes") => flow.confirm_intention(),
        Step::Intention => flow.set_action(input),
        Step::Followup => flow.finish(),
        _ => None,
    };

    match event {
        Some(event) => out.event(&event),
        None => out.hint(flow.step()),
    }
}

struct Output {
    json: bool,
}

impl Output {
    fn event(&self, event: &Event) {
        if self.json {
            if let Ok(line) = serde_json::to_string(event) {
                println!("{line}");
            }
            return;
        }
        match event {
            Event::IntensitySet { intensity, .. } => println!("  intensity: {intensity}"),
            Event::ActionChosen { action, .. } => {
                println!("  {}", presets::intention_statement(action))
            }
            Event::SessionFinished { saved: true, .. } => {
                println!("Session saved locally. Nothing is uploaded.")
            }
            Event::SessionFinished { error, .. } => println!(
                "Couldn't save this session ({}). The flow is complete anyway.",
                error.as_deref().unwrap_or("unknown error")
            ),
            Event::FlowTornDown { step, .. } => println!("Left the flow at {step}."),
            _ => {}
        }
    }

    fn enter<L: EventLog>(&self, flow: &FlowController<L>) {
        if self.json {
            self.event(&flow.snapshot());
            return;
        }
        let step = flow.step();
        match step.duration_secs() {
            Some(secs) => println!("\n[{step} · {secs}s] {}", step.prompt()),
            None => println!("\n[{step}] {}", step.prompt()),
        }
        match step {
            Step::Idle => println!("  Press enter to start, q to quit."),
            Step::Notice => println!("  {}", presets::SENSATIONS.join(" · ")),
            Step::Label => println!(
                "  Type {}-{} (s to skip).",
                presets::INTENSITY_SCALE.start(),
                presets::INTENSITY_SCALE.end()
            ),
            Step::Choose => {
                for (i, action) in presets::ACTIONS.iter().enumerate() {
                    println!("  {}. {action}", i + 1);
                }
                println!("  Or type your own, then press enter.");
            }
            Step::Intention => {
                println!("  {}", presets::intention_statement(flow.chosen_action()));
                println!("  Press enter to start the 2-minute timer.");
            }
            Step::Followup => println!("  Press enter to finish."),
            _ => {}
        }
    }

    fn remaining(&self, secs: Option<u32>) {
        if self.json {
            return;
        }
        if let Some(secs) = secs {
            if secs % 5 == 0 || secs <= 3 {
                println!("  {secs}s");
            }
        }
    }

    fn hint(&self, step: Step) {
        let hint = match step {
            Step::Choose => "Pick an action first (1-5 or your own).",
            Step::Label => "Type a number, or s to skip.",
            Step::Notice | Step::Breathe | Step::Timer => "s skips, q quits.",
            _ => "q quits.",
        };
        self.notice(hint);
    }

    fn notice(&self, text: &str) {
        if self.json {
            return;
        }
        eprintln!("  {text}");
    }
}
