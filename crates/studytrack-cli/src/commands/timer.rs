use std::io::{IsTerminal, Write};
use std::time::Duration;

use clap::{Subcommand, ValueEnum};
use studytrack_core::format::format_clock;
use studytrack_core::{Config, Event, TimerEngine, TimerMode};
use tokio::time::MissedTickBehavior;
use tracing::info;

use super::{open_store, print_json, CliResult, Store};

#[derive(Clone, Copy, ValueEnum)]
pub enum ModeArg {
    Focus,
    ShortBreak,
    LongBreak,
}

impl From<ModeArg> for TimerMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Focus => TimerMode::Focus,
            ModeArg::ShortBreak => TimerMode::ShortBreak,
            ModeArg::LongBreak => TimerMode::LongBreak,
        }
    }
}

#[derive(Subcommand)]
pub enum TimerAction {
    /// Run the timer in the foreground. Ctrl-C stops it and saves focus time.
    Run {
        /// Mode of the first period
        #[arg(long, value_enum, default_value = "focus")]
        mode: ModeArg,
        /// Length of the first period (defaults to the configured length)
        #[arg(long)]
        minutes: Option<u32>,
        /// Subject to credit focus time to
        #[arg(long)]
        subject: Option<String>,
        /// Stop after this many completed focus periods
        #[arg(long, default_value = "1")]
        cycles: u32,
    },
}

pub fn run(action: TimerAction) -> CliResult {
    match action {
        TimerAction::Run {
            mode,
            minutes,
            subject,
            cycles,
        } => {
            let settings = Config::load_or_default().timer_settings();
            let mode = TimerMode::from(mode);
            let minutes = minutes.unwrap_or_else(|| settings.minutes_for(mode));

            let mut engine = TimerEngine::new(open_store()?, settings);
            engine.on_session_committed(|session| {
                info!(id = %session.id, minutes = session.duration_minutes, "session saved");
            });
            if let Some(event) = engine.start(mode, minutes, subject)? {
                print_json(&event)?;
            }

            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            runtime.block_on(drive(&mut engine, cycles))?;

            if let Some(session) = engine.teardown()? {
                print_json(&session)?;
            }
        }
    }
    Ok(())
}

/// Tick once a second until enough focus periods completed or Ctrl-C.
async fn drive(engine: &mut TimerEngine<Store>, cycles: u32) -> CliResult {
    let mut interval = tokio::time::interval(Duration::from_secs(1));
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let show_clock = std::io::stderr().is_terminal();

    loop {
        let Some(token) = engine.arm_tick() else {
            break;
        };
        tokio::select! {
            _ = interval.tick() => {
                let Some(event) = engine.on_tick(token)? else {
                    if show_clock {
                        eprint!("\r{:?} {}  ", engine.mode(), format_clock(engine.remaining_secs()));
                        std::io::stderr().flush()?;
                    }
                    continue;
                };
                if show_clock {
                    eprintln!();
                }
                print_json(&event)?;
                if !should_continue(engine, &event, cycles) {
                    break;
                }
                if let Some(started) = engine.start_next()? {
                    print_json(&started)?;
                }
            }
            signal = &mut ctrl_c => {
                signal?;
                if show_clock {
                    eprintln!();
                }
                info!("interrupted");
                break;
            }
        }
    }
    print_json(&engine.snapshot())
}

fn should_continue(engine: &TimerEngine<Store>, event: &Event, cycles: u32) -> bool {
    let Event::TimerExpired {
        next_mode,
        completed_focus,
        ..
    } = event
    else {
        return false;
    };
    if *completed_focus >= cycles {
        return false;
    }
    // A break started without a subject cannot roll into focus.
    next_mode.is_break() || engine.subject_id().is_some()
}
