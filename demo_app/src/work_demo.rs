//! Delayed messages delivered through work routines

use std::time::Duration;

use rand::Rng;
use uniprep::work::{routine, Step, WaitCondition, Work, WorkError, WorkRunner};

/// Longest random delay before the message arrives
const MAX_DELAY_SECS: f32 = 10.0;

/// Start a routine that waits a random time and then reports a message
pub fn start_delayed_message(runner: &mut WorkRunner) -> Result<Work<String>, WorkError> {
    let delay = Duration::from_secs_f32(rand::thread_rng().gen::<f32>() * MAX_DELAY_SECS);
    let work = runner.create(routine::from_steps([
        Step::Wait(WaitCondition::Duration(delay)),
        Step::Complete(String::from("That's awesome")),
    ]));

    runner.begin(&work, |result| {
        if let Some(message) = result {
            log::info!("{}", message);
        }
    })?;

    log::info!("{} will report in {:.2}s", work.id(), delay.as_secs_f32());
    Ok(work)
}
