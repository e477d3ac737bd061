//! Non-interactive CLI mode

use crate::display::TerminalDisplay;
use crate::input::parse_input;
use longcalc_foundation::{CalcConfig, DisplaySurface};
use longcalc_task::{ControllerEvent, TaskController};
use std::future::Future;

/// Run a single computation for `input` and print its progress and result
pub async fn run_once(config: &CalcConfig, input: &str) -> anyhow::Result<()> {
    let mut controller = TaskController::new(TerminalDisplay::stdout(), config);

    let n = match parse_input(input) {
        Ok(n) => n,
        Err(e) => {
            controller.display_mut().on_error(&e.to_string());
            anyhow::bail!("invalid input: {:?}", input);
        }
    };

    let trigger = controller.trigger();
    controller.start(&trigger, n)?;

    drive(&mut controller, tokio::signal::ctrl_c()).await
}

/// Apply events until the task ends. `interrupt` cancels the task; a
/// cancelled or failed run is an error.
async fn drive<D, F>(controller: &mut TaskController<D>, interrupt: F) -> anyhow::Result<()>
where
    D: DisplaySurface,
    F: Future,
{
    tokio::pin!(interrupt);

    loop {
        tokio::select! {
            event = controller.next_event() => match event {
                Some(ControllerEvent::Failed(message)) => {
                    anyhow::bail!("computation failed: {}", message);
                }
                Some(ControllerEvent::Cancelled) => anyhow::bail!("computation cancelled"),
                Some(ControllerEvent::Completed(_)) | None => return Ok(()),
                Some(ControllerEvent::Progress(_)) => {}
            },
            _ = &mut interrupt => {
                controller.cancel();
                anyhow::bail!("computation cancelled");
            }
        }
    }
}
