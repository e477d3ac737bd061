//! Interactive prompt loop
//!
//! Each input line fires the trigger. The loop is the interactive context:
//! it owns the controller, reads stdin and applies worker events as they
//! arrive, so the prompt never blocks on a running computation.

use crate::display::TerminalDisplay;
use crate::input::parse_input;
use longcalc_foundation::strings::MSG_ALREADY_RUNNING;
use longcalc_foundation::{CalcConfig, DisplaySurface, Error};
use longcalc_task::TaskController;
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};

type Controller<W> = TaskController<TerminalDisplay<W>>;

enum LineAction {
    Continue,
    Quit,
}

/// Run the prompt loop until `q` or end of input
pub async fn run(config: &CalcConfig) -> anyhow::Result<()> {
    let mut controller = TaskController::new(TerminalDisplay::stdout(), config);
    session(&mut controller, BufReader::new(tokio::io::stdin())).await?;
    info!("Interactive session ended");
    Ok(())
}

async fn session<R, W>(controller: &mut Controller<W>, input: R) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write + Send,
{
    let mut lines = input.lines();

    controller.display_mut().show_prompt();

    loop {
        let running = controller.active_task().is_some();

        tokio::select! {
            line = lines.next_line() => {
                match line? {
                    Some(line) => {
                        if let LineAction::Quit = handle_line(controller, &line) {
                            break;
                        }
                    }
                    None => {
                        debug!("Input closed");
                        // Piped input: let a started computation finish
                        controller.run_to_completion().await;
                        break;
                    }
                }
            }
            event = controller.next_event(), if running => {
                if event.map(|e| e.is_terminal()).unwrap_or(true) {
                    controller.display_mut().show_prompt();
                }
            }
            _ = tokio::signal::ctrl_c() => {
                if !controller.cancel() {
                    break;
                }
                controller.display_mut().show_prompt();
            }
        }
    }

    Ok(())
}

fn handle_line<W: Write + Send>(controller: &mut Controller<W>, line: &str) -> LineAction {
    let trimmed = line.trim();
    if matches!(trimmed, "q" | "quit" | "exit") {
        return LineAction::Quit;
    }

    let n = match parse_input(trimmed) {
        Ok(n) => n,
        Err(e) => {
            controller.display_mut().on_error(&e.to_string());
            controller.display_mut().show_prompt();
            return LineAction::Continue;
        }
    };

    let trigger = controller.trigger();
    match controller.start(&trigger, n) {
        Ok(task_id) => debug!("Started task {} from prompt", task_id),
        Err(Error::TaskAlreadyRunning(_)) => {
            controller.display_mut().on_error(MSG_ALREADY_RUNNING);
        }
        Err(e) => {
            warn!("Could not start computation: {}", e);
            // Internal failures are reported by the controller itself
            if !e.is_internal() {
                controller.display_mut().on_error(&e.to_string());
            }
            controller.display_mut().show_prompt();
        }
    }
    LineAction::Continue
}

#[cfg(test)]
mod tests {
    use super::*;
    use longcalc_foundation::strings::MSG_NO_INPUT;
    use longcalc_task::TaskLifecycleState;

    fn controller() -> Controller<Vec<u8>> {
        TaskController::new(TerminalDisplay::new(Vec::new()), &CalcConfig::default())
    }

    fn output(controller: &Controller<Vec<u8>>) -> String {
        String::from_utf8(controller.display().get_ref().clone()).unwrap()
    }

    #[tokio::test]
    async fn test_quit_words() {
        let mut controller = controller();
        for word in ["q", "quit", " exit "] {
            assert!(matches!(handle_line(&mut controller, word), LineAction::Quit));
        }
        assert!(controller.active_task().is_none());
    }

    #[tokio::test]
    async fn test_bad_input_is_shown_and_nothing_starts() {
        let mut controller = controller();
        handle_line(&mut controller, "");
        handle_line(&mut controller, "-5");

        let out = output(&controller);
        assert!(out.contains(MSG_NO_INPUT));
        assert!(out.contains("-5"));
        assert_eq!(controller.state(), TaskLifecycleState::Idle);
    }

    #[tokio::test]
    async fn test_second_line_while_running_is_rejected() {
        let mut controller = controller();
        handle_line(&mut controller, "2000");
        let first = controller.active_task();
        assert!(first.is_some());

        assert!(matches!(handle_line(&mut controller, "3"), LineAction::Continue));
        assert_eq!(controller.active_task(), first);
        assert!(output(&controller).contains(MSG_ALREADY_RUNNING));

        assert!(controller.cancel());
    }

    #[tokio::test]
    async fn test_end_of_input_lets_computation_finish() {
        let mut controller = controller();
        session(&mut controller, &b"4\n"[..]).await.unwrap();

        assert_eq!(controller.state(), TaskLifecycleState::Completed);
        assert!(output(&controller).contains("Ergebnis: 64\n"));
    }

    #[tokio::test]
    async fn test_quit_stops_reading() {
        let mut controller = controller();
        session(&mut controller, &b"q\n5\n"[..]).await.unwrap();

        assert_eq!(controller.state(), TaskLifecycleState::Idle);
        assert!(!output(&controller).contains("Ergebnis"));
    }
}
