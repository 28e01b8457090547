//! Interactive chat loop on stdin.
//!
//! Plain line-oriented REPL: every line is a submission, `/retry`,
//! `/reset`, and `/quit` are local commands. Ctrl-C during a stream
//! cancels that stream without leaving the loop.

use std::io::Write;

use anyhow::{Context, Result};
use chatkit_core::config::WidgetConfig;
use chatkit_core::session::SessionState;
use chatkit_core::widget::ChatWidget;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::surface::TerminalSurface;

pub async fn run(config: WidgetConfig) -> Result<()> {
    let mut widget = ChatWidget::initialize(config, TerminalSurface::new()).await;
    if widget.state() == SessionState::InputLocked {
        anyhow::bail!("the chat service rejected the configured credentials");
    }

    println!("chatkit interactive chat. /retry resends, /reset starts over, /quit exits.");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("> ");
        std::io::stdout().flush().context("flush prompt")?;

        let Some(line) = lines.next_line().await.context("read stdin")? else {
            break; // EOF
        };
        let line = line.trim();

        match line {
            "" => {}
            "/quit" | "/exit" => break,
            "/retry" => {
                run_interruptible(&mut widget, Turn::Retry).await;
            }
            "/reset" => {
                widget.reset().await;
                println!("(conversation cleared)");
            }
            message => {
                if widget.state() == SessionState::InputLocked {
                    eprintln!("input is locked; refresh credentials and restart");
                    break;
                }
                let message = message.to_string();
                run_interruptible(&mut widget, Turn::Submit(message)).await;
            }
        }
    }

    widget.dispose();
    Ok(())
}

enum Turn {
    Submit(String),
    Retry,
}

/// Runs one turn, letting Ctrl-C cancel the stream instead of the process.
async fn run_interruptible(
    widget: &mut ChatWidget<chatkit_core::backend::HttpBackend, TerminalSurface>,
    turn: Turn,
) {
    run_with_interrupt(widget, turn, tokio::signal::ctrl_c()).await;
}

async fn run_with_interrupt<B, F>(widget: &mut ChatWidget<B, TerminalSurface>, turn: Turn, interrupt: F)
where
    B: chatkit_core::backend::Backend + 'static,
    F: std::future::Future,
{
    let cancel = widget.cancel_handle();
    let mut work = std::pin::pin!(async {
        match turn {
            Turn::Submit(message) => widget.submit(&message).await,
            Turn::Retry => widget.retry().await,
        }
    });
    tokio::select! {
        () = &mut work => {}
        _ = interrupt => {
            cancel.cancel();
            eprintln!("\n(cancelled)");
            // The turn must wind down so the controller closes it and
            // unlocks input; dropping it here would leave the state machine
            // streaming forever.
            work.await;
        }
    }
}
