//! Ask command handler: one question, streamed answer, exit.

use anyhow::Result;
use chatkit_core::config::WidgetConfig;
use chatkit_core::session::SessionState;
use chatkit_core::widget::ChatWidget;

use crate::surface::TerminalSurface;

pub async fn run(config: WidgetConfig, question: &str) -> Result<()> {
    let mut widget = ChatWidget::initialize(config, TerminalSurface::new()).await;
    if widget.state() == SessionState::InputLocked {
        anyhow::bail!("the chat service rejected the configured credentials");
    }
    if widget.state() != SessionState::Ready {
        anyhow::bail!("could not open a chat session");
    }

    let cancel = widget.cancel_handle();
    let mut completed = true;
    {
        let mut work = std::pin::pin!(widget.submit(question));
        tokio::select! {
            () = &mut work => {}
            _ = tokio::signal::ctrl_c() => {
                cancel.cancel();
                completed = false;
                eprintln!("\ninterrupted");
                // Let the cancelled turn wind down before tearing the widget
                // down.
                work.await;
            }
        }
    }

    if completed {
        if widget.state() == SessionState::InputLocked {
            widget.dispose();
            anyhow::bail!("the chat service rejected the credentials mid-stream");
        }
        if widget.conversation().pending_retry.is_some() {
            widget.dispose();
            anyhow::bail!("the answer could not be retrieved; try again");
        }
    }
    widget.dispose();
    Ok(())
}
