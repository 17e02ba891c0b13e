use crate::handlers;
use crate::{SessionCommand, SessionUpdate};
use score_layout::SessionState;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;
use tokio::task::JoinHandle;

/// Channels and task of a running worker
pub struct WorkerHandle {
    pub commands: mpsc::UnboundedSender<SessionCommand>,
    pub updates: mpsc::UnboundedReceiver<SessionUpdate>,
    pub task: JoinHandle<()>,
}

/// Spawn a worker owning a fresh session on the current runtime
pub fn spawn_worker() -> WorkerHandle {
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (update_tx, update_rx) = mpsc::unbounded_channel();
    let task = tokio::spawn(worker_task(command_rx, update_tx));

    WorkerHandle {
        commands: command_tx,
        updates: update_rx,
        task,
    }
}

/// Async worker task that owns the session and applies one command at a time
pub async fn worker_task(
    mut command_rx: mpsc::UnboundedReceiver<SessionCommand>,
    update_tx: mpsc::UnboundedSender<SessionUpdate>,
) {
    let mut session = SessionState::new();

    while let Some(cmd) = command_rx.recv().await {
        process_command(cmd, &mut session, &mut command_rx, &update_tx).await;
    }
    log::debug!("Command channel closed, worker exiting");
}

async fn process_command(
    cmd: SessionCommand,
    session: &mut SessionState,
    command_rx: &mut mpsc::UnboundedReceiver<SessionCommand>,
    update_tx: &mpsc::UnboundedSender<SessionUpdate>,
) {
    match cmd {
        SessionCommand::LoadImages { paths } => {
            handlers::handle_load_images(paths, session, update_tx).await;
        }
        SessionCommand::RemoveImage { index } => {
            handlers::handle_sequence_edit(session, update_tx, |s| {
                s.delete_image_keep_one(index).map(|_| ())
            });
        }
        SessionCommand::MoveImage { from, before } => {
            handlers::handle_sequence_edit(session, update_tx, |s| s.move_image(from, before));
        }
        SessionCommand::SwapUp { index } => {
            handlers::handle_sequence_edit(session, update_tx, |s| s.swap_up(index));
        }
        SessionCommand::SwapDown { index } => {
            handlers::handle_sequence_edit(session, update_tx, |s| s.swap_down(index));
        }
        SessionCommand::DuplicateImage { index } => {
            handlers::handle_sequence_edit(session, update_tx, |s| s.duplicate_image(index));
        }
        SessionCommand::ApplyReferenceCrop {
            selection,
            horizontal_trim,
        } => {
            handlers::handle_reference_crop(selection, horizontal_trim, session, update_tx);
        }
        SessionCommand::SetAdjustment { index, adjustment } => {
            handlers::handle_adjustment(index, session, update_tx, |s| {
                s.set_adjustment(index, adjustment)
            });
        }
        SessionCommand::RotateClockwise { index } => {
            handlers::handle_adjustment(index, session, update_tx, |s| s.rotate_clockwise(index));
        }
        SessionCommand::RotateCounterClockwise { index } => {
            handlers::handle_adjustment(index, session, update_tx, |s| {
                s.rotate_counter_clockwise(index)
            });
        }
        SessionCommand::AddPreset { name, y_offset } => {
            session.add_preset(&name, y_offset);
            handlers::send_presets(session, update_tx);
        }
        SessionCommand::RemovePreset { id } => {
            session.remove_preset(id);
            handlers::send_presets(session, update_tx);
        }
        SessionCommand::ApplyPreset { id, index } => {
            handlers::handle_apply_preset(id, index, session, update_tx);
        }
        SessionCommand::SetLayout { config } => {
            handlers::handle_set_layout(config, session, update_tx);
        }
        SessionCommand::SetRenderOptions { options } => {
            session.render = options;
            let _ = update_tx.send(SessionUpdate::RenderOptionsChanged { options });
        }
        SessionCommand::LoadConfig { path } => {
            handlers::handle_load_config(path, session, update_tx).await;
        }
        SessionCommand::SaveConfig { path } => {
            handlers::handle_save_config(path, session, update_tx).await;
        }
        SessionCommand::NextStep => {
            let step = session.next_step();
            let _ = update_tx.send(SessionUpdate::StepChanged { step });
        }
        SessionCommand::PrevStep => {
            let step = session.prev_step();
            let _ = update_tx.send(SessionUpdate::StepChanged { step });
        }
        SessionCommand::CalculateStats => {
            handlers::handle_calculate_stats(session, update_tx).await;
        }
        SessionCommand::GeneratePreview { dpi } => {
            generate_latest_preview(dpi, session, command_rx, update_tx).await;
        }
        SessionCommand::Export { output_path } => {
            handlers::handle_export(output_path, session, update_tx).await;
        }
    }
}

/// Render only the newest queued preview.
///
/// Other commands found in the queue are applied first so the preview sees
/// them. A preview that is overtaken while rendering is dropped.
async fn generate_latest_preview(
    mut dpi: f32,
    session: &mut SessionState,
    command_rx: &mut mpsc::UnboundedReceiver<SessionCommand>,
    update_tx: &mpsc::UnboundedSender<SessionUpdate>,
) {
    loop {
        // Drain any queued preview commands, keeping only the most recent
        while let Ok(next_cmd) = command_rx.try_recv() {
            if let SessionCommand::GeneratePreview { dpi: newer } = next_cmd {
                log::debug!("Discarding queued preview, using newer request");
                dpi = newer;
            } else {
                Box::pin(process_command(next_cmd, session, command_rx, update_tx)).await;
            }
        }

        let result = handlers::render_preview(session, dpi).await;

        let pending = match command_rx.try_recv() {
            Ok(SessionCommand::GeneratePreview { dpi: newer }) => {
                log::debug!("Preview superseded while rendering, discarding result");
                dpi = newer;
                continue;
            }
            Ok(other) => Some(other),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        };

        match result {
            Ok(update) => {
                let _ = update_tx.send(update);
            }
            Err(e) => {
                let _ = update_tx.send(SessionUpdate::Error {
                    message: format!("Failed to generate preview: {}", e),
                });
            }
        }

        if let Some(cmd) = pending {
            Box::pin(process_command(cmd, session, command_rx, update_tx)).await;
        }
        return;
    }
}
