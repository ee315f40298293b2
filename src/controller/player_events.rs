//! Player event bridge
//!
//! Drains the engine's event channel on one long-lived task. A track that
//! plays to its end advances the listing through the same `play_next` entry
//! point the keyboard uses.

use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::model::NowPlaying;
use crate::player::PlayerEvent;

use super::AppController;

impl AppController {
    /// Spawn the bridge. It exits when the channel closes or the controller's
    /// cancellation token fires.
    pub fn start_player_event_listener(
        &self,
        mut events: mpsc::UnboundedReceiver<PlayerEvent>,
    ) -> JoinHandle<()> {
        let controller = self.clone();
        tracing::info!("Starting player event listener");

        tokio::spawn(async move {
            loop {
                let event = tokio::select! {
                    _ = controller.cancel.cancelled() => {
                        tracing::debug!("Player event listener cancelled");
                        break;
                    }
                    event = events.recv() => event,
                };

                let Some(event) = event else {
                    tracing::info!("Player event channel closed");
                    break;
                };

                let handled = AssertUnwindSafe(controller.handle_player_event(event))
                    .catch_unwind()
                    .await;
                if handled.is_err() {
                    tracing::error!("Player event handler panicked");
                }
            }
        })
    }

    pub(crate) async fn handle_player_event(&self, event: PlayerEvent) {
        match event {
            PlayerEvent::EndOfTrack => {
                tracing::debug!("PlayerEvent::EndOfTrack");
                if self.play_next().await.is_none() {
                    tracing::debug!("End of track did not start another track");
                }
            }
            PlayerEvent::Failed(reason) => {
                tracing::warn!(reason = %reason, "PlayerEvent::Failed");
                let state = self.model.player_state();
                state.set_playing(false).await;
                let snapshot = state.get_state().await;
                self.model
                    .set_now_playing(NowPlaying::failed(
                        snapshot.track().cloned(),
                        snapshot.index(),
                        reason,
                    ))
                    .await;
            }
            PlayerEvent::Loading => tracing::debug!("PlayerEvent::Loading"),
            PlayerEvent::Playing => tracing::debug!("PlayerEvent::Playing"),
            PlayerEvent::Stopped => tracing::debug!("PlayerEvent::Stopped"),
            PlayerEvent::Other(name) => tracing::trace!(event = %name, "PlayerEvent: other event received"),
        }
    }
}
