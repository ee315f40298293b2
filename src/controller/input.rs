//! Key event handling

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::model::{Focus, Overlay};

use super::{AppController, Command};

impl AppController {
    pub async fn handle_key_event(&self, key: KeyEvent) -> Result<()> {
        if key.kind != KeyEventKind::Press {
            return Ok(());
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.dispatch(Command::Quit).await;
            return Ok(());
        }

        // Handle error message first (blocks all other interactions)
        if self.model.has_error().await {
            if matches!(key.code, KeyCode::Esc | KeyCode::Enter) {
                self.model.clear_error().await;
            }
            return Ok(());
        }

        match self.model.get_overlay().await {
            Overlay::Help => {
                if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
                    self.model.hide_overlay().await;
                }
                return Ok(());
            }
            Overlay::Queue(_) => {
                match key.code {
                    KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => {
                        self.model.hide_overlay().await;
                    }
                    KeyCode::Char('c') => self.clear_queue().await,
                    _ => {}
                }
                return Ok(());
            }
            Overlay::None => {}
        }

        if self.model.get_focus().await == Focus::Search {
            match key.code {
                KeyCode::Enter => {
                    let query = self.model.get_search_query().await;
                    self.model.set_focus(Focus::Songs).await;
                    self.perform_search(&query).await;
                }
                KeyCode::Esc => self.model.set_focus(Focus::Songs).await,
                KeyCode::Backspace => self.model.backspace_search().await,
                KeyCode::Char(c) => self.model.append_to_search(c).await,
                _ => {}
            }
            return Ok(());
        }

        let command = self.keymap.lock().await.resolve(key);
        if let Some(command) = command {
            self.dispatch(command).await;
        }
        Ok(())
    }

    pub async fn dispatch(&self, command: Command) {
        tracing::trace!(?command, "Dispatching command");
        match command {
            Command::PlaySelected => self.play_selected().await,
            Command::TogglePause => self.toggle_pause().await,
            Command::Next => {
                self.play_next().await;
            }
            Command::Previous => {
                self.play_previous().await;
            }
            Command::VolumeUp => self.volume_up().await,
            Command::VolumeDown => self.volume_down().await,
            Command::RowDown => self.model.select_next_row().await,
            Command::RowUp => self.model.select_prev_row().await,
            Command::NextPage => {
                self.model.next_page().await;
            }
            Command::PrevPage => {
                self.model.prev_page().await;
            }
            Command::FirstPage => self.model.first_page().await,
            Command::LastPage => self.model.last_page().await,
            Command::InsertNext => self.insert_selected_next().await,
            Command::FocusSearch => {
                self.keymap.lock().await.reset_pending();
                self.model.set_focus(Focus::Search).await;
            }
            Command::ShowHelp => self.model.show_help_popup().await,
            Command::ShowQueue => self.show_queue().await,
            Command::Back => {
                if self.model.is_search_mode().await {
                    self.clear_search().await;
                } else {
                    self.dispatch_quit().await;
                }
            }
            Command::Quit => self.dispatch_quit().await,
        }
    }

    async fn dispatch_quit(&self) {
        tracing::info!("Quit requested");
        self.model.set_should_quit(true).await;
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    use crate::model::{Focus, Overlay};
    use crate::test_support::{Harness, tracks};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    async fn press(h: &Harness, code: KeyCode) {
        h.controller.handle_key_event(key(code)).await.unwrap();
    }

    #[tokio::test]
    async fn search_focus_captures_typing() {
        let h = Harness::with_tracks(2).await;
        press(&h, KeyCode::Char('/')).await;
        assert_eq!(h.model.get_focus().await, Focus::Search);

        for c in "jazz".chars() {
            press(&h, KeyCode::Char(c)).await;
        }
        press(&h, KeyCode::Backspace).await;
        assert_eq!(h.model.get_search_query().await, "jaz");
        // Typing 'j' did not move the selection
        assert_eq!(h.model.get_listing_view().await.selected_row, 0);

        press(&h, KeyCode::Esc).await;
        assert_eq!(h.model.get_focus().await, Focus::Songs);
        assert!(!h.model.should_quit().await);
    }

    #[tokio::test]
    async fn gg_and_shift_g_jump_between_pages() {
        let h = Harness::with_tracks(45).await;
        press(&h, KeyCode::Char('G')).await;
        assert_eq!(h.model.get_listing_view().await.current_page, 3);

        press(&h, KeyCode::Char('g')).await;
        assert_eq!(h.model.get_listing_view().await.current_page, 3);
        press(&h, KeyCode::Char('g')).await;
        assert_eq!(h.model.get_listing_view().await.current_page, 1);
    }

    #[tokio::test]
    async fn escape_clears_search_before_quitting() {
        let h = Harness::with_tracks(3).await;
        h.model.apply_search_results(tracks(1)).await;

        press(&h, KeyCode::Esc).await;
        assert!(!h.model.is_search_mode().await);
        assert!(!h.model.should_quit().await);

        press(&h, KeyCode::Esc).await;
        assert!(h.model.should_quit().await);
    }

    #[tokio::test]
    async fn overlays_swallow_keys_until_closed() {
        let h = Harness::with_tracks(3).await;
        press(&h, KeyCode::Char('?')).await;
        assert_eq!(h.model.get_overlay().await, Overlay::Help);

        press(&h, KeyCode::Char('j')).await;
        assert_eq!(h.model.get_listing_view().await.selected_row, 0);

        press(&h, KeyCode::Esc).await;
        assert_eq!(h.model.get_overlay().await, Overlay::None);
        press(&h, KeyCode::Char('j')).await;
        assert_eq!(h.model.get_listing_view().await.selected_row, 1);
    }

    #[tokio::test]
    async fn enter_plays_selected_row() {
        let h = Harness::with_tracks(3).await;
        press(&h, KeyCode::Down).await;
        press(&h, KeyCode::Enter).await;

        let state = h.model.player_state().get_state().await;
        assert_eq!(state.index(), Some(1));
    }

    #[tokio::test]
    async fn ctrl_c_quits_from_anywhere() {
        let h = Harness::with_tracks(1).await;
        press(&h, KeyCode::Char('/')).await;
        h.controller
            .handle_key_event(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL))
            .await
            .unwrap();
        assert!(h.model.should_quit().await);
    }
}
