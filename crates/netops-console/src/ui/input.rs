use crossterm::event::{KeyCode, KeyEvent};
use tokio::sync::mpsc;

use crate::events::ServiceCommand;

use super::app::{AppState, View};
use super::form::FormOutput;

/// Dispatches one key press. Returns true when the loop should exit.
pub(crate) fn handle_key_event(
    key: KeyEvent,
    app: &mut AppState,
    cmd_tx: &mpsc::Sender<ServiceCommand>,
) -> bool {
    if app.form.is_some() {
        handle_form_key(key, app, cmd_tx);
        return false;
    }

    if app.confirm_quit {
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => return true,
            // Any other key only dismisses the prompt, it never acts.
            _ => {
                app.confirm_quit = false;
                return false;
            }
        }
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Char('Q') => app.confirm_quit = true,
        KeyCode::Tab => app.cycle_view(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
        KeyCode::PageDown => app.scroll_down(10),
        KeyCode::PageUp => app.scroll_up(10),
        KeyCode::Esc => {
            if app.view == View::Versions && app.diff.is_some() {
                app.close_diff();
            } else {
                app.notices.clear();
            }
        }
        KeyCode::Enter | KeyCode::Char(' ') => match app.view {
            View::Timeline => app.toggle_selected_host(),
            View::Versions => app.select_version_under_cursor(),
            View::Devices => {}
        },
        KeyCode::Char(digit @ '1'..='9') => {
            if app.view == View::Timeline {
                let index = digit as usize - '1' as usize;
                app.toggle_step_of_selected(index);
            }
        }
        KeyCode::Char('r') | KeyCode::Char('R') => {
            let _ = cmd_tx.try_send(ServiceCommand::RefreshResults);
        }
        KeyCode::Char('i') | KeyCode::Char('I') => {
            let _ = cmd_tx.try_send(ServiceCommand::TriggerInspect);
        }
        KeyCode::Char('b') | KeyCode::Char('B') => {
            let _ = cmd_tx.try_send(ServiceCommand::TriggerBackup);
        }
        KeyCode::Char('d') | KeyCode::Char('D') => {
            let _ = cmd_tx.try_send(ServiceCommand::LoadDevices);
        }
        KeyCode::Char('v') | KeyCode::Char('V') => {
            let _ = cmd_tx.try_send(ServiceCommand::LoadVersions);
        }
        KeyCode::Char('c') | KeyCode::Char('C') => {
            if app.view == View::Versions {
                if let Some((old, new)) = app.compare_pair() {
                    let _ = cmd_tx.try_send(ServiceCommand::CompareVersions { old, new });
                }
            }
        }
        KeyCode::Char('n') | KeyCode::Char('N') => match app.view {
            View::Devices => app.open_device_form(),
            View::Timeline => app.open_job_form(),
            View::Versions => {}
        },
        KeyCode::Char('e') | KeyCode::Char('E') => {
            if app.view == View::Devices {
                app.open_edit_device_form();
            }
        }
        KeyCode::Char('x') | KeyCode::Char('X') => {
            if app.view == View::Devices {
                if let Some(id) = app.selected_device_id() {
                    let _ = cmd_tx.try_send(ServiceCommand::DeleteDevice(id));
                }
            }
        }
        _ => {}
    }
    false
}

/// Key routing while a modal form is open. All printable keys go into the
/// active field; Enter advances and submits from the last field.
fn handle_form_key(key: KeyEvent, app: &mut AppState, cmd_tx: &mpsc::Sender<ServiceCommand>) {
    let Some(form) = app.form.as_mut() else {
        return;
    };
    match key.code {
        KeyCode::Esc => app.close_form(),
        KeyCode::Tab | KeyCode::Down => form.next_field(),
        KeyCode::Backspace => form.backspace(),
        KeyCode::Char(ch) => form.insert(ch),
        KeyCode::Enter => {
            if !form.on_last_field() {
                form.next_field();
                return;
            }
            match form.submit() {
                Some(FormOutput::Device(device)) => {
                    let _ = cmd_tx.try_send(ServiceCommand::SaveDevice(device));
                    app.close_form();
                }
                Some(FormOutput::Job(job)) => {
                    let _ = cmd_tx.try_send(ServiceCommand::SaveJob(job));
                    app.close_form();
                }
                // Required fields still blank; keep the form open.
                None => form.active = 0,
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEvent, KeyModifiers};
    use netops_protocol::ExecutionReport;
    use serde_json::json;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn channel() -> (
        mpsc::Sender<ServiceCommand>,
        mpsc::Receiver<ServiceCommand>,
    ) {
        mpsc::channel(8)
    }

    #[test]
    fn quit_needs_confirmation() {
        let (tx, _rx) = channel();
        let mut app = AppState::new();
        assert!(!handle_key_event(key(KeyCode::Char('q')), &mut app, &tx));
        assert!(app.confirm_quit);
        assert!(handle_key_event(key(KeyCode::Char('q')), &mut app, &tx));
    }

    #[test]
    fn escape_cancels_quit_confirmation() {
        let (tx, _rx) = channel();
        let mut app = AppState::new();
        handle_key_event(key(KeyCode::Char('q')), &mut app, &tx);
        assert!(!handle_key_event(key(KeyCode::Esc), &mut app, &tx));
        assert!(!app.confirm_quit);
    }

    #[test]
    fn enter_toggles_selected_host() {
        let (tx, _rx) = channel();
        let mut app = AppState::new();
        app.apply_report(ExecutionReport::from_value(json!({
            "core-01": {"success": true, "steps": [{"name": "backup_config", "success": true}]}
        })));
        assert!(app.is_host_expanded("core-01"));
        handle_key_event(key(KeyCode::Enter), &mut app, &tx);
        assert!(!app.is_host_expanded("core-01"));
    }

    #[test]
    fn digit_toggles_step_of_selected_host() {
        let (tx, _rx) = channel();
        let mut app = AppState::new();
        app.apply_report(ExecutionReport::from_value(json!({
            "core-01": {"success": true, "steps": [
                {"name": "backup_config", "success": true},
                {"name": "apply_config", "success": true}
            ]}
        })));
        handle_key_event(key(KeyCode::Char('2')), &mut app, &tx);
        assert!(app.is_step_expanded("core-01", 1));
    }

    #[test]
    fn open_form_captures_keys_until_escape() {
        let (tx, mut rx) = channel();
        let mut app = AppState::new();
        app.view = View::Devices;
        handle_key_event(key(KeyCode::Char('n')), &mut app, &tx);
        assert!(app.form.is_some());

        // 'q' goes into the field instead of arming quit.
        handle_key_event(key(KeyCode::Char('q')), &mut app, &tx);
        assert!(!app.confirm_quit);

        handle_key_event(key(KeyCode::Esc), &mut app, &tx);
        assert!(app.form.is_none());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn completed_device_form_submits_save_command() {
        let (tx, mut rx) = channel();
        let mut app = AppState::new();
        app.view = View::Devices;
        handle_key_event(key(KeyCode::Char('n')), &mut app, &tx);
        for ch in "core-01".chars() {
            handle_key_event(key(KeyCode::Char(ch)), &mut app, &tx);
        }
        handle_key_event(key(KeyCode::Enter), &mut app, &tx);
        for ch in "10.0.0.1".chars() {
            handle_key_event(key(KeyCode::Char(ch)), &mut app, &tx);
        }
        handle_key_event(key(KeyCode::Enter), &mut app, &tx);
        // Platform left blank; Enter on the last field submits.
        handle_key_event(key(KeyCode::Enter), &mut app, &tx);
        assert!(app.form.is_none());
        match rx.try_recv() {
            Ok(ServiceCommand::SaveDevice(device)) => {
                assert_eq!(device.name, "core-01");
                assert_eq!(device.ip, "10.0.0.1");
            }
            _ => panic!("expected save command"),
        }
    }

    #[test]
    fn stray_key_dismisses_quit_prompt_without_acting() {
        use netops_protocol::inventory::Device;
        let (tx, mut rx) = channel();
        let mut app = AppState::new();
        app.view = View::Devices;
        app.devices = vec![Device {
            id: Some(1),
            name: "core-01".to_string(),
            ..Device::default()
        }];
        handle_key_event(key(KeyCode::Char('q')), &mut app, &tx);
        assert!(app.confirm_quit);

        // 'x' only cancels the prompt; the delete must not fire.
        assert!(!handle_key_event(key(KeyCode::Char('x')), &mut app, &tx));
        assert!(!app.confirm_quit);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn delete_targets_the_selected_device() {
        use netops_protocol::inventory::Device;
        let (tx, mut rx) = channel();
        let mut app = AppState::new();
        app.view = View::Devices;
        app.devices = vec![
            Device {
                id: Some(1),
                name: "core-01".to_string(),
                ..Device::default()
            },
            Device {
                id: Some(2),
                name: "edge-02".to_string(),
                ..Device::default()
            },
        ];
        app.device_cursor = 1;
        handle_key_event(key(KeyCode::Char('x')), &mut app, &tx);
        match rx.try_recv() {
            Ok(ServiceCommand::DeleteDevice(id)) => assert_eq!(id, 2),
            _ => panic!("expected delete command"),
        }
    }

    #[test]
    fn compare_fires_only_with_two_selected() {
        let (tx, mut rx) = channel();
        let mut app = AppState::new();
        app.view = View::Versions;
        app.select_version("aaa");
        handle_key_event(key(KeyCode::Char('c')), &mut app, &tx);
        assert!(rx.try_recv().is_err());

        app.select_version("bbb");
        handle_key_event(key(KeyCode::Char('c')), &mut app, &tx);
        match rx.try_recv() {
            Ok(ServiceCommand::CompareVersions { old, new }) => {
                assert_eq!(old, "aaa");
                assert_eq!(new, "bbb");
            }
            _ => panic!("expected compare command"),
        }
    }
}
