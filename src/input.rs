use crate::model::Scene;
use crate::sim::{Dir, PlayerAction};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use std::time::Duration;

#[derive(Clone, Copy, Debug)]
pub(crate) struct InputEvent {
    pub(crate) key: KeyCode,
    pub(crate) mods: KeyModifiers,
}

pub(crate) fn collect_input_nonblocking(
    max_frame_time: Duration,
) -> anyhow::Result<Vec<InputEvent>> {
    let mut out = Vec::new();

    // poll with a tiny timeout so we stay responsive
    let timeout = std::cmp::min(Duration::from_millis(1), max_frame_time);
    while event::poll(timeout)? {
        if let Event::Key(k) = event::read()? {
            if k.kind == KeyEventKind::Press || k.kind == KeyEventKind::Repeat {
                out.push(InputEvent {
                    key: k.code,
                    mods: k.modifiers,
                });
                if out.len() >= 32 {
                    break;
                }
            }
        }
    }
    Ok(out)
}

pub(crate) fn map_event_to_action(scene: Scene, ev: InputEvent) -> Option<PlayerAction> {
    if matches!(ev.key, KeyCode::Char('c') | KeyCode::Char('C'))
        && ev.mods.contains(KeyModifiers::CONTROL)
    {
        return Some(PlayerAction::Quit);
    }

    // Global
    match ev.key {
        KeyCode::Char('q') | KeyCode::Char('Q') => return Some(PlayerAction::Quit),
        KeyCode::Char('t') | KeyCode::Char('T') => return Some(PlayerAction::CycleTheme),
        KeyCode::Char('r') | KeyCode::Char('R') => return Some(PlayerAction::Restart),
        _ => {}
    }

    match scene {
        Scene::Playing => match ev.key {
            KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') => {
                Some(PlayerAction::Move(Dir::Up))
            }
            KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S') => {
                Some(PlayerAction::Move(Dir::Down))
            }
            KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => {
                Some(PlayerAction::Move(Dir::Left))
            }
            KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => {
                Some(PlayerAction::Move(Dir::Right))
            }
            KeyCode::Enter => Some(PlayerAction::Respawn),
            KeyCode::Char(' ') => Some(PlayerAction::TogglePause),
            _ => None,
        },
        Scene::GameOver => match ev.key {
            KeyCode::Enter => Some(PlayerAction::Restart),
            _ => None,
        },
    }
}
