use crate::config::{load_settings, project_paths, save_settings_atomic, Paths, Settings};
use crate::input::{collect_input_nonblocking, map_event_to_action};
use crate::model::{GameState, Scene};
use crate::render::{draw_frame, draw_text, fit_view, themes, Terminal, Theme};
use crate::sim::PlayerAction;
use crate::storage::{load_or_init_scores, save_scores_atomic, ScoreFile};
use std::time::{Duration, Instant};

const TICK_HZ: u32 = 30;
// the run stays on screen for a beat before the dialog takes over
const GAME_OVER_DELAY: Duration = Duration::from_millis(600);

pub(crate) struct App {
    settings: Settings,
    paths: Paths,
    state: GameState,
    scores: ScoreFile,
    term: Terminal,
    should_quit: bool,
    game_over_since: Option<Instant>,
}

impl App {
    fn init() -> anyhow::Result<Self> {
        let paths = project_paths()?;
        let mut settings = load_settings(&paths.settings_path);
        if settings.seed == 0 {
            settings.seed = 0x51C0FFEE_u64;
        }
        let scores = load_or_init_scores(&paths.scores_path);
        let state = GameState::new(settings.seed);
        let term = Terminal::begin()?;

        Ok(Self {
            settings,
            paths,
            state,
            scores,
            term,
            should_quit: false,
            game_over_since: None,
        })
    }

    fn run_loop(&mut self) -> anyhow::Result<()> {
        let fps = self.settings.fps_cap.clamp(10, 240);
        let frame_dt = Duration::from_secs_f32(1.0 / fps as f32);
        let sim_step = Duration::from_secs_f32(1.0 / TICK_HZ as f32);

        let mut last_frame = Instant::now();
        let mut sim_accum = Duration::ZERO;

        while !self.should_quit {
            let _resized = self.term.resize_if_needed()?;

            let ack_ready = match self.game_over_since {
                Some(t) => t.elapsed() >= GAME_OVER_DELAY,
                None => true,
            };

            // input
            let events = collect_input_nonblocking(frame_dt)?;
            for ev in events {
                if let Some(action) = map_event_to_action(self.state.scene, ev) {
                    match action {
                        PlayerAction::Quit => {
                            self.should_quit = true;
                            break;
                        }
                        PlayerAction::CycleTheme => {
                            self.settings.theme = (self.settings.theme + 1) % themes().len();
                        }
                        PlayerAction::Restart
                            if self.state.scene == Scene::GameOver && !ack_ready => {}
                        other => self.state.apply(other),
                    }
                }
            }

            // sim fixed-step
            let now = Instant::now();
            sim_accum = sim_accum.saturating_add(now.saturating_duration_since(last_frame));
            last_frame = now;
            while sim_accum >= sim_step {
                self.state.tick();
                sim_accum = sim_accum.saturating_sub(sim_step);
            }

            match self.state.scene {
                Scene::GameOver => {
                    if self.game_over_since.is_none() {
                        self.game_over_since = Some(Instant::now());
                        self.record_run()?;
                    }
                }
                Scene::Playing => self.game_over_since = None,
            }

            self.render_frame()?;

            // frame cap
            spin_sleep(frame_dt, Instant::now());
        }

        if self.state.scene == Scene::Playing {
            self.record_run()?;
        }
        save_settings_atomic(&self.paths.settings_path, &self.settings)?;
        Ok(())
    }

    fn render_frame(&mut self) -> anyhow::Result<()> {
        let list = themes();
        let theme = list[self.settings.theme % list.len()];
        self.term.cur.clear(theme.hud_bg);

        match fit_view(self.term.cols, self.term.rows) {
            Some(lay) => {
                draw_frame(
                    &mut self.term.cur,
                    &lay,
                    &self.state,
                    &theme,
                    self.scores.best_score,
                );
                let overlay_up = matches!(self.game_over_since, Some(t) if t.elapsed() >= GAME_OVER_DELAY);
                if overlay_up {
                    let body = format!(
                        "Final score: {}\nLevel reached: {}\nBest score: {}  (level {})\n\nR or Enter to play again\nQ to quit",
                        self.state.score,
                        self.state.level,
                        self.scores.best_score,
                        self.scores.best_level
                    );
                    self.draw_center_box("Game over", &body, &theme);
                }
            }
            None => {
                draw_text(
                    &mut self.term.cur,
                    0,
                    0,
                    "Terminal too small. Try at least 44x25.",
                    theme.hud_fg,
                    theme.hud_bg,
                );
            }
        }

        self.term.present(true)?;
        Ok(())
    }

    fn draw_center_box(&mut self, title: &str, body: &str, theme: &Theme) {
        let w = self.term.cols;
        let h = self.term.rows;
        let bw = std::cmp::min(44, w.saturating_sub(4)).max(8);
        let bh = std::cmp::min(12, h.saturating_sub(4)).max(5);
        let x0 = (w - bw) / 2;
        let y0 = (h - bh) / 2;

        let top = format!("┌{}┐", "─".repeat((bw - 2) as usize));
        let mid = format!("│{}│", " ".repeat((bw - 2) as usize));
        let bot = format!("└{}┘", "─".repeat((bw - 2) as usize));

        draw_text(&mut self.term.cur, x0, y0, &top, theme.hud_fg, theme.hud_bg);
        for y in y0 + 1..y0 + bh - 1 {
            draw_text(&mut self.term.cur, x0, y, &mid, theme.hud_fg, theme.hud_bg);
        }
        draw_text(
            &mut self.term.cur,
            x0,
            y0 + bh - 1,
            &bot,
            theme.hud_fg,
            theme.hud_bg,
        );

        draw_text(
            &mut self.term.cur,
            x0 + 2,
            y0 + 1,
            title,
            theme.hud_fg,
            theme.hud_bg,
        );
        let mut yy = y0 + 3;
        for line in body.lines() {
            if yy >= y0 + bh - 1 {
                break;
            }
            draw_text(&mut self.term.cur, x0 + 2, yy, line, theme.hud_fg, theme.hud_bg);
            yy += 1;
        }
    }

    fn record_run(&mut self) -> anyhow::Result<()> {
        if self.scores.record(self.state.score, self.state.level) {
            save_scores_atomic(&self.paths.scores_path, &self.scores)?;
        }
        Ok(())
    }
}

pub(crate) fn run() -> anyhow::Result<()> {
    let mut app = App::init()?;
    let res = app.run_loop();
    // restore the terminal even when the loop bails out
    let end = app.term.end();
    res.and(end)
}

/* -----------------------------
   Frame pacing helper
------------------------------ */

fn spin_sleep(target: Duration, now: Instant) {
    let end = now + target;
    loop {
        let t = Instant::now();
        if t >= end {
            break;
        }
        let left = end - t;
        if left > Duration::from_millis(2) {
            std::thread::sleep(Duration::from_millis(1));
        } else {
            std::hint::spin_loop();
        }
    }
}
