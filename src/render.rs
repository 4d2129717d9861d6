use crate::model::{
    terrain_of, DeathCause, GameState, Scene, Terrain, CELL, COLS_PER_SLOT, NUM_COLS, NUM_ROWS,
    REFUGE_SLOTS,
};
use crossterm::{
    cursor, execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{
        self, BeginSynchronizedUpdate, Clear, ClearType, DisableLineWrap, EnableLineWrap,
        EndSynchronizedUpdate, EnterAlternateScreen, LeaveAlternateScreen,
    },
};
use std::io::{self, Write};

pub(crate) const CELL_W: u16 = 4; // terminal columns per grid column
pub(crate) const CELL_H: u16 = 2; // terminal rows per grid row
pub(crate) const HUD_ROWS: u16 = 2;
pub(crate) const FOOTER_ROWS: u16 = 1;
pub(crate) const PLAY_W: u16 = NUM_COLS as u16 * CELL_W;
pub(crate) const PLAY_H: u16 = NUM_ROWS as u16 * CELL_H;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Cell {
    pub(crate) ch: char,
    pub(crate) fg: Color,
    pub(crate) bg: Color,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            fg: Color::White,
            bg: Color::Black,
        }
    }
}

pub(crate) struct CellBuffer {
    pub(crate) w: u16,
    pub(crate) h: u16,
    pub(crate) cells: Vec<Cell>,
}

impl CellBuffer {
    pub(crate) fn new(w: u16, h: u16) -> Self {
        Self {
            w,
            h,
            cells: vec![Cell::default(); (w as usize) * (h as usize)],
        }
    }
    pub(crate) fn idx(&self, x: u16, y: u16) -> usize {
        (y as usize) * (self.w as usize) + (x as usize)
    }
    pub(crate) fn set(&mut self, x: u16, y: u16, c: Cell) {
        if x < self.w && y < self.h {
            let i = self.idx(x, y);
            self.cells[i] = c;
        }
    }
    pub(crate) fn clear(&mut self, bg: Color) {
        for c in &mut self.cells {
            c.ch = ' ';
            c.fg = Color::White;
            c.bg = bg;
        }
    }
}

pub(crate) struct Terminal {
    pub(crate) out: io::Stdout,
    pub(crate) cols: u16,
    pub(crate) rows: u16,
    pub(crate) prev: CellBuffer,
    pub(crate) cur: CellBuffer,
}

impl Terminal {
    pub(crate) fn begin() -> anyhow::Result<Self> {
        let mut out = io::stdout();
        execute!(
            out,
            EnterAlternateScreen,
            cursor::Hide,
            DisableLineWrap,
            terminal::Clear(ClearType::All)
        )?;
        terminal::enable_raw_mode()?;

        let (cols, rows) = terminal::size()?;
        Ok(Self {
            out,
            cols,
            rows,
            prev: CellBuffer::new(cols, rows),
            cur: CellBuffer::new(cols, rows),
        })
    }

    pub(crate) fn end(&mut self) -> anyhow::Result<()> {
        queue!(
            self.out,
            BeginSynchronizedUpdate,
            ResetColor,
            Clear(ClearType::All),
            cursor::Show,
            EnableLineWrap,
            EndSynchronizedUpdate,
            LeaveAlternateScreen
        )?;
        self.out.flush()?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    pub(crate) fn resize_if_needed(&mut self) -> anyhow::Result<bool> {
        let (c, r) = terminal::size()?;
        if c == self.cols && r == self.rows {
            return Ok(false);
        }
        self.cols = c;
        self.rows = r;
        self.prev = CellBuffer::new(c, r);
        self.cur = CellBuffer::new(c, r);
        Ok(true)
    }

    pub(crate) fn present(&mut self, diff_only: bool) -> anyhow::Result<()> {
        queue!(self.out, BeginSynchronizedUpdate)?;

        let mut last_fg = None;
        let mut last_bg = None;

        for y in 0..self.rows {
            for x in 0..self.cols {
                let i = self.cur.idx(x, y);
                let c = self.cur.cells[i];
                if diff_only && c == self.prev.cells[i] {
                    continue;
                }

                queue!(self.out, cursor::MoveTo(x, y))?;

                if last_fg != Some(c.fg) {
                    queue!(self.out, SetForegroundColor(c.fg))?;
                    last_fg = Some(c.fg);
                }
                if last_bg != Some(c.bg) {
                    queue!(self.out, SetBackgroundColor(c.bg))?;
                    last_bg = Some(c.bg);
                }

                queue!(self.out, Print(c.ch))?;
            }
        }

        queue!(self.out, ResetColor, EndSynchronizedUpdate)?;
        self.out.flush()?;
        self.prev.cells.copy_from_slice(&self.cur.cells);
        Ok(())
    }
}

#[derive(Clone, Copy)]
pub(crate) struct Theme {
    pub(crate) name: &'static str,
    pub(crate) hud_fg: Color,
    pub(crate) hud_bg: Color,

    pub(crate) land_bg: Color,
    pub(crate) road_bg: Color,
    pub(crate) water_bg: Color,
    pub(crate) refuge_bg: Color,

    pub(crate) frog_fg: Color,
    pub(crate) car_fg: Color,
    pub(crate) log_fg: Color,
    pub(crate) slot_open_fg: Color,
    pub(crate) slot_taken_fg: Color,
    pub(crate) marker_fg: Color,
    pub(crate) accent_fg: Color,
}

pub(crate) fn themes() -> Vec<Theme> {
    vec![
        Theme {
            name: "Lily Pond",
            hud_fg: Color::Rgb {
                r: 170,
                g: 240,
                b: 190,
            },
            hud_bg: Color::Rgb { r: 6, g: 9, b: 8 },
            land_bg: Color::Rgb { r: 18, g: 44, b: 20 },
            road_bg: Color::Rgb { r: 24, g: 24, b: 28 },
            water_bg: Color::Rgb { r: 10, g: 22, b: 48 },
            refuge_bg: Color::Rgb { r: 12, g: 34, b: 30 },
            frog_fg: Color::Rgb {
                r: 126,
                g: 217,
                b: 87,
            },
            car_fg: Color::Rgb { r: 221, g: 17, b: 17 },
            log_fg: Color::Rgb { r: 150, g: 75, b: 0 },
            slot_open_fg: Color::Rgb {
                r: 255,
                g: 255,
                b: 0,
            },
            slot_taken_fg: Color::Rgb { r: 0, g: 255, b: 0 },
            marker_fg: Color::Rgb {
                r: 225,
                g: 225,
                b: 225,
            },
            accent_fg: Color::Rgb {
                r: 90,
                g: 130,
                b: 150,
            },
        },
        Theme {
            name: "Amber Terminal",
            hud_fg: Color::Rgb {
                r: 255,
                g: 190,
                b: 95,
            },
            hud_bg: Color::Rgb { r: 7, g: 6, b: 3 },
            land_bg: Color::Rgb { r: 26, g: 20, b: 8 },
            road_bg: Color::Rgb { r: 14, g: 12, b: 10 },
            water_bg: Color::Rgb { r: 10, g: 10, b: 20 },
            refuge_bg: Color::Rgb { r: 18, g: 16, b: 6 },
            frog_fg: Color::Rgb {
                r: 255,
                g: 220,
                b: 120,
            },
            car_fg: Color::Rgb {
                r: 255,
                g: 120,
                b: 70,
            },
            log_fg: Color::Rgb {
                r: 210,
                g: 170,
                b: 110,
            },
            slot_open_fg: Color::Rgb {
                r: 255,
                g: 235,
                b: 160,
            },
            slot_taken_fg: Color::Rgb {
                r: 190,
                g: 255,
                b: 140,
            },
            marker_fg: Color::Rgb {
                r: 235,
                g: 225,
                b: 200,
            },
            accent_fg: Color::Rgb {
                r: 140,
                g: 110,
                b: 60,
            },
        },
        Theme {
            name: "Mono",
            hud_fg: Color::White,
            hud_bg: Color::Black,
            land_bg: Color::Black,
            road_bg: Color::Black,
            water_bg: Color::DarkBlue,
            refuge_bg: Color::DarkGrey,
            frog_fg: Color::Green,
            car_fg: Color::Red,
            log_fg: Color::DarkYellow,
            slot_open_fg: Color::Yellow,
            slot_taken_fg: Color::Green,
            marker_fg: Color::Grey,
            accent_fg: Color::DarkGrey,
        },
    ]
}

pub(crate) struct Layout {
    pub(crate) play_x: u16,
    pub(crate) play_y: u16,
}

pub(crate) fn fit_view(cols: u16, rows: u16) -> Option<Layout> {
    if cols < PLAY_W || rows < HUD_ROWS + PLAY_H + FOOTER_ROWS {
        return None;
    }
    let free = rows - HUD_ROWS - PLAY_H - FOOTER_ROWS;
    Some(Layout {
        play_x: (cols - PLAY_W) / 2,
        play_y: HUD_ROWS + free / 2,
    })
}

fn px_to_chars(px: f32) -> i32 {
    (px / CELL * CELL_W as f32).round() as i32
}

fn put(buf: &mut CellBuffer, x: i32, y: i32, ch: char, fg: Color, bg: Color) {
    if x < 0 || y < 0 || x >= buf.w as i32 || y >= buf.h as i32 {
        return;
    }
    buf.set(x as u16, y as u16, Cell { ch, fg, bg });
}

pub(crate) fn draw_text(buf: &mut CellBuffer, x: u16, y: u16, s: &str, fg: Color, bg: Color) {
    let mut xx = x;
    for ch in s.chars() {
        if xx >= buf.w {
            break;
        }
        buf.set(xx, y, Cell { ch, fg, bg });
        xx += 1;
    }
}

fn bg_for(theme: &Theme, t: Terrain) -> Color {
    match t {
        Terrain::Refuge => theme.refuge_bg,
        Terrain::Water => theme.water_bg,
        Terrain::Road => theme.road_bg,
        Terrain::Land => theme.land_bg,
    }
}

// One obstacle span: clipped to the playfield, both terminal rows of its lane.
fn draw_span(buf: &mut CellBuffer, lay: &Layout, x_px: f32, row: i32, w_px: f32, ch: char, fg: Color, bg: Color) {
    let x0 = px_to_chars(x_px);
    let x1 = px_to_chars(x_px + w_px);
    let y0 = lay.play_y as i32 + row * CELL_H as i32;
    for x in x0.max(0)..x1.min(PLAY_W as i32) {
        for dy in 0..CELL_H as i32 {
            put(buf, lay.play_x as i32 + x, y0 + dy, ch, fg, bg);
        }
    }
}

pub(crate) fn draw_frame(
    buf: &mut CellBuffer,
    lay: &Layout,
    g: &GameState,
    theme: &Theme,
    best_score: i32,
) {
    // lane bands
    for row in 0..NUM_ROWS {
        let bg = bg_for(theme, terrain_of(row));
        for dy in 0..CELL_H as i32 {
            let y = lay.play_y as i32 + row * CELL_H as i32 + dy;
            for x in 0..PLAY_W as i32 {
                put(buf, lay.play_x as i32 + x, y, ' ', theme.hud_fg, bg);
            }
        }
    }

    // dashed road markings
    for row in 0..NUM_ROWS {
        if terrain_of(row) != Terrain::Road {
            continue;
        }
        let y = lay.play_y as i32 + row * CELL_H as i32 + 1;
        for x in (0..PLAY_W as i32).step_by(6) {
            put(buf, lay.play_x as i32 + x, y, '╌', theme.accent_fg, theme.road_bg);
        }
    }

    // drifting ripples
    for row in 0..NUM_ROWS {
        if terrain_of(row) != Terrain::Water {
            continue;
        }
        let y = lay.play_y as i32 + row * CELL_H as i32;
        let mut x = ((g.ticks / 8) as i32 + row * 3) % 7;
        while x < PLAY_W as i32 {
            put(buf, lay.play_x as i32 + x, y, '~', theme.accent_fg, theme.water_bg);
            x += 7;
        }
    }

    // refuge slots
    for (i, taken) in g.refuges.iter().enumerate() {
        let col = i as i32 * COLS_PER_SLOT + 1;
        let x0 = lay.play_x as i32 + col * CELL_W as i32;
        let y0 = lay.play_y as i32;
        let fg = if *taken {
            theme.slot_taken_fg
        } else {
            theme.slot_open_fg
        };
        for dy in 0..CELL_H as i32 {
            for dx in 0..3 {
                put(buf, x0 + dx, y0 + dy, '█', fg, theme.refuge_bg);
            }
        }
    }

    for log in &g.logs {
        draw_span(buf, lay, log.x, log.row, log.width, '█', theme.log_fg, theme.water_bg);
        // notched ends
        let y = lay.play_y as i32 + log.row * CELL_H as i32;
        let x0 = px_to_chars(log.x);
        let x1 = px_to_chars(log.x + log.width);
        if x0 >= 0 && x0 < PLAY_W as i32 {
            put(buf, lay.play_x as i32 + x0, y, ' ', theme.log_fg, theme.water_bg);
        }
        if x1 - 1 >= 0 && x1 - 1 < PLAY_W as i32 {
            put(buf, lay.play_x as i32 + x1 - 1, y + 1, ' ', theme.log_fg, theme.water_bg);
        }
    }

    for car in &g.cars {
        draw_span(buf, lay, car.x, car.row, car.width, '█', theme.car_fg, theme.road_bg);
        // windshield cutouts
        let y = lay.play_y as i32 + car.row * CELL_H as i32;
        let x0 = px_to_chars(car.x);
        let x1 = px_to_chars(car.x + car.width);
        for wx in [x0 + 2, x1 - 3] {
            if wx >= 0 && wx < PLAY_W as i32 {
                put(buf, lay.play_x as i32 + wx, y, ' ', theme.car_fg, theme.road_bg);
            }
        }
    }

    for m in &g.markers {
        let ch = match m.cause {
            DeathCause::Vehicle | DeathCause::RefugeBlocked => '✗',
            DeathCause::Drowned | DeathCause::SweptAway => '☠',
        };
        let x = lay.play_x as i32 + m.col * CELL_W as i32 + 1;
        let y = lay.play_y as i32 + m.row * CELL_H as i32;
        let bg = bg_for(theme, terrain_of(m.row));
        put(buf, x, y, ch, theme.marker_fg, bg);
        put(buf, x + 1, y + 1, ch, theme.marker_fg, bg);
    }

    // frog last, over whatever it sits on
    let fx = px_to_chars(g.frog_render_x());
    let fy = lay.play_y as i32 + g.frog.row * CELL_H as i32;
    let frog_bg = bg_for(theme, terrain_of(g.frog.row));
    let sprite = ["▗██▖", "▝██▘"];
    for (dy, line) in sprite.iter().enumerate() {
        for (dx, ch) in line.chars().enumerate() {
            let x = fx + dx as i32;
            if x < 0 || x >= PLAY_W as i32 {
                continue;
            }
            put(
                buf,
                lay.play_x as i32 + x,
                fy + dy as i32,
                ch,
                theme.frog_fg,
                frog_bg,
            );
        }
    }

    draw_hud(buf, g, theme, best_score);
}

fn draw_hud(buf: &mut CellBuffer, g: &GameState, theme: &Theme, best_score: i32) {
    for y in 0..HUD_ROWS {
        let blank = " ".repeat(buf.w as usize);
        draw_text(buf, 0, y, &blank, theme.hud_fg, theme.hud_bg);
    }

    let filled = g.refuges.iter().filter(|&&b| b).count();
    let hearts = "♥".repeat(g.lives.max(0) as usize);
    let line1 = format!(
        "PONDHOPPER  |  Score {:06}  Lives {:4}  Level {}  Refuges {}/{}",
        g.score, hearts, g.level, filled, REFUGE_SLOTS
    );
    let line2 = match g.scene {
        Scene::GameOver => "GAME OVER  |  R or Enter restart   Q quit   T theme".to_string(),
        Scene::Playing if g.paused => "PAUSED  |  Space resume   T theme   Q quit".to_string(),
        Scene::Playing => {
            "Arrows/WASD hop   Enter respawn   Space pause   R restart   T theme   Q quit"
                .to_string()
        }
    };
    draw_text(buf, 0, 0, &line1, theme.hud_fg, theme.hud_bg);
    draw_text(buf, 0, 1, &line2, theme.hud_fg, theme.hud_bg);

    let footer_y = buf.h.saturating_sub(1);
    let blank = " ".repeat(buf.w as usize);
    draw_text(buf, 0, footer_y, &blank, theme.hud_fg, theme.hud_bg);
    let footer = format!(
        "Theme: {}   Best {:06}   (Terminal: {}x{})",
        theme.name, best_score, buf.w, buf.h
    );
    draw_text(buf, 0, footer_y, &footer, theme.hud_fg, theme.hud_bg);
}
