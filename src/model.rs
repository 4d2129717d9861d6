use rand::rngs::StdRng;
use rand::SeedableRng;

pub(crate) const NUM_COLS: i32 = 11;
pub(crate) const NUM_ROWS: i32 = 11;
pub(crate) const CELL: f32 = 40.0; // px per grid cell
pub(crate) const CANVAS_W: f32 = NUM_COLS as f32 * CELL;

pub(crate) const REFUGE_ROW: i32 = 0;
pub(crate) const REFUGE_SLOTS: usize = (NUM_COLS / 3) as usize;
pub(crate) const COLS_PER_SLOT: i32 = NUM_COLS / REFUGE_SLOTS as i32;

pub(crate) const START_LIVES: i32 = 4;
pub(crate) const REFUGE_BONUS: i32 = 100;
pub(crate) const LEVEL_BONUS_STEP: i32 = 500;

pub(crate) const CAR_WIDTH: f32 = CELL * 2.0;
pub(crate) const LOG_WIDTH: f32 = CELL * 3.0;

pub(crate) const MARKER_TTL: u32 = 90; // ticks a corpse stays visible
pub(crate) const MARKER_CAP: usize = 8;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Terrain {
    Refuge,
    Water,
    Land,
    Road,
}

// Row bands are static configuration: refuges on top, then the river,
// a median strip, four road lanes, and the start strip at the bottom.
pub(crate) fn terrain_of(row: i32) -> Terrain {
    match row {
        0 => Terrain::Refuge,
        1..=4 => Terrain::Water,
        6..=9 => Terrain::Road,
        _ => Terrain::Land,
    }
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct Obstacle {
    pub(crate) row: i32, // fixed for the obstacle's lifetime
    pub(crate) x: f32,   // left edge in px, wraps, never grid-snapped
    pub(crate) width: f32,
    pub(crate) speed: f32, // px per tick, sign is direction
}

impl Obstacle {
    pub(crate) fn overlaps(&self, x: f32, w: f32) -> bool {
        x < self.x + self.width && x + w > self.x
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum DeathCause {
    Vehicle,
    Drowned,
    SweptAway,
    RefugeBlocked,
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct Marker {
    pub(crate) col: i32,
    pub(crate) row: i32,
    pub(crate) cause: DeathCause,
    pub(crate) ttl: u32,
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct Frog {
    pub(crate) col: i32,
    pub(crate) row: i32,
    pub(crate) px: f32, // continuous x, authoritative while on water
    pub(crate) on_log: Option<usize>, // index into logs, creation order
}

impl Frog {
    pub(crate) fn at_start() -> Self {
        let col = NUM_COLS / 2;
        Self {
            col,
            row: NUM_ROWS - 1,
            px: col as f32 * CELL,
            on_log: None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Scene {
    Playing,
    GameOver,
}

pub(crate) struct GameState {
    pub(crate) scene: Scene,
    pub(crate) paused: bool,
    pub(crate) score: i32,
    pub(crate) level: i32,
    pub(crate) lives: i32,
    pub(crate) cars: Vec<Obstacle>,
    pub(crate) logs: Vec<Obstacle>,
    pub(crate) refuges: [bool; REFUGE_SLOTS],
    pub(crate) frog: Frog,
    pub(crate) markers: Vec<Marker>,
    pub(crate) ticks: u64,
    pub(crate) rng: StdRng,
}

impl GameState {
    pub(crate) fn new(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let (cars, logs) = crate::sim::spawn_obstacles(&mut rng);
        Self {
            scene: Scene::Playing,
            paused: false,
            score: 0,
            level: 1,
            lives: START_LIVES,
            cars,
            logs,
            refuges: [false; REFUGE_SLOTS],
            frog: Frog::at_start(),
            markers: Vec::new(),
            ticks: 0,
            rng,
        }
    }

    // Which x the presentation should use: the continuous offset only
    // counts while the frog is on water.
    pub(crate) fn frog_render_x(&self) -> f32 {
        match terrain_of(self.frog.row) {
            Terrain::Water => self.frog.px,
            _ => self.frog.col as f32 * CELL,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terrain_bands_match_the_board() {
        assert_eq!(terrain_of(0), Terrain::Refuge);
        for r in 1..=4 {
            assert_eq!(terrain_of(r), Terrain::Water);
        }
        assert_eq!(terrain_of(5), Terrain::Land);
        for r in 6..=9 {
            assert_eq!(terrain_of(r), Terrain::Road);
        }
        assert_eq!(terrain_of(10), Terrain::Land);
    }

    #[test]
    fn refuge_slots_tile_the_columns() {
        assert_eq!(REFUGE_SLOTS, 3);
        assert_eq!(COLS_PER_SLOT, 3);
    }

    #[test]
    fn render_x_follows_the_terrain() {
        let mut g = GameState::new(1);
        g.frog.row = 2;
        g.frog.px = 87.0;
        assert_eq!(g.frog_render_x(), 87.0);
        g.frog.row = 7;
        assert_eq!(g.frog_render_x(), g.frog.col as f32 * CELL);
    }
}
