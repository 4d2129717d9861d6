use crate::model::{
    terrain_of, DeathCause, Frog, GameState, Marker, Obstacle, Scene, Terrain, CANVAS_W, CAR_WIDTH,
    CELL, COLS_PER_SLOT, LEVEL_BONUS_STEP, LOG_WIDTH, MARKER_CAP, MARKER_TTL, NUM_COLS, NUM_ROWS,
    REFUGE_BONUS, REFUGE_ROW, REFUGE_SLOTS, START_LIVES,
};
use rand::{rngs::StdRng, Rng};

#[derive(Clone, Copy, Debug)]
pub(crate) enum Dir {
    Up,
    Down,
    Left,
    Right,
}

impl Dir {
    pub(crate) fn delta(self) -> (i32, i32) {
        match self {
            Dir::Up => (0, -1),
            Dir::Down => (0, 1),
            Dir::Left => (-1, 0),
            Dir::Right => (1, 0),
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub(crate) enum PlayerAction {
    Move(Dir),
    Respawn,
    Restart,
    TogglePause,
    CycleTheme,
    Quit,
}

// Adjacent lanes run opposite ways: even rows rightward, odd rows leftward.
// Speed keeps a per-obstacle jitter rolled once at creation.
pub(crate) fn spawn_obstacles(rng: &mut StdRng) -> (Vec<Obstacle>, Vec<Obstacle>) {
    let mut cars = Vec::new();
    for row in 6..=9 {
        let dir = if row % 2 == 0 { 1.0 } else { -1.0 };
        let x = if dir > 0.0 { 0.0 } else { CANVAS_W - CAR_WIDTH };
        cars.push(Obstacle {
            row,
            x,
            width: CAR_WIDTH,
            speed: dir * (2.0 + rng.gen::<f32>()),
        });
    }
    let mut logs = Vec::new();
    for row in 1..=4 {
        let dir = if row % 2 == 0 { 1.0 } else { -1.0 };
        let x = if dir > 0.0 { 0.0 } else { CANVAS_W - LOG_WIDTH };
        logs.push(Obstacle {
            row,
            x,
            width: LOG_WIDTH,
            speed: dir * (1.0 + rng.gen::<f32>()),
        });
    }
    (cars, logs)
}

// Wraparound keeps every obstacle exactly one cycle from reappearing:
// past the right edge it re-enters at -width, and symmetrically.
fn advance(o: &mut Obstacle) {
    o.x += o.speed;
    if o.speed > 0.0 && o.x > CANVAS_W {
        o.x = -o.width;
    } else if o.speed < 0.0 && o.x < -o.width {
        o.x = CANVAS_W;
    }
}

impl GameState {
    pub(crate) fn apply(&mut self, action: PlayerAction) {
        match action {
            PlayerAction::Move(dir) => {
                let (dc, dr) = dir.delta();
                self.move_frog(dc, dr);
            }
            PlayerAction::Respawn => {
                if self.scene == Scene::Playing {
                    self.reset_frog();
                }
            }
            PlayerAction::Restart => self.reset_game(),
            PlayerAction::TogglePause => {
                if self.scene == Scene::Playing {
                    self.paused = !self.paused;
                }
            }
            // handled by the app layer
            PlayerAction::CycleTheme | PlayerAction::Quit => {}
        }
    }

    pub(crate) fn tick(&mut self) {
        if self.paused || self.scene != Scene::Playing {
            return;
        }
        self.ticks += 1;

        for o in &mut self.cars {
            advance(o);
        }
        for o in &mut self.logs {
            advance(o);
        }

        for m in &mut self.markers {
            m.ttl = m.ttl.saturating_sub(1);
        }
        self.markers.retain(|m| m.ttl > 0);

        // a car strike beats any log interaction this tick
        let struck = self
            .cars
            .iter()
            .any(|c| c.row == self.frog.row && c.overlaps(self.frog.px, CELL));
        if struck {
            self.kill(DeathCause::Vehicle);
            return;
        }

        if terrain_of(self.frog.row) == Terrain::Water {
            // support is recomputed against the logs' new positions before
            // it can kill, so a hop that just landed here gets a fair test;
            // the first overlapping log in creation order carries the frog
            let (row, px) = (self.frog.row, self.frog.px);
            match self
                .logs
                .iter()
                .position(|l| l.row == row && l.overlaps(px, CELL))
            {
                None => self.kill(DeathCause::Drowned),
                Some(i) => {
                    self.frog.on_log = Some(i);
                    self.frog.px += self.logs[i].speed;
                    if self.frog.px < 0.0 || self.frog.px + CELL > CANVAS_W {
                        self.kill(DeathCause::SweptAway);
                    } else {
                        self.frog.col = (self.frog.px / CELL).round() as i32;
                    }
                }
            }
        } else {
            // off the water the cell is authoritative, drift is dropped
            self.frog.on_log = None;
            self.frog.px = self.frog.col as f32 * CELL;
        }
    }

    pub(crate) fn move_frog(&mut self, dcol: i32, drow: i32) {
        if self.paused || self.scene != Scene::Playing {
            return;
        }
        let col = self.frog.col + dcol;
        let row = self.frog.row + drow;
        if col < 0 || col >= NUM_COLS || row < 0 || row >= NUM_ROWS {
            return;
        }
        self.frog.col = col;
        self.frog.row = row;
        self.frog.px = col as f32 * CELL; // snap, any sub-cell drift is discarded
        self.frog.on_log = None;
        if row == REFUGE_ROW {
            self.claim_refuge();
        }
    }

    // Reaching the top row outside an open slot is a miss, not a no-op.
    fn claim_refuge(&mut self) {
        let slot = self.frog.col / COLS_PER_SLOT;
        let open = slot >= 0 && (slot as usize) < REFUGE_SLOTS && !self.refuges[slot as usize];
        if !open {
            self.kill(DeathCause::RefugeBlocked);
            return;
        }
        self.refuges[slot as usize] = true;
        self.score += REFUGE_BONUS;
        self.reset_frog();
        if self.refuges.iter().all(|&r| r) {
            self.level += 1;
            self.score += self.level * LEVEL_BONUS_STEP;
            self.reset_level();
            self.reset_frog();
        }
    }

    fn kill(&mut self, cause: DeathCause) {
        self.push_marker(cause);
        self.lives -= 1;
        if self.lives <= 0 {
            self.scene = Scene::GameOver;
        }
        self.reset_frog();
    }

    fn push_marker(&mut self, cause: DeathCause) {
        let col = (self.frog.px / CELL).round() as i32;
        self.markers.push(Marker {
            col: col.clamp(0, NUM_COLS - 1),
            row: self.frog.row,
            cause,
            ttl: MARKER_TTL,
        });
        if self.markers.len() > MARKER_CAP {
            let excess = self.markers.len() - MARKER_CAP;
            self.markers.drain(..excess);
        }
    }

    pub(crate) fn reset_frog(&mut self) {
        self.frog = Frog::at_start();
    }

    pub(crate) fn reset_level(&mut self) {
        self.refuges = [false; REFUGE_SLOTS];
    }

    pub(crate) fn reset_game(&mut self) {
        let (cars, logs) = spawn_obstacles(&mut self.rng);
        self.cars = cars;
        self.logs = logs;
        self.markers.clear();
        self.score = 0;
        self.level = 1;
        self.lives = START_LIVES;
        self.reset_level();
        self.reset_frog();
        self.paused = false;
        self.scene = Scene::Playing;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> GameState {
        GameState::new(0xF06)
    }

    fn place_log(g: &mut GameState, row: i32, x: f32, speed: f32) -> usize {
        g.logs.push(Obstacle {
            row,
            x,
            width: LOG_WIDTH,
            speed,
        });
        g.logs.len() - 1
    }

    #[test]
    fn obstacles_never_leave_the_wrap_band() {
        let mut g = state();
        for _ in 0..2000 {
            g.tick();
            for o in g.cars.iter().chain(g.logs.iter()) {
                assert!(o.x >= -o.width && o.x <= CANVAS_W, "x = {}", o.x);
            }
        }
    }

    #[test]
    fn directions_alternate_by_row() {
        let g = state();
        for o in g.cars.iter().chain(g.logs.iter()) {
            let expect = if o.row % 2 == 0 { 1.0 } else { -1.0 };
            assert_eq!(o.speed.signum(), expect, "row {}", o.row);
        }
    }

    #[test]
    fn rows_never_change() {
        let mut g = state();
        let before: Vec<i32> = g.cars.iter().chain(g.logs.iter()).map(|o| o.row).collect();
        for _ in 0..500 {
            g.tick();
        }
        let after: Vec<i32> = g.cars.iter().chain(g.logs.iter()).map(|o| o.row).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn no_drift_on_land() {
        let mut g = state();
        g.frog.row = 5;
        g.frog.col = 3;
        g.frog.px = 123.4;
        g.tick();
        assert_eq!(g.frog.px, 3.0 * CELL);
        assert!(g.frog.on_log.is_none());
        assert_eq!(g.lives, START_LIVES);
    }

    #[test]
    fn moves_off_the_grid_are_ignored() {
        let mut g = state();
        g.frog.col = NUM_COLS - 1;
        g.frog.px = (NUM_COLS - 1) as f32 * CELL;
        g.move_frog(1, 0);
        assert_eq!(g.frog.col, NUM_COLS - 1);
        g.move_frog(0, 1); // already on the bottom row
        assert_eq!(g.frog.row, NUM_ROWS - 1);
        assert_eq!(g.frog.px, (NUM_COLS - 1) as f32 * CELL);
    }

    #[test]
    fn legal_move_snaps_to_the_grid() {
        let mut g = state();
        g.frog.row = 2;
        g.frog.col = 2;
        g.frog.px = 2.0 * CELL + 17.0;
        g.frog.on_log = Some(0);
        g.move_frog(1, 0);
        assert_eq!(g.frog.col, 3);
        assert_eq!(g.frog.px, 3.0 * CELL);
        assert!(g.frog.on_log.is_none());
    }

    #[test]
    fn landing_on_an_open_refuge_scores() {
        let mut g = state();
        g.frog.row = 1;
        g.frog.col = 4;
        g.frog.px = 4.0 * CELL;
        g.move_frog(0, -1);
        assert_eq!(g.refuges, [false, true, false]);
        assert_eq!(g.score, REFUGE_BONUS);
        assert_eq!(g.lives, START_LIVES);
        assert_eq!((g.frog.col, g.frog.row), (NUM_COLS / 2, NUM_ROWS - 1));
    }

    #[test]
    fn landing_on_a_taken_refuge_costs_a_life() {
        let mut g = state();
        g.refuges[1] = true;
        g.frog.row = 1;
        g.frog.col = 4;
        g.frog.px = 4.0 * CELL;
        g.move_frog(0, -1);
        assert_eq!(g.lives, START_LIVES - 1);
        assert_eq!(g.refuges, [false, true, false]);
        assert_eq!(g.score, 0);
        assert_eq!((g.frog.col, g.frog.row), (NUM_COLS / 2, NUM_ROWS - 1));
        assert_eq!(g.markers.last().unwrap().cause, DeathCause::RefugeBlocked);
    }

    #[test]
    fn columns_past_the_last_slot_are_a_miss() {
        let mut g = state();
        g.frog.row = 1;
        g.frog.col = 10;
        g.frog.px = 10.0 * CELL;
        g.move_frog(0, -1); // col 10 maps past the last slot
        assert_eq!(g.lives, START_LIVES - 1);
        assert!(g.refuges.iter().all(|&r| !r));
    }

    #[test]
    fn filling_every_refuge_advances_the_level() {
        let mut g = state();
        g.refuges = [true, true, false];
        g.frog.row = 1;
        g.frog.col = 7;
        g.frog.px = 7.0 * CELL;
        g.move_frog(0, -1); // slot 2 completes the row
        assert_eq!(g.level, 2);
        assert_eq!(g.score, REFUGE_BONUS + 2 * LEVEL_BONUS_STEP);
        assert!(g.refuges.iter().all(|&r| !r));
        assert_eq!((g.frog.col, g.frog.row), (NUM_COLS / 2, NUM_ROWS - 1));
    }

    #[test]
    fn water_without_support_drowns_in_one_tick() {
        let mut g = state();
        g.logs.clear();
        g.frog.row = 3;
        g.frog.col = 5;
        g.frog.px = 5.0 * CELL;
        g.tick();
        assert_eq!(g.lives, START_LIVES - 1);
        assert_eq!(g.markers.last().unwrap().cause, DeathCause::Drowned);
        assert_eq!((g.frog.col, g.frog.row), (NUM_COLS / 2, NUM_ROWS - 1));
    }

    #[test]
    fn a_ride_follows_the_log() {
        let mut g = state();
        g.logs.clear();
        let i = place_log(&mut g, 2, 2.0 * CELL, 2.5);
        g.frog.row = 2;
        g.frog.col = 3;
        g.frog.px = 3.0 * CELL;
        g.tick();
        // the log moved first, then the frog rides it
        assert_eq!(g.frog.on_log, Some(i));
        assert_eq!(g.frog.px, 3.0 * CELL + 2.5);
        assert_eq!(g.frog.col, 3); // still rounds to the same column
        assert_eq!(g.lives, START_LIVES);
    }

    #[test]
    fn riding_past_the_edge_is_fatal() {
        let mut g = state();
        g.logs.clear();
        place_log(&mut g, 2, CANVAS_W - LOG_WIDTH, 6.0);
        g.frog.row = 2;
        g.frog.col = NUM_COLS - 1;
        g.frog.px = CANVAS_W - CELL;
        g.tick();
        assert_eq!(g.lives, START_LIVES - 1);
        assert_eq!(g.markers.last().unwrap().cause, DeathCause::SweptAway);
    }

    #[test]
    fn a_car_strike_beats_everything_else() {
        let mut g = state();
        g.frog.row = 7;
        g.frog.col = 0;
        g.frog.px = 0.0;
        // park a car on top of the frog
        g.cars = vec![Obstacle {
            row: 7,
            x: 0.0,
            width: CAR_WIDTH,
            speed: 0.0,
        }];
        g.tick();
        assert_eq!(g.lives, START_LIVES - 1);
        assert_eq!(g.markers.last().unwrap().cause, DeathCause::Vehicle);
    }

    #[test]
    fn first_log_in_creation_order_wins_a_handoff() {
        let mut g = state();
        g.logs.clear();
        let first = place_log(&mut g, 2, 2.0 * CELL, 0.0);
        let _second = place_log(&mut g, 2, 2.0 * CELL, 0.0);
        g.frog.row = 2;
        g.frog.col = 3;
        g.frog.px = 3.0 * CELL;
        g.tick();
        assert_eq!(g.frog.on_log, Some(first));
    }

    #[test]
    fn losing_the_last_life_ends_the_run_and_restart_resets_everything() {
        let mut g = state();
        g.lives = 1;
        g.score = 730;
        g.level = 3;
        g.refuges[0] = true;
        g.logs.clear();
        g.frog.row = 2;
        g.tick(); // drowns
        assert_eq!(g.scene, Scene::GameOver);
        g.apply(PlayerAction::Restart);
        assert_eq!(g.scene, Scene::Playing);
        assert_eq!(g.score, 0);
        assert_eq!(g.level, 1);
        assert_eq!(g.lives, START_LIVES);
        assert!(g.refuges.iter().all(|&r| !r));
        assert!(g.markers.is_empty());
        assert_eq!(g.cars.len(), 4);
        assert_eq!(g.logs.len(), 4);
    }

    #[test]
    fn dead_markers_stay_bounded() {
        let mut g = state();
        g.lives = 1000;
        g.logs.clear();
        for _ in 0..40 {
            g.frog.row = 2; // back onto the water, drown again
            g.tick();
        }
        assert_eq!(g.markers.len(), MARKER_CAP);
    }

    #[test]
    fn markers_expire() {
        let mut g = state();
        g.logs.clear();
        g.frog.row = 2;
        g.tick();
        assert_eq!(g.markers.len(), 1);
        for _ in 0..MARKER_TTL {
            g.tick();
        }
        assert!(g.markers.is_empty());
    }
}
