use std::time::Duration;

use super::math::{RectF, SizeF};

/// Playback direction across the columns of a sprite-sheet row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationDirection {
    Forward,
    Backward,
}

/// Row selector into a sprite-sheet; one row per facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationRow {
    WalkUp,
    WalkRight,
    WalkDown,
    WalkLeft,
}

impl AnimationRow {
    pub const fn index(self) -> u32 {
        match self {
            AnimationRow::WalkUp => 0,
            AnimationRow::WalkRight => 1,
            AnimationRow::WalkDown => 2,
            AnimationRow::WalkLeft => 3,
        }
    }
}

/// Static playback parameters for a sprite-sheet animation. `frame_count`
/// is derived at content-load time from the sheet width over frame width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationDef {
    pub frame_size: SizeF,
    pub frame_duration: Duration,
    pub frame_count: u32,
    pub loop_playback: bool,
    pub cycle_directions: bool,
}

impl AnimationDef {
    pub fn new(frame_size: SizeF) -> Self {
        Self {
            frame_size,
            frame_duration: Duration::ZERO,
            frame_count: 1,
            loop_playback: false,
            cycle_directions: false,
        }
    }
}

/// Frame/row/direction/timer state driving sprite-sheet playback.
#[derive(Debug, Clone)]
pub struct AnimationState {
    def: AnimationDef,
    current_frame: u32,
    direction: AnimationDirection,
    row: AnimationRow,
    timer: Duration,
    playing: bool,
}

impl AnimationState {
    pub fn new(frame_size: SizeF) -> Self {
        Self {
            def: AnimationDef::new(frame_size),
            current_frame: 0,
            direction: AnimationDirection::Forward,
            row: AnimationRow::WalkDown,
            timer: Duration::ZERO,
            playing: false,
        }
    }

    pub fn def(&self) -> &AnimationDef {
        &self.def
    }

    pub fn def_mut(&mut self) -> &mut AnimationDef {
        &mut self.def
    }

    pub fn current_frame(&self) -> u32 {
        self.current_frame
    }

    pub fn direction(&self) -> AnimationDirection {
        self.direction
    }

    pub fn row(&self) -> AnimationRow {
        self.row
    }

    pub fn playing(&self) -> bool {
        self.playing
    }

    /// Switching rows repositions the sample rectangle immediately; it does
    /// not wait for the frame timer.
    pub fn set_row(&mut self, row: AnimationRow) {
        self.row = row;
    }

    pub fn play(&mut self, loop_playback: bool, cycle_directions: bool) {
        self.playing = true;
        self.def.loop_playback = loop_playback;
        self.def.cycle_directions = cycle_directions;
    }

    /// Freezes playback on the current frame.
    pub fn pause(&mut self) {
        self.playing = false;
    }

    /// Halts playback and rewinds to the first frame.
    pub fn stop(&mut self) {
        self.playing = false;
        self.current_frame = 0;
        self.timer = Duration::ZERO;
    }

    /// Advances the frame timer by `dt`, stepping at most one frame per
    /// tick. A zero frame duration advances every tick while playing.
    pub fn advance(&mut self, dt: Duration) {
        self.timer += dt;
        if self.playing && self.timer >= self.def.frame_duration {
            self.timer = Duration::ZERO;
            self.step();
        }
    }

    /// Source sample rectangle for the current frame and row, in sheet
    /// pixel coordinates.
    pub fn source_rect(&self) -> RectF {
        RectF::new(
            self.current_frame as f32 * self.def.frame_size.width,
            self.row.index() as f32 * self.def.frame_size.height,
            self.def.frame_size.width,
            self.def.frame_size.height,
        )
    }

    fn step(&mut self) {
        match self.direction {
            AnimationDirection::Forward => {
                if self.current_frame + 1 < self.def.frame_count {
                    self.current_frame += 1;
                } else if self.def.cycle_directions {
                    self.direction = AnimationDirection::Backward;
                    self.current_frame = self.current_frame.saturating_sub(1);
                } else {
                    self.current_frame = 0;
                    if !self.def.loop_playback {
                        self.stop();
                    }
                }
            }
            AnimationDirection::Backward => {
                if self.current_frame > 0 {
                    self.current_frame -= 1;
                } else if self.def.cycle_directions && self.def.loop_playback {
                    self.direction = AnimationDirection::Forward;
                    if self.def.frame_count > 1 {
                        self.current_frame = 1;
                    }
                } else {
                    self.stop();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn playing_state(frame_count: u32, duration_ms: u64, loop_playback: bool, cycle: bool) -> AnimationState {
        let mut state = AnimationState::new(SizeF::new(64.0, 64.0));
        state.def_mut().frame_count = frame_count;
        state.def_mut().frame_duration = Duration::from_millis(duration_ms);
        state.play(loop_playback, cycle);
        state
    }

    #[test]
    fn progression_matches_elapsed_time() {
        let mut state = playing_state(4, 100, true, false);

        for _ in 0..7 {
            state.advance(Duration::from_millis(50));
        }

        // 350ms at 100ms per frame: three full frame advances, 50ms residual.
        assert_eq!(state.current_frame(), 3);
        assert!(state.playing());
    }

    #[test]
    fn looping_wraps_back_to_first_frame() {
        let mut state = playing_state(4, 100, true, false);

        for _ in 0..4 {
            state.advance(Duration::from_millis(100));
        }

        assert_eq!(state.current_frame(), 0);
        assert!(state.playing());
    }

    #[test]
    fn non_looping_animation_stops_after_last_frame() {
        let mut state = playing_state(3, 100, false, false);

        for _ in 0..3 {
            state.advance(Duration::from_millis(100));
        }

        assert_eq!(state.current_frame(), 0);
        assert!(!state.playing());
    }

    #[test]
    fn cycle_directions_bounces_at_last_frame() {
        let mut state = playing_state(3, 100, true, true);

        state.advance(Duration::from_millis(100));
        state.advance(Duration::from_millis(100));
        assert_eq!(state.current_frame(), 2);

        state.advance(Duration::from_millis(100));
        assert_eq!(state.current_frame(), 1);
        assert_eq!(state.direction(), AnimationDirection::Backward);
    }

    #[test]
    fn backward_without_loop_stops_at_frame_zero() {
        let mut state = playing_state(3, 100, false, true);

        for _ in 0..5 {
            state.advance(Duration::from_millis(100));
        }
        // 0 -> 1 -> 2 -> bounce to 1 -> 0 -> stop.
        assert_eq!(state.current_frame(), 0);
        assert!(!state.playing());
    }

    #[test]
    fn backward_with_loop_bounces_forward_again() {
        let mut state = playing_state(3, 100, true, true);

        for _ in 0..5 {
            state.advance(Duration::from_millis(100));
        }
        assert_eq!(state.current_frame(), 1);
        assert_eq!(state.direction(), AnimationDirection::Forward);
        assert!(state.playing());
    }

    #[test]
    fn zero_frame_duration_advances_every_tick() {
        let mut state = playing_state(4, 0, true, false);

        state.advance(Duration::ZERO);
        state.advance(Duration::ZERO);

        assert_eq!(state.current_frame(), 2);
    }

    #[test]
    fn pause_freezes_position_and_stop_rewinds() {
        let mut state = playing_state(4, 100, true, false);
        state.advance(Duration::from_millis(100));
        assert_eq!(state.current_frame(), 1);

        state.pause();
        state.advance(Duration::from_millis(500));
        assert_eq!(state.current_frame(), 1);

        state.stop();
        assert_eq!(state.current_frame(), 0);
        assert!(!state.playing());
    }

    #[test]
    fn row_change_moves_source_rect_immediately() {
        let mut state = playing_state(4, 100, true, false);
        assert_eq!(state.source_rect().y, AnimationRow::WalkDown.index() as f32 * 64.0);

        state.set_row(AnimationRow::WalkLeft);
        assert_eq!(state.source_rect().y, AnimationRow::WalkLeft.index() as f32 * 64.0);
    }

    #[test]
    fn timer_does_not_carry_between_frames() {
        let mut state = playing_state(4, 100, true, false);

        // A single oversized tick still advances exactly one frame.
        state.advance(Duration::from_millis(250));
        assert_eq!(state.current_frame(), 1);
    }
}
