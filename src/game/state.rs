/// Dimension of the observation vector fed to the value function
pub const STATE_DIM: usize = 4;

/// Number of discrete actions (idle, flap)
pub const NUM_ACTIONS: usize = 2;

/// Observation vector: [dy_norm, vel_norm, pipe_dist_norm, gap_y_norm]
pub type StateVec = [f32; STATE_DIM];

/// An axis-aligned rectangle used for collision tests
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Rectangle of side 2 * half_extent centered on (cx, cy)
    pub fn centered(cx: f32, cy: f32, half_extent: f32) -> Self {
        Self {
            x: cx - half_extent,
            y: cy - half_extent,
            w: half_extent * 2.0,
            h: half_extent * 2.0,
        }
    }

    /// Strict overlap test; touching edges do not count as intersection
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.x + other.w
            && self.x + self.w > other.x
            && self.y < other.y + other.h
            && self.y + self.h > other.y
    }
}

/// A pipe obstacle. The id is unique for the lifetime of an episode so the
/// scored marker survives pipe recycling without identity reuse.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pipe {
    /// Monotonically increasing identifier assigned at spawn
    pub id: u64,
    /// X-coordinate of the pipe's left edge
    pub x: f32,
    /// Y-coordinate of the top of the gap cutout
    pub gap_y: f32,
    /// Whether this pipe has already been evaluated for scoring
    pub scored: bool,
}

impl Pipe {
    pub fn new(id: u64, x: f32, gap_y: f32) -> Self {
        Self {
            id,
            x,
            gap_y,
            scored: false,
        }
    }
}

/// Type of collision that terminated an episode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionKind {
    /// Bird touched the top of the screen
    Ceiling,
    /// Bird touched the ground line
    Ground,
    /// Bird hit a pipe cutout rectangle
    Pipe,
}

/// Complete environment state
#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    pub bird_y: f32,
    pub bird_vel: f32,
    pub pipes: Vec<Pipe>,
    /// Ground-layer scroll offset (full scroll speed)
    pub base_x: f32,
    /// Background-layer scroll offset (half scroll speed)
    pub bg_x: f32,
    pub score: u32,
    pub steps: u32,
    pub done: bool,
    /// Next id to assign to a spawned pipe
    pub next_pipe_id: u64,
}

impl GameState {
    /// Empty state; only meaningful after the environment's `reset`
    pub fn new() -> Self {
        Self {
            bird_y: 0.0,
            bird_vel: 0.0,
            pipes: Vec::new(),
            base_x: 0.0,
            bg_x: 0.0,
            score: 0,
            steps: 0,
            done: false,
            next_pipe_id: 0,
        }
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_intersection() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 5.0, 10.0, 10.0);
        let c = Rect::new(20.0, 20.0, 5.0, 5.0);

        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
        assert!(!a.intersects(&c));
    }

    #[test]
    fn test_rect_touching_edges_do_not_intersect() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(10.0, 0.0, 10.0, 10.0);
        assert!(!a.intersects(&b));
    }

    #[test]
    fn test_rect_centered() {
        let r = Rect::centered(50.0, 50.0, 9.0);
        assert_eq!(r.x, 41.0);
        assert_eq!(r.y, 41.0);
        assert_eq!(r.w, 18.0);
        assert_eq!(r.h, 18.0);
    }

    #[test]
    fn test_pipe_spawns_unscored() {
        let pipe = Pipe::new(7, 500.0, 120.0);
        assert_eq!(pipe.id, 7);
        assert!(!pipe.scored);
    }
}
