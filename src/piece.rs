use egui::{Pos2, Rect, Vec2};

/// One jigsaw fragment. All pieces of a session share the same size,
/// which lives on the session; a piece only carries its positions.
pub struct Piece {
    /// Top-left of the piece's region in the scaled puzzle image.
    pub source: Pos2,
    /// Where the piece currently sits on the canvas.
    pub current: Pos2,
    /// Where the piece belongs. Equal to `source`: the grid layout of
    /// the image is preserved on the board.
    pub correct: Pos2,
    /// Locked onto its slot. Never cleared within a session.
    pub placed: bool,
}

impl Piece {
    pub fn new(source: Pos2) -> Self {
        Self {
            source,
            current: Pos2::ZERO,
            correct: source,
            placed: false,
        }
    }

    pub fn rect(&self, size: Vec2) -> Rect {
        Rect::from_min_size(self.current, size)
    }

    /// Strict hit test: points on the edge do not hit.
    pub fn contains(&self, point: Pos2, size: Vec2) -> bool {
        point.x > self.current.x
            && point.x < self.current.x + size.x
            && point.y > self.current.y
            && point.y < self.current.y + size.y
    }

    /// UV sub-rectangle of this piece within the full puzzle texture.
    pub fn uv(&self, size: Vec2, puzzle_size: Vec2) -> Rect {
        let min = Pos2::new(self.source.x / puzzle_size.x, self.source.y / puzzle_size.y);
        let max = Pos2::new(
            (self.source.x + size.x) / puzzle_size.x,
            (self.source.y + size.y) / puzzle_size.y,
        );
        Rect::from_min_max(min, max)
    }
}
