use egui::{pos2, vec2, Pos2, Vec2};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::piece::Piece;

/// A drag release within this fraction of the piece width (per axis)
/// snaps the piece onto its slot.
pub const SNAP_TOLERANCE_RATIO: f32 = 0.2;

/// What a drag release amounted to. The shell uses `solved` to open the
/// win dialog and fire the confetti burst.
pub struct ReleaseOutcome {
    pub snapped: bool,
    pub solved: bool,
}

/// One round of the puzzle: the piece collection plus the drag state
/// machine. Built fresh on every start, discarded on reset.
///
/// Array order is draw order. The dragged piece, if any, is always the
/// last element; that is the whole z-order mechanism.
pub struct PuzzleSession {
    pieces: Vec<Piece>,
    piece_size: Vec2,
    puzzle_size: Vec2,
    canvas_size: Vec2,
    /// Pointer-to-origin offset of the piece being dragged.
    drag: Option<Vec2>,
    active: bool,
}

impl PuzzleSession {
    /// Slices the puzzle into `difficulty`² pieces and scatters them.
    /// Dimensions are taken at face value; degenerate inputs produce
    /// degenerate pieces.
    pub fn new<R: Rng>(
        puzzle_size: Vec2,
        difficulty: u32,
        canvas_size: Vec2,
        rng: &mut R,
    ) -> Self {
        let piece_size = vec2(
            (puzzle_size.x / difficulty as f32).floor(),
            (puzzle_size.y / difficulty as f32).floor(),
        );

        let mut pieces = Vec::with_capacity((difficulty * difficulty) as usize);
        for y in 0..difficulty {
            for x in 0..difficulty {
                pieces.push(Piece::new(pos2(
                    x as f32 * piece_size.x,
                    y as f32 * piece_size.y,
                )));
            }
        }

        let mut session = Self {
            pieces,
            piece_size,
            puzzle_size,
            canvas_size,
            drag: None,
            active: true,
        };
        session.scatter(rng);
        session
    }

    /// Fisher-Yates permutation of the draw order, then a uniform
    /// random position for every piece within the canvas bounds.
    fn scatter<R: Rng>(&mut self, rng: &mut R) {
        self.pieces.shuffle(rng);

        let span_x = self.canvas_size.x - self.piece_size.x;
        let span_y = self.canvas_size.y - self.piece_size.y;
        for piece in &mut self.pieces {
            piece.current = pos2(scatter_coord(rng, span_x), scatter_coord(rng, span_y));
            piece.placed = false;
        }
    }

    /// Hit-tests from the topmost piece down. The hit piece becomes the
    /// drag target and moves to the end of the draw order.
    pub fn pointer_down(&mut self, pos: Pos2) {
        if !self.active {
            return;
        }
        for index in (0..self.pieces.len()).rev() {
            let piece = &self.pieces[index];
            if !piece.placed && piece.contains(pos, self.piece_size) {
                self.drag = Some(pos - self.pieces[index].current);
                let grabbed = self.pieces.remove(index);
                self.pieces.push(grabbed);
                return;
            }
        }
    }

    /// Moves the dragged piece with the pointer. No bounds clamping.
    pub fn pointer_move(&mut self, pos: Pos2) {
        if let Some(offset) = self.drag {
            if let Some(piece) = self.pieces.last_mut() {
                piece.current = pos - offset;
            }
        }
    }

    /// Ends the drag, snapping the piece if it landed close enough to
    /// its slot, and runs the win check.
    pub fn pointer_up(&mut self) -> ReleaseOutcome {
        let mut snapped = false;
        if self.drag.take().is_some() {
            let tolerance = self.piece_size.x * SNAP_TOLERANCE_RATIO;
            if let Some(piece) = self.pieces.last_mut() {
                let dx = (piece.current.x - piece.correct.x).abs();
                let dy = (piece.current.y - piece.correct.y).abs();
                if dx < tolerance && dy < tolerance {
                    piece.current = piece.correct;
                    piece.placed = true;
                    snapped = true;
                }
            }
            if self.is_solved() {
                self.active = false;
            }
        }
        ReleaseOutcome {
            snapped,
            solved: self.is_solved(),
        }
    }

    /// True iff every piece sits locked on its slot.
    pub fn is_solved(&self) -> bool {
        self.pieces.iter().all(|piece| piece.placed)
    }

    /// The render loop keeps rescheduling only while this holds.
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    pub fn piece_size(&self) -> Vec2 {
        self.piece_size
    }

    pub fn puzzle_size(&self) -> Vec2 {
        self.puzzle_size
    }

    /// The piece under the pointer, if a drag is in flight. Always the
    /// last element of the draw order.
    pub fn dragged_piece(&self) -> Option<&Piece> {
        if self.drag.is_some() {
            self.pieces.last()
        } else {
            None
        }
    }
}

fn scatter_coord<R: Rng>(rng: &mut R, span: f32) -> f32 {
    if span > 0.0 {
        rng.gen_range(0.0..span)
    } else {
        0.0
    }
}

/// Largest size with the image's aspect ratio fitting into 95% of the
/// available area.
pub fn fit_to_area(image_size: Vec2, area: Vec2) -> Vec2 {
    let max_w = area.x * 0.95;
    let max_h = area.y * 0.95;
    let aspect = image_size.x / image_size.y;
    if max_w / aspect <= max_h {
        vec2(max_w, max_w / aspect)
    } else {
        vec2(max_h * aspect, max_h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::BTreeSet;

    fn session(difficulty: u32) -> PuzzleSession {
        let mut rng = StdRng::seed_from_u64(7);
        PuzzleSession::new(vec2(400.0, 400.0), difficulty, vec2(400.0, 400.0), &mut rng)
    }

    fn source_keys(session: &PuzzleSession) -> BTreeSet<(i64, i64)> {
        session
            .pieces()
            .iter()
            .map(|p| (p.source.x as i64, p.source.y as i64))
            .collect()
    }

    /// The slot of the topmost still-loose piece. Grabbing that piece
    /// by its center is deterministic even when scattered pieces
    /// overlap: everything above it in the draw order is placed and
    /// therefore not hit-testable.
    fn topmost_loose_correct(session: &PuzzleSession) -> Pos2 {
        session
            .pieces()
            .iter()
            .rev()
            .find(|p| !p.placed)
            .map(|p| p.correct)
            .expect("a loose piece")
    }

    /// Drags the topmost loose piece onto `target` and releases.
    fn drag_topmost_loose_to(session: &mut PuzzleSession, target: Pos2) -> ReleaseOutcome {
        let size = session.piece_size();
        let grab = session
            .pieces()
            .iter()
            .rev()
            .find(|p| !p.placed)
            .map(|p| p.current + size * 0.5)
            .expect("a loose piece");
        session.pointer_down(grab);
        session.pointer_move(target + size * 0.5);
        session.pointer_up()
    }

    #[test]
    fn grid_builder_tiles_the_puzzle_exactly() {
        for difficulty in [2_u32, 3, 4, 5, 7] {
            let session = session(difficulty);
            assert_eq!(
                session.pieces().len(),
                (difficulty * difficulty) as usize,
                "difficulty {difficulty}"
            );

            let size = session.piece_size();
            assert_eq!(size.x, (400.0 / difficulty as f32).floor());
            assert_eq!(size.y, (400.0 / difficulty as f32).floor());

            // Every grid cell appears exactly once, shuffle or not.
            let mut expected = BTreeSet::new();
            for y in 0..difficulty {
                for x in 0..difficulty {
                    expected.insert((
                        (x as f32 * size.x) as i64,
                        (y as f32 * size.y) as i64,
                    ));
                }
            }
            assert_eq!(source_keys(&session), expected);
        }
    }

    #[test]
    fn floor_division_leaves_the_remainder_unused() {
        let mut rng = StdRng::seed_from_u64(1);
        let session = PuzzleSession::new(vec2(410.0, 415.0), 4, vec2(410.0, 415.0), &mut rng);
        assert_eq!(session.piece_size(), vec2(102.0, 103.0));
    }

    #[test]
    fn scatter_keeps_pieces_inside_the_canvas() {
        let session = session(4);
        let size = session.piece_size();
        for piece in session.pieces() {
            assert!(piece.current.x >= 0.0 && piece.current.x < 400.0 - size.x);
            assert!(piece.current.y >= 0.0 && piece.current.y < 400.0 - size.y);
            assert!(!piece.placed);
        }
    }

    #[test]
    fn scatter_with_no_slack_parks_pieces_at_the_origin() {
        let mut rng = StdRng::seed_from_u64(3);
        let session = PuzzleSession::new(vec2(100.0, 100.0), 1, vec2(100.0, 100.0), &mut rng);
        assert_eq!(session.pieces()[0].current, pos2(0.0, 0.0));
    }

    #[test]
    fn release_within_tolerance_snaps_and_locks() {
        let mut session = session(4);
        let tolerance = session.piece_size().x * SNAP_TOLERANCE_RATIO;

        let correct = topmost_loose_correct(&session);
        let outcome = drag_topmost_loose_to(
            &mut session,
            correct + vec2(tolerance * 0.5, -tolerance * 0.5),
        );
        assert!(outcome.snapped);

        let placed = session.pieces().last().unwrap();
        assert_eq!(placed.current, placed.correct);
        assert!(placed.placed);
    }

    #[test]
    fn release_outside_tolerance_leaves_the_piece_where_it_was_dropped() {
        let mut session = session(4);
        let tolerance = session.piece_size().x * SNAP_TOLERANCE_RATIO;

        let correct = topmost_loose_correct(&session);
        let target = correct + vec2(tolerance * 1.5, tolerance * 1.5);
        let outcome = drag_topmost_loose_to(&mut session, target);
        assert!(!outcome.snapped);
        assert!(!outcome.solved);

        let dropped = session.pieces().last().unwrap();
        assert_eq!(dropped.current, target);
        assert!(!dropped.placed);
    }

    #[test]
    fn one_axis_within_tolerance_is_not_enough() {
        let mut session = session(4);
        let tolerance = session.piece_size().x * SNAP_TOLERANCE_RATIO;

        let correct = topmost_loose_correct(&session);
        let outcome =
            drag_topmost_loose_to(&mut session, correct + vec2(0.0, tolerance * 2.0));
        assert!(!outcome.snapped);
    }

    #[test]
    fn win_fires_only_after_the_last_placement() {
        let mut session = session(2);
        assert!(!session.is_solved());

        for expected_remaining in (1..=4_usize).rev() {
            // Solve one piece exactly: the session reports solved only
            // once nothing is loose anymore.
            let correct = topmost_loose_correct(&session);
            let outcome = drag_topmost_loose_to(&mut session, correct);
            assert!(outcome.snapped);

            let solved_now = expected_remaining == 1;
            assert_eq!(outcome.solved, solved_now);
            assert_eq!(session.is_solved(), solved_now);
            assert_eq!(session.is_active(), !solved_now);
        }
    }

    #[test]
    fn win_predicate_is_idempotent() {
        let mut session = session(2);
        assert_eq!(session.is_solved(), session.is_solved());

        while !session.is_solved() {
            let correct = topmost_loose_correct(&session);
            drag_topmost_loose_to(&mut session, correct);
        }
        assert!(session.is_solved());
        assert!(session.is_solved());
    }

    #[test]
    fn placed_pieces_are_not_selectable() {
        let mut session = session(2);
        let size = session.piece_size();

        let correct = topmost_loose_correct(&session);
        drag_topmost_loose_to(&mut session, correct);

        // Park the loose pieces away from the placed one so the probe
        // point can only fall on the placed piece.
        for piece in &mut session.pieces {
            if !piece.placed {
                piece.current = pos2(1000.0, 1000.0);
            }
        }

        session.pointer_down(correct + size * 0.5);
        assert!(session.dragged_piece().is_none());
    }

    #[test]
    fn pointer_down_picks_the_topmost_piece_and_raises_it() {
        let mut session = session(3);

        // Stack every piece on the same spot; the last one wins the hit.
        for piece in &mut session.pieces {
            piece.current = pos2(50.0, 50.0);
        }
        let top_source = session.pieces.last().unwrap().source;

        session.pointer_down(pos2(60.0, 60.0));
        let dragged = session.dragged_piece().expect("a drag in flight");
        assert_eq!(dragged.source, top_source);
        assert_eq!(session.pieces.last().unwrap().source, top_source);
    }

    #[test]
    fn selection_moves_the_piece_to_the_end_of_the_draw_order() {
        let mut session = session(3);
        for piece in &mut session.pieces {
            piece.current = pos2(500.0, 500.0);
        }
        session.pieces[0].current = pos2(10.0, 10.0);
        let bottom_source = session.pieces[0].source;

        session.pointer_down(pos2(15.0, 15.0));
        assert_eq!(session.pieces.last().unwrap().source, bottom_source);
    }

    #[test]
    fn dragging_tracks_the_grab_offset() {
        let mut session = session(2);
        let grabbed_at = session.pieces[0].current;
        for piece in &mut session.pieces[1..] {
            piece.current = pos2(700.0, 700.0);
        }

        let grab = grabbed_at + vec2(3.0, 5.0);
        session.pointer_down(grab);
        session.pointer_move(pos2(200.0, 100.0));

        let dragged = session.dragged_piece().unwrap();
        assert_eq!(dragged.current, pos2(197.0, 95.0));
    }

    #[test]
    fn missing_every_piece_keeps_the_controller_idle() {
        let mut session = session(2);
        for piece in &mut session.pieces {
            piece.current = pos2(300.0, 300.0);
        }

        session.pointer_down(pos2(1.0, 1.0));
        assert!(session.dragged_piece().is_none());

        // A stray move or release without a selection is a no-op.
        session.pointer_move(pos2(50.0, 50.0));
        let outcome = session.pointer_up();
        assert!(!outcome.snapped);
        assert!(session.pieces.iter().all(|p| p.current == pos2(300.0, 300.0)));
    }

    #[test]
    fn a_solved_session_ignores_further_input() {
        let mut session = session(2);
        while !session.is_solved() {
            let correct = topmost_loose_correct(&session);
            drag_topmost_loose_to(&mut session, correct);
        }
        assert!(!session.is_active());

        let size = session.piece_size();
        let over_a_piece = session.pieces[0].correct + size * 0.5;
        session.pointer_down(over_a_piece);
        assert!(session.dragged_piece().is_none());
    }

    #[test]
    fn fit_to_area_respects_aspect_and_margins() {
        // Wide image in a square area: width-bound.
        let fit = fit_to_area(vec2(2000.0, 1000.0), vec2(1000.0, 1000.0));
        assert_eq!(fit, vec2(950.0, 475.0));

        // Tall image in the same area: height-bound.
        let fit = fit_to_area(vec2(500.0, 1000.0), vec2(1000.0, 1000.0));
        assert_eq!(fit, vec2(475.0, 950.0));
    }
}
