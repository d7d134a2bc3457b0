mod confetti;
mod game;
mod image_loader;
mod piece;

use confetti::ConfettiBurst;
use eframe::egui::{self, Align2, Color32, FontId, Pos2, Rect, RichText, Sense, Stroke, Vec2};
use game::{fit_to_area, PuzzleSession};
use image_loader::load_puzzle_image;

const DIFFICULTY_CHOICES: [u32; 7] = [2, 3, 4, 5, 6, 7, 8];
const DEFAULT_DIFFICULTY: u32 = 4;

// Tint alphas for the texture passes: 15% background hint, 30% setup
// preview, 80% for the piece in hand.
const HINT_OPACITY: u8 = 38;
const PREVIEW_OPACITY: u8 = 77;
const DRAG_OPACITY: u8 = 204;

const GRID_OUTLINE: Color32 = Color32::from_rgb(0xa9, 0xa9, 0xa9);
const PLACED_BORDER: Color32 = Color32::from_rgb(0x22, 0xc5, 0x5e);
const DRAG_BORDER: Color32 = Color32::from_rgb(0x3b, 0x82, 0xf6);

const FULL_UV: Rect = Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));

fn main() -> eframe::Result<()> {
    env_logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1024.0, 768.0]),
        ..Default::default()
    };

    eframe::run_native(
        "JigSnap",
        options,
        Box::new(|_cc| Ok(Box::new(JigsawApp::new()))),
    )
}

struct JigsawApp {
    texture: Option<egui::TextureHandle>,
    difficulty: u32,
    session: Option<PuzzleSession>,
    confetti: Option<ConfettiBurst>,
    show_win_dialog: bool,
    start_requested: bool,
    status: String,
}

impl JigsawApp {
    fn new() -> Self {
        Self {
            texture: None,
            difficulty: DEFAULT_DIFFICULTY,
            session: None,
            confetti: None,
            show_win_dialog: false,
            start_requested: false,
            status: "Load an image to build a puzzle.".to_owned(),
        }
    }

    fn load_image(&mut self, ctx: &egui::Context) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Images", &["png", "jpg", "jpeg", "gif", "webp"])
            .pick_file()
        {
            match load_puzzle_image(&path) {
                Ok(loaded) => {
                    self.texture = Some(ctx.load_texture(
                        "puzzle-image",
                        loaded.image,
                        egui::TextureOptions::LINEAR,
                    ));
                    self.session = None;
                    self.status = "Image loaded! Select difficulty and start.".to_owned();
                }
                Err(err) => {
                    log::error!("{err}");
                    self.status = err;
                }
            }
        }
    }

    /// Back to the setup phase. The loaded image and the difficulty
    /// selection survive a reset; the round state does not.
    fn reset(&mut self) {
        self.session = None;
        self.confetti = None;
        self.show_win_dialog = false;
        self.start_requested = false;
        self.status = if self.texture.is_some() {
            "Select difficulty and start.".to_owned()
        } else {
            "Load an image to build a puzzle.".to_owned()
        };
    }

    fn toolbar(&mut self, ctx: &egui::Context, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.add_space(8.0);

            if self.session.is_none() {
                if ui
                    .add(
                        egui::Button::new(RichText::new("🖼").size(24.0))
                            .min_size(Vec2::new(32.0, 32.0))
                            .frame(false),
                    )
                    .on_hover_text("Load Image")
                    .clicked()
                {
                    self.load_image(ctx);
                }

                egui::ComboBox::from_id_salt("difficulty")
                    .selected_text(format!("{0}×{0}", self.difficulty))
                    .show_ui(ui, |ui| {
                        for choice in DIFFICULTY_CHOICES {
                            ui.selectable_value(
                                &mut self.difficulty,
                                choice,
                                format!("{choice}×{choice}"),
                            );
                        }
                    });

                if ui
                    .add_enabled(self.texture.is_some(), egui::Button::new("▶ Start"))
                    .clicked()
                {
                    self.start_requested = true;
                }
            } else if ui
                .button("↺ Restart")
                .on_hover_text("Abandon this round")
                .clicked()
            {
                self.reset();
            }

            ui.separator();
            ui.label(&self.status);
        });
    }
}

impl eframe::App for JigsawApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::top("toolbar")
            .frame(
                egui::Frame::default()
                    .fill(Color32::from_rgb(30, 30, 30))
                    .inner_margin(4.0),
            )
            .show(ctx, |ui| {
                self.toolbar(ctx, ui);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            let available = ui.available_size();
            let (canvas_rect, response) = ui.allocate_exact_size(available, Sense::drag());
            let painter = ui.painter_at(canvas_rect);

            if self.start_requested {
                self.start_requested = false;
                if let Some(texture) = &self.texture {
                    let fit = fit_to_area(texture.size_vec2(), canvas_rect.size());
                    self.session = Some(PuzzleSession::new(
                        fit,
                        self.difficulty,
                        fit,
                        &mut rand::thread_rng(),
                    ));
                    self.status = "Drag the pieces to solve the puzzle!".to_owned();
                }
            }

            match (&self.texture, &mut self.session) {
                (Some(texture), Some(session)) => {
                    let puzzle_size = session.puzzle_size();
                    let origin =
                        canvas_rect.min + (canvas_rect.size() - puzzle_size) * 0.5;

                    if session.is_active() {
                        if response.drag_started_by(egui::PointerButton::Primary) {
                            if let Some(pointer) = response.interact_pointer_pos() {
                                session.pointer_down(to_puzzle_space(pointer, origin));
                            }
                        }
                        if response.dragged_by(egui::PointerButton::Primary) {
                            if let Some(pointer) = response.interact_pointer_pos() {
                                session.pointer_move(to_puzzle_space(pointer, origin));
                            }
                        }
                        if response.drag_stopped_by(egui::PointerButton::Primary) {
                            let outcome = session.pointer_up();
                            if outcome.solved {
                                self.show_win_dialog = true;
                                self.confetti = Some(ConfettiBurst::new(
                                    canvas_rect,
                                    &mut rand::thread_rng(),
                                ));
                                self.status = "Solved! Well done.".to_owned();
                            }
                        }
                        // Render while active; once the session goes
                        // inactive nothing reschedules the loop.
                        ctx.request_repaint();
                    }

                    draw_session(&painter, texture, session, origin);
                }
                (Some(texture), None) => {
                    let fit = fit_to_area(texture.size_vec2(), canvas_rect.size());
                    let origin = canvas_rect.min + (canvas_rect.size() - fit) * 0.5;
                    painter.image(
                        texture.id(),
                        Rect::from_min_size(origin, fit),
                        FULL_UV,
                        Color32::from_white_alpha(PREVIEW_OPACITY),
                    );
                }
                (None, _) => {
                    painter.text(
                        canvas_rect.center(),
                        Align2::CENTER_CENTER,
                        "Load an image to build a puzzle",
                        FontId::proportional(20.0),
                        Color32::GRAY,
                    );
                }
            }

            if let Some(mut burst) = self.confetti.take() {
                let dt = ctx.input(|i| i.unstable_dt).max(0.0);
                if burst.advance(dt) {
                    burst.draw(&painter);
                    ctx.request_repaint();
                    self.confetti = Some(burst);
                }
            }
        });

        if self.show_win_dialog {
            egui::Window::new("🎉 Puzzle solved!")
                .anchor(Align2::CENTER_CENTER, Vec2::ZERO)
                .collapsible(false)
                .resizable(false)
                .show(ctx, |ui| {
                    let count = self
                        .session
                        .as_ref()
                        .map(|session| session.pieces().len())
                        .unwrap_or_default();
                    ui.label(format!("All {count} pieces are in place."));
                    ui.add_space(8.0);
                    if ui.button("Play Again").clicked() {
                        self.reset();
                    }
                });
        }
    }
}

fn to_puzzle_space(pointer: Pos2, origin: Pos2) -> Pos2 {
    pointer - origin.to_vec2()
}

/// One frame of the play area: faded hint image, grid outline, every
/// piece in draw order, and the dragged piece once more on top.
fn draw_session(
    painter: &egui::Painter,
    texture: &egui::TextureHandle,
    session: &PuzzleSession,
    origin: Pos2,
) {
    let puzzle_size = session.puzzle_size();
    let piece_size = session.piece_size();
    let puzzle_rect = Rect::from_min_size(origin, puzzle_size);

    painter.image(
        texture.id(),
        puzzle_rect,
        FULL_UV,
        Color32::from_white_alpha(HINT_OPACITY),
    );
    painter.rect_stroke(puzzle_rect, 0.0, Stroke::new(1.0, GRID_OUTLINE));

    for piece in session.pieces() {
        let rect = piece.rect(piece_size).translate(origin.to_vec2());
        painter.image(
            texture.id(),
            rect,
            piece.uv(piece_size, puzzle_size),
            Color32::WHITE,
        );
        let stroke = if piece.placed {
            Stroke::new(3.0, PLACED_BORDER)
        } else {
            Stroke::new(1.0, Color32::BLACK)
        };
        painter.rect_stroke(rect, 0.0, stroke);
    }

    if let Some(piece) = session.dragged_piece() {
        let rect = piece.rect(piece_size).translate(origin.to_vec2());
        painter.image(
            texture.id(),
            rect,
            piece.uv(piece_size, puzzle_size),
            Color32::from_white_alpha(DRAG_OPACITY),
        );
        painter.rect_stroke(rect, 0.0, Stroke::new(3.0, DRAG_BORDER));
    }
}
