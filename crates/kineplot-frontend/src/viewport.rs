//! Painted 3D Viewport
//!
//! Projects the scene's artists on the CPU and paints them with egui,
//! back to front. Dragging orbits the camera, scrolling zooms, and
//! pointer position feeds the scene's hover annotation.

use egui::{Color32, Pos2, Sense, Shape, Stroke};
use glam::DVec2;

use kineplot_renderer::{Color, ProjectedArtist, Projection, Scene};

const BACKGROUND: Color32 = Color32::from_rgb(24, 26, 30);

/// Degrees of camera orbit per dragged pixel.
const ORBIT_SPEED: f64 = 0.4;

/// Paint the scene into the available space and handle camera input.
pub fn show(ui: &mut egui::Ui, scene: &mut Scene) -> egui::Response {
    let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());

    if response.dragged() {
        let delta = response.drag_delta();
        scene
            .axes
            .camera
            .orbit(-delta.x as f64 * ORBIT_SPEED, delta.y as f64 * ORBIT_SPEED);
    }
    if response.hovered() {
        let scroll = ui.input(|i| i.smooth_scroll_delta.y);
        if scroll != 0.0 {
            scene.axes.camera.zoom(1.0 - scroll as f64 * 0.002);
        }
    }

    let projection = Projection::new(
        &scene.axes.camera,
        DVec2::new(rect.min.x as f64, rect.min.y as f64),
        DVec2::new(rect.width() as f64, rect.height() as f64),
    );

    if let Some(pos) = response.hover_pos() {
        let cursor = DVec2::new(pos.x as f64, pos.y as f64);
        if scene.handle_pointer_move(cursor, &projection) {
            ui.ctx().request_repaint();
        }
    }

    let painter = ui.painter_at(rect);
    painter.rect_filled(rect, 0.0, BACKGROUND);

    for artist in scene.projected_artists(&projection) {
        paint_artist(&painter, &artist);
    }
    paint_annotation(&painter, scene);

    response
}

fn paint_artist(painter: &egui::Painter, artist: &ProjectedArtist) {
    let color = color32(artist.style.color);
    let stroke = Stroke::new(artist.style.width, color);
    let points: Vec<Pos2> = artist
        .path
        .iter()
        .map(|p| Pos2::new(p.x as f32, p.y as f32))
        .collect();
    match points.len() {
        0 => {}
        // A single point is a dot marker sized by the stroke width.
        1 => {
            painter.circle_filled(points[0], artist.style.width, color);
        }
        _ => {
            if artist.arrow {
                paint_arrow_head(painter, &points, color);
            }
            painter.add(Shape::line(points, stroke));
        }
    }
}

/// A filled triangular head at the last point of the path.
fn paint_arrow_head(painter: &egui::Painter, points: &[Pos2], color: Color32) {
    let [.., tail, tip] = points else {
        return;
    };
    let shaft = egui::Vec2::new(tip.x - tail.x, tip.y - tail.y);
    let length = shaft.length();
    if length < 1e-3 {
        return;
    }
    let dir = shaft / length;
    let head = (length * 0.25).min(12.0);
    let normal = egui::Vec2::new(-dir.y, dir.x);
    let left = *tip - dir * head + normal * head * 0.5;
    let right = *tip - dir * head - normal * head * 0.5;
    painter.add(Shape::convex_polygon(
        vec![*tip, left, right],
        color,
        Stroke::NONE,
    ));
}

fn paint_annotation(painter: &egui::Painter, scene: &Scene) {
    let annotation = scene.annotation();
    if !annotation.visible {
        return;
    }
    let anchor = Pos2::new(
        annotation.screen_pos.x as f32,
        annotation.screen_pos.y as f32,
    ) + egui::vec2(12.0, -12.0);
    let font = egui::FontId::proportional(13.0);
    let galley = painter.layout_no_wrap(annotation.text.clone(), font, Color32::WHITE);
    let padding = egui::vec2(6.0, 4.0);
    let bubble = egui::Rect::from_min_size(anchor, galley.size() + padding * 2.0);
    painter.rect_filled(bubble, 4.0, Color32::from_rgba_unmultiplied(0, 0, 0, 200));
    painter.rect_stroke(bubble, 4.0, Stroke::new(1.0, Color32::GRAY));
    painter.galley(bubble.min + padding, galley, Color32::WHITE);
}

fn color32(color: Color) -> Color32 {
    Color32::from_rgba_unmultiplied(
        (color.r * 255.0) as u8,
        (color.g * 255.0) as u8,
        (color.b * 255.0) as u8,
        (color.a * 255.0) as u8,
    )
}
