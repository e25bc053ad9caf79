//! Painting a [`Scene`] with egui

use egui::{vec2, Align2, Color32, FontId, Painter, Rect};

use crate::gradient::Rgba;
use crate::scene::{self, Primitive, Scene};

/// Font size of strip messages, in points
const MESSAGE_FONT_SIZE: f32 = 16.0;

pub fn to_color32(color: Rgba) -> Color32 {
    Color32::from_rgba_unmultiplied(color.r, color.g, color.b, color.a)
}

fn to_rect(rect: &scene::Rect, origin: egui::Pos2) -> Rect {
    Rect::from_min_size(
        origin + vec2(rect.x, rect.y),
        vec2(rect.width, rect.height),
    )
}

/// Draw every primitive, offset by the painter's clip origin
pub fn paint_scene(painter: &Painter, scene: &Scene) {
    let origin = painter.clip_rect().min;

    for primitive in &scene.primitives {
        match primitive {
            Primitive::FillRect { rect, color } => {
                painter.rect_filled(to_rect(rect, origin), 0.0, to_color32(*color));
            }
            Primitive::Column { x, height, color } => {
                let column = Rect::from_min_size(origin + vec2(*x, 0.0), vec2(1.0, *height));
                painter.rect_filled(column, 0.0, to_color32(*color));
            }
            Primitive::Text {
                center,
                text,
                color,
            } => {
                painter.text(
                    origin + vec2(center.0, center.1),
                    Align2::CENTER_CENTER,
                    text,
                    FontId::proportional(MESSAGE_FONT_SIZE),
                    to_color32(*color),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::pos2;

    #[test]
    fn test_color_conversion() {
        assert_eq!(to_color32(Rgba::new(255, 0, 0, 255)), Color32::RED);
        assert_eq!(to_color32(Rgba::TRANSPARENT), Color32::TRANSPARENT);
        let translucent = to_color32(Rgba::new(0, 255, 0, 150));
        assert_eq!(translucent.a(), 150);
    }

    #[test]
    fn test_rect_offset() {
        let rect = scene::Rect {
            x: 10.0,
            y: 0.0,
            width: 5.0,
            height: 100.0,
        };
        let egui_rect = to_rect(&rect, pos2(100.0, 50.0));
        assert_eq!(egui_rect.min, pos2(110.0, 50.0));
        assert_eq!(egui_rect.size(), vec2(5.0, 100.0));
    }
}
