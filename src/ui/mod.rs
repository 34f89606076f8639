use eframe::egui::Color32;
use palette::Srgb;

pub mod panels;
pub mod plot;

pub fn to_color32(c: Srgb<u8>) -> Color32 {
    Color32::from_rgb(c.red, c.green, c.blue)
}
