use colored::Color;

pub const PRIMARY: Color = Color::TrueColor { r: 102, g: 204, b: 255 };
pub const ACCENT: Color = Color::TrueColor { r: 255, g: 196, b: 87 };
pub const SEPARATOR: Color = Color::BrightBlack;
pub const TEXT_DEFAULT: Color = Color::TrueColor { r: 220, g: 220, b: 220 };

pub const STATUS_OK: Color = Color::Green;
pub const STATUS_REDIRECT: Color = Color::Cyan;
pub const STATUS_ERROR: Color = Color::Yellow;

pub const IP_ADDR: Color = Color::TrueColor { r: 153, g: 255, b: 153 };
pub const EMPTY: Color = Color::BrightBlack;
