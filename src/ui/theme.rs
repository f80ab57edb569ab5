//! Colors and box-drawing glyphs for terminal output

use colored::Color;

pub struct Theme;

impl Theme {
    pub const ACCENT: Color = Color::TrueColor {
        r: 0,
        g: 255,
        b: 255,
    };
    pub const KEYWORD: Color = Color::TrueColor {
        r: 255,
        g: 0,
        b: 255,
    };
    pub const OK: Color = Color::TrueColor {
        r: 0,
        g: 255,
        b: 136,
    };
    pub const ERROR: Color = Color::TrueColor {
        r: 255,
        g: 99,
        b: 71,
    };
    pub const BORDER: Color = Color::TrueColor {
        r: 88,
        g: 88,
        b: 88,
    };
    pub const BORDER_ACCENT: Color = Color::TrueColor {
        r: 0,
        g: 200,
        b: 255,
    };
    pub const SUBTLE: Color = Color::TrueColor {
        r: 140,
        g: 140,
        b: 140,
    };
}

pub struct BoxChars;

impl BoxChars {
    pub const H_LINE: &'static str = "━";
    pub const V_LINE: &'static str = "┃";
    pub const TL_CORNER: &'static str = "┏";
    pub const TR_CORNER: &'static str = "┓";
    pub const BL_CORNER: &'static str = "┗";
    pub const BR_CORNER: &'static str = "┛";
    pub const T_RIGHT: &'static str = "┣";
    pub const T_LEFT: &'static str = "┫";
    pub const L_V_LINE: &'static str = "│";

    pub const DIAMOND: &'static str = "◆";
    pub const BULLET: &'static str = "●";
    pub const CHECK: &'static str = "✓";
    pub const CROSS_MARK: &'static str = "✗";
}
