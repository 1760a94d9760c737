use egui::{Color32, Pos2, Rect, Shape, Stroke, Visuals};
use serde::Deserialize;

/// How the border of an item is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BorderStyle {
    #[default]
    Flat,
    Raised,
    Sunken,
    Groove,
    Ridge,
    Solid,
}

/// Visual options of a single item. Unset fields fall back to the defaults of the list the item
/// belongs to, see [`ItemStyle::or`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ItemStyle {
    pub border: Option<BorderStyle>,
    pub border_width: Option<f32>,
    pub background: Option<Color32>,
}

impl ItemStyle {
    pub fn with_border(mut self, border: BorderStyle) -> Self {
        self.border = Some(border);
        self
    }

    pub fn with_border_width(mut self, width: f32) -> Self {
        self.border_width = Some(width);
        self
    }

    pub fn with_background(mut self, background: Color32) -> Self {
        self.background = Some(background);
        self
    }

    /// Fills every unset field from `defaults`.
    pub fn or(self, defaults: Self) -> Self {
        Self {
            border: self.border.or(defaults.border),
            border_width: self.border_width.or(defaults.border_width),
            background: self.background.or(defaults.background),
        }
    }

    /// Overwrites the fields that are set in `other`.
    pub fn merge(&mut self, other: &Self) {
        *self = other.or(*self);
    }

    pub fn border_width_or_default(&self) -> f32 {
        match self.border.unwrap_or_default() {
            BorderStyle::Flat => 0.0,
            _ => self.border_width.unwrap_or(1.0).max(0.0),
        }
    }
}

/// Light and dark edge colors of a bevel.
struct Palette {
    light: Color32,
    dark: Color32,
}

impl Palette {
    fn from_visuals(visuals: &Visuals) -> Self {
        if visuals.dark_mode {
            Self {
                light: Color32::from_gray(110),
                dark: Color32::from_gray(20),
            }
        } else {
            Self {
                light: Color32::from_gray(255),
                dark: Color32::from_gray(130),
            }
        }
    }
}

/// Builds the background and border shapes of an item occupying `rect`.
pub fn item_shapes(rect: Rect, style: &ItemStyle, visuals: &Visuals) -> Vec<Shape> {
    let background = style
        .background
        .unwrap_or(visuals.widgets.noninteractive.bg_fill);
    let mut shapes = vec![Shape::rect_filled(rect, 0.0, background)];
    shapes.extend(border_shapes(rect, style, visuals));
    shapes
}

/// Builds the border shapes for `style` inside `rect`. A flat border yields no shapes.
pub fn border_shapes(rect: Rect, style: &ItemStyle, visuals: &Visuals) -> Vec<Shape> {
    let width = style.border_width_or_default();
    if width <= 0.0 {
        return Vec::new();
    }

    let Palette { light, dark } = Palette::from_visuals(visuals);
    let half = width / 2.0;
    match style.border.unwrap_or_default() {
        BorderStyle::Flat => Vec::new(),
        BorderStyle::Solid => vec![Shape::rect_stroke(
            rect.shrink(half),
            0.0,
            Stroke::new(width, dark),
        )],
        BorderStyle::Raised => bevel(rect, width, light, dark),
        BorderStyle::Sunken => bevel(rect, width, dark, light),
        BorderStyle::Groove => {
            let mut shapes = bevel(rect, half, dark, light);
            shapes.extend(bevel(rect.shrink(half), half, light, dark));
            shapes
        }
        BorderStyle::Ridge => {
            let mut shapes = bevel(rect, half, light, dark);
            shapes.extend(bevel(rect.shrink(half), half, dark, light));
            shapes
        }
    }
}

/// Four edges of `width` drawn inside `rect`, top and left in `top_left`, bottom and right in
/// `bottom_right`.
fn bevel(rect: Rect, width: f32, top_left: Color32, bottom_right: Color32) -> Vec<Shape> {
    let inner = rect.shrink(width / 2.0);
    let (min, max) = (inner.min, inner.max);
    let corner_tr = Pos2::new(max.x, min.y);
    let corner_bl = Pos2::new(min.x, max.y);
    let lit = Stroke::new(width, top_left);
    let shaded = Stroke::new(width, bottom_right);

    vec![
        Shape::line_segment([min, corner_tr], lit),
        Shape::line_segment([min, corner_bl], lit),
        Shape::line_segment([corner_bl, max], shaded),
        Shape::line_segment([corner_tr, max], shaded),
    ]
}
