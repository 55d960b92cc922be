//! Display-list primitives
//!
//! Scene builders emit a `Frame` of drawing commands; a backend replays it.
//! Keeping the list plain data lets native tests inspect exactly what would be
//! drawn.

use glam::Vec2;

/// sRGB color with straight alpha
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self {
            a: a.clamp(0.0, 1.0),
            ..self
        }
    }

    /// CSS color string for canvas fill/stroke styles
    pub fn to_css(&self) -> String {
        format!("rgba({},{},{},{:.3})", self.r, self.g, self.b, self.a)
    }
}

/// Draw order buckets, back to front
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Layer {
    Background,
    Bodies,
    Entities,
    Particles,
    Hud,
    Overlay,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCmd {
    /// Fill the whole canvas
    Clear { color: Rgba },
    /// Axis-aligned box centred on `center`, optionally rotated about it
    Rect {
        center: Vec2,
        size: Vec2,
        rotation: f32,
        fill: Rgba,
    },
    Circle {
        center: Vec2,
        radius: f32,
        fill: Rgba,
    },
    /// Stroked circle outline
    Ring {
        center: Vec2,
        radius: f32,
        width: f32,
        stroke: Rgba,
    },
    /// Stroked arc from `start` to `end` (radians, clockwise in canvas space)
    Arc {
        center: Vec2,
        radius: f32,
        start: f32,
        end: f32,
        width: f32,
        stroke: Rgba,
    },
    Line {
        from: Vec2,
        to: Vec2,
        width: f32,
        stroke: Rgba,
    },
    Polyline {
        points: Vec<Vec2>,
        width: f32,
        stroke: Rgba,
    },
    Polygon {
        points: Vec<Vec2>,
        fill: Rgba,
    },
    Text {
        pos: Vec2,
        text: String,
        size: f32,
        color: Rgba,
        align: TextAlign,
    },
    /// HUD gauge: `back` box with `fill` covering `fraction` of its width
    Bar {
        pos: Vec2,
        size: Vec2,
        fraction: f32,
        fill: Rgba,
        back: Rgba,
    },
}

/// One frame's display list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    pub size: Vec2,
    items: Vec<(Layer, DrawCmd)>,
}

impl Frame {
    pub fn new(size: Vec2) -> Self {
        Self {
            size,
            items: Vec::new(),
        }
    }

    pub fn push(&mut self, layer: Layer, cmd: DrawCmd) {
        self.items.push((layer, cmd));
    }

    pub fn text(&mut self, layer: Layer, pos: Vec2, text: impl Into<String>, size: f32, color: Rgba, align: TextAlign) {
        self.push(
            layer,
            DrawCmd::Text {
                pos,
                text: text.into(),
                size,
                color,
                align,
            },
        );
    }

    /// Stable-sort commands into layer order; builders call this last
    pub fn finish(mut self) -> Self {
        self.items.sort_by_key(|(layer, _)| *layer);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Layer, DrawCmd)> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Layers never step backwards through the list
    pub fn is_layer_ordered(&self) -> bool {
        self.items.windows(2).all(|w| w[0].0 <= w[1].0)
    }

    pub fn count(&self, layer: Layer) -> usize {
        self.items.iter().filter(|(l, _)| *l == layer).count()
    }

    /// All text drawn on a layer, in order
    pub fn texts(&self, layer: Layer) -> Vec<&str> {
        self.items
            .iter()
            .filter_map(|(l, cmd)| match cmd {
                DrawCmd::Text { text, .. } if *l == layer => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}
