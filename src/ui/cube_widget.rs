//! Ratatui widget that draws a [`Cube`] with perspective.
//!
//! Each face visible to the viewer is rendered off-screen at full face size
//! by a [`PaneRenderer`], then projected onto the target buffer column by
//! column:
//!
//! * the face is mounted at its slot's base rotation and pushed out by half
//!   the face width; the whole cube is pushed back by the same amount so the
//!   front face sits on the screen plane at rest;
//! * every screen column is inverted back to a column of the flat face, and
//!   stretched vertically by the perspective factor at that depth;
//! * the whole result is scaled by [`Cube::scale`].

use ratatui::{
    buffer::Buffer,
    layout::{Position, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Widget},
};

use crate::core::cube::{Cube, PaneView};

/// Faces turned further than this (cosine) are culled.
const MIN_FACING: f64 = 1e-3;

/// Faces turned away beyond this cosine are drawn dimmed.
const DIM_FACING: f64 = 0.5;

/// Content callback for the faces of the cube.
pub trait PaneRenderer {
    /// Draw content `index` into `area`.  `active` is true only for the
    /// front face while the cube is at rest.  Negative indices are empty.
    fn render_item(&self, index: i64, active: bool, rotation: f64, area: Rect, buf: &mut Buffer);

    /// Whether there is content after `index`.
    fn has_next(&self, _index: i64) -> bool {
        true
    }
}

/// Decoration applied to every face before its content.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaneStyle {
    pub borders: bool,
    pub border_style: Style,
    pub active_border_style: Style,
    pub background: Color,
}

impl Default for PaneStyle {
    fn default() -> Self {
        Self {
            borders: true,
            border_style: Style::default().fg(Color::DarkGray),
            active_border_style: Style::default().fg(Color::LightBlue),
            background: Color::Reset,
        }
    }
}

/// Geometry of one face at the current rotation.
#[derive(Debug, Clone, Copy)]
struct FaceProjection {
    sin: f64,
    cos: f64,
    half: f64,
    perspective: f64,
}

impl FaceProjection {
    fn new(angle_deg: f64, width: f64, perspective: f64) -> Self {
        let rad = angle_deg.to_radians();
        let half = width / 2.0;
        Self {
            sin: rad.sin(),
            cos: rad.cos(),
            half,
            perspective: perspective.max(Self::min_perspective(half)).max(1.0),
        }
    }

    /// Smallest viewer distance for a face of half-width `half`.  The near
    /// edge comes forward by at most `half·(√2 − 1)` (at 45°); staying twice
    /// that far away keeps it at no more than double magnification.
    fn min_perspective(half: f64) -> f64 {
        2.0 * half * (std::f64::consts::SQRT_2 - 1.0)
    }

    /// Depth of face-local column `u` (0 = screen plane, negative = away).
    fn depth(&self, u: f64) -> f64 {
        -u * self.sin + self.half * self.cos - self.half
    }

    /// Perspective magnification at face-local column `u`.
    fn magnification(&self, u: f64) -> f64 {
        self.perspective / (self.perspective - self.depth(u))
    }

    /// Screen x (relative to the cube centre) of face-local column `u`.
    fn project(&self, u: f64) -> f64 {
        (u * self.cos + self.half * self.sin) * self.magnification(u)
    }

    /// Face-local column seen at screen x `sx`.
    fn unproject(&self, sx: f64) -> Option<f64> {
        let p = self.perspective;
        let centre_depth = self.half * self.cos - self.half;
        let denom = sx * self.sin - p * self.cos;
        if denom.abs() < f64::EPSILON {
            return None;
        }
        Some((p * self.half * self.sin - sx * (p - centre_depth)) / denom)
    }
}

/// The cube widget.
pub struct CubeWidget<'a, R: PaneRenderer + ?Sized> {
    cube: &'a Cube,
    renderer: &'a R,
    pane_style: PaneStyle,
}

impl<'a, R: PaneRenderer + ?Sized> CubeWidget<'a, R> {
    pub fn new(cube: &'a Cube, renderer: &'a R) -> Self {
        Self {
            cube,
            renderer,
            pane_style: PaneStyle::default(),
        }
    }

    pub fn pane_style(mut self, style: PaneStyle) -> Self {
        self.pane_style = style;
        self
    }

    /// Render one face at full size into its own buffer.
    fn render_face(&self, pane: &PaneView, width: u16, height: u16) -> Buffer {
        let rect = Rect::new(0, 0, width, height);
        let mut face = Buffer::empty(rect);
        face.set_style(rect, Style::default().bg(self.pane_style.background));

        let inner = if self.pane_style.borders {
            let style = if pane.active {
                self.pane_style.active_border_style
            } else {
                self.pane_style.border_style
            };
            let block = Block::default().borders(Borders::ALL).border_style(style);
            let inner = block.inner(rect);
            block.render(rect, &mut face);
            inner
        } else {
            rect
        };

        self.renderer
            .render_item(pane.index, pane.active, self.cube.rotation(), inner, &mut face);
        face
    }
}

impl<R: PaneRenderer + ?Sized> Widget for CubeWidget<'_, R> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let options = self.cube.options();
        let face_w = options.width.round().clamp(1.0, u16::MAX as f64) as u16;
        let face_h = options.height.round().clamp(1.0, u16::MAX as f64) as u16;
        if area.width == 0 || area.height == 0 {
            return;
        }

        let rotation = self.cube.rotation();
        let scale = self.cube.scale();
        let width = face_w as f64;
        let height = face_h as f64;
        let centre_x = area.x as f64 + area.width as f64 / 2.0;
        let centre_y = area.y as f64 + area.height as f64 / 2.0;

        let mut faces: Vec<(PaneView, FaceProjection)> = self
            .cube
            .panes()
            .into_iter()
            .map(|pane| {
                let proj = FaceProjection::new(pane.base_rotation + rotation, width, options.perspective);
                (pane, proj)
            })
            .filter(|(_, proj)| proj.cos > MIN_FACING)
            .collect();
        // Far faces first so nearer ones overwrite them.
        faces.sort_by(|a, b| a.1.depth(0.0).total_cmp(&b.1.depth(0.0)));

        for (pane, proj) in faces {
            let face = self.render_face(&pane, face_w, face_h);
            let dim = proj.cos < DIM_FACING;

            let left = centre_x + scale * proj.project(-proj.half);
            let right = centre_x + scale * proj.project(proj.half);
            let first_col = left.floor().max(area.left() as f64) as u16;
            let last_col = right.ceil().min(area.right() as f64) as u16;

            for col in first_col..last_col {
                let sx = (col as f64 + 0.5 - centre_x) / scale;
                let Some(u) = proj.unproject(sx) else {
                    continue;
                };
                if u < -proj.half || u >= proj.half {
                    continue;
                }
                let src_col = ((u + proj.half).floor() as u16).min(face_w - 1);
                let stretch = scale * proj.magnification(u);

                for row in area.top()..area.bottom() {
                    let sy = (row as f64 + 0.5 - centre_y) / stretch;
                    let src_row = (sy + height / 2.0).floor();
                    if src_row < 0.0 || src_row >= height {
                        continue;
                    }
                    let Some(src) = face.cell(Position::new(src_col, src_row as u16)) else {
                        continue;
                    };
                    let mut cell = src.clone();
                    if dim {
                        cell.modifier.insert(Modifier::DIM);
                    }
                    if let Some(dst) = buf.cell_mut(Position::new(col, row)) {
                        *dst = cell;
                    }
                }
            }
        }
    }
}
