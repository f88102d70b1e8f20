//! Glyph outlines in the compact font format: whitespace separated
//! commands `m x y`, `l x y`, `q ex ey cx cy` and
//! `b ex ey c1x c1y c2x c2y`, in font units with y pointing up.

use std::str::FromStr;

use crate::{
    primitives::{BoundingBox, BoundingBoxComputation},
    LayoutError, LayoutResult,
};

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum OutlineCommand {
    MoveTo { x: f64, y: f64 },
    LineTo { x: f64, y: f64 },
    QuadraticTo { x: f64, y: f64, cx: f64, cy: f64 },
    BezierTo {
        x: f64,
        y: f64,
        c1x: f64,
        c1y: f64,
        c2x: f64,
        c2y: f64,
    },
}

#[derive(Debug, PartialEq, Clone, Default)]
pub struct GlyphOutline {
    commands: Vec<OutlineCommand>,
}
impl GlyphOutline {
    pub fn new(commands: Vec<OutlineCommand>) -> Self {
        Self { commands }
    }
    pub fn commands(&self) -> &[OutlineCommand] {
        &self.commands
    }

    /// # Example
    /// ```
    /// # use notation_layout::GlyphOutline;
    /// let outline = GlyphOutline::parse("m 0 0 l 10 0 q 10 10 20 5").unwrap();
    /// assert_eq!(outline.commands().len(), 3);
    /// assert!(GlyphOutline::parse("m 0").is_err());
    /// ```
    pub fn parse(outline: &str) -> LayoutResult<Self> {
        let tokens: Vec<&str> = outline.split_whitespace().collect();
        let mut commands = Vec::new();
        let mut idx = 0;
        while idx < tokens.len() {
            let op = tokens[idx];
            let arity = match op {
                "m" | "l" => 2,
                "q" => 4,
                "b" => 6,
                x => {
                    return Err(LayoutError::MalformedOutline(format!(
                        "unknown command `{}` at token {}",
                        x, idx
                    )))
                }
            };
            let args = tokens.get(idx + 1..idx + 1 + arity).ok_or_else(|| {
                LayoutError::MalformedOutline(format!(
                    "command `{}` at token {} needs {} arguments",
                    op, idx, arity
                ))
            })?;
            let args = args
                .iter()
                .map(|tk| {
                    tk.parse::<f64>().map_err(|_| {
                        LayoutError::MalformedOutline(format!(
                            "`{}` is not a number",
                            tk
                        ))
                    })
                })
                .collect::<LayoutResult<Vec<f64>>>()?;
            commands.push(match op {
                "m" => OutlineCommand::MoveTo {
                    x: args[0],
                    y: args[1],
                },
                "l" => OutlineCommand::LineTo {
                    x: args[0],
                    y: args[1],
                },
                "q" => OutlineCommand::QuadraticTo {
                    x: args[0],
                    y: args[1],
                    cx: args[2],
                    cy: args[3],
                },
                _ => OutlineCommand::BezierTo {
                    x: args[0],
                    y: args[1],
                    c1x: args[2],
                    c1y: args[3],
                    c2x: args[4],
                    c2y: args[5],
                },
            });
            idx += 1 + arity;
        }
        Ok(Self { commands })
    }

    /// Bounds of the outline drawn at `(origin_x, origin_y)` with the given
    /// scale. Font y is flipped to screen y.
    pub fn bounding_box(
        &self,
        scale: f64,
        origin_x: f64,
        origin_y: f64,
    ) -> Option<BoundingBox> {
        let tx = |x: f64| origin_x + x * scale;
        let ty = |y: f64| origin_y - y * scale;
        let mut comp = BoundingBoxComputation::new();
        let (mut last_x, mut last_y) = (origin_x, origin_y);
        for command in self.commands.iter() {
            match *command {
                OutlineCommand::MoveTo { x, y }
                | OutlineCommand::LineTo { x, y } => {
                    (last_x, last_y) = (tx(x), ty(y));
                    comp.add_point(last_x, last_y);
                }
                OutlineCommand::QuadraticTo { x, y, cx, cy } => {
                    let (x, y) = (tx(x), ty(y));
                    let (cx, cy) = (tx(cx), ty(cy));
                    comp.add_quadratic_curve(last_x, last_y, cx, cy, x, y);
                    (last_x, last_y) = (x, y);
                }
                OutlineCommand::BezierTo {
                    x,
                    y,
                    c1x,
                    c1y,
                    c2x,
                    c2y,
                } => {
                    let (x, y) = (tx(x), ty(y));
                    comp.add_bezier_curve(
                        last_x,
                        last_y,
                        tx(c1x),
                        ty(c1y),
                        tx(c2x),
                        ty(c2y),
                        x,
                        y,
                    );
                    (last_x, last_y) = (x, y);
                }
            }
        }
        comp.bounding_box()
    }
}
impl FromStr for GlyphOutline {
    type Err = LayoutError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
