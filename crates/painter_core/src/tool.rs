//! Paint tools and the two-phase line gesture state machine.

use bevy::prelude::*;

use crate::canvas::RasterCanvas;
use crate::color::Rgba;

/// The active paint tool.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ToolKind {
    /// Stamp the brush color.
    #[default]
    Brush,
    /// Stamp the canvas background color.
    Eraser,
    /// Two-click straight line with the brush color.
    Line,
}

/// State of the line tool gesture.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum LineState {
    /// No line gesture in progress.
    #[default]
    Idle,
    /// First point recorded, waiting for the second click.
    AwaitingSecondPoint(Vec2),
}

/// Tool state machine driving a `RasterCanvas`.
///
/// Owns the active tool and the pending line-start point. Any tool change
/// clears a pending line start; a cancel is an explicit transition issued
/// by the caller (e.g. on focus loss), never a timeout.
#[derive(Resource, Default)]
pub struct PaintController {
    tool: ToolKind,
    line: LineState,
}

impl PaintController {
    /// Create a controller with the brush tool active.
    pub fn new() -> Self {
        Self::default()
    }

    /// The active tool.
    pub fn tool(&self) -> ToolKind {
        self.tool
    }

    /// The line gesture state.
    pub fn line_state(&self) -> LineState {
        self.line
    }

    /// Switch the active tool, clearing any pending line start.
    ///
    /// Returns true if the tool actually changed.
    pub fn set_tool(&mut self, tool: ToolKind) -> bool {
        self.line = LineState::Idle;
        if self.tool == tool {
            return false;
        }
        self.tool = tool;
        true
    }

    /// Set the draw color on the canvas.
    ///
    /// Picking a color while erasing switches back to the brush first.
    /// Returns true if that tool switch happened.
    pub fn set_color(&mut self, canvas: &mut RasterCanvas, color: Rgba) -> bool {
        let switched = self.tool == ToolKind::Eraser && self.set_tool(ToolKind::Brush);
        canvas.set_brush_color(color);
        switched
    }

    /// Abandon a pending line gesture without drawing anything.
    pub fn cancel_line(&mut self) {
        self.line = LineState::Idle;
    }

    /// Handle a discrete click at a normalized coordinate.
    ///
    /// Brush and eraser draw a point immediately. The line tool records the
    /// first click as the pending start (no pixels drawn) and draws the
    /// full line on the second click.
    pub fn pointer_click(&mut self, canvas: &mut RasterCanvas, uv: Vec2) {
        match self.tool {
            ToolKind::Brush | ToolKind::Eraser => canvas.draw_point(uv, self.tool),
            ToolKind::Line => match self.line {
                LineState::Idle => self.line = LineState::AwaitingSecondPoint(uv),
                LineState::AwaitingSecondPoint(start) => {
                    canvas.draw_line(start, uv, ToolKind::Line);
                    self.line = LineState::Idle;
                }
            },
        }
    }

    /// Handle continuous pointer movement while the button is held.
    ///
    /// Only the brush and eraser paint on drag; the line tool waits for
    /// discrete clicks.
    pub fn pointer_drag(&mut self, canvas: &mut RasterCanvas, uv: Vec2) {
        match self.tool {
            ToolKind::Brush | ToolKind::Eraser => canvas.draw_point(uv, self.tool),
            ToolKind::Line => {}
        }
    }
}
