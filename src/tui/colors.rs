//! Color constants for the Gantt board.

use ratatui::style::Color;

// Bars keep two distinct fills so derived (container)
// ranges read differently from editable leaf ranges.

/// Leaf task bars.
pub const BAR_LEAF: Color = Color::Rgb(70, 130, 180);
/// Container (rolled-up) bars.
pub const BAR_CONTAINER: Color = Color::Rgb(90, 90, 140);
/// Completed portion of a bar.
pub const BAR_DONE: Color = Color::Rgb(46, 139, 87);
/// Weekend column shading.
pub const WEEKEND: Color = Color::Rgb(40, 40, 40);
/// Holiday column shading.
pub const HOLIDAY: Color = Color::Rgb(80, 40, 40);
/// The today marker column.
pub const TODAY: Color = Color::Rgb(255, 215, 0);
