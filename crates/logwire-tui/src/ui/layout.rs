use ratatui::layout::{Constraint, Direction, Layout as RatatuiLayout, Rect};

/// Layout helper for consistent screen layouts
pub struct Layout;

impl Layout {
    /// Header, content and status bar
    pub fn main(area: Rect) -> (Rect, Rect, Rect) {
        let chunks = RatatuiLayout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(1),    // Content
                Constraint::Length(1), // Status bar
            ])
            .split(area);

        (chunks[0], chunks[1], chunks[2])
    }

    /// A box of fixed size centered in `area`, shrunk to fit
    pub fn centered(area: Rect, width: u16, height: u16) -> Rect {
        let width = width.min(area.width.saturating_sub(4));
        let height = height.min(area.height.saturating_sub(2));

        let x = area.x + area.width.saturating_sub(width) / 2;
        let y = area.y + area.height.saturating_sub(height) / 2;
        Rect::new(x, y, width, height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_fits_small_areas() {
        let area = Rect::new(0, 0, 20, 6);
        let rect = Layout::centered(area, 50, 10);
        assert_eq!(rect, Rect::new(2, 1, 16, 4));

        let area = Rect::new(0, 0, 100, 40);
        let rect = Layout::centered(area, 50, 10);
        assert_eq!(rect, Rect::new(25, 15, 50, 10));
    }
}
