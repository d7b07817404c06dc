//! Minimap widget for ratatui
//!
//! Draws the occupancy grid around the player, one glyph per block of cells.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Widget},
};

use crate::dungeon::OccupancyGrid;
use crate::render::{Minimap, MinimapGlyph};
use glam::IVec2;

/// Widget for rendering the overhead map
pub struct MinimapWidget<'a> {
    grid: &'a OccupancyGrid,
    player: Option<IVec2>,
    zoom: i32,
    title: &'a str,
}

impl<'a> MinimapWidget<'a> {
    pub fn new(grid: &'a OccupancyGrid) -> Self {
        Self {
            grid,
            player: None,
            zoom: 1,
            title: "Map",
        }
    }

    /// Center the view on this cell and mark it
    pub fn player(mut self, cell: IVec2) -> Self {
        self.player = Some(cell);
        self
    }

    pub fn zoom(mut self, zoom: i32) -> Self {
        self.zoom = zoom.max(1);
        self
    }

    pub fn title(mut self, title: &'a str) -> Self {
        self.title = title;
        self
    }
}

pub fn glyph_style(glyph: MinimapGlyph) -> Style {
    match glyph {
        MinimapGlyph::Empty => Style::default(),
        MinimapGlyph::Floor => Style::default().fg(Color::Rgb(120, 90, 60)),
        MinimapGlyph::Wall => Style::default().fg(Color::Rgb(150, 150, 160)),
        MinimapGlyph::Player => Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    }
}

impl<'a> Widget for MinimapWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(self.title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Rgb(100, 100, 120)));

        let inner = block.inner(area);
        block.render(area, buf);

        let focus = self
            .player
            .unwrap_or_else(|| IVec2::new(self.grid.width() / 2, self.grid.height() / 2));
        let minimap = Minimap::new(focus, self.zoom, inner.width, inner.height);

        for (row, glyphs) in minimap.rasterize(self.grid, self.player).iter().enumerate() {
            for (col, glyph) in glyphs.iter().enumerate() {
                let x = inner.x + col as u16;
                let y = inner.y + row as u16;
                if let Some(cell) = buf.cell_mut((x, y)) {
                    cell.set_char(glyph.symbol()).set_style(glyph_style(*glyph));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    #[test]
    fn test_widget_draws_player_at_center() {
        let mut grid = OccupancyGrid::new(100, 100, 10.0);
        grid.try_reserve(Vec2::ZERO, Vec2::new(2.0, 2.0)).unwrap();

        let area = Rect::new(0, 0, 23, 13);
        let mut buf = Buffer::empty(area);
        MinimapWidget::new(&grid)
            .player(IVec2::new(50, 50))
            .render(area, &mut buf);

        // Inner area is 21x11, its center is at (1 + 10, 1 + 5)
        assert_eq!(buf[(11, 6)].symbol(), "@");
        assert_eq!(buf[(12, 6)].symbol(), ".");
    }
}
