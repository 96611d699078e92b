//! Rendering methods for the App.

use ratatui::widgets::Clear;

use crate::ui::{ActionMenu, PopupView};

use super::App;

impl App {
    /// Renders the popup, with the open action menu on top.
    pub fn render(&self, frame: &mut ratatui::Frame) {
        let area = frame.area();
        frame.render_widget(Clear, area);
        self.last_area.set(area);

        let layout = self.layout();
        frame.render_widget(
            PopupView::new(&self.controller, &layout, self.selection(), self.hint_context()),
            area,
        );

        if let Some(menu) = self.controller.open_menu() {
            frame.render_widget(ActionMenu::new(menu.cursor), menu.placement);
        }
    }
}
