use egui::Context;

use super::app_state::AppState;

mod alert;
mod helpers;
mod left;
mod results;
mod top;

impl AppState {
    pub fn render_top_panel(&mut self, ctx: &Context) {
        top::render(self, ctx);
    }

    pub fn render_left_panel(&mut self, ctx: &Context) {
        left::render(self, ctx);
    }

    pub fn render_central_panel(&mut self, ctx: &Context) {
        results::render(self, ctx);
    }

    pub fn render_alert_window(&mut self, ctx: &Context) {
        alert::render(self, ctx);
    }
}
