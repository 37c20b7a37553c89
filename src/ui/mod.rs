mod app_state;
mod panels;
mod theme;
mod thumbnails;
mod utils;

pub use app_state::{AppState, StartupOptions};

use egui::Context;
use std::time::Duration;

impl eframe::App for AppState {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        // Completed requests first, then the registry notifications they caused.
        self.drain_events();
        self.session.page.apply_color_changes();
        self.expire_statuses();
        self.thumbnail_cache.update(ctx);

        self.render_top_panel(ctx);
        self.render_left_panel(ctx);
        self.render_central_panel(ctx);
        self.render_alert_window(ctx);

        if self.has_pending_requests() {
            ctx.request_repaint_after(Duration::from_millis(100));
        } else {
            // Status messages expire on a timer.
            ctx.request_repaint_after(Duration::from_millis(500));
        }
    }
}
