use smithay_client_toolkit::seat::pointer::{PointerEventKind, PointerHandler, BTN_LEFT};
use tracing::warn;
use wayland_client::{protocol::wl_pointer, Connection, Proxy, QueueHandle};

use crate::State;

impl PointerHandler for State {
    fn pointer_frame(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        pointer: &wl_pointer::WlPointer,
        events: &[smithay_client_toolkit::seat::pointer::PointerEvent],
    ) {
        for event in events {
            if &event.surface != self.prompt.surface() {
                continue;
            }

            let cursor_icon = match event.kind {
                PointerEventKind::Enter { .. } => {
                    self.prompt.pointer_entered();
                    self.prompt.pointer_moved(event.position)
                }
                PointerEventKind::Motion { .. } => self.prompt.pointer_moved(event.position),
                PointerEventKind::Leave { .. } => {
                    self.prompt.pointer_left();
                    None
                }
                PointerEventKind::Press { button, .. } if button == BTN_LEFT => {
                    self.prompt.pointer_pressed(event.position);
                    None
                }
                PointerEventKind::Release { button, .. } if button == BTN_LEFT => {
                    if let Some(outcome) = self.prompt.pointer_released(event.position) {
                        self.finish(outcome);
                        return;
                    }
                    None
                }
                _ => None,
            };

            if let Some(icon) = cursor_icon {
                if let Some((_, themed_pointer)) =
                    self.pointers.values_mut().find(|x| x.0 == pointer.id())
                {
                    _ = themed_pointer.set_cursor(&self.wayland.connection, icon);
                } else {
                    warn!("pointer event `pointer_frame` dispatched for pointer not in state");
                }
            }
        }

        self.redraw_if_needed();
    }
}
