use smithay_client_toolkit::seat::{
    pointer::ThemeSpec, Capability, SeatHandler, SeatState,
};
use tracing::{instrument, trace, warn};
use wayland_client::{protocol::wl_seat::WlSeat, Connection, Proxy, QueueHandle};

use crate::keyboard::Keyboard;
use crate::State;

impl SeatHandler for State {
    fn seat_state(&mut self) -> &mut SeatState {
        &mut self.wayland.seat_state
    }

    fn new_seat(&mut self, _conn: &Connection, _qh: &QueueHandle<Self>, _seat: WlSeat) {
        trace!("adding new seat...")
    }

    fn remove_seat(&mut self, _conn: &Connection, _qh: &QueueHandle<Self>, seat: WlSeat) {
        trace!("removing seat...");
        // remove the pointer and keyboard if they haven't been already
        self.pointers.remove(&seat.id());
        self.keyboards.remove(&seat.id());
    }

    #[instrument(name = "SeatHandler::new_capability", skip_all)]
    fn new_capability(
        &mut self,
        _conn: &Connection,
        qh: &QueueHandle<Self>,
        seat: WlSeat,
        capability: Capability,
    ) {
        match capability {
            Capability::Keyboard => {
                trace!("adding keyboard capability");
                match self.wayland.seat_state.get_keyboard(qh, &seat, None) {
                    Ok(keyboard) => {
                        self.keyboards.insert(seat.id(), Keyboard::new(keyboard));
                    }
                    Err(e) => warn!("failed to create keyboard: {e:?}"),
                }
            }

            Capability::Pointer => {
                trace!("adding pointer capability");
                let cursor_surface = self.wayland.compositor.create_surface(qh);
                match self.wayland.seat_state.get_pointer_with_theme(
                    qh,
                    &seat,
                    self.wayland.shm_state.wl_shm(),
                    cursor_surface,
                    ThemeSpec::System,
                ) {
                    Ok(themed_pointer) => {
                        self.pointers
                            .insert(seat.id(), (themed_pointer.pointer().id(), themed_pointer));
                    }
                    Err(e) => warn!("failed to create themed pointer: {e:?}"),
                }
            }
            _ => {}
        }
    }

    #[instrument(name = "SeatHandler::remove_capability", skip_all)]
    fn remove_capability(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        seat: WlSeat,
        capability: Capability,
    ) {
        trace!("capability removed!");
        match capability {
            Capability::Keyboard => {
                self.keyboards.remove(&seat.id());
            }

            Capability::Pointer => {
                self.pointers.remove(&seat.id());
            }
            _ => {}
        };
    }
}
