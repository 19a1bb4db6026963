//! A blocking yes/no prompt rendered as a wlr-layer-shell surface.
//!
//! The binary asks one question and prints one token. Everything here
//! exists to drive a single event loop: connect, show the panel, wait for
//! the user (or the compositor) to decide, and hand the decision back to
//! `main` as a value.

use std::collections::HashMap;

use anyhow::{Context, Result};
use tracing::{info, instrument, trace, warn};

use smithay_client_toolkit::{
    compositor::{CompositorHandler, CompositorState},
    delegate_compositor, delegate_keyboard, delegate_layer, delegate_output, delegate_pointer,
    delegate_registry, delegate_seat, delegate_shm,
    output::{OutputHandler, OutputState},
    reexports::{
        calloop::{EventLoop, LoopSignal},
        calloop_wayland_source::WaylandSource,
    },
    registry::{ProvidesRegistryState, RegistryState},
    registry_handlers,
    seat::{pointer::ThemedPointer, SeatState},
    shell::{
        wlr_layer::{LayerShell, LayerShellHandler, LayerSurface, LayerSurfaceConfigure},
        WaylandSurface,
    },
    shm::{Shm, ShmHandler},
};

use wayland_backend::client::ObjectId;
use wayland_client::{
    globals::registry_queue_init,
    protocol::{wl_output::WlOutput, wl_surface::WlSurface},
    Connection, EventQueue, QueueHandle,
};

mod keyboard;
mod pointer;
pub mod prompt;
pub mod render;
mod seat;
pub mod style;
pub mod text;

use keyboard::Keyboard;
use prompt::PromptView;
use text::TextSystem;

/// Terminal result of the prompt. Its `Display` form is the token written
/// to stdout: `confirmed` or `cancelled`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Outcome {
    Confirmed,
    Cancelled,
}

pub struct WaylandConnection {
    event_queue: EventQueue<State>,
    event_loop: EventLoop<'static, State>,
    pub state: State,
}

pub struct WaylandState {
    pub connection: Connection,
    pub compositor: CompositorState,
    pub output_state: OutputState,
    pub queue_handle: QueueHandle<State>,
    pub registry_state: RegistryState,
    pub seat_state: SeatState,
    pub shm_state: Shm,
    pub layer_shell: LayerShell,
}

pub struct State {
    pub wayland: WaylandState,
    text: TextSystem,

    pointers: HashMap<ObjectId, (ObjectId, ThemedPointer)>,
    keyboards: HashMap<ObjectId, Keyboard>,

    pub prompt: PromptView,

    outcome: Option<Outcome>,
    loop_signal: LoopSignal,
}

impl State {
    /// Records the decision and stops the loop. The outcome is written at
    /// most once; later dismissal paths are ignored.
    pub fn finish(&mut self, outcome: Outcome) {
        if self.outcome.is_none() {
            info!("prompt decided: {outcome}");
            self.outcome = Some(outcome);
            self.loop_signal.stop();
        }
    }

    /// Repaints the panel when an input handler changed its visual state.
    pub(crate) fn redraw_if_needed(&mut self) {
        if self.outcome.is_none() && self.prompt.take_dirty() {
            if let Err(e) = self.prompt.draw(&mut self.text) {
                warn!("failed to repaint the prompt: {e:?}");
            }
        }
    }
}

impl WaylandConnection {
    #[instrument(name = "WaylandConnection::new")]
    pub fn new() -> Result<WaylandConnection> {
        let event_loop = EventLoop::try_new().context("failed to create event loop")?;

        trace!("connecting to wayland server");
        let connection = Connection::connect_to_env()
            .context("this program requires a running wayland compositor")?;
        trace!("fetching globals and event queue");
        let (globals, event_queue) = registry_queue_init(&connection)
            .context("failed to initialise event queue and retrieve globals")?;
        let queue_handle = event_queue.handle();
        let registry_state = RegistryState::new(&globals);

        trace!("binding to the compositor state");
        let compositor = CompositorState::bind(&globals, &queue_handle)
            .context("wl_compositor is not available")?;

        trace!("binding to seat state");
        let seat_state = SeatState::new(&globals, &queue_handle);
        trace!("binding to output state");
        let output_state = OutputState::new(&globals, &queue_handle);

        trace!("binding to layer shell");
        // wlr-layer-shell is an extension; not every compositor has it.
        let layer_shell =
            LayerShell::bind(&globals, &queue_handle).context("layer shell is not available")?;

        trace!("binding to shm");
        let shm_state = Shm::bind(&globals, &queue_handle).context("shm is not available")?;

        let wayland = WaylandState {
            connection,
            compositor,
            output_state,
            queue_handle,
            registry_state,
            seat_state,
            shm_state,
            layer_shell,
        };

        let prompt = PromptView::new(&wayland)?;

        let state = State {
            wayland,
            text: TextSystem::default(),

            pointers: HashMap::new(),
            keyboards: HashMap::new(),

            prompt,

            outcome: None,
            loop_signal: event_loop.get_signal(),
        };

        let mut wayland_connection = WaylandConnection {
            event_queue,
            event_loop,
            state,
        };

        trace!("requesting updated state from the compositor");
        wayland_connection.round_trip()?;

        Ok(wayland_connection)
    }

    #[instrument(name = "WaylandConnection::round_trip", skip_all)]
    fn round_trip(&mut self) -> Result<usize> {
        self.event_queue
            .roundtrip(&mut self.state)
            .context("event queue failed to do a round trip")
    }

    /// Blocks in the event loop until the user decides or the compositor
    /// closes the panel, then returns the outcome.
    #[instrument(name = "WaylandConnection::run", skip(self))]
    pub fn run(mut self) -> Result<Outcome> {
        let ws = WaylandSource::new(
            self.state.wayland.connection.clone(),
            self.event_queue,
        );
        ws.insert(self.event_loop.handle())
            .expect("failed to insert wayland event source into event loop");

        self.event_loop
            .run(None, &mut self.state, |_| {})
            .context("failed to run event loop")?;

        let outcome = self.state.outcome.unwrap_or_else(|| {
            warn!("event loop stopped without a decision, treating as cancelled");
            Outcome::Cancelled
        });
        Ok(outcome)
    }
}

impl CompositorHandler for State {
    #[instrument(name = "CompositorHandler::scale_factor_changed", skip_all)]
    fn scale_factor_changed(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        surface: &WlSurface,
        new_factor: i32,
    ) {
        if surface == self.prompt.surface() {
            self.prompt.set_scale_factor(new_factor);
            self.redraw_if_needed();
        }
    }

    fn transform_changed(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _surface: &WlSurface,
        _new_transform: wayland_client::protocol::wl_output::Transform,
    ) {
        trace!("`transform_changed` called");
    }

    fn frame(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _surface: &WlSurface,
        _time: u32,
    ) {
        // Static panel: repaints happen directly from input handlers.
        trace!("`frame` called");
    }

    fn surface_enter(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _surface: &WlSurface,
        _output: &WlOutput,
    ) {
        trace!("`surface_enter` called");
    }

    fn surface_leave(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _surface: &WlSurface,
        _output: &WlOutput,
    ) {
        trace!("`surface_leave` called");
    }
}

impl OutputHandler for State {
    fn output_state(&mut self) -> &mut OutputState {
        &mut self.wayland.output_state
    }

    fn new_output(&mut self, _conn: &Connection, _qh: &QueueHandle<Self>, _output: WlOutput) {
        trace!("`new_output` called");
    }

    fn update_output(&mut self, _conn: &Connection, _qh: &QueueHandle<Self>, _output: WlOutput) {
        trace!("`update_output` called");
    }

    fn output_destroyed(&mut self, _conn: &Connection, _qh: &QueueHandle<Self>, _output: WlOutput) {
        trace!("`output_destroyed` called");
    }
}

impl LayerShellHandler for State {
    #[instrument(name = "LayerShellHandler::closed", skip_all)]
    fn closed(&mut self, _conn: &Connection, _qh: &QueueHandle<Self>, _layer: &LayerSurface) {
        // Dismissal by the compositor is the same outcome as an explicit
        // cancel; the two paths are deliberately merged.
        warn!("the compositor closed the prompt surface");
        self.finish(Outcome::Cancelled);
    }

    #[instrument(name = "LayerShellHandler::configure", skip_all)]
    fn configure(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        layer: &LayerSurface,
        configure: LayerSurfaceConfigure,
        _serial: u32,
    ) {
        info!(
            "layer surface configured with {}x{}",
            configure.new_size.0, configure.new_size.1
        );
        if layer.wl_surface() != self.prompt.surface() {
            warn!("`configure` called for an unknown layer surface");
            return;
        }
        self.prompt.configure(configure.new_size.0, configure.new_size.1);
        self.redraw_if_needed();
    }
}

impl ShmHandler for State {
    fn shm_state(&mut self) -> &mut Shm {
        &mut self.wayland.shm_state
    }
}

delegate_compositor!(State);
delegate_output!(State);
delegate_seat!(State);
delegate_shm!(State);

delegate_keyboard!(State);
delegate_pointer!(State);

delegate_layer!(State);

delegate_registry!(State);

impl ProvidesRegistryState for State {
    fn registry(&mut self) -> &mut RegistryState {
        &mut self.wayland.registry_state
    }
    registry_handlers![OutputState, SeatState];
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::Outcome;

    #[test]
    fn outcome_tokens_match_the_process_contract() {
        assert_eq!(Outcome::Confirmed.to_string(), "confirmed");
        assert_eq!(Outcome::Cancelled.to_string(), "cancelled");
    }
}
