use smithay_client_toolkit::seat::keyboard::{KeyEvent, KeyboardHandler, Keysym, Modifiers};
use tracing::warn;
use wayland_backend::client::ObjectId;
use wayland_client::{
    protocol::{wl_keyboard::WlKeyboard, wl_surface::WlSurface},
    Connection, Proxy, QueueHandle,
};

use crate::State;

pub struct Keyboard {
    pub keyboard: WlKeyboard,
    pub focus: Option<WlSurface>,
    pub modifiers: Modifiers,
}

impl Keyboard {
    pub fn new(keyboard: WlKeyboard) -> Self {
        Self {
            keyboard,
            focus: None,
            modifiers: Modifiers::default(),
        }
    }

    pub fn id(&self) -> ObjectId {
        self.keyboard.id()
    }
}

impl KeyboardHandler for State {
    fn enter(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        keyboard: &WlKeyboard,
        surface: &WlSurface,
        _serial: u32,
        _raw: &[u32],
        _keysyms: &[Keysym],
    ) {
        let Some(kb) = self
            .keyboards
            .values_mut()
            .find(|x| x.id() == keyboard.id())
        else {
            warn!("keyboard event `enter` dispatched for keyboard not in state");
            return;
        };
        kb.focus = Some(surface.clone());
    }

    fn leave(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        keyboard: &WlKeyboard,
        _surface: &WlSurface,
        _serial: u32,
    ) {
        let Some(kb) = self
            .keyboards
            .values_mut()
            .find(|x| x.id() == keyboard.id())
        else {
            warn!("keyboard event `leave` dispatched for keyboard not in state");
            return;
        };
        kb.focus = None;
    }

    fn press_key(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        keyboard: &WlKeyboard,
        _serial: u32,
        event: KeyEvent,
    ) {
        let Some(kb) = self.keyboards.values().find(|x| x.id() == keyboard.id()) else {
            warn!("keyboard event `press_key` dispatched for keyboard not in state");
            return;
        };
        if kb.focus.as_ref() != Some(self.prompt.surface()) {
            return;
        }

        let shift = kb.modifiers.shift;
        if let Some(outcome) = self.prompt.key_pressed(event.keysym, shift) {
            self.finish(outcome);
            return;
        }
        self.redraw_if_needed();
    }

    fn release_key(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _keyboard: &WlKeyboard,
        _serial: u32,
        _event: KeyEvent,
    ) {
        // Everything the prompt reacts to happens on press.
    }

    fn update_modifiers(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        keyboard: &WlKeyboard,
        _serial: u32,
        modifiers: Modifiers,
        _layout: u32,
    ) {
        let Some(kb) = self
            .keyboards
            .values_mut()
            .find(|x| x.id() == keyboard.id())
        else {
            warn!("keyboard event `update_modifiers` dispatched for keyboard not in state");
            return;
        };
        kb.modifiers = modifiers;
    }
}
